//! Explicit cache of built schemas, keyed by configuration type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{ArgumentSchema, Configuration, SchemaBuilder};

type Entry = Arc<dyn Any + Send + Sync>;

/// Lazily built, shared schemas for [`Configuration`] types.
///
/// Lookups take a read lock. On a miss the caller takes the write lock,
/// checks again, and builds and publishes the schema while holding it, so
/// each type is built exactly once per registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use argbind_core::*;
///
/// #[derive(Default)]
/// struct Opts {
///     verbose: bool,
/// }
///
/// impl Configuration for Opts {
///     fn describe(builder: &mut SchemaBuilder<Self>) {
///         builder.field(
///             "Verbose",
///             ValueType::bool(),
///             |o| Value::from(o.verbose),
///             |o, v| { o.verbose = v.into_bool()?; Ok(()) },
///         );
///     }
/// }
///
/// let registry = SchemaRegistry::new();
/// let first = registry.get_or_build::<Opts>().unwrap();
/// let second = registry.get_or_build::<Opts>().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Entry>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] from building `T`'s schema. Nothing is
    /// cached on failure.
    pub fn get_or_build<T: Configuration>(&self) -> Result<Arc<ArgumentSchema<T>>, SchemaError> {
        let key = TypeId::of::<T>();

        if let Some(schema) = self.lookup::<T>(&key) {
            return Ok(schema);
        }

        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = schemas.get(&key).cloned().and_then(downcast::<T>) {
            return Ok(schema);
        }

        let mut builder = SchemaBuilder::<T>::new();
        T::describe(&mut builder);
        let schema = Arc::new(builder.build(&T::default())?);
        schemas.insert(key, schema.clone() as Entry);
        debug!(type_name = std::any::type_name::<T>(), "Registered argument schema");
        Ok(schema)
    }

    fn lookup<T: Configuration>(&self, key: &TypeId) -> Option<Arc<ArgumentSchema<T>>> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.get(key).cloned().and_then(downcast::<T>)
    }

    pub fn contains<T: Configuration>(&self) -> bool {
        self.lookup::<T>(&TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached schema. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.len())
            .finish()
    }
}

fn downcast<T: Configuration>(entry: Entry) -> Option<Arc<ArgumentSchema<T>>> {
    entry.downcast::<ArgumentSchema<T>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueType};

    #[derive(Default)]
    struct Good {
        name: String,
    }

    impl Configuration for Good {
        fn describe(builder: &mut SchemaBuilder<Self>) {
            builder.field(
                "Name",
                ValueType::string(),
                |g| Value::from(&g.name),
                |g, v| {
                    g.name = v.into_string()?;
                    Ok(())
                },
            );
        }
    }

    #[derive(Default)]
    struct Broken;

    impl Configuration for Broken {
        fn describe(builder: &mut SchemaBuilder<Self>) {
            builder.field("A", ValueType::bool(), |_| Value::Null, |_, _| Ok(())).alias("x");
            builder.field("B", ValueType::bool(), |_| Value::Null, |_, _| Ok(())).alias("x");
        }
    }

    #[test]
    fn test_schema_is_built_once_and_shared() {
        let registry = SchemaRegistry::new();
        assert!(!registry.contains::<Good>());
        let a = registry.get_or_build::<Good>().unwrap();
        let b = registry.get_or_build::<Good>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.get_or_build::<Broken>(),
            Err(SchemaError::DuplicateName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_keeps_outstanding_schemas() {
        let registry = SchemaRegistry::new();
        let schema = registry.get_or_build::<Good>().unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(schema.len(), 1);
        let rebuilt = registry.get_or_build::<Good>().unwrap();
        assert!(!Arc::ptr_eq(&schema, &rebuilt));
    }

    #[test]
    fn test_concurrent_first_use_builds_one_schema() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get_or_build::<Good>().unwrap())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
