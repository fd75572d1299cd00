//! Binding a configuration value to a command line.
//!
//! [`ArgumentBinder`] owns one configuration instance and its per-parse
//! state. It moves through [`Phase::Uninitialized`] →
//! [`Phase::Initializing`] → [`Phase::Initialized`]; every
//! `initialize_from_*` call starts over with fresh state.

use std::fmt;
use std::sync::Arc;

use crate::bind::{ParseState, ValueBinder};
use crate::coerce::{Coerce, StandardCoercer};
use crate::error::{ParseError, SchemaError};
use crate::query::query_segments;
use crate::registry::SchemaRegistry;
use crate::schema::{ArgumentSchema, Configuration};
use crate::tokenize::{Segment, Tokenizer};
use crate::usage::{HelpOptions, help_text, usage_line};
use crate::validate::{ValidationError, validate};
use crate::value::Value;

/// Lifecycle of an [`ArgumentBinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Initialized,
}

/// A configuration instance bound to its schema.
///
/// # Examples
///
/// ```
/// use argbind_core::*;
///
/// #[derive(Default)]
/// struct Opts {
///     files: Vec<String>,
///     force: bool,
/// }
///
/// impl Configuration for Opts {
///     fn describe(builder: &mut SchemaBuilder<Self>) {
///         builder
///             .field(
///                 "Files",
///                 ValueType::array(ScalarType::String),
///                 |o| Value::from(o.files.clone()),
///                 |o, v| { o.files = v.into_strings()?; Ok(()) },
///             )
///             .positional()
///             .required();
///         builder.field(
///             "Force",
///             ValueType::bool(),
///             |o| Value::from(o.force),
///             |o, v| { o.force = v.into_bool()?; Ok(()) },
///         );
///     }
/// }
///
/// let registry = SchemaRegistry::new();
/// let mut binder = ArgumentBinder::<Opts>::from_registry(&registry).unwrap();
/// assert!(binder.initialize_from_args(&["a.txt", "b.txt", "/Force"]).unwrap());
/// assert_eq!(binder.config().files, vec!["a.txt", "b.txt"]);
/// assert!(binder.config().force);
/// ```
pub struct ArgumentBinder<T> {
    schema: Arc<ArgumentSchema<T>>,
    config: T,
    coercer: Box<dyn Coerce>,
    state: ParseState,
    errors: Vec<ValidationError>,
    phase: Phase,
}

impl<T> ArgumentBinder<T> {
    pub fn new(schema: Arc<ArgumentSchema<T>>, config: T) -> Self {
        let state = ParseState::new(schema.len());
        Self {
            schema,
            config,
            coercer: Box::new(StandardCoercer),
            state,
            errors: Vec::new(),
            phase: Phase::Uninitialized,
        }
    }

    /// Replaces the coercion service.
    pub fn with_coercer(mut self, coercer: impl Coerce + 'static) -> Self {
        self.coercer = Box::new(coercer);
        self
    }

    /// Parses `args` (program path already removed) into the configuration
    /// and returns whether the result is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AmbiguousName`] when a name segment matches
    /// several arguments. Tokenizing finishes before anything is bound, so
    /// the configuration is untouched in that case.
    pub fn initialize_from_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<bool, ParseError> {
        self.begin();
        let segments = match Tokenizer::new(&self.schema).tokenize(args) {
            Ok(segments) => segments,
            Err(err) => {
                self.phase = Phase::Uninitialized;
                return Err(err);
            }
        };
        Ok(self.apply(&segments))
    }

    /// Initializes from a URL query string and returns whether the result
    /// is valid.
    pub fn initialize_from_query(&mut self, query: &str) -> bool {
        self.begin();
        let segments = query_segments(&self.schema, query);
        self.apply(&segments)
    }

    fn begin(&mut self) {
        self.state = ParseState::new(self.schema.len());
        self.errors.clear();
        self.phase = Phase::Initializing;
    }

    fn apply(&mut self, segments: &[Segment]) -> bool {
        let binder = ValueBinder::new(self.coercer.as_ref());
        for segment in segments {
            binder.bind(&self.schema, segment, &mut self.config, &mut self.state);
        }
        self.phase = Phase::Initialized;
        self.is_valid()
    }

    /// Re-runs validation, replacing the previous error list.
    pub fn is_valid(&mut self) -> bool {
        self.errors = validate(&self.schema, &self.config, &self.state);
        self.errors.is_empty()
    }

    /// Errors from the last validation.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Whether the named argument received a value in the last parse.
    pub fn was_set(&self, name: &str) -> bool {
        self.schema
            .index_of(name)
            .is_some_and(|i| self.state.was_set(i))
    }

    /// Current value of the named argument.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.schema.get(name).map(|d| d.get(&self.config))
    }

    pub fn usage(&self) -> String {
        usage_line(&self.schema)
    }

    /// Help text, led by the current errors if there are any.
    pub fn help_text(&self, options: &HelpOptions) -> String {
        help_text(&self.schema, &self.errors, options)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn schema(&self) -> &Arc<ArgumentSchema<T>> {
        &self.schema
    }

    pub fn config(&self) -> &T {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut T {
        &mut self.config
    }

    pub fn into_inner(self) -> T {
        self.config
    }
}

impl<T: Configuration> ArgumentBinder<T> {
    /// Binds a default `T` using the registry's cached schema.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] from building `T`'s schema.
    pub fn from_registry(registry: &SchemaRegistry) -> Result<Self, SchemaError> {
        Ok(Self::new(registry.get_or_build::<T>()?, T::default()))
    }
}

impl<T: fmt::Debug> fmt::Debug for ArgumentBinder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentBinder")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoercionError;
    use crate::schema::SchemaBuilder;
    use crate::value::{ScalarType, ValueMap, ValueType};

    fn binder() -> ArgumentBinder<ValueMap> {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        builder.entry("Name", ValueType::string()).required();
        builder.entry("Count", ValueType::integer());
        let mut prototype = ValueMap::new();
        prototype.insert("Count", 1);
        let schema = builder.build(&prototype).unwrap();
        ArgumentBinder::new(Arc::new(schema), prototype)
    }

    #[test]
    fn test_phase_transitions() {
        let mut binder = binder();
        assert_eq!(binder.phase(), Phase::Uninitialized);
        binder.initialize_from_args(&["/Name", "x"]).unwrap();
        assert_eq!(binder.phase(), Phase::Initialized);
    }

    #[test]
    fn test_reinitialize_resets_flags_and_errors() {
        let mut binder = binder();
        assert!(binder.initialize_from_args(&["/Name", "x", "/Count", "bad"]).is_ok());
        assert!(binder.was_set("Name"));
        assert_eq!(binder.errors().len(), 1);

        assert!(!binder.initialize_from_args::<&str>(&[]).unwrap());
        assert!(!binder.was_set("Name"));
        assert_eq!(binder.error_messages(), vec!["Name is required."]);
    }

    #[test]
    fn test_is_valid_is_not_cumulative() {
        let mut binder = binder();
        binder.initialize_from_args::<&str>(&[]).unwrap();
        assert!(!binder.is_valid());
        assert!(!binder.is_valid());
        assert_eq!(binder.errors().len(), 1);
    }

    #[test]
    fn test_ambiguity_leaves_config_untouched() {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        builder.entry("Alpha", ValueType::string());
        builder.entry("Also", ValueType::string());
        let schema = builder.build(&ValueMap::new()).unwrap();
        let mut binder = ArgumentBinder::new(Arc::new(schema), ValueMap::new());

        let err = binder
            .initialize_from_args(&["/Alpha", "x", "/Al", "y"])
            .unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousName { ref token, .. } if token == "Al"));
        assert!(binder.config().is_empty());
        assert_eq!(binder.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_query_initialization() {
        let mut binder = binder();
        assert!(binder.initialize_from_query("Name=abc&Count=4"));
        assert_eq!(binder.value("Name"), Some(Value::from("abc")));
        assert_eq!(binder.value("Count"), Some(Value::from(4)));
    }

    struct Upper;

    impl Coerce for Upper {
        fn coerce(&self, raw: &str, _target: &ScalarType) -> Result<Value, CoercionError> {
            Ok(Value::Text(raw.to_uppercase()))
        }
    }

    #[test]
    fn test_custom_coercer_is_used() {
        let mut binder = binder().with_coercer(Upper);
        binder.initialize_from_args(&["/Name", "abc"]).unwrap();
        assert_eq!(binder.value("Name"), Some(Value::from("ABC")));
    }
}
