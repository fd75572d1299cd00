//! Type coercion boundary.
//!
//! The binder never converts strings itself; it asks a [`Coerce`]
//! implementation. [`StandardCoercer`] covers the scalar types of
//! [`ScalarType`] and is what [`ArgumentBinder`](crate::ArgumentBinder)
//! uses unless another coercer is supplied.

use crate::error::CoercionError;
use crate::value::{ScalarType, Value};

/// Converts raw command-line strings into tagged values.
pub trait Coerce: Send + Sync {
    /// Converts one raw token into a value of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] when `raw` is not a valid `target`.
    fn coerce(&self, raw: &str, target: &ScalarType) -> Result<Value, CoercionError>;

    /// Converts every token of a run into an array of `element`.
    ///
    /// # Errors
    ///
    /// Returns the first element's [`CoercionError`]. The reported
    /// `expected` names the array type.
    fn coerce_array(&self, raw: &[String], element: &ScalarType) -> Result<Value, CoercionError> {
        raw.iter()
            .map(|token| {
                self.coerce(token, element)
                    .map_err(|_| CoercionError::new(token.as_str(), format!("an array of {element}")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Default coercion rules.
///
/// # Examples
///
/// ```
/// use argbind_core::{Coerce, ScalarType, StandardCoercer, Value};
///
/// let c = StandardCoercer;
/// assert_eq!(c.coerce("yes", &ScalarType::Bool).unwrap(), Value::Bool(true));
/// assert_eq!(c.coerce("42", &ScalarType::Integer).unwrap(), Value::Integer(42));
/// assert!(c.coerce("forty", &ScalarType::Integer).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercer;

const TRUE_WORDS: &[&str] = &["true", "yes", "y", "on", "1", "+"];
const FALSE_WORDS: &[&str] = &["false", "no", "n", "off", "0", "-"];

impl Coerce for StandardCoercer {
    fn coerce(&self, raw: &str, target: &ScalarType) -> Result<Value, CoercionError> {
        let trimmed = raw.trim();
        let fail = || CoercionError::new(raw, target.to_string());
        match target {
            ScalarType::String => Ok(Value::Text(raw.to_string())),
            ScalarType::Bool => {
                let lower = trimmed.to_ascii_lowercase();
                if TRUE_WORDS.contains(&lower.as_str()) {
                    Ok(Value::Bool(true))
                } else if FALSE_WORDS.contains(&lower.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail())
                }
            }
            ScalarType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| fail()),
            ScalarType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .map(Value::Float)
                .ok_or_else(fail),
            ScalarType::Choice(choices) => choices
                .iter()
                .find(|choice| choice.eq_ignore_ascii_case(trimmed))
                .map(|choice| Value::Text(choice.clone()))
                .ok_or_else(fail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_words() {
        let c = StandardCoercer;
        for word in ["true", "YES", "on", "1"] {
            assert_eq!(c.coerce(word, &ScalarType::Bool).unwrap(), Value::Bool(true));
        }
        for word in ["false", "No", "off", "0"] {
            assert_eq!(c.coerce(word, &ScalarType::Bool).unwrap(), Value::Bool(false));
        }
        assert!(c.coerce("maybe", &ScalarType::Bool).is_err());
    }

    #[test]
    fn test_float_rejects_non_finite() {
        let c = StandardCoercer;
        assert_eq!(c.coerce("2.5", &ScalarType::Float).unwrap(), Value::Float(2.5));
        assert!(c.coerce("inf", &ScalarType::Float).is_err());
    }

    #[test]
    fn test_choice_returns_canonical_spelling() {
        let c = StandardCoercer;
        let target = ScalarType::Choice(vec!["Json".into(), "Yaml".into()]);
        assert_eq!(c.coerce("yaml", &target).unwrap(), Value::from("Yaml"));
        let err = c.coerce("toml", &target).unwrap_err();
        assert_eq!(err.expected, "one of Json|Yaml");
    }

    #[test]
    fn test_array_error_names_element_type() {
        let c = StandardCoercer;
        let raw = vec!["1".to_string(), "x".to_string()];
        let err = c.coerce_array(&raw, &ScalarType::Integer).unwrap_err();
        assert_eq!(err.to_string(), "could not convert 'x' to an array of integer");
    }

    #[test]
    fn test_empty_array_is_valid() {
        let c = StandardCoercer;
        assert_eq!(
            c.coerce_array(&[], &ScalarType::String).unwrap(),
            Value::Array(Vec::new())
        );
    }
}
