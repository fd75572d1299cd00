//! Post-scan validation: required fields, recorded binding errors, and
//! attached field validators.
//!
//! # Examples
//!
//! ```
//! use argbind_core::*;
//!
//! let mut builder = SchemaBuilder::<ValueMap>::new();
//! builder
//!     .entry("Port", ValueType::integer())
//!     .validator(RangeValidator::new(1.0, 65535.0));
//! let mut prototype = ValueMap::new();
//! prototype.insert("Port", 0);
//! let schema = builder.build(&prototype).unwrap();
//!
//! let state = ParseState::new(schema.len());
//! let errors = validate(&schema, &prototype, &state);
//! assert_eq!(errors[0].message, "Port must be between 1 and 65535 (got 0).");
//! ```

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bind::ParseState;
use crate::schema::ArgumentSchema;
use crate::value::Value;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Descriptor name the error belongs to.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// A check attached to a field, run against its current value.
///
/// `Null` values should pass; an unset optional field has nothing to check.
pub trait FieldValidator: Send + Sync {
    /// Returns the formatted failure message.
    fn validate(&self, field: &str, value: &Value) -> Result<(), String>;

    /// Extra help line describing the constraint.
    fn hint(&self) -> Option<String> {
        None
    }
}

/// Runs every check and returns the errors in order: required fields,
/// recorded binding errors, then validators in declaration order.
pub fn validate<T>(schema: &ArgumentSchema<T>, target: &T, state: &ParseState) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, descriptor) in schema.descriptors().iter().enumerate() {
        if descriptor.required && !state.was_set(i) {
            errors.push(ValidationError::new(
                &descriptor.name,
                format!("{} is required.", descriptor.name),
            ));
        }
    }

    for (i, descriptor) in schema.descriptors().iter().enumerate() {
        if let Some(message) = state.last_error(i) {
            errors.push(ValidationError::new(
                &descriptor.name,
                format!("{} has an error: {message}.", descriptor.name),
            ));
        }
    }

    for descriptor in schema.descriptors() {
        if descriptor.validators.is_empty() {
            continue;
        }
        let value = descriptor.get(target);
        for validator in &descriptor.validators {
            if let Err(message) = validator.validate(&descriptor.name, &value) {
                errors.push(ValidationError::new(&descriptor.name, message));
            }
        }
    }

    errors
}

/// Numeric bounds, inclusive. Arrays are checked element by element.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeValidator {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn at_most(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("between {min} and {max}"),
            (Some(min), None) => format!("at least {min}"),
            (None, Some(max)) => format!("at most {max}"),
            (None, None) => "a number".to_string(),
        }
    }

    fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        let Some(x) = value.as_f64() else {
            return Err(format!("{field} must be a number (got {value})."));
        };
        let below = self.min.is_some_and(|min| x < min);
        let above = self.max.is_some_and(|max| x > max);
        if below || above {
            return Err(format!("{field} must be {} (got {value}).", self.describe()));
        }
        Ok(())
    }
}

impl FieldValidator for RangeValidator {
    fn validate(&self, field: &str, value: &Value) -> Result<(), String> {
        match value {
            Value::Null => Ok(()),
            Value::Array(items) => items.iter().try_for_each(|item| self.check(field, item)),
            other => self.check(field, other),
        }
    }

    fn hint(&self) -> Option<String> {
        Some(format!("Value must be {}.", self.describe()))
    }
}

/// Length bounds on text (in characters) or arrays (in elements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthValidator {
    pub min: usize,
    pub max: Option<usize>,
}

impl LengthValidator {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// At least one character or element.
    pub fn non_empty() -> Self {
        Self { min: 1, max: None }
    }
}

impl FieldValidator for LengthValidator {
    fn validate(&self, field: &str, value: &Value) -> Result<(), String> {
        let (len, unit) = match value {
            Value::Null => return Ok(()),
            Value::Text(s) => (s.chars().count(), "characters"),
            Value::Array(items) => (items.len(), "values"),
            _ => return Ok(()),
        };
        if len < self.min {
            return Err(format!("{field} needs at least {} {unit} (got {len}).", self.min));
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(format!("{field} allows at most {max} {unit} (got {len})."));
            }
        }
        Ok(())
    }

    fn hint(&self) -> Option<String> {
        match self.max {
            Some(max) => Some(format!("Length must be between {} and {max}.", self.min)),
            None if self.min > 0 => Some(format!("Length must be at least {}.", self.min)),
            None => None,
        }
    }
}

/// Text must match a regular expression. Arrays are checked element by
/// element; non-text values pass.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
}

impl PatternValidator {
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid `pattern`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        match value.as_str() {
            Some(text) if !self.regex.is_match(text) => Err(format!(
                "{field} value '{text}' does not match {}.",
                self.regex.as_str()
            )),
            _ => Ok(()),
        }
    }
}

impl FieldValidator for PatternValidator {
    fn validate(&self, field: &str, value: &Value) -> Result<(), String> {
        match value {
            Value::Array(items) => items.iter().try_for_each(|item| self.check(field, item)),
            other => self.check(field, other),
        }
    }

    fn hint(&self) -> Option<String> {
        Some(format!("Value must match {}.", self.regex.as_str()))
    }
}
