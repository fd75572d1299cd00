//! Error types for schema construction, parsing and binding.
//!
//! Only [`SchemaError`] and [`ParseError`] ever reach the caller as `Err`.
//! Coercion and accessor failures are recorded on the descriptor's parse
//! state and surface later as validation errors.

use thiserror::Error;

/// Schema construction failures.
///
/// These indicate a mistake in the configuration definition and are raised
/// by [`SchemaBuilder::build`](crate::SchemaBuilder::build) before any
/// parse is possible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name or alias collides with one already registered.
    #[error("duplicate argument name '{name}' (already used by '{existing}')")]
    DuplicateName { name: String, existing: String },
    /// A field or alias name is empty or whitespace-only.
    #[error("argument name cannot be empty")]
    EmptyName,
    /// The argument prefix is empty.
    #[error("argument prefix cannot be empty")]
    EmptyPrefix,
    /// A positional order names a field that does not exist.
    #[error("positional argument '{0}' is not a declared field")]
    UnknownPositional(String),
    /// Both field-level positional markers and an explicit order were given.
    #[error("positional arguments declared both per field and as an explicit order")]
    ConflictingPositionalGroup,
}

/// Parse-time failures that abort the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A name segment is a prefix of more than one argument.
    #[error("ambiguous argument '{token}' matches {}", .candidates.join(", "))]
    AmbiguousName {
        token: String,
        candidates: Vec<String>,
    },
    /// The schema for the configuration type could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A raw token could not be converted to the target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not convert '{value}' to {expected}")]
pub struct CoercionError {
    pub value: String,
    pub expected: String,
}

impl CoercionError {
    pub fn new(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// A setter received a [`Value`](crate::Value) of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} value, found {found}")]
pub struct AccessError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl AccessError {
    pub fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }
}
