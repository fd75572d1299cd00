//! Schema-driven command-line binding.
//!
//! A configuration type describes its arguments once through a
//! [`SchemaBuilder`]; the resulting [`ArgumentSchema`] drives every parse:
//!
//! - [`NameResolver`] — exact and unique-prefix name matching.
//! - [`Tokenizer`] — splits a command line into per-argument [`Segment`]s.
//! - [`ValueBinder`] — coerces value runs and writes them through setters.
//! - [`validate`] — required, binding-error and per-field rule checks.
//! - [`usage_line`] / [`help_text`] — plain-text documentation.
//! - [`ArgumentBinder`] — ties the above to one configuration instance.
//!
//! Schemas for [`Configuration`] types are cached in a [`SchemaRegistry`].
//! [`ValueMap`] gives a dynamic configuration when no struct exists.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: i64,
//!     verbose: bool,
//! }
//!
//! impl Configuration for Server {
//!     fn describe(builder: &mut SchemaBuilder<Self>) {
//!         builder.program_name("serve").assignment_delimiters([':', '=']);
//!         builder
//!             .field(
//!                 "Host",
//!                 ValueType::string(),
//!                 |s| Value::from(&s.host),
//!                 |s, v| { s.host = v.into_string()?; Ok(()) },
//!             )
//!             .required();
//!         builder
//!             .field(
//!                 "Port",
//!                 ValueType::integer(),
//!                 |s| Value::from(s.port),
//!                 |s, v| { s.port = v.into_i64()?; Ok(()) },
//!             )
//!             .alias("p")
//!             .validator(RangeValidator::new(1.0, 65535.0));
//!         builder.field(
//!             "Verbose",
//!             ValueType::bool(),
//!             |s| Value::from(s.verbose),
//!             |s, v| { s.verbose = v.into_bool()?; Ok(()) },
//!         );
//!     }
//! }
//!
//! let registry = SchemaRegistry::new();
//! let mut binder = ArgumentBinder::<Server>::from_registry(&registry).unwrap();
//!
//! assert!(binder.initialize_from_args(&["/Host:example.org", "/p", "8080", "/Verb"]).unwrap());
//! assert_eq!(binder.config().host, "example.org");
//! assert_eq!(binder.config().port, 8080);
//! assert!(binder.config().verbose);
//!
//! assert!(!binder.initialize_from_args(&["/p", "0"]).unwrap());
//! assert_eq!(
//!     binder.error_messages(),
//!     vec!["Host is required.", "Port must be between 1 and 65535 (got 0)."]
//! );
//! ```

mod bind;
mod binder;
mod coerce;
mod error;
mod query;
mod registry;
mod resolve;
mod schema;
mod tokenize;
mod usage;
mod validate;
mod value;

pub use bind::{ParseState, ValueBinder};
pub use binder::{ArgumentBinder, Phase};
pub use coerce::{Coerce, StandardCoercer};
pub use error::{AccessError, CoercionError, ParseError, SchemaError};
pub use query::query_segments;
pub use registry::SchemaRegistry;
pub use resolve::NameResolver;
pub use schema::{
    ArgumentDescriptor, ArgumentSchema, CaseRule, Configuration, FieldSpec, SchemaBuilder,
    SchemaOptions, ShowInUsage,
};
pub use tokenize::{Segment, Tokenizer, dequote};
pub use usage::{HelpOptions, LABEL_MARGIN, help_text, usage_line, wrap};
pub use validate::{
    FieldValidator, LengthValidator, PatternValidator, RangeValidator, ValidationError, validate,
};
pub use value::{ScalarType, Value, ValueMap, ValueType};
