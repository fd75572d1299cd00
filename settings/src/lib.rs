//! Persisted settings for bound configurations.
//!
//! A [`SettingsDocument`] records the schema's type name and one property per
//! field that allows saving. Documents are stored as JSON or YAML
//! ([`SettingsFormat`]); loading checks the type name, converts each property
//! against its field type and writes it through the field's setter.
//!
//! # Example
//!
//! ```
//! use argbind_core::{ScalarType, SchemaBuilder, Value, ValueMap, ValueType};
//! use argbind_settings::{SettingsFormat, from_str, to_string};
//!
//! let mut builder = SchemaBuilder::<ValueMap>::new();
//! builder.type_name("demo::Options");
//! builder.entry("Host", ValueType::string());
//! builder.entry("Tags", ValueType::array(ScalarType::String));
//! let schema = builder.build(&ValueMap::new()).unwrap();
//!
//! let mut config = ValueMap::new();
//! config.insert("Host", "example.org");
//! config.insert("Tags", vec!["a", "b"]);
//!
//! let json = to_string(&schema, &config, SettingsFormat::Json).unwrap();
//! assert!(json.contains(r#""Element": ["#));
//!
//! let mut restored = ValueMap::new();
//! from_str(&schema, &json, SettingsFormat::Json, &mut restored).unwrap();
//! assert_eq!(restored, config);
//! ```

mod document;
mod error;
mod format;

pub use document::{Property, SettingsDocument, apply_document, to_document};
pub use error::{Result, SettingsError};
pub use format::{SettingsFormat, from_str, load, load_as, save, to_string};
