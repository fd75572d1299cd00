//! The persisted settings document and its conversion to and from a bound
//! configuration.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "Type": "deploy::Options",
//!   "Properties": {
//!     "Host": "example.org",
//!     "Port": 8080,
//!     "Tags": { "Element": ["blue", "green"] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use argbind_core::{ArgumentSchema, Coerce, ScalarType, StandardCoercer, Value, ValueType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SettingsError};

/// Saved values for one configuration type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    /// Schema type name the values belong to.
    #[serde(rename = "Type")]
    pub type_name: String,
    /// One entry per saved field, keyed by field name.
    #[serde(rename = "Properties", default)]
    pub properties: BTreeMap<String, Property>,
}

/// A stored field value. Arrays are wrapped in an `Element` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Elements {
        #[serde(rename = "Element", default)]
        elements: Vec<Value>,
    },
    Scalar(Value),
}

impl SettingsDocument {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }
}

/// Captures every saveable field of `config`.
///
/// # Examples
///
/// ```
/// use argbind_core::{ScalarType, SchemaBuilder, Value, ValueMap, ValueType};
/// use argbind_settings::{Property, to_document};
///
/// let mut builder = SchemaBuilder::<ValueMap>::new();
/// builder.type_name("demo");
/// builder.entry("Tags", ValueType::array(ScalarType::String));
/// builder.entry("Token", ValueType::string()).no_save();
/// let schema = builder.build(&ValueMap::new()).unwrap();
///
/// let mut config = ValueMap::new();
/// config.insert("Tags", vec!["a", "b"]);
/// config.insert("Token", "secret");
///
/// let doc = to_document(&schema, &config);
/// assert_eq!(doc.type_name, "demo");
/// assert_eq!(
///     doc.properties["Tags"],
///     Property::Elements { elements: vec![Value::from("a"), Value::from("b")] }
/// );
/// assert!(!doc.properties.contains_key("Token"));
/// ```
pub fn to_document<T>(schema: &ArgumentSchema<T>, config: &T) -> SettingsDocument {
    let mut document = SettingsDocument::new(schema.type_name());
    for descriptor in schema.descriptors().iter().filter(|d| d.allow_save) {
        let value = descriptor.get(config);
        let property = match (&descriptor.value_type, value) {
            (ValueType::Array(_), Value::Array(elements)) => Property::Elements { elements },
            (ValueType::Array(_), Value::Null) => Property::Elements { elements: Vec::new() },
            (_, value) => Property::Scalar(value),
        };
        document.properties.insert(descriptor.name.clone(), property);
    }
    document
}

/// Writes the document's properties into `config`.
///
/// Properties are converted against their field types before anything is
/// written, so a conversion failure leaves `config` untouched. Unknown
/// properties are skipped with a warning and fields marked as not saved are
/// ignored.
///
/// # Errors
///
/// Returns [`SettingsError::TypeMismatch`] when the document belongs to a
/// different type, and [`SettingsError::InvalidProperty`] when a value does
/// not fit its field.
pub fn apply_document<T>(
    schema: &ArgumentSchema<T>,
    document: &SettingsDocument,
    config: &mut T,
) -> Result<()> {
    if document.type_name != schema.type_name() {
        return Err(SettingsError::TypeMismatch {
            expected: schema.type_name().to_string(),
            found: document.type_name.clone(),
        });
    }

    let mut updates = Vec::with_capacity(document.properties.len());
    for (name, property) in &document.properties {
        let Some(descriptor) = schema.get(name) else {
            warn!(property = %name, type_name = %document.type_name, "Ignoring unknown settings property");
            continue;
        };
        if !descriptor.allow_save {
            debug!(property = %name, "Ignoring property of unsaved field");
            continue;
        }
        let value = convert(property, &descriptor.value_type).map_err(|message| {
            SettingsError::InvalidProperty {
                name: name.clone(),
                message,
            }
        })?;
        updates.push((descriptor, value));
    }

    for (descriptor, value) in updates {
        descriptor
            .set(config, value)
            .map_err(|err| SettingsError::InvalidProperty {
                name: descriptor.name.clone(),
                message: err.to_string(),
            })?;
    }
    Ok(())
}

fn convert(property: &Property, value_type: &ValueType) -> std::result::Result<Value, String> {
    match (value_type, property) {
        (ValueType::Array(element), Property::Elements { elements })
        | (ValueType::Array(element), Property::Scalar(Value::Array(elements))) => elements
            .iter()
            .map(|item| convert_scalar(item, element))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        (ValueType::Array(element), Property::Scalar(other)) => Err(format!(
            "expected an array of {element}, found {}",
            other.kind()
        )),
        (ValueType::Scalar(scalar), Property::Scalar(value)) => convert_scalar(value, scalar),
        (ValueType::Scalar(scalar), Property::Elements { .. }) => {
            Err(format!("expected {scalar}, found an element list"))
        }
    }
}

fn convert_scalar(value: &Value, scalar: &ScalarType) -> std::result::Result<Value, String> {
    match (value, scalar) {
        (Value::Null, _) => Ok(Value::Null),
        (Value::Bool(_), ScalarType::Bool)
        | (Value::Integer(_), ScalarType::Integer)
        | (Value::Float(_), ScalarType::Float) => Ok(value.clone()),
        (Value::Integer(i), ScalarType::Float) => Ok(Value::Float(*i as f64)),
        (Value::Text(text), _) => StandardCoercer
            .coerce(text, scalar)
            .map_err(|err| err.to_string()),
        (Value::Integer(_) | Value::Float(_) | Value::Bool(_), ScalarType::String) => {
            Ok(Value::Text(value.to_string()))
        }
        (other, _) => Err(format!("expected {scalar}, found {}", other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argbind_core::{SchemaBuilder, ValueMap};

    fn schema() -> ArgumentSchema<ValueMap> {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        builder.type_name("tests::Sample");
        builder.entry("Name", ValueType::string());
        builder.entry("Ratio", ValueType::float());
        builder.entry("Ports", ValueType::array(ScalarType::Integer));
        builder.entry("Mode", ValueType::choice(["fast", "slow"]));
        builder.entry("Token", ValueType::string()).no_save();
        builder.build(&ValueMap::new()).unwrap()
    }

    fn document(properties: &str) -> SettingsDocument {
        serde_json::from_str(&format!(
            r#"{{"Type": "tests::Sample", "Properties": {properties}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_element_lists_parse_as_elements() {
        let doc = document(r#"{"Ports": {"Element": [1, 2]}, "Name": "x"}"#);
        assert_eq!(
            doc.properties["Ports"],
            Property::Elements {
                elements: vec![Value::from(1), Value::from(2)]
            }
        );
        assert_eq!(doc.properties["Name"], Property::Scalar(Value::from("x")));
    }

    #[test]
    fn test_apply_converts_by_field_type() {
        let doc = document(r#"{"Ratio": 2, "Ports": {"Element": ["80", 443]}, "Mode": "FAST"}"#);
        let mut config = ValueMap::new();
        apply_document(&schema(), &doc, &mut config).unwrap();
        assert_eq!(config.get("Ratio"), &Value::Float(2.0));
        assert_eq!(config.get("Ports"), &Value::from(vec![80, 443]));
        assert_eq!(config.get("Mode"), &Value::from("fast"));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut doc = document("{}");
        doc.type_name = "other::Type".to_string();
        let err = apply_document(&schema(), &doc, &mut ValueMap::new()).unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { ref found, .. } if found == "other::Type"));
    }

    #[test]
    fn test_invalid_property_leaves_config_untouched() {
        let doc = document(r#"{"Name": "kept", "Ports": {"Element": ["eighty"]}}"#);
        let mut config = ValueMap::new();
        let err = apply_document(&schema(), &doc, &mut config).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidProperty { ref name, .. } if name == "Ports"));
        assert!(config.is_empty());
    }

    #[test]
    fn test_unknown_and_unsaved_properties_are_skipped() {
        let doc = document(r#"{"Missing": 1, "Token": "leaked", "Name": "n"}"#);
        let mut config = ValueMap::new();
        apply_document(&schema(), &doc, &mut config).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("Name"), &Value::from("n"));
    }

    #[test]
    fn test_scalar_for_array_field_is_invalid() {
        let doc = document(r#"{"Ports": 80}"#);
        let err = apply_document(&schema(), &doc, &mut ValueMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'Ports': expected an array of integer, found integer"
        );
    }

    #[test]
    fn test_unset_fields_stay_absent_after_reload() {
        let mut original = ValueMap::new();
        original.insert("Name", "n");
        let doc = to_document(&schema(), &original);
        assert_eq!(doc.properties["Ratio"], Property::Scalar(Value::Null));

        let mut restored = ValueMap::new();
        apply_document(&schema(), &doc, &mut restored).unwrap();
        assert!(!restored.contains("Ratio"));
        assert!(!restored.contains("Mode"));
        assert_eq!(restored.get("Ports"), &Value::Array(Vec::new()));
        restored.remove("Ports");
        assert_eq!(restored, original);
    }
}
