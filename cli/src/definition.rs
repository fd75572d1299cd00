//! Schema definition files for the `argbind` driver.
//!
//! A definition describes a dynamic configuration: its arguments become
//! entries of a [`ValueMap`].
//!
//! # Example YAML
//!
//! ```yaml
//! program: deploy
//! title: Deploy 1.0
//! delimiters: ":="
//! case: ascii-insensitive
//! fields:
//!   - name: Host
//!     aliases: [h]
//!     required: true
//!     positional: true
//!   - name: Port
//!     type: integer
//!     default: 8080
//!     validators:
//!       - kind: range
//!         min: 1
//!         max: 65535
//!   - name: Tags
//!     type: string
//!     array: true
//!   - name: Mode
//!     type: choice
//!     choices: [rolling, blue-green]
//! ```

use std::io::BufReader;
use std::path::Path;

use argbind_core::{
    ArgumentSchema, CaseRule, Coerce, LengthValidator, PatternValidator, RangeValidator,
    ScalarType, SchemaBuilder, ShowInUsage, StandardCoercer, Value, ValueMap, ValueType,
};
use argbind_settings::SettingsFormat;
use serde::{Deserialize, Serialize};

/// Top-level definition document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaDefinition {
    pub program: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Type name recorded in saved settings; falls back to `program`.
    pub type_name: Option<String>,
    pub prefix: Option<String>,
    /// Assignment delimiter characters, e.g. `":="`.
    pub delimiters: String,
    pub case: CaseRule,
    pub fields: Vec<FieldDefinition>,
}

/// Scalar kind of a defined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    #[default]
    String,
    Choice,
}

/// One argument of a definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// Accepted words for `type: choice`.
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub required: bool,
    pub usage: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    #[serde(default)]
    pub positional: bool,
    pub show_in_usage: Option<bool>,
    #[serde(default = "default_save")]
    pub save: bool,
    #[serde(default)]
    pub validators: Vec<ValidatorDefinition>,
}

fn default_save() -> bool {
    true
}

/// Built-in validators, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum ValidatorDefinition {
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Length {
        #[serde(default)]
        min: usize,
        max: Option<usize>,
    },
    Pattern {
        pattern: String,
    },
}

impl FieldDefinition {
    fn value_type(&self) -> Result<ValueType, String> {
        let scalar = match self.kind {
            FieldKind::Bool => ScalarType::Bool,
            FieldKind::Integer => ScalarType::Integer,
            FieldKind::Float => ScalarType::Float,
            FieldKind::String => ScalarType::String,
            FieldKind::Choice if self.choices.is_empty() => {
                return Err(format!("field '{}' is a choice without choices", self.name));
            }
            FieldKind::Choice => ScalarType::Choice(self.choices.clone()),
        };
        Ok(if self.array {
            ValueType::Array(scalar)
        } else {
            ValueType::Scalar(scalar)
        })
    }

    /// The declared default converted to the field type. Booleans default to
    /// `false` and arrays to an empty list.
    fn initial_value(&self, value_type: &ValueType) -> Result<Value, String> {
        let invalid = |err: argbind_core::CoercionError| {
            format!("invalid default for '{}': {err}", self.name)
        };
        match (&self.default, value_type) {
            (None | Some(Value::Null), ValueType::Array(_)) => Ok(Value::Array(Vec::new())),
            (None | Some(Value::Null), ValueType::Scalar(ScalarType::Bool)) => Ok(Value::Bool(false)),
            (None | Some(Value::Null), _) => Ok(Value::Null),
            (Some(Value::Array(items)), ValueType::Array(element)) => {
                let raw: Vec<String> = items.iter().map(Value::to_string).collect();
                StandardCoercer.coerce_array(&raw, element).map_err(invalid)
            }
            (Some(single), ValueType::Array(element)) => StandardCoercer
                .coerce_array(&[single.to_string()], element)
                .map_err(invalid),
            (Some(Value::Array(_)), ValueType::Scalar(_)) => {
                Err(format!("invalid default for '{}': expected a single value", self.name))
            }
            (Some(value), ValueType::Scalar(scalar)) => StandardCoercer
                .coerce(&value.to_string(), scalar)
                .map_err(invalid),
        }
    }
}

impl SchemaDefinition {
    /// Loads a definition, choosing JSON or YAML by file extension.
    ///
    /// # Errors
    ///
    /// Fails if the extension is not recognized, the file cannot be read, or
    /// it does not parse.
    pub fn load(path: &Path) -> Result<Self, String> {
        let format = SettingsFormat::from_path(path).ok_or_else(|| {
            format!(
                "Unsupported definition file '{}': expected .json, .yaml or .yml",
                path.display()
            )
        })?;
        let file = std::fs::File::open(path)
            .map_err(|err| format!("Failed to open '{}': {err}", path.display()))?;
        let reader = BufReader::new(file);
        match format {
            SettingsFormat::Json => serde_json::from_reader(reader).map_err(|err| err.to_string()),
            SettingsFormat::Yaml => serde_yaml::from_reader(reader).map_err(|err| err.to_string()),
        }
        .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    }

    /// Builds the schema and the prototype holding every field's default.
    ///
    /// # Errors
    ///
    /// Fails on an invalid field type, default or pattern, or a schema
    /// construction error such as a duplicate alias.
    pub fn build(&self) -> Result<(ArgumentSchema<ValueMap>, ValueMap), String> {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        if let Some(prefix) = &self.prefix {
            builder.prefix(prefix.clone());
        }
        builder
            .assignment_delimiters(self.delimiters.chars())
            .case_rule(self.case);
        if let Some(program) = &self.program {
            builder.program_name(program.clone());
        }
        if let Some(title) = &self.title {
            builder.title(title.clone());
        }
        if let Some(description) = &self.description {
            builder.description(description.clone());
        }
        if let Some(type_name) = self.type_name.as_ref().or(self.program.as_ref()) {
            builder.type_name(type_name.clone());
        }

        let mut prototype = ValueMap::new();
        for field in &self.fields {
            let value_type = field.value_type()?;
            let initial = field.initial_value(&value_type)?;
            if !initial.is_null() {
                prototype.insert(field.name.clone(), initial);
            }

            let entry = builder.entry(field.name.clone(), value_type);
            entry.aliases(field.aliases.iter().cloned());
            if field.required {
                entry.required();
            }
            if let Some(usage) = &field.usage {
                entry.usage(usage.clone());
            }
            if let Some(description) = &field.description {
                entry.description(description.clone());
            }
            if field.positional {
                entry.positional();
            }
            if let Some(show) = field.show_in_usage {
                entry.show_in_usage(if show { ShowInUsage::True } else { ShowInUsage::False });
            }
            if !field.save {
                entry.no_save();
            }
            for validator in &field.validators {
                match validator {
                    ValidatorDefinition::Range { min, max } => {
                        entry.validator(RangeValidator { min: *min, max: *max });
                    }
                    ValidatorDefinition::Length { min, max } => {
                        entry.validator(LengthValidator::new(*min, *max));
                    }
                    ValidatorDefinition::Pattern { pattern } => {
                        let compiled = PatternValidator::new(pattern).map_err(|err| {
                            format!("invalid pattern for '{}': {err}", field.name)
                        })?;
                        entry.validator(compiled);
                    }
                }
            }
        }

        let schema = builder.build(&prototype).map_err(|err| err.to_string())?;
        Ok((schema, prototype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SchemaDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_build_applies_options_and_defaults() {
        let definition = parse(
            r#"
program: deploy
delimiters: ":"
case: ascii-insensitive
fields:
  - name: Port
    type: integer
    default: "8080"
  - name: Ratio
    type: float
    default: 1
  - name: Tags
    array: true
    default: [a, b]
  - name: Force
    type: bool
"#,
        );
        let (schema, prototype) = definition.build().unwrap();
        assert_eq!(schema.type_name(), "deploy");
        assert_eq!(schema.options().assignment_delimiters, vec![':']);
        assert_eq!(schema.case_rule(), CaseRule::AsciiInsensitive);
        assert_eq!(prototype.get("Port"), &Value::Integer(8080));
        assert_eq!(prototype.get("Ratio"), &Value::Float(1.0));
        assert_eq!(prototype.get("Tags"), &Value::from(vec!["a", "b"]));
        assert_eq!(prototype.get("Force"), &Value::Bool(false));
        assert_eq!(schema.get("port").unwrap().default_value, Value::Integer(8080));
    }

    #[test]
    fn test_validators_are_attached() {
        let definition = parse(
            r#"
fields:
  - name: Code
    validators:
      - kind: pattern
        pattern: "^[A-Z]{3}$"
      - kind: length
        min: 3
"#,
        );
        let (schema, _) = definition.build().unwrap();
        assert_eq!(schema.get("Code").unwrap().validators.len(), 2);
    }

    #[test]
    fn test_invalid_default_is_reported() {
        let definition = parse("fields:\n  - name: Port\n    type: integer\n    default: high\n");
        let err = definition.build().unwrap_err();
        assert_eq!(
            err,
            "invalid default for 'Port': could not convert 'high' to integer"
        );
    }

    #[test]
    fn test_choice_without_choices_is_rejected() {
        let definition = parse("fields:\n  - name: Mode\n    type: choice\n");
        assert!(definition.build().unwrap_err().contains("without choices"));
    }

    #[test]
    fn test_duplicate_alias_is_a_schema_error() {
        let definition = parse(
            "fields:\n  - name: Alpha\n    aliases: [a]\n  - name: Beta\n    aliases: [a]\n",
        );
        assert!(definition.build().unwrap_err().contains("'a'"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = serde_yaml::from_str::<SchemaDefinition>("colour: red\n").unwrap_err();
        assert!(err.to_string().contains("colour"));
    }
}
