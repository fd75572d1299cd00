//! Argument descriptors and the immutable per-type schema.
//!
//! A schema is built once from an explicit registration step: each field is
//! declared with its name, aliases, type and a getter/setter pair over the
//! configuration type. [`SchemaBuilder::build`] captures defaults from a
//! prototype instance and indexes every name and alias, failing on the
//! first collision.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! #[derive(Default)]
//! struct Opts {
//!     output: String,
//!     verbose: bool,
//! }
//!
//! let mut builder = SchemaBuilder::<Opts>::new();
//! builder
//!     .field(
//!         "Output",
//!         ValueType::string(),
//!         |o| Value::from(&o.output),
//!         |o, v| { o.output = v.into_string()?; Ok(()) },
//!     )
//!     .alias("o")
//!     .required();
//! builder.field(
//!     "Verbose",
//!     ValueType::bool(),
//!     |o| Value::from(o.verbose),
//!     |o, v| { o.verbose = v.into_bool()?; Ok(()) },
//! );
//!
//! let schema = builder.build(&Opts::default()).unwrap();
//! assert_eq!(schema.get("o").unwrap().name, "Output");
//! assert_eq!(schema.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AccessError, SchemaError};
use crate::validate::FieldValidator;
use crate::value::{Value, ValueMap, ValueType};

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), AccessError> + Send + Sync>;

/// Name comparison rule for the schema index and prefix matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseRule {
    /// Names must match exactly.
    #[default]
    Sensitive,
    /// ASCII letters compare without case.
    AsciiInsensitive,
    /// Unicode lowercase folding.
    Insensitive,
}

impl CaseRule {
    /// Folds `name` into its index key.
    pub fn fold(self, name: &str) -> String {
        match self {
            CaseRule::Sensitive => name.to_string(),
            CaseRule::AsciiInsensitive => name.to_ascii_lowercase(),
            CaseRule::Insensitive => name.to_lowercase(),
        }
    }
}

/// Whether a non-required field appears in the usage synopsis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowInUsage {
    /// Shown only if the field is required.
    #[default]
    Default,
    True,
    False,
}

/// Schema-wide parse and rendering options.
///
/// # Examples
///
/// ```
/// use argbind_core::{CaseRule, SchemaOptions};
///
/// let options = SchemaOptions::default();
/// assert_eq!(options.prefix, "/");
/// assert!(options.assignment_delimiters.is_empty());
/// assert_eq!(options.case_rule, CaseRule::Sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Literal marking a token as a name segment.
    pub prefix: String,
    /// Characters accepted between a name and an inline value (`/name:value`).
    pub assignment_delimiters: Vec<char>,
    pub case_rule: CaseRule,
    /// Program name printed at the start of the usage line.
    pub program_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            prefix: "/".to_string(),
            assignment_delimiters: Vec::new(),
            case_rule: CaseRule::Sensitive,
            program_name: None,
            title: None,
            description: None,
        }
    }
}

/// Metadata and accessors for one bindable field.
pub struct ArgumentDescriptor<T> {
    /// Primary name, unique within the schema.
    pub name: String,
    /// Alternate names, unique within the schema.
    pub aliases: Vec<String>,
    pub required: bool,
    /// Placeholder shown in usage (`<hint>`); empty means "use the name".
    pub usage_hint: String,
    pub description: Option<String>,
    pub show_in_usage: ShowInUsage,
    /// Render the default value in help text.
    pub show_default: bool,
    /// Include the field in saved settings.
    pub allow_save: bool,
    /// Value read from the prototype when the schema was built.
    pub default_value: Value,
    pub value_type: ValueType,
    pub validators: Vec<Box<dyn FieldValidator>>,
    /// Member of the positional-default group.
    pub positional: bool,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> ArgumentDescriptor<T> {
    /// Reads the field's current value from `target`.
    pub fn get(&self, target: &T) -> Value {
        (self.getter)(target)
    }

    /// Writes `value` into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when the setter rejects the value's shape.
    pub fn set(&self, target: &mut T, value: Value) -> Result<(), AccessError> {
        (self.setter)(target, value)
    }

    /// First alias if any, otherwise the name.
    pub fn identifier(&self) -> &str {
        self.aliases.first().unwrap_or(&self.name)
    }

    /// Usage placeholder, falling back to the name.
    pub fn hint(&self) -> &str {
        if self.usage_hint.is_empty() {
            &self.name
        } else {
            &self.usage_hint
        }
    }

    /// Resolves the tri-state usage flag.
    pub fn shown_in_usage(&self) -> bool {
        match self.show_in_usage {
            ShowInUsage::Default => self.required,
            ShowInUsage::True => true,
            ShowInUsage::False => false,
        }
    }

    /// Every name this field answers to, primary name first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl<T> fmt::Debug for ArgumentDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("required", &self.required)
            .field("value_type", &self.value_type)
            .field("default_value", &self.default_value)
            .field("positional", &self.positional)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

/// Immutable set of descriptors plus the name/alias index.
pub struct ArgumentSchema<T> {
    descriptors: Vec<ArgumentDescriptor<T>>,
    index: HashMap<String, usize>,
    positional: Vec<usize>,
    options: SchemaOptions,
    type_name: String,
}

impl<T> ArgumentSchema<T> {
    pub fn descriptors(&self) -> &[ArgumentDescriptor<T>] {
        &self.descriptors
    }

    pub fn descriptor(&self, index: usize) -> Option<&ArgumentDescriptor<T>> {
        self.descriptors.get(index)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Exact lookup by name or alias under the schema's case rule.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&self.options.case_rule.fold(name)).copied()
    }

    /// Exact lookup by name or alias under the schema's case rule.
    pub fn get(&self, name: &str) -> Option<&ArgumentDescriptor<T>> {
        self.index_of(name).and_then(|i| self.descriptors.get(i))
    }

    /// Indices of the positional-default group, in binding order.
    pub fn positional(&self) -> &[usize] {
        &self.positional
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn case_rule(&self) -> CaseRule {
        self.options.case_rule
    }

    /// Type name recorded in saved settings documents.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl<T> fmt::Debug for ArgumentSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSchema")
            .field("type_name", &self.type_name)
            .field("descriptors", &self.descriptors)
            .field("positional", &self.positional)
            .field("options", &self.options)
            .finish()
    }
}

/// A field declaration inside a [`SchemaBuilder`].
///
/// Returned by [`SchemaBuilder::field`]; every method chains.
pub struct FieldSpec<T> {
    name: String,
    aliases: Vec<String>,
    required: bool,
    usage_hint: String,
    description: Option<String>,
    show_in_usage: ShowInUsage,
    show_default: bool,
    allow_save: bool,
    positional: bool,
    default_value: Option<Value>,
    value_type: ValueType,
    validators: Vec<Box<dyn FieldValidator>>,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T> FieldSpec<T> {
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<S: Into<String>>(&mut self, aliases: impl IntoIterator<Item = S>) -> &mut Self {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    pub fn usage(&mut self, hint: impl Into<String>) -> &mut Self {
        self.usage_hint = hint.into();
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn show_in_usage(&mut self, show: ShowInUsage) -> &mut Self {
        self.show_in_usage = show;
        self
    }

    /// Omits the `Default:` line from help text.
    pub fn hide_default(&mut self) -> &mut Self {
        self.show_default = false;
        self
    }

    /// Excludes the field from saved settings.
    pub fn no_save(&mut self) -> &mut Self {
        self.allow_save = false;
        self
    }

    /// Adds the field to the positional-default group, in declaration order.
    pub fn positional(&mut self) -> &mut Self {
        self.positional = true;
        self
    }

    /// Documented default, used instead of the prototype's value.
    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validator(&mut self, validator: impl FieldValidator + 'static) -> &mut Self {
        self.validators.push(Box::new(validator));
        self
    }
}

/// Registration step producing an [`ArgumentSchema`].
pub struct SchemaBuilder<T> {
    fields: Vec<FieldSpec<T>>,
    positional_order: Option<Vec<String>>,
    options: SchemaOptions,
    type_name: String,
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SchemaBuilder<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            positional_order: None,
            options: SchemaOptions::default(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub fn options(&mut self, options: SchemaOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.options.prefix = prefix.into();
        self
    }

    pub fn assignment_delimiters(&mut self, delimiters: impl IntoIterator<Item = char>) -> &mut Self {
        self.options.assignment_delimiters = delimiters.into_iter().collect();
        self
    }

    pub fn case_rule(&mut self, rule: CaseRule) -> &mut Self {
        self.options.case_rule = rule;
        self
    }

    pub fn program_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.options.program_name = Some(name.into());
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.options.description = Some(description.into());
        self
    }

    /// Overrides the type name written to saved settings.
    pub fn type_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.type_name = name.into();
        self
    }

    /// Sets an explicit positional-default group, in binding order.
    pub fn positional_order<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) -> &mut Self {
        self.positional_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declares a field with its accessor pair.
    pub fn field<G, S>(
        &mut self,
        name: impl Into<String>,
        value_type: ValueType,
        getter: G,
        setter: S,
    ) -> &mut FieldSpec<T>
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
        S: Fn(&mut T, Value) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        let position = self.fields.len();
        self.fields.push(FieldSpec {
            name: name.into(),
            aliases: Vec::new(),
            required: false,
            usage_hint: String::new(),
            description: None,
            show_in_usage: ShowInUsage::Default,
            show_default: true,
            allow_save: true,
            positional: false,
            default_value: None,
            value_type,
            validators: Vec::new(),
            getter: Box::new(getter),
            setter: Box::new(setter),
        });
        &mut self.fields[position]
    }

    /// Builds the schema, capturing defaults from `prototype`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on an empty prefix, an empty or duplicate
    /// name/alias, or an invalid positional group.
    pub fn build(self, prototype: &T) -> Result<ArgumentSchema<T>, SchemaError> {
        if self.options.prefix.is_empty() {
            return Err(SchemaError::EmptyPrefix);
        }

        let case_rule = self.options.case_rule;
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut descriptors: Vec<ArgumentDescriptor<T>> = Vec::with_capacity(self.fields.len());

        for (position, field) in self.fields.into_iter().enumerate() {
            for name in std::iter::once(&field.name).chain(field.aliases.iter()) {
                if name.trim().is_empty() {
                    return Err(SchemaError::EmptyName);
                }
                let key = case_rule.fold(name);
                if let Some(&existing) = index.get(&key) {
                    let existing = descriptors
                        .get(existing)
                        .map_or_else(|| field.name.clone(), |d| d.name.clone());
                    return Err(SchemaError::DuplicateName {
                        name: name.clone(),
                        existing,
                    });
                }
                index.insert(key, position);
            }

            let default_value = match field.default_value {
                Some(value) => value,
                None => (field.getter)(prototype),
            };
            descriptors.push(ArgumentDescriptor {
                name: field.name,
                aliases: field.aliases,
                required: field.required,
                usage_hint: field.usage_hint,
                description: field.description,
                show_in_usage: field.show_in_usage,
                show_default: field.show_default,
                allow_save: field.allow_save,
                default_value,
                value_type: field.value_type,
                validators: field.validators,
                positional: field.positional,
                getter: field.getter,
                setter: field.setter,
            });
        }

        let marked: Vec<usize> = descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.positional)
            .map(|(i, _)| i)
            .collect();

        let positional = match self.positional_order {
            Some(order) => {
                if !marked.is_empty() {
                    return Err(SchemaError::ConflictingPositionalGroup);
                }
                let mut group = Vec::with_capacity(order.len());
                for name in order {
                    let Some(&i) = index.get(&case_rule.fold(&name)) else {
                        return Err(SchemaError::UnknownPositional(name));
                    };
                    if !group.contains(&i) {
                        group.push(i);
                    }
                }
                for &i in &group {
                    descriptors[i].positional = true;
                }
                group
            }
            None => marked,
        };

        debug!(
            type_name = %self.type_name,
            fields = descriptors.len(),
            positional = positional.len(),
            "Built argument schema"
        );

        Ok(ArgumentSchema {
            descriptors,
            index,
            positional,
            options: self.options,
            type_name: self.type_name,
        })
    }
}

impl SchemaBuilder<ValueMap> {
    /// Declares a field stored under `name` in a [`ValueMap`].
    ///
    /// # Examples
    ///
    /// ```
    /// use argbind_core::{SchemaBuilder, Value, ValueMap, ValueType};
    ///
    /// let mut builder = SchemaBuilder::<ValueMap>::new();
    /// builder.entry("Port", ValueType::integer()).alias("p");
    ///
    /// let mut prototype = ValueMap::new();
    /// prototype.insert("Port", 8080);
    /// let schema = builder.build(&prototype).unwrap();
    /// assert_eq!(schema.get("p").unwrap().default_value, Value::from(8080));
    /// ```
    pub fn entry(&mut self, name: impl Into<String>, value_type: ValueType) -> &mut FieldSpec<ValueMap> {
        let name = name.into();
        let key = name.clone();
        let get_key = name.clone();
        self.field(
            name,
            value_type,
            move |map: &ValueMap| map.get(&get_key).clone(),
            move |map: &mut ValueMap, value| {
                // Null means unset, matching a key the prototype never had.
                if value.is_null() {
                    map.remove(&key);
                } else {
                    map.insert(key.clone(), value);
                }
                Ok(())
            },
        )
    }
}

/// A configuration type that knows how to describe its own fields.
///
/// Implementors are plain structs; no base type is required. The registry
/// builds the schema from `Self::default()` as the prototype.
pub trait Configuration: Default + Send + Sync + 'static {
    /// Registers every bindable field.
    fn describe(builder: &mut SchemaBuilder<Self>);
}
