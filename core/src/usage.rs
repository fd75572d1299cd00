//! Usage synopsis and help text rendering.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! let mut builder = SchemaBuilder::<ValueMap>::new();
//! builder.program_name("copy");
//! builder.entry("Source", ValueType::string()).positional();
//! builder.entry("Output", ValueType::string()).alias("o").usage("path").required();
//! builder.entry("Force", ValueType::bool()).show_in_usage(ShowInUsage::True);
//! let schema = builder.build(&ValueMap::new()).unwrap();
//!
//! assert_eq!(usage_line(&schema), "Usage: copy <Source> /o <path> [/Force[-]]");
//! ```

use std::fmt::Write;

use crate::schema::{ArgumentDescriptor, ArgumentSchema};
use crate::validate::ValidationError;
use crate::value::Value;

/// Gap between the label column and the description column.
pub const LABEL_MARGIN: usize = 3;

const USAGE_LEAD: &str = "Usage: ";
const MIN_TEXT_WIDTH: usize = 20;

/// Layout options for [`help_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpOptions {
    /// Column at which lines wrap.
    pub width: usize,
}

impl Default for HelpOptions {
    fn default() -> Self {
        Self { width: 79 }
    }
}

fn named_item<T>(prefix: &str, descriptor: &ArgumentDescriptor<T>) -> String {
    if descriptor.value_type.is_boolean() {
        format!("{prefix}{}[-]", descriptor.identifier())
    } else {
        format!("{prefix}{} {}", descriptor.identifier(), placeholder(descriptor))
    }
}

fn placeholder<T>(descriptor: &ArgumentDescriptor<T>) -> String {
    if descriptor.value_type.is_array() {
        format!("<{}>...", descriptor.hint())
    } else {
        format!("<{}>", descriptor.hint())
    }
}

fn usage_items<T>(schema: &ArgumentSchema<T>) -> Vec<String> {
    let prefix = schema.options().prefix.as_str();
    let mut items = Vec::new();

    if let Some(program) = &schema.options().program_name {
        items.push(program.clone());
    }

    for &i in schema.positional() {
        if let Some(descriptor) = schema.descriptor(i) {
            items.push(placeholder(descriptor));
        }
    }

    let named = || schema.descriptors().iter().filter(|d| !d.positional);

    for descriptor in named().filter(|d| d.required) {
        items.push(named_item(prefix, descriptor));
    }

    for descriptor in named().filter(|d| !d.required && d.shown_in_usage()) {
        items.push(format!("[{}]", named_item(prefix, descriptor)));
    }

    items
}

/// One-line usage synopsis.
pub fn usage_line<T>(schema: &ArgumentSchema<T>) -> String {
    let items = usage_items(schema);
    if items.is_empty() {
        return USAGE_LEAD.trim_end().to_string();
    }
    format!("{USAGE_LEAD}{}", items.join(" "))
}

/// Help label: the name plus a parenthesized alias list.
fn label<T>(descriptor: &ArgumentDescriptor<T>) -> String {
    if descriptor.aliases.is_empty() {
        descriptor.name.clone()
    } else {
        format!("{} ({})", descriptor.name, descriptor.aliases.join(", "))
    }
}

fn renders_default(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Text(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Full help document: errors, title, description, usage and one block
/// per argument.
pub fn help_text<T>(
    schema: &ArgumentSchema<T>,
    errors: &[ValidationError],
    options: &HelpOptions,
) -> String {
    let width = options.width.max(MIN_TEXT_WIDTH);
    let mut out = String::new();

    if let Some((first, rest)) = errors.split_first() {
        push_lines(&mut out, &wrap(&first.message, width), "", "");
        let indent = " ".repeat(LABEL_MARGIN);
        for error in rest {
            push_lines(
                &mut out,
                &wrap(&error.message, width.saturating_sub(LABEL_MARGIN)),
                &indent,
                &indent,
            );
        }
        out.push('\n');
    }

    let about = schema.options();
    if let Some(title) = &about.title {
        let _ = writeln!(out, "{title}");
    }
    if let Some(description) = &about.description {
        push_lines(&mut out, &wrap(description, width), "", "");
    }
    if about.title.is_some() || about.description.is_some() {
        out.push('\n');
    }

    let usage = usage_items(schema).join(" ");
    let hanging = " ".repeat(USAGE_LEAD.len());
    push_lines(
        &mut out,
        &wrap(&usage, width.saturating_sub(USAGE_LEAD.len())),
        USAGE_LEAD,
        &hanging,
    );

    if schema.is_empty() {
        return out;
    }
    out.push('\n');

    let labels: Vec<String> = schema.descriptors().iter().map(label).collect();
    let column = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) + LABEL_MARGIN;
    let text_width = width.saturating_sub(column).max(MIN_TEXT_WIDTH);
    let continuation = " ".repeat(column);

    for (descriptor, label) in schema.descriptors().iter().zip(&labels) {
        let mut lines = Vec::new();
        if let Some(description) = &descriptor.description {
            lines.extend(wrap(description, text_width));
        }
        if descriptor.required {
            lines.push("REQUIRED".to_string());
        } else if descriptor.show_default && renders_default(&descriptor.default_value) {
            lines.extend(wrap(&format!("Default: {}", descriptor.default_value), text_width));
        }
        for validator in &descriptor.validators {
            if let Some(hint) = validator.hint() {
                lines.extend(wrap(&hint, text_width));
            }
        }

        let first = format!("{label:<column$}");
        if lines.is_empty() {
            let _ = writeln!(out, "{}", first.trim_end());
        } else {
            push_lines(&mut out, &lines, &first, &continuation);
        }
    }

    out
}

fn push_lines(out: &mut String, lines: &[String], first_indent: &str, indent: &str) {
    for (i, line) in lines.iter().enumerate() {
        let lead = if i == 0 { first_indent } else { indent };
        let _ = writeln!(out, "{lead}{line}");
    }
}

/// Greedy word wrap; explicit newlines start new paragraphs, and a word
/// longer than `width` gets a line of its own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }
        lines.push(line);
    }
    lines
}
