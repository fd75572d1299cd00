//! Splits a raw argument list into resolved name/value-run segments.
//!
//! Grammar (prefix `/` shown):
//!
//! ```text
//! args     := positional? named*
//! positional := value*             (only before the first name segment)
//! named    := "/" name ["-"] value*
//!           | "/" name delim value value*   (assignment-delimiter mode)
//! value    := any token not starting with the prefix
//! ```
//!
//! Resolution happens here so that a trailing `-` can be interpreted
//! against the target's type. Binding happens later, in
//! [`ValueBinder`](crate::ValueBinder).

use tracing::debug;

use crate::error::ParseError;
use crate::resolve::NameResolver;
use crate::schema::ArgumentSchema;

/// A resolved name (or positional slot) and its value run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Index of the target descriptor.
    pub descriptor: usize,
    /// De-quoted value tokens.
    pub values: Vec<String>,
    /// Boolean negation via trailing `-`.
    pub negated: bool,
    /// Filled from the leading positional run.
    pub positional: bool,
}

/// Tokenizer over one schema's prefix and delimiter options.
#[derive(Debug)]
pub struct Tokenizer<'a, T> {
    schema: &'a ArgumentSchema<T>,
    resolver: NameResolver<'a, T>,
}

impl<'a, T> Tokenizer<'a, T> {
    pub fn new(schema: &'a ArgumentSchema<T>) -> Self {
        Self {
            schema,
            resolver: NameResolver::new(schema),
        }
    }

    fn is_name(&self, token: &str) -> bool {
        token.starts_with(self.schema.options().prefix.as_str())
    }

    /// Index one past the value run starting at `start`.
    fn run_end<S: AsRef<str>>(&self, tokens: &[S], start: usize) -> usize {
        tokens[start..]
            .iter()
            .position(|t| self.is_name(t.as_ref()))
            .map_or(tokens.len(), |offset| start + offset)
    }

    /// Splits `args` into segments in command-line order.
    ///
    /// Unknown names and stray values are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AmbiguousName`] for a name segment that is a
    /// prefix of several descriptors.
    pub fn tokenize<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<Segment>, ParseError> {
        let options = self.schema.options();
        let positional = self.schema.positional();
        let mut segments = Vec::new();
        let mut i = 0;

        if !positional.is_empty() && args.first().is_some_and(|t| !self.is_name(t.as_ref())) {
            let end = self.run_end(args, 0);
            let run: Vec<String> = args[..end].iter().map(|t| dequote(t.as_ref())).collect();
            if let [only] = positional {
                segments.push(Segment {
                    descriptor: *only,
                    values: run,
                    negated: false,
                    positional: true,
                });
            } else {
                if run.len() > positional.len() {
                    debug!(
                        discarded = run.len() - positional.len(),
                        "Dropping positional values beyond the declared slots"
                    );
                }
                for (&descriptor, value) in positional.iter().zip(run) {
                    segments.push(Segment {
                        descriptor,
                        values: vec![value],
                        negated: false,
                        positional: true,
                    });
                }
            }
            i = end;
        }

        while i < args.len() {
            let token = args[i].as_ref();
            i += 1;
            let Some(body) = token.strip_prefix(options.prefix.as_str()) else {
                debug!(token, "Skipping value outside any argument");
                continue;
            };

            let (name, inline) = split_assignment(body, &options.assignment_delimiters);

            if inline.is_none() {
                if let Some(descriptor) = self.negation_target(name)? {
                    segments.push(Segment {
                        descriptor,
                        values: Vec::new(),
                        negated: true,
                        positional: false,
                    });
                    continue;
                }
            }

            let end = self.run_end(args, i);
            let mut values: Vec<String> = inline.into_iter().collect();
            values.extend(args[i..end].iter().map(|t| dequote(t.as_ref())));
            i = end;

            match self.resolver.resolve(name)? {
                Some(descriptor) => segments.push(Segment {
                    descriptor,
                    values,
                    negated: false,
                    positional: false,
                }),
                None => debug!(name, skipped_values = values.len(), "Skipping unknown argument"),
            }
        }

        Ok(segments)
    }

    /// Boolean descriptor addressed by `name-`, if `name` has that form.
    fn negation_target(&self, name: &str) -> Result<Option<usize>, ParseError> {
        let Some(stripped) = name.strip_suffix('-') else {
            return Ok(None);
        };
        if self.schema.index_of(name).is_some() {
            return Ok(None);
        }
        let target = self.resolver.resolve(stripped)?.filter(|&i| {
            self.schema
                .descriptor(i)
                .is_some_and(|d| d.value_type.is_boolean())
        });
        Ok(target)
    }
}

/// Splits `name<delim>value` when a delimiter is configured and present.
fn split_assignment<'b>(body: &'b str, delimiters: &[char]) -> (&'b str, Option<String>) {
    if delimiters.is_empty() {
        return (body, None);
    }
    match body.find(|c: char| delimiters.contains(&c)) {
        Some(at) => {
            let delimiter_len = body[at..].chars().next().map_or(1, char::len_utf8);
            (&body[..at], Some(dequote(&body[at + delimiter_len..])))
        }
        None => (body, None),
    }
}

/// Strips one pair of matching surrounding quotes.
pub fn dequote(token: &str) -> String {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return token[1..token.len() - 1].to_string();
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use crate::value::{ScalarType, ValueMap, ValueType};

    fn builder() -> SchemaBuilder<ValueMap> {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        builder.entry("Name", ValueType::string()).alias("n");
        builder.entry("Flag", ValueType::bool()).alias("f");
        builder.entry("Strings", ValueType::array(ScalarType::String)).alias("S");
        builder
    }

    fn tokenize(schema: &ArgumentSchema<ValueMap>, args: &[&str]) -> Vec<Segment> {
        Tokenizer::new(schema).tokenize(args).unwrap()
    }

    fn named(descriptor: usize, values: &[&str]) -> Segment {
        Segment {
            descriptor,
            values: values.iter().map(|v| v.to_string()).collect(),
            negated: false,
            positional: false,
        }
    }

    #[test]
    fn test_value_run_stops_at_next_name() {
        let schema = builder().build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["/S", "a", "b", "c", "/Name", "x"]);
        assert_eq!(segments, vec![named(2, &["a", "b", "c"]), named(0, &["x"])]);
    }

    #[test]
    fn test_empty_run_is_valid() {
        let schema = builder().build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["/Flag", "/Name"]);
        assert_eq!(segments, vec![named(1, &[]), named(0, &[])]);
    }

    #[test]
    fn test_trailing_dash_negates_boolean_without_run() {
        let schema = builder().build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["/Flag-", "stray", "/n", "v"]);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].negated);
        assert!(segments[0].values.is_empty());
        assert_eq!(segments[1], named(0, &["v"]));
    }

    #[test]
    fn test_trailing_dash_on_non_boolean_is_part_of_name() {
        let schema = builder().build(&ValueMap::new()).unwrap();
        // "Name-" resolves nowhere, so the segment and its run are skipped.
        let segments = tokenize(&schema, &["/Name-", "x"]);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_unknown_names_and_stray_values_are_skipped() {
        let schema = builder().build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["loose", "/Bogus", "1", "2", "/f"]);
        assert_eq!(segments, vec![named(1, &[])]);
    }

    #[test]
    fn test_single_positional_takes_whole_run() {
        let mut builder = builder();
        builder.positional_order(["Strings"]);
        let schema = builder.build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["a", "b", "/f"]);
        assert_eq!(segments[0].values, vec!["a", "b"]);
        assert!(segments[0].positional);
        assert_eq!(segments[1], named(1, &[]));
    }

    #[test]
    fn test_multiple_positionals_take_one_each() {
        let mut builder = builder();
        builder.positional_order(["Name", "Strings"]);
        let schema = builder.build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["one", "two", "three", "four"]);
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].descriptor, segments[0].values.clone()), (0, vec!["one".to_string()]));
        assert_eq!((segments[1].descriptor, segments[1].values.clone()), (2, vec!["two".to_string()]));
    }

    #[test]
    fn test_positionals_ignored_when_first_token_is_named() {
        let mut builder = builder();
        builder.positional_order(["Name"]);
        let schema = builder.build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["/f", "x"]);
        assert_eq!(segments, vec![named(1, &["x"])]);
    }

    #[test]
    fn test_assignment_delimiter_splits_inline_value() {
        let mut builder = builder();
        builder.assignment_delimiters([':', '=']);
        let schema = builder.build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["/Name:\"a b\"", "/S=x", "y"]);
        assert_eq!(segments, vec![named(0, &["a b"]), named(2, &["x", "y"])]);
    }

    #[test]
    fn test_custom_prefix() {
        let mut builder = builder();
        builder.prefix("--");
        let schema = builder.build(&ValueMap::new()).unwrap();
        let segments = tokenize(&schema, &["--Name", "/not/a/name"]);
        assert_eq!(segments, vec![named(0, &["/not/a/name"])]);
    }

    #[test]
    fn test_ambiguous_name_propagates() {
        let mut builder = builder();
        builder.entry("Flair", ValueType::bool());
        let schema = builder.build(&ValueMap::new()).unwrap();
        let err = Tokenizer::new(&schema).tokenize(&["/Fl"]).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousName { .. }));
    }

    #[test]
    fn test_dequote() {
        assert_eq!(dequote("\"a b\""), "a b");
        assert_eq!(dequote("'x'"), "x");
        assert_eq!(dequote("\"open"), "\"open");
        assert_eq!(dequote("\""), "\"");
    }
}
