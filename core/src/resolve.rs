//! Name resolution against a schema: exact match, then unique prefix.

use crate::error::ParseError;
use crate::schema::ArgumentSchema;

/// Resolves name segments to descriptor indices.
///
/// # Examples
///
/// ```
/// use argbind_core::{NameResolver, SchemaBuilder, ValueMap, ValueType};
///
/// let mut builder = SchemaBuilder::<ValueMap>::new();
/// builder.entry("Hello", ValueType::string());
/// builder.entry("Help", ValueType::bool());
/// builder.entry("World", ValueType::string()).alias("Wide");
/// let schema = builder.build(&ValueMap::new()).unwrap();
///
/// let resolver = NameResolver::new(&schema);
/// assert_eq!(resolver.resolve("Hell").unwrap(), Some(0));
/// assert_eq!(resolver.resolve("Wi").unwrap(), Some(2));
/// assert!(resolver.resolve("Hel").is_err());
/// assert_eq!(resolver.resolve("Nope").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct NameResolver<'a, T> {
    schema: &'a ArgumentSchema<T>,
}

impl<'a, T> NameResolver<'a, T> {
    pub fn new(schema: &'a ArgumentSchema<T>) -> Self {
        Self { schema }
    }

    /// Resolves `token` (prefix already stripped).
    ///
    /// Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::AmbiguousName`] when `token` is a prefix of the
    /// names or aliases of more than one descriptor.
    pub fn resolve(&self, token: &str) -> Result<Option<usize>, ParseError> {
        if let Some(index) = self.schema.index_of(token) {
            return Ok(Some(index));
        }
        if token.is_empty() {
            return Ok(None);
        }

        let case_rule = self.schema.case_rule();
        let folded = case_rule.fold(token);
        let matches: Vec<usize> = self
            .schema
            .descriptors()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.names().any(|name| case_rule.fold(name).starts_with(&folded)))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(ParseError::AmbiguousName {
                token: token.to_string(),
                candidates: matches
                    .iter()
                    .filter_map(|&i| self.schema.descriptor(i))
                    .map(|d| d.name.clone())
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CaseRule, SchemaBuilder};
    use crate::value::{ValueMap, ValueType};

    fn schema(case_rule: CaseRule) -> ArgumentSchema<ValueMap> {
        let mut builder = SchemaBuilder::<ValueMap>::new();
        builder.case_rule(case_rule);
        builder.entry("Hello", ValueType::string()).alias("greet");
        builder.entry("Help", ValueType::bool()).alias("h");
        builder.entry("Output", ValueType::string()).alias("o");
        builder.build(&ValueMap::new()).unwrap()
    }

    #[test]
    fn test_exact_name_and_alias_resolve_to_same_descriptor() {
        let schema = schema(CaseRule::Sensitive);
        let resolver = NameResolver::new(&schema);
        assert_eq!(resolver.resolve("Hello").unwrap(), Some(0));
        assert_eq!(resolver.resolve("greet").unwrap(), Some(0));
    }

    #[test]
    fn test_exact_match_wins_over_prefix() {
        // "h" also prefixes "Hello" and "Help".
        let schema = schema(CaseRule::AsciiInsensitive);
        let resolver = NameResolver::new(&schema);
        assert_eq!(resolver.resolve("h").unwrap(), Some(1));
    }

    #[test]
    fn test_unique_prefix_resolves() {
        let schema = schema(CaseRule::Sensitive);
        let resolver = NameResolver::new(&schema);
        assert_eq!(resolver.resolve("Hell").unwrap(), Some(0));
        assert_eq!(resolver.resolve("Out").unwrap(), Some(2));
        assert_eq!(resolver.resolve("gr").unwrap(), Some(0));
    }

    #[test]
    fn test_ambiguous_prefix_lists_candidates() {
        let schema = schema(CaseRule::Sensitive);
        let resolver = NameResolver::new(&schema);
        let err = resolver.resolve("He").unwrap_err();
        assert_eq!(
            err,
            ParseError::AmbiguousName {
                token: "He".to_string(),
                candidates: vec!["Hello".to_string(), "Help".to_string()],
            }
        );
    }

    #[test]
    fn test_case_rule_applies_to_prefixes() {
        let sensitive = schema(CaseRule::Sensitive);
        assert_eq!(NameResolver::new(&sensitive).resolve("out").unwrap(), None);

        let insensitive = schema(CaseRule::Insensitive);
        assert_eq!(NameResolver::new(&insensitive).resolve("out").unwrap(), Some(2));
    }

    #[test]
    fn test_unknown_and_empty_tokens_are_not_found() {
        let schema = schema(CaseRule::Sensitive);
        let resolver = NameResolver::new(&schema);
        assert_eq!(resolver.resolve("Zed").unwrap(), None);
        assert_eq!(resolver.resolve("").unwrap(), None);
    }
}
