//! Query-string initialization (`key=value&key2=value2`).
//!
//! Keys are looked up directly in the schema index by exact name or alias;
//! the prefix and unique-prefix rules of the command line do not apply.

use tracing::debug;

use crate::schema::ArgumentSchema;
use crate::tokenize::Segment;

/// Decodes `query` into one segment per addressed descriptor.
///
/// Repeated keys accumulate into the same run, in order of first
/// appearance. Empty values contribute no token, so `flag` and `flag=` both
/// bind a boolean to `true`. Unknown keys are skipped.
///
/// # Examples
///
/// ```
/// use argbind_core::{query_segments, ScalarType, SchemaBuilder, ValueMap, ValueType};
///
/// let mut builder = SchemaBuilder::<ValueMap>::new();
/// builder.entry("name", ValueType::string());
/// builder.entry("tag", ValueType::array(ScalarType::String));
/// let schema = builder.build(&ValueMap::new()).unwrap();
///
/// let segments = query_segments(&schema, "?tag=a&name=hello%20world&tag=b&other=1");
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].values, vec!["a", "b"]);
/// assert_eq!(segments[1].values, vec!["hello world"]);
/// ```
pub fn query_segments<T>(schema: &ArgumentSchema<T>, query: &str) -> Vec<Segment> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut segments: Vec<Segment> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some(descriptor) = schema.index_of(&key) else {
            debug!(key = %key, "Skipping unknown query key");
            continue;
        };
        let position = match segments.iter().position(|s| s.descriptor == descriptor) {
            Some(position) => position,
            None => {
                segments.push(Segment {
                    descriptor,
                    values: Vec::new(),
                    negated: false,
                    positional: false,
                });
                segments.len() - 1
            }
        };
        if !value.is_empty() {
            segments[position].values.push(value.into_owned());
        }
    }

    segments
}
