//! Declarative description of which parts of a payload get filtered.
//!
//! Each [`FieldPath`] names a filter root. Every node the path resolves to is
//! handed to the pipeline with its own depth budget starting at 1; anything
//! outside the listed paths passes through untouched.

use crate::filter::PiiData;

use super::FilterPipeline;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Descend into an object member.
    Key(&'static str),
    /// Descend into every element of an array.
    Each,
}

pub type FieldPath = &'static [Segment];

/// The set of filter roots for one payload shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    roots: &'static [FieldPath],
}

impl FieldSchema {
    pub const fn new(roots: &'static [FieldPath]) -> Self {
        Self { roots }
    }

    /// Run `pipeline` over every present, non-null root of `payload`.
    pub fn apply(&self, pipeline: &FilterPipeline, payload: &mut PiiData) {
        for path in self.roots {
            visit(payload, path, &mut |root| pipeline.apply_filters(root, 1));
        }
    }
}

/// Call `f` on each node `path` resolves to. Missing members, nulls and
/// shape mismatches are skipped, so absent fields stay absent.
pub fn visit(value: &mut PiiData, path: &[Segment], f: &mut dyn FnMut(&mut PiiData)) {
    match path.split_first() {
        None => {
            if !value.is_null() {
                f(value);
            }
        }
        Some((Segment::Key(key), rest)) => {
            if let Some(child) = value.as_object_mut().and_then(|map| map.get_mut(*key)) {
                visit(child, rest, f);
            }
        }
        Some((Segment::Each, rest)) => {
            if let Some(items) = value.as_array_mut() {
                for item in items.iter_mut() {
                    visit(item, rest, f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PATHS: &[FieldPath] = &[
        &[Segment::Key("a"), Segment::Each, Segment::Key("b")],
        &[Segment::Key("missing")],
    ];

    #[test]
    fn test_visit_resolves_each() {
        let mut value = json!({"a": [{"b": 1}, {"c": 2}, {"b": null}, {"b": 3}]});
        let mut seen = Vec::new();
        visit(&mut value, PATHS[0], &mut |node| seen.push(node.clone()));
        assert_eq!(seen, vec![json!(1), json!(3)]);
    }

    #[test]
    fn test_visit_skips_shape_mismatch() {
        let mut value = json!({"a": {"b": 1}});
        let mut count = 0;
        visit(&mut value, PATHS[0], &mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_apply_leaves_absent_fields_absent() {
        let schema = FieldSchema::new(PATHS);
        let pipeline = FilterPipeline::common(5);
        let mut value = json!({"other": "x@y.com"});
        schema.apply(&pipeline, &mut value);
        assert_eq!(value, json!({"other": "x@y.com"}));
    }
}
