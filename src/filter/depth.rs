use crate::error::Result;

use super::{FilterAction, PiiData, TRUNCATED};

/// Collapses containers at or below the depth budget.
///
/// At `depth >= max_depth` every immediate child of an object or array is
/// replaced with [`TRUNCATED`]; the container itself survives so callers can
/// still see which keys were present. Shallower nodes pass through.
pub struct DepthFilter {
    max_depth: usize,
}

impl DepthFilter {
    pub const DEFAULT_MAX_DEPTH: usize = 3;

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for DepthFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DEPTH)
    }
}

impl FilterAction for DepthFilter {
    fn execute(&self, value: &mut PiiData, depth: usize) -> Result<()> {
        if depth < self.max_depth {
            return Ok(());
        }
        match value {
            PiiData::Object(map) => {
                for child in map.values_mut() {
                    *child = PiiData::String(TRUNCATED.to_string());
                }
            }
            PiiData::Array(items) => {
                for child in items.iter_mut() {
                    *child = PiiData::String(TRUNCATED.to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "depth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncates_children_at_limit() {
        let filter = DepthFilter::new(3);
        let mut value = json!({"a": {"b": 1}, "c": "x", "d": [1, 2]});
        filter.execute(&mut value, 3).unwrap();
        assert_eq!(
            value,
            json!({"a": "[Truncated]", "c": "[Truncated]", "d": "[Truncated]"})
        );
    }

    #[test]
    fn test_passes_through_above_limit() {
        let filter = DepthFilter::new(3);
        let original = json!({"a": {"b": 1}});
        let mut value = original.clone();
        filter.execute(&mut value, 2).unwrap();
        assert_eq!(value, original);
    }

    #[test]
    fn test_truncates_array_children() {
        let filter = DepthFilter::default();
        let mut value = json!([{"x": 1}, "y"]);
        filter.execute(&mut value, 4).unwrap();
        assert_eq!(value, json!(["[Truncated]", "[Truncated]"]));
    }

    #[test]
    fn test_leaves_scalars_alone() {
        let filter = DepthFilter::new(1);
        let mut value = json!("deep string");
        filter.execute(&mut value, 10).unwrap();
        assert_eq!(value, json!("deep string"));

        let mut null = PiiData::Null;
        filter.execute(&mut null, 10).unwrap();
        assert!(null.is_null());
    }
}
