use std::borrow::Cow;

use regex::Regex;

use crate::error::{PiiError, Result};

use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// Shared contract of the pattern-based actions.
///
/// [`redact_node`] drives the per-node behaviour; implementors only decide
/// which keys match and how a single string is rewritten.
pub trait PatternRedactor {
    fn scope(&self) -> CheckScope;

    fn replacement(&self) -> &str;

    /// Whether the value stored under `key` must be replaced wholesale.
    fn matches_key(&self, key: &str) -> bool;

    /// Rewrite one string. Returns `Cow::Borrowed` when nothing matched.
    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Apply a pattern redactor to one node.
///
/// Strings are rewritten in place when values are in scope. For objects, a
/// matching key replaces the whole child regardless of its type; otherwise
/// string children are rewritten. Arrays and scalars pass through, since
/// descending is the walker's job.
pub fn redact_node<R>(redactor: &R, value: &mut PiiData)
where
    R: PatternRedactor + ?Sized,
{
    let scope = redactor.scope();
    match value {
        PiiData::String(s) if scope.values() => {
            if let Cow::Owned(redacted) = redactor.redact_str(s) {
                *s = redacted;
            }
        }
        PiiData::Object(map) => {
            for (key, child) in map.iter_mut() {
                if scope.keys() && redactor.matches_key(key) {
                    *child = PiiData::String(redactor.replacement().to_string());
                } else if scope.values() {
                    if let PiiData::String(s) = child {
                        if let Cow::Owned(redacted) = redactor.redact_str(s) {
                            *s = redacted;
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

/// A pattern action over an arbitrary regex. Also the building block for the
/// catalog's token, IP and key matchers.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    name: String,
    pattern: Regex,
    scope: CheckScope,
    replacement: String,
}

impl RegexFilter {
    /// Compile a caller-supplied pattern.
    pub fn new(pattern: &str, scope: CheckScope, replacement: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|e| PiiError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_regex("regex", compiled, scope, replacement))
    }

    pub fn from_regex(name: &str, pattern: Regex, scope: CheckScope, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern,
            scope,
            replacement: replacement.to_string(),
        }
    }

    /// Same as [`RegexFilter::new`] with the [`FILTERED`] marker.
    pub fn filtered(pattern: &str, scope: CheckScope) -> Result<Self> {
        Self::new(pattern, scope, FILTERED)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl PatternRedactor for RegexFilter {
    fn scope(&self) -> CheckScope {
        self.scope
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }

    fn matches_key(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }

    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(input, regex::NoExpand(self.replacement.as_str()))
    }
}

impl FilterAction for RegexFilter {
    fn execute(&self, value: &mut PiiData, _depth: usize) -> Result<()> {
        redact_node(self, value);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replaces_substring_in_string() {
        let filter = RegexFilter::filtered("foo", CheckScope::Values).unwrap();
        let mut value = json!("a foo and another foo.");
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!("a [Filtered] and another [Filtered]."));
    }

    #[test]
    fn test_values_scope_ignores_keys() {
        let filter = RegexFilter::filtered("foo", CheckScope::Values).unwrap();
        let mut value = json!({"foo": "bar", "baz": "foo"});
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!({"foo": "bar", "baz": "[Filtered]"}));
    }

    #[test]
    fn test_keys_scope_replaces_whole_value() {
        let filter = RegexFilter::filtered("foo", CheckScope::Keys).unwrap();
        let mut value = json!({"foo": {"nested": 1}, "bar": "foo", "n": 2});
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!({"foo": "[Filtered]", "bar": "foo", "n": 2}));
    }

    #[test]
    fn test_keys_scope_leaves_bare_string() {
        let filter = RegexFilter::filtered("foo", CheckScope::Keys).unwrap();
        let mut value = json!("foo");
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!("foo"));
    }

    #[test]
    fn test_both_scope() {
        let filter = RegexFilter::filtered("foo", CheckScope::Both).unwrap();
        let mut value = json!({"foo": 1, "bar": "xfoox"});
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!({"foo": "[Filtered]", "bar": "x[Filtered]x"}));
    }

    #[test]
    fn test_arrays_are_opaque() {
        let filter = RegexFilter::filtered("foo", CheckScope::Both).unwrap();
        let original = json!(["foo", {"foo": 1}]);
        let mut value = original.clone();
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, original);
    }

    #[test]
    fn test_replacement_is_literal() {
        let filter = RegexFilter::new("(foo)", CheckScope::Values, "$1-gone").unwrap();
        let mut value = json!("foo");
        filter.execute(&mut value, 1).unwrap();
        assert_eq!(value, json!("$1-gone"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = RegexFilter::filtered("(unclosed", CheckScope::Values).unwrap_err();
        assert!(matches!(err, PiiError::InvalidPattern { .. }));
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let filter = RegexFilter::filtered("foo", CheckScope::Values).unwrap();
        for _ in 0..3 {
            let mut value = json!("foo foo");
            filter.execute(&mut value, 1).unwrap();
            assert_eq!(value, json!("[Filtered] [Filtered]"));
        }
    }
}
