use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

use super::pattern::RegexFilter;
use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// Key names whose values are always personal data, whatever their content.
static PII_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:oidc-.*|remote-groups|uid|email(?:_.*)?|ip(?:_.*)?|user(?:[_-]?(?:id|name))?)$",
    )
    .expect("pii key pattern should compile")
});

/// Replaces the entire value stored under a known-sensitive key.
///
/// Keys scope only: the content of values is never inspected.
pub struct PiiKeysFilter {
    inner: RegexFilter,
}

impl PiiKeysFilter {
    pub fn new() -> Self {
        Self {
            inner: RegexFilter::from_regex(
                "pii-keys",
                PII_KEY_PATTERN.clone(),
                CheckScope::Keys,
                FILTERED,
            ),
        }
    }
}

impl Default for PiiKeysFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterAction for PiiKeysFilter {
    fn execute(&self, value: &mut PiiData, depth: usize) -> Result<()> {
        self.inner.execute(value, depth)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
