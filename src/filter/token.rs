use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

use super::pattern::RegexFilter;
use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// Hex runs of 32+ characters: hex-encoded uids, session tokens, OAuth codes.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-fA-F0-9]{32,}").expect("token pattern should compile")
});

/// Redacts long hex tokens anywhere inside string values.
pub struct TokenFilter {
    inner: RegexFilter,
}

impl TokenFilter {
    pub fn new(scope: CheckScope) -> Self {
        Self {
            inner: RegexFilter::from_regex("token", TOKEN_PATTERN.clone(), scope, FILTERED),
        }
    }
}

impl FilterAction for TokenFilter {
    fn execute(&self, value: &mut PiiData, depth: usize) -> Result<()> {
        self.inner.execute(value, depth)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
