use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::error::Result;

use super::credentials::{decode_for_display, parse_url};
use super::pattern::{redact_node, PatternRedactor};
use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// RFC 5322 style `local@domain`, approximated.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*")
        .expect("email pattern should compile")
});

/// Redacts email addresses.
///
/// Strings that are URLs get their query and path checked after
/// percent-decoding: a query carrying an address collapses into a single
/// marker, path segments are rewritten one by one. Plain substring
/// replacement always runs as well.
pub struct EmailFilter {
    scope: CheckScope,
    replacement: String,
}

impl EmailFilter {
    pub fn new(scope: CheckScope) -> Self {
        Self {
            scope,
            replacement: FILTERED.to_string(),
        }
    }

    pub fn with_replacement(mut self, replacement: &str) -> Self {
        self.replacement = replacement.to_string();
        self
    }

    fn replace_plain<'a>(&self, input: &'a str) -> Cow<'a, str> {
        EMAIL_PATTERN.replace_all(input, NoExpand(&self.replacement))
    }

    /// Rebuilt, display-decoded URL when its query or path held an address.
    fn redact_url(&self, input: &str) -> Option<String> {
        let mut url = parse_url(input)?;
        let mut changed = false;

        let query = url.query().map(decode_for_display);
        if query.is_some_and(|q| EMAIL_PATTERN.is_match(&q)) {
            url.set_query(Some(&self.replacement));
            changed = true;
        }

        let path = decode_for_display(url.path());
        if EMAIL_PATTERN.is_match(&path) {
            let segments: Vec<Cow<'_, str>> =
                path.split('/').map(|s| self.replace_plain(s)).collect();
            url.set_path(&segments.join("/"));
            changed = true;
        }

        changed.then(|| decode_for_display(url.as_str()))
    }
}

impl PatternRedactor for EmailFilter {
    fn scope(&self) -> CheckScope {
        self.scope
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }

    fn matches_key(&self, key: &str) -> bool {
        EMAIL_PATTERN.is_match(key)
    }

    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self.redact_url(input) {
            Some(rebuilt) => Cow::Owned(self.replace_plain(&rebuilt).into_owned()),
            None => self.replace_plain(input),
        }
    }
}

impl FilterAction for EmailFilter {
    fn execute(&self, value: &mut PiiData, _depth: usize) -> Result<()> {
        redact_node(self, value);
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}
