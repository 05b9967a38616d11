use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::Result;

use super::pattern::{redact_node, PatternRedactor};
use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// Parse `input` as an absolute URL with an authority.
///
/// Free text that merely starts with `word:` also parses as a URL, so only
/// whitespace-free strings with a host qualify. Anything else is "not a URL".
pub(crate) fn parse_url(input: &str) -> Option<Url> {
    if input.is_empty() || input.contains(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(input).ok()?;
    url.has_host().then_some(url)
}

/// Percent-decode a serialized URL (or one of its components) for display.
pub(crate) fn decode_for_display(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

/// Replaces the username and password embedded in URL string values.
///
/// Values only: key names are never inspected. Strings that do not parse as
/// a URL, or carry no credentials, pass through byte-for-byte.
pub struct UrlCredentialsFilter {
    replacement: String,
}

impl UrlCredentialsFilter {
    pub fn new() -> Self {
        Self {
            replacement: FILTERED.to_string(),
        }
    }

    pub fn with_replacement(mut self, replacement: &str) -> Self {
        self.replacement = replacement.to_string();
        self
    }
}

impl Default for UrlCredentialsFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRedactor for UrlCredentialsFilter {
    fn scope(&self) -> CheckScope {
        CheckScope::Values
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }

    fn matches_key(&self, _key: &str) -> bool {
        false
    }

    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let Some(mut url) = parse_url(input) else {
            return Cow::Borrowed(input);
        };
        let has_username = !url.username().is_empty();
        let has_password = url.password().is_some();
        if !has_username && !has_password {
            return Cow::Borrowed(input);
        }
        if has_username && url.set_username(&self.replacement).is_err() {
            return Cow::Borrowed(input);
        }
        if has_password && url.set_password(Some(&self.replacement)).is_err() {
            return Cow::Borrowed(input);
        }
        Cow::Owned(decode_for_display(url.as_str()))
    }
}

impl FilterAction for UrlCredentialsFilter {
    fn execute(&self, value: &mut PiiData, _depth: usize) -> Result<()> {
        redact_node(self, value);
        Ok(())
    }

    fn name(&self) -> &str {
        "url-credentials"
    }
}
