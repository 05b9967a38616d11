use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

use super::pattern::{redact_node, PatternRedactor};
use super::{CheckScope, FilterAction, PiiData, FILTERED};

/// Dotted quads. Candidates are confirmed with `Ipv4Addr` so `999.1.1.1`
/// and version strings with out-of-range octets survive.
static IPV4_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ipv4 pattern should compile")
});

/// Maximal runs of hex digits, colons and dots containing at least one colon.
/// Addresses inside a run are confirmed with `Ipv6Addr`, which accepts full,
/// abbreviated and IPv4-suffixed forms; spans glued to identifiers
/// (`std::io`) are skipped.
static IPV6_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f:.]*:[0-9a-f:.]*").expect("ipv6 pattern should compile")
});

/// Replace every span that `spans` proposes inside a candidate, skipping
/// spans glued to surrounding word characters or overlapping an earlier
/// replacement. Span offsets are relative to the candidate.
fn replace_valid<'a>(
    pattern: &Regex,
    input: &'a str,
    replacement: &str,
    spans: impl Fn(&str) -> Vec<Range<usize>>,
) -> Cow<'a, str> {
    let mut output = String::new();
    let mut last = 0;
    let mut changed = false;
    for candidate in pattern.find_iter(input) {
        for span in spans(candidate.as_str()) {
            let (start, end) = (candidate.start() + span.start, candidate.start() + span.end);
            if start < last || !standalone(input, start, end) {
                continue;
            }
            output.push_str(&input[last..start]);
            output.push_str(replacement);
            last = end;
            changed = true;
        }
    }
    if !changed {
        return Cow::Borrowed(input);
    }
    output.push_str(&input[last..]);
    Cow::Owned(output)
}

fn standalone(input: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before = input[..start].chars().next_back();
    let after = input[end..].chars().next();
    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}

fn ipv4_spans(candidate: &str) -> Vec<Range<usize>> {
    match candidate.parse::<Ipv4Addr>() {
        Ok(_) => vec![0..candidate.len()],
        Err(_) => Vec::new(),
    }
}

/// For every place an address may begin (the run start, or just after a
/// single `:`), the longest prefix that parses as IPv6. Prefixes end at the
/// run end or before a `:` or `.`, so `fe80::1:` and `::1.` keep their
/// trailing punctuation. Runs are ASCII, so byte offsets are char offsets.
fn ipv6_spans(run: &str) -> Vec<Range<usize>> {
    let bytes = run.as_bytes();
    (0..bytes.len())
        .filter(|&start| {
            start == 0
                || (bytes[start - 1] == b':'
                    && bytes[start] != b':'
                    && (start < 2 || bytes[start - 2] != b':'))
        })
        .filter_map(|start| {
            let ends = (start + 1..bytes.len())
                .filter(|&end| matches!(bytes[end], b':' | b'.'))
                .chain(std::iter::once(bytes.len()));
            ends.filter(|&end| is_ipv6(&run[start..end]))
                .max()
                .map(|end| start..end)
        })
        .collect()
}

/// A bare `::` carries no address and is never redacted.
fn is_ipv6(span: &str) -> bool {
    span.bytes().any(|b| b.is_ascii_hexdigit()) && span.parse::<Ipv6Addr>().is_ok()
}

/// Redacts IPv4 addresses inside string values.
pub struct Ipv4Filter {
    scope: CheckScope,
}

impl Ipv4Filter {
    pub fn new(scope: CheckScope) -> Self {
        Self { scope }
    }
}

impl PatternRedactor for Ipv4Filter {
    fn scope(&self) -> CheckScope {
        self.scope
    }

    fn replacement(&self) -> &str {
        FILTERED
    }

    fn matches_key(&self, key: &str) -> bool {
        matches!(self.redact_str(key), Cow::Owned(_))
    }

    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        replace_valid(&IPV4_CANDIDATE, input, FILTERED, ipv4_spans)
    }
}

impl FilterAction for Ipv4Filter {
    fn execute(&self, value: &mut PiiData, _depth: usize) -> Result<()> {
        redact_node(self, value);
        Ok(())
    }

    fn name(&self) -> &str {
        "ipv4"
    }
}

/// Redacts IPv6 addresses inside string values.
pub struct Ipv6Filter {
    scope: CheckScope,
}

impl Ipv6Filter {
    pub fn new(scope: CheckScope) -> Self {
        Self { scope }
    }
}

impl PatternRedactor for Ipv6Filter {
    fn scope(&self) -> CheckScope {
        self.scope
    }

    fn replacement(&self) -> &str {
        FILTERED
    }

    fn matches_key(&self, key: &str) -> bool {
        matches!(self.redact_str(key), Cow::Owned(_))
    }

    fn redact_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        replace_valid(&IPV6_CANDIDATE, input, FILTERED, ipv6_spans)
    }
}

impl FilterAction for Ipv6Filter {
    fn execute(&self, value: &mut PiiData, _depth: usize) -> Result<()> {
        redact_node(self, value);
        Ok(())
    }

    fn name(&self) -> &str {
        "ipv6"
    }
}
