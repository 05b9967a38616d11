//! Filter actions: single, composable redaction rules.
//!
//! An action inspects one node of a payload and rewrites it in place. Actions
//! never recurse on their own; [`crate::pipeline::FilterPipeline`] walks the
//! tree and invokes every action at every node with the node's depth.

pub mod credentials;
pub mod depth;
pub mod email;
pub mod ip;
pub mod keys;
pub mod pattern;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::error::{PiiError, Result};

pub use credentials::UrlCredentialsFilter;
pub use depth::DepthFilter;
pub use email::EmailFilter;
pub use ip::{Ipv4Filter, Ipv6Filter};
pub use keys::PiiKeysFilter;
pub use pattern::RegexFilter;
pub use token::TokenFilter;

/// The universal payload type walked by every filter.
pub type PiiData = serde_json::Value;

/// Substituted for a value that matched a PII pattern.
pub const FILTERED: &str = "[Filtered]";

/// Substituted for every child of a container sitting at the depth limit.
pub const TRUNCATED: &str = "[Truncated]";

/// Which parts of an object an action inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckScope {
    Keys,
    Values,
    Both,
}

impl CheckScope {
    pub fn keys(self) -> bool {
        matches!(self, CheckScope::Keys | CheckScope::Both)
    }

    pub fn values(self) -> bool {
        matches!(self, CheckScope::Values | CheckScope::Both)
    }
}

/// A single redaction rule.
///
/// Implementations hold no per-call state, so one instance can be shared by
/// any number of concurrent filter calls on different payloads.
pub trait FilterAction: Send + Sync {
    /// Inspect `value`, found at `depth` (1 for the root of a filtered field),
    /// and redact it in place. On error the value must be left untouched.
    fn execute(&self, value: &mut PiiData, depth: usize) -> Result<()>;

    /// Name of this action (for logging).
    fn name(&self) -> &str;
}

/// Receives failures raised by individual actions during a filter pass.
pub trait FilterLogger: Send + Sync {
    fn error(&self, label: &str, err: &PiiError);
}

/// Default logger: forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl FilterLogger for TracingLogger {
    fn error(&self, label: &str, err: &PiiError) {
        tracing::error!(action = label, error = %err, "pii filter action failed");
    }
}

/// The standard catalog in its canonical order. The depth limiter runs first
/// so the pattern actions never look at truncated subtrees.
pub fn common_actions(max_depth: usize) -> Vec<Box<dyn FilterAction>> {
    vec![
        Box::new(DepthFilter::new(max_depth)),
        Box::new(UrlCredentialsFilter::new()),
        Box::new(EmailFilter::new(CheckScope::Values)),
        Box::new(PiiKeysFilter::new()),
        Box::new(TokenFilter::new(CheckScope::Values)),
        Box::new(Ipv4Filter::new(CheckScope::Values)),
        Box::new(Ipv6Filter::new(CheckScope::Values)),
    ]
}
