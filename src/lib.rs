//! Recursive PII redaction for error-telemetry events and queue messages.
//!
//! - `filter` - single redaction rules and the standard action catalog
//! - `pipeline` - the recursive walker plus event and queue specializations
//! - `prune` - debounced background pruning of expired tokens
//! - `config` - YAML configuration
//! - `metrics` - counter sink used by background tasks
//! - `cli` - the `pii-filter` command line front end

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod prune;

pub use error::{PiiError, Result};
pub use filter::{CheckScope, FilterAction, FilterLogger, PiiData, FILTERED, TRUNCATED};
pub use pipeline::{FilterPipeline, PayloadFilter, SentryPiiFilter, SqsMessageFilter};
pub use prune::{PruneState, TokenPruner, TokenStore};
