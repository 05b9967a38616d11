//! Filter pipeline: an ordered, fault-isolated sequence of filter actions
//! applied to every node of a payload.

pub mod schema;
pub mod sentry;
pub mod sqs;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{PiiError, Result};
use crate::filter::{common_actions, FilterAction, FilterLogger, PiiData, TracingLogger};

pub use schema::{FieldPath, FieldSchema, Segment};
pub use sentry::SentryPiiFilter;
pub use sqs::SqsMessageFilter;

/// Hard nesting limit of the walker, matching serde_json's parser limit.
/// Applies even when no depth-limiting action is configured.
pub const WALK_LIMIT: usize = 128;

/// Anything that sanitizes a whole payload.
pub trait PayloadFilter: Send + Sync {
    /// Take ownership of `payload`, redact it and hand it back.
    fn filter(&self, payload: PiiData) -> PiiData;
}

/// Applies its actions, in order, to every node of a payload.
///
/// A failing action is reported to the logger and skipped for the rest of the
/// pass; the other actions keep running. Nothing is ever surfaced to the
/// caller.
pub struct FilterPipeline {
    actions: Vec<Box<dyn FilterAction>>,
    logger: Arc<dyn FilterLogger>,
}

/// Per-call bookkeeping. Lives on the stack so the pipeline stays shareable.
struct FilterPass {
    quarantined: Vec<bool>,
    nodes: usize,
    failures: usize,
    limit_hit: bool,
}

impl FilterPipeline {
    pub fn new(actions: Vec<Box<dyn FilterAction>>, logger: Arc<dyn FilterLogger>) -> Self {
        Self { actions, logger }
    }

    /// Pipeline reporting failures through `tracing`.
    pub fn with_actions(actions: Vec<Box<dyn FilterAction>>) -> Self {
        Self::new(actions, Arc::new(TracingLogger))
    }

    /// The standard catalog with the given depth budget.
    pub fn common(max_depth: usize) -> Self {
        Self::with_actions(common_actions(max_depth))
    }

    /// Names of the configured actions, in execution order.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Filter a generic payload rooted at depth 1.
    pub fn filter_in_place(&self, value: &mut PiiData) {
        self.apply_filters(value, 1);
    }

    /// Run every action over `value` (found at `depth`) and then over each of
    /// its descendants at increasing depth.
    pub fn apply_filters(&self, value: &mut PiiData, depth: usize) {
        let mut pass = FilterPass {
            quarantined: vec![false; self.actions.len()],
            nodes: 0,
            failures: 0,
            limit_hit: false,
        };
        self.walk(value, depth, &mut pass);
        tracing::debug!(
            nodes = pass.nodes,
            failures = pass.failures,
            "pii filter pass complete"
        );
    }

    fn walk(&self, value: &mut PiiData, depth: usize, pass: &mut FilterPass) {
        if value.is_null() {
            return;
        }
        if depth > WALK_LIMIT {
            if !pass.limit_hit {
                pass.limit_hit = true;
                tracing::warn!(limit = WALK_LIMIT, "pii filter stopped at nesting limit");
            }
            return;
        }
        pass.nodes += 1;

        for (idx, action) in self.actions.iter().enumerate() {
            if pass.quarantined[idx] {
                continue;
            }
            if let Err(err) = execute_isolated(action.as_ref(), value, depth) {
                pass.quarantined[idx] = true;
                pass.failures += 1;
                self.logger.error(action.name(), &err);
            }
        }

        match value {
            PiiData::Object(map) => {
                for child in map.values_mut() {
                    self.walk(child, depth + 1, pass);
                }
            }
            PiiData::Array(items) => {
                for child in items.iter_mut() {
                    self.walk(child, depth + 1, pass);
                }
            }
            _ => {}
        }
    }
}

impl PayloadFilter for FilterPipeline {
    fn filter(&self, mut payload: PiiData) -> PiiData {
        self.filter_in_place(&mut payload);
        payload
    }
}

/// Run one action, turning a panic into an error.
fn execute_isolated(action: &dyn FilterAction, value: &mut PiiData, depth: usize) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| action.execute(value, depth))) {
        Ok(result) => result,
        Err(payload) => Err(PiiError::ActionPanicked {
            action: action.name().to_string(),
            reason: panic_reason(payload.as_ref()),
        }),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
