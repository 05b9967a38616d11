use std::sync::Arc;

use crate::filter::{common_actions, FilterAction, FilterLogger, PiiData, TracingLogger};

use super::schema::{FieldPath, FieldSchema, Segment::Each, Segment::Key};
use super::{FilterPipeline, PayloadFilter};

/// Parts of an error-telemetry event that may carry PII. Each root gets its
/// own depth budget. `type`, `spans`, `measurements`, `debug_meta`,
/// `sdkProcessingMetadata` and every other field pass through untouched.
pub const SENTRY_EVENT_ROOTS: &[FieldPath] = &[
    &[Key("message")],
    &[Key("breadcrumbs"), Each, Key("message")],
    &[Key("breadcrumbs"), Each, Key("data")],
    &[Key("request"), Key("url")],
    &[Key("request"), Key("query_string")],
    &[Key("request"), Key("cookies")],
    &[Key("request"), Key("env")],
    &[Key("request"), Key("headers")],
    &[Key("request"), Key("data")],
    &[Key("exception"), Key("values"), Each, Key("value")],
    &[Key("extra")],
    &[Key("user")],
];

const SENTRY_EVENT_SCHEMA: FieldSchema = FieldSchema::new(SENTRY_EVENT_ROOTS);

/// Sanitizes error-telemetry events before they leave the process.
pub struct SentryPiiFilter {
    pipeline: FilterPipeline,
}

impl SentryPiiFilter {
    /// Depth budget of the standard event action list.
    pub const MAX_DEPTH: usize = 5;

    pub fn new(actions: Vec<Box<dyn FilterAction>>, logger: Arc<dyn FilterLogger>) -> Self {
        Self {
            pipeline: FilterPipeline::new(actions, logger),
        }
    }

    /// The standard catalog with a depth budget of [`Self::MAX_DEPTH`].
    pub fn with_defaults() -> Self {
        Self::new(common_actions(Self::MAX_DEPTH), Arc::new(TracingLogger))
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn filter_in_place(&self, event: &mut PiiData) {
        SENTRY_EVENT_SCHEMA.apply(&self.pipeline, event);
    }
}

impl PayloadFilter for SentryPiiFilter {
    fn filter(&self, mut event: PiiData) -> PiiData {
        self.filter_in_place(&mut event);
        event
    }
}
