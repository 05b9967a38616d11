use std::sync::Arc;

use crate::filter::{common_actions, DepthFilter, FilterAction, FilterLogger, PiiData, TracingLogger};

use super::schema::{FieldPath, FieldSchema, Segment::Key};
use super::{FilterPipeline, PayloadFilter};

/// Only the message body is filtered; queue metadata passes through.
pub const SQS_MESSAGE_ROOTS: &[FieldPath] = &[&[Key("Body")]];

const SQS_MESSAGE_SCHEMA: FieldSchema = FieldSchema::new(SQS_MESSAGE_ROOTS);

/// Sanitizes queue messages shaped like `{"Body": "...", ...}`.
pub struct SqsMessageFilter {
    pipeline: FilterPipeline,
}

impl SqsMessageFilter {
    pub fn new(actions: Vec<Box<dyn FilterAction>>, logger: Arc<dyn FilterLogger>) -> Self {
        Self {
            pipeline: FilterPipeline::new(actions, logger),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            common_actions(DepthFilter::DEFAULT_MAX_DEPTH),
            Arc::new(TracingLogger),
        )
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn filter_in_place(&self, message: &mut PiiData) {
        SQS_MESSAGE_SCHEMA.apply(&self.pipeline, message);
    }
}

impl PayloadFilter for SqsMessageFilter {
    fn filter(&self, mut message: PiiData) -> PiiData {
        self.filter_in_place(&mut message);
        message
    }
}
