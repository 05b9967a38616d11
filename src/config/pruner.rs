use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::MetricsSink;
use crate::prune::{TokenPruner, TokenStore};

/// Token pruner settings. Ages of 0 disable that half of the prune.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrunerConfig {
    /// Minimum time between prunes. Default: one hour.
    #[serde(default = "default_prune_interval")]
    pub prune_interval_ms: u64,

    #[serde(default)]
    pub max_token_age_ms: u64,

    #[serde(default)]
    pub max_code_age_ms: u64,
}

fn default_prune_interval() -> u64 {
    3_600_000
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            prune_interval_ms: default_prune_interval(),
            max_token_age_ms: 0,
            max_code_age_ms: 0,
        }
    }
}

impl PrunerConfig {
    pub fn prune_interval(&self) -> Duration {
        Duration::from_millis(self.prune_interval_ms)
    }

    pub fn max_token_age(&self) -> Duration {
        Duration::from_millis(self.max_token_age_ms)
    }

    pub fn max_code_age(&self) -> Duration {
        Duration::from_millis(self.max_code_age_ms)
    }

    pub fn build_pruner(
        &self,
        store: Arc<dyn TokenStore>,
        metrics: Arc<dyn MetricsSink>,
    ) -> TokenPruner {
        TokenPruner::new(store, metrics, self.prune_interval())
            .with_ages(self.max_token_age(), self.max_code_age())
    }
}
