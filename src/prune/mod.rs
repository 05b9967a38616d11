//! Debounced background pruning of expired tokens.

pub mod store;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::metrics::MetricsSink;

pub use store::{MemoryTokenStore, PruneReport, PruneRequest, StoredToken, TokenKind, TokenStore};

pub const METRIC_START: &str = "token-pruner.start";
pub const METRIC_ERROR: &str = "token-pruner.error";
pub const METRIC_COMPLETE: &str = "token-pruner.complete";

/// Lifecycle of the pruner. Cycles `Open -> Active -> Pending -> Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneState {
    /// Ready to accept a prune.
    Open,
    /// A store call is in flight.
    Active,
    /// The call finished; waiting for the interval timer to reopen.
    Pending,
}

struct PrunerInner {
    state: PruneState,
    /// Bumped on every start and every stop so stale timers and stale
    /// completions cannot move the state.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Issues at most one prune per interval from this process.
///
/// Calls made while a prune is in flight or cooling down are dropped
/// silently. Failures are logged and counted, never returned.
pub struct TokenPruner {
    store: Arc<dyn TokenStore>,
    metrics: Arc<dyn MetricsSink>,
    prune_interval: Duration,
    /// Ages used by [`TokenPruner::prune_configured`]. Zero disables.
    max_token_age: Duration,
    max_code_age: Duration,
    inner: Arc<Mutex<PrunerInner>>,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl TokenPruner {
    pub fn new(
        store: Arc<dyn TokenStore>,
        metrics: Arc<dyn MetricsSink>,
        prune_interval: Duration,
    ) -> Self {
        Self {
            store,
            metrics,
            prune_interval,
            max_token_age: Duration::ZERO,
            max_code_age: Duration::ZERO,
            inner: Arc::new(Mutex::new(PrunerInner {
                state: PruneState::Open,
                generation: 0,
                timer: None,
            })),
        }
    }

    /// Default ages for [`TokenPruner::prune_configured`].
    pub fn with_ages(mut self, max_token_age: Duration, max_code_age: Duration) -> Self {
        self.max_token_age = max_token_age;
        self.max_code_age = max_code_age;
        self
    }

    pub fn state(&self) -> PruneState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    pub fn prune_interval(&self) -> Duration {
        self.prune_interval
    }

    /// Prune tokens older than `max_token_age` and codes older than
    /// `max_code_age`. A zero age disables that half; two zero ages make the
    /// call a no-op. Must be called from within a tokio runtime.
    pub async fn prune(&self, max_token_age: Duration, max_code_age: Duration) {
        if max_token_age.is_zero() && max_code_age.is_zero() {
            return;
        }
        let Some(generation) = self.begin() else {
            tracing::debug!("token prune already in progress, skipping");
            return;
        };

        self.metrics.increment(METRIC_START);
        let request = PruneRequest {
            now_ms: Utc::now().timestamp_millis(),
            max_token_age_ms: millis(max_token_age),
            max_code_age_ms: millis(max_code_age),
            prune_interval_ms: millis(self.prune_interval),
        };

        match self.store.prune_tokens(request).await {
            Ok(report) => {
                tracing::info!(
                    skipped = report.skipped,
                    tokens_deleted = report.tokens_deleted,
                    codes_deleted = report.codes_deleted,
                    "token prune complete"
                );
                self.metrics.increment(METRIC_COMPLETE);
            }
            Err(err) => {
                tracing::error!(error = %err, "token prune failed");
                self.metrics.increment(METRIC_ERROR);
            }
        }

        self.finish(generation);
    }

    /// [`TokenPruner::prune`] with the ages given to [`TokenPruner::with_ages`].
    pub async fn prune_configured(&self) {
        self.prune(self.max_token_age, self.max_code_age).await;
    }

    /// Cancel the reopen timer and return to `Open` immediately. Safe in any
    /// state.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.generation += 1;
        inner.state = PruneState::Open;
    }

    /// `Open -> Active`, arming the timer that reopens after the interval.
    fn begin(&self) -> Option<u64> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state != PruneState::Open {
            return None;
        }
        inner.state = PruneState::Active;
        inner.generation += 1;
        let generation = inner.generation;

        let shared = Arc::clone(&self.inner);
        let interval = self.prune_interval;
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            let mut inner = shared.lock().unwrap_or_else(|e| e.into_inner());
            if inner.generation == generation {
                inner.state = PruneState::Open;
                inner.timer = None;
            }
        }));
        Some(generation)
    }

    /// `Active -> Pending`, unless the attempt was stopped or already reopened.
    fn finish(&self, generation: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.generation == generation && inner.state == PruneState::Active {
            inner.state = PruneState::Pending;
        }
    }
}

impl Drop for TokenPruner {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }
}
