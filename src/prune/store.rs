use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{PiiError, Result};

/// Arguments of one call to the store's pruning procedure. Ages of 0 disable
/// that half of the prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneRequest {
    pub now_ms: i64,
    pub max_token_age_ms: u64,
    pub max_code_age_ms: u64,
    pub prune_interval_ms: u64,
}

/// What the procedure did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneReport {
    /// The interval had not elapsed since the last prune; nothing was deleted.
    pub skipped: bool,
    pub tokens_deleted: usize,
    pub codes_deleted: usize,
}

/// Backing store exposing the idempotent pruning procedure.
///
/// Implementations re-check the interval themselves and serialize callers
/// across process instances; the in-process pruner only avoids redundant
/// calls from one process.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn prune_tokens(&self, request: PruneRequest) -> Result<PruneReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Access and refresh tokens.
    Token,
    /// Short-lived authorization codes.
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub id: String,
    pub kind: TokenKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreState {
    tokens: Vec<StoredToken>,
    last_pruned_ms: Option<i64>,
}

/// In-process token table with the pruning procedure's semantics: a named
/// advisory lock taken with a short timeout, a server-side interval check,
/// then deletion of rows past their maximum age.
pub struct MemoryTokenStore {
    state: Mutex<StoreState>,
    lock_timeout: Duration,
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTokenStore {
    pub const LOCK_NAME: &'static str = "prune-tokens";
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub async fn insert(&self, token: StoredToken) {
        self.state.lock().await.tokens.push(token);
    }

    pub async fn tokens(&self) -> Vec<StoredToken> {
        self.state.lock().await.tokens.clone()
    }

    pub async fn last_pruned_ms(&self) -> Option<i64> {
        self.state.lock().await.last_pruned_ms
    }
}

/// Rows of `kind` older than `max_age_ms` are expired; an age of 0 keeps all.
fn expired(token: &StoredToken, kind: TokenKind, now_ms: i64, max_age_ms: u64) -> bool {
    if token.kind != kind || max_age_ms == 0 {
        return false;
    }
    let max_age = i64::try_from(max_age_ms).unwrap_or(i64::MAX);
    token.created_at.timestamp_millis() < now_ms.saturating_sub(max_age)
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn prune_tokens(&self, request: PruneRequest) -> Result<PruneReport> {
        let mut state = tokio::time::timeout(self.lock_timeout, self.state.lock())
            .await
            .map_err(|_| PiiError::LockTimeout {
                name: Self::LOCK_NAME.to_string(),
                timeout_ms: u64::try_from(self.lock_timeout.as_millis()).unwrap_or(u64::MAX),
            })?;

        if let Some(last) = state.last_pruned_ms {
            let interval = i64::try_from(request.prune_interval_ms).unwrap_or(i64::MAX);
            if request.now_ms.saturating_sub(last) < interval {
                return Ok(PruneReport {
                    skipped: true,
                    ..Default::default()
                });
            }
        }

        let before_tokens = count(&state.tokens, TokenKind::Token);
        let before_codes = count(&state.tokens, TokenKind::Code);
        state.tokens.retain(|t| {
            !expired(t, TokenKind::Token, request.now_ms, request.max_token_age_ms)
                && !expired(t, TokenKind::Code, request.now_ms, request.max_code_age_ms)
        });
        state.last_pruned_ms = Some(request.now_ms);

        Ok(PruneReport {
            skipped: false,
            tokens_deleted: before_tokens - count(&state.tokens, TokenKind::Token),
            codes_deleted: before_codes - count(&state.tokens, TokenKind::Code),
        })
    }
}

fn count(tokens: &[StoredToken], kind: TokenKind) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}
