use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PiiError {
    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("filter action {action} failed: {reason}")]
    Action { action: String, reason: String },

    #[error("filter action {action} panicked: {reason}")]
    ActionPanicked { action: String, reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("token store error: {reason}")]
    Store { reason: String },

    #[error("advisory lock {name} not acquired within {timeout_ms}ms")]
    LockTimeout { name: String, timeout_ms: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PiiError>;
