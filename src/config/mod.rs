pub mod filters;
pub mod pruner;

pub use filters::*;
pub use pruner::*;

use std::path::PathBuf;

/// Returns the global config file path: `~/.config/pii-filter/config.yml`
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("pii-filter")
        .join("config.yml")
}
