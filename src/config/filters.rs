use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{PiiError, Result};
use crate::filter::{
    CheckScope, DepthFilter, EmailFilter, FilterAction, FilterLogger, Ipv4Filter, Ipv6Filter,
    PiiKeysFilter, RegexFilter, TokenFilter, UrlCredentialsFilter, FILTERED,
};
use crate::pipeline::{FilterPipeline, SentryPiiFilter, SqsMessageFilter};

use super::PrunerConfig;

/// Top-level filter configuration, usually `config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Actions applied to error-telemetry events.
    #[serde(default)]
    pub event: FilterSetConfig,

    /// Actions applied to queue message bodies.
    #[serde(default)]
    pub queue: FilterSetConfig,

    /// Extra regex actions appended after the built-in ones of both sets.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,

    /// Background token pruning.
    #[serde(default)]
    pub pruner: PrunerConfig,
}

impl FilterConfig {
    /// Load configuration from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| PiiError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compile the action list for one filter set, custom patterns last.
    pub fn build_actions(
        &self,
        set: &FilterSetConfig,
        default_depth: usize,
    ) -> Result<Vec<Box<dyn FilterAction>>> {
        let max_depth = set.max_depth.unwrap_or(default_depth);
        let mut actions: Vec<Box<dyn FilterAction>> =
            set.actions.iter().map(|kind| kind.build(max_depth)).collect();
        for custom in &self.custom_patterns {
            actions.push(Box::new(custom.build()?));
        }
        Ok(actions)
    }

    pub fn event_filter(&self, logger: Arc<dyn FilterLogger>) -> Result<SentryPiiFilter> {
        let actions = self.build_actions(&self.event, SentryPiiFilter::MAX_DEPTH)?;
        Ok(SentryPiiFilter::new(actions, logger))
    }

    pub fn queue_filter(&self, logger: Arc<dyn FilterLogger>) -> Result<SqsMessageFilter> {
        let actions = self.build_actions(&self.queue, DepthFilter::DEFAULT_MAX_DEPTH)?;
        Ok(SqsMessageFilter::new(actions, logger))
    }

    /// A generic pipeline using the event action list.
    pub fn generic_pipeline(
        &self,
        max_depth: Option<usize>,
        logger: Arc<dyn FilterLogger>,
    ) -> Result<FilterPipeline> {
        let set = FilterSetConfig {
            max_depth: max_depth.or(self.event.max_depth),
            actions: self.event.actions.clone(),
        };
        let actions = self.build_actions(&set, DepthFilter::DEFAULT_MAX_DEPTH)?;
        Ok(FilterPipeline::new(actions, logger))
    }
}

/// Ordered actions plus the depth budget handed to the depth limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSetConfig {
    /// Falls back to 5 for events and 3 for queue messages.
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_actions")]
    pub actions: Vec<ActionKind>,
}

fn default_actions() -> Vec<ActionKind> {
    vec![
        ActionKind::Depth,
        ActionKind::UrlCredentials,
        ActionKind::Email,
        ActionKind::PiiKeys,
        ActionKind::Token,
        ActionKind::Ipv4,
        ActionKind::Ipv6,
    ]
}

impl Default for FilterSetConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            actions: default_actions(),
        }
    }
}

/// The built-in action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Depth,
    UrlCredentials,
    Email,
    PiiKeys,
    Token,
    Ipv4,
    Ipv6,
}

impl ActionKind {
    pub fn build(self, max_depth: usize) -> Box<dyn FilterAction> {
        match self {
            ActionKind::Depth => Box::new(DepthFilter::new(max_depth)),
            ActionKind::UrlCredentials => Box::new(UrlCredentialsFilter::new()),
            ActionKind::Email => Box::new(EmailFilter::new(CheckScope::Values)),
            ActionKind::PiiKeys => Box::new(PiiKeysFilter::new()),
            ActionKind::Token => Box::new(TokenFilter::new(CheckScope::Values)),
            ActionKind::Ipv4 => Box::new(Ipv4Filter::new(CheckScope::Values)),
            ActionKind::Ipv6 => Box::new(Ipv6Filter::new(CheckScope::Values)),
        }
    }
}

/// A caller-supplied regex action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    pub name: String,
    pub pattern: String,
    #[serde(default = "default_scope")]
    pub scope: CheckScope,
    /// Defaults to `[Filtered]`.
    #[serde(default)]
    pub replacement: Option<String>,
}

fn default_scope() -> CheckScope {
    CheckScope::Values
}

impl CustomPattern {
    pub fn build(&self) -> Result<RegexFilter> {
        let replacement = self.replacement.as_deref().unwrap_or(FILTERED);
        Ok(RegexFilter::new(&self.pattern, self.scope, replacement)?.with_name(&self.name))
    }
}
