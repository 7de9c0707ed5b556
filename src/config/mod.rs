//! Configuration loading and management

use crate::core::DEFAULT_SOURCE_NAME;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of a [`RequestPipeline`](crate::pipeline::RequestPipeline)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Label attached to raw query text in diagnostics
    pub source_name: String,

    /// Maximum estimated query cost (0 disables the check)
    pub max_query_complexity: u64,

    /// Maximum field nesting depth (0 disables the check)
    pub max_query_depth: u32,

    /// Optional per-request deadline, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            max_query_complexity: 0,
            max_query_depth: 0,
            timeout_ms: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn with_max_query_complexity(mut self, max: u64) -> Self {
        self.max_query_complexity = max;
        self
    }

    pub fn with_max_query_depth(mut self, max: u32) -> Self {
        self.max_query_depth = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// The per-request deadline, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
