use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{GatherError, Result};

pub const DEFAULT_CONTENT_BUDGET: usize = 3000;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 100;

/// Tunables for a search run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherConfig {
    /// Maximum characters of extracted content inspected per file.
    pub content_budget: usize,
    /// Minimum delay between two progress publications.
    pub progress_interval_ms: u64,
    /// Replaces the built-in list of plain-text extensions when set.
    pub text_extensions: Option<Vec<String>>,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            content_budget: DEFAULT_CONTENT_BUDGET,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            text_extensions: None,
        }
    }
}

impl GatherConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| {
            GatherError::Config(format!(
                "failed to read config {}: {error}",
                path.display()
            ))
        })?;
        let config: GatherConfig = serde_json::from_str(&data).map_err(|error| {
            GatherError::Config(format!(
                "failed to parse config {}: {error}",
                path.display()
            ))
        })?;
        if config.content_budget == 0 {
            return Err(GatherError::Config(format!(
                "content_budget in {} must be greater than zero",
                path.display()
            )));
        }
        Ok(config)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
