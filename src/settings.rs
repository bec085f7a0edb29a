//! Executor settings persistence
//!
//! Settings are mirrored in two places: a local JSON file (read back on
//! load, missing keys fall back to defaults) and the backend's `/api/config`
//! endpoint. Validation happens before either write.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Valid temperature range for the executor's LLM.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;
/// Upper bound on agent iterations.
pub const MAX_ITERATIONS_LIMIT: u32 = 200;

/// Configuration pushed to the executor backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorSettings {
    /// Default executor/model configuration id (e.g. `open_router`)
    pub executor_info_id: String,
    /// Randomness of LLM responses, 0 = deterministic
    pub llm_temperature: f64,
    /// Maximum number of steps the agent may take per task
    pub max_agent_iterations: u32,
    /// Detailed token-usage logging for cost tracking
    pub log_tokens_consumption: bool,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            executor_info_id: String::new(),
            llm_temperature: 0.2,
            max_agent_iterations: 50,
            log_tokens_consumption: true,
        }
    }
}

impl ExecutorSettings {
    /// Validate field ranges. Called before any persist or push.
    pub fn validate(&self) -> Result<()> {
        if !TEMPERATURE_RANGE.contains(&self.llm_temperature) {
            return Err(Error::Validation(format!(
                "llmTemperature must be within {:?}, got {}",
                TEMPERATURE_RANGE, self.llm_temperature
            )));
        }
        if self.max_agent_iterations == 0 || self.max_agent_iterations > MAX_ITERATIONS_LIMIT {
            return Err(Error::Validation(format!(
                "maxAgentIterations must be between 1 and {MAX_ITERATIONS_LIMIT}, got {}",
                self.max_agent_iterations
            )));
        }
        Ok(())
    }

    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to a JSON file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "saved executor settings");
        Ok(())
    }
}

/// Default on-disk location of the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("agentest").join("settings.json"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

/// Pushes settings to the backend's config endpoint.
pub struct SettingsClient {
    client: reqwest::Client,
    base_url: String,
}

impl SettingsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// `POST /api/config` with the settings as JSON.
    pub async fn push(&self, settings: &ExecutorSettings) -> Result<()> {
        settings.validate()?;
        let url = format!("{}/api/config", self.base_url);
        let response = self.client.post(&url).json(settings).send().await?;
        if !response.status().is_success() {
            return Err(Error::HttpStatus(format!(
                "config push failed: HTTP {}",
                response.status()
            )));
        }
        debug!(%url, "pushed executor settings");
        Ok(())
    }
}
