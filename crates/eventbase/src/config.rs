use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_WILDCARD: &str = "all";

fn default_wildcard() -> String {
    DEFAULT_WILDCARD.to_string()
}

/// What dispatch does when a listener returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the dispatch call and hand the error to the caller.
    #[default]
    Propagate,
    /// Log the failure and keep invoking the remaining listeners.
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Channel that receives every dispatched event, name first.
    #[serde(default = "default_wildcard")]
    pub wildcard: String,

    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            wildcard: default_wildcard(),
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl HubConfig {
    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = wildcard.into();
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Config file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "json" => Some(Self::Json),
            "jsonc" => Some(Self::Jsonc),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

pub fn load_config_from_file(path: &Path) -> Result<HubConfig> {
    let format = ConfigFormat::detect(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config_content(&content, format)
        .with_context(|| format!("Invalid hub config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?format, wildcard = %config.wildcard, "loaded hub config");
    Ok(config)
}

/// Decode and validate a hub config. The wildcard must name a real channel.
pub fn parse_config_content(content: &str, format: ConfigFormat) -> Result<HubConfig> {
    let config: HubConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON")?,
        ConfigFormat::Jsonc => json5::from_str(content).context("Failed to parse JSONC")?,
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML")?,
    };

    if config.wildcard.is_empty() {
        return Err(anyhow!("Wildcard event name must not be empty"));
    }
    Ok(config)
}
