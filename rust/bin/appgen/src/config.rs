//! Optional `appgen.toml` configuration.
//!
//! ```toml
//! output = "./generated-app"
//! schema = "public"
//!
//! [drafter]
//! api_key = "sk-..."
//! model = "gpt-4-turbo-preview"
//! base_url = "https://api.openai.com/v1"
//! temperature = 0.3
//! ```
//!
//! Command-line flags win over file values.

use std::path::{Path, PathBuf};

use appgen_pipeline::OpenAiConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "appgen.toml";
pub const DEFAULT_OUTPUT: &str = "./generated-app";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppgenConfig {
    /// Output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// PostgreSQL schema for the generated tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub drafter: DrafterConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrafterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AppgenConfig {
    /// `./appgen.toml`.
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppgenConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.output.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn namespace(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.schema.clone())
    }
}

impl DrafterConfig {
    /// Drafter settings with flag overrides applied. A missing key is left
    /// to the drafter, which falls back to `OPENAI_API_KEY`.
    pub fn resolve(&self, api_key: Option<String>, model: Option<String>) -> OpenAiConfig {
        let defaults = OpenAiConfig::default();
        OpenAiConfig {
            api_key: api_key.or_else(|| self.api_key.clone()),
            model: model
                .or_else(|| self.model.clone())
                .unwrap_or(defaults.model),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        }
    }
}
