/// Runtime settings.
///
/// Precedence: environment (`FARMGENIE__*`) > TOML file (`FARMGENIE_CONFIG`,
/// default `config/farmgenie.toml`) > built-in defaults. `COHERE_API_KEY` is
/// honoured when no key is configured any other way.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "FARMGENIE_CONFIG";
const ENV_PREFIX: &str = "FARMGENIE";
const ENV_COHERE_KEY: &str = "COHERE_API_KEY";
const DEFAULT_CONFIG_PATH: &str = "config/farmgenie.toml";

/// Remote language model settings (Cohere chat API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// No key means the chat runs on the keyword matcher only.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Earlier messages forwarded as chat history.
    pub history_limit: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "command-r-plus".to_string(),
            endpoint: "https://api.cohere.ai/v1/chat".to_string(),
            timeout_secs: 30,
            max_tokens: 1000,
            temperature: 0.7,
            history_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite file holding prediction history.
    pub database_path: PathBuf,
    #[serde(default)]
    pub model: ModelSettings,
}

impl Settings {
    /// Load from `FARMGENIE_CONFIG` (or the default path) plus environment.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from an explicit file; a missing file just means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = ModelSettings::default();

        let builder = config::Config::builder()
            .set_default("database_path", default_database_path().display().to_string())?
            .set_default("model.model", defaults.model)?
            .set_default("model.endpoint", defaults.endpoint)?
            .set_default("model.timeout_secs", defaults.timeout_secs as i64)?
            .set_default("model.max_tokens", defaults.max_tokens as i64)?
            .set_default("model.temperature", defaults.temperature as f64)?
            .set_default("model.history_limit", defaults.history_limit as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut settings: Settings = built.try_deserialize()?;

        if settings.model.api_key.as_deref().map_or(true, str::is_empty) {
            settings.model.api_key = std::env::var(ENV_COHERE_KEY).ok().filter(|k| !k.is_empty());
        }

        Ok(settings)
    }

    /// Key for the remote model, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.model.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

fn default_database_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".farmgenie").join("farmgenie.db"),
        None => {
            tracing::warn!(
                "home directory not found, keeping the database in the working directory"
            );
            PathBuf::from("farmgenie.db")
        }
    }
}
