use std::fmt;

use crate::constants;
use crate::error::ConfigError;

/// Resolved settings for talking to the model service.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl Config {
    /// Validates raw values coming from flags, the environment or `.env`.
    ///
    /// A missing or blank key fails here, before any terminal setup or network
    /// traffic, so the user sees what to fix instead of a rejected request.
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        api_base: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| constants::DEFAULT_MODEL.to_string());

        let api_base = api_base
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| constants::DEFAULT_API_BASE.to_string());
        let parsed = reqwest::Url::parse(&api_base).map_err(|e| ConfigError::InvalidApiBase {
            url: api_base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiBase {
                url: api_base,
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

// Keep the key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}
