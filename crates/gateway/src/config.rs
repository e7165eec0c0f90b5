//! Gateway configuration.
//!
//! Resolved once at process startup from optional environment values and then handed to
//! [`crate::LlmGateway`]. Nothing in this crate reads the environment on its own.

use crate::{GatewayError, GatewayResult};
use std::fmt;

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Providers the `llm` backend is built with.
pub const SUPPORTED_PROVIDERS: [&str; 7] = [
    "openai",
    "anthropic",
    "google",
    "ollama",
    "groq",
    "mistral",
    "deepseek",
];

/// Provider that runs locally and needs no API key.
const LOCAL_PROVIDER: &str = "ollama";

#[derive(Clone)]
pub struct GatewayConfig {
    provider: String,
    model: String,
    api_key: Option<String>,
}

impl GatewayConfig {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> GatewayResult<Self> {
        let provider = provider.into().trim().to_ascii_lowercase();
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(GatewayError::UnknownProvider(provider));
        }

        let model = model.into().trim().to_owned();
        if model.is_empty() {
            return Err(GatewayError::InvalidConfig("model cannot be empty".into()));
        }

        Ok(Self {
            provider,
            model,
            api_key: non_blank(api_key),
        })
    }

    /// Builds a configuration from raw environment values.
    ///
    /// Blank or missing values fall back to the defaults; `fallback_key` is used when
    /// `api_key` is absent.
    pub fn from_env_values(
        provider: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
        fallback_key: Option<String>,
    ) -> GatewayResult<Self> {
        Self::new(
            non_blank(provider).unwrap_or_else(|| DEFAULT_PROVIDER.to_owned()),
            non_blank(model).unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            non_blank(api_key).or_else(|| non_blank(fallback_key)),
        )
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// A key is required except for the local provider.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.provider == LOCAL_PROVIDER
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = GatewayConfig::from_env_values(None, Some("  ".into()), None, None).unwrap();
        assert_eq!(config.provider(), DEFAULT_PROVIDER);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_fallback_key_is_used() {
        let config =
            GatewayConfig::from_env_values(None, None, Some("".into()), Some("k-123".into()))
                .unwrap();
        assert_eq!(config.api_key(), Some("k-123"));
        assert!(config.is_configured());
    }

    #[test]
    fn test_primary_key_wins() {
        let config = GatewayConfig::from_env_values(
            None,
            None,
            Some("primary".into()),
            Some("fallback".into()),
        )
        .unwrap();
        assert_eq!(config.api_key(), Some("primary"));
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let config = GatewayConfig::new("Ollama", "llama3", None).unwrap();
        assert_eq!(config.provider(), "ollama");
        assert!(config.is_configured());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(matches!(
            GatewayConfig::new("watson", "x", None),
            Err(GatewayError::UnknownProvider(p)) if p == "watson"
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GatewayConfig::new("google", "gemini-2.5-flash", Some("secret".into())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
