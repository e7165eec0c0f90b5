use crate::config::GatewayConfig;
use crate::{Gateway, GatewayError, GatewayRequest, GatewayResult, Speaker};
use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};

fn map_backend(provider: &str) -> GatewayResult<LLMBackend> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GatewayError::UnknownProvider(other.to_owned())),
    }
}

/// Gateway backed by the `llm` crate. A client is built per request from the injected
/// configuration.
#[derive(Debug, Clone)]
pub struct LlmGateway {
    config: GatewayConfig,
}

impl LlmGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl Gateway for LlmGateway {
    async fn complete(&self, request: GatewayRequest) -> GatewayResult<String> {
        if !self.config.is_configured() {
            return Err(GatewayError::NotConfigured(format!(
                "no API key set for provider '{}'",
                self.config.provider()
            )));
        }

        let backend = map_backend(self.config.provider())?;
        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(self.config.model())
            .system(request.system.as_str());

        if let Some(key) = self.config.api_key() {
            builder = builder.api_key(key);
        }

        if let Some(schema) = request.schema {
            builder = builder.schema(StructuredOutputFormat {
                name: schema.name,
                description: Some(schema.description),
                schema: Some(schema.schema),
                strict: Some(true),
            });
        }

        let llm = builder
            .build()
            .map_err(|e| GatewayError::Build(e.to_string()))?;

        let messages: Vec<ChatMessage> = request
            .turns
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => ChatMessage::user().content(turn.text.as_str()).build(),
                Speaker::Assistant => ChatMessage::assistant()
                    .content(turn.text.as_str())
                    .build(),
            })
            .collect();

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GatewayError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Purpose, Turn};

    #[test]
    fn test_map_backend_matches_supported_providers() {
        for provider in crate::config::SUPPORTED_PROVIDERS {
            assert!(map_backend(provider).is_ok(), "{provider}");
        }
        assert!(matches!(
            map_backend("watson"),
            Err(GatewayError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_fails_without_network() {
        let config = GatewayConfig::new("google", "gemini-2.5-flash", None).unwrap();
        let gateway = LlmGateway::new(config);
        let err = gateway
            .complete(GatewayRequest {
                purpose: Purpose::Knowledge,
                system: "s".into(),
                turns: vec![Turn::user("q")],
                schema: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }
}
