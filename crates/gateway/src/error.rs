#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("AI gateway is not configured: {0}")]
    NotConfigured(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build LLM client: {0}")]
    Build(String),
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("AI returned an empty response")]
    EmptyResponse,
    #[error("AI returned a malformed response: {0}")]
    Malformed(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
