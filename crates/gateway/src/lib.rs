//! # Navigator Gateway
//!
//! The AI gateway: the one request/response boundary of the Knowledge Navigator.
//!
//! Every call carries the knowledge-base document, a purpose-specific system instruction
//! and either a question, a task or a conversation. [`Gateway`] is the injectable seam;
//! [`LlmGateway`] is the production implementation and tests substitute their own.
//!
//! The functions in this module wrap the five call purposes and translate raw model text
//! into domain values.

pub mod config;
mod engine;
mod error;
mod parse;
pub mod prompt;

pub use config::GatewayConfig;
pub use engine::LlmGateway;
pub use error::{GatewayError, GatewayResult};
pub use parse::DiagnosticReply;

use async_trait::async_trait;
use navigator_core::{ChatMessage, DatasetRequest, QaPair, SystemGraph, WizardKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Knowledge,
    Diagnostic,
    Dataset,
    Documentation,
    Explanation,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Purpose::Knowledge => "knowledge",
            Purpose::Diagnostic => "diagnostic",
            Purpose::Dataset => "dataset",
            Purpose::Documentation => "documentation",
            Purpose::Explanation => "explanation",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// JSON schema the backend is asked to constrain its reply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub purpose: Purpose,
    pub system: String,
    pub turns: Vec<Turn>,
    /// Structured output format; `None` asks for free text.
    pub schema: Option<OutputSchema>,
}

impl GatewayRequest {
    fn single(purpose: Purpose, system: impl Into<String>, content: String) -> Self {
        Self {
            purpose,
            system: system.into(),
            turns: vec![Turn::user(content)],
            schema: None,
        }
    }

    fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    fn prompt_len(&self) -> usize {
        self.system.len() + self.turns.iter().map(|t| t.text.len()).sum::<usize>()
    }
}

/// Sends a request and returns the model's text.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn complete(&self, request: GatewayRequest) -> GatewayResult<String>;
}

async fn send(gateway: &dyn Gateway, request: GatewayRequest) -> GatewayResult<String> {
    let purpose = request.purpose;
    tracing::debug!(
        %purpose,
        prompt_bytes = request.prompt_len(),
        structured = request.schema.is_some(),
        "gateway request"
    );
    match gateway.complete(request).await {
        Ok(text) => {
            tracing::info!(%purpose, reply_bytes = text.len(), "gateway reply");
            Ok(text)
        }
        Err(e) => {
            tracing::warn!(%purpose, "gateway call failed: {e}");
            Err(e)
        }
    }
}

/// Free-form question answered from the knowledge base.
pub async fn ask(
    gateway: &dyn Gateway,
    knowledge_base: &str,
    question: &str,
) -> GatewayResult<String> {
    let request = GatewayRequest::single(
        Purpose::Knowledge,
        prompt::KNOWLEDGE_SYSTEM,
        prompt::knowledge_question(knowledge_base, question),
    );
    send(gateway, request).await
}

/// One diagnostic chat turn.
///
/// Transport failures are errors; a reply with missing or unusable fields is not, and
/// comes back with the fallback text and no highlights.
pub async fn diagnose(
    gateway: &dyn Gateway,
    knowledge_base: &str,
    graph: &SystemGraph,
    kind: WizardKind,
    history: &[ChatMessage],
) -> GatewayResult<DiagnosticReply> {
    let request = GatewayRequest {
        purpose: Purpose::Diagnostic,
        system: prompt::diagnostic_system(kind, graph),
        turns: prompt::diagnostic_turns(knowledge_base, history),
        schema: Some(prompt::diagnostic_schema(graph)),
    };
    let raw = send(gateway, request).await?;
    Ok(parse::parse_diagnostic(&raw, graph))
}

/// Question/answer pairs for a dataset. The count is best effort; fewer or more pairs than
/// requested are returned as-is.
pub async fn generate_dataset(
    gateway: &dyn Gateway,
    knowledge_base: &str,
    request: &DatasetRequest,
) -> GatewayResult<Vec<QaPair>> {
    let gateway_request = GatewayRequest::single(
        Purpose::Dataset,
        prompt::DATASET_SYSTEM,
        prompt::dataset_task(knowledge_base, request),
    )
    .with_schema(prompt::dataset_schema());
    let raw = send(gateway, gateway_request).await?;
    let pairs = parse::parse_dataset(&raw)
        .ok_or_else(|| GatewayError::Malformed("no question/answer pairs found".into()))?;

    if pairs.len() != request.count as usize {
        tracing::info!(
            requested = request.count,
            received = pairs.len(),
            "dataset count differs from request"
        );
    }
    Ok(pairs)
}

/// Markdown document for an already assembled documentation prompt.
pub async fn generate_documentation(gateway: &dyn Gateway, prompt: &str) -> GatewayResult<String> {
    let request = GatewayRequest::single(
        Purpose::Documentation,
        prompt::DOCUMENTATION_SYSTEM,
        prompt.to_owned(),
    );
    send(gateway, request).await
}

/// Explains a diagnostic step or bot message in terms of the knowledge base.
pub async fn explain(
    gateway: &dyn Gateway,
    knowledge_base: &str,
    text: &str,
) -> GatewayResult<String> {
    let request = GatewayRequest::single(
        Purpose::Explanation,
        prompt::EXPLANATION_SYSTEM,
        prompt::explanation_request(knowledge_base, text),
    );
    send(gateway, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::{build_prompt, Catalog, ContextSet};
    use std::sync::Mutex;

    /// Replies with a fixed text and records what it was sent.
    struct FakeGateway {
        reply: Result<String, ()>,
        seen: Mutex<Vec<GatewayRequest>>,
    }

    impl FakeGateway {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> GatewayRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn complete(&self, request: GatewayRequest) -> GatewayResult<String> {
            self.seen.lock().unwrap().push(request);
            self.reply
                .clone()
                .map_err(|_| GatewayError::Request("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_ask_wraps_question_in_context() {
        let fake = FakeGateway::replying("The IRIS engine routes HL7.");
        let answer = ask(&fake, "KB", "Who routes HL7?").await.unwrap();
        assert_eq!(answer, "The IRIS engine routes HL7.");

        let request = fake.last();
        assert_eq!(request.purpose, Purpose::Knowledge);
        assert_eq!(request.system, prompt::KNOWLEDGE_SYSTEM);
        assert_eq!(
            request.turns,
            vec![Turn::user(
                "CONTEXT: \"\"\"KB\"\"\" \n\n QUESTION: \"\"\"Who routes HL7?\"\"\""
            )]
        );
    }

    #[tokio::test]
    async fn test_diagnose_filters_highlights() {
        let catalog = Catalog::builtin().unwrap();
        let fake = FakeGateway::replying(
            r#"{"responseText": "Check IRIS.", "highlightedComponents": ["iris", "billing"]}"#,
        );
        let history = vec![ChatMessage::user("Reports missing")];
        let reply = diagnose(
            &fake,
            catalog.knowledge_base(),
            catalog.graph(),
            WizardKind::Hl7,
            &history,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, "Check IRIS.");
        assert_eq!(reply.highlights.into_iter().collect::<Vec<_>>(), vec!["iris"]);
        assert_eq!(fake.last().turns.len(), 3);
    }

    #[tokio::test]
    async fn test_diagnose_propagates_transport_failure() {
        let catalog = Catalog::builtin().unwrap();
        let fake = FakeGateway::failing();
        let result = diagnose(&fake, "KB", catalog.graph(), WizardKind::Dicom, &[]).await;
        assert!(matches!(result, Err(GatewayError::Request(_))));
    }

    #[tokio::test]
    async fn test_dataset_tolerates_count_mismatch() {
        let fake = FakeGateway::replying(r#"{"qa_pairs": [{"question": "Q", "answer": "A"}]}"#);
        let request = DatasetRequest::new("HL7 Message Flow Failures", "Support Engineer", Some(5)).unwrap();
        let pairs = generate_dataset(&fake, "KB", &request).await.unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[tokio::test]
    async fn test_structured_purposes_carry_schema() {
        let catalog = Catalog::builtin().unwrap();
        let fake = FakeGateway::replying(r#"{"responseText": "ok", "highlightedComponents": []}"#);
        diagnose(&fake, "KB", catalog.graph(), WizardKind::Dicom, &[])
            .await
            .unwrap();
        let schema = fake.last().schema.unwrap();
        assert_eq!(schema.schema["required"], serde_json::json!(["responseText", "highlightedComponents"]));

        let fake = FakeGateway::replying(r#"{"qa_pairs": [{"question": "Q", "answer": "A"}]}"#);
        let request = DatasetRequest::new("Topic", "Clinical Staff", None).unwrap();
        generate_dataset(&fake, "KB", &request).await.unwrap();
        let schema = fake.last().schema.unwrap();
        assert_eq!(schema.schema["properties"]["qa_pairs"]["type"], "array");

        ask(&fake, "KB", "What is IRIS?").await.unwrap();
        assert!(fake.last().schema.is_none());
    }

    #[tokio::test]
    async fn test_dataset_with_empty_pairs_is_malformed() {
        let fake = FakeGateway::replying(r#"{"qa_pairs": []}"#);
        let request = DatasetRequest::new("Topic", "Clinical Staff", None).unwrap();
        assert!(matches!(
            generate_dataset(&fake, "KB", &request).await,
            Err(GatewayError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_dataset_without_json_is_malformed() {
        let fake = FakeGateway::replying("I cannot do that.");
        let request = DatasetRequest::new("Topic", "Clinical Staff", None).unwrap();
        assert!(matches!(
            generate_dataset(&fake, "KB", &request).await,
            Err(GatewayError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_documentation_sends_prompt_verbatim() {
        let fake = FakeGateway::replying("# Guide");
        let context: ContextSet = ["User: queue stuck"].into_iter().collect();
        let prompt = build_prompt("KB", &context, "Missing reports");
        let doc = generate_documentation(&fake, &prompt).await.unwrap();
        assert_eq!(doc, "# Guide");
        let request = fake.last();
        assert_eq!(request.purpose, Purpose::Documentation);
        assert_eq!(request.turns[0].text, prompt);
    }

    #[tokio::test]
    async fn test_explain_uses_explanation_instruction() {
        let fake = FakeGateway::replying("Because cache over 90% slows retrieval.");
        explain(&fake, "KB", "Check local Unifier cache utilization.")
            .await
            .unwrap();
        let request = fake.last();
        assert_eq!(request.purpose, Purpose::Explanation);
        assert!(request.turns[0]
            .text
            .ends_with("EXPLAIN THIS DIAGNOSTIC STEP/QUESTION: \"\"\"Check local Unifier cache utilization.\"\"\""));
    }
}
