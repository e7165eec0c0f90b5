//! System instructions and request bodies for each call purpose.

use crate::{OutputSchema, Speaker, Turn};
use navigator_core::{ChatMessage, DatasetRequest, Sender, SystemGraph, WizardKind};
use serde_json::json;

pub const KNOWLEDGE_SYSTEM: &str = r#"You are an expert assistant for a Healthcare IT imaging platform. Your name is "Navigator AI".
Your knowledge is strictly limited to the provided support documentation.
When answering, be concise and refer to specific sections or systems from the document if possible.
If the user's question cannot be answered using the document, you MUST state: "I cannot find information on that topic in the provided documentation."
Do not invent or assume any information outside of the provided text. Start your first response by introducing yourself."#;

pub const DATASET_SYSTEM: &str = "You are a data generator for a machine learning model. Your task is to create high-quality question-and-answer pairs based *only* on the provided context document about a Healthcare IT platform. Do not use any external knowledge. The answers must be grounded in the text.
Respond with a single JSON object of the form {\"qa_pairs\": [{\"question\": \"...\", \"answer\": \"...\"}]} and nothing else.";

pub const DOCUMENTATION_SYSTEM: &str = "You are a senior technical writer tasked with creating a support document for a Healthcare IT platform.
Your knowledge is strictly limited to the provided support documentation context. The user may provide additional context from their chat session. Prioritize information from this additional context when generating the document, but still ground it in the main knowledge base.
Based on the provided context and the user's topic, generate a clear, well-structured troubleshooting guide.
The guide should be formatted using Markdown and include the following sections where appropriate:
- **Summary**: A brief overview of the issue.
- **Common Symptoms**: A list of observable symptoms.
- **Diagnostic Steps**: A step-by-step guide to investigating the problem.
- **Resolution Path**: Recommended solutions and actions.
- **Escalation**: When and how to escalate the issue.
If the topic cannot be addressed by the provided context, state that you cannot create documentation on that topic.";

pub const EXPLANATION_SYSTEM: &str = "You are an expert assistant for a Healthcare IT imaging platform. Your task is to explain the provided text in simple terms, relating it back to the provided support documentation context.
Explain *why* this step or question is being asked in the diagnostic process and what information it helps to gather.
For example, if the text is \"Is the Unifier's cache utilization over 90%?\", your explanation should mention that the documentation indicates this is a critical threshold and can cause performance issues, requiring a purge of old studies.
Be concise and clear. Your knowledge is strictly limited to the provided support documentation.";

const DIAGNOSTIC_ACK: &str = "Understood. I will use this context to help diagnose issues based on the user's input and I will respond in the required JSON format.";

pub fn knowledge_question(knowledge_base: &str, question: &str) -> String {
    format!("CONTEXT: \"\"\"{knowledge_base}\"\"\" \n\n QUESTION: \"\"\"{question}\"\"\"")
}

pub fn dataset_task(knowledge_base: &str, request: &DatasetRequest) -> String {
    let task = format!(
        "Based on the provided documentation, generate exactly {} question-and-answer pairs about \"{}\". The questions should be phrased as if they are being asked by a {}. The answers must be concise and derived strictly from the provided documentation.",
        request.count, request.topic, request.persona
    );
    format!("CONTEXT: \"\"\"{knowledge_base}\"\"\" \n\n TASK: \"\"\"{task}\"\"\"")
}

pub fn explanation_request(knowledge_base: &str, text: &str) -> String {
    format!(
        "CONTEXT: \"\"\"{knowledge_base}\"\"\" \n\n EXPLAIN THIS DIAGNOSTIC STEP/QUESTION: \"\"\"{text}\"\"\""
    )
}

/// Diagnostic instructions: the wizard being run and the closed list of component ids the
/// reply may highlight.
pub fn diagnostic_system(kind: WizardKind, graph: &SystemGraph) -> String {
    let ids: Vec<&str> = graph.components().iter().map(|c| c.id.as_str()).collect();
    let ids = ids.join(", ");
    format!(
        r#"You are "Navigator AI," an expert diagnostic assistant for a Healthcare IT imaging platform. Your knowledge is strictly limited to the provided support documentation context.
You are currently running a diagnostic wizard for: "{title}".
Your goal is to guide the user step-by-step to diagnose and resolve the issue. Ask clarifying questions one at a time.
Your response MUST be a JSON object with two keys:
1.  "responseText": A string containing your textual answer for the user.
2.  "highlightedComponents": An array of component ID strings that are relevant to your response. The IDs must be from this list: [{ids}]. If your response is general, provide an array with all components to show the whole system. If no specific component is relevant, provide an empty array."#,
        title = kind.title(),
    )
}

/// Conversation sent for a diagnostic turn: a priming exchange carrying the knowledge base,
/// then the chat so far.
pub fn diagnostic_turns(knowledge_base: &str, history: &[ChatMessage]) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::user(format!(
        "Use the following context to answer all questions:\n\nCONTEXT: \"\"\"{knowledge_base}\"\"\""
    )));
    turns.push(Turn::assistant(DIAGNOSTIC_ACK));
    turns.extend(history.iter().map(|msg| Turn {
        speaker: match msg.sender {
            Sender::User => Speaker::User,
            Sender::Bot => Speaker::Assistant,
        },
        text: msg.text.clone(),
    }));
    turns
}

/// Reply shape for a diagnostic turn.
pub fn diagnostic_schema(graph: &SystemGraph) -> OutputSchema {
    let ids: Vec<&str> = graph.components().iter().map(|c| c.id.as_str()).collect();
    OutputSchema {
        name: "diagnostic_reply".into(),
        description: "Guidance for the user and the components it concerns.".into(),
        schema: json!({
            "type": "object",
            "properties": {
                "responseText": {
                    "type": "string",
                    "description": "The text to display to the user to guide them in the diagnosis."
                },
                "highlightedComponents": {
                    "type": "array",
                    "description": format!(
                        "A list of system component IDs relevant to the response. Valid IDs are: {}.",
                        ids.join(", ")
                    ),
                    "items": { "type": "string" }
                }
            },
            "required": ["responseText", "highlightedComponents"],
            "additionalProperties": false
        }),
    }
}

pub fn dataset_schema() -> OutputSchema {
    OutputSchema {
        name: "qa_dataset".into(),
        description: "Question and answer pairs grounded in the documentation.".into(),
        schema: json!({
            "type": "object",
            "properties": {
                "qa_pairs": {
                    "type": "array",
                    "description": "A list of question and answer pairs.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The generated question."
                            },
                            "answer": {
                                "type": "string",
                                "description": "The answer to the question, based on the context."
                            }
                        },
                        "required": ["question", "answer"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["qa_pairs"],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::Catalog;

    #[test]
    fn test_diagnostic_system_lists_component_ids() {
        let catalog = Catalog::builtin().unwrap();
        let system = diagnostic_system(WizardKind::Hl7, catalog.graph());
        assert!(system.contains("\"HL7 Report Failure Wizard\""));
        assert!(system.contains("[pacs, unifier, iris, powerscribe, risemr, radassist]"));
    }

    #[test]
    fn test_diagnostic_schema_names_valid_ids() {
        let catalog = Catalog::builtin().unwrap();
        let schema = diagnostic_schema(catalog.graph());
        let description = schema.schema["properties"]["highlightedComponents"]["description"]
            .as_str()
            .unwrap();
        assert!(description.ends_with("Valid IDs are: pacs, unifier, iris, powerscribe, risemr, radassist."));
        assert_eq!(schema.schema["properties"]["responseText"]["type"], "string");
    }

    #[test]
    fn test_diagnostic_turns_prime_then_history() {
        let history = vec![
            ChatMessage::bot("Starting the DICOM Issues Wizard."),
            ChatMessage::user("Images are slow"),
        ];
        let turns = diagnostic_turns("KB", &history);
        assert_eq!(turns.len(), 4);
        assert!(turns[0].text.contains("CONTEXT: \"\"\"KB\"\"\""));
        assert_eq!(turns[1].speaker, Speaker::Assistant);
        assert_eq!(turns[2].speaker, Speaker::Assistant);
        assert_eq!(turns[3], Turn::user("Images are slow"));
    }

    #[test]
    fn test_dataset_task_states_count_and_persona() {
        let request = DatasetRequest::new("Vendor Escalation Matrix", "Clinical Staff", Some(3)).unwrap();
        let task = dataset_task("KB", &request);
        assert!(task.starts_with("CONTEXT: \"\"\"KB\"\"\""));
        assert!(task.contains("generate exactly 3 question-and-answer pairs about \"Vendor Escalation Matrix\""));
        assert!(task.contains("asked by a Clinical Staff"));
    }
}
