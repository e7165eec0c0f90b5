//! Constants used throughout the navigator core crate.
//!
//! Prompt markers and wizard defaults live here so that the gateway crate and the tests
//! agree on the exact strings.

/// Entry node key of every decision tree.
pub const START_NODE_KEY: &str = "start";

/// Marker introducing the user-selected context block in documentation prompts.
pub const ADDITIONAL_CONTEXT_MARKER: &str = "ADDITIONAL CONTEXT";

/// Full heading of the user-selected context block.
pub const ADDITIONAL_CONTEXT_HEADING: &str =
    "ADDITIONAL CONTEXT FROM USER'S CHAT SESSION (Prioritize this):";

/// Label preceding the documentation topic in documentation prompts.
pub const DOCUMENTATION_TOPIC_LABEL: &str = "DOCUMENTATION_TOPIC";

/// Smallest number of question/answer pairs a dataset request may ask for.
pub const MIN_DATASET_COUNT: u32 = 1;

/// Largest number of question/answer pairs a dataset request may ask for.
pub const MAX_DATASET_COUNT: u32 = 20;

/// Default number of question/answer pairs when none is given.
pub const DEFAULT_DATASET_COUNT: u32 = 5;

/// Greeting shown when a knowledge-engine chat opens.
pub const KNOWLEDGE_GREETING: &str = "Hello! I'm Navigator AI. How can I help you navigate the Healthcare Imaging Platform support documentation today?";

/// Greeting shown when the hub assistant chat opens.
pub const ASSISTANT_GREETING: &str = "Hello! I'm Navigator AI. How can I assist you?";

/// Bot message appended when a chat gateway call fails.
pub const CHAT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Bot message used when a diagnostic reply is missing its text.
pub const DIAGNOSTIC_FALLBACK_MESSAGE: &str =
    "I seem to be having trouble forming a response. Could you try rephrasing?";

/// Message shown when an explanation cannot be fetched.
pub const EXPLANATION_FAILURE_MESSAGE: &str =
    "Sorry, couldn't fetch an explanation for this message.";
