//! Context aggregator: transcript excerpts flagged by the user as extra grounding for
//! documentation requests.

use crate::constants::{ADDITIONAL_CONTEXT_HEADING, DOCUMENTATION_TOPIC_LABEL};
use serde::Serialize;
use std::collections::BTreeSet;

/// Set of context chunks. Membership is by exact string value; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContextSet(BTreeSet<String>);

impl ContextSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new set with `text` removed if present, otherwise added.
    pub fn toggled(&self, text: &str) -> Self {
        let mut next = self.clone();
        next.toggle(text);
        next
    }

    /// In-place toggle. Returns whether `text` is a member afterwards.
    pub fn toggle(&mut self, text: &str) -> bool {
        if self.0.remove(text) {
            false
        } else {
            self.0.insert(text.to_owned());
            true
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.0.contains(text)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for ContextSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Assembles a documentation request: the base document, then the context block (only when
/// the set is non-empty), then the topic. The order is fixed.
pub fn build_prompt(base_document: &str, context: &ContextSet, topic: &str) -> String {
    let mut prompt = String::with_capacity(base_document.len() + topic.len() + 64);
    prompt.push_str(base_document);

    if !context.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(ADDITIONAL_CONTEXT_HEADING);
        for chunk in context.iter() {
            prompt.push_str("\n- ");
            prompt.push_str(chunk);
        }
    }

    prompt.push_str("\n\n");
    prompt.push_str(DOCUMENTATION_TOPIC_LABEL);
    prompt.push_str(": \"\"\"");
    prompt.push_str(topic);
    prompt.push_str("\"\"\"");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ADDITIONAL_CONTEXT_MARKER;

    const BASE: &str = "# Platform\nThe IRIS engine routes HL7.";

    #[test]
    fn test_double_toggle_restores_set() {
        let original: ContextSet = ["existing"].into_iter().collect();
        for x in ["existing", "new message", ""] {
            assert_eq!(original.toggled(x).toggled(x), original);
        }
    }

    #[test]
    fn test_toggle_two_distinct_messages_grows_by_two() {
        let mut set = ContextSet::new();
        assert!(set.toggle("Bot: check the IRIS queue"));
        assert!(set.toggle("User: the queue has 400 messages"));
        assert_eq!(set.len(), 2);
        assert!(!set.toggle("Bot: check the IRIS queue"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_build_prompt_without_context() {
        let prompt = build_prompt(BASE, &ContextSet::new(), "HL7 Message Flow Failures");
        assert!(prompt.starts_with(BASE));
        assert!(!prompt.contains(ADDITIONAL_CONTEXT_MARKER));
        assert!(prompt.ends_with("DOCUMENTATION_TOPIC: \"\"\"HL7 Message Flow Failures\"\"\""));
    }

    #[test]
    fn test_build_prompt_order_is_exact() {
        let context: ContextSet = ["b chunk", "a chunk"].into_iter().collect();
        let prompt = build_prompt(BASE, &context, "Topic");
        let expected = format!(
            "{BASE}\n\nADDITIONAL CONTEXT FROM USER'S CHAT SESSION (Prioritize this):\n- a chunk\n- b chunk\n\nDOCUMENTATION_TOPIC: \"\"\"Topic\"\"\""
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_build_prompt_marker_iff_non_empty() {
        let mut context = ContextSet::new();
        assert!(!build_prompt(BASE, &context, "t").contains(ADDITIONAL_CONTEXT_MARKER));
        context.toggle("chunk");
        let prompt = build_prompt(BASE, &context, "t");
        assert!(prompt.starts_with(BASE));
        let marker = prompt.find(ADDITIONAL_CONTEXT_MARKER).unwrap();
        let topic = prompt.find(DOCUMENTATION_TOPIC_LABEL).unwrap();
        assert!(BASE.len() < marker && marker < topic);
    }
}
