//! Tolerant parsing of structured model output.
//!
//! Models wrap JSON in prose or code fences, drop fields and occasionally emit a broken
//! array. Missing fields fall back to safe defaults instead of failing the turn.

use navigator_core::constants::DIAGNOSTIC_FALLBACK_MESSAGE;
use navigator_core::{HighlightSet, QaPair, SystemGraph};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct DatasetWire {
    qa_pairs: Vec<QaPair>,
}

/// Parsed diagnostic reply, highlights already restricted to known components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReply {
    pub text: String,
    pub highlights: HighlightSet,
}

/// Reads `responseText` and `highlightedComponents` independently, so one unusable field
/// does not discard the other.
pub fn parse_diagnostic(raw: &str, graph: &SystemGraph) -> DiagnosticReply {
    let fields = extract_json_object(raw)
        .and_then(|json| serde_json::from_str::<Map<String, Value>>(json).ok());

    let Some(fields) = fields else {
        // No usable JSON: treat the whole reply as prose.
        let text = raw.trim();
        return DiagnosticReply {
            text: if text.is_empty() {
                DIAGNOSTIC_FALLBACK_MESSAGE.to_owned()
            } else {
                text.to_owned()
            },
            highlights: HighlightSet::new(),
        };
    };

    let text = fields
        .get("responseText")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| DIAGNOSTIC_FALLBACK_MESSAGE.to_owned(), str::to_owned);

    let highlights = graph.retain_known(
        fields
            .get("highlightedComponents")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(|id| id.trim().to_ascii_lowercase()),
    );

    DiagnosticReply { text, highlights }
}

/// Accepts `{"qa_pairs": [...]}` or a bare array, salvaging whole objects from a broken one.
///
/// Returns `None` unless at least one pair could be read.
pub fn parse_dataset(raw: &str) -> Option<Vec<QaPair>> {
    read_pairs(raw).filter(|pairs| !pairs.is_empty())
}

fn read_pairs(raw: &str) -> Option<Vec<QaPair>> {
    let object_first = match (raw.find('{'), raw.find('[')) {
        (Some(object), Some(array)) => object < array,
        (Some(_), None) => true,
        _ => false,
    };

    if object_first {
        if let Some(json) = extract_json_object(raw) {
            if let Ok(wire) = serde_json::from_str::<DatasetWire>(json) {
                return Some(wire.qa_pairs);
            }
        }
    }

    let array = extract_json_array(raw)?;
    match serde_json::from_str::<Vec<QaPair>>(array) {
        Ok(pairs) => Some(pairs),
        Err(_) => {
            let salvaged = salvage_objects(array);
            (!salvaged.is_empty()).then_some(salvaged)
        }
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parses each top-level `{...}` inside a malformed array on its own.
fn salvage_objects(array: &str) -> Vec<QaPair> {
    let mut pairs = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in array.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        if let Ok(pair) = serde_json::from_str::<QaPair>(&array[s..=i]) {
                            pairs.push(pair);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::Catalog;

    fn graph() -> SystemGraph {
        Catalog::builtin().unwrap().graph().clone()
    }

    #[test]
    fn test_diagnostic_full_object() {
        let raw = r#"{"responseText": "Check the Unifier cache.", "highlightedComponents": ["unifier", "pacs"]}"#;
        let reply = parse_diagnostic(raw, &graph());
        assert_eq!(reply.text, "Check the Unifier cache.");
        assert_eq!(
            reply.highlights.into_iter().collect::<Vec<_>>(),
            vec!["pacs", "unifier"]
        );
    }

    #[test]
    fn test_diagnostic_in_code_fence_with_unknown_ids() {
        let raw = "```json\n{\"responseText\": \"Look at IRIS\", \"highlightedComponents\": [\"IRIS\", \"zotec\"]}\n```";
        let reply = parse_diagnostic(raw, &graph());
        assert_eq!(reply.text, "Look at IRIS");
        assert_eq!(reply.highlights.into_iter().collect::<Vec<_>>(), vec!["iris"]);
    }

    #[test]
    fn test_diagnostic_missing_fields_use_defaults() {
        let reply = parse_diagnostic("{}", &graph());
        assert_eq!(reply.text, DIAGNOSTIC_FALLBACK_MESSAGE);
        assert!(reply.highlights.is_empty());
    }

    #[test]
    fn test_diagnostic_plain_prose() {
        let reply = parse_diagnostic("Is the PACS sending studies?", &graph());
        assert_eq!(reply.text, "Is the PACS sending studies?");
        assert!(reply.highlights.is_empty());
    }

    #[test]
    fn test_dataset_object_form() {
        let raw = r#"Here you go: {"qa_pairs": [{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}]}"#;
        let pairs = parse_dataset(raw).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].answer, "A2");
    }

    #[test]
    fn test_diagnostic_skips_non_string_highlights() {
        let raw = r#"{"responseText":"Check the Unifier cache.","highlightedComponents":["unifier",null]}"#;
        let reply = parse_diagnostic(raw, &graph());
        assert_eq!(reply.text, "Check the Unifier cache.");
        assert_eq!(reply.highlights.into_iter().collect::<Vec<_>>(), vec!["unifier"]);
    }

    #[test]
    fn test_diagnostic_keeps_text_when_highlights_not_a_list() {
        let raw = r#"{"responseText": "Restart the IRIS production.", "highlightedComponents": "iris"}"#;
        let reply = parse_diagnostic(raw, &graph());
        assert_eq!(reply.text, "Restart the IRIS production.");
        assert!(reply.highlights.is_empty());
    }

    #[test]
    fn test_diagnostic_non_string_text_uses_fallback() {
        let raw = r#"{"responseText": 42, "highlightedComponents": ["pacs"]}"#;
        let reply = parse_diagnostic(raw, &graph());
        assert_eq!(reply.text, DIAGNOSTIC_FALLBACK_MESSAGE);
        assert_eq!(reply.highlights.into_iter().collect::<Vec<_>>(), vec!["pacs"]);
    }

    #[test]
    fn test_dataset_without_pairs_is_none() {
        assert_eq!(parse_dataset(r#"{"note": "nothing"}"#), None);
        assert_eq!(parse_dataset(r#"{"qa_pairs": []}"#), None);
        assert_eq!(parse_dataset("[]"), None);
    }

    #[test]
    fn test_dataset_salvages_broken_array() {
        let raw = r#"[{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": }, {"question": "Q3", "answer": "A3"}]"#;
        let pairs = parse_dataset(raw).unwrap();
        let questions: Vec<&str> = pairs.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["Q1", "Q3"]);
    }

    #[test]
    fn test_dataset_bare_single_element_array() {
        let pairs = parse_dataset(r#"[{"question": "Q", "answer": "A"}]"#).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_dataset_unparseable() {
        assert_eq!(parse_dataset("no json here"), None);
    }
}
