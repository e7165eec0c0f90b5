//! Incident assessment library and its markdown-lite parser.
//!
//! Bodies use a small dialect:
//! - `### ` starts a heading line.
//! - `* ` (optionally indented, four spaces per level) starts a list item, which may open
//!   with a bold lead `**Label**:`.
//! - `[cite_start]text[cite: ids]` marks a cited span.
//! - Anything else is a paragraph. Blank lines close the current list.
//!
//! [`parse_segments`] is a pure function of the text, independent of any renderer.

use navigator_types::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const HEADING_PREFIX: &str = "### ";
const CITE_START: &str = "[cite_start]";
const CITE_END: &str = "[cite: ";
const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDoc {
    pub id: Identifier,
    pub title: String,
    pub body: String,
}

impl IncidentDoc {
    pub fn segments(&self) -> Vec<Segment> {
        parse_segments(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text { text: String },
    Citation { text: String, ids: String },
}

impl Inline {
    fn text(text: &str) -> Self {
        Inline::Text {
            text: text.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Nesting level, 0 for top-level items.
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<String>,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Heading { text: String },
    List { items: Vec<ListItem> },
    Paragraph { content: Vec<Inline> },
}

pub fn parse_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending: Vec<ListItem> = Vec::new();

    fn flush(segments: &mut Vec<Segment>, pending: &mut Vec<ListItem>) {
        if !pending.is_empty() {
            segments.push(Segment::List {
                items: std::mem::take(pending),
            });
        }
    }

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut segments, &mut pending);
            continue;
        }

        if let Some(heading) = line.strip_prefix(HEADING_PREFIX) {
            flush(&mut segments, &mut pending);
            segments.push(Segment::Heading {
                text: heading.trim().to_owned(),
            });
            continue;
        }

        if let Some(item) = parse_list_item(line) {
            pending.push(item);
            continue;
        }

        flush(&mut segments, &mut pending);
        segments.push(Segment::Paragraph {
            content: parse_inline(line.trim()),
        });
    }

    flush(&mut segments, &mut pending);
    segments
}

fn parse_list_item(line: &str) -> Option<ListItem> {
    let body = line.trim_start();
    let rest = body
        .strip_prefix("* ")
        .or_else(|| body.strip_prefix("*\t"))?;
    let indent = line.len() - body.len();
    let depth = indent / INDENT_WIDTH;

    // A cited span may wrap the bold lead; the lead is lifted out and the span kept open.
    let (cited, rest) = match rest.strip_prefix(CITE_START) {
        Some(inner) => (true, inner),
        None => (false, rest),
    };

    match split_bold_lead(rest) {
        Some((lead, remainder)) => {
            let remainder = if cited {
                format!("{CITE_START}{remainder}")
            } else {
                remainder.to_owned()
            };
            Some(ListItem {
                depth,
                lead: Some(lead.to_owned()),
                content: parse_inline(&remainder),
            })
        }
        None => {
            let content = if cited {
                parse_inline(&format!("{CITE_START}{rest}"))
            } else {
                parse_inline(rest)
            };
            Some(ListItem {
                depth,
                lead: None,
                content,
            })
        }
    }
}

/// Splits `**Label**: rest` into `("Label", "rest")`.
fn split_bold_lead(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix("**")?;
    let end = inner.find("**")?;
    let (label, after) = inner.split_at(end);
    let remainder = after[2..].strip_prefix(':')?;
    Some((label, remainder.trim_start()))
}

/// Splits text into plain runs and cited spans. An unterminated `[cite_start]` stays literal.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(CITE_START) {
        let after_start = &rest[start + CITE_START.len()..];
        let Some(end) = after_start.find(CITE_END) else {
            break;
        };
        let after_end = &after_start[end + CITE_END.len()..];
        let Some(close) = after_end.find(']') else {
            break;
        };

        if start > 0 {
            out.push(Inline::text(&rest[..start]));
        }
        out.push(Inline::Citation {
            text: after_start[..end].to_owned(),
            ids: after_end[..close].to_owned(),
        });
        rest = &after_end[close + 1..];
    }

    if !rest.is_empty() {
        out.push(Inline::text(rest));
    }
    out
}

fn write_inline(out: &mut String, content: &[Inline]) {
    for inline in content {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Citation { text, ids } => {
                let _ = write!(out, "{text} [{ids}]");
            }
        }
    }
}

/// Renders segments as indented plain text for terminals.
pub fn render_plain(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Heading { text } => {
                let _ = writeln!(out, "{}\n", text.to_uppercase());
            }
            Segment::Paragraph { content } => {
                write_inline(&mut out, content);
                out.push_str("\n\n");
            }
            Segment::List { items } => {
                for item in items {
                    out.push_str(&"  ".repeat(item.depth));
                    out.push_str("- ");
                    if let Some(lead) = &item.lead {
                        let _ = write!(out, "{lead}: ");
                    }
                    write_inline(&mut out, &item.content);
                    out.push('\n');
                }
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_then_list_item_with_lead_and_citation() {
        let segments = parse_segments("### Title\n* **Label**: body [cite_start]text[cite: 3]\n");
        assert_eq!(
            segments,
            vec![
                Segment::Heading {
                    text: "Title".into()
                },
                Segment::List {
                    items: vec![ListItem {
                        depth: 0,
                        lead: Some("Label".into()),
                        content: vec![
                            Inline::Text {
                                text: "body ".into()
                            },
                            Inline::Citation {
                                text: "text".into(),
                                ids: "3".into()
                            },
                        ],
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_blank_line_flushes_list() {
        let segments = parse_segments("* one\n* two\n\n* three\nclosing words");
        assert_eq!(segments.len(), 3);
        assert!(matches!(&segments[0], Segment::List { items } if items.len() == 2));
        assert!(matches!(&segments[1], Segment::List { items } if items.len() == 1));
        assert!(matches!(&segments[2], Segment::Paragraph { .. }));
    }

    #[test]
    fn test_paragraph_flushes_list() {
        let segments = parse_segments("* item\nparagraph\n* again");
        assert!(matches!(&segments[0], Segment::List { .. }));
        assert!(matches!(&segments[1], Segment::Paragraph { .. }));
        assert!(matches!(&segments[2], Segment::List { .. }));
    }

    #[test]
    fn test_nested_items_carry_depth() {
        let segments = parse_segments("* **Root**: top\n    * child\n        * grandchild");
        let Segment::List { items } = &segments[0] else {
            panic!("expected list");
        };
        let depths: Vec<usize> = items.iter().map(|i| i.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_cited_bold_lead_is_lifted() {
        let segments =
            parse_segments("* [cite_start]**PowerScribe 360**: The report is stuck[cite: 15, 19].");
        let Segment::List { items } = &segments[0] else {
            panic!("expected list");
        };
        assert_eq!(items[0].lead.as_deref(), Some("PowerScribe 360"));
        assert_eq!(
            items[0].content,
            vec![
                Inline::Citation {
                    text: "The report is stuck".into(),
                    ids: "15, 19".into()
                },
                Inline::Text { text: ".".into() },
            ]
        );
    }

    #[test]
    fn test_multiple_citations_in_one_line() {
        let inline = parse_inline("A. [cite_start]B[cite: 1]. [cite_start]C[cite: 2, 3] end");
        assert_eq!(inline.len(), 5);
        assert!(matches!(&inline[1], Inline::Citation { text, ids } if text == "B" && ids == "1"));
        assert!(
            matches!(&inline[3], Inline::Citation { text, ids } if text == "C" && ids == "2, 3")
        );
    }

    #[test]
    fn test_unterminated_citation_stays_literal() {
        let inline = parse_inline("broken [cite_start]span without end");
        assert_eq!(
            inline,
            vec![Inline::Text {
                text: "broken [cite_start]span without end".into()
            }]
        );
    }

    #[test]
    fn test_bold_without_colon_is_not_a_lead() {
        let segments = parse_segments("* **Bold** but no colon");
        let Segment::List { items } = &segments[0] else {
            panic!("expected list");
        };
        assert!(items[0].lead.is_none());
    }

    #[test]
    fn test_render_plain() {
        let rendered = render_plain(&parse_segments(
            "### Causes\n* **Queue**: backlog [cite_start]seen[cite: 4]",
        ));
        assert_eq!(rendered, "CAUSES\n\n- Queue: backlog seen [4]\n\n");
    }
}
