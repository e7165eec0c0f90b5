//! # Navigator Core
//!
//! Deterministic logic of the Knowledge Navigator support dashboard.
//!
//! This crate holds the static catalogue and every operation that does not need the AI
//! gateway:
//! - System architecture graph and its two highlight classifications
//! - Decision-tree engine and scripted wizard sessions
//! - Context aggregation and documentation prompt assembly
//! - Markdown-lite incident parsing
//! - Role and tab gating
//! - Dataset export
//! - Panel state machines for the chat-style panels
//!
//! **No API concerns**: HTTP servers and gateway clients belong in `api-rest` and
//! `navigator-gateway`.

pub mod architecture;
pub mod catalog;
pub mod constants;
pub mod context;
pub mod dataset;
pub mod decision_tree;
mod error;
pub mod incident;
pub mod roles;
pub mod session;
pub mod wizards;

pub use architecture::{
    Component, Connection, Direction, Emphasis, EntityRef, GraphView, HighlightSet, Protocol,
    SystemGraph,
};
pub use catalog::{Catalog, EscalationEntry};
pub use context::{build_prompt, ContextSet};
pub use dataset::{DatasetExport, DatasetRequest, QaPair};
pub use decision_tree::{DecisionTree, NodeCategory, NodeKind, TreeCursor, TreeNode, TreeOption};
pub use error::{NavigatorError, NavigatorResult};
pub use incident::{parse_segments, IncidentDoc, Inline, ListItem, Segment};
pub use roles::{Role, Tab};
pub use session::{
    ChatMessage, ChatPanel, DiagnosticChat, DiagnosticOutcome, HubSession, PendingDocument,
    PendingTurn, Sender, Ticket, TurnOutcome,
};
pub use wizards::{WizardKind, WizardSession};

pub use navigator_types::{Identifier, NonEmptyText, TextError};
