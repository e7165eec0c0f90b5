//! Panel state machines.
//!
//! Each panel is plain data plus transition functions. A gateway round trip is split in two:
//! `begin_*` validates the input, records the user's side and hands out a [`Ticket`];
//! `complete_*` applies the outcome if the ticket is still the panel's current one. Holding
//! a ticket is what "loading" means. A second `begin_*` while one is outstanding fails with
//! [`NavigatorError::Busy`], and resetting or closing a panel invalidates its ticket so that
//! a late reply is dropped instead of overwriting newer state.
//!
//! Nothing here awaits. Callers take a lock, call `begin_*`, release it, talk to the
//! gateway, then lock again for `complete_*`.

use crate::architecture::HighlightSet;
use crate::constants::{
    ASSISTANT_GREETING, CHAT_FAILURE_MESSAGE, EXPLANATION_FAILURE_MESSAGE, KNOWLEDGE_GREETING,
};
use crate::context::{build_prompt, ContextSet};
use crate::wizards::WizardKind;
use crate::{NavigatorError, NavigatorResult};
use navigator_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Proof that a gateway call was started for a specific panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(Uuid);

/// In-flight tracking for one panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Gate {
    in_flight: Option<Ticket>,
}

impl Gate {
    fn begin(&mut self) -> NavigatorResult<Ticket> {
        if self.in_flight.is_some() {
            return Err(NavigatorError::Busy);
        }
        let ticket = Ticket(Uuid::new_v4());
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Releases the gate if `ticket` is the current one.
    fn finish(&mut self, ticket: Ticket, panel: &str) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            tracing::warn!("dropping stale {panel} response");
            false
        }
    }

    fn invalidate(&mut self) {
        self.in_flight = None;
    }

    fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// A started chat turn: what to send to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub ticket: Ticket,
    pub input: NonEmptyText,
    /// Conversation so far, ending with the new user message.
    pub history: Vec<ChatMessage>,
}

/// Result of a chat gateway call as the panel sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Reply(String),
    Failed,
}

/// Result of a diagnostic gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticOutcome {
    Reply {
        text: String,
        highlights: HighlightSet,
    },
    Failed,
}

/// Message list plus the in-flight gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPanel {
    greeting: String,
    messages: Vec<ChatMessage>,
    gate: Gate,
}

impl ChatPanel {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![ChatMessage::bot(greeting.clone())],
            greeting,
            gate: Gate::default(),
        }
    }

    pub fn knowledge() -> Self {
        Self::new(KNOWLEDGE_GREETING)
    }

    pub fn assistant() -> Self {
        Self::new(ASSISTANT_GREETING)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    /// Appends the user message and starts a turn. Blank input is a no-op (`Ok(None)`).
    pub fn begin_turn(&mut self, input: &str) -> NavigatorResult<Option<PendingTurn>> {
        let Some(input) = NonEmptyText::parse_optional(input) else {
            return Ok(None);
        };
        let ticket = self.gate.begin()?;
        self.messages.push(ChatMessage::user(input.as_str()));
        Ok(Some(PendingTurn {
            ticket,
            input,
            history: self.messages.clone(),
        }))
    }

    /// Appends the bot reply, or the failure message. Returns `false` for a stale ticket.
    pub fn complete_turn(&mut self, ticket: Ticket, outcome: TurnOutcome) -> bool {
        if !self.gate.finish(ticket, "chat") {
            return false;
        }
        let text = match outcome {
            TurnOutcome::Reply(text) => text,
            TurnOutcome::Failed => CHAT_FAILURE_MESSAGE.to_owned(),
        };
        self.messages.push(ChatMessage::bot(text));
        true
    }

    /// Back to the greeting only. Any outstanding turn is abandoned.
    pub fn reset(&mut self) {
        self.gate.invalidate();
        self.messages = vec![ChatMessage::bot(self.greeting.clone())];
    }
}

/// Free-form diagnostic chat for one wizard kind, with the components the AI pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticChat {
    kind: WizardKind,
    chat: ChatPanel,
    highlights: HighlightSet,
}

impl DiagnosticChat {
    pub fn open(kind: WizardKind) -> Self {
        Self {
            kind,
            chat: ChatPanel::new(kind.greeting()),
            highlights: HighlightSet::new(),
        }
    }

    pub fn kind(&self) -> WizardKind {
        self.kind
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn is_loading(&self) -> bool {
        self.chat.is_loading()
    }

    pub fn begin_turn(&mut self, input: &str) -> NavigatorResult<Option<PendingTurn>> {
        self.chat.begin_turn(input)
    }

    /// Appends the reply and replaces the highlight set. A failure clears the highlights.
    pub fn complete_turn(&mut self, ticket: Ticket, outcome: DiagnosticOutcome) -> bool {
        let (turn, highlights) = match outcome {
            DiagnosticOutcome::Reply { text, highlights } => (TurnOutcome::Reply(text), highlights),
            DiagnosticOutcome::Failed => (TurnOutcome::Failed, HighlightSet::new()),
        };
        if !self.chat.complete_turn(ticket, turn) {
            return false;
        }
        self.highlights = highlights;
        true
    }
}

/// A started documentation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDocument {
    pub ticket: Ticket,
    pub topic: NonEmptyText,
    /// Knowledge document, selected context and topic, already assembled.
    pub prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocDraft {
    topic: Option<NonEmptyText>,
    document: Option<String>,
    error: Option<String>,
    gate: Gate,
}

impl DocDraft {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_ref().map(NonEmptyText::as_str)
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    fn begin(&mut self, topic: NonEmptyText) -> NavigatorResult<Ticket> {
        let ticket = self.gate.begin()?;
        self.topic = Some(topic);
        self.document = None;
        self.error = None;
        Ok(ticket)
    }

    /// Stores the generated document, or the error string shown in its place.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<String, String>) -> bool {
        if !self.gate.finish(ticket, "documentation") {
            return false;
        }
        match outcome {
            Ok(document) => self.document = Some(document),
            Err(error) => self.error = Some(error),
        }
        true
    }
}

/// Explanation of a single bot message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanation {
    subject: Option<String>,
    content: Option<String>,
    gate: Gate,
}

impl Explanation {
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    /// Blank text is a no-op.
    pub fn begin(&mut self, text: &str) -> NavigatorResult<Option<(Ticket, NonEmptyText)>> {
        let Some(text) = NonEmptyText::parse_optional(text) else {
            return Ok(None);
        };
        let ticket = self.gate.begin()?;
        self.subject = Some(text.to_string());
        self.content = None;
        Ok(Some((ticket, text)))
    }

    pub fn complete(&mut self, ticket: Ticket, outcome: TurnOutcome) -> bool {
        if !self.gate.finish(ticket, "explanation") {
            return false;
        }
        self.content = Some(match outcome {
            TurnOutcome::Reply(text) => text,
            TurnOutcome::Failed => EXPLANATION_FAILURE_MESSAGE.to_owned(),
        });
        true
    }
}

/// The integrated support hub: shared context plus the panels that read it.
///
/// The hub is the only writer of the context set and the documentation draft; the
/// diagnostic and assistant panels reach them through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSession {
    id: Uuid,
    context: ContextSet,
    assistant: ChatPanel,
    diagnostic: Option<DiagnosticChat>,
    documentation: DocDraft,
    explanation: Explanation,
}

impl Default for HubSession {
    fn default() -> Self {
        Self::new()
    }
}

impl HubSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            context: ContextSet::new(),
            assistant: ChatPanel::assistant(),
            diagnostic: None,
            documentation: DocDraft::default(),
            explanation: Explanation::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &ContextSet {
        &self.context
    }

    /// Returns whether `text` is selected afterwards.
    pub fn toggle_context(&mut self, text: &str) -> bool {
        self.context.toggle(text)
    }

    pub fn assistant(&self) -> &ChatPanel {
        &self.assistant
    }

    pub fn assistant_mut(&mut self) -> &mut ChatPanel {
        &mut self.assistant
    }

    pub fn diagnostic(&self) -> Option<&DiagnosticChat> {
        self.diagnostic.as_ref()
    }

    pub fn diagnostic_mut(&mut self) -> NavigatorResult<&mut DiagnosticChat> {
        self.diagnostic
            .as_mut()
            .ok_or(NavigatorError::NoDiagnosticChat)
    }

    /// Opens a diagnostic chat, replacing (and abandoning) any that is open.
    pub fn open_diagnostic(&mut self, kind: WizardKind) -> &DiagnosticChat {
        self.diagnostic.insert(DiagnosticChat::open(kind))
    }

    pub fn close_diagnostic(&mut self) -> NavigatorResult<()> {
        self.diagnostic
            .take()
            .map(|_| ())
            .ok_or(NavigatorError::NoDiagnosticChat)
    }

    pub fn documentation(&self) -> &DocDraft {
        &self.documentation
    }

    pub fn documentation_mut(&mut self) -> &mut DocDraft {
        &mut self.documentation
    }

    /// Starts a documentation request grounded on `knowledge_base` and the selected context.
    /// A blank topic is a no-op.
    pub fn begin_documentation(
        &mut self,
        topic: &str,
        knowledge_base: &str,
    ) -> NavigatorResult<Option<PendingDocument>> {
        let Some(topic) = NonEmptyText::parse_optional(topic) else {
            return Ok(None);
        };
        let prompt = build_prompt(knowledge_base, &self.context, topic.as_str());
        let ticket = self.documentation.begin(topic.clone())?;
        Ok(Some(PendingDocument {
            ticket,
            topic,
            prompt,
        }))
    }

    pub fn explanation(&self) -> &Explanation {
        &self.explanation
    }

    pub fn explanation_mut(&mut self) -> &mut Explanation {
        &mut self.explanation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ADDITIONAL_CONTEXT_MARKER;

    #[test]
    fn test_chat_opens_with_greeting() {
        let chat = ChatPanel::knowledge();
        assert_eq!(chat.messages(), &[ChatMessage::bot(KNOWLEDGE_GREETING)]);
        assert!(!chat.is_loading());
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut chat = ChatPanel::assistant();
        assert_eq!(chat.begin_turn("   ").unwrap(), None);
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.is_loading());
    }

    #[test]
    fn test_turn_round_trip() {
        let mut chat = ChatPanel::assistant();
        let turn = chat.begin_turn("  Where do ORU messages go? ").unwrap().unwrap();
        assert_eq!(turn.input.as_str(), "Where do ORU messages go?");
        assert_eq!(turn.history.last(), Some(&ChatMessage::user("Where do ORU messages go?")));
        assert!(chat.is_loading());

        assert!(chat.complete_turn(turn.ticket, TurnOutcome::Reply("To the EMR.".into())));
        assert!(!chat.is_loading());
        assert_eq!(chat.messages().last(), Some(&ChatMessage::bot("To the EMR.")));
    }

    #[test]
    fn test_second_submit_while_loading_is_busy() {
        let mut chat = ChatPanel::assistant();
        let _turn = chat.begin_turn("first").unwrap().unwrap();
        assert!(matches!(chat.begin_turn("second"), Err(NavigatorError::Busy)));
        assert_eq!(chat.messages().len(), 2);
    }

    #[test]
    fn test_failed_turn_appends_failure_message() {
        let mut chat = ChatPanel::assistant();
        let turn = chat.begin_turn("hello").unwrap().unwrap();
        chat.complete_turn(turn.ticket, TurnOutcome::Failed);
        assert_eq!(chat.messages().last().unwrap().text, CHAT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_reset_drops_late_reply() {
        let mut chat = ChatPanel::assistant();
        let turn = chat.begin_turn("hello").unwrap().unwrap();
        chat.reset();
        assert!(!chat.complete_turn(turn.ticket, TurnOutcome::Reply("late".into())));
        assert_eq!(chat.messages(), &[ChatMessage::bot(ASSISTANT_GREETING)]);

        // A new turn after reset gets its own ticket.
        let fresh = chat.begin_turn("again").unwrap().unwrap();
        assert_ne!(fresh.ticket, turn.ticket);
    }

    #[test]
    fn test_diagnostic_reply_replaces_highlights() {
        let mut chat = DiagnosticChat::open(WizardKind::Dicom);
        assert!(chat.messages()[0].text.starts_with("Starting the DICOM Issues Wizard."));

        let turn = chat.begin_turn("Images are loading very slowly.").unwrap().unwrap();
        let highlights: HighlightSet = ["pacs".to_owned(), "unifier".to_owned()].into();
        chat.complete_turn(
            turn.ticket,
            DiagnosticOutcome::Reply {
                text: "Check the Unifier cache.".into(),
                highlights: highlights.clone(),
            },
        );
        assert_eq!(chat.highlights(), &highlights);

        let turn = chat.begin_turn("Still slow").unwrap().unwrap();
        chat.complete_turn(turn.ticket, DiagnosticOutcome::Failed);
        assert!(chat.highlights().is_empty());
        assert_eq!(chat.messages().len(), 5);
    }

    #[test]
    fn test_hub_toggle_context_twice() {
        let mut hub = HubSession::new();
        assert!(hub.toggle_context("Bot: purge old studies"));
        assert!(!hub.toggle_context("Bot: purge old studies"));
        assert!(hub.context().is_empty());
        hub.toggle_context("a");
        hub.toggle_context("b");
        assert_eq!(hub.context().len(), 2);
    }

    #[test]
    fn test_hub_documentation_uses_context() {
        let mut hub = HubSession::new();
        let pending = hub.begin_documentation("Missing reports", "KB").unwrap().unwrap();
        assert!(!pending.prompt.contains(ADDITIONAL_CONTEXT_MARKER));
        hub.documentation_mut()
            .complete(pending.ticket, Err("quota exceeded".into()));
        assert_eq!(hub.documentation().error(), Some("quota exceeded"));

        hub.toggle_context("User: the queue is stuck");
        let pending = hub.begin_documentation("Missing reports", "KB").unwrap().unwrap();
        assert!(pending.prompt.starts_with("KB"));
        assert!(pending.prompt.contains("- User: the queue is stuck"));
        assert!(hub.documentation().error().is_none());
        assert!(matches!(
            hub.begin_documentation("Other", "KB"),
            Err(NavigatorError::Busy)
        ));

        hub.documentation_mut()
            .complete(pending.ticket, Ok("# Runbook".into()));
        assert_eq!(hub.documentation().document(), Some("# Runbook"));
        assert_eq!(hub.documentation().topic(), Some("Missing reports"));
    }

    #[test]
    fn test_hub_blank_topic_is_noop() {
        let mut hub = HubSession::new();
        assert_eq!(hub.begin_documentation(" ", "KB").unwrap(), None);
        assert!(!hub.documentation().is_loading());
    }

    #[test]
    fn test_reopening_diagnostic_drops_old_reply() {
        let mut hub = HubSession::new();
        hub.open_diagnostic(WizardKind::Hl7);
        let turn = hub
            .diagnostic_mut()
            .unwrap()
            .begin_turn("report missing")
            .unwrap()
            .unwrap();

        hub.open_diagnostic(WizardKind::Dicom);
        let chat = hub.diagnostic_mut().unwrap();
        assert!(!chat.complete_turn(turn.ticket, DiagnosticOutcome::Failed));
        assert_eq!(chat.kind(), WizardKind::Dicom);
        assert_eq!(chat.messages().len(), 1);

        hub.close_diagnostic().unwrap();
        assert!(matches!(
            hub.diagnostic_mut(),
            Err(NavigatorError::NoDiagnosticChat)
        ));
    }

    #[test]
    fn test_explanation_failure_message() {
        let mut hub = HubSession::new();
        let (ticket, text) = hub
            .explanation_mut()
            .begin("Check the IRIS queue.")
            .unwrap()
            .unwrap();
        assert_eq!(text.as_str(), "Check the IRIS queue.");
        hub.explanation_mut().complete(ticket, TurnOutcome::Failed);
        assert_eq!(
            hub.explanation().content(),
            Some(EXPLANATION_FAILURE_MESSAGE)
        );
    }
}
