//! Wire types of the REST surface and their translation from domain values.

use navigator_core::architecture::{ComponentEmphasis, ConnectionEmphasis};
use navigator_core::catalog::EscalationEntry;
use navigator_core::session::{DocDraft, Explanation};
use navigator_core::{
    ChatMessage, ChatPanel, Component, Connection, DiagnosticChat, GraphView, HubSession,
    IncidentDoc, QaPair, Role, Sender, Tab, TreeNode, WizardKind,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub gateway_configured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

// Roles

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TabRes {
    pub id: String,
    pub label: String,
    pub description: String,
}

impl From<Tab> for TabRes {
    fn from(tab: Tab) -> Self {
        Self {
            id: tab.slug().into(),
            label: tab.label().into(),
            description: tab.description().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleRes {
    pub id: String,
    pub label: String,
    pub description: String,
    pub tabs: Vec<TabRes>,
    pub default_tab: String,
}

impl From<Role> for RoleRes {
    fn from(role: Role) -> Self {
        Self {
            id: role.slug().into(),
            label: role.label().into(),
            description: role.description().into(),
            tabs: role.visible_tabs().into_iter().map(TabRes::from).collect(),
            default_tab: role.default_tab().slug().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RolesRes {
    pub roles: Vec<RoleRes>,
}

// Architecture

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatusRes {
    pub service_state: String,
    pub cache_usage_percent: u8,
    pub recent_error_count: u32,
    pub last_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentRes {
    pub id: String,
    pub name: String,
    pub description: String,
    pub details: Vec<String>,
    pub status: Option<ComponentStatusRes>,
}

impl From<&Component> for ComponentRes {
    fn from(c: &Component) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            description: c.description.clone(),
            details: c.details.clone(),
            status: c.status.as_ref().map(|s| ComponentStatusRes {
                service_state: s.service_state.slug().into(),
                cache_usage_percent: s.cache_usage_percent,
                recent_error_count: s.recent_errors.count,
                last_error: s.recent_errors.last_error.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionRes {
    pub from: String,
    pub to: String,
    pub protocol: String,
}

impl From<&Connection> for ConnectionRes {
    fn from(c: &Connection) -> Self {
        Self {
            from: c.from.to_string(),
            to: c.to.to_string(),
            protocol: c.protocol.label().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchitectureRes {
    pub components: Vec<ComponentRes>,
    pub connections: Vec<ConnectionRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentDetailRes {
    pub component: ComponentRes,
    pub incoming: Vec<ConnectionRes>,
    pub outgoing: Vec<ConnectionRes>,
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentEmphasisRes {
    pub id: String,
    /// One of `selected`, `related`, `unfocused`, `default`.
    pub emphasis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionEmphasisRes {
    pub from: String,
    pub to: String,
    pub protocol: String,
    pub emphasis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GraphViewRes {
    pub components: Vec<ComponentEmphasisRes>,
    pub connections: Vec<ConnectionEmphasisRes>,
}

impl From<&ComponentEmphasis> for ComponentEmphasisRes {
    fn from(c: &ComponentEmphasis) -> Self {
        Self {
            id: c.id.to_string(),
            emphasis: c.emphasis.slug().into(),
        }
    }
}

impl From<&ConnectionEmphasis> for ConnectionEmphasisRes {
    fn from(c: &ConnectionEmphasis) -> Self {
        Self {
            from: c.from.to_string(),
            to: c.to.to_string(),
            protocol: c.protocol.label().into(),
            emphasis: c.emphasis.slug().into(),
        }
    }
}

impl From<GraphView> for GraphViewRes {
    fn from(view: GraphView) -> Self {
        Self {
            components: view.components.iter().map(Into::into).collect(),
            connections: view.connections.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HighlightReq {
    pub ids: Vec<String>,
}

// Wizards

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WizardRes {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub sample_prompts: Vec<String>,
}

impl From<WizardKind> for WizardRes {
    fn from(kind: WizardKind) -> Self {
        Self {
            kind: kind.slug().into(),
            title: kind.title().into(),
            description: kind.description().into(),
            sample_prompts: kind.sample_prompts().iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WizardsRes {
    pub wizards: Vec<WizardRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TreeOptionRes {
    pub index: usize,
    pub text: String,
    pub next: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TreeNodeRes {
    pub key: String,
    pub text: String,
    /// One of `info`, `normal`, `warning`, `critical`.
    pub category: String,
    pub options: Vec<TreeOptionRes>,
    pub resolution: Option<String>,
    pub terminal: bool,
}

impl TreeNodeRes {
    pub fn new(key: &str, node: &TreeNode) -> Self {
        Self {
            key: key.to_owned(),
            text: node.text.clone(),
            category: node.category.slug().into(),
            options: node
                .options()
                .iter()
                .enumerate()
                .map(|(index, o)| TreeOptionRes {
                    index,
                    text: o.text.clone(),
                    next: o.next.to_string(),
                })
                .collect(),
            resolution: node.resolution().map(str::to_owned),
            terminal: node.is_terminal(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WizardTreeRes {
    pub wizard: WizardRes,
    pub nodes: Vec<TreeNodeRes>,
    /// Nodes not reachable from `start`.
    pub orphans: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WizardSessionRes {
    pub id: String,
    pub kind: String,
    pub node: TreeNodeRes,
    pub history: Vec<String>,
    pub can_go_back: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChooseReq {
    pub option: usize,
}

// Support center

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentSummaryRes {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentsRes {
    pub incidents: Vec<IncidentSummaryRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentRes {
    pub id: String,
    pub title: String,
    /// Parsed body: headings, lists (items with depth, optional bold lead and inline
    /// content) and paragraphs. Inline content is text or citations carrying their ids.
    #[schema(value_type = Object)]
    pub segments: serde_json::Value,
}

impl IncidentRes {
    pub fn new(doc: &IncidentDoc) -> serde_json::Result<Self> {
        Ok(Self {
            id: doc.id.to_string(),
            title: doc.title.clone(),
            segments: serde_json::to_value(doc.segments())?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscalationRowRes {
    pub component: String,
    pub first_line: String,
    pub engineering: String,
    pub vendor_contact: String,
}

impl From<&EscalationEntry> for EscalationRowRes {
    fn from(e: &EscalationEntry) -> Self {
        Self {
            component: e.component.clone(),
            first_line: e.first_line.clone(),
            engineering: e.engineering.clone(),
            vendor_contact: e.vendor_contact.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscalationMatrixRes {
    pub rows: Vec<EscalationRowRes>,
}

// Knowledge engine

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskReq {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskRes {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeChatRes {
    pub id: String,
    pub messages: Vec<MessageRes>,
    pub loading: bool,
}

impl KnowledgeChatRes {
    pub fn new(id: &str, chat: &ChatPanel) -> Self {
        Self {
            id: id.to_owned(),
            messages: chat.messages().iter().map(Into::into).collect(),
            loading: chat.is_loading(),
        }
    }
}

// Support hub

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    /// `user` or `bot`.
    pub sender: String,
    pub text: String,
}

impl From<&ChatMessage> for MessageRes {
    fn from(m: &ChatMessage) -> Self {
        Self {
            sender: match m.sender {
                Sender::User => "user".into(),
                Sender::Bot => "bot".into(),
            },
            text: m.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticRes {
    pub kind: String,
    pub title: String,
    pub messages: Vec<MessageRes>,
    pub highlights: Vec<String>,
    pub loading: bool,
    pub view: GraphViewRes,
}

impl DiagnosticRes {
    /// `view` is the membership classification of the chat's highlight set.
    pub fn new(chat: &DiagnosticChat, view: GraphView) -> Self {
        Self {
            kind: chat.kind().slug().into(),
            title: chat.kind().title().into(),
            messages: chat.messages().iter().map(Into::into).collect(),
            highlights: chat.highlights().iter().cloned().collect(),
            loading: chat.is_loading(),
            view: view.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentationRes {
    pub topic: Option<String>,
    pub document: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

impl From<&DocDraft> for DocumentationRes {
    fn from(d: &DocDraft) -> Self {
        Self {
            topic: d.topic().map(str::to_owned),
            document: d.document().map(str::to_owned),
            error: d.error().map(str::to_owned),
            loading: d.is_loading(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExplanationRes {
    pub subject: Option<String>,
    pub content: Option<String>,
    pub loading: bool,
}

impl From<&Explanation> for ExplanationRes {
    fn from(e: &Explanation) -> Self {
        Self {
            subject: e.subject().map(str::to_owned),
            content: e.content().map(str::to_owned),
            loading: e.is_loading(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HubRes {
    pub id: String,
    pub context: Vec<String>,
    pub assistant: Vec<MessageRes>,
    pub assistant_loading: bool,
    pub diagnostic: Option<DiagnosticRes>,
    pub documentation: DocumentationRes,
    pub explanation: ExplanationRes,
}

impl HubRes {
    pub fn new(hub: &HubSession, diagnostic: Option<DiagnosticRes>) -> Self {
        Self {
            id: hub.id().to_string(),
            context: hub.context().iter().map(str::to_owned).collect(),
            assistant: hub.assistant().messages().iter().map(Into::into).collect(),
            assistant_loading: hub.assistant().is_loading(),
            diagnostic,
            documentation: hub.documentation().into(),
            explanation: hub.explanation().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatReq {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenDiagnosticReq {
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleContextReq {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleContextRes {
    pub selected: bool,
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentationReq {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExplainReq {
    pub text: String,
}

// Datasets

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetOptionsRes {
    pub topics: Vec<String>,
    pub personas: Vec<String>,
    pub min_count: u32,
    pub max_count: u32,
    pub default_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetReq {
    pub topic: String,
    pub persona: String,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QaPairRes {
    pub question: String,
    pub answer: String,
}

impl From<QaPair> for QaPairRes {
    fn from(p: QaPair) -> Self {
        Self {
            question: p.question,
            answer: p.answer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedFromRes {
    pub topic: String,
    pub persona: String,
    pub count: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetRes {
    /// Suggested download name.
    pub filename: String,
    pub generated_from: GeneratedFromRes,
    pub dataset: Vec<QaPairRes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::Catalog;

    #[test]
    fn test_role_res_lists_tabs_in_order() {
        let res = RoleRes::from(Role::SupportEngineer);
        let ids: Vec<&str> = res.tabs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["support-hub", "architecture"]);
        assert_eq!(res.default_tab, "support-hub");
    }

    #[test]
    fn test_component_res_carries_status() {
        let catalog = Catalog::builtin().unwrap();
        let res = ComponentRes::from(catalog.graph().component("unifier").unwrap());
        let status = res.status.unwrap();
        assert_eq!(status.service_state, "online");
        assert_eq!(status.cache_usage_percent, 85);
    }

    #[test]
    fn test_tree_node_res_indexes_options() {
        let catalog = Catalog::builtin().unwrap();
        let tree = catalog.tree(WizardKind::Dicom);
        let res = TreeNodeRes::new("start", tree.current_node("start").unwrap());
        assert_eq!(res.category, "info");
        assert_eq!(res.options[2].index, 2);
        assert_eq!(res.options[2].next, "cloud");
        assert!(!res.terminal);
    }

    #[test]
    fn test_incident_res_segments_are_tagged() {
        let catalog = Catalog::builtin().unwrap();
        let res = IncidentRes::new(catalog.incident("dicom").unwrap()).unwrap();
        let first = &res.segments[0];
        assert_eq!(first["type"], "paragraph");
    }
}
