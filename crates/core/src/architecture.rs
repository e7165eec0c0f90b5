//! System architecture graph and its query layer.
//!
//! The graph is static: components and directed, protocol-labelled connections are loaded
//! once from the catalogue and never change. Queries preserve the declaration order of the
//! connection list.
//!
//! Two highlight semantics are exposed side by side:
//! - [`SystemGraph::classify_by_focus`]: one focused component plus its neighbours (the
//!   architecture explorer).
//! - [`SystemGraph::classify_by_membership`]: an arbitrary set of highlighted ids (the
//!   diagnostic chat, where the AI names several components at once).
//!
//! They answer different questions and are deliberately not unified.

use crate::{NavigatorError, NavigatorResult};
use navigator_types::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Set of component ids a caller wants emphasised.
pub type HighlightSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Online,
    Degraded,
    Offline,
}

impl ServiceState {
    pub fn slug(self) -> &'static str {
        match self {
            ServiceState::Online => "online",
            ServiceState::Degraded => "degraded",
            ServiceState::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentErrors {
    pub count: u32,
    pub last_error: String,
}

/// Sample status record carried by a component. There is no live telemetry feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub service_state: ServiceState,
    /// Cache utilisation, 0–100.
    pub cache_usage_percent: u8,
    pub recent_errors: RecentErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: Identifier,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComponentStatus>,
}

/// Protocol carried by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "DICOM")]
    Dicom,
    #[serde(rename = "HL7")]
    Hl7,
    #[serde(rename = "API")]
    Api,
    #[serde(rename = "HTTPS")]
    Https,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Dicom => "DICOM",
            Protocol::Hl7 => "HL7",
            Protocol::Api => "API",
            Protocol::Https => "HTTPS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: Identifier,
    pub to: Identifier,
    pub protocol: Protocol,
}

impl Connection {
    fn touches(&self, id: &str) -> bool {
        self.from.as_str() == id || self.to.as_str() == id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
    Both,
}

/// Display emphasis of a component or connection relative to a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Selected,
    Related,
    Unfocused,
    Default,
}

impl Emphasis {
    pub fn slug(self) -> &'static str {
        match self {
            Emphasis::Selected => "selected",
            Emphasis::Related => "related",
            Emphasis::Unfocused => "unfocused",
            Emphasis::Default => "default",
        }
    }
}

/// Something that can be classified: a component (by id) or a connection.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Component(&'a str),
    Connection(&'a Connection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentEmphasis {
    pub id: Identifier,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEmphasis {
    pub from: Identifier,
    pub to: Identifier,
    pub protocol: Protocol,
    pub emphasis: Emphasis,
}

/// Every component and connection of the graph with its emphasis, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphView {
    pub components: Vec<ComponentEmphasis>,
    pub connections: Vec<ConnectionEmphasis>,
}

#[derive(Debug, Deserialize)]
struct ArchitectureFile {
    components: Vec<Component>,
    connections: Vec<Connection>,
}

#[derive(Debug, Clone)]
pub struct SystemGraph {
    components: Vec<Component>,
    connections: Vec<Connection>,
}

impl SystemGraph {
    /// Builds a graph, checking that ids are unique, status figures are in range and every
    /// connection endpoint names a declared component.
    pub fn new(components: Vec<Component>, connections: Vec<Connection>) -> NavigatorResult<Self> {
        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.id.as_str()) {
                return Err(NavigatorError::DuplicateComponent(
                    component.id.to_string(),
                ));
            }
            if let Some(status) = &component.status {
                if status.cache_usage_percent > 100 {
                    return Err(NavigatorError::InvalidInput(format!(
                        "cache usage for '{}' must be between 0 and 100",
                        component.id
                    )));
                }
            }
        }

        for connection in &connections {
            if !seen.contains(connection.from.as_str()) || !seen.contains(connection.to.as_str()) {
                return Err(NavigatorError::InvalidConnection {
                    from: connection.from.to_string(),
                    to: connection.to.to_string(),
                });
            }
        }

        Ok(Self {
            components,
            connections,
        })
    }

    /// Parses the architecture YAML document (`components` + `connections`).
    pub fn from_yaml(source: &str) -> NavigatorResult<Self> {
        let file: ArchitectureFile =
            serde_yaml::from_str(source).map_err(|source| NavigatorError::Catalog {
                name: "architecture",
                source,
            })?;
        Self::new(file.components, file.connections)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.iter().any(|c| c.id.as_str() == id)
    }

    pub fn component(&self, id: &str) -> NavigatorResult<&Component> {
        self.components
            .iter()
            .find(|c| c.id.as_str() == id)
            .ok_or_else(|| NavigatorError::UnknownComponent(id.to_owned()))
    }

    /// Connections touching `id` in the given direction, in declaration order.
    pub fn neighbors(&self, id: &str, direction: Direction) -> NavigatorResult<Vec<&Connection>> {
        self.component(id)?;
        Ok(self
            .connections
            .iter()
            .filter(|conn| match direction {
                Direction::Incoming => conn.to.as_str() == id,
                Direction::Outgoing => conn.from.as_str() == id,
                Direction::Both => conn.touches(id),
            })
            .collect())
    }

    /// Ids adjacent to `id` in either direction. `id` itself is never included, even when a
    /// self-loop exists.
    pub fn related_ids(&self, id: &str) -> NavigatorResult<BTreeSet<&str>> {
        let related = self
            .neighbors(id, Direction::Both)?
            .into_iter()
            .flat_map(|conn| [conn.from.as_str(), conn.to.as_str()])
            .filter(|other| *other != id)
            .collect();
        Ok(related)
    }

    /// Single-focus classification.
    ///
    /// With no focus everything is `Default`. Otherwise the focused component is `Selected`,
    /// its neighbours and the connections touching it are `Related`, and the rest is
    /// `Unfocused`.
    pub fn classify_by_focus(&self, focus: Option<&str>, entity: EntityRef<'_>) -> Emphasis {
        let Some(focus) = focus else {
            return Emphasis::Default;
        };

        match entity {
            EntityRef::Component(id) if id == focus => Emphasis::Selected,
            EntityRef::Component(id) => {
                let adjacent = self
                    .connections
                    .iter()
                    .any(|conn| conn.touches(focus) && conn.touches(id));
                if adjacent {
                    Emphasis::Related
                } else {
                    Emphasis::Unfocused
                }
            }
            EntityRef::Connection(conn) if conn.touches(focus) => Emphasis::Related,
            EntityRef::Connection(_) => Emphasis::Unfocused,
        }
    }

    /// Membership classification.
    ///
    /// With an empty set everything is `Default`. Otherwise a component is `Related` when it
    /// is a member, and a connection is `Related` only when both of its endpoints are.
    pub fn classify_by_membership(&self, highlight: &HighlightSet, entity: EntityRef<'_>) -> Emphasis {
        if highlight.is_empty() {
            return Emphasis::Default;
        }

        let member = |id: &str| highlight.contains(id);
        let highlighted = match entity {
            EntityRef::Component(id) => member(id),
            EntityRef::Connection(conn) => member(conn.from.as_str()) && member(conn.to.as_str()),
        };

        if highlighted {
            Emphasis::Related
        } else {
            Emphasis::Unfocused
        }
    }

    /// Classifies the whole graph around `focus`.
    pub fn focus_view(&self, focus: Option<&str>) -> NavigatorResult<GraphView> {
        if let Some(id) = focus {
            self.component(id)?;
        }
        Ok(self.view(|entity| self.classify_by_focus(focus, entity)))
    }

    /// Classifies the whole graph against a highlight set.
    pub fn membership_view(&self, highlight: &HighlightSet) -> GraphView {
        self.view(|entity| self.classify_by_membership(highlight, entity))
    }

    /// Keeps only ids naming a known component; the gateway may return anything.
    pub fn retain_known(&self, ids: impl IntoIterator<Item = String>) -> HighlightSet {
        ids.into_iter().filter(|id| self.contains(id)).collect()
    }

    fn view(&self, classify: impl Fn(EntityRef<'_>) -> Emphasis) -> GraphView {
        GraphView {
            components: self
                .components
                .iter()
                .map(|c| ComponentEmphasis {
                    id: c.id.clone(),
                    emphasis: classify(EntityRef::Component(c.id.as_str())),
                })
                .collect(),
            connections: self
                .connections
                .iter()
                .map(|conn| ConnectionEmphasis {
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                    protocol: conn.protocol,
                    emphasis: classify(EntityRef::Connection(conn)),
                })
                .collect(),
        }
    }
}
