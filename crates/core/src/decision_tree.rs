//! Decision-tree engine.
//!
//! A [`DecisionTree`] maps node keys to [`TreeNode`]s. Every node is either intermediate
//! (a non-empty, ordered list of options) or terminal (a resolution text); the YAML wire
//! shape expresses this as two optional fields, so translation into [`NodeKind`] is where
//! the "exactly one of" rule is enforced.
//!
//! Transitions are pure functions of `(tree, key, choice)`. [`TreeCursor`] layers the
//! per-session state on top: the current key plus a history stack for stepping back.

use crate::constants::START_NODE_KEY;
use crate::{NavigatorError, NavigatorResult};
use navigator_types::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Display emphasis of a node. Carries no behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Info,
    Normal,
    Warning,
    Critical,
}

impl NodeCategory {
    pub fn slug(self) -> &'static str {
        match self {
            NodeCategory::Info => "info",
            NodeCategory::Normal => "normal",
            NodeCategory::Warning => "warning",
            NodeCategory::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeOption {
    pub text: String,
    pub next: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Intermediate { options: Vec<TreeOption> },
    Terminal { resolution: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub text: String,
    pub category: NodeCategory,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn options(&self) -> &[TreeOption] {
        match &self.kind {
            NodeKind::Intermediate { options } => options,
            NodeKind::Terminal { .. } => &[],
        }
    }

    pub fn resolution(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal { resolution } => Some(resolution),
            NodeKind::Intermediate { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { .. })
    }
}

/// Node shape as authored in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeWire {
    text: String,
    category: NodeCategory,
    #[serde(default)]
    options: Option<Vec<TreeOption>>,
    #[serde(default)]
    resolution: Option<String>,
}

fn translate_node(tree: &str, key: &Identifier, wire: NodeWire) -> NavigatorResult<TreeNode> {
    let kind = match (wire.options, wire.resolution) {
        (Some(_), Some(_)) => {
            return Err(NavigatorError::AmbiguousNode {
                tree: tree.to_owned(),
                key: key.to_string(),
            });
        }
        (Some(options), None) if !options.is_empty() => NodeKind::Intermediate { options },
        (None, Some(resolution)) => NodeKind::Terminal { resolution },
        _ => {
            return Err(NavigatorError::EmptyOptions {
                tree: tree.to_owned(),
                key: key.to_string(),
            });
        }
    };

    Ok(TreeNode {
        text: wire.text,
        category: wire.category,
        kind,
    })
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    name: String,
    nodes: BTreeMap<Identifier, TreeNode>,
}

impl DecisionTree {
    /// Builds a tree, rejecting a missing start node and any option whose `next` key does
    /// not exist in the same tree.
    pub fn new(
        name: impl Into<String>,
        nodes: BTreeMap<Identifier, TreeNode>,
    ) -> NavigatorResult<Self> {
        let tree = Self {
            name: name.into(),
            nodes,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Parses a tree authored as a YAML map of node key to node.
    pub fn from_yaml(name: impl Into<String>, source: &str) -> NavigatorResult<Self> {
        let name = name.into();
        let wire: BTreeMap<Identifier, NodeWire> =
            serde_yaml::from_str(source).map_err(|source| NavigatorError::Catalog {
                name: "decision tree",
                source,
            })?;

        let nodes = wire
            .into_iter()
            .map(|(key, node)| translate_node(&name, &key, node).map(|node| (key, node)))
            .collect::<NavigatorResult<BTreeMap<_, _>>>()?;

        Self::new(name, nodes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Identifier> {
        self.nodes.keys()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Entry key of the tree.
    pub fn reset(&self) -> &'static str {
        START_NODE_KEY
    }

    pub fn current_node(&self, key: &str) -> NavigatorResult<&TreeNode> {
        self.nodes
            .get(key)
            .ok_or_else(|| NavigatorError::UnknownNode {
                tree: self.name.clone(),
                key: key.to_owned(),
            })
    }

    /// Key reached by taking option `index` at `key`.
    pub fn choose(&self, key: &str, index: usize) -> NavigatorResult<&Identifier> {
        let options = self.current_node(key)?.options();
        options
            .get(index)
            .map(|option| &option.next)
            .ok_or_else(|| NavigatorError::InvalidOption {
                key: key.to_owned(),
                index,
                available: options.len(),
            })
    }

    /// Checks the structural invariants. [`DecisionTree::new`] runs this already.
    pub fn validate(&self) -> NavigatorResult<()> {
        if !self.nodes.contains_key(START_NODE_KEY) {
            return Err(NavigatorError::MissingStartNode(self.name.clone()));
        }

        for (key, node) in &self.nodes {
            if let Some(option) = node
                .options()
                .iter()
                .find(|option| !self.nodes.contains_key(&option.next))
            {
                return Err(NavigatorError::DanglingReference {
                    tree: self.name.clone(),
                    from: key.to_string(),
                    next: option.next.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Keys reachable from the start node.
    pub fn reachable(&self) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([START_NODE_KEY]);

        while let Some(key) = queue.pop_front() {
            let Some((key, node)) = self.nodes.get_key_value(key) else {
                continue;
            };
            if !seen.insert(key.as_str()) {
                continue;
            }
            queue.extend(node.options().iter().map(|option| option.next.as_str()));
        }
        seen
    }

    /// Nodes that exist but cannot be reached from the start node.
    ///
    /// Not an error, but usually a sign of a forgotten branch.
    pub fn orphans(&self) -> Vec<&Identifier> {
        let reachable = self.reachable();
        self.nodes
            .keys()
            .filter(|key| !reachable.contains(key.as_str()))
            .collect()
    }
}

/// Position of one wizard session within a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeCursor {
    current: String,
    history: Vec<String>,
}

impl Default for TreeCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeCursor {
    pub fn new() -> Self {
        Self {
            current: START_NODE_KEY.to_owned(),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Keys visited before the current one, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn node<'t>(&self, tree: &'t DecisionTree) -> NavigatorResult<&'t TreeNode> {
        tree.current_node(&self.current)
    }

    /// Takes option `index`. On error the cursor is unchanged.
    pub fn choose<'t>(
        &mut self,
        tree: &'t DecisionTree,
        index: usize,
    ) -> NavigatorResult<&'t TreeNode> {
        let next = tree.choose(&self.current, index)?;
        let node = tree.current_node(next.as_str())?;
        let previous = std::mem::replace(&mut self.current, next.to_string());
        self.history.push(previous);
        Ok(node)
    }

    /// Returns to the previous key.
    pub fn back(&mut self) -> NavigatorResult<&str> {
        let previous = self.history.pop().ok_or(NavigatorError::NoHistory)?;
        self.current = previous;
        Ok(&self.current)
    }

    /// Returns to the start node and forgets the history.
    pub fn reset(&mut self) {
        self.current = START_NODE_KEY.to_owned();
        self.history.clear();
    }

    /// Applies a sequence of choices from the start node.
    pub fn walk(tree: &DecisionTree, choices: &[usize]) -> NavigatorResult<Self> {
        let mut cursor = Self::new();
        for &index in choices {
            cursor.choose(tree, index)?;
        }
        Ok(cursor)
    }
}
