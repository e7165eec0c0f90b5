use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("input is empty")]
    EmptyInput,

    #[error("unknown node '{key}' in {tree} tree")]
    UnknownNode { tree: String, key: String },
    #[error("invalid option {index} at node '{key}' ({available} options available)")]
    InvalidOption {
        key: String,
        index: usize,
        available: usize,
    },
    #[error("node '{from}' in {tree} tree references missing node '{next}'")]
    DanglingReference {
        tree: String,
        from: String,
        next: String,
    },
    #[error("{0} tree has no start node")]
    MissingStartNode(String),
    #[error("node '{key}' in {tree} tree has neither options nor a resolution")]
    EmptyOptions { tree: String, key: String },
    #[error("node '{key}' in {tree} tree has both options and a resolution")]
    AmbiguousNode { tree: String, key: String },
    #[error("no previous step to return to")]
    NoHistory,

    #[error("unknown component: {0}")]
    UnknownComponent(String),
    #[error("duplicate component: {0}")]
    DuplicateComponent(String),
    #[error("connection {from} -> {to} references an unknown component")]
    InvalidConnection { from: String, to: String },
    #[error("unknown incident: {0}")]
    UnknownIncident(String),
    #[error("unknown wizard: {0}")]
    UnknownWizard(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("role '{role}' cannot access {tab}")]
    Forbidden { role: String, tab: String },

    #[error("unknown session: {0}")]
    UnknownSession(Uuid),
    #[error("no diagnostic chat is open")]
    NoDiagnosticChat,
    #[error("a request for this panel is already in progress")]
    Busy,

    #[error("failed to load {name}: {source}")]
    Catalog {
        name: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to write export file: {0}")]
    FileWrite(std::io::Error),
}

pub type NavigatorResult<T> = std::result::Result<T, NavigatorError>;

impl From<navigator_types::TextError> for NavigatorError {
    fn from(err: navigator_types::TextError) -> Self {
        match err {
            navigator_types::TextError::Empty => NavigatorError::EmptyInput,
            other => NavigatorError::InvalidInput(other.to_string()),
        }
    }
}
