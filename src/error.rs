use thiserror::Error;

/// Errors raised while indexing or navigating a workflow tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node id '{0}' appears more than once in the workflow tree")]
    DuplicateNodeId(String),

    #[error("Node '{0}' not found in the workflow tree")]
    NodeNotFound(String),
}

/// Errors that can occur when parsing the string forms of cross-node references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Selector '{0}' must have the form '<id>#<name>#<type>'")]
    MalformedSelector(String),

    #[error("Unknown value type '{0}', expected one of number, string, boolean")]
    UnknownValueType(String),

    #[error("Reference '{0}' must have the form '<nodeId>#<field>'")]
    MalformedReference(String),
}

/// Errors that can occur while loading a workflow document.
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    #[error("Could not read workflow file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors that can occur while rendering the export view.
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(String),

    #[error("YAML serialization failed: {0}")]
    Yaml(String),
}

/// Errors that can occur when writing a node's configuration through a config store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Node '{0}' not found in the config store")]
    NodeNotFound(String),

    #[error("Could not encode the expression for node '{node_id}': {message}")]
    Encode { node_id: String, message: String },
}
