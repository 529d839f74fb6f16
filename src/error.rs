//! Error types for the tree-table engine.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised by table operations
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Node id already in use: {0}")]
    DuplicateId(NodeId),

    #[error("No parent node with id {0}")]
    ParentNotFound(NodeId),

    #[error("Node {0} cannot have children")]
    ChildrenNotAllowed(NodeId),

    #[error("Cannot move node {node} within its own subtree (target parent {parent})")]
    SelfParenting { node: NodeId, parent: NodeId },

    #[error("Node {after} is not a direct child of {}", .parent.as_deref().unwrap_or("the root level"))]
    InvalidAfterNode {
        after: NodeId,
        parent: Option<NodeId>,
    },

    #[error("Moving node {0} is not allowed")]
    MoveDenied(NodeId),

    #[error("Node transfer into table {0} is not supported")]
    TransferUnsupported(String),

    #[error("Missing required field '{field}' in output for {context}")]
    MissingRequiredField { field: String, context: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table id already in use: {0}")]
    DuplicateTable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for TreeError {
    fn from(err: config::ConfigError) -> Self {
        TreeError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for TreeError {
    fn from(err: toml::de::Error) -> Self {
        TreeError::ConfigError(err.to_string())
    }
}
