// error.rs — Error taxonomy for graph operations
//
// None of these are fatal: every operation that returns one of them has left
// the graph exactly as it was before the call.

use thiserror::Error;

use crate::id::{LinkId, NodeId, PinId};
use crate::pin::PinType;

/// Why a candidate pin pair cannot be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("a pin cannot be linked to itself")]
    SamePin,
    #[error("both pins have the same kind")]
    SameKind,
    #[error("pin types differ ({0:?} vs {1:?})")]
    TypeMismatch(PinType, PinType),
    #[error("both pins belong to the same node")]
    SameNode,
    #[error("neither pin is an output")]
    NoOutput,
    #[error("link would create a cycle")]
    Cycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node kind '{0}'")]
    UnknownNodeKind(String),
    #[error("no such node: {0}")]
    UnknownNode(NodeId),
    #[error("no such link: {0}")]
    UnknownLink(LinkId),
    #[error("no such pin: {0}")]
    UnknownPin(PinId),
    #[error("link rejected: {0}")]
    RejectedLink(#[from] LinkRejection),
    #[error("{0} is the output node and cannot be deleted")]
    RejectedDeletion(NodeId),
    #[error("the graph already has an output node ({0})")]
    DuplicateOutput(NodeId),
    #[error("no ids left in the id space")]
    IdSpaceExhausted,
    #[error("{node} has no parameter at index {index}")]
    ParameterOutOfRange { node: NodeId, index: usize },
    #[error("{0} does not hold a code string")]
    NotACodeNode(NodeId),
}

/// Internal invariant violations found while generating code. A graph built
/// only through the public mutation API never produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("dangling pin reference {0}")]
    DanglingPin(PinId),
    #[error("{node} has no parameter at index {index}")]
    MissingParameter { node: NodeId, index: usize },
    #[error("{kind} has no output pin at position {position}")]
    NoSuchOutput { kind: &'static str, position: usize },
    #[error("{kind} has no input pin at position {position}")]
    NoSuchInput { kind: &'static str, position: usize },
    #[error("the graph has no output node")]
    NoOutputNode,
    #[error("recursion limit reached at {0}; the graph is not acyclic")]
    RecursionLimit(NodeId),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("shader template has no '{0}' marker")]
    MissingMarker(&'static str),
}
