use thiserror::Error;

use crate::{ComponentRef, ProjectionId};

/// Structural problems in a schema. These are fatal at resolution time: the
/// resolver never renders part of a malformed node.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema node must be a JSON object, found `{0}`")]
    NotAnObject(String),
    #[error("schema node is missing its `type` tag")]
    MissingType,
    #[error("unrecognized schema node type `{0}`")]
    UnknownNodeType(String),
    #[error("`{0}` node is missing its `{0}.type` kind")]
    MissingKind(&'static str),
    #[error("unknown layout kind `{0}`")]
    UnknownLayoutKind(String),
    #[error("unknown field kind `{0}`")]
    UnknownFieldKind(String),
    #[error("unknown static kind `{0}`")]
    UnknownStaticKind(String),
    #[error("template `{0}` is not defined")]
    MissingTemplate(String),
    #[error("template `{template}` requires parameter `{param}`")]
    MissingParameter { template: String, param: String },
    #[error("disposition references `#[{0}]` but no such element is declared")]
    UnknownElement(String),
    #[error("malformed disposition item: {0}")]
    MalformedDisposition(String),
    #[error("malformed {node} node: {source}")]
    Malformed {
        node: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SchemaError {
    pub(crate) fn malformed(node: &'static str) -> impl FnOnce(serde_json::Error) -> SchemaError {
        move |source| SchemaError::Malformed { node, source }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("component {0} is not registered")]
    Detached(ComponentRef),
    #[error("projection {0:?} does not exist")]
    UnknownProjection(ProjectionId),
    #[error("handler for `{event}` failed: {message}")]
    Handler { event: String, message: String },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
