//! Error types for tree mutation, conversion and format operations

use crate::format::Direction;
use crate::transformers::Outcome;
use thiserror::Error;

/// Errors raised by the document tree when a mutation would break its structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node was appended or inserted where its parent does not accept it
    #[error("a '{parent}' node cannot contain a '{child}' node")]
    InvalidChild { parent: String, child: String },
    /// An index was outside the children of a node
    #[error("index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    /// A path does not resolve to a node in the document
    #[error("path {0:?} does not resolve to a node")]
    InvalidPath(Vec<usize>),
    /// An attribute was requested on a node type that does not carry it
    #[error("'{node_type}' nodes have no '{attribute}' attribute")]
    UnsupportedAttribute {
        node_type: String,
        attribute: &'static str,
    },
}

/// Errors that abort an import or export
///
/// A failed conversion is all-or-nothing from the caller's point of view: the target
/// tree may already hold partial output and should be discarded.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A transformer depends on a node type the document was not configured with
    #[error("transformer '{transformer}' depends on node type '{node_type}', which the document does not register")]
    MissingDependency {
        transformer: String,
        node_type: String,
    },
    /// A callback answered with an outcome that is not legal for its family
    #[error("transformer '{transformer}' returned {outcome:?}, which is not a valid outcome here")]
    UnexpectedOutcome {
        transformer: String,
        outcome: Outcome,
    },
    /// A custom transformer reported a failure of its own
    #[error("transformer '{transformer}' failed: {message}")]
    Transformer { transformer: String, message: String },
    /// The tree rejected a mutation requested by a transformer
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ConversionError {
    /// Convenience constructor for custom transformer failures
    pub fn transformer(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        ConversionError::Transformer {
            transformer: transformer.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while moving documents through a format or the registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// The source text could not be read into a document
    #[error("Parse error: {0}")]
    ParseError(String),
    /// The document could not be rendered
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// The format does not implement the requested direction
    #[error("format '{format}' does not {direction}")]
    Unsupported { format: String, direction: Direction },
    /// An export parameter the format does not read
    #[error("format '{format}' has no parameter '{key}'")]
    UnknownParameter { format: String, key: String },
    #[error("'{value}' is not a valid value for '{key}'")]
    InvalidParameter { key: String, value: String },
    /// Two formats claim the same file extension
    #[error("extension '.{extension}' belongs to format '{registered}', so '{rejected}' cannot claim it")]
    ExtensionConflict {
        extension: String,
        registered: String,
        rejected: String,
    },
}

impl FormatError {
    pub fn unsupported(format: impl Into<String>, direction: Direction) -> Self {
        FormatError::Unsupported {
            format: format.into(),
            direction,
        }
    }
}
