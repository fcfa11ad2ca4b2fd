//! Error types for the configtree crate

use crate::node::Kind;
use thiserror::Error;

/// Errors that can occur while building or merging configuration trees
#[derive(Error, Debug)]
pub enum Error {
    /// An override tried to replace a value with one of a different kind
    #[error("schema violation at '{path}': expected {expected}, found {found}")]
    SchemaViolation {
        /// Dotted path of the offending key
        path: String,
        /// Kind of the value already in the tree
        expected: Kind,
        /// Kind of the value supplied by the override
        found: Kind,
    },

    /// A dotted path walks through a value that is not a map
    #[error("path conflict at '{path}': {kind} value cannot hold child keys")]
    PathConflict {
        /// Dotted path of the non-map value
        path: String,
        /// Kind of the value found there
        kind: Kind,
    },

    /// An empty path or path segment was given
    #[error("invalid path: '{0}'")]
    InvalidPath(String),

    /// JSON (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for configtree operations
pub type Result<T> = std::result::Result<T, Error>;
