//! Catalogue error types.
//!
//! Lookups that may legitimately miss return `Option`; [`CatalogError`] is
//! reserved for callers that require an entry to exist and for catalogue
//! construction problems.

/// Unified error type for the node catalogue and pattern set.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The requested node type is not in the catalogue.
    #[error("unknown node type: {node_type}")]
    UnknownNodeType { node_type: String },

    /// The requested workflow pattern does not exist.
    #[error("unknown workflow pattern: {pattern_id}")]
    UnknownPattern { pattern_id: String },

    /// Two descriptors share the same node type identifier.
    #[error("duplicate node type in catalogue: {node_type}")]
    DuplicateNodeType { node_type: String },

    /// The catalogue does not contain the fallback generic type.
    #[error("catalogue is missing the fallback node type `{node_type}`")]
    MissingFallback { node_type: String },

    /// A pattern references a node type or index that does not resolve.
    #[error("invalid pattern `{pattern_id}`: {reason}")]
    InvalidPattern { pattern_id: String, reason: String },
}

/// Convenience alias used throughout the catalogue crate.
pub type Result<T> = std::result::Result<T, CatalogError>;
