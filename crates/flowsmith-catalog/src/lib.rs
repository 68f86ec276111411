//! n8n node knowledge base for Flowsmith.
//!
//! This crate provides:
//!
//! - **Node catalogue**: the static registry of known node types with their
//!   category, parameter schema and output channels via
//!   [`catalog::NodeCatalog`].
//! - **Workflow patterns**: a small fixed set of template workflow shapes via
//!   [`patterns::PatternSet`].
//! - **Pattern matching**: ordered keyword rules mapping a free-text
//!   description onto at most one pattern via [`matcher::PatternMatcher`].
//! - **Description analysis**: required node categories and a description
//!   sanity check, used as generation context.

pub mod analysis;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod nodes;
pub mod patterns;

pub use analysis::{DescriptionCheck, RequiredCategory, check_description, required_categories};
pub use catalog::NodeCatalog;
pub use error::{CatalogError, Result};
pub use matcher::{PatternMatcher, PatternRule};
pub use nodes::{
    FALLBACK_NODE_TYPE, MAIN_CHANNEL, NodeCategory, NodeDescriptor, ParamKind, ParamSpec,
};
pub use patterns::{ConnectionRule, PatternSet, WorkflowPattern};
