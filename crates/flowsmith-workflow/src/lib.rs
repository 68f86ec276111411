//! n8n workflow documents for Flowsmith.
//!
//! - [`document`]: the typed workflow document model and connection helpers.
//! - [`validate`]: turns arbitrary JSON into a well-formed document,
//!   recording every correction applied.
//! - [`template`]: renders catalogue workflow patterns into documents.

pub mod document;
pub mod template;
pub mod validate;

pub use document::{ConnectionMap, DEFAULT_WORKFLOW_NAME, NodeInstance, WorkflowDocument};
pub use template::{instantiate_node, render_pattern, shape_name};
pub use validate::{Correction, DocumentField, NodeField, Validated, validate};
