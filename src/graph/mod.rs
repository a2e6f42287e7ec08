//! ERD (Entity-Relationship Diagram) generation module.
//!
//! This module provides:
//! - Full and simple Mermaid erDiagram output
//! - DBML output with composite-key references
//! - Views restricted to a set of tables
//! - The persisted diagram model consumed by the filter stage

pub mod format;
pub mod model;
pub mod view;

pub use format::{format_column_type, to_dbml, to_mermaid_full, to_mermaid_simple, OutputFormat, HEADER};
pub use model::{digest, DiagramModel, MODEL_FORMAT_VERSION};
pub use view::GraphView;
