//! Entity-relationship diagrams from database catalog exports.
//!
//! The pipeline has three stages:
//! - render: catalog rows -> [`schema::SchemaGraph`] -> full Mermaid, simple
//!   Mermaid, DBML and a persisted [`graph::DiagramModel`]
//! - classify: row-count statistics -> active/dead tables
//! - filter: simple diagram + active tables -> pruned diagram

pub mod activity;
pub mod artifact;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod ingest;
pub mod schema;

pub use error::{ErdError, Result};
