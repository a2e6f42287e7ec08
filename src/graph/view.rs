//! Read-only view of a schema graph, optionally restricted to a table set.

use crate::schema::{ForeignKey, SchemaGraph, Table, TableKey};
use ahash::AHashSet;

/// A filtered view of a schema graph for rendering.
///
/// Tables outside the kept set are hidden, and so is every relationship with
/// a hidden endpoint.
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    graph: &'a SchemaGraph,
    keep: Option<&'a AHashSet<TableKey>>,
}

impl<'a> GraphView<'a> {
    /// Create a full view (all tables and edges)
    pub fn full(graph: &'a SchemaGraph) -> Self {
        Self { graph, keep: None }
    }

    /// Create a view showing only the tables in `keep`
    pub fn restricted(graph: &'a SchemaGraph, keep: &'a AHashSet<TableKey>) -> Self {
        Self {
            graph,
            keep: Some(keep),
        }
    }

    pub fn graph(&self) -> &'a SchemaGraph {
        self.graph
    }

    pub fn contains(&self, key: &TableKey) -> bool {
        self.keep.map_or(true, |keep| keep.contains(key))
    }

    /// Tables in catalog order
    pub fn tables(&self) -> impl Iterator<Item = &'a Table> + 'a {
        let view = *self;
        self.graph.tables.iter().filter(move |t| view.contains(&t.key))
    }

    /// Relationships whose endpoints are both visible
    pub fn edges(&self) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        let view = *self;
        self.graph
            .foreign_keys
            .iter()
            .filter(move |fk| view.contains(&fk.from) && view.contains(&fk.to))
    }

    pub fn is_primary_key(&self, table: &TableKey, column: &str) -> bool {
        self.graph.is_primary_key(table, column)
    }

    /// Get the number of tables in the view
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Get the number of edges in the view
    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }
}
