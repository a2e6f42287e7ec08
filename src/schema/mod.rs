//! Schema graph built from catalog metadata.
//!
//! This module provides:
//! - Data models for tables, columns, primary keys and foreign keys
//! - Grouping of flat catalog records into an immutable `SchemaGraph`
//! - Uniform schema/table filtering across every record kind
//! - Safe, injective entity identifiers for diagram output
//! - Cardinality resolution for foreign-key relationships

mod builder;
mod cardinality;
mod filter;
mod ident;

pub use builder::SchemaBuilder;
pub use cardinality::Cardinality;
pub use filter::{FilterReport, SchemaFilter};
pub use ident::EntityId;

use ahash::{AHashMap, AHashSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique (schema, table) key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Diagram-safe identifier for this table
    pub fn entity_id(&self) -> EntityId {
        EntityId::new(&self.schema, &self.name)
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Raw catalog type name (e.g. `nvarchar`)
    pub data_type: String,
    /// Length in bytes, `-1` for `max`
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
    /// Whether this column allows NULL values
    pub is_nullable: bool,
    /// Declaration position (1-based)
    pub ordinal: u32,
}

/// Table with its columns in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub key: TableKey,
    pub columns: Vec<Column>,
}

impl Table {
    /// Get a column by name, exact match first, then case-insensitive
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    pub fn entity_id(&self) -> EntityId {
        self.key.entity_id()
    }
}

/// Fully qualified column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRef {
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// Primary-key membership with O(1) lookup.
///
/// Persisted as a sorted list of column references so the serialized form
/// does not depend on hash order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ColumnRef>", into = "Vec<ColumnRef>")]
pub struct PrimaryKeySet {
    members: AHashMap<TableKey, AHashSet<String>>,
}

impl PrimaryKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: TableKey, column: impl Into<String>) {
        self.members.entry(table).or_default().insert(column.into());
    }

    pub fn contains(&self, table: &TableKey, column: &str) -> bool {
        self.members
            .get(table)
            .is_some_and(|cols| cols.contains(column))
    }

    /// Number of key columns across all tables
    pub fn len(&self) -> usize {
        self.members.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<ColumnRef>> for PrimaryKeySet {
    fn from(refs: Vec<ColumnRef>) -> Self {
        let mut set = PrimaryKeySet::new();
        for r in refs {
            set.insert(TableKey::new(r.schema, r.table), r.column);
        }
        set
    }
}

impl From<PrimaryKeySet> for Vec<ColumnRef> {
    fn from(set: PrimaryKeySet) -> Self {
        let mut refs: Vec<ColumnRef> = set
            .members
            .into_iter()
            .flat_map(|(table, cols)| {
                cols.into_iter().map(move |column| ColumnRef {
                    schema: table.schema.clone(),
                    table: table.name.clone(),
                    column,
                })
            })
            .collect();
        refs.sort();
        refs
    }
}

/// One (from, to) column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnPair {
    pub from_column: String,
    pub to_column: String,
    /// Nullability of the referencing column
    pub from_nullable: bool,
    pub ordinal: u32,
}

/// Foreign key constraint, pairs in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    /// Constraint name
    pub name: String,
    /// Referencing (child) table
    pub from: TableKey,
    /// Referenced (parent) table
    pub to: TableKey,
    pub pairs: Vec<ColumnPair>,
}

impl ForeignKey {
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::resolve(&self.pairs)
    }

    pub fn is_composite(&self) -> bool {
        self.pairs.len() > 1
    }

    pub fn from_columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.from_column.as_str())
    }

    pub fn to_columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.to_column.as_str())
    }
}

/// Complete schema graph: tables, keys and relationships.
///
/// Built once per render run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaGraph {
    /// Tables in catalog order
    pub tables: Vec<Table>,
    /// Foreign keys in first-seen constraint order
    pub foreign_keys: Vec<ForeignKey>,
    /// Primary-key membership
    #[schemars(with = "Vec<ColumnRef>")]
    pub primary_key: PrimaryKeySet,
}

impl SchemaGraph {
    pub fn table(&self, key: &TableKey) -> Option<&Table> {
        self.tables.iter().find(|t| &t.key == key)
    }

    pub fn is_primary_key(&self, table: &TableKey, column: &str) -> bool {
        self.primary_key.contains(table, column)
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn relationship_count(&self) -> usize {
        self.foreign_keys.len()
    }
}
