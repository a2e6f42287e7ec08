//! Grouping of flat catalog records into a `SchemaGraph`.

use super::{
    Column, ColumnPair, FilterReport, ForeignKey, PrimaryKeySet, SchemaFilter, SchemaGraph, Table,
    TableKey,
};
use crate::error::{ErdError, Result};
use crate::ingest::{Catalog, ForeignKeyRecord};
use ahash::AHashMap;

/// Builds an immutable schema graph from catalog records.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    filter: SchemaFilter,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: SchemaFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Filter, group and validate the catalog.
    ///
    /// Fails on an empty result and on any key or column record that points
    /// at a table or column missing from the filtered table set.
    pub fn build(&self, catalog: Catalog) -> Result<SchemaGraph> {
        self.build_with_report(catalog).map(|(graph, _)| graph)
    }

    /// Like [`build`](Self::build), also returning what the filter removed.
    pub fn build_with_report(&self, catalog: Catalog) -> Result<(SchemaGraph, FilterReport)> {
        let before_filter = catalog.tables.len();
        let (catalog, report) = self.filter.apply(catalog);

        if catalog.tables.is_empty() {
            return Err(ErdError::EmptySchema { before_filter });
        }

        let mut index: AHashMap<TableKey, usize> = AHashMap::new();
        let mut tables: Vec<Table> = Vec::new();
        for record in &catalog.tables {
            let key = TableKey::new(&record.schema_name, &record.table_name);
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key.clone(), tables.len());
            tables.push(Table {
                key,
                columns: Vec::new(),
            });
        }

        for record in catalog.columns {
            let key = TableKey::new(&record.schema_name, &record.table_name);
            let Some(&i) = index.get(&key) else {
                return Err(ErdError::MissingReference(format!(
                    "column {} belongs to unknown table {}",
                    record.column_name, key
                )));
            };
            tables[i].columns.push(Column {
                name: record.column_name,
                data_type: record.data_type,
                max_length: record.max_length,
                precision: record.precision,
                scale: record.scale,
                is_nullable: record.is_nullable,
                ordinal: record.ordinal,
            });
        }

        // Stable sort keeps input order for duplicate ordinals
        for table in &mut tables {
            table.columns.sort_by_key(|c| c.ordinal);
        }

        let mut primary_key = PrimaryKeySet::new();
        for record in &catalog.primary_keys {
            let key = TableKey::new(&record.schema_name, &record.table_name);
            let column = require_column(&tables, &index, &key, &record.column_name, "primary key")?;
            primary_key.insert(key, column);
        }

        let foreign_keys = group_foreign_keys(catalog.foreign_keys)
            .into_iter()
            .map(|(name, records)| build_foreign_key(name, records, &tables, &index))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            tables = tables.len(),
            foreign_keys = foreign_keys.len(),
            primary_key_columns = primary_key.len(),
            "schema graph built"
        );

        let graph = SchemaGraph {
            tables,
            foreign_keys,
            primary_key,
        };
        Ok((graph, report))
    }
}

/// Group records by constraint name, keeping first-seen constraint order.
fn group_foreign_keys(records: Vec<ForeignKeyRecord>) -> Vec<(String, Vec<ForeignKeyRecord>)> {
    let mut groups: Vec<(String, Vec<ForeignKeyRecord>)> = Vec::new();
    let mut by_name: AHashMap<String, usize> = AHashMap::new();

    for record in records {
        match by_name.get(&record.constraint_name) {
            Some(&i) => groups[i].1.push(record),
            None => {
                by_name.insert(record.constraint_name.clone(), groups.len());
                groups.push((record.constraint_name.clone(), vec![record]));
            }
        }
    }

    groups
}

fn build_foreign_key(
    name: String,
    mut records: Vec<ForeignKeyRecord>,
    tables: &[Table],
    index: &AHashMap<TableKey, usize>,
) -> Result<ForeignKey> {
    records.sort_by_key(|r| r.ordinal);

    let first = &records[0];
    let from = TableKey::new(&first.from_schema, &first.from_table);
    let to = TableKey::new(&first.to_schema, &first.to_table);

    let consistent = records.iter().all(|r| {
        r.from_schema == from.schema
            && r.from_table == from.name
            && r.to_schema == to.schema
            && r.to_table == to.name
    });
    if !consistent {
        return Err(ErdError::InconsistentForeignKey { constraint: name });
    }

    let mut pairs = Vec::with_capacity(records.len());
    for record in records {
        let from_column = require_column(tables, index, &from, &record.from_column, &name)?;
        let to_column = require_column(tables, index, &to, &record.to_column, &name)?;
        pairs.push(ColumnPair {
            from_column,
            to_column,
            from_nullable: record.from_nullable,
            ordinal: record.ordinal,
        });
    }

    Ok(ForeignKey {
        name,
        from,
        to,
        pairs,
    })
}

/// Resolve a referenced column, returning its name as the table spells it.
fn require_column(
    tables: &[Table],
    index: &AHashMap<TableKey, usize>,
    key: &TableKey,
    column: &str,
    owner: &str,
) -> Result<String> {
    let Some(&i) = index.get(key) else {
        return Err(ErdError::MissingReference(format!(
            "{} references unknown table {}",
            owner, key
        )));
    };
    match tables[i].get_column(column) {
        Some(found) => Ok(found.name.clone()),
        None => Err(ErdError::MissingReference(format!(
            "{} references unknown column {}.{}",
            owner, key, column
        ))),
    }
}
