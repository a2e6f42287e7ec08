//! Schema and table filtering applied uniformly to every record kind.

use crate::error::{ErdError, Result};
use crate::ingest::{Catalog, TableStatistic};
use glob::Pattern;
use schemars::JsonSchema;
use serde::Serialize;

/// Include/exclude predicate over (schema, table).
///
/// `schemas` are matched against the schema name (empty means every schema).
/// `exclude_tables` are matched against both `schema.table` and the bare
/// table name.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    schemas: Vec<Pattern>,
    exclude_tables: Vec<Pattern>,
}

/// How many records each kind lost to the filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FilterReport {
    pub tables: usize,
    pub columns: usize,
    pub primary_keys: usize,
    pub foreign_keys: usize,
}

impl FilterReport {
    pub fn total(&self) -> usize {
        self.tables + self.columns + self.primary_keys + self.foreign_keys
    }
}

impl SchemaFilter {
    /// Compile both pattern lists. A malformed glob is an error.
    pub fn new<S: AsRef<str>>(schemas: &[S], exclude_tables: &[S]) -> Result<Self> {
        Ok(Self {
            schemas: compile(schemas)?,
            exclude_tables: compile(exclude_tables)?,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.schemas.is_empty() && self.exclude_tables.is_empty()
    }

    pub fn includes(&self, schema: &str, table: &str) -> bool {
        if !self.schemas.is_empty() && !self.schemas.iter().any(|p| p.matches(schema)) {
            return false;
        }
        let qualified = format!("{}.{}", schema, table);
        !self
            .exclude_tables
            .iter()
            .any(|p| p.matches(&qualified) || p.matches(table))
    }

    /// Filter every record kind with the same predicate.
    ///
    /// A foreign key survives only when both of its tables do, so the result
    /// never references an excluded table.
    pub fn apply(&self, catalog: Catalog) -> (Catalog, FilterReport) {
        if self.is_noop() {
            return (catalog, FilterReport::default());
        }

        let Catalog {
            mut tables,
            mut columns,
            mut primary_keys,
            mut foreign_keys,
        } = catalog;
        let mut report = FilterReport::default();

        report.tables = retain_counted(&mut tables, |t| {
            self.includes(&t.schema_name, &t.table_name)
        });
        report.columns = retain_counted(&mut columns, |c| {
            self.includes(&c.schema_name, &c.table_name)
        });
        report.primary_keys = retain_counted(&mut primary_keys, |pk| {
            self.includes(&pk.schema_name, &pk.table_name)
        });
        report.foreign_keys = retain_counted(&mut foreign_keys, |fk| {
            let keep = self.includes(&fk.from_schema, &fk.from_table)
                && self.includes(&fk.to_schema, &fk.to_table);
            if !keep {
                tracing::debug!(constraint = %fk.constraint_name, "dropping foreign key touching a filtered table");
            }
            keep
        });

        tracing::info!(removed = report.total(), "schema filter applied");
        (
            Catalog {
                tables,
                columns,
                primary_keys,
                foreign_keys,
            },
            report,
        )
    }

    /// Filter statistics with the same predicate as the catalog.
    pub fn retain_statistics(&self, mut stats: Vec<TableStatistic>) -> Vec<TableStatistic> {
        stats.retain(|s| self.includes(&s.schema_name, &s.table_name));
        stats
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            Pattern::new(p).map_err(|e| ErdError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

fn retain_counted<T>(items: &mut Vec<T>, keep: impl FnMut(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(keep);
    before - items.len()
}
