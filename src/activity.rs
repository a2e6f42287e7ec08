//! Active/dead table classification from row-count statistics.

use crate::error::Result;
use crate::ingest::TableStatistic;
use crate::schema::TableKey;
use ahash::AHashSet;
use csv::{Terminator, WriterBuilder};

/// Default minimum row count for a table to count as active
pub const DEFAULT_MIN_ROWS: u64 = 1;

/// Splits statistics into active and dead tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityClassifier {
    min_rows: u64,
}

impl Default for ActivityClassifier {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

impl ActivityClassifier {
    pub fn new(min_rows: u64) -> Self {
        Self { min_rows }
    }

    pub fn min_rows(&self) -> u64 {
        self.min_rows
    }

    /// A table is dead when flagged empty or below the row threshold.
    pub fn is_dead(&self, stat: &TableStatistic) -> bool {
        stat.is_empty || stat.row_count < self.min_rows
    }

    /// Single pass; both sides keep input order and every entry lands in exactly one.
    pub fn classify(&self, stats: Vec<TableStatistic>) -> Activity {
        let (dead, active): (Vec<_>, Vec<_>) = stats.into_iter().partition(|s| self.is_dead(s));

        tracing::info!(
            active = active.len(),
            dead = dead.len(),
            min_rows = self.min_rows,
            "tables classified"
        );
        Activity { active, dead }
    }
}

/// Result of one classification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    pub active: Vec<TableStatistic>,
    pub dead: Vec<TableStatistic>,
}

impl Activity {
    pub fn total(&self) -> usize {
        self.active.len() + self.dead.len()
    }

    pub fn active_set(&self) -> ActiveSet {
        ActiveSet::from_statistics(&self.active)
    }

    /// Delimited dead-table report: `schemaName,tableName,fullName,rowCount`
    pub fn dead_report(&self, delimiter: u8) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(["schemaName", "tableName", "fullName", "rowCount"])?;
        for stat in &self.dead {
            let rows = stat.row_count.to_string();
            writer.write_record([
                stat.schema_name.as_str(),
                stat.table_name.as_str(),
                stat.full_name.as_str(),
                rows.as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Active tables, addressable by key or by rendered entity identifier
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    keys: AHashSet<TableKey>,
    ids: AHashSet<String>,
}

impl ActiveSet {
    pub fn from_statistics(stats: &[TableStatistic]) -> Self {
        let keys: AHashSet<TableKey> = stats
            .iter()
            .map(|s| TableKey::new(&s.schema_name, &s.table_name))
            .collect();
        let ids = keys.iter().map(|k| k.entity_id().to_string()).collect();
        Self { keys, ids }
    }

    pub fn keys(&self) -> &AHashSet<TableKey> {
        &self.keys
    }

    pub fn contains_key(&self, key: &TableKey) -> bool {
        self.keys.contains(key)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(table: &str, rows: u64, empty: bool) -> TableStatistic {
        TableStatistic {
            schema_name: "dbo".to_string(),
            table_name: table.to_string(),
            full_name: format!("dbo.{}", table),
            row_count: rows,
            is_empty: empty,
        }
    }

    fn sample() -> Vec<TableStatistic> {
        vec![
            stat("Customers", 10, false),
            stat("Orders", 0, true),
            stat("Audit", 0, false),
            stat("Flagged", 500, true),
            stat("Lookup", 1, false),
        ]
    }

    #[test]
    fn test_classify_default_threshold() {
        let activity = ActivityClassifier::default().classify(sample());
        let active: Vec<&str> = activity.active.iter().map(|s| s.table_name.as_str()).collect();
        let dead: Vec<&str> = activity.dead.iter().map(|s| s.table_name.as_str()).collect();
        assert_eq!(active, vec!["Customers", "Lookup"]);
        assert_eq!(dead, vec!["Orders", "Audit", "Flagged"]);
    }

    #[test]
    fn test_classify_custom_threshold() {
        let activity = ActivityClassifier::new(5).classify(sample());
        let active: Vec<&str> = activity.active.iter().map(|s| s.table_name.as_str()).collect();
        assert_eq!(active, vec!["Customers"]);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        for min_rows in [0, 1, 2, 10, 11, 1000] {
            let stats = sample();
            let activity = ActivityClassifier::new(min_rows).classify(stats.clone());
            assert_eq!(activity.total(), stats.len());

            let active = activity.active_set();
            for dead in &activity.dead {
                assert!(!active.contains_key(&TableKey::new(&dead.schema_name, &dead.table_name)));
            }
            for s in &stats {
                let in_active = activity.active.contains(s);
                let in_dead = activity.dead.contains(s);
                assert!(in_active ^ in_dead);
            }
        }
    }

    #[test]
    fn test_dead_report() {
        let activity = ActivityClassifier::default().classify(vec![
            stat("Customers", 10, false),
            stat("Orders", 0, true),
        ]);
        assert_eq!(
            activity.dead_report(b',').unwrap(),
            "schemaName,tableName,fullName,rowCount\ndbo,Orders,dbo.Orders,0\n"
        );
    }

    #[test]
    fn test_dead_report_quotes_delimiter() {
        let activity = ActivityClassifier::default().classify(vec![stat("a,b", 0, true)]);
        let comma = activity.dead_report(b',').unwrap();
        assert!(comma.contains("dbo,\"a,b\",\"dbo.a,b\",0\n"));
        let pipe = activity.dead_report(b'|').unwrap();
        assert!(pipe.contains("dbo|a,b|dbo.a,b|0\n"));
    }

    #[test]
    fn test_active_set_lookup() {
        let set = ActivityClassifier::default().classify(sample()).active_set();
        assert_eq!(set.len(), 2);
        assert!(set.contains_key(&TableKey::new("dbo", "Customers")));
        assert!(set.contains_id("dbo_Customers"));
        assert!(!set.contains_id("dbo_Orders"));
    }
}
