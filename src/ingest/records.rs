//! Typed catalog records, one per record kind.

use super::{Fields, Record, RecordKind};
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A table row: `{schemaName, tableName}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub schema_name: String,
    pub table_name: String,
}

impl Record for TableRecord {
    const KIND: RecordKind = RecordKind::Tables;
    const FIELDS: &'static [&'static str] = &["schemaName", "tableName"];

    fn from_fields(row: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            schema_name: row.string(0),
            table_name: row.string(1),
        })
    }
}

/// A column row, as exported from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    /// Length in bytes, `-1` for unbounded (`max`) types
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
    pub is_nullable: bool,
    /// 1-based declaration position
    pub ordinal: u32,
}

impl Record for ColumnRecord {
    const KIND: RecordKind = RecordKind::Columns;
    const FIELDS: &'static [&'static str] = &[
        "schemaName",
        "tableName",
        "columnName",
        "dataTypeName",
        "maxLength",
        "precision",
        "scale",
        "nullableFlag",
        "ordinal",
    ];

    fn from_fields(row: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            schema_name: row.string(0),
            table_name: row.string(1),
            column_name: row.string(2),
            data_type: row.string(3),
            max_length: row.int(4)?,
            precision: row.int(5)?,
            scale: row.int(6)?,
            is_nullable: row.flag(7)?,
            ordinal: row.int(8)?,
        })
    }
}

/// One primary-key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyRecord {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
}

impl Record for PrimaryKeyRecord {
    const KIND: RecordKind = RecordKind::PrimaryKeys;
    const FIELDS: &'static [&'static str] = &["schemaName", "tableName", "columnName"];

    fn from_fields(row: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            schema_name: row.string(0),
            table_name: row.string(1),
            column_name: row.string(2),
        })
    }
}

/// One column pair of a foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRecord {
    pub constraint_name: String,
    pub from_schema: String,
    pub from_table: String,
    pub to_schema: String,
    pub to_table: String,
    pub from_column: String,
    pub to_column: String,
    pub from_nullable: bool,
    pub ordinal: u32,
}

impl Record for ForeignKeyRecord {
    const KIND: RecordKind = RecordKind::ForeignKeys;
    const FIELDS: &'static [&'static str] = &[
        "constraintName",
        "fromSchema",
        "fromTable",
        "toSchema",
        "toTable",
        "fromColumn",
        "toColumn",
        "fromNullableFlag",
        "ordinal",
    ];

    fn from_fields(row: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            constraint_name: row.string(0),
            from_schema: row.string(1),
            from_table: row.string(2),
            to_schema: row.string(3),
            to_table: row.string(4),
            from_column: row.string(5),
            to_column: row.string(6),
            from_nullable: row.flag(7)?,
            ordinal: row.int(8)?,
        })
    }
}

/// Row-count statistics for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableStatistic {
    pub schema_name: String,
    pub table_name: String,
    pub full_name: String,
    pub row_count: u64,
    pub is_empty: bool,
}

impl Record for TableStatistic {
    const KIND: RecordKind = RecordKind::Statistics;
    const FIELDS: &'static [&'static str] = &[
        "schemaName",
        "tableName",
        "fullName",
        "rowCount",
        "isEmptyFlag",
    ];

    fn from_fields(row: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            schema_name: row.string(0),
            table_name: row.string(1),
            full_name: row.string(2),
            row_count: row.int(3)?,
            // Only the literal True/true token marks a table as empty
            is_empty: matches!(row.text(4), "True" | "true"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;

    #[test]
    fn test_column_record() {
        let text = "schemaName,tableName,columnName,dataTypeName,maxLength,precision,scale,nullableFlag,ordinal\n\
                    dbo,Customers,Name,nvarchar,-1,0,0,1,2\n";
        let cols: Vec<ColumnRecord> = ingest(text, "columns.csv", b',').unwrap();
        assert_eq!(cols[0].max_length, -1);
        assert!(cols[0].is_nullable);
        assert_eq!(cols[0].ordinal, 2);
    }

    #[test]
    fn test_foreign_key_record() {
        let text = "constraintName,fromSchema,fromTable,toSchema,toTable,fromColumn,toColumn,fromNullableFlag,ordinal\n\
                    FK_Orders_Customers,dbo,Orders,dbo,Customers,CustomerID,CustomerID,False,1\n";
        let fks: Vec<ForeignKeyRecord> = ingest(text, "foreign_keys.csv", b',').unwrap();
        assert_eq!(fks[0].constraint_name, "FK_Orders_Customers");
        assert!(!fks[0].from_nullable);
    }

    #[test]
    fn test_statistic_empty_flag_tokens() {
        let text = "schemaName,tableName,fullName,rowCount,isEmptyFlag\n\
                    dbo,A,dbo.A,0,True\n\
                    dbo,B,dbo.B,0,true\n\
                    dbo,C,dbo.C,0,TRUE\n\
                    dbo,D,dbo.D,0,1\n\
                    dbo,E,dbo.E,5,False\n";
        let stats: Vec<TableStatistic> = ingest(text, "stats.csv", b',').unwrap();
        let flags: Vec<bool> = stats.iter().map(|s| s.is_empty).collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_statistic_negative_row_count_rejected() {
        let text = "schemaName,tableName,fullName,rowCount,isEmptyFlag\ndbo,A,dbo.A,-3,False\n";
        assert!(ingest::<TableStatistic>(text, "stats.csv", b',').is_err());
    }
}
