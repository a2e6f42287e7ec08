//! Catalog metadata ingestion.
//!
//! This module provides:
//! - Delimited-row parsing with header-driven column lookup
//! - Typed records for tables, columns, keys and table statistics
//! - A `MetadataSource` abstraction with a directory-backed implementation
//! - Transparent decompression of exported files

mod compression;
mod records;
mod source;

pub use compression::{read_maybe_compressed, Compression};
pub use records::*;
pub use source::{Catalog, DirectorySource, InputFiles, MetadataSource, SourceText};

use crate::error::{ErdError, Result};
use csv::{Position, ReaderBuilder, StringRecord, Trim};
use std::fmt;
use std::str::FromStr;

/// The record kinds read from the metadata source and the statistics export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Tables,
    Columns,
    PrimaryKeys,
    ForeignKeys,
    Statistics,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Tables => write!(f, "tables"),
            RecordKind::Columns => write!(f, "columns"),
            RecordKind::PrimaryKeys => write!(f, "primary keys"),
            RecordKind::ForeignKeys => write!(f, "foreign keys"),
            RecordKind::Statistics => write!(f, "statistics"),
        }
    }
}

/// A record type that can be built from one delimited row.
pub trait Record: Sized {
    const KIND: RecordKind;
    /// Header names this record reads, in the order `Fields` accessors use.
    const FIELDS: &'static [&'static str];

    fn from_fields(row: &Fields<'_>) -> Result<Self>;
}

/// One data row, with values addressed by position in `Record::FIELDS`.
pub struct Fields<'a> {
    source_name: &'a str,
    line: usize,
    names: &'static [&'static str],
    values: &'a StringRecord,
    index: &'a [usize],
}

impl<'a> Fields<'a> {
    /// 1-based line number of this row in the source text.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self, field: usize) -> &'a str {
        let values: &'a StringRecord = self.values;
        &values[self.index[field]]
    }

    pub fn string(&self, field: usize) -> String {
        self.text(field).to_string()
    }

    /// Parse an integer field, rejecting anything non-numeric.
    pub fn int<T: FromStr>(&self, field: usize) -> Result<T> {
        let raw = self.text(field);
        raw.parse().map_err(|_| {
            ErdError::malformed(
                self.source_name,
                self.line,
                format!("field {} is not an integer: {:?}", self.names[field], raw),
            )
        })
    }

    /// Parse a nullability-style flag: 1/0, true/false, yes/no.
    pub fn flag(&self, field: usize) -> Result<bool> {
        let raw = self.text(field);
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Ok(true),
            "0" | "false" | "no" | "n" => Ok(false),
            _ => Err(ErdError::malformed(
                self.source_name,
                self.line,
                format!("field {} is not a boolean flag: {:?}", self.names[field], raw),
            )),
        }
    }
}

/// Parse delimited text into typed records.
///
/// The first non-blank line is the header. Zero data rows yield an empty list.
pub fn ingest<T: Record>(text: &str, source_name: &str, delimiter: u8) -> Result<Vec<T>> {
    // Field counts are checked here so the error can name the line
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut lines = LineCounter::new(text);

    let mut rows = reader
        .records()
        .filter(|row| !matches!(row, Ok(record) if is_blank(record)));

    let header = match rows.next() {
        Some(row) => row.map_err(|e| csv_error(source_name, &mut lines, e))?,
        None => return Ok(Vec::new()),
    };
    let header_line = lines.record(&header);
    let normalized: Vec<String> = header.iter().map(normalize_header).collect();

    let index = T::FIELDS
        .iter()
        .map(|name| {
            let wanted = normalize_header(name);
            normalized.iter().position(|h| *h == wanted).ok_or_else(|| {
                ErdError::malformed(
                    source_name,
                    header_line,
                    format!("header is missing column {}", name),
                )
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|e| csv_error(source_name, &mut lines, e))?;
        let line = lines.record(&row);
        if row.len() != header.len() {
            return Err(ErdError::malformed(
                source_name,
                line,
                format!("expected {} fields, found {}", header.len(), row.len()),
            ));
        }

        let fields = Fields {
            source_name,
            line,
            names: T::FIELDS,
            values: &row,
            index: &index,
        };
        records.push(T::from_fields(&fields)?);
    }

    tracing::debug!(kind = %T::KIND, source = source_name, rows = records.len(), "ingested records");
    Ok(records)
}

/// A whitespace-only line reads as one empty field
fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

/// Maps reader byte offsets to 1-based line numbers.
///
/// Offsets must arrive in increasing order. Newlines directly at an offset
/// belong to blank lines the reader skipped, so they count toward the record.
struct LineCounter<'a> {
    text: &'a [u8],
    byte: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            byte: 0,
            line: 1,
        }
    }

    fn record(&mut self, record: &StringRecord) -> usize {
        record.position().map_or(0, |p| self.at(p))
    }

    fn at(&mut self, position: &Position) -> usize {
        let mut start = (position.byte() as usize).clamp(self.byte, self.text.len());
        while start < self.text.len() && matches!(self.text[start], b'\n' | b'\r') {
            start += 1;
        }
        self.line += self.text[self.byte..start].iter().filter(|&&b| b == b'\n').count();
        self.byte = start;
        self.line
    }
}

fn csv_error(source_name: &str, lines: &mut LineCounter<'_>, err: csv::Error) -> ErdError {
    let line = err.position().map_or(0, |p| lines.at(p));
    ErdError::malformed(source_name, line, err.to_string())
}

/// Header names compare case-insensitively and ignore underscores.
fn normalize_header(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_trims_plain_fields() {
        let text = "schemaName , tableName\ndbo , Customers\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b',').unwrap();
        assert_eq!(tables[0].schema_name, "dbo");
        assert_eq!(tables[0].table_name, "Customers");
    }

    #[test]
    fn test_ingest_quoted_fields() {
        let text = "schemaName,tableName\ndbo,\"Order, Details\"\ndbo,\"say \"\"hi\"\"\"\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b',').unwrap();
        assert_eq!(tables[0].table_name, "Order, Details");
        assert_eq!(tables[1].table_name, "say \"hi\"");
    }

    #[test]
    fn test_ingest_other_delimiter() {
        let text = "schemaName|tableName\ndbo|Orders\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b'|').unwrap();
        assert_eq!(tables[0].table_name, "Orders");
    }

    #[test]
    fn test_ingest_line_numbers_count_blank_lines() {
        let text = "\nschemaName,tableName\n\ndbo,Customers\n   \ndbo\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        assert!(matches!(err, ErdError::MalformedRow { line: 6, .. }));
    }

    #[test]
    fn test_line_numbers_after_leading_blank_lines() {
        let text = "\n\nschemaName,tableName,columnName\n";
        let keys = ingest::<PrimaryKeyRecord>(text, "primary_keys.csv", b',').unwrap();
        assert!(keys.is_empty());

        let text = "\n\nschemaName\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        assert!(matches!(err, ErdError::MalformedRow { line: 3, .. }));

        let text = "schemaName,tableName\n\n\n\ndbo,A,extra\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        assert!(matches!(err, ErdError::MalformedRow { line: 5, .. }));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("schemaName"), "schemaname");
        assert_eq!(normalize_header("SCHEMA_NAME"), "schemaname");
        assert_eq!(normalize_header(" schema_name "), "schemaname");
    }

    #[test]
    fn test_ingest_tables() {
        let text = "schemaName,tableName\ndbo,Customers\n\ndbo,Orders\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b',').unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].table_name, "Orders");
    }

    #[test]
    fn test_ingest_header_order_does_not_matter() {
        let text = "table_name,schema_name\nCustomers,dbo\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b',').unwrap();
        assert_eq!(tables[0].schema_name, "dbo");
        assert_eq!(tables[0].table_name, "Customers");
    }

    #[test]
    fn test_ingest_empty_result_set() {
        let tables: Vec<TableRecord> = ingest("schemaName,tableName\n", "t", b',').unwrap();
        assert!(tables.is_empty());
        let tables: Vec<TableRecord> = ingest("", "t", b',').unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn test_ingest_field_count_mismatch_names_line() {
        let text = "schemaName,tableName\ndbo,Customers\ndbo,Orders,extra\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        match err {
            ErdError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("expected 2 fields, found 3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ingest_too_few_fields() {
        let text = "schemaName,tableName\ndbo\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        assert!(matches!(err, ErdError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_ingest_missing_header_column() {
        let text = "schemaName,name\ndbo,Customers\n";
        let err = ingest::<TableRecord>(text, "tables.csv", b',').unwrap_err();
        match err {
            ErdError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 1);
                assert!(reason.contains("tableName"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ingest_non_numeric_field() {
        let text = "schemaName,tableName,columnName,dataTypeName,maxLength,precision,scale,nullableFlag,ordinal\n\
                    dbo,Customers,CustomerID,int,4,10,0,0,first\n";
        let err = ingest::<ColumnRecord>(text, "columns.csv", b',').unwrap_err();
        match err {
            ErdError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("ordinal"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ingest_bad_nullable_flag() {
        let text = "schemaName,tableName,columnName,dataTypeName,maxLength,precision,scale,nullableFlag,ordinal\n\
                    dbo,Customers,CustomerID,int,4,10,0,maybe,1\n";
        assert!(ingest::<ColumnRecord>(text, "columns.csv", b',').is_err());
    }

    #[test]
    fn test_ingest_crlf_lines() {
        let text = "schemaName,tableName\r\ndbo,Customers\r\n";
        let tables: Vec<TableRecord> = ingest(text, "tables.csv", b',').unwrap();
        assert_eq!(tables[0].table_name, "Customers");
    }
}
