//! Metadata sources and the typed catalog they produce.

use super::{
    ingest, read_maybe_compressed, ColumnRecord, ForeignKeyRecord, PrimaryKeyRecord, Record,
    RecordKind, TableRecord,
};
use crate::error::{ErdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw text for one record kind, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct SourceText {
    /// Name used in error messages (usually the file name)
    pub name: String,
    pub text: String,
}

/// Anything that can hand over delimited catalog exports.
pub trait MetadataSource {
    /// Human-readable description for log and error output.
    fn describe(&self) -> String;

    /// Fetch the delimited text for one record kind.
    fn read(&self, kind: RecordKind) -> Result<SourceText>;
}

/// File names of the four catalog exports inside a source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFiles {
    pub tables: String,
    pub columns: String,
    pub primary_keys: String,
    pub foreign_keys: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            tables: "tables.csv".to_string(),
            columns: "columns.csv".to_string(),
            primary_keys: "primary_keys.csv".to_string(),
            foreign_keys: "foreign_keys.csv".to_string(),
        }
    }
}

impl InputFiles {
    fn name_for(&self, kind: RecordKind) -> Option<&str> {
        match kind {
            RecordKind::Tables => Some(&self.tables),
            RecordKind::Columns => Some(&self.columns),
            RecordKind::PrimaryKeys => Some(&self.primary_keys),
            RecordKind::ForeignKeys => Some(&self.foreign_keys),
            RecordKind::Statistics => None,
        }
    }
}

/// Reads catalog exports from a directory of (optionally compressed) files.
///
/// A configured name such as `columns.csv` also matches `columns.csv.gz`,
/// `.bz2`, `.xz` and `.zst` siblings when the plain file is absent.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    files: InputFiles,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: InputFiles::default(),
        }
    }

    pub fn with_files(mut self, files: InputFiles) -> Self {
        self.files = files;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let plain = self.dir.join(name);
        if plain.exists() {
            return plain;
        }
        ["gz", "bz2", "xz", "zst"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.exists())
            .unwrap_or(plain)
    }
}

impl MetadataSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }

    fn read(&self, kind: RecordKind) -> Result<SourceText> {
        if !self.dir.is_dir() {
            return Err(ErdError::Connectivity {
                path: self.dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let name = self.files.name_for(kind).ok_or_else(|| ErdError::Connectivity {
            path: self.dir.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                format!("{} are not part of the catalog export", kind),
            ),
        })?;

        let path = self.resolve(name);
        let text = read_maybe_compressed(&path).map_err(|source| ErdError::Connectivity {
            path: path.clone(),
            source,
        })?;

        Ok(SourceText {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string()),
            text,
        })
    }
}

/// All typed records read from a metadata source.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tables: Vec<TableRecord>,
    pub columns: Vec<ColumnRecord>,
    pub primary_keys: Vec<PrimaryKeyRecord>,
    pub foreign_keys: Vec<ForeignKeyRecord>,
}

impl Catalog {
    /// Read and ingest every record kind from `source`.
    pub fn load(source: &dyn MetadataSource, delimiter: u8) -> Result<Self> {
        tracing::info!(source = %source.describe(), "loading catalog");

        let catalog = Self {
            tables: load_kind(source, delimiter)?,
            columns: load_kind(source, delimiter)?,
            primary_keys: load_kind(source, delimiter)?,
            foreign_keys: load_kind(source, delimiter)?,
        };

        tracing::info!(
            tables = catalog.tables.len(),
            columns = catalog.columns.len(),
            primary_keys = catalog.primary_keys.len(),
            foreign_keys = catalog.foreign_keys.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn load_kind<T: Record>(source: &dyn MetadataSource, delimiter: u8) -> Result<Vec<T>> {
    let raw = source.read(T::KIND)?;
    ingest(&raw.text, &raw.name, delimiter)
}
