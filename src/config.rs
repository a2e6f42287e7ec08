//! YAML configuration for the pipeline stages.
//!
//! Every key is optional; command-line flags override whatever the file sets.

use crate::activity::DEFAULT_MIN_ROWS;
use crate::error::{ErdError, Result};
use crate::ingest::InputFiles;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory under the user config dir holding `config.yaml`
pub const APP_DIR: &str = "catalog-erd";
pub const CONFIG_FILE: &str = "config.yaml";

/// Single-byte field delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(pub u8);

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter(b',')
    }
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        self.0
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "\\t" | "\t" | "tab" => return Ok(Delimiter(b'\t')),
            _ => {}
        }
        match s.as_bytes() {
            [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(Delimiter(*b)),
            _ => Err(format!(
                "Invalid delimiter: {:?}. Expected a single ASCII character or \"tab\"",
                s
            )),
        }
    }
}

impl TryFrom<String> for Delimiter {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Delimiter> for String {
    fn from(d: Delimiter) -> Self {
        d.to_string()
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => write!(f, "tab"),
            b => write!(f, "{}", b as char),
        }
    }
}

/// Where the catalog exports come from and how they are delimited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub delimiter: Delimiter,
    #[serde(flatten)]
    pub files: InputFiles,
}

/// Glob patterns restricting which tables are rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Schema names to include (empty includes all)
    pub schemas: Vec<String>,
    /// `schema.table` or bare table names to exclude
    pub exclude_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub min_rows: u64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

/// Output directory and artifact file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub full: String,
    pub simple: String,
    pub dbml: String,
    pub model: String,
    pub dead_tables: String,
    pub active: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            full: "erd_full.mmd".to_string(),
            simple: "erd_simple.mmd".to_string(),
            dbml: "schema.dbml".to_string(),
            model: "erd_model.json".to_string(),
            dead_tables: "dead_tables.csv".to_string(),
            active: "erd_active.mmd".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn full_path(&self) -> PathBuf {
        self.dir.join(&self.full)
    }

    pub fn simple_path(&self) -> PathBuf {
        self.dir.join(&self.simple)
    }

    pub fn dbml_path(&self) -> PathBuf {
        self.dir.join(&self.dbml)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model)
    }

    pub fn dead_tables_path(&self) -> PathBuf {
        self.dir.join(&self.dead_tables)
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.active)
    }
}

/// Complete YAML configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErdConfig {
    pub input: InputConfig,
    pub filter: FilterConfig,
    pub activity: ActivityConfig,
    pub output: OutputConfig,
}

impl ErdConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ErdError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        // An empty file is a valid, all-defaults config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content).map_err(|e| ErdError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// `<user config dir>/catalog-erd/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Explicit file if given, else the default location if it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
