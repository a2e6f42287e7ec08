//! Output format implementations for diagram rendering.

mod dbml;
pub(crate) mod mermaid;
mod types;

pub use dbml::to_dbml;
pub use mermaid::{to_mermaid_full, to_mermaid_simple, HEADER};
pub use types::format_column_type;

use crate::graph::view::GraphView;
use std::fmt;
use std::str::FromStr;

/// Diagram format produced by the render stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Mermaid erDiagram with typed columns and PK tags
    Full,
    /// Mermaid erDiagram with entity names and relationships only
    Simple,
    /// DBML table and reference definitions
    Dbml,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Full, OutputFormat::Simple, OutputFormat::Dbml];

    /// Render a view in this format
    pub fn render(&self, view: &GraphView) -> String {
        match self {
            OutputFormat::Full => to_mermaid_full(view),
            OutputFormat::Simple => to_mermaid_simple(view),
            OutputFormat::Dbml => to_dbml(view),
        }
    }

    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Full | OutputFormat::Simple => "mmd",
            OutputFormat::Dbml => "dbml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "mermaid" => Ok(OutputFormat::Full),
            "simple" => Ok(OutputFormat::Simple),
            "dbml" => Ok(OutputFormat::Dbml),
            _ => Err(format!(
                "Unknown format: {}. Valid options: full, simple, dbml",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Full => write!(f, "full"),
            OutputFormat::Simple => write!(f, "simple"),
            OutputFormat::Dbml => write!(f, "dbml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("full".parse::<OutputFormat>(), Ok(OutputFormat::Full));
        assert_eq!("Mermaid".parse::<OutputFormat>(), Ok(OutputFormat::Full));
        assert_eq!("SIMPLE".parse::<OutputFormat>(), Ok(OutputFormat::Simple));
        assert_eq!("dbml".parse::<OutputFormat>(), Ok(OutputFormat::Dbml));
        assert!("dot".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_display_round_trips() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>(), Ok(format));
        }
    }
}
