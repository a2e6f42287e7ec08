//! Relationship cardinality derived from foreign-key nullability.

use super::ColumnPair;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cardinality of the referencing side of a relationship.
///
/// The referenced side is always rendered as exactly-one; uniqueness of the
/// referenced columns is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Zero or more referencing rows (some FK column is nullable)
    OptionalMany,
    /// One or more referencing rows (every FK column is NOT NULL)
    MandatoryMany,
}

impl Cardinality {
    /// Resolve over the whole group: one nullable column makes it optional.
    pub fn resolve(pairs: &[ColumnPair]) -> Self {
        if pairs.iter().any(|p| p.from_nullable) {
            Cardinality::OptionalMany
        } else {
            Cardinality::MandatoryMany
        }
    }

    /// Marker for the referencing side
    pub fn marker(self) -> &'static str {
        match self {
            Cardinality::OptionalMany => "o{",
            Cardinality::MandatoryMany => "|{",
        }
    }

    /// Mermaid relationship token, referenced side first
    pub fn as_mermaid(self) -> &'static str {
        match self {
            Cardinality::OptionalMany => "||--o{",
            Cardinality::MandatoryMany => "||--|{",
        }
    }
}
