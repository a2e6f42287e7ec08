//! Prune a simple diagram down to the active tables.
//!
//! Two paths produce the same bytes for the same inputs:
//!
//! - structured: re-render from a [`DiagramModel`] restricted to the active set,
//!   used when the model's digest matches the diagram text;
//! - text: classify each diagram line and keep the ones whose identifiers are
//!   all active.

use crate::activity::ActiveSet;
use crate::graph::format::mermaid::{assemble_simple, HEADER};
use crate::graph::{to_mermaid_simple, DiagramModel, GraphView};
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An entity declaration: a lone identifier
static ENTITY_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+)$").unwrap());

/// `left ||--o{ right`, optionally followed by `: "label"` or `: label`
static RELATIONSHIP_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([A-Za-z0-9_]+)\s+(?:\|\||\|o|o\||\}o|\}\|)(?:--|\.\.)(?:\|\||o\||\|o|o\{|\|\{)\s+([A-Za-z0-9_]+)(?:\s*:\s*(?:"[^"]*"|[^"\s].*))?$"#,
    )
    .unwrap()
});

/// Which implementation produced a filtered diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterPath {
    Structured,
    Text,
}

impl fmt::Display for FilterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPath::Structured => write!(f, "structured"),
            FilterPath::Text => write!(f, "text"),
        }
    }
}

/// What a filter run kept and dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterStats {
    pub path: FilterPath,
    pub kept_entities: usize,
    pub dropped_entities: usize,
    pub kept_relationships: usize,
    pub dropped_relationships: usize,
    /// Lines that were neither entities nor relationships (text path only)
    pub ignored_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub text: String,
    pub stats: FilterStats,
}

/// Classification of one diagram line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'t> {
    Entity(&'t str),
    Relationship { left: &'t str, right: &'t str },
    Other,
}

fn classify_line(line: &str) -> Line<'_> {
    if let Some(caps) = ENTITY_LINE_RE.captures(line) {
        if let Some(id) = caps.get(1) {
            return Line::Entity(id.as_str());
        }
    }
    if let Some(caps) = RELATIONSHIP_LINE_RE.captures(line) {
        if let (Some(left), Some(right)) = (caps.get(1), caps.get(2)) {
            return Line::Relationship {
                left: left.as_str(),
                right: right.as_str(),
            };
        }
    }
    Line::Other
}

/// Restricts simple diagrams to an active table set.
pub struct DiagramFilter<'a> {
    active: &'a ActiveSet,
}

impl<'a> DiagramFilter<'a> {
    pub fn new(active: &'a ActiveSet) -> Self {
        Self { active }
    }

    /// Filter `text`, preferring `model` when it still describes the text.
    pub fn filter(&self, text: &str, model: Option<&DiagramModel>) -> FilterOutcome {
        match model {
            Some(model) if model.describes(text) => self.filter_model(model),
            Some(_) => {
                tracing::warn!("diagram model does not match the diagram text, parsing text instead");
                self.filter_text(text)
            }
            None => self.filter_text(text),
        }
    }

    /// Re-render the simple diagram from the model's graph.
    pub fn filter_model(&self, model: &DiagramModel) -> FilterOutcome {
        let full = GraphView::full(&model.graph);
        let view = GraphView::restricted(&model.graph, self.active.keys());

        let kept_entities = view.table_count();
        let kept_relationships = view.edge_count();
        let stats = FilterStats {
            path: FilterPath::Structured,
            kept_entities,
            dropped_entities: full.table_count() - kept_entities,
            kept_relationships,
            dropped_relationships: full.edge_count() - kept_relationships,
            ignored_lines: 0,
        };

        tracing::info!(
            entities = kept_entities,
            relationships = kept_relationships,
            "filtered diagram from model"
        );
        FilterOutcome {
            text: to_mermaid_simple(&view),
            stats,
        }
    }

    /// Parse the diagram text and keep lines whose identifiers are active.
    pub fn filter_text(&self, text: &str) -> FilterOutcome {
        let mut entities: Vec<String> = Vec::new();
        let mut relationships: Vec<String> = Vec::new();
        let mut stats = FilterStats {
            path: FilterPath::Text,
            kept_entities: 0,
            dropped_entities: 0,
            kept_relationships: 0,
            dropped_relationships: 0,
            ignored_lines: 0,
        };

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line == HEADER {
                continue;
            }

            match classify_line(line) {
                Line::Entity(id) => {
                    if self.active.contains_id(id) {
                        entities.push(format!("  {}", line));
                        stats.kept_entities += 1;
                    } else {
                        stats.dropped_entities += 1;
                    }
                }
                Line::Relationship { left, right } => {
                    if self.active.contains_id(left) && self.active.contains_id(right) {
                        relationships.push(format!("  {}", line));
                        stats.kept_relationships += 1;
                    } else {
                        stats.dropped_relationships += 1;
                    }
                }
                Line::Other => {
                    tracing::debug!(line = i + 1, text = line, "ignoring unrecognized diagram line");
                    stats.ignored_lines += 1;
                }
            }
        }

        tracing::info!(
            entities = stats.kept_entities,
            relationships = stats.kept_relationships,
            ignored = stats.ignored_lines,
            "filtered diagram text"
        );
        FilterOutcome {
            text: assemble_simple(&entities, &relationships),
            stats,
        }
    }
}
