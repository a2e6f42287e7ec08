//! Mermaid erDiagram format output.

use super::types::format_column_type;
use crate::graph::view::GraphView;
use crate::schema::{EntityId, ForeignKey};

/// First line of every Mermaid diagram we emit
pub const HEADER: &str = "erDiagram";

const INDENT: &str = "  ";

/// Generate the full diagram: entity blocks with typed columns, then relationships
pub fn to_mermaid_full(view: &GraphView) -> String {
    let mut output = String::new();
    output.push_str(HEADER);
    output.push('\n');

    for table in view.tables() {
        output.push_str(&format!("{}{} {{\n", INDENT, table.entity_id()));

        for col in &table.columns {
            let col_type = escape_mermaid_type(&format_column_type(col));
            let col_name = escape_mermaid_id(&col.name);

            if view.is_primary_key(&table.key, &col.name) {
                output.push_str(&format!("{0}{0}{1} {2} PK\n", INDENT, col_type, col_name));
            } else {
                output.push_str(&format!("{0}{0}{1} {2}\n", INDENT, col_type, col_name));
            }
        }

        output.push_str(&format!("{}}}\n", INDENT));
    }

    let mut edges = view.edges().peekable();
    if edges.peek().is_some() {
        output.push('\n');
    }
    for fk in edges {
        output.push_str(&relationship_line(fk));
        output.push('\n');
    }

    output
}

/// Generate the simple diagram: entity names and relationships only
pub fn to_mermaid_simple(view: &GraphView) -> String {
    let entities: Vec<String> = view.tables().map(|t| entity_line(&t.entity_id())).collect();
    let relationships: Vec<String> = view.edges().map(relationship_line).collect();
    assemble_simple(&entities, &relationships)
}

/// Lay out a simple diagram: header, blank, entities, blank, relationships.
///
/// Shared with the text filter so both filter paths emit identical bytes.
pub(crate) fn assemble_simple<S: AsRef<str>>(entities: &[S], relationships: &[S]) -> String {
    let mut output = String::new();
    output.push_str(HEADER);
    output.push_str("\n\n");
    for line in entities {
        output.push_str(line.as_ref());
        output.push('\n');
    }
    output.push('\n');
    for line in relationships {
        output.push_str(line.as_ref());
        output.push('\n');
    }
    output
}

pub(crate) fn entity_line(id: &EntityId) -> String {
    format!("{}{}", INDENT, id)
}

/// `to ||--<marker> from : "constraint"`, referenced table first
pub(crate) fn relationship_line(fk: &ForeignKey) -> String {
    format!(
        "{}{} {} {} : \"{}\"",
        INDENT,
        fk.to.entity_id(),
        fk.cardinality().as_mermaid(),
        fk.from.entity_id(),
        fk.name.replace('"', "'")
    )
}

/// Escape a string for use as a Mermaid attribute name
fn escape_mermaid_id(s: &str) -> String {
    // Mermaid IDs should be alphanumeric with underscores
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Attribute types may carry `(len)` but no whitespace
fn escape_mermaid_type(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
