//! DBML (Database Markup Language) output.

use super::types::format_column_type;
use crate::graph::view::GraphView;
use crate::schema::ForeignKey;

/// Generate DBML table definitions and references from a graph view
pub fn to_dbml(view: &GraphView) -> String {
    let mut output = String::new();

    for (i, table) in view.tables().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!(
            "Table {}.{} {{\n",
            quote_name(&table.key.schema),
            quote_name(&table.key.name)
        ));

        for col in &table.columns {
            let mut attrs = Vec::new();
            if view.is_primary_key(&table.key, &col.name) {
                attrs.push("pk");
            }
            if !col.is_nullable {
                attrs.push("not null");
            }

            let type_name = quote_type(&format_column_type(col));
            if attrs.is_empty() {
                output.push_str(&format!("  {} {}\n", quote_name(&col.name), type_name));
            } else {
                output.push_str(&format!(
                    "  {} {} [{}]\n",
                    quote_name(&col.name),
                    type_name,
                    attrs.join(", ")
                ));
            }
        }

        output.push_str("}\n");
    }

    let mut edges = view.edges().peekable();
    if edges.peek().is_some() {
        output.push('\n');
    }
    for fk in edges {
        output.push_str(&reference(fk));
        output.push('\n');
    }

    output
}

/// `Ref: child.col > parent.col // name`, tuple syntax for composite keys
fn reference(fk: &ForeignKey) -> String {
    let (from_cols, to_cols) = if fk.is_composite() {
        (
            column_tuple(fk.from_columns()),
            column_tuple(fk.to_columns()),
        )
    } else {
        (
            fk.from_columns().map(quote_name).collect::<String>(),
            fk.to_columns().map(quote_name).collect::<String>(),
        )
    };

    format!(
        "Ref: {}.{}.{} > {}.{}.{} // {}",
        quote_name(&fk.from.schema),
        quote_name(&fk.from.name),
        from_cols,
        quote_name(&fk.to.schema),
        quote_name(&fk.to.name),
        to_cols,
        fk.name
    )
}

fn column_tuple<'a>(columns: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<String> = columns.map(quote_name).collect();
    format!("({})", names.join(", "))
}

/// Quote names DBML would not accept bare
fn quote_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\\\""))
    }
}

fn quote_type(type_name: &str) -> String {
    if type_name.chars().any(char::is_whitespace) {
        format!("\"{}\"", type_name)
    } else {
        type_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnPair, PrimaryKeySet, SchemaGraph, Table, TableKey};

    fn column(name: &str, data_type: &str, nullable: bool, ordinal: u32) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: 4,
            precision: 10,
            scale: 0,
            is_nullable: nullable,
            ordinal,
        }
    }

    fn pair(from: &str, to: &str, ordinal: u32) -> ColumnPair {
        ColumnPair {
            from_column: from.to_string(),
            to_column: to.to_string(),
            from_nullable: false,
            ordinal,
        }
    }

    fn create_test_graph() -> SchemaGraph {
        let orders = TableKey::new("dbo", "Orders");
        let lines = TableKey::new("dbo", "Order Lines");

        let mut primary_key = PrimaryKeySet::new();
        primary_key.insert(orders.clone(), "x");
        primary_key.insert(orders.clone(), "y");

        SchemaGraph {
            tables: vec![
                Table {
                    key: orders.clone(),
                    columns: vec![column("x", "int", false, 1), column("y", "int", false, 2)],
                },
                Table {
                    key: lines.clone(),
                    columns: vec![
                        column("a", "int", false, 1),
                        column("b", "int", true, 2),
                        column("note", "sql_variant", true, 3),
                    ],
                },
            ],
            foreign_keys: vec![
                ForeignKey {
                    name: "FK_Lines_Orders".to_string(),
                    from: lines.clone(),
                    to: orders.clone(),
                    pairs: vec![pair("b", "y", 1), pair("a", "x", 2)],
                },
                ForeignKey {
                    name: "FK_Lines_Orders_X".to_string(),
                    from: lines,
                    to: orders,
                    pairs: vec![pair("a", "x", 1)],
                },
            ],
            primary_key,
        }
    }

    #[test]
    fn test_dbml_tables() {
        let graph = create_test_graph();
        let output = to_dbml(&GraphView::full(&graph));

        assert!(output.starts_with("Table dbo.Orders {\n  x int [pk, not null]\n  y int [pk, not null]\n}\n"));
        assert!(output.contains("Table dbo.\"Order Lines\" {\n  a int [not null]\n  b int\n  note sql_variant\n}\n"));
    }

    #[test]
    fn test_dbml_single_column_reference() {
        let graph = create_test_graph();
        let output = to_dbml(&GraphView::full(&graph));
        assert!(output.contains("Ref: dbo.\"Order Lines\".a > dbo.Orders.x // FK_Lines_Orders_X\n"));
    }

    #[test]
    fn test_dbml_composite_reference_in_ordinal_order() {
        let graph = create_test_graph();
        let output = to_dbml(&GraphView::full(&graph));
        assert!(output.contains("Ref: dbo.\"Order Lines\".(b, a) > dbo.Orders.(y, x) // FK_Lines_Orders\n"));
    }
}
