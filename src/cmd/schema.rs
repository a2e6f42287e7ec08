//! JSON Schema generation for `--json` outputs.

use super::classify::ClassifyJsonOutput;
use super::filter::FilterJsonOutput;
use super::render::RenderJsonOutput;
use anyhow::bail;
use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All JSON schemas for commands that support --json output.
/// BTreeMap keeps the printed order stable.
pub(crate) fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();
    schemas.insert("classify", schema_for!(ClassifyJsonOutput));
    schemas.insert("filter", schema_for!(FilterJsonOutput));
    schemas.insert("render", schema_for!(RenderJsonOutput));
    schemas
}

pub fn run(name: Option<String>) -> anyhow::Result<()> {
    let mut schemas = all_schemas();

    let output = match name {
        Some(name) => match schemas.remove(name.as_str()) {
            Some(schema) => serde_json::to_string_pretty(&schema)?,
            None => bail!(
                "unknown schema: {}. Valid options: {}",
                name,
                schemas.keys().copied().collect::<Vec<_>>().join(", ")
            ),
        },
        None => serde_json::to_string_pretty(&schemas)?,
    };
    println!("{}", output);
    Ok(())
}
