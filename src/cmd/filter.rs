//! Filter command implementation.

use super::classify::load_activity;
use catalog_erd::artifact::{read_upstream, write_atomic};
use catalog_erd::config::ErdConfig;
use catalog_erd::filter::{DiagramFilter, FilterStats};
use catalog_erd::graph::DiagramModel;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for the filter command
#[derive(Serialize, JsonSchema)]
pub(crate) struct FilterJsonOutput {
    diagram_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_file: Option<String>,
    output_file: String,
    active_tables: usize,
    dead_tables: usize,
    statistics: FilterStats,
}

pub fn run(
    config: &ErdConfig,
    stats_file: PathBuf,
    diagram: Option<PathBuf>,
    model: Option<PathBuf>,
    text_only: bool,
    json: bool,
) -> anyhow::Result<()> {
    let diagram_path = diagram.unwrap_or_else(|| config.output.simple_path());
    let text = read_upstream("filter", &diagram_path)?;

    // An explicit --model must exist; the default location is optional
    let model_path = if text_only {
        None
    } else {
        match model {
            Some(path) => Some(path),
            None => Some(config.output.model_path()).filter(|p| p.is_file()),
        }
    };
    let model = match &model_path {
        Some(path) => Some(DiagramModel::from_json(&read_upstream("filter", path)?, path)?),
        None => None,
    };

    let activity = load_activity("filter", config, &stats_file)?;
    let active = activity.active_set();
    let outcome = DiagramFilter::new(&active).filter(&text, model.as_ref());

    let output_path = config.output.active_path();
    write_atomic(&output_path, &outcome.text)?;

    if json {
        let output = FilterJsonOutput {
            diagram_file: diagram_path.display().to_string(),
            model_file: model_path.map(|p| p.display().to_string()),
            output_file: output_path.display().to_string(),
            active_tables: activity.active.len(),
            dead_tables: activity.dead.len(),
            statistics: outcome.stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let stats = outcome.stats;
        eprintln!(
            "Filtered diagram ({} path): kept {} of {} entities, {} of {} relationships",
            stats.path,
            stats.kept_entities,
            stats.kept_entities + stats.dropped_entities,
            stats.kept_relationships,
            stats.kept_relationships + stats.dropped_relationships
        );
        if stats.ignored_lines > 0 {
            eprintln!("  {} unrecognized lines ignored", stats.ignored_lines);
        }
        eprintln!("Active diagram: {}", output_path.display());
    }

    Ok(())
}
