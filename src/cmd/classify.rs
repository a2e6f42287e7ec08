//! Classify command implementation.

use catalog_erd::activity::{Activity, ActivityClassifier};
use catalog_erd::artifact::{read_upstream, write_atomic};
use catalog_erd::config::ErdConfig;
use catalog_erd::ingest::{ingest, TableStatistic};
use catalog_erd::schema::SchemaFilter;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON output for the classify command
#[derive(Serialize, JsonSchema)]
pub(crate) struct ClassifyJsonOutput {
    stats_file: String,
    report_file: String,
    min_rows: u64,
    active: usize,
    dead: usize,
    dead_tables: Vec<TableStatistic>,
}

/// Read a statistics export, apply the configured schema filter and classify.
pub(crate) fn load_activity(
    stage: &'static str,
    config: &ErdConfig,
    stats_file: &Path,
) -> anyhow::Result<Activity> {
    let text = read_upstream(stage, stats_file)?;
    let name = stats_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| stats_file.display().to_string());
    let stats: Vec<TableStatistic> = ingest(&text, &name, config.input.delimiter.byte())?;
    let stats = SchemaFilter::new(&config.filter.schemas, &config.filter.exclude_tables)?
        .retain_statistics(stats);

    Ok(ActivityClassifier::new(config.activity.min_rows).classify(stats))
}

pub fn run(config: &ErdConfig, stats_file: PathBuf, json: bool) -> anyhow::Result<()> {
    let activity = load_activity("classify", config, &stats_file)?;

    let report_path = config.output.dead_tables_path();
    let report = activity.dead_report(config.input.delimiter.byte())?;
    write_atomic(&report_path, &report)?;

    if json {
        let output = ClassifyJsonOutput {
            stats_file: stats_file.display().to_string(),
            report_file: report_path.display().to_string(),
            min_rows: config.activity.min_rows,
            active: activity.active.len(),
            dead: activity.dead.len(),
            dead_tables: activity.dead,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!(
            "Tables: {} active, {} dead (min rows: {})",
            activity.active.len(),
            activity.dead.len(),
            config.activity.min_rows
        );
        eprintln!("Dead-table report: {}", report_path.display());
    }

    Ok(())
}
