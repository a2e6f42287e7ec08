//! Render command implementation.

use catalog_erd::artifact::ArtifactSet;
use catalog_erd::config::ErdConfig;
use catalog_erd::graph::{DiagramModel, GraphView, OutputFormat};
use catalog_erd::ingest::{Catalog, DirectorySource};
use catalog_erd::schema::{FilterReport, SchemaBuilder, SchemaFilter};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for the render command
#[derive(Serialize, JsonSchema)]
pub(crate) struct RenderJsonOutput {
    input_dir: String,
    output_dir: String,
    statistics: RenderStatistics,
    artifacts: Vec<ArtifactJson>,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct RenderStatistics {
    tables: usize,
    columns: usize,
    primary_key_columns: usize,
    relationships: usize,
    /// Records removed by the schema and table filters
    filtered_out: FilterReport,
}

#[derive(Serialize, JsonSchema)]
pub(crate) struct ArtifactJson {
    kind: String,
    path: String,
    bytes: usize,
}

pub fn run(config: &ErdConfig, input_dir: PathBuf, json: bool) -> anyhow::Result<()> {
    if !json {
        eprintln!("Rendering ERD: {}", input_dir.display());
    }

    let source = DirectorySource::new(&input_dir).with_files(config.input.files.clone());
    let catalog = Catalog::load(&source, config.input.delimiter.byte())?;

    let filter = SchemaFilter::new(&config.filter.schemas, &config.filter.exclude_tables)?;
    let (graph, filtered_out) = SchemaBuilder::new()
        .with_filter(filter)
        .build_with_report(catalog)?;
    let view = GraphView::full(&graph);

    // Assemble every artifact before touching the output directory
    let mut outputs: Vec<(String, PathBuf, String)> = OutputFormat::ALL
        .iter()
        .map(|format| {
            let path = match format {
                OutputFormat::Full => config.output.full_path(),
                OutputFormat::Simple => config.output.simple_path(),
                OutputFormat::Dbml => config.output.dbml_path(),
            };
            (format.to_string(), path, format.render(&view))
        })
        .collect();
    let statistics = RenderStatistics {
        tables: graph.len(),
        columns: graph.column_count(),
        primary_key_columns: graph.primary_key.len(),
        relationships: graph.relationship_count(),
        filtered_out,
    };
    let model = DiagramModel::new(graph);
    // The model is committed last
    outputs.push(("model".to_string(), config.output.model_path(), model.to_json()?));

    let mut staged = ArtifactSet::new();
    for (_, path, contents) in &outputs {
        staged.stage(path, contents)?;
    }
    staged.commit()?;

    let artifacts: Vec<ArtifactJson> = outputs
        .iter()
        .map(|(kind, path, contents)| ArtifactJson {
            kind: kind.clone(),
            path: path.display().to_string(),
            bytes: contents.len(),
        })
        .collect();

    if json {
        let output = RenderJsonOutput {
            input_dir: input_dir.display().to_string(),
            output_dir: config.output.dir.display().to_string(),
            statistics,
            artifacts,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!(
            "Schema: {} tables, {} columns, {} relationships",
            statistics.tables, statistics.columns, statistics.relationships
        );
        if statistics.filtered_out.total() > 0 {
            eprintln!(
                "  filtered out: {} tables, {} columns, {} key columns, {} foreign key columns",
                statistics.filtered_out.tables,
                statistics.filtered_out.columns,
                statistics.filtered_out.primary_keys,
                statistics.filtered_out.foreign_keys
            );
        }
        for artifact in &artifacts {
            eprintln!("  {:<6} -> {}", artifact.kind, artifact.path);
        }
    }

    Ok(())
}
