mod classify;
mod filter;
mod render;
mod schema;

use catalog_erd::config::{Delimiter, ErdConfig};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-erd")]
#[command(version)]
#[command(
    about = "Render ER diagrams from database catalog exports and prune them to active tables",
    long_about = None
)]
pub struct Cli {
    /// YAML config file (default: <config dir>/catalog-erd/config.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render full Mermaid, simple Mermaid and DBML diagrams from catalog exports
    Render {
        /// Directory holding tables/columns/primary_keys/foreign_keys exports
        /// Supports .gz, .bz2, .xz, .zst compression
        input_dir: PathBuf,

        /// Output directory for diagram artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter of the exports (single character or "tab")
        #[arg(short, long)]
        delimiter: Option<Delimiter>,

        /// Only include these schemas (comma-separated, supports wildcards)
        #[arg(short, long)]
        schemas: Option<String>,

        /// Exclude tables (comma-separated, schema.table or table, supports wildcards)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split tables into active and dead from a row-count statistics export
    Classify {
        /// Statistics export (schemaName,tableName,fullName,rowCount,isEmptyFlag)
        stats_file: PathBuf,

        /// Output directory for the dead-table report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum row count for a table to be active
        #[arg(long)]
        min_rows: Option<u64>,

        /// Field delimiter of the statistics export and the report
        #[arg(short, long)]
        delimiter: Option<Delimiter>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prune a rendered simple diagram down to active tables
    Filter {
        /// Statistics export used to decide which tables are active
        #[arg(long)]
        stats: PathBuf,

        /// Simple diagram to filter (default: simple diagram in the output directory)
        #[arg(long)]
        diagram: Option<PathBuf>,

        /// Diagram model written by render (default: model in the output directory)
        #[arg(long, conflicts_with = "text_only")]
        model: Option<PathBuf>,

        /// Output directory for the filtered diagram
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minimum row count for a table to be active
        #[arg(long)]
        min_rows: Option<u64>,

        /// Field delimiter of the statistics export
        #[arg(short, long)]
        delimiter: Option<Delimiter>,

        /// Ignore any diagram model and parse the diagram text
        #[arg(long)]
        text_only: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON Schema of a command's --json output
    Schema {
        /// Command name (render, classify, filter); all schemas if omitted
        name: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render {
            input_dir,
            output,
            delimiter,
            schemas,
            exclude,
            json,
        } => {
            let mut config = ErdConfig::resolve(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            if let Some(delimiter) = delimiter {
                config.input.delimiter = delimiter;
            }
            if let Some(schemas) = schemas {
                config.filter.schemas = split_list(&schemas);
            }
            if let Some(exclude) = exclude {
                config.filter.exclude_tables = split_list(&exclude);
            }
            render::run(&config, input_dir, json)
        }
        Commands::Classify {
            stats_file,
            output,
            min_rows,
            delimiter,
            json,
        } => {
            let mut config = ErdConfig::resolve(cli.config.as_deref())?;
            apply_activity_overrides(&mut config, output, min_rows, delimiter);
            classify::run(&config, stats_file, json)
        }
        Commands::Filter {
            stats,
            diagram,
            model,
            output,
            min_rows,
            delimiter,
            text_only,
            json,
        } => {
            let mut config = ErdConfig::resolve(cli.config.as_deref())?;
            apply_activity_overrides(&mut config, output, min_rows, delimiter);
            filter::run(&config, stats, diagram, model, text_only, json)
        }
        Commands::Schema { name } => schema::run(name),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "catalog-erd", &mut io::stdout());
            Ok(())
        }
    }
}

fn apply_activity_overrides(
    config: &mut ErdConfig,
    output: Option<PathBuf>,
    min_rows: Option<u64>,
    delimiter: Option<Delimiter>,
) {
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    if let Some(min_rows) = min_rows {
        config.activity.min_rows = min_rows;
    }
    if let Some(delimiter) = delimiter {
        config.input.delimiter = delimiter;
    }
}

/// Split a comma-separated flag value, dropping empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
