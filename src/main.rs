//! Evalviz - Evaluation Score Visualizer
//!
//! Reads a CSV of evaluation scores and renders one radar chart per record
//! plus an aggregate flow (Sankey) diagram as an interactive HTML report.

mod charts;
mod color;
mod data;
mod output;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data::ScoreTable;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evaluation score chart generator", long_about = None)]
struct Cli {
    /// Scores CSV to ingest
    #[arg(default_value = "scores.csv", value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Directory receiving the generated artifacts
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    std::fs::create_dir_all(&cli.out_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cli.out_dir.display()
        )
    })?;

    let table = ScoreTable::load_csv(&cli.input)
        .with_context(|| format!("failed to load scores from {}", cli.input.display()))?;
    info!(records = table.len(), "loaded score table");

    let rendered = charts::render_charts(&table, &cli.out_dir);
    info!(rendered, total = table.len(), "radar charts written");

    let figure = charts::build_figure(&table);
    let html_path = cli.out_dir.join("sankey_diagram.html");
    output::write_sankey_html(&html_path, &figure)
        .with_context(|| format!("failed to write {}", html_path.display()))?;
    info!(path = %html_path.display(), "flow diagram written");

    Ok(())
}
