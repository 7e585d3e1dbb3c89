//! Command-line driver for the analysis pipeline.
//!
//! Runs the core over a repository and serializes its output contracts to
//! JSON files. No report templating happens here; renderers consume the
//! emitted data.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repo_insight::{AnalysisConfig, AnalysisOutcome, Language};

/// Name of the directory created under the output path.
const OUTPUT_FOLDER: &str = "repo-insight-output";

#[derive(Parser)]
#[command(
    name = "repo-insight",
    version,
    about = "Profile the structure and documentation of a source repository"
)]
struct Args {
    /// Repository root to analyze.
    #[arg(long)]
    repository: PathBuf,

    /// Language of the repository: python or csharp.
    #[arg(long)]
    language: String,

    /// Directory the JSON output is written into. Defaults to the current
    /// directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Extra directory names to exclude, comma-separated.
    #[arg(long)]
    exclude: Option<String>,
}

/// Run metadata written alongside the data files.
#[derive(Serialize)]
struct Manifest {
    repository: String,
    language: String,
    module_count: usize,
    generated_at: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let language: Language = args.language.parse()?;

    let mut config = AnalysisConfig::new(args.repository.clone(), language);
    if let Some(extra) = &args.exclude {
        config = config.with_excluded(extra.split(',').map(str::trim).map(str::to_string));
    }

    let outcome = repo_insight::run_analysis(&config)?;

    let output_root = args.output.unwrap_or_else(|| PathBuf::from("."));
    let output_dir = output_root.join(OUTPUT_FOLDER);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    write_outputs(&output_dir, &outcome, &args.repository, language)?;
    info!(output = %output_dir.display(), "analysis complete");

    Ok(())
}

fn write_outputs(
    output_dir: &std::path::Path,
    outcome: &AnalysisOutcome,
    repository: &std::path::Path,
    language: Language,
) -> Result<()> {
    write_json(output_dir, "modules.json", &outcome.modules)?;
    write_json(output_dir, "graph.json", &outcome.graph)?;
    write_json(output_dir, "metrics.json", &outcome.metrics)?;
    write_json(output_dir, "insights.json", &outcome.insights)?;

    let manifest = Manifest {
        repository: repository.display().to_string(),
        language: language.to_string(),
        module_count: outcome.modules.len(),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    write_json(output_dir, "manifest.json", &manifest)?;

    Ok(())
}

fn write_json<T: Serialize>(dir: &std::path::Path, name: &str, value: &T) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {}", name))?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(file = %path.display(), "wrote output");
    Ok(())
}
