//! The analysis pipeline: scan, parse, resolve, aggregate, derive.
//!
//! Data flows strictly one way. File parses are independent and fan out
//! across threads; their results are merged and sorted by path before the
//! sequential stages run. A file that fails to parse is reported and
//! skipped - partial results are always produced.

pub mod csharp;
pub mod dependencies;
pub mod docstring;
pub mod error;
pub mod metrics;
pub mod python;
pub mod scanner;
pub mod xmldoc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::diagnostics::report_parse_failure;
use crate::insights::{derive_insights, InsightReport};
use crate::model::ModuleInfo;

use dependencies::{dependency_graph, DependencyGraph};
use metrics::RepositoryMetrics;

/// The core's output contracts for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub modules: Vec<ModuleInfo>,
    pub graph: DependencyGraph,
    pub metrics: RepositoryMetrics,
    pub insights: InsightReport,
}

/// Run the whole pipeline over the configured repository.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    let repository = config
        .repository
        .canonicalize()
        .with_context(|| format!("resolving repository root {}", config.repository.display()))?;

    info!(repository = %repository.display(), "scanning repository");
    let files = scanner::scan_repository(&repository, &config.included, &config.excluded)?;
    info!(language = %config.language, count = files.len(), "files found");

    let modules = parse_files(&files, config);

    info!(parsed = modules.len(), "building dependency graph");
    let graph = dependency_graph(&modules, &repository, config.language)?;

    info!("aggregating metrics");
    let metrics = RepositoryMetrics::collect(&modules, &repository);

    info!("deriving insights");
    let insights = derive_insights(&metrics, &graph, &repository)?;

    Ok(AnalysisOutcome {
        modules,
        graph,
        metrics,
        insights,
    })
}

/// Parse every file, in parallel, isolating per-file failures.
///
/// The merged list is sorted by path so the downstream stages always see
/// a deterministic order regardless of scheduling.
fn parse_files(files: &[PathBuf], config: &AnalysisConfig) -> Vec<ModuleInfo> {
    let mut modules: Vec<ModuleInfo> = files
        .par_iter()
        .filter_map(|path| match config.language.parse_file(path) {
            Ok(module) => Some(module),
            Err(error) => {
                report_parse_failure(path, &error);
                None
            }
        })
        .collect();

    modules.sort_by(|a, b| a.path.cmp(&b.path));
    modules
}
