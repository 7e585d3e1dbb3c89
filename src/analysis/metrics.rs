//! Per-module and repository-wide size and documentation metrics.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Language;
use crate::model::{ClassInfo, FunctionInfo, ModuleInfo, ModuleMetrics};

/// Percentage of `part` over `total`, rounded to two decimals.
/// A zero denominator yields zero rather than an error.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 2)
}

/// Average of the given values.
///
/// An empty input set is an invalid call, not missing-but-expected data,
/// so it is a hard error.
pub fn average(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        anyhow::bail!("cannot average an empty set of values");
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Render a number, dropping the decimals when the value is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Display name of a module: the file name of its repository-relative path.
pub fn module_display_name(path: &Path, repository: &Path) -> String {
    let relative = path.strip_prefix(repository).unwrap_or(path);
    relative
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative.display().to_string())
}

/// Compute size metrics for one module from its source text and its
/// already-extracted structure.
pub fn module_metrics(
    src: &str,
    language: Language,
    classes: &[ClassInfo],
    functions: &[FunctionInfo],
) -> ModuleMetrics {
    ModuleMetrics {
        loc: src.lines().count(),
        sloc: meaningful_lines(src, language),
        n_classes: classes.len(),
        n_functions: functions.len(),
        n_methods: classes.iter().map(|cls| cls.methods.len()).sum(),
    }
}

/// Count lines that carry code, using the language's comment rules.
pub fn meaningful_lines(src: &str, language: Language) -> usize {
    match language {
        Language::Python => python_sloc(src),
        Language::CSharp => csharp_sloc(src),
    }
}

fn python_sloc(src: &str) -> usize {
    src.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .count()
}

/// Meaningful-line counting with `//` and properly-paired `/* */` markers.
/// Code sharing a line with a block marker still counts.
fn csharp_sloc(src: &str) -> usize {
    let mut count = 0;
    let mut in_block = false;

    for line in src.lines() {
        let mut rest = line;
        let mut has_code = false;

        loop {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        rest = &rest[end + 2..];
                        in_block = false;
                    }
                    None => break,
                }
            } else {
                let line_comment = rest.find("//");
                let block_start = rest.find("/*");
                match (line_comment, block_start) {
                    (Some(lc), bs) if bs.is_none_or(|b| lc < b) => {
                        if !rest[..lc].trim().is_empty() {
                            has_code = true;
                        }
                        break;
                    }
                    (_, Some(bs)) => {
                        if !rest[..bs].trim().is_empty() {
                            has_code = true;
                        }
                        rest = &rest[bs + 2..];
                        in_block = true;
                    }
                    _ => {
                        if !rest.trim().is_empty() {
                            has_code = true;
                        }
                        break;
                    }
                }
            }
        }

        if has_code {
            count += 1;
        }
    }

    count
}

/// One row of the per-module structural overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOverview {
    pub name: String,
    pub loc: usize,
    pub sloc: usize,
    pub n_classes: usize,
    pub n_methods: usize,
    pub n_functions: usize,
    pub n_attributes: usize,
}

/// One row of the per-module documentation-coverage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleCoverage {
    pub name: String,
    pub sloc: usize,
    pub n_classes: usize,
    pub n_methods: usize,
    pub n_functions: usize,
    /// Classes + methods + attributes eligible to carry documentation.
    pub total_items: usize,
    pub documented_items: usize,
}

/// Aggregate metrics for a whole repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub loc: usize,
    pub sloc: usize,
    pub modules_overview: Vec<ModuleOverview>,
    pub module_stats: Vec<ModuleCoverage>,
    pub class_percent: f64,
    pub method_percent: f64,
    pub attribute_percent: f64,
}

impl RepositoryMetrics {
    /// Aggregate over the analyzed modules, traversed sorted by path so the
    /// emitted records are reproducible.
    pub fn collect(modules: &[ModuleInfo], repository: &Path) -> Self {
        let mut sorted: Vec<&ModuleInfo> = modules.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));

        let mut loc = 0;
        let mut sloc = 0;

        let mut classes = 0;
        let mut documented_classes = 0;
        let mut methods = 0;
        let mut documented_methods = 0;
        let mut attributes = 0;
        let mut documented_attributes = 0;

        let mut modules_overview = Vec::with_capacity(sorted.len());
        let mut module_stats = Vec::with_capacity(sorted.len());

        for module in sorted {
            let Some(metrics) = module.metrics else {
                continue;
            };

            let name = module_display_name(&module.path, repository);

            loc += metrics.loc;
            sloc += metrics.sloc;

            let mut module_classes = 0;
            let mut module_documented_classes = 0;
            let mut module_methods = 0;
            let mut module_documented_methods = 0;
            let mut module_attributes = 0;
            let mut module_documented_attributes = 0;

            for cls in &module.classes {
                classes += 1;
                module_classes += 1;
                if is_documented(&cls.doc) {
                    documented_classes += 1;
                    module_documented_classes += 1;
                }

                for method in &cls.methods {
                    methods += 1;
                    module_methods += 1;
                    if is_documented(&method.doc) {
                        documented_methods += 1;
                        module_documented_methods += 1;
                    }
                }

                for attr in &cls.attributes {
                    attributes += 1;
                    module_attributes += 1;
                    if is_documented(&attr.doc) {
                        documented_attributes += 1;
                        module_documented_attributes += 1;
                    }
                }
            }

            modules_overview.push(ModuleOverview {
                name: name.clone(),
                loc: metrics.loc,
                sloc: metrics.sloc,
                n_classes: metrics.n_classes,
                n_methods: metrics.n_methods,
                n_functions: metrics.n_functions,
                n_attributes: module_attributes,
            });

            module_stats.push(ModuleCoverage {
                name,
                sloc: metrics.sloc,
                n_classes: metrics.n_classes,
                n_methods: metrics.n_methods,
                n_functions: metrics.n_functions,
                total_items: module_classes + module_methods + module_attributes,
                documented_items: module_documented_classes
                    + module_documented_methods
                    + module_documented_attributes,
            });
        }

        Self {
            loc,
            sloc,
            modules_overview,
            module_stats,
            class_percent: percentage(documented_classes, classes),
            method_percent: percentage(documented_methods, methods),
            attribute_percent: percentage(documented_attributes, attributes),
        }
    }
}

fn is_documented(doc: &Option<String>) -> bool {
    doc.as_deref().is_some_and(|text| !text.trim().is_empty())
}
