//! Insight heuristics engine.
//!
//! A pure function of the repository metrics and the dependency graph,
//! producing hotspots, complexity notes, the documentation leaderboard,
//! the dependency summary and the risk/impact/recommendation bundle.
//! The thresholds below are contractual constants, not illustrative.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::analysis::dependencies::DependencyGraph;
use crate::analysis::metrics::{
    average, format_number, module_display_name, percentage, round_to, ModuleCoverage,
    RepositoryMetrics,
};

/// A module qualifies as relevant by size at this share of total SLOC.
const HOTSPOT_SHARE: f64 = 10.0;
/// A module is very large at this share of total SLOC.
const HOTSPOT_MAJOR_SHARE: f64 = 20.0;
/// Method count suggesting potentially high complexity.
const HOTSPOT_METHODS: usize = 15;
/// Documentation coverage at or below this marks a hotspot.
const HOTSPOT_DOC_COVERAGE: f64 = 50.0;

/// Absolute size flagged in the complexity notes.
const LARGE_MODULE_SLOC: usize = 1000;
/// Method count flagged in the complexity notes.
const MANY_METHODS: usize = 30;

/// Absolute size treated as a refactoring risk.
const VERY_LARGE_MODULE_SLOC: usize = 1500;
/// Method count treated as a refactoring risk.
const HEAVY_METHODS: usize = 40;
/// Documentation averages below these are low / moderate risks.
const DOC_LOW: f64 = 35.0;
const DOC_MODERATE: f64 = 55.0;
/// Share of SLOC in the top 20% of modules treated as concentration risk.
const CONCENTRATION_SHARE: f64 = 60.0;

const DEFAULT_NOTE_LIMIT: usize = 10;
const DEFAULT_LEADERBOARD_LIMIT: usize = 5;
const DEFAULT_CORE_LIMIT: usize = 5;
const DEFAULT_RISK_LIMIT: usize = 8;
const DEFAULT_RECOMMENDATION_LIMIT: usize = 6;

/// A module flagged for priority review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub name: String,
    pub sloc: usize,
    /// Share of the repository's total SLOC, in percent.
    pub share: f64,
    pub percent: String,
    /// Why the module qualified, one sentence per signal.
    pub reasons: Vec<String>,
}

/// One entry of the documentation leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRanking {
    pub name: String,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationLeaderboard {
    pub best: Vec<DocRanking>,
    pub worst: Vec<DocRanking>,
}

/// Summary of the internal dependency structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySummary {
    /// Modules with no incoming and no outgoing dependencies.
    pub independent_modules: usize,
    /// Average out-degree across all modules.
    pub avg_dependencies: f64,
    /// Most referenced modules, rendered as narrative entries.
    pub core_modules: Vec<String>,
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskImpact {
    pub maintainability: Vec<String>,
    pub onboarding: Vec<String>,
    pub evolution: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub refactor: Vec<String>,
    pub docs: Vec<String>,
    pub architecture: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risks: Vec<String>,
    pub impact: RiskImpact,
    pub recommendations: Recommendations,
}

/// Everything the insight engine derives for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub hotspots: Vec<Hotspot>,
    pub complexity_notes: Vec<String>,
    pub documentation: DocumentationLeaderboard,
    pub dependencies: DependencySummary,
    pub risks: RiskAssessment,
}

/// Derive the full insight report from the aggregated metrics and the
/// dependency graph.
pub fn derive_insights(
    metrics: &RepositoryMetrics,
    graph: &DependencyGraph,
    repository: &Path,
) -> Result<InsightReport> {
    let hotspots = hotspot_modules(metrics.sloc, &metrics.module_stats);
    let complexity_notes =
        complexity_notes(metrics.sloc, &metrics.module_stats, DEFAULT_NOTE_LIMIT);
    let documentation = DocumentationLeaderboard {
        best: best_documented_modules(&metrics.module_stats, DEFAULT_LEADERBOARD_LIMIT),
        worst: worst_documented_modules(&metrics.module_stats, DEFAULT_LEADERBOARD_LIMIT),
    };
    let dependencies = dependency_summary(graph, repository, DEFAULT_CORE_LIMIT);

    let risks = technical_risks(metrics, &hotspots, &dependencies, DEFAULT_RISK_LIMIT)?;
    let impact = risk_impact(metrics, hotspots.len(), &dependencies)?;
    let recommendations =
        build_recommendations(metrics, &hotspots, &dependencies, DEFAULT_RECOMMENDATION_LIMIT)?;

    Ok(InsightReport {
        hotspots,
        complexity_notes,
        documentation,
        dependencies,
        risks: RiskAssessment {
            risks,
            impact,
            recommendations,
        },
    })
}

/// Identify hotspot modules by size share, method count and documentation.
///
/// Ranked by SLOC share descending, then absolute SLOC descending. With a
/// zero total no shares can be computed and the list is empty.
pub fn hotspot_modules(total_sloc: usize, module_stats: &[ModuleCoverage]) -> Vec<Hotspot> {
    if total_sloc == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Hotspot> = Vec::new();
    for stats in module_stats {
        if stats.sloc == 0 {
            continue;
        }

        let mut reasons: Vec<String> = Vec::new();

        let share = percentage(stats.sloc, total_sloc);
        if share >= HOTSPOT_MAJOR_SHARE {
            reasons.push("Very large module (>= 20% of total SLOC).".to_string());
        } else if share >= HOTSPOT_SHARE {
            reasons.push("Relevant module by size (>= 10% of total SLOC).".to_string());
        }

        if stats.n_methods >= HOTSPOT_METHODS {
            reasons.push("Many methods (potentially high complexity).".to_string());
        }

        if stats.total_items > 0 {
            let doc_percentage = percentage(stats.documented_items, stats.total_items);
            if doc_percentage <= HOTSPOT_DOC_COVERAGE {
                reasons.push("Low documentation coverage (<= 50%).".to_string());
            }
        }

        if reasons.is_empty() {
            continue;
        }

        candidates.push(Hotspot {
            name: stats.name.clone(),
            sloc: stats.sloc,
            share,
            percent: format!("{}%", format_number(share)),
            reasons,
        });
    }

    candidates.sort_by(|a, b| b.share.total_cmp(&a.share).then(b.sloc.cmp(&a.sloc)));
    candidates
}

/// Interpretive notes on complexity distribution, truncated to `limit`.
pub fn complexity_notes(
    total_sloc: usize,
    module_stats: &[ModuleCoverage],
    limit: usize,
) -> Vec<String> {
    if total_sloc == 0 || module_stats.is_empty() {
        return Vec::new();
    }

    let mut notes: Vec<String> = Vec::new();
    let num_modules = module_stats.len();
    let total_methods: usize = module_stats.iter().map(|stats| stats.n_methods).sum();

    let sloc_average = (total_sloc as f64 / num_modules as f64).round() as usize;
    let methods_average = round_to(total_methods as f64 / num_modules as f64, 1);
    notes.push(format!(
        "The project contains {} modules with an average size of {} SLOC and about {} methods per module.",
        num_modules,
        sloc_average,
        format_number(methods_average)
    ));

    let large: Vec<&ModuleCoverage> = module_stats
        .iter()
        .filter(|stats| stats.sloc >= LARGE_MODULE_SLOC)
        .collect();
    if !large.is_empty() {
        let names = joined_names(large.iter().map(|stats| stats.name.as_str()), limit);
        if large.len() == 1 {
            notes.push(format!(
                "One module exceeds {} SLOC ({}), which may indicate high structural complexity.",
                LARGE_MODULE_SLOC, names
            ));
        } else {
            notes.push(format!(
                "{} modules exceed {} SLOC ({}), concentrating a significant amount of logic.",
                large.len(),
                LARGE_MODULE_SLOC,
                names
            ));
        }
    }

    // Concentration check: do the top 20% of modules hold half the code?
    let mut sorted_by_sloc: Vec<&ModuleCoverage> = module_stats.iter().collect();
    sorted_by_sloc.sort_by(|a, b| b.sloc.cmp(&a.sloc));
    let top_count = std::cmp::max(1, (num_modules as f64 * 0.2) as usize);
    let top_modules = &sorted_by_sloc[..top_count.min(sorted_by_sloc.len())];
    let sloc_top: usize = top_modules.iter().map(|stats| stats.sloc).sum();
    let sloc_top_percent = percentage(sloc_top, total_sloc);
    if sloc_top_percent >= 50.0 {
        let names = joined_names(top_modules.iter().map(|stats| stats.name.as_str()), limit);
        notes.push(format!(
            "A small group of modules ({} modules: {}) contains about {}% of the total SLOC.",
            top_count,
            names,
            format_number(sloc_top_percent)
        ));
    }

    let heavy: Vec<&ModuleCoverage> = module_stats
        .iter()
        .filter(|stats| stats.n_methods >= MANY_METHODS)
        .collect();
    if !heavy.is_empty() {
        let names = joined_names(heavy.iter().map(|stats| stats.name.as_str()), limit);
        notes.push(format!(
            "Some modules declare a large number of methods ({} or more), which may complicate maintenance ({}).",
            MANY_METHODS, names
        ));
    }

    notes.truncate(limit);
    notes
}

/// Modules with the best documentation coverage, highest first.
/// Modules with no documentable items are excluded.
pub fn best_documented_modules(module_stats: &[ModuleCoverage], limit: usize) -> Vec<DocRanking> {
    let mut candidates = doc_rankings(module_stats);
    candidates.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    candidates.truncate(limit);
    candidates
}

/// Modules with the worst documentation coverage, lowest first.
pub fn worst_documented_modules(module_stats: &[ModuleCoverage], limit: usize) -> Vec<DocRanking> {
    let mut candidates = doc_rankings(module_stats);
    candidates.sort_by(|a, b| a.percent.total_cmp(&b.percent));
    candidates.truncate(limit);
    candidates
}

fn doc_rankings(module_stats: &[ModuleCoverage]) -> Vec<DocRanking> {
    module_stats
        .iter()
        .filter(|stats| stats.total_items > 0)
        .map(|stats| DocRanking {
            name: stats.name.clone(),
            percent: percentage(stats.documented_items, stats.total_items),
        })
        .collect()
}

/// Analyze the dependency graph and summarize its shape.
pub fn dependency_summary(
    graph: &DependencyGraph,
    repository: &Path,
    limit: usize,
) -> DependencySummary {
    if graph.is_empty() {
        return DependencySummary {
            independent_modules: 0,
            avg_dependencies: 0.0,
            core_modules: Vec::new(),
            summary: vec![
                "No dependencies were detected, or the dependency map could not be constructed."
                    .to_string(),
            ],
        };
    }

    let mut out_degree: BTreeMap<&PathBuf, usize> = BTreeMap::new();
    let mut in_degree: BTreeMap<&PathBuf, usize> = BTreeMap::new();
    for (source, targets) in graph.iter() {
        out_degree.insert(source, targets.len());
        for target in targets {
            *in_degree.entry(target).or_insert(0) += 1;
        }
    }

    // Sources and targets together; targets are normally already keys.
    let all_modules = graph.paths();
    let num_modules = all_modules.len();
    let total_edges: usize = all_modules
        .iter()
        .map(|module| out_degree.get(module).copied().unwrap_or(0))
        .sum();

    let mut summary: Vec<String> = Vec::new();
    summary.push(format!(
        "{} modules were analyzed and {} dependency relationships (internal imports) were detected.",
        num_modules, total_edges
    ));

    let avg_dependencies = round_to(total_edges as f64 / num_modules as f64, 2);
    summary.push(format!(
        "The average number of dependencies per module is {}.",
        format_number(avg_dependencies)
    ));

    let independent: Vec<&&PathBuf> = all_modules
        .iter()
        .filter(|module| {
            out_degree.get(*module).copied().unwrap_or(0) == 0
                && in_degree.get(*module).copied().unwrap_or(0) == 0
        })
        .collect();
    if !independent.is_empty() {
        summary.push(format!(
            "{} independent modules (with no incoming or outgoing dependencies) were found.",
            independent.len()
        ));
    } else {
        summary.push("No completely independent modules were found.".to_string());
    }

    // Core modules: highest in-degree, not in+out.
    let mut by_in_degree: Vec<&PathBuf> = all_modules.clone();
    by_in_degree.sort_by(|a, b| {
        in_degree
            .get(b)
            .copied()
            .unwrap_or(0)
            .cmp(&in_degree.get(a).copied().unwrap_or(0))
    });

    let mut core_modules: Vec<String> = Vec::new();
    for module in by_in_degree.into_iter().take(limit) {
        let indegree = in_degree.get(&module).copied().unwrap_or(0);
        if indegree == 0 {
            continue;
        }
        // Approximate share of files referencing this module, excluding
        // itself from the denominator.
        let reference_percentage = percentage(indegree, std::cmp::max(1, num_modules - 1));
        let name = module_display_name(module, repository);
        core_modules.push(format!(
            "{}: referenced by ~{}% of the files in the repository.",
            name,
            format_number(reference_percentage)
        ));
    }

    if !core_modules.is_empty() {
        summary.push(format!(
            "The repository contains a total of {} modules that we consider to be the most central (with the greatest connectivity).",
            core_modules.len()
        ));
    } else {
        summary.push(
            "No clear core modules were identified (very low or non-existent dependencies)."
                .to_string(),
        );
    }

    let dense = all_modules
        .iter()
        .filter(|module| out_degree.get(*module).copied().unwrap_or(0) >= 5)
        .count();
    if dense >= std::cmp::max(1, (0.2 * num_modules as f64) as usize) {
        summary.push(
            "The structure has moderate/high interconnectivity: several modules have quite a few dependencies."
                .to_string(),
        );
    } else {
        summary.push(
            "The structure appears relatively modular: most modules have few dependencies."
                .to_string(),
        );
    }

    DependencySummary {
        independent_modules: independent.len(),
        avg_dependencies,
        core_modules,
        summary,
    }
}

/// Main technical risks, truncated to `limit`.
pub fn technical_risks(
    metrics: &RepositoryMetrics,
    hotspots: &[Hotspot],
    dependencies: &DependencySummary,
    limit: usize,
) -> Result<Vec<String>> {
    if metrics.module_stats.is_empty() {
        return Ok(vec![
            "Risks could not be calculated because no module statistics are available.".to_string(),
        ]);
    }

    let mut risks: Vec<String> = Vec::new();

    let doc_average = documentation_average(metrics)?;
    if doc_average < DOC_LOW {
        risks.push(
            "Low documentation coverage: increases the risk of difficult maintenance and errors when modifying the code."
                .to_string(),
        );
    } else if doc_average < DOC_MODERATE {
        risks.push(
            "Moderate documentation coverage: some parts may be difficult to understand without context."
                .to_string(),
        );
    }

    if metrics.sloc > 0 {
        let num_modules = metrics.module_stats.len();
        let top_count = std::cmp::max(1, (num_modules as f64 * 0.2) as usize);
        let mut sorted_by_sloc: Vec<&ModuleCoverage> = metrics.module_stats.iter().collect();
        sorted_by_sloc.sort_by(|a, b| b.sloc.cmp(&a.sloc));
        let top_sloc: usize = sorted_by_sloc
            .iter()
            .take(top_count)
            .map(|stats| stats.sloc)
            .sum();
        let top_percentage = percentage(top_sloc, metrics.sloc);
        if top_percentage >= CONCENTRATION_SHARE {
            risks.push(format!(
                "High concentration of logic: {}% of SLOC is in {} modules.",
                format_number(top_percentage),
                top_count
            ));
        }
    }

    if metrics
        .module_stats
        .iter()
        .any(|stats| stats.sloc >= VERY_LARGE_MODULE_SLOC)
    {
        risks.push(
            "There are very large modules (>= 1500 SLOC) that may require refactoring.".to_string(),
        );
    }

    if metrics
        .module_stats
        .iter()
        .any(|stats| stats.n_methods >= HEAVY_METHODS)
    {
        risks.push(
            "Potentially high complexity: some modules have many methods (>= 40), which makes testing and changes difficult."
                .to_string(),
        );
    }

    if !hotspots.is_empty() {
        risks.push(
            "Hotspots (modules critical due to size/complexity/documentation) were detected."
                .to_string(),
        );
    }

    if !dependencies.core_modules.is_empty() {
        risks.push(
            "Concentrated dependencies: there are very central modules whose modification can impact many parts."
                .to_string(),
        );
    }

    risks.truncate(limit);
    Ok(risks)
}

/// Interpret the risk signals across maintainability, onboarding and
/// evolution.
pub fn risk_impact(
    metrics: &RepositoryMetrics,
    num_hotspots: usize,
    dependencies: &DependencySummary,
) -> Result<RiskImpact> {
    let doc_average = documentation_average(metrics)?;
    let num_core = dependencies.core_modules.len();
    let dependencies_average = dependencies.avg_dependencies;

    let mut maintainability: Vec<String> = Vec::new();

    if doc_average < 40.0 {
        maintainability.push(
            "The lack of documentation increases maintenance costs and the risk of errors when modifying existing code."
                .to_string(),
        );
    } else if doc_average < 60.0 {
        maintainability.push(
            "Documentation is uneven: some parts will be easy to maintain, while others will require more time to understand."
                .to_string(),
        );
    } else {
        maintainability.push(
            "Documentation coverage is reasonable and helps maintain the code with less friction."
                .to_string(),
        );
    }

    if num_hotspots >= 3 {
        maintainability.push(
            "The existence of several hotspots suggests areas with high logical load where changes may be more delicate."
                .to_string(),
        );
    } else if num_hotspots == 0 {
        maintainability.push(
            "No clear hotspots are detected, which usually indicates a more uniform distribution of logic."
                .to_string(),
        );
    } else {
        maintainability.push(
            "There are some isolated hotspots that should be monitored to prevent them from becoming bottlenecks."
                .to_string(),
        );
    }

    if metrics.sloc >= 20000 {
        maintainability.push(
            "The total size of the code (high SLOC) implies more maintenance surface area and a greater need for consistency."
                .to_string(),
        );
    } else if metrics.sloc >= 5000 {
        maintainability.push(
            "The code size is medium: maintenance is manageable, but complexity should be monitored."
                .to_string(),
        );
    } else {
        maintainability.push(
            "The code size is small: maintenance should be relatively easy if the structure is consistent."
                .to_string(),
        );
    }

    let mut onboarding: Vec<String> = Vec::new();

    if doc_average < 40.0 {
        onboarding.push(
            "Poor documentation hinders the onboarding of new developers and increases reliance on tacit knowledge."
                .to_string(),
        );
    } else if doc_average < 60.0 {
        onboarding.push(
            "Onboarding will be reasonable, but some areas will require support or knowledge transfer sessions."
                .to_string(),
        );
    } else {
        onboarding.push(
            "Documentation facilitates onboarding and reduces the time needed to understand the system."
                .to_string(),
        );
    }

    if num_core >= 3 {
        onboarding.push(
            "The presence of several core modules suggests that onboarding should start with those key components."
                .to_string(),
        );
    } else if num_core == 0 {
        onboarding.push(
            "There are no clearly central modules, which may allow for incremental learning by area."
                .to_string(),
        );
    } else {
        onboarding.push(
            "There is a small set of core modules that serve as an entry point for understanding the system."
                .to_string(),
        );
    }

    if dependencies_average >= 5.0 {
        onboarding.push(
            "The level of dependencies is relatively high, which may increase the learning curve."
                .to_string(),
        );
    } else if dependencies_average >= 2.0 {
        onboarding.push(
            "Dependencies are moderate; the learning curve depends on how the domains are separated."
                .to_string(),
        );
    } else {
        onboarding.push(
            "Dependencies are low, which favors understanding by isolated modules.".to_string(),
        );
    }

    let mut evolution: Vec<String> = Vec::new();

    if num_core >= 3 {
        evolution.push(
            "Changes to core modules can have a cascading impact, so it is advisable to reinforce tests and review changes."
                .to_string(),
        );
    } else if num_core > 0 {
        evolution.push(
            "There is a small core whose evolution must be managed carefully to avoid collateral effects."
                .to_string(),
        );
    } else {
        evolution.push(
            "The dependency structure does not show a dominant core, which may facilitate localized changes."
                .to_string(),
        );
    }

    if num_hotspots >= 3 {
        evolution.push(
            "Hotspots can become friction points for evolution; it is advisable to plan gradual refactors."
                .to_string(),
        );
    } else if num_hotspots > 0 {
        evolution.push(
            "Monitoring specific hotspots will help prevent too much logic from being concentrated in a few modules."
                .to_string(),
        );
    } else {
        evolution.push(
            "No notable hotspots are observed, suggesting potentially more stable evolution by area."
                .to_string(),
        );
    }

    if doc_average < 40.0 {
        evolution.push(
            "Improving documentation will accelerate future evolutions and reduce risk when introducing changes."
                .to_string(),
        );
    } else if doc_average < 60.0 {
        evolution.push(
            "Strengthening documentation in critical modules will reduce the cost of evolution in the medium term."
                .to_string(),
        );
    } else {
        evolution.push(
            "Current documentation helps introduce changes with greater security and predictability."
                .to_string(),
        );
    }

    Ok(RiskImpact {
        maintainability,
        onboarding,
        evolution,
    })
}

/// Actionable recommendations for refactoring, documentation and
/// architecture, each list truncated to `limit`.
pub fn build_recommendations(
    metrics: &RepositoryMetrics,
    hotspots: &[Hotspot],
    dependencies: &DependencySummary,
    limit: usize,
) -> Result<Recommendations> {
    let mut recommendations = Recommendations {
        refactor: Vec::new(),
        docs: Vec::new(),
        architecture: Vec::new(),
    };

    if metrics.module_stats.is_empty() {
        recommendations
            .architecture
            .push("There are not enough module statistics to generate recommendations.".to_string());
        return Ok(recommendations);
    }

    if !hotspots.is_empty() {
        let names = joined_names(hotspots.iter().map(|hotspot| hotspot.name.as_str()), limit);
        recommendations.refactor.push(format!(
            "Prioritize refactoring in hotspots to reduce complexity and isolate responsibilities ({}).",
            names
        ));
    }

    let mut sorted_by_sloc: Vec<&ModuleCoverage> = metrics.module_stats.iter().collect();
    sorted_by_sloc.sort_by(|a, b| b.sloc.cmp(&a.sloc));

    let big: Vec<&&ModuleCoverage> = sorted_by_sloc
        .iter()
        .filter(|stats| stats.sloc >= VERY_LARGE_MODULE_SLOC)
        .collect();
    if !big.is_empty() {
        let names = joined_names(big.iter().map(|stats| stats.name.as_str()), limit);
        recommendations.refactor.push(format!(
            "Split very large modules (>= 1500 SLOC) into smaller, testable components. ({}).",
            names
        ));
    }

    let heavy: Vec<&&ModuleCoverage> = sorted_by_sloc
        .iter()
        .filter(|stats| stats.n_methods >= HEAVY_METHODS)
        .collect();
    if !heavy.is_empty() {
        let names = joined_names(heavy.iter().map(|stats| stats.name.as_str()), limit);
        recommendations.refactor.push(format!(
            "Reduce modules with too many methods (>= 40): extract services/helpers and simplify logic ({}).",
            names
        ));
    }

    if recommendations.refactor.is_empty() {
        recommendations.refactor.push(
            "No clear signs of urgent refactoring were detected; maintain periodic review of complexity."
                .to_string(),
        );
    }

    let doc_average = documentation_average(metrics)?;
    if doc_average < DOC_LOW {
        recommendations.docs.push(
            "Increase base documentation: add docstrings/summaries to main classes and methods."
                .to_string(),
        );
        recommendations.docs.push(
            "Document critical modules (hotspots and core modules) in particular before adding new features."
                .to_string(),
        );
    } else if doc_average < 60.0 {
        recommendations.docs.push(
            "Reinforce documentation in areas with low coverage to reduce maintenance time."
                .to_string(),
        );
        recommendations.docs.push(
            "Ensure consistency of format in docstrings (Args/Returns/Raises) to facilitate automatic reading."
                .to_string(),
        );
    } else {
        recommendations.docs.push(
            "Maintain the current level of documentation and require minimum docstrings for relevant changes."
                .to_string(),
        );
    }

    if !hotspots.is_empty() {
        let names = joined_names(hotspots.iter().map(|hotspot| hotspot.name.as_str()), limit);
        recommendations.docs.push(format!(
            "Add usage examples and design notes in hotspots to facilitate future modifications. ({}).",
            names
        ));
    }

    if !dependencies.core_modules.is_empty() {
        recommendations.architecture.push(
            "Clearly define responsibilities and contracts in core modules to minimize cascading impact."
                .to_string(),
        );
    }

    if dependencies.avg_dependencies >= 5.0 {
        recommendations.architecture.push(
            "Reduce coupling between modules: review imports, introduce layers or interfaces where it makes sense."
                .to_string(),
        );
        recommendations.architecture.push(
            "Avoid circular dependencies and reinforce boundaries between domains (for example: separate IO layer, domain, and utilities)."
                .to_string(),
        );
    } else if dependencies.avg_dependencies >= 2.0 {
        recommendations.architecture.push(
            "Review dependencies between modules to maintain clear domain separation and avoid progressive coupling."
                .to_string(),
        );
    } else {
        recommendations.architecture.push(
            "The dependency structure appears to be modular; maintain import discipline so that it does not deteriorate over time."
                .to_string(),
        );
    }

    if dependencies.independent_modules >= 5 {
        recommendations.architecture.push(
            "Review independent modules: confirm whether they are intended as utilities, tests, or orphaned code."
                .to_string(),
        );
    }

    recommendations.refactor.truncate(limit);
    recommendations.docs.truncate(limit);
    recommendations.architecture.truncate(limit);

    Ok(recommendations)
}

/// Average documentation coverage across the three item categories.
fn documentation_average(metrics: &RepositoryMetrics) -> Result<f64> {
    average(&[
        metrics.class_percent,
        metrics.method_percent,
        metrics.attribute_percent,
    ])
}

fn joined_names<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> String {
    names.take(limit).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dependencies::DependencyGraph;
    use std::path::PathBuf;

    fn coverage(
        name: &str,
        sloc: usize,
        n_methods: usize,
        total_items: usize,
        documented_items: usize,
    ) -> ModuleCoverage {
        ModuleCoverage {
            name: name.to_string(),
            sloc,
            n_classes: 1,
            n_methods,
            n_functions: 0,
            total_items,
            documented_items,
        }
    }

    fn metrics_with(stats: Vec<ModuleCoverage>, percents: (f64, f64, f64)) -> RepositoryMetrics {
        let sloc = stats.iter().map(|s| s.sloc).sum();
        RepositoryMetrics {
            loc: sloc,
            sloc,
            modules_overview: Vec::new(),
            module_stats: stats,
            class_percent: percents.0,
            method_percent: percents.1,
            attribute_percent: percents.2,
        }
    }

    #[test]
    fn quiet_module_never_becomes_a_hotspot() {
        // Share below 10%, fewer than 15 methods, coverage above 50%.
        let stats = vec![
            coverage("big.py", 950, 2, 10, 10),
            coverage("quiet.py", 50, 3, 10, 9),
        ];
        let hotspots = hotspot_modules(1000, &stats);
        assert!(hotspots.iter().all(|h| h.name != "quiet.py"));
    }

    #[test]
    fn hotspots_are_ranked_by_share_then_sloc() {
        let stats = vec![
            coverage("mid.py", 300, 20, 4, 4),
            coverage("large.py", 500, 20, 4, 4),
            coverage("small.py", 200, 20, 4, 4),
        ];
        let hotspots = hotspot_modules(1000, &stats);
        let names: Vec<&str> = hotspots.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["large.py", "mid.py", "small.py"]);
    }

    #[test]
    fn hotspot_reasons_reflect_each_signal() {
        let stats = vec![coverage("core.py", 400, 16, 10, 2)];
        let hotspots = hotspot_modules(1000, &stats);
        assert_eq!(hotspots.len(), 1);
        let reasons = &hotspots[0].reasons;
        assert!(reasons.iter().any(|r| r.contains(">= 20%")));
        assert!(reasons.iter().any(|r| r.contains("Many methods")));
        assert!(reasons.iter().any(|r| r.contains("Low documentation")));
    }

    #[test]
    fn zero_total_sloc_yields_no_hotspots() {
        let stats = vec![coverage("any.py", 100, 0, 1, 0)];
        assert!(hotspot_modules(0, &stats).is_empty());
    }

    #[test]
    fn complexity_notes_flag_large_and_heavy_modules() {
        let stats = vec![
            coverage("giant.py", 1200, 31, 5, 5),
            coverage("tiny.py", 20, 1, 2, 2),
        ];
        let notes = complexity_notes(1220, &stats, 10);
        assert!(notes[0].contains("2 modules"));
        assert!(notes.iter().any(|n| n.contains("exceeds 1000 SLOC")));
        assert!(notes.iter().any(|n| n.contains("30 or more")));
        // Top 20% (1 module) holds more than half the SLOC.
        assert!(notes.iter().any(|n| n.contains("of the total SLOC")));
    }

    #[test]
    fn complexity_notes_empty_without_sloc() {
        assert!(complexity_notes(0, &[coverage("a.py", 0, 0, 0, 0)], 10).is_empty());
        assert!(complexity_notes(100, &[], 10).is_empty());
    }

    #[test]
    fn leaderboard_excludes_modules_without_documentable_items() {
        let stats = vec![
            coverage("full.py", 100, 1, 4, 4),
            coverage("empty.py", 100, 0, 0, 0),
            coverage("half.py", 100, 1, 4, 2),
        ];
        let best = best_documented_modules(&stats, 5);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].name, "full.py");
        assert_eq!(best[0].percent, 100.0);

        let worst = worst_documented_modules(&stats, 5);
        assert_eq!(worst[0].name, "half.py");
        assert_eq!(worst[0].percent, 50.0);
    }

    fn graph_of(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for (source, targets) in edges {
            let source = PathBuf::from(source);
            graph.insert_module(source.clone());
            for target in *targets {
                graph.add_edge(&source, PathBuf::from(target));
            }
        }
        graph
    }

    #[test]
    fn dependency_summary_counts_independents_and_cores() {
        let graph = graph_of(&[
            ("/repo/a.py", &["/repo/core.py"]),
            ("/repo/b.py", &["/repo/core.py"]),
            ("/repo/core.py", &[]),
            ("/repo/island.py", &[]),
        ]);
        let summary = dependency_summary(&graph, Path::new("/repo"), 5);

        assert_eq!(summary.independent_modules, 1);
        assert_eq!(summary.core_modules.len(), 1);
        assert!(summary.core_modules[0].starts_with("core.py: referenced by ~"));
        assert_eq!(summary.avg_dependencies, 0.5);
        assert!(!summary.summary.is_empty());
    }

    #[test]
    fn empty_graph_produces_default_summary() {
        let summary = dependency_summary(&DependencyGraph::default(), Path::new("/repo"), 5);
        assert_eq!(summary.independent_modules, 0);
        assert_eq!(summary.avg_dependencies, 0.0);
        assert!(summary.core_modules.is_empty());
        assert_eq!(summary.summary.len(), 1);
    }

    fn empty_dependency_summary() -> DependencySummary {
        DependencySummary {
            independent_modules: 0,
            avg_dependencies: 0.0,
            core_modules: Vec::new(),
            summary: Vec::new(),
        }
    }

    #[test]
    fn low_documentation_average_is_a_risk() {
        let metrics = metrics_with(vec![coverage("a.py", 100, 1, 4, 0)], (10.0, 20.0, 30.0));
        let risks =
            technical_risks(&metrics, &[], &empty_dependency_summary(), 8).unwrap();
        assert!(risks.iter().any(|r| r.contains("Low documentation coverage")));
    }

    #[test]
    fn very_large_modules_and_heavy_methods_are_risks() {
        let metrics = metrics_with(
            vec![coverage("huge.py", 1600, 45, 10, 10)],
            (100.0, 100.0, 100.0),
        );
        let risks =
            technical_risks(&metrics, &[], &empty_dependency_summary(), 8).unwrap();
        assert!(risks.iter().any(|r| r.contains(">= 1500 SLOC")));
        assert!(risks.iter().any(|r| r.contains(">= 40")));
        // A single module always holds 100% of the SLOC.
        assert!(risks.iter().any(|r| r.contains("High concentration of logic")));
    }

    #[test]
    fn no_stats_yields_the_explanatory_risk_entry() {
        let metrics = metrics_with(vec![], (0.0, 0.0, 0.0));
        let risks =
            technical_risks(&metrics, &[], &empty_dependency_summary(), 8).unwrap();
        assert_eq!(risks.len(), 1);
        assert!(risks[0].contains("could not be calculated"));
    }

    #[test]
    fn risk_impact_produces_all_three_dimensions() {
        let metrics = metrics_with(vec![coverage("a.py", 100, 1, 4, 4)], (80.0, 80.0, 80.0));
        let impact = risk_impact(&metrics, 0, &empty_dependency_summary()).unwrap();
        assert_eq!(impact.maintainability.len(), 3);
        assert_eq!(impact.onboarding.len(), 3);
        assert_eq!(impact.evolution.len(), 3);
        assert!(impact.maintainability[0].contains("reasonable"));
    }

    #[test]
    fn recommendations_fall_back_when_nothing_is_flagged() {
        let metrics = metrics_with(vec![coverage("a.py", 100, 1, 4, 4)], (90.0, 90.0, 90.0));
        let recommendations =
            build_recommendations(&metrics, &[], &empty_dependency_summary(), 6).unwrap();
        assert!(recommendations.refactor[0].contains("No clear signs"));
        assert!(recommendations.docs[0].contains("Maintain the current level"));
        assert!(!recommendations.architecture.is_empty());
    }

    #[test]
    fn derive_insights_assembles_the_full_report() {
        let metrics = metrics_with(
            vec![
                coverage("core.py", 800, 20, 10, 2),
                coverage("util.py", 200, 2, 4, 4),
            ],
            (50.0, 40.0, 30.0),
        );
        let graph = graph_of(&[
            ("/repo/core.py", &[]),
            ("/repo/util.py", &["/repo/core.py"]),
        ]);
        let report = derive_insights(&metrics, &graph, Path::new("/repo")).unwrap();

        assert!(!report.hotspots.is_empty());
        assert!(!report.complexity_notes.is_empty());
        assert!(!report.documentation.best.is_empty());
        assert!(!report.risks.risks.is_empty());
        assert!(!report.risks.impact.maintainability.is_empty());
        assert!(!report.risks.recommendations.docs.is_empty());
    }
}
