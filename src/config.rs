//! Run configuration: language registry, extension allow-sets and the
//! directory exclude-set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::analysis::{csharp, python};
use crate::model::ModuleInfo;

/// Directory names that are never descended into during a scan.
const DEFAULT_EXCLUDED: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".ruff_cache",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".eggs",
    "__pycache__",
    "build",
    "dist",
    "site-packages",
    "node_modules",
    "venv",
    ".venv",
    "env",
    ".env",
    "bin",
    "obj",
    "Debug",
    "Release",
    ".vs",
];

/// Languages the analyzer supports, each bound to a parser implementation.
///
/// This is an explicit registry rather than name-keyed dispatch: adding a
/// language without wiring its parser fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Indentation-delimited; parsed via a real syntax tree.
    Python,
    /// Brace-delimited; parsed via pattern matching.
    CSharp,
}

impl Language {
    /// File extensions (without the dot) analyzed for this language.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py"],
            Self::CSharp => &["cs"],
        }
    }

    /// Parse one file into its module representation.
    pub fn parse_file(self, path: &Path) -> anyhow::Result<ModuleInfo> {
        match self {
            Self::Python => python::analyze_python(path),
            Self::CSharp => csharp::analyze_csharp(path),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "csharp" | "c#" => Ok(Self::CSharp),
            other => anyhow::bail!("unsupported language: {}. Supported: python, csharp", other),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::CSharp => write!(f, "csharp"),
        }
    }
}

/// Everything a run needs: where to look, what to parse, what to skip.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Repository root to scan.
    pub repository: PathBuf,
    pub language: Language,
    /// Allowed file extensions, without the leading dot.
    pub included: HashSet<String>,
    /// Directory names pruned before descending.
    pub excluded: HashSet<String>,
}

impl AnalysisConfig {
    pub fn new(repository: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            repository: repository.into(),
            language,
            included: language
                .extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            excluded: default_excluded_dirs(),
        }
    }

    /// Add user-supplied directory names to the exclude-set.
    pub fn with_excluded<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into();
            if !name.is_empty() {
                self.excluded.insert(name);
            }
        }
        self
    }
}

/// The built-in directory exclude-set.
pub fn default_excluded_dirs() -> HashSet<String> {
    DEFAULT_EXCLUDED.iter().map(|dir| dir.to_string()).collect()
}
