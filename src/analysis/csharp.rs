//! Structural analysis of the brace-delimited language.
//!
//! Pattern matching over the raw text, no real syntax tree: type headers
//! are found with a regex, each type body is delimited by counting braces,
//! and members are found with member-specific patterns applied to the
//! body text. The approach is deliberately approximate - brace characters
//! inside string or character literals shift the counted depth, which can
//! truncate a block early. That boundary is documented and tested rather
//! than papered over.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::analysis::error::ParseError;
use crate::analysis::metrics::module_metrics;
use crate::analysis::xmldoc::{upward_attributes, upward_doc};
use crate::config::Language;
use crate::model::{AttributeInfo, ClassInfo, FunctionInfo, ModuleInfo};

/// Marker distinguishing namespace imports from same-named file-local
/// symbols when the dependency resolver builds its lookup.
pub const NAMESPACE_TAG: &str = "ns:";

/// Class, record, struct and interface headers.
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:public|internal|protected|private)?\s*(?:abstract|sealed|static|partial)?\s*(class|record|struct|interface)\s+([A-Za-z_][A-Za-z0-9_]*)\b",
    )
    .expect("class pattern is valid")
});

/// Ordinary methods within a type body.
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:public|private|protected|internal)\s*(?:static\s+|virtual\s+|override\s+|async\s+|sealed\s+|partial\s+)*[\w<>\[\],\s]+\s+([A-Za-z_][A-Za-z0-9_]*)\s*\([^)]*\)\s*\{?",
    )
    .expect("method pattern is valid")
});

/// Fields and properties within a type body.
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:public|private|protected|internal)\s*(?:static\s+|readonly\s+|const\s+)?[\w<>\[\],\s]+\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\{[^}]*\}|=>|=|;)",
    )
    .expect("attribute pattern is valid")
});

static USING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*using\s+([A-Za-z0-9_.]+)\s*;").expect("using pattern is valid"));

/// Analyze one file and extract its structural information.
pub fn analyze_csharp(path: &Path) -> Result<ModuleInfo> {
    let bytes = fs::read(path)
        .map_err(|_| ParseError::Unreadable(path.display().to_string()))
        .with_context(|| format!("reading {}", path.display()))?;
    let src = String::from_utf8_lossy(&bytes).into_owned();
    parse_csharp_source(&src, path)
}

/// Parse already-loaded source text. Exposed separately so callers and
/// tests can analyze in-memory content.
pub fn parse_csharp_source(src: &str, path: &Path) -> Result<ModuleInfo> {
    let lines: Vec<&str> = src.lines().collect();
    let mut classes: Vec<ClassInfo> = Vec::new();

    for cap in CLASS_RE.captures_iter(src) {
        let (Some(whole), Some(kind), Some(name)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let cls_name = name.as_str().to_string();
        let cls_lineno = line_at(src, whole.start());

        let mut cls_info = ClassInfo {
            name: cls_name.clone(),
            lineno: cls_lineno,
            doc: upward_doc(&lines, cls_lineno - 1),
            decorators: upward_attributes(&lines, cls_lineno - 1),
            methods: Vec::new(),
            attributes: Vec::new(),
        };

        // The type body starts at the first opening brace after the header.
        let Some(brace_offset) = src[whole.end()..].find('{') else {
            tracing::warn!(
                file = %path.display(),
                line = cls_lineno,
                "could not find '{{' for {} {}",
                kind.as_str(),
                cls_name
            );
            classes.push(cls_info);
            continue;
        };
        let idx_brace = whole.end() + brace_offset;

        // Count braces to find where the body closes.
        let mut depth: usize = 0;
        let mut idx_end = src.len();
        for (offset, &byte) in src.as_bytes()[idx_brace..].iter().enumerate() {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        idx_end = idx_brace + offset;
                        break;
                    }
                }
                _ => {}
            }
        }
        let class_block = &src[idx_brace..idx_end];

        let ctor_re = constructor_pattern(&cls_name)?;
        for ctor in ctor_re.find_iter(class_block) {
            let ctor_lineno = line_at(src, idx_brace + ctor.start());
            cls_info.methods.push(FunctionInfo::new(
                cls_name.clone(),
                ctor_lineno,
                upward_doc(&lines, ctor_lineno - 1),
            ));
        }

        for method in METHOD_RE.captures_iter(class_block) {
            let (Some(m_whole), Some(m_name)) = (method.get(0), method.get(1)) else {
                continue;
            };
            let method_lineno = line_at(src, idx_brace + m_whole.start());
            cls_info.methods.push(FunctionInfo {
                name: m_name.as_str().to_string(),
                lineno: method_lineno,
                doc: upward_doc(&lines, method_lineno - 1),
                decorators: upward_attributes(&lines, method_lineno - 1),
            });
        }

        for attr in ATTRIBUTE_RE.captures_iter(class_block) {
            let (Some(a_whole), Some(a_name)) = (attr.get(0), attr.get(1)) else {
                continue;
            };
            let attr_lineno = line_at(src, idx_brace + a_whole.start());
            cls_info.attributes.push(AttributeInfo {
                name: a_name.as_str().to_string(),
                lineno: attr_lineno,
                doc: upward_doc(&lines, attr_lineno - 1),
            });
        }

        classes.push(cls_info);
    }

    let imports = collect_usings(src);
    let metrics = module_metrics(src, Language::CSharp, &classes, &[]);

    Ok(ModuleInfo {
        path: path.to_path_buf(),
        // No module-level documentation block exists in this language.
        doc: None,
        // Top-level free functions are not part of the profile here.
        functions: Vec::new(),
        classes,
        imports,
        metrics: Some(metrics),
    })
}

/// Constructors are methods whose name equals the class name.
fn constructor_pattern(class_name: &str) -> Result<Regex> {
    let pattern = format!(
        r"(?m)^\s*(?:public|private|protected|internal)\s*(?:static\s+)?{}\s*\([^)]*\)\s*\{{?",
        regex::escape(class_name)
    );
    Regex::new(&pattern)
        .with_context(|| format!("building constructor pattern for {}", class_name))
}

/// Namespace imports, deduplicated, sorted and tagged for the resolver.
fn collect_usings(src: &str) -> Vec<String> {
    let namespaces: BTreeSet<&str> = USING_RE
        .captures_iter(src)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();
    namespaces
        .into_iter()
        .map(|ns| format!("{}{}", NAMESPACE_TAG, ns))
        .collect()
}

/// 1-based line number of a byte position.
fn line_at(src: &str, pos: usize) -> usize {
    src.as_bytes()[..pos].iter().filter(|&&b| b == b'\n').count() + 1
}
