//! Structural representation of an analyzed source file
//! Entities are built once per run and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Information about a class-level attribute (field or property).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Name of the attribute.
    pub name: String,
    /// 1-based line where the attribute is declared.
    pub lineno: usize,
    /// Documentation text associated with the attribute, if any.
    pub doc: Option<String>,
}

/// Information about a free function or a class method.
///
/// A constructor is recorded as a `FunctionInfo` whose name equals its
/// class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// 1-based line where the function is declared.
    pub lineno: usize,
    pub doc: Option<String>,
    /// Decorator/annotation texts, source order, leading marker stripped.
    #[serde(default)]
    pub decorators: Vec<String>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, lineno: usize, doc: Option<String>) -> Self {
        Self {
            name: name.into(),
            lineno,
            doc,
            decorators: Vec::new(),
        }
    }
}

/// Structural information of a class, record, struct or interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    /// 1-based line of the class declaration.
    pub lineno: usize,
    pub doc: Option<String>,
    #[serde(default)]
    pub decorators: Vec<String>,
    /// Methods in source order (constructors first for the brace-delimited
    /// language, matching the extraction pass order).
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, lineno: usize, doc: Option<String>) -> Self {
        Self {
            name: name.into(),
            lineno,
            doc,
            decorators: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// Basic size metrics of one source module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetrics {
    /// Total number of lines, including comments and blanks.
    pub loc: usize,
    /// Meaningful lines: code excluding blank and comment-only lines.
    pub sloc: usize,
    pub n_classes: usize,
    /// Functions defined at module level.
    pub n_functions: usize,
    /// Methods across all classes of the module.
    pub n_methods: usize,
}

/// The analyzed structure of one source file.
///
/// The absolute file path is the unique key for a module across a run.
/// Files that failed to parse have no `ModuleInfo` at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub path: PathBuf,
    /// Module-level documentation, if declared at the top of the file.
    pub doc: Option<String>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    /// Raw import identifiers: dotted module paths for the
    /// indentation-delimited language, tagged namespaces for the
    /// brace-delimited one. Deduplicated and sorted.
    #[serde(default)]
    pub imports: Vec<String>,
    pub metrics: Option<ModuleMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_helpers_start_with_empty_collections() {
        let class = ClassInfo::new("Widget", 3, None);
        assert!(class.methods.is_empty());
        assert!(class.attributes.is_empty());
        assert!(class.decorators.is_empty());

        let func = FunctionInfo::new("render", 10, Some("Draws the widget.".into()));
        assert!(func.decorators.is_empty());
        assert_eq!(func.lineno, 10);
    }
}
