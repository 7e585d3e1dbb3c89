//! Structural analysis of the indentation-delimited language.
//!
//! One file's full text is parsed into a syntax tree (never executed) and
//! reduced to its module representation: module docstring, top-level
//! functions, classes with their direct-body methods and attributes, and
//! the declared imports. Top-level statements outside that set are reported
//! as diagnostics and otherwise ignored.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::analysis::docstring::{cleandoc, normalize_docstring};
use crate::analysis::error::ParseError;
use crate::analysis::metrics::module_metrics;
use crate::config::Language;
use crate::diagnostics::summarize_fragment;
use crate::model::{AttributeInfo, ClassInfo, FunctionInfo, ModuleInfo};

/// Analyze one file and extract its structural information.
pub fn analyze_python(path: &Path) -> Result<ModuleInfo> {
    let bytes = fs::read(path)
        .map_err(|_| ParseError::Unreadable(path.display().to_string()))
        .with_context(|| format!("reading {}", path.display()))?;
    // Decoding errors are ignored, mirroring a lossy read.
    let src = String::from_utf8_lossy(&bytes).into_owned();
    parse_python_source(&src, path)
}

/// Parse already-loaded source text. Exposed separately so callers and
/// tests can analyze in-memory content.
pub fn parse_python_source(src: &str, path: &Path) -> Result<ModuleInfo> {
    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::LanguageSetup(e.to_string()))?;

    let tree = parser.parse(src, None).ok_or(ParseError::ParserFailed)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ParseError::SyntaxError.into());
    }

    let (doc, docstring_id) = module_docstring(root, src);

    let mut functions: Vec<FunctionInfo> = Vec::new();
    let mut classes: Vec<ClassInfo> = Vec::new();

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "comment" => {}
            "function_definition" => functions.push(function_info(node, src, Vec::new())),
            "class_definition" => classes.push(class_info(node, src, Vec::new())),
            "decorated_definition" => {
                let decorators = collect_decorators(node, src);
                match node.child_by_field_name("definition") {
                    Some(def) if def.kind() == "function_definition" => {
                        functions.push(function_info(def, src, decorators));
                    }
                    Some(def) if def.kind() == "class_definition" => {
                        classes.push(class_info(def, src, decorators));
                    }
                    _ => report_unexpected(path, node, src),
                }
            }
            _ if Some(node.id()) == docstring_id => {}
            _ => report_unexpected(path, node, src),
        }
    }

    let imports = collect_imports(root, src);
    let metrics = module_metrics(src, Language::Python, &classes, &functions);

    Ok(ModuleInfo {
        path: path.to_path_buf(),
        doc,
        functions,
        classes,
        imports,
        metrics: Some(metrics),
    })
}

fn function_info(node: Node, src: &str, decorators: Vec<String>) -> FunctionInfo {
    FunctionInfo {
        name: field_text(node, "name", src),
        lineno: node.start_position().row + 1,
        doc: body_docstring(node, src).map(|raw| normalize_docstring(&raw)),
        decorators,
    }
}

fn class_info(node: Node, src: &str, decorators: Vec<String>) -> ClassInfo {
    let mut cls = ClassInfo {
        name: field_text(node, "name", src),
        lineno: node.start_position().row + 1,
        doc: body_docstring(node, src).map(|raw| normalize_docstring(&raw)),
        decorators,
        methods: Vec::new(),
        attributes: Vec::new(),
    };

    let Some(body) = node.child_by_field_name("body") else {
        return cls;
    };

    let mut cursor = body.walk();
    for sub in body.named_children(&mut cursor) {
        match sub.kind() {
            "function_definition" => cls.methods.push(function_info(sub, src, Vec::new())),
            "decorated_definition" => {
                let decorators = collect_decorators(sub, src);
                if let Some(def) = sub.child_by_field_name("definition") {
                    if def.kind() == "function_definition" {
                        cls.methods.push(function_info(def, src, decorators));
                    }
                }
            }
            "expression_statement" => {
                if let Some(expr) = sub.named_child(0) {
                    if expr.kind() == "assignment" {
                        collect_assignment_targets(expr, src, &mut cls.attributes);
                    }
                }
            }
            // Anything else in the class body is not part of the profile.
            _ => {}
        }
    }

    cls
}

/// Record single-name targets of simple and annotated assignments.
/// Tuple and attribute targets are ignored; chained targets are all
/// recorded.
fn collect_assignment_targets(assign: Node, src: &str, attributes: &mut Vec<AttributeInfo>) {
    if let Some(left) = assign.child_by_field_name("left") {
        if left.kind() == "identifier" {
            attributes.push(AttributeInfo {
                name: node_text(left, src),
                lineno: assign.start_position().row + 1,
                doc: None,
            });
        }
    }
    if let Some(right) = assign.child_by_field_name("right") {
        if right.kind() == "assignment" {
            collect_assignment_targets(right, src, attributes);
        }
    }
}

/// Decorator expressions as exact source text, leading marker stripped.
fn collect_decorators(decorated: Node, src: &str) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut cursor = decorated.walk();
    for child in decorated.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = node_text(child, src);
            decorators.push(text.trim_start_matches('@').trim().to_string());
        }
    }
    decorators
}

/// The module docstring and the id of the statement holding it, so the
/// top-level pass can recognize that statement as expected.
fn module_docstring(root: Node, src: &str) -> (Option<String>, Option<usize>) {
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|node| node.kind() != "comment");
    let Some(stmt) = first else {
        return (None, None);
    };
    match statement_string(stmt, src) {
        Some(raw) => (Some(cleandoc(&raw)), Some(stmt.id())),
        None => (None, None),
    }
}

/// Docstring of a function or class: the string literal that is the first
/// statement of its body.
fn body_docstring(definition: Node, src: &str) -> Option<String> {
    let body = definition.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|node| node.kind() != "comment")?;
    statement_string(first, src)
}

fn statement_string(stmt: Node, src: &str) -> Option<String> {
    if stmt.kind() != "expression_statement" {
        return None;
    }
    let expr = stmt.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    string_inner(expr, src)
}

/// Raw content of a string literal, between its quote tokens.
fn string_inner(string: Node, src: &str) -> Option<String> {
    let mut start = None;
    let mut end = None;
    let mut cursor = string.walk();
    for child in string.children(&mut cursor) {
        match child.kind() {
            "string_start" => start = Some(child.end_byte()),
            "string_end" => end = Some(child.start_byte()),
            _ => {}
        }
    }
    Some(src[start?..end?].to_string())
}

/// All imports declared anywhere in the module, as a deduplicated sorted
/// list of dotted identifiers.
fn collect_imports(root: Node, src: &str) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    walk_imports(root, src, &mut found);
    found.into_iter().collect()
}

fn walk_imports(node: Node, src: &str, found: &mut BTreeSet<String>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if let Some(name) = imported_name(child, src) {
                    found.insert(name);
                }
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|m| import_module_name(m, src))
                .unwrap_or_default();
            let module_id = node.child_by_field_name("module_name").map(|m| m.id());

            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if Some(child.id()) == module_id {
                    continue;
                }
                let name = match child.kind() {
                    "wildcard_import" => Some("*".to_string()),
                    _ => imported_name(child, src),
                };
                if let Some(name) = name {
                    if module.is_empty() {
                        found.insert(name);
                    } else {
                        found.insert(format!("{}.{}", module, name));
                    }
                }
            }
        }
        "future_import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if let Some(name) = imported_name(child, src) {
                    found.insert(format!("__future__.{}", name));
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_imports(child, src, found);
    }
}

fn imported_name(node: Node, src: &str) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(node_text(node, src)),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|name| node_text(name, src)),
        _ => None,
    }
}

/// Module part of a `from x import y` statement; relative dots are dropped.
fn import_module_name(module: Node, src: &str) -> String {
    match module.kind() {
        "dotted_name" => node_text(module, src),
        "relative_import" => {
            let mut cursor = module.walk();
            let name = module
                .named_children(&mut cursor)
                .find(|child| child.kind() == "dotted_name")
                .map(|name| node_text(name, src))
                .unwrap_or_default();
            name
        }
        _ => String::new(),
    }
}

fn field_text(node: Node, field: &str, src: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| node_text(child, src))
        .unwrap_or_default()
}

fn node_text(node: Node, src: &str) -> String {
    src[node.byte_range()].to_string()
}

fn report_unexpected(path: &Path, node: Node, src: &str) {
    let summary = summarize_fragment(&src[node.byte_range()], 120);
    tracing::warn!(
        file = %path.display(),
        line = node.start_position().row + 1,
        kind = node.kind(),
        "unexpected top-level construct: {}",
        summary
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(src: &str) -> ModuleInfo {
        parse_python_source(src, &PathBuf::from("/repo/sample.py")).unwrap()
    }

    #[test]
    fn extracts_module_docstring_and_functions() {
        let src = concat!(
            "\"\"\"Top level module doc.\"\"\"\n",
            "\n",
            "def greet(name):\n",
            "    \"\"\"Says hello.\"\"\"\n",
            "    return name\n",
        );
        let module = parse(src);
        assert_eq!(module.doc.as_deref(), Some("Top level module doc."));
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].name, "greet");
        assert_eq!(module.functions[0].lineno, 3);
        assert_eq!(module.functions[0].doc.as_deref(), Some("Says hello."));
    }

    #[test]
    fn collects_decorators_as_exact_source_text() {
        let src = concat!(
            "@app.route('/home', methods=['GET'])\n",
            "@cached\n",
            "def home():\n",
            "    pass\n",
        );
        let module = parse(src);
        assert_eq!(
            module.functions[0].decorators,
            vec!["app.route('/home', methods=['GET'])", "cached"]
        );
    }

    #[test]
    fn class_body_yields_methods_and_single_name_attributes() {
        let src = concat!(
            "class Config:\n",
            "    \"\"\"Holds settings.\"\"\"\n",
            "    retries = 3\n",
            "    timeout: int = 30\n",
            "    a, b = 1, 2\n",
            "\n",
            "    def reload(self):\n",
            "        \"\"\"Reloads.\"\"\"\n",
            "        pass\n",
            "\n",
            "    @property\n",
            "    def ready(self):\n",
            "        return True\n",
        );
        let module = parse(src);
        assert_eq!(module.classes.len(), 1);
        let cls = &module.classes[0];
        assert_eq!(cls.doc.as_deref(), Some("Holds settings."));

        let attr_names: Vec<&str> = cls.attributes.iter().map(|a| a.name.as_str()).collect();
        // Tuple targets are not recorded.
        assert_eq!(attr_names, vec!["retries", "timeout"]);

        let method_names: Vec<&str> = cls.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(method_names, vec!["reload", "ready"]);
        assert_eq!(cls.methods[1].decorators, vec!["property"]);
    }

    #[test]
    fn imports_are_deduplicated_and_sorted() {
        let src = concat!(
            "import os\n",
            "import os\n",
            "from pathlib import Path\n",
            "from collections import OrderedDict, defaultdict\n",
            "\n",
            "def late():\n",
            "    import json\n",
            "    return json\n",
        );
        let module = parse(src);
        assert_eq!(
            module.imports,
            vec![
                "collections.OrderedDict",
                "collections.defaultdict",
                "json",
                "os",
                "pathlib.Path",
            ]
        );
    }

    #[test]
    fn relative_imports_drop_their_dots() {
        let src = "from .helpers import trace\nfrom . import sibling\n";
        let module = parse(src);
        assert_eq!(module.imports, vec!["helpers.trace", "sibling"]);
    }

    #[test]
    fn docstrings_are_normalized_with_sections() {
        let src = concat!(
            "def compute(x):\n",
            "    \"\"\"Computes a value.\n",
            "\n",
            "    Args:\n",
            "        x: the input\n",
            "    \"\"\"\n",
            "    return x\n",
        );
        let module = parse(src);
        let doc = module.functions[0].doc.as_deref().unwrap();
        assert!(doc.contains("*Args:*"));
        assert!(doc.contains("- x: the input"));
    }

    #[test]
    fn syntax_errors_fail_the_file() {
        let src = "def broken(:\n    pass\n";
        let result = parse_python_source(src, &PathBuf::from("/repo/broken.py"));
        assert!(result.is_err());
    }

    #[test]
    fn metrics_accompany_the_module() {
        let src = "# comment\n\nx = 1\n\ndef f():\n    return 2\n";
        let module = parse(src);
        let metrics = module.metrics.unwrap();
        assert_eq!(metrics.n_functions, 1);
        assert!(metrics.sloc <= metrics.loc);
        assert_eq!(metrics.sloc, 3);
    }

    #[test]
    fn constructor_is_recorded_like_any_method() {
        let src = concat!(
            "class Point:\n",
            "    def __init__(self, x):\n",
            "        self.x = x\n",
        );
        let module = parse(src);
        assert_eq!(module.classes[0].methods[0].name, "__init__");
    }
}
