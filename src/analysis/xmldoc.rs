//! XML documentation-comment extraction for the brace-delimited language.
//!
//! Documentation is collected by scanning upward from a declaration line over
//! contiguous `///` and `[...]` attribute lines. When recognized tags are
//! present the text is wrapped in a synthetic root element and parsed as a
//! markup tree; anything malformed falls back to the raw collected text.

use roxmltree::{Document, Node};

const KNOWN_TAGS: &[&str] = &["<summary", "<param", "<returns", "<exception"];

/// Collect and interpret the XML documentation preceding `decl_idx`
/// (0-based line index of the declaration).
///
/// Returns `None` when no `///` lines precede the declaration.
pub fn upward_doc(lines: &[&str], decl_idx: usize) -> Option<String> {
    let mut buf: Vec<String> = Vec::new();
    let mut idx = decl_idx.min(lines.len());

    while idx > 0 {
        idx -= 1;
        let txt = lines[idx].trim();

        if txt.starts_with("///") {
            buf.push(txt.trim_start_matches('/').trim().to_string());
            continue;
        }
        if txt.is_empty() {
            continue;
        }
        // Attribute lines may be interleaved with the documentation block.
        if txt.starts_with('[') && txt.ends_with(']') {
            continue;
        }
        break;
    }

    if buf.is_empty() {
        return None;
    }

    buf.reverse();
    let raw = buf.join("\n");
    Some(restructure(&raw))
}

/// Collect the attribute annotations (`[...]` lines) preceding `decl_idx`.
pub fn upward_attributes(lines: &[&str], decl_idx: usize) -> Vec<String> {
    let mut attrs: Vec<String> = Vec::new();
    let mut idx = decl_idx.min(lines.len());

    while idx > 0 {
        idx -= 1;
        let txt = lines[idx].trim();

        if txt.starts_with('[') && txt.ends_with(']') {
            attrs.push(txt.to_string());
            continue;
        }
        if txt.starts_with("///") {
            continue;
        }
        break;
    }

    attrs.reverse();
    attrs
}

/// Convert collected documentation into the canonical sectioned text.
///
/// Text without recognized tags, and text that fails to parse as markup,
/// is returned unchanged.
fn restructure(raw: &str) -> String {
    if !KNOWN_TAGS.iter().any(|tag| raw.contains(tag)) {
        return raw.to_string();
    }

    let xml_source = format!("<root>\n{}\n</root>", raw);
    let doc = match Document::parse(&xml_source) {
        Ok(doc) => doc,
        Err(_) => return raw.to_string(),
    };
    let root = doc.root_element();

    let mut parts: Vec<String> = Vec::new();

    if let Some(summary) = find_child(root, "summary") {
        let text = node_text(summary);
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
            parts.push(String::new());
        }
    }

    let params: Vec<Node> = children(root, "param");
    if !params.is_empty() {
        parts.push("*Params:*".to_string());
        for param in params {
            let name = param.attribute("name").unwrap_or("").trim();
            let text = node_text(param);
            let text = text.trim();
            if name.is_empty() {
                parts.push(format!("- {}", text));
            } else {
                parts.push(format!("- {}: {}", name, text));
            }
        }
        parts.push(String::new());
    }

    if let Some(returns) = find_child(root, "returns") {
        let text = node_text(returns);
        let text = text.trim();
        if !text.is_empty() {
            parts.push("*Returns:*".to_string());
            parts.push(format!("- {}", text.replace("- ", "")));
            parts.push(String::new());
        }
    }

    let exceptions: Vec<Node> = children(root, "exception");
    if !exceptions.is_empty() {
        parts.push("*Exceptions:*".to_string());
        for exception in exceptions {
            let cref = strip_cref_qualifier(exception.attribute("cref").unwrap_or("").trim());
            let text = node_text(exception);
            let text = text.trim();
            if cref.is_empty() {
                parts.push(format!("- {}", text));
            } else {
                parts.push(format!("- {}: {}", cref, text));
            }
        }
        parts.push(String::new());
    }

    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }

    parts.join("\n")
}

fn find_child<'a>(parent: Node<'a, 'a>, tag: &str) -> Option<Node<'a, 'a>> {
    parent
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == tag)
}

fn children<'a>(parent: Node<'a, 'a>, tag: &str) -> Vec<Node<'a, 'a>> {
    parent
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == tag)
        .collect()
}

/// Identifiers usually arrive as `T:Namespace.Type`; keep only the part
/// after the qualifier.
fn strip_cref_qualifier(cref: &str) -> &str {
    match cref.split_once(':') {
        Some((_, rest)) => rest,
        None => cref,
    }
}

/// Flatten a markup node to plain text.
///
/// `<see cref="X"/>` flattens to `X` (qualifier stripped), `<paramref
/// name="x"/>` flattens to `x`, nested nodes keep their natural text order.
fn node_text(node: Node) -> String {
    let mut parts: Vec<String> = Vec::new();

    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
        } else if child.is_element() {
            match child.tag_name().name() {
                "see" => {
                    let cref = strip_cref_qualifier(child.attribute("cref").unwrap_or("").trim());
                    if !cref.is_empty() {
                        parts.push(cref.to_string());
                    }
                }
                "paramref" => {
                    let name = child.attribute("name").unwrap_or("").trim();
                    if !name.is_empty() {
                        parts.push(name.to_string());
                    }
                }
                _ => {
                    let text = node_text(child);
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_for(source: &str, decl_line: &str) -> Option<String> {
        let lines: Vec<&str> = source.lines().collect();
        let idx = lines
            .iter()
            .position(|line| line.contains(decl_line))
            .expect("declaration line present");
        upward_doc(&lines, idx)
    }

    #[test]
    fn full_tag_set_is_restructured() {
        let source = concat!(
            "/// <summary>Adds two numbers.</summary>\n",
            "/// <param name=\"a\">first operand</param>\n",
            "/// <param name=\"b\">second operand</param>\n",
            "/// <returns>their sum</returns>\n",
            "/// <exception cref=\"T:System.OverflowException\">on overflow</exception>\n",
            "public int Add(int a, int b) { return a + b; }\n",
        );
        let doc = doc_for(source, "public int Add").unwrap();
        assert!(doc.contains("Adds two numbers."));
        assert!(doc.contains("*Params:*"));
        assert!(doc.contains("- a: first operand"));
        assert!(doc.contains("*Returns:*"));
        assert!(doc.contains("- their sum"));
        assert!(doc.contains("*Exceptions:*"));
        assert!(doc.contains("- System.OverflowException: on overflow"));
        assert!(!doc.ends_with('\n'));
    }

    #[test]
    fn see_and_paramref_flatten_to_identifiers() {
        let source = concat!(
            "/// <summary>Copies from <see cref=\"T:My.Source\"/> using <paramref name=\"buffer\"/>.</summary>\n",
            "public void Copy(byte[] buffer) { }\n",
        );
        let doc = doc_for(source, "public void Copy").unwrap();
        assert!(doc.contains("My.Source"));
        assert!(doc.contains("buffer"));
        assert!(!doc.contains("cref"));
    }

    #[test]
    fn malformed_markup_falls_back_to_raw_text() {
        let source = concat!(
            "/// <summary>unbalanced\n",
            "public void Broken() { }\n",
        );
        let doc = doc_for(source, "public void Broken").unwrap();
        assert_eq!(doc, "<summary>unbalanced");
    }

    #[test]
    fn text_without_recognized_tags_is_returned_as_is() {
        let source = concat!(
            "/// plain prose comment\n",
            "/// on two lines\n",
            "public void Plain() { }\n",
        );
        let doc = doc_for(source, "public void Plain").unwrap();
        assert_eq!(doc, "plain prose comment\non two lines");
    }

    #[test]
    fn collection_skips_interleaved_attributes_and_stops_at_code() {
        let source = concat!(
            "int unrelated = 1;\n",
            "/// <summary>Documented.</summary>\n",
            "[Obsolete]\n",
            "public void Target() { }\n",
        );
        let lines: Vec<&str> = source.lines().collect();
        let doc = upward_doc(&lines, 3).unwrap();
        assert!(doc.contains("Documented."));

        let attrs = upward_attributes(&lines, 3);
        assert_eq!(attrs, vec!["[Obsolete]".to_string()]);
    }

    #[test]
    fn no_documentation_yields_none() {
        let lines = vec!["int x = 1;", "public void Bare() { }"];
        assert!(upward_doc(&lines, 1).is_none());
    }
}
