//! Docstring normalization for the indentation-delimited language.
//!
//! Raw documentation text is dedented, recognized section headers are
//! rewritten to three canonical emphasized headers, and the indented block
//! under each header is reshaped into `- name: description` bullets.
//! Everything else passes through two cosmetic fixers.

use once_cell::sync::Lazy;
use regex::Regex;

const SECTIONS: &[&str] = &["Args:", "Arguments:", "Parameters:"];
const RETURNS: &[&str] = &["Returns:", "Return:"];
const RAISES: &[&str] = &["Raises:", "Raise:", "Exceptions:", "Exception:"];

static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:]+):\s*(.*)$").expect("item pattern is valid")
});

/// Remove indentation the way docstrings are conventionally cleaned:
/// leading whitespace is stripped from the first line, the longest common
/// margin is stripped from the remaining lines, and blank lines at both
/// ends are dropped.
pub fn cleandoc(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            cleaned.push(line.trim_start().to_string());
        } else {
            match line.get(margin..) {
                Some(rest) => cleaned.push(rest.to_string()),
                None => cleaned.push(line.trim_start().to_string()),
            }
        }
    }

    while cleaned.first().is_some_and(|line| line.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Normalize `-`/`*` bullets to the standard hyphenated form.
pub fn fix_bullets(txt: &str) -> String {
    txt.lines()
        .map(|line| {
            let stripped = line.trim_start();
            if stripped.starts_with("- ") || stripped.starts_with("* ") {
                format!("- {}", stripped[2..].trim())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip all emphasis marker characters from the text.
pub fn fix_asterisk(txt: &str) -> String {
    txt.replace('*', "")
}

/// Normalize a raw docstring into the canonical sectioned form.
pub fn normalize_docstring(doc: &str) -> String {
    let txt = cleandoc(doc);
    let lines: Vec<&str> = txt.lines().collect();
    let n_lines = lines.len();

    let mut out: Vec<String> = Vec::with_capacity(n_lines);
    let mut idx = 0;

    while idx < n_lines {
        let line = lines[idx];
        let stripped = line.trim();

        if let Some(header) = canonical_header(stripped) {
            out.push(header.to_string());
            idx += 1;

            let (next, items) = format_block(&lines, idx);
            out.extend(items);
            out.push(String::new());
            idx = next;
            continue;
        }

        out.push(fix_asterisk(&fix_bullets(line)));
        idx += 1;
    }

    out.join("\n")
}

/// Width in bytes of the leading space/tab run; safe for slicing since
/// only single-byte whitespace is counted.
fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn canonical_header(stripped: &str) -> Option<&'static str> {
    if SECTIONS.contains(&stripped) {
        Some("*Args:*")
    } else if RETURNS.contains(&stripped) {
        Some("*Returns:*")
    } else if RAISES.contains(&stripped) {
        Some("*Raises:*")
    } else {
        None
    }
}

/// Parse the indented (or blank) block that follows a section header.
///
/// Each `name: description` line starts an item; deeper-indented lines
/// continue its description, joined with a space. Lines without the
/// `name: description` shape become bare bullets of their trimmed text.
/// Returns the index of the first line after the block and the items.
fn format_block(lines: &[&str], start: usize) -> (usize, Vec<String>) {
    let n_lines = lines.len();
    let mut items = Vec::new();
    let mut idx = start;

    while idx < n_lines
        && (lines[idx].starts_with("    ")
            || lines[idx].starts_with('\t')
            || lines[idx].trim().is_empty())
    {
        let cursor = lines[idx];

        if cursor.trim().is_empty() {
            idx += 1;
            continue;
        }

        let indent = indent_width(cursor);

        if let Some(cap) = ITEM_RE.captures(cursor) {
            let name = cap[1].trim().to_string();
            let mut desc = cap[2].trim().to_string();

            let mut jdx = idx + 1;
            let mut extra: Vec<String> = Vec::new();
            while jdx < n_lines {
                let nxt = lines[jdx];
                if nxt.trim().is_empty() {
                    jdx += 1;
                    continue;
                }
                let nxt_indent = indent_width(nxt);
                if nxt_indent <= indent {
                    break;
                }
                extra.push(nxt.trim().to_string());
                jdx += 1;
            }

            if !extra.is_empty() {
                desc = format!("{} {}", desc, extra.join(" ")).trim().to_string();
            }

            items.push(format!("- {}: {}", name, desc.replace("- ", "")));
            idx = jdx;
        } else {
            items.push(format!("- {}", cursor.trim().replace("- ", "")));
            idx += 1;
        }
    }

    (idx, items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleandoc_strips_margin_and_blank_edges() {
        let doc = "Summary line.\n\n    Indented body.\n    More body.\n";
        assert_eq!(
            cleandoc(doc),
            "Summary line.\n\nIndented body.\nMore body."
        );
    }

    #[test]
    fn text_without_sections_is_returned_unmodified_modulo_dedent() {
        let doc = "    Computes things.\n\n    Nothing else to see here.";
        let normalized = normalize_docstring(doc);
        assert_eq!(normalized, "Computes things.\n\nNothing else to see here.");
    }

    #[test]
    fn args_section_is_rewritten_to_bullets() {
        let doc = "Does work.\n\nArgs:\n    count: how many times\n    name: who to greet";
        let normalized = normalize_docstring(doc);
        assert!(normalized.contains("*Args:*"));
        assert!(normalized.contains("- count: how many times"));
        assert!(normalized.contains("- name: who to greet"));
    }

    #[test]
    fn multiline_descriptions_are_joined_with_spaces() {
        let doc = concat!(
            "Does work.\n",
            "\n",
            "Args:\n",
            "    value: the first part\n",
            "        and the continuation\n",
            "    other: short"
        );
        let normalized = normalize_docstring(doc);
        assert!(normalized.contains("- value: the first part and the continuation"));
        assert!(normalized.contains("- other: short"));
    }

    #[test]
    fn return_and_raise_variants_map_to_canonical_headers() {
        let doc = "Return:\n    int: the result\n\nException:\n    ValueError: when invalid";
        let normalized = normalize_docstring(doc);
        assert!(normalized.contains("*Returns:*"));
        assert!(normalized.contains("*Raises:*"));
        assert!(normalized.contains("- ValueError: when invalid"));
    }

    #[test]
    fn lines_without_item_shape_become_bare_bullets() {
        let doc = "Summary.\n\nArgs:\n    just an explanation without a name";
        let normalized = normalize_docstring(doc);
        assert!(normalized.contains("- just an explanation without a name"));
    }

    #[test]
    fn bullets_and_asterisks_are_fixed_outside_sections() {
        let doc = "* star bullet\n- dash bullet\nemphasis **here**";
        let normalized = normalize_docstring(doc);
        assert!(normalized.contains("- star bullet"));
        assert!(normalized.contains("- dash bullet"));
        assert!(normalized.contains("emphasis here"));
    }

    #[test]
    fn section_output_ends_with_blank_separator() {
        let doc = "Args:\n    x: value\ntrailing prose";
        let normalized = normalize_docstring(doc);
        let lines: Vec<&str> = normalized.lines().collect();
        let pos = lines.iter().position(|l| *l == "- x: value").unwrap();
        assert_eq!(lines[pos + 1], "");
        assert_eq!(lines[pos + 2], "trailing prose");
    }
}
