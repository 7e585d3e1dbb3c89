//! Diagnostic reporting for the analysis pipeline.
//!
//! Per-file failures never abort a run: they are reported here and the file
//! is skipped. The log line carries the originating file and the innermost
//! cause in the error chain, which is the point where the analysis logic
//! actually failed.

use std::path::Path;

/// Safely truncate a UTF-8 string to a maximum number of characters.
pub fn truncate_utf8_safe(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Collapse a source fragment into a single short line for log output.
pub fn summarize_fragment(fragment: &str, max_chars: usize) -> String {
    let flat = fragment
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    truncate_utf8_safe(&flat, max_chars)
}

/// Report an isolated per-file parse failure.
pub fn report_parse_failure(path: &Path, error: &anyhow::Error) {
    tracing::error!(
        file = %path.display(),
        cause = %error.root_cause(),
        "failed to parse file, skipping"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings_intact() {
        assert_eq!(truncate_utf8_safe("hello", 10), "hello");
    }

    #[test]
    fn truncate_appends_ellipsis_on_long_strings() {
        let out = truncate_utf8_safe("abcdefghij", 5);
        assert_eq!(out.chars().count(), 5);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let out = truncate_utf8_safe("ααααααα", 4);
        assert_eq!(out.chars().count(), 4);
    }

    #[test]
    fn summarize_flattens_newlines_and_runs_of_spaces() {
        let out = summarize_fragment("x =\n    1", 120);
        assert_eq!(out, "x = 1");
    }
}
