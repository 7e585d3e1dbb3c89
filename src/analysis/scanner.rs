//! Recursive repository scan.
//!
//! Walks the tree from the root without following symbolic links, pruning
//! excluded directory names before descending into them, and collects the
//! files whose extension is in the allow-set. Results are sorted so the
//! downstream stages see a deterministic order.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Enumerate analyzable files under `root`.
///
/// `included` holds file extensions without the leading dot; `excluded`
/// holds directory names that are never entered.
pub fn scan_repository(
    root: &Path,
    included: &HashSet<String>,
    excluded: &HashSet<String>,
) -> Result<Vec<PathBuf>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("repository root does not exist: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("repository root is not a directory: {}", root.display());
    }

    let mut files = Vec::new();
    scan_directory(&root, included, excluded, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory(
    dir: &Path,
    included: &HashSet<String>,
    excluded: &HashSet<String>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;

        // Symbolic links are never followed, whether file or directory.
        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            let name = entry.file_name();
            // Prune before descending so excluded subtrees are never walked.
            if excluded.contains(&name.to_string_lossy().to_string()) {
                continue;
            }
            scan_directory(&path, included, excluded, files)?;
        } else if file_type.is_file() {
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| included.contains(ext));
            if matches {
                files.push(path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn collects_only_allowed_extensions() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.py"), "x = 1\n");
        touch(&dir.path().join("b.cs"), "// nothing\n");
        touch(&dir.path().join("notes.txt"), "hello\n");

        let files = scan_repository(dir.path(), &set(&["py"]), &set(&[])).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.py"));
    }

    #[test]
    fn prunes_excluded_directories_before_descending() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("src/main.py"), "x = 1\n");
        touch(&dir.path().join("__pycache__/cached.py"), "x = 1\n");
        touch(&dir.path().join("__pycache__/deep/also.py"), "x = 1\n");

        let files =
            scan_repository(dir.path(), &set(&["py"]), &set(&["__pycache__"])).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/main.py"));
    }

    #[test]
    fn results_are_sorted_for_determinism() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("zeta.py"), "");
        touch(&dir.path().join("alpha.py"), "");
        touch(&dir.path().join("mid/beta.py"), "");

        let files = scan_repository(dir.path(), &set(&["py"]), &set(&[])).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("missing");
        assert!(scan_repository(&gone, &set(&["py"]), &set(&[])).is_err());
    }
}
