use super::FilePattern;
use crate::Error;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never searched for tests.
const EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", "dist", "coverage"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files under `root` matching any of `patterns`, relative to `root`, sorted.
pub fn discover_test_files(root: &Path, patterns: &[FilePattern]) -> Result<Vec<PathBuf>, Error> {
    let compiled = patterns
        .iter()
        .map(|p| {
            Pattern::new(&p.pattern).map_err(|source| Error::InvalidGlob {
                pattern: p.pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut test_files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e))
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        // Patterns always use forward slashes.
        let candidate = relative.to_string_lossy().replace('\\', "/");
        if compiled
            .iter()
            .any(|p| p.matches_with(&candidate, MATCH_OPTIONS))
        {
            test_files.push(relative.to_path_buf());
        }
    }

    test_files.sort();

    tracing::debug!(root = %root.display(), count = test_files.len(), "discovered test files");

    Ok(test_files)
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && EXCLUDE_DIRS
            .iter()
            .any(|excluded| entry.file_name() == std::ffi::OsStr::new(*excluded))
}
