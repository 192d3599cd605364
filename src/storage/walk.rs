//! Directory enumeration
//!
//! Finds every directory under the input root that holds a document.
//! Entries are visited in name order so repeated runs see the same order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

/// Returns `root` and all directories below it that contain `file_name`
///
/// Hidden directories, symlinked directories and names in `ignore` are
/// skipped along with everything below them. `.gitignore` files are not
/// consulted.
pub fn document_dirs(root: &Path, file_name: &str, ignore: &[String]) -> Result<Vec<PathBuf>> {
    let skipped = ignore.to_vec();

    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .hidden(true)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let name = entry.file_name().to_string_lossy();
            !skipped.iter().any(|s| *s == name)
        })
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk directory: {}", root.display()))?;
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let dir = entry.into_path();
        if dir.join(file_name).is_file() {
            found.push(dir);
        }
    }

    Ok(found)
}
