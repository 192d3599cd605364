//! Naming helpers
//!
//! Stateless conversions from directory paths to identifiers and titles,
//! plus the text normalization shared by both renderers.

use std::path::{Component, Path, PathBuf};

/// Replaces every character that can't appear in an identifier with `_`
///
/// A leading digit is prefixed with `_` so the result is always a valid
/// identifier. An empty input yields `_`.
pub fn identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Turns a directory segment into a display title
///
/// Non-identifier characters fold to `_` and the first letter is upper-cased:
/// `my-example_case` becomes `My_example_case`.
pub fn title(segment: &str) -> String {
    let ident = identifier(segment);
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reserved words that can't name a package or an import alias
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Like [`identifier`], with `_` appended to reserved words
///
/// Used wherever the name becomes a package name or import alias.
pub fn package_name(raw: &str) -> String {
    let mut name = identifier(raw);
    if GO_KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Returns the package name for the final segment of a directory
pub fn dir_identifier(dir: &Path) -> String {
    package_name(&last_segment(dir))
}

/// Returns the final segment of a directory, or `root` for paths without one
pub fn last_segment(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

/// Trims the text and drops whitespace-only lines
///
/// Both renderers run their output through this so that optional sections
/// never leave gaps behind and repeated runs are byte-identical.
pub fn squeeze_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.trim().lines() {
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Normalizes a path lexically, resolving `.` and `..` without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }

    out
}

/// Joins a relative path into a forward-slash import path under `module`
pub fn import_path(module: &str, rel: &Path) -> String {
    let segments: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let module = module.trim_end_matches('/');
    if segments.is_empty() {
        module.to_string()
    } else if module.is_empty() {
        segments.join("/")
    } else {
        format!("{}/{}", module, segments.join("/"))
    }
}

/// Quotes a word for the shell unless it only holds safe characters
pub fn shell_word(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:,@%=".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}
