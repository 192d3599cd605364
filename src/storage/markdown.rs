//! Markdown document parsing
//!
//! Each directory may hold one document (`README.md` by default). Level-2
//! headings pick the section, fenced shell blocks are commands and links
//! are directory references:
//!
//! ```text
//! ## Requires        links → fixture dependencies
//! ## Includes        link  → parent suite
//! ## Run | Setup     code  → suite run commands
//! ## Cleanup         code  → suite cleanup commands
//! ## Test <Name>     code  → scenario run commands
//! ### Cleanup        code  → scenario cleanup (inside a test)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::naming::normalize_path;
use crate::domain::{Block, Example, Scenario};

/// Fence info strings accepted as shell commands; an empty info string counts too
const SHELL_LANGS: &[&str] = &["bash", "sh", "shell", "zsh"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Run,
    Cleanup,
    Requires,
    Includes,
    Test { cleanup: bool },
}

struct Fence {
    marker: String,
    shell: bool,
    lines: Vec<String>,
}

/// Parses documents into examples
#[derive(Debug, Clone)]
pub struct DocumentParser {
    file_name: String,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new("README.md")
    }
}

impl DocumentParser {
    /// Creates a parser for documents with the given file name
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Returns the document file name this parser looks for
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Parses the document in `dir`, or returns `None` if there is none
    pub fn parse_dir(&self, dir: &Path) -> Result<Option<Example>> {
        let path = dir.join(&self.file_name);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;

        Ok(Some(self.parse(dir, &content)))
    }

    /// Parses document text that lives in `dir`
    pub fn parse(&self, dir: &Path, content: &str) -> Example {
        let mut example = Example::new(dir);
        let mut section = Section::Other;
        let mut fence: Option<Fence> = None;

        for line in content.lines() {
            if let Some(open) = fence.as_mut() {
                if is_fence_close(line, &open.marker) {
                    if let Some(done) = fence.take() {
                        push_code(&mut example, section, done);
                    }
                } else {
                    open.lines.push(line.to_string());
                }
                continue;
            }

            if let Some(open) = fence_open(line) {
                fence = Some(open);
                continue;
            }

            if let Some((level, text)) = heading(line) {
                section = next_section(section, level, text, &mut example);
                continue;
            }

            match section {
                Section::Requires => {
                    for target in links(line) {
                        example.blocks.push(Block::Dependency(resolve(dir, &target)));
                    }
                }
                Section::Includes => {
                    for target in links(line) {
                        example.blocks.push(Block::Include(resolve(dir, &target)));
                    }
                }
                _ => {}
            }
        }

        // An unterminated fence still counts, like most renderers show it
        if let Some(open) = fence {
            push_code(&mut example, section, open);
        }

        example
    }
}

fn next_section(current: Section, level: usize, text: &str, example: &mut Example) -> Section {
    let lower = text.to_lowercase();

    match level {
        2 => {
            if let Some(name) = scenario_name(text) {
                example.scenarios.push(Scenario::new(name));
                return Section::Test { cleanup: false };
            }
            match lower.as_str() {
                "run" | "setup" => Section::Run,
                "cleanup" => Section::Cleanup,
                "requires" => Section::Requires,
                "includes" => Section::Includes,
                _ => Section::Other,
            }
        }
        l if l > 2 => match current {
            Section::Test { .. } if lower == "cleanup" => Section::Test { cleanup: true },
            Section::Test { .. } if lower == "run" => Section::Test { cleanup: false },
            other => other,
        },
        _ => Section::Other,
    }
}

/// `Test Foo`, `Test: Foo`, `Scenario Foo` and `Scenario: Foo` name a scenario
fn scenario_name(text: &str) -> Option<&str> {
    for prefix in ["test", "scenario"] {
        let Some(head) = text.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &text[prefix.len()..];
        if !rest.starts_with([' ', ':']) {
            continue;
        }
        let name = rest.trim_start_matches([' ', ':']).trim();
        if !name.is_empty() {
            return Some(name);
        }
    }
    None
}

fn push_code(example: &mut Example, section: Section, fence: Fence) {
    if !fence.shell {
        return;
    }

    let command = fence.lines.join("\n").trim_end().to_string();
    if command.trim().is_empty() {
        return;
    }

    match section {
        Section::Run => example.blocks.push(Block::Run(command)),
        Section::Cleanup => example.blocks.push(Block::Cleanup(command)),
        Section::Test { cleanup } => {
            if let Some(scenario) = example.scenarios.last_mut() {
                if cleanup {
                    scenario.cleanup.push(command);
                } else {
                    scenario.run.push(command);
                }
            }
        }
        _ => {}
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim().trim_end_matches('#').trim()))
}

fn fence_open(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }

    let info = trimmed[len..].trim();
    let lang = info
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("");

    Some(Fence {
        marker: trimmed[..len].to_string(),
        shell: lang.is_empty() || SHELL_LANGS.contains(&lang.to_lowercase().as_str()),
        lines: Vec::new(),
    })
}

fn is_fence_close(line: &str, marker: &str) -> bool {
    let trimmed = line.trim();
    let Some(ch) = marker.chars().next() else {
        return false;
    };
    trimmed.len() >= marker.len() && trimmed.chars().all(|c| c == ch)
}

/// Extracts local link targets from `[text](target)` pairs
fn links(line: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find("](") {
        let after = &rest[start + 2..];
        let Some(end) = after.find(')') else {
            break;
        };

        let target = after[..end].split_whitespace().next().unwrap_or("");
        let target = target.split('#').next().unwrap_or("");
        if !target.is_empty() && !target.contains("://") && !target.starts_with("mailto:") {
            targets.push(target.to_string());
        }

        rest = &after[end + 1..];
    }

    targets
}

/// Resolves a link target relative to the document's directory
///
/// Links may point at a directory or at a document inside one.
fn resolve(dir: &Path, target: &str) -> PathBuf {
    let joined = if Path::new(target).is_absolute() {
        PathBuf::from(target)
    } else {
        dir.join(target)
    };

    let normalized = normalize_path(&joined);
    if normalized.extension().is_some_and(|e| e.eq_ignore_ascii_case("md")) {
        normalized
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(normalized)
    } else {
        normalized
    }
}
