//! Example domain model
//!
//! An example is the parsed form of one directory's document: an ordered
//! list of directive-tagged command blocks plus any named scenarios.
//! Examples are produced by the document parser and never mutated after.

use std::path::{Path, PathBuf};

/// A single directive-tagged block from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A command to run during setup
    Run(String),

    /// A command to run during teardown
    Cleanup(String),

    /// A fixture requirement naming the directory of another example
    Dependency(PathBuf),

    /// Nests this example inside the suite of the named directory
    Include(PathBuf),
}

/// A named group of commands inside one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub run: Vec<String>,
    pub cleanup: Vec<String>,
}

impl Scenario {
    /// Creates an empty scenario
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: Vec::new(),
            cleanup: Vec::new(),
        }
    }

    /// Returns true if the scenario has no commands at all
    pub fn is_empty(&self) -> bool {
        self.run.is_empty() && self.cleanup.is_empty()
    }
}

/// The parsed record for one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Source directory, unique across a run
    pub dir: PathBuf,

    /// Suite-level blocks in declaration order
    pub blocks: Vec<Block>,

    /// Named scenarios in declaration order
    pub scenarios: Vec<Scenario>,
}

impl Example {
    /// Creates an example with no blocks
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            blocks: Vec::new(),
            scenarios: Vec::new(),
        }
    }

    /// Appends a block (builder style)
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Appends a scenario (builder style)
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Returns the source directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Suite-level run commands in declaration order
    pub fn run(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Run(cmd) => Some(cmd.as_str()),
            _ => None,
        })
    }

    /// Suite-level cleanup commands in declaration order
    pub fn cleanup(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Cleanup(cmd) => Some(cmd.as_str()),
            _ => None,
        })
    }

    /// Directories this example requires as fixtures
    pub fn dependencies(&self) -> impl Iterator<Item = &Path> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Dependency(dir) => Some(dir.as_path()),
            _ => None,
        })
    }

    /// Directories this example asks to be nested inside
    pub fn includes(&self) -> impl Iterator<Item = &Path> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Include(dir) => Some(dir.as_path()),
            _ => None,
        })
    }
}
