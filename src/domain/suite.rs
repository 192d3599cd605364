//! Suite assembly
//!
//! Turns the linked forest into a tree of suites. All inheritance and
//! ordering decisions are made here, so renderers only read resolved
//! fields:
//!
//! - `deps` is every fixture visible to the suite (own plus ancestors')
//! - `deps_to_setup` is the subset this suite itself initializes
//! - `run`/`cleanup` keep the document's declaration order verbatim
//!
//! Suites are assembled root-first because a child's `deps_to_setup`
//! depends on the parent's finished `deps`.
//!
//! A fixture's shell commands include the fixtures it requires itself,
//! expanded depth-first. Each fixture name is set up at most once per chain.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::dependency::{Dependencies, Dependency};
use super::example::Example;
use super::linker::{ExampleId, LinkedExamples};
use super::naming::{dir_identifier, import_path, normalize_path, shell_word, title};

#[derive(Debug, Error, PartialEq)]
pub enum AssembleError {
    #[error("Example {} needs two different fixtures named {name}: {first} and {second}", .from.display())]
    FixtureClash {
        from: PathBuf,
        name: String,
        first: String,
        second: String,
    },
}

/// Index of a suite inside [`Suites`]
pub type SuiteId = usize;

/// An ordered list of opaque command strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body(Vec<String>);

impl Body {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Body {
    fn from(commands: Vec<String>) -> Self {
        Self(commands)
    }
}

impl<S: Into<String>> FromIterator<S> for Body {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A named scenario inside a suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    pub dir: PathBuf,
    pub abs_dir: PathBuf,
    /// Unique within the owning suite; empty only for the placeholder
    pub name: String,
    pub run: Body,
    pub cleanup: Body,
}

impl Test {
    /// The empty test a suite gets when its document declares none
    pub fn placeholder(dir: impl Into<PathBuf>, abs_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            abs_dir: abs_dir.into(),
            name: String::new(),
            run: Body::new(),
            cleanup: Body::new(),
        }
    }

    /// Returns true for the synthesized empty test
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() && self.run.is_empty() && self.cleanup.is_empty()
    }
}

/// The fully assembled unit for one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Source directory as it was walked
    pub dir: PathBuf,

    /// Source directory as an absolute path, used by shell scripts
    pub abs_dir: PathBuf,

    /// Directory under the output root that receives this suite's artifacts
    pub location: PathBuf,

    /// Identifier derived from the final directory segment
    pub name: String,

    /// Package path of the generated suite
    pub import: String,

    pub run: Body,
    pub cleanup: Body,
    pub tests: Vec<Test>,

    pub parent: Option<SuiteId>,
    pub children: Vec<SuiteId>,

    pub deps: Dependencies,
    pub deps_to_setup: Dependencies,
}

/// The assembled suite forest
#[derive(Debug, Clone, Default)]
pub struct Suites {
    suites: Vec<Suite>,
    runtime_import: String,
}

impl Suites {
    pub fn get(&self, id: SuiteId) -> Option<&Suite> {
        self.suites.get(id)
    }

    /// Iterates parents-before-children
    pub fn iter(&self) -> impl Iterator<Item = (SuiteId, &Suite)> {
        self.suites.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Package that provides the embedded base suite and its runner
    pub fn runtime_import(&self) -> &str {
        &self.runtime_import
    }

    /// Returns the suite and its ancestors, root first
    pub fn chain(&self, id: SuiteId) -> Vec<&Suite> {
        let mut chain = Vec::new();
        let mut current = self.suites.get(id);
        while let Some(suite) = current {
            chain.push(suite);
            current = suite.parent.and_then(|p| self.suites.get(p));
        }
        chain.reverse();
        chain
    }

    /// Returns the direct children of a suite
    pub fn children(&self, id: SuiteId) -> Vec<&Suite> {
        self.suites
            .get(id)
            .map(|s| s.children.iter().filter_map(|c| self.suites.get(*c)).collect())
            .unwrap_or_default()
    }

    /// Finds a suite by its source directory
    pub fn find(&self, dir: &Path) -> Option<SuiteId> {
        let wanted = normalize_path(dir);
        self.suites
            .iter()
            .position(|s| normalize_path(&s.dir) == wanted)
    }
}

/// Paths and package settings for assembly
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Root the examples were walked from
    pub input_dir: PathBuf,

    /// Absolute form of `input_dir`
    pub absolute_dir: PathBuf,

    /// Root that receives generated artifacts
    pub output_dir: PathBuf,

    /// Package path prefix matching `output_dir`
    pub module: String,

    /// Package providing the base suite
    pub runtime_import: String,
}

impl AssembleOptions {
    /// Creates options with the absolute root equal to `input_dir` and the
    /// runtime package at `<module>/base`
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        module: impl Into<String>,
    ) -> Self {
        let input_dir = input_dir.into();
        let module = module.into();
        Self {
            absolute_dir: input_dir.clone(),
            runtime_import: import_path(&module, Path::new("base")),
            input_dir,
            output_dir: output_dir.into(),
            module,
        }
    }

    pub fn with_absolute_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.absolute_dir = dir.into();
        self
    }

    pub fn with_runtime_import(mut self, import: impl Into<String>) -> Self {
        self.runtime_import = import.into();
        self
    }

    /// Path of `dir` relative to the input root
    fn relative(&self, dir: &Path) -> PathBuf {
        let dir = normalize_path(dir);
        let root = normalize_path(&self.input_dir);

        if root == Path::new(".") {
            return only_normal(&dir);
        }

        match dir.strip_prefix(&root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => only_normal(&dir),
        }
    }
}

/// Joins without leaving a trailing separator for an empty `rel`
fn join_rel(base: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}

fn only_normal(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Builds suites from linked examples
#[derive(Debug, Clone)]
pub struct Assembler {
    options: AssembleOptions,
}

impl Assembler {
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Assembles every linked example, parents before children
    pub fn assemble(&self, linked: &LinkedExamples) -> Result<Suites, AssembleError> {
        let order = linked.pre_order();

        let mut position = vec![0; linked.len()];
        for (pos, id) in order.iter().enumerate() {
            position[*id] = pos;
        }

        let mut suites: Vec<Suite> = Vec::with_capacity(order.len());
        for id in order {
            let parent = linked.parent(id).map(|p| position[p]);
            let mut suite = self.assemble_one(linked, id, parent.and_then(|p| suites.get(p)))?;
            suite.parent = parent;
            suite.children = linked.children(id).iter().map(|c| position[*c]).collect();
            suites.push(suite);
        }

        Ok(Suites {
            suites,
            runtime_import: self.options.runtime_import.clone(),
        })
    }

    /// Assembles a single example given its already-assembled parent
    ///
    /// The returned suite has no tree links; [`Assembler::assemble`] fills
    /// them in.
    pub fn assemble_one(
        &self,
        linked: &LinkedExamples,
        id: ExampleId,
        parent: Option<&Suite>,
    ) -> Result<Suite, AssembleError> {
        let example = match linked.get(id) {
            Some(node) => &node.example,
            None => return Ok(self.empty_suite(Path::new(""))),
        };

        let mut deps = parent.map(|p| p.deps.clone()).unwrap_or_default();
        let mut deps_to_setup = Dependencies::new();

        // Every fixture already set up somewhere up the chain, by name
        let mut known: HashMap<String, String> = HashMap::new();
        for dep in &deps {
            known.insert(dep.name.clone(), dep.import.clone());
            known.extend(dep.nested.iter().cloned());
        }

        for dir in example.dependencies() {
            if !self.claim(&example.dir, dir, &mut known)? {
                continue;
            }
            let dep = self.fixture(linked, dir, &mut known)?;
            deps.insert(dep.clone());
            deps_to_setup.insert(dep);
        }

        let mut suite = self.empty_suite(&example.dir);
        suite.run = example.run().collect();
        suite.cleanup = example.cleanup().collect();
        suite.tests = self.tests(example, &suite.abs_dir);
        suite.deps = deps;
        suite.deps_to_setup = deps_to_setup;
        Ok(suite)
    }

    fn empty_suite(&self, dir: &Path) -> Suite {
        let rel = self.options.relative(dir);
        let name = if rel.as_os_str().is_empty() {
            dir_identifier(&normalize_path(&self.options.absolute_dir))
        } else {
            dir_identifier(&rel)
        };

        Suite {
            dir: dir.to_path_buf(),
            abs_dir: join_rel(&self.options.absolute_dir, &rel),
            location: join_rel(&self.options.output_dir, &rel),
            name,
            import: import_path(&self.options.module, &rel),
            run: Body::new(),
            cleanup: Body::new(),
            tests: Vec::new(),
            parent: None,
            children: Vec::new(),
            deps: Dependencies::new(),
            deps_to_setup: Dependencies::new(),
        }
    }

    /// Records the fixture at `dir` as set up; false if it already was
    ///
    /// Fails when a different directory already claimed the same name.
    fn claim(
        &self,
        from: &Path,
        dir: &Path,
        known: &mut HashMap<String, String>,
    ) -> Result<bool, AssembleError> {
        let rel = self.options.relative(dir);
        let name = dir_identifier(&rel);
        let import = import_path(&self.options.module, &rel);

        match known.get(&name) {
            Some(existing) if *existing != import => Err(AssembleError::FixtureClash {
                from: from.to_path_buf(),
                name,
                first: existing.clone(),
                second: import,
            }),
            Some(_) => Ok(false),
            None => {
                known.insert(name, import);
                Ok(true)
            }
        }
    }

    /// Builds the fixture record for a required directory
    ///
    /// The shell commands first set up the fixture's own fixtures that are
    /// not in `known` yet, then change into its directory and run it.
    fn fixture(
        &self,
        linked: &LinkedExamples,
        dir: &Path,
        known: &mut HashMap<String, String>,
    ) -> Result<Dependency, AssembleError> {
        let rel = self.options.relative(dir);
        let mut dep = Dependency::suite(dir_identifier(&rel), import_path(&self.options.module, &rel));

        let Some(node) = linked.find(dir).and_then(|id| linked.get(id)) else {
            return Ok(dep);
        };

        let mut script = Vec::new();
        let mut inner = Vec::new();
        for inner_dir in node.example.dependencies() {
            if !self.claim(&node.example.dir, inner_dir, known)? {
                continue;
            }
            let nested = self.fixture(linked, inner_dir, known)?;
            script.extend(nested.script.iter().cloned());
            dep.nested.push((nested.name.clone(), nested.import.clone()));
            dep.nested.extend(nested.nested.iter().cloned());
            inner.push(nested);
        }

        let abs = join_rel(&self.options.absolute_dir, &rel);
        script.push(format!("cd {}", shell_word(&abs.to_string_lossy())));
        script.extend(node.example.run().map(str::to_string));

        let mut teardown: Vec<String> = node.example.cleanup().map(str::to_string).collect();
        for nested in inner.iter().rev() {
            teardown.extend(nested.teardown.iter().cloned());
        }

        Ok(dep.with_script(script, teardown))
    }

    /// Maps scenarios to tests, keeping order and making names unique
    fn tests(&self, example: &Example, abs_dir: &Path) -> Vec<Test> {
        let mut seen = HashSet::new();
        let mut tests = Vec::with_capacity(example.scenarios.len().max(1));

        for scenario in &example.scenarios {
            let base = title(&scenario.name);
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }

            tests.push(Test {
                dir: example.dir.clone(),
                abs_dir: abs_dir.to_path_buf(),
                name,
                run: scenario.run.iter().cloned().collect(),
                cleanup: scenario.cleanup.iter().cloned().collect(),
            });
        }

        if tests.is_empty() {
            tests.push(Test::placeholder(example.dir.clone(), abs_dir));
        }

        tests
    }
}
