//! Suite fixtures
//!
//! A dependency is a named fixture a suite needs before its own commands
//! run. Names are identity: the same name anywhere in an ancestor chain is
//! the same fixture and is initialized only by the shallowest suite.

use std::collections::HashSet;

/// A named fixture and everything needed to declare and initialize it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Identity key, also the package alias
    pub name: String,

    /// Package the fixture type lives in
    pub import: String,

    /// Field declaration inside the suite struct
    pub declaration: String,

    /// Statement that initializes the fixture in the compiled suite
    pub init: String,

    /// Shell commands that initialize the fixture
    pub script: Vec<String>,

    /// Shell commands that tear the fixture down
    pub teardown: Vec<String>,

    /// Name and import of every fixture `script` sets up before this one
    pub nested: Vec<(String, String)>,
}

impl Dependency {
    /// Creates a fixture backed by another generated suite package
    pub fn suite(name: impl Into<String>, import: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            declaration: format!("{name}Suite {name}.Suite"),
            init: format!("suite.Run(s.T(), &s.{name}Suite)"),
            import: import.into(),
            name,
            script: Vec::new(),
            teardown: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Attaches the shell-format setup and teardown commands
    pub fn with_script(mut self, script: Vec<String>, teardown: Vec<String>) -> Self {
        self.script = script;
        self.teardown = teardown;
        self
    }

    /// Returns the aliased import line for this fixture
    pub fn import_line(&self) -> String {
        format!("{} \"{}\"", self.name, self.import)
    }
}

/// Insertion-ordered set of dependencies keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    items: Vec<Dependency>,
    names: HashSet<String>,
}

impl Dependencies {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dependency unless one with the same name is already present
    ///
    /// Returns true if the dependency was added.
    pub fn insert(&mut self, dep: Dependency) -> bool {
        if !self.names.insert(dep.name.clone()) {
            return false;
        }
        self.items.push(dep);
        true
    }

    /// Returns true if a dependency with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterates in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Dependency> {
        self.items.iter()
    }

    /// Returns the names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Import lines, one per dependency
    pub fn imports_string(&self) -> String {
        self.join(Dependency::import_line)
    }

    /// Struct field declarations, one per dependency
    pub fn fields_string(&self) -> String {
        self.join(|d| d.declaration.clone())
    }

    /// Initialization statements, one per dependency
    pub fn setup_string(&self) -> String {
        self.join(|d| d.init.clone())
    }

    fn join(&self, f: impl Fn(&Dependency) -> String) -> String {
        self.items.iter().map(f).collect::<Vec<_>>().join("\n")
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_dependency_text() {
        let dep = Dependency::suite("spire", "example.com/tests/spire");

        assert_eq!(dep.declaration, "spireSuite spire.Suite");
        assert_eq!(dep.init, "suite.Run(s.T(), &s.spireSuite)");
        assert_eq!(dep.import_line(), "spire \"example.com/tests/spire\"");
    }

    #[test]
    fn first_insert_wins() {
        let mut deps = Dependencies::new();
        assert!(deps.insert(Dependency::suite("a", "x/a")));
        assert!(deps.insert(Dependency::suite("b", "x/b")));
        assert!(!deps.insert(Dependency::suite("a", "y/a")));

        assert_eq!(deps.len(), 2);
        assert_eq!(deps.names(), vec!["a", "b"]);
        assert_eq!(deps.iter().next().unwrap().import, "x/a");
    }

    #[test]
    fn rendering_keeps_insertion_order() {
        let mut deps = Dependencies::new();
        deps.insert(Dependency::suite("zeta", "x/zeta"));
        deps.insert(Dependency::suite("alpha", "x/alpha"));

        assert_eq!(
            deps.fields_string(),
            "zetaSuite zeta.Suite\nalphaSuite alpha.Suite"
        );
        assert_eq!(
            deps.imports_string(),
            "zeta \"x/zeta\"\nalpha \"x/alpha\""
        );
        assert_eq!(
            deps.setup_string(),
            "suite.Run(s.T(), &s.zetaSuite)\nsuite.Run(s.T(), &s.alphaSuite)"
        );
    }

    #[test]
    fn empty_set_renders_nothing() {
        let deps = Dependencies::new();
        assert!(deps.is_empty());
        assert_eq!(deps.fields_string(), "");
        assert!(!deps.contains("anything"));
    }
}
