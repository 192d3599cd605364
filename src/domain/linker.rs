//! Example linking
//!
//! Resolves the structural relationships between examples into a forest.
//! An explicit include reference names the parent directory; without one,
//! the nearest ancestor directory that holds an example is the parent.
//! Uses petgraph to detect reference cycles: a parent runs its children and
//! a suite runs the fixtures it requires, so neither relation may loop.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::example::Example;
use super::naming::normalize_path;

/// Index of an example inside [`LinkedExamples`]
pub type ExampleId = usize;

#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("Example {} includes {}, which has no document", .from.display(), .missing.display())]
    MissingInclude { from: PathBuf, missing: PathBuf },

    #[error("Example {} requires {}, which has no document", .from.display(), .missing.display())]
    MissingDependency { from: PathBuf, missing: PathBuf },

    #[error("Reference cycle detected: {}", format_cycle(.0))]
    Cycle(Vec<PathBuf>),

    #[error("Example {} includes more than one directory: {} and {}", .0.display(), .1.display(), .2.display())]
    MultipleParents(PathBuf, PathBuf, PathBuf),

    #[error("Duplicate example directory: {}", .0.display())]
    DuplicateDir(PathBuf),
}

fn format_cycle(dirs: &[PathBuf]) -> String {
    let mut parts: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    if let Some(first) = parts.first().cloned() {
        parts.push(first);
    }
    parts.join(" -> ")
}

/// An example annotated with its resolved position in the forest
#[derive(Debug, Clone)]
pub struct LinkedExample {
    pub example: Example,
    pub parent: Option<ExampleId>,
    pub children: Vec<ExampleId>,
}

/// The linked forest of examples
#[derive(Debug, Default)]
pub struct LinkedExamples {
    nodes: Vec<LinkedExample>,
    roots: Vec<ExampleId>,
    by_dir: HashMap<PathBuf, ExampleId>,
}

impl LinkedExamples {
    /// Returns the linked example for an id
    pub fn get(&self, id: ExampleId) -> Option<&LinkedExample> {
        self.nodes.get(id)
    }

    /// Looks up an example by directory
    pub fn find(&self, dir: &Path) -> Option<ExampleId> {
        self.by_dir.get(&dir_key(dir)).copied()
    }

    /// Returns the top-level examples in input order
    pub fn roots(&self) -> &[ExampleId] {
        &self.roots
    }

    /// Returns the parent of an example
    pub fn parent(&self, id: ExampleId) -> Option<ExampleId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Returns the children of an example in input order
    pub fn children(&self, id: ExampleId) -> &[ExampleId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Returns the ancestor chain of an example, root first, excluding itself
    pub fn ancestors(&self, id: ExampleId) -> Vec<ExampleId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent(p);
        }
        chain.reverse();
        chain
    }

    /// Returns every example so that parents come before their children
    pub fn pre_order(&self) -> Vec<ExampleId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ExampleId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }

        order
    }

    /// Iterates over all linked examples in input order
    pub fn iter(&self) -> impl Iterator<Item = (ExampleId, &LinkedExample)> {
        self.nodes.iter().enumerate()
    }

    /// Returns the number of examples
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no examples
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Lexical lookup key for a directory; `.` and the empty path are the same key
fn dir_key(path: &Path) -> PathBuf {
    let normalized = normalize_path(path);
    if normalized == Path::new(".") {
        PathBuf::new()
    } else {
        normalized
    }
}

/// Links parsed examples into a forest
#[derive(Debug, Clone)]
pub struct Linker {
    root: PathBuf,
}

impl Linker {
    /// Creates a linker for examples found under `root`
    ///
    /// Implicit directory nesting never reaches above `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: dir_key(root.as_ref()),
        }
    }

    /// Resolves parent/child relationships between examples
    ///
    /// Fails without producing any links when a reference names a directory
    /// without an example or when include references form a cycle.
    pub fn link(&self, examples: impl IntoIterator<Item = Example>) -> Result<LinkedExamples, LinkError> {
        let examples: Vec<Example> = examples.into_iter().collect();

        let mut by_dir = HashMap::with_capacity(examples.len());
        for (id, example) in examples.iter().enumerate() {
            let key = dir_key(&example.dir);
            if by_dir.insert(key.clone(), id).is_some() {
                return Err(LinkError::DuplicateDir(key));
            }
        }

        let mut parents = Vec::with_capacity(examples.len());
        for example in &examples {
            for dep in example.dependencies() {
                if !by_dir.contains_key(&dir_key(dep)) {
                    return Err(LinkError::MissingDependency {
                        from: example.dir.clone(),
                        missing: dep.to_path_buf(),
                    });
                }
            }
            parents.push(self.resolve_parent(example, &by_dir)?);
        }

        check_acyclic(&examples, &parents, &by_dir)?;

        let mut nodes: Vec<LinkedExample> = examples
            .into_iter()
            .zip(parents.iter().copied())
            .map(|(example, parent)| LinkedExample {
                example,
                parent,
                children: Vec::new(),
            })
            .collect();

        let mut roots = Vec::new();
        for (id, parent) in parents.into_iter().enumerate() {
            match parent {
                Some(p) => nodes[p].children.push(id),
                None => roots.push(id),
            }
        }

        Ok(LinkedExamples { nodes, roots, by_dir })
    }

    /// Picks the parent of one example: explicit include first, then directory nesting
    fn resolve_parent(
        &self,
        example: &Example,
        by_dir: &HashMap<PathBuf, ExampleId>,
    ) -> Result<Option<ExampleId>, LinkError> {
        let mut includes = example.includes();

        if let Some(first) = includes.next() {
            if let Some(second) = includes.next() {
                return Err(LinkError::MultipleParents(
                    example.dir.clone(),
                    first.to_path_buf(),
                    second.to_path_buf(),
                ));
            }

            return match by_dir.get(&dir_key(first)) {
                Some(id) => Ok(Some(*id)),
                None => Err(LinkError::MissingInclude {
                    from: example.dir.clone(),
                    missing: first.to_path_buf(),
                }),
            };
        }

        let key = dir_key(&example.dir);
        for ancestor in key.ancestors().skip(1) {
            if !ancestor.starts_with(&self.root) {
                break;
            }
            if let Some(id) = by_dir.get(ancestor) {
                return Ok(Some(*id));
            }
        }

        Ok(None)
    }
}

/// Rejects parent and require references that loop back on themselves
///
/// Edges point from the suite that runs another to the one it runs: parent
/// to child, and dependent to required fixture.
fn check_acyclic(
    examples: &[Example],
    parents: &[Option<ExampleId>],
    by_dir: &HashMap<PathBuf, ExampleId>,
) -> Result<(), LinkError> {
    let mut graph: DiGraph<ExampleId, ()> = DiGraph::with_capacity(examples.len(), parents.len());
    for id in 0..examples.len() {
        graph.add_node(id);
    }
    for (child, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            graph.update_edge(NodeIndex::new(*parent), NodeIndex::new(child), ());
        }
    }
    for (id, example) in examples.iter().enumerate() {
        for dep in example.dependencies() {
            if let Some(target) = by_dir.get(&dir_key(dep)) {
                graph.update_edge(NodeIndex::new(id), NodeIndex::new(*target), ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let looped = match component.as_slice() {
            [single] => graph.contains_edge(*single, *single),
            _ => true,
        };
        if !looped {
            continue;
        }

        let Some(start) = component
            .iter()
            .copied()
            .min_by(|a, b| examples[graph[*a]].dir.cmp(&examples[graph[*b]].dir))
        else {
            continue;
        };

        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let cycle = trace_cycle(&graph, &members, start)
            .into_iter()
            .map(|node| examples[graph[node]].dir.clone())
            .collect();

        return Err(LinkError::Cycle(cycle));
    }

    Ok(())
}

/// Shortest loop from `start` back to itself inside one strongly connected component
fn trace_cycle(
    graph: &DiGraph<ExampleId, ()>,
    members: &HashSet<NodeIndex>,
    start: NodeIndex,
) -> Vec<NodeIndex> {
    if graph.contains_edge(start, start) {
        return vec![start];
    }

    let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        next.sort();

        for n in next {
            if n == start {
                let mut path = vec![node];
                let mut current = node;
                while let Some(p) = previous.get(&current) {
                    path.push(*p);
                    current = *p;
                }
                path.reverse();
                return path;
            }
            if !previous.contains_key(&n) {
                previous.insert(n, node);
                queue.push_back(n);
            }
        }
    }

    vec![start]
}
