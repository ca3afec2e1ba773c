//! Resolution graph construction and tree rendering.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A package resolved during the run.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ResolvedNode {
    /// Normalized package name.
    pub name: String,
    /// Resolved version, or `"?"` for packages that could not be resolved.
    pub version: String,
}

impl fmt::Display for ResolvedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Edge label: the constraint the parent requested the child under.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub requested: Option<String>,
}

/// The dependency graph of one resolution run, backed by petgraph.
///
/// Root requirements become root nodes in declared order; every
/// parent→child edge records the requested constraint for audit output.
pub struct ResolutionGraph {
    graph: DiGraph<ResolvedNode, DepEdge>,
    /// Lookup from normalized name to node index.
    index: HashMap<String, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl Default for ResolutionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Add or retrieve a node by normalized name.
    pub fn add_node(&mut self, node: ResolvedNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.name) {
            return idx;
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(name, idx);
        idx
    }

    /// Mark a node as a root requirement.
    pub fn add_root(&mut self, idx: NodeIndex) {
        if !self.roots.contains(&idx) {
            self.roots.push(idx);
        }
    }

    /// Add a dependency edge, ignoring duplicates.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// Look up a node by normalized name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &ResolvedNode {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Direct dependencies of a node.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect()
    }

    /// Reverse dependencies (who requested this package).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect()
    }

    /// Render the dependency tree, one top-level section per root
    /// requirement, cycle-safe.
    pub fn print_tree(&self) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        for &root in &self.roots {
            output.push_str(&format!("{}\n", self.graph[root]));
            visited.insert(root);
            let deps = self.dependencies_of(root);
            let count = deps.len();
            for (i, (child, _)) in deps.iter().enumerate() {
                self.print_subtree(&mut output, *child, "", i == count - 1, &mut visited);
            }
            visited.remove(&root);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, _)) in deps.iter().enumerate() {
            self.print_subtree(output, *child, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_deduplicates_by_name() {
        let mut graph = ResolutionGraph::new();
        let a = graph.add_node(ResolvedNode {
            name: "requests".into(),
            version: "2.31.0".into(),
        });
        let b = graph.add_node(ResolvedNode {
            name: "requests".into(),
            version: "2.31.0".into(),
        });
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn edges_and_dependents() {
        let mut graph = ResolutionGraph::new();
        let parent = graph.add_node(ResolvedNode {
            name: "flask".into(),
            version: "3.0.0".into(),
        });
        let child = graph.add_node(ResolvedNode {
            name: "click".into(),
            version: "8.1.7".into(),
        });
        graph.add_root(parent);
        graph.add_edge(
            parent,
            child,
            DepEdge {
                requested: Some(">=8.0".into()),
            },
        );
        // Duplicate edge is a no-op.
        graph.add_edge(parent, child, DepEdge { requested: None });

        assert_eq!(graph.dependencies_of(parent).len(), 1);
        let dependents = graph.dependents_of(child);
        assert_eq!(dependents.len(), 1);
        assert_eq!(
            dependents[0].1.requested.as_deref(),
            Some(">=8.0")
        );
    }

    #[test]
    fn tree_rendering_is_cycle_safe() {
        let mut graph = ResolutionGraph::new();
        let a = graph.add_node(ResolvedNode {
            name: "a".into(),
            version: "1.0".into(),
        });
        let b = graph.add_node(ResolvedNode {
            name: "b".into(),
            version: "1.0".into(),
        });
        graph.add_root(a);
        graph.add_edge(a, b, DepEdge { requested: None });
        graph.add_edge(b, a, DepEdge { requested: None });

        let rendered = graph.print_tree();
        assert!(rendered.contains("a 1.0"));
        assert!(rendered.contains("b 1.0"));
    }
}
