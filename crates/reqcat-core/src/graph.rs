//! Dependency graph over documents.

use crate::context::Diagnostic;
use crate::document::DocumentId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Index of a node in the graph arena.
pub type NodeIndex = usize;

/// A document node and its outgoing "depends on" edges.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: DocumentId,
    /// Targets in first-declared order, deduplicated.
    pub dependencies: Vec<NodeIndex>,
    /// False for placeholder nodes: targets the document source never produced.
    pub discovered: bool,
}

/// An edge `from` requires `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    pub from: DocumentId,
    pub to: DocumentId,
}

/// Documents and their dependencies, stored as an arena in insertion order.
///
/// Every edge target has its own node. Discovered documents come first in the
/// order they were added; placeholders for undiscovered targets follow.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<DocumentId, NodeIndex>,
}

impl DependencyGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &DocumentId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_discovered(&self, id: &DocumentId) -> bool {
        self.index_of(id).is_some_and(|i| self.nodes[i].discovered)
    }

    /// Direct dependencies of `id`, or `None` if it is not a node.
    pub fn dependencies_of(&self, id: &DocumentId) -> Option<Vec<&DocumentId>> {
        let idx = self.index_of(id)?;
        Some(
            self.nodes[idx]
                .dependencies
                .iter()
                .map(|&d| &self.nodes[d].id)
                .collect(),
        )
    }

    /// Documents that directly require `id`, in insertion order.
    pub fn dependents_of(&self, id: &DocumentId) -> Vec<&DocumentId> {
        let Some(target) = self.index_of(id) else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .filter(|n| n.dependencies.contains(&target))
            .map(|n| &n.id)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dependencies.len()).sum()
    }

    /// All edges, grouped by source in insertion order.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.dependencies.iter().map(|&d| DependencyEdge {
                    from: n.id.clone(),
                    to: self.nodes[d].id.clone(),
                })
            })
            .collect()
    }

    /// One diagnostic per edge whose target is a placeholder.
    pub fn missing_targets(&self) -> Vec<Diagnostic> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.dependencies
                    .iter()
                    .filter(|&&d| !self.nodes[d].discovered)
                    .map(|&d| Diagnostic::MissingDependencyTarget {
                        dependent: n.id.clone(),
                        target: self.nodes[d].id.clone(),
                    })
            })
            .collect()
    }

    fn insert_node(&mut self, id: DocumentId, discovered: bool) -> NodeIndex {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(Node {
            id,
            dependencies: Vec::new(),
            discovered,
        });
        idx
    }
}

/// Collects each discovered document with its resolved dependencies, then
/// assembles a [`DependencyGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    entries: Vec<(DocumentId, Vec<DocumentId>)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, id: DocumentId, dependencies: Vec<DocumentId>) -> &mut Self {
        self.entries.push((id, dependencies));
        self
    }

    /// Build the graph. All discovered documents are registered before any
    /// edge, so node order follows discovery order regardless of how the
    /// documents reference each other. A document added twice keeps its first
    /// position and merges the dependency lists.
    pub fn build(self) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for (id, _) in &self.entries {
            graph.insert_node(id.clone(), true);
        }

        let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        for (id, dependencies) in self.entries {
            let from = graph.insert_node(id, true);
            for dep in dependencies {
                let to = graph.insert_node(dep, false);
                if seen.insert((from, to)) {
                    graph.nodes[from].dependencies.push(to);
                }
            }
        }

        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }
}

impl FromIterator<(DocumentId, Vec<DocumentId>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (DocumentId, Vec<DocumentId>)>>(entries: I) -> Self {
        let mut builder = GraphBuilder::new();
        for (id, deps) in entries {
            builder.add_document(id, deps);
        }
        builder.build()
    }
}
