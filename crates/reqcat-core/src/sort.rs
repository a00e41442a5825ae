//! Deterministic topological ordering with cycle detection.
//!
//! Depth-first, three-state traversal: nodes are visited in graph insertion
//! order and each node's dependencies in declaration order, and a node is
//! appended once all of its dependencies are done. For "A depends on B" edges
//! that post-order puts dependencies first.
//!
//! The traversal uses an explicit stack rather than recursion so long
//! dependency chains cannot exhaust the native stack; the visiting order is the
//! same as the recursive formulation.

use crate::document::DocumentId;
use crate::graph::{DependencyGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Documents in dependency-resolved order: every dependency precedes each of
/// its dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ordering(Vec<DocumentId>);

impl Ordering {
    pub fn iter(&self) -> std::slice::Iter<'_, DocumentId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position_of(&self, id: &DocumentId) -> Option<usize> {
        self.0.iter().position(|d| d == id)
    }

    pub fn as_slice(&self) -> &[DocumentId] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<DocumentId> {
        self.0
    }
}

impl IntoIterator for Ordering {
    type Item = DocumentId;
    type IntoIter = std::vec::IntoIter<DocumentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Ordering {
    type Item = &'a DocumentId;
    type IntoIter = std::slice::Iter<'a, DocumentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One detected cycle: the path from a document back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Members in edge order; the first member is repeated implicitly at the end.
    pub members: Vec<DocumentId>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `a → b → c → a`
    pub fn representation(&self) -> String {
        let mut parts: Vec<String> = self.members.iter().map(ToString::to_string).collect();
        if let Some(first) = self.members.first() {
            parts.push(first.to_string());
        }
        parts.join(" → ")
    }
}

/// Produced instead of an [`Ordering`] when the graph contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Every back edge found during the full traversal, in detection order.
    pub cycles: Vec<Cycle>,
}

impl CycleReport {
    /// Documents on any detected cycle, in first-seen order.
    pub fn participants(&self) -> Vec<&DocumentId> {
        let mut seen = HashSet::new();
        self.cycles
            .iter()
            .flat_map(|c| c.members.iter())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.cycles.iter().any(|c| c.members.contains(id))
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cycles.first() {
            Some(first) if self.cycles.len() == 1 => write!(
                f,
                "dependency cycle detected involving {}: {}",
                first.members[0],
                first.representation()
            ),
            Some(first) => write!(
                f,
                "{} dependency cycles detected; first involves {}: {}",
                self.cycles.len(),
                first.members[0],
                first.representation()
            ),
            None => write!(f, "dependency cycle detected"),
        }
    }
}

impl std::error::Error for CycleReport {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

struct Frame {
    node: NodeIndex,
    next_dependency: usize,
}

/// Order `graph` so dependencies precede dependents.
///
/// Any cycle anywhere voids the whole result: the traversal still runs to
/// completion so every cycle reachable by it is reported, but no ordering is
/// returned.
pub fn sort(graph: &DependencyGraph) -> Result<Ordering, CycleReport> {
    let nodes = graph.nodes();
    let mut state = vec![VisitState::Unvisited; nodes.len()];
    let mut order: Vec<NodeIndex> = Vec::with_capacity(nodes.len());
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..nodes.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::InProgress;
        stack.push(Frame {
            node: root,
            next_dependency: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(&dep) = nodes[node].dependencies.get(frame.next_dependency) else {
                state[node] = VisitState::Done;
                order.push(node);
                stack.pop();
                continue;
            };
            frame.next_dependency += 1;

            match state[dep] {
                VisitState::Done => {}
                VisitState::InProgress => {
                    let start = stack.iter().position(|f| f.node == dep).unwrap_or(0);
                    let members: Vec<DocumentId> = stack[start..]
                        .iter()
                        .map(|f| nodes[f.node].id.clone())
                        .collect();
                    tracing::error!(
                        document = %nodes[dep].id,
                        "dependency cycle detected involving {}",
                        nodes[dep].id
                    );
                    cycles.push(Cycle { members });
                }
                VisitState::Unvisited => {
                    state[dep] = VisitState::InProgress;
                    stack.push(Frame {
                        node: dep,
                        next_dependency: 0,
                    });
                }
            }
        }
    }

    if !cycles.is_empty() {
        return Err(CycleReport { cycles });
    }

    Ok(Ordering(
        order.into_iter().map(|i| nodes[i].id.clone()).collect(),
    ))
}
