//! Programmatic depth-first traversals
//!
//! A [`Traversal`] names the relationship types it may follow (each with a
//! direction), a depth bound and a uniqueness rule. Running it from a start
//! node yields every path it walked plus a flag telling whether the depth
//! bound cut off edges that were still admissible.

use std::collections::HashSet;

use crate::graph::{EdgeRef, Graph, NodeRef, RelType};

/// Which way an edge may be followed relative to the current node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges pointing at the current node, back to their source
    Incoming,
    /// Follow edges leaving the current node
    Outgoing,
    Both,
}

impl Direction {
    fn petgraph(self) -> &'static [petgraph::Direction] {
        match self {
            Direction::Incoming => &[petgraph::Direction::Incoming],
            Direction::Outgoing => &[petgraph::Direction::Outgoing],
            Direction::Both => &[petgraph::Direction::Outgoing, petgraph::Direction::Incoming],
        }
    }
}

/// What a traversal refuses to visit twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// Each edge is followed at most once over the whole traversal
    RelationshipGlobal,
    /// Each node is reached at most once over the whole traversal
    NodeGlobal,
}

/// One hop of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub edge: EdgeRef,
    pub rel_type: RelType,
    /// Node reached by this hop
    pub node: NodeRef,
}

/// A walk from the traversal's start node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub start: NodeRef,
    pub steps: Vec<Step>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Last node of the path
    pub fn end(&self) -> NodeRef {
        self.steps.last().map(|s| s.node).unwrap_or(self.start)
    }
}

/// Output of [`Traversal::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalResult {
    /// Every non-empty path, in depth-first visiting order
    pub paths: Vec<Path>,
    /// Set when the depth bound left admissible edges unexplored
    pub truncated: bool,
}

impl TraversalResult {
    /// Distinct path end nodes, in first-visit order
    pub fn nodes(&self) -> Vec<NodeRef> {
        let mut seen = HashSet::new();
        self.paths
            .iter()
            .map(Path::end)
            .filter(|node| seen.insert(*node))
            .collect()
    }
}

/// Description of a depth-first traversal
#[derive(Debug, Clone)]
pub struct Traversal {
    relationships: Vec<(RelType, Direction)>,
    max_depth: usize,
    uniqueness: Uniqueness,
}

impl Traversal {
    /// A traversal that follows nothing until relationships are added
    pub fn new() -> Self {
        Self {
            relationships: Vec::new(),
            max_depth: usize::MAX,
            uniqueness: Uniqueness::RelationshipGlobal,
        }
    }

    /// Allow following `rel_type` edges in `direction`
    pub fn relationships(mut self, rel_type: RelType, direction: Direction) -> Self {
        self.relationships.push((rel_type, direction));
        self
    }

    /// Stop expanding paths once they are `depth` hops long
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn uniqueness(mut self, uniqueness: Uniqueness) -> Self {
        self.uniqueness = uniqueness;
        self
    }

    /// Walk `graph` depth first from `start`
    pub(crate) fn run(&self, graph: &Graph, start: NodeRef) -> TraversalResult {
        let mut result = TraversalResult::default();
        if graph.node(start).is_none() {
            return result;
        }

        let mut seen_edges: HashSet<EdgeRef> = HashSet::new();
        let mut seen_nodes: HashSet<NodeRef> = HashSet::from([start]);
        let mut stack = vec![Path {
            start,
            steps: Vec::new(),
        }];

        while let Some(path) = stack.pop() {
            if let Some(step) = path.steps.last() {
                let fresh = match self.uniqueness {
                    Uniqueness::RelationshipGlobal => seen_edges.insert(step.edge),
                    Uniqueness::NodeGlobal => seen_nodes.insert(step.node),
                };
                if !fresh {
                    continue;
                }
            }

            let candidates = self.expand(graph, path.end(), &seen_edges, &seen_nodes);
            if path.len() >= self.max_depth {
                if !candidates.is_empty() {
                    result.truncated = true;
                }
            } else {
                for step in candidates.into_iter().rev() {
                    let mut next = path.clone();
                    next.steps.push(step);
                    stack.push(next);
                }
            }

            if !path.is_empty() {
                result.paths.push(path);
            }
        }

        result
    }

    fn expand(
        &self,
        graph: &Graph,
        from: NodeRef,
        seen_edges: &HashSet<EdgeRef>,
        seen_nodes: &HashSet<NodeRef>,
    ) -> Vec<Step> {
        let mut steps = Vec::new();
        for (rel_type, direction) in &self.relationships {
            for dir in direction.petgraph() {
                for (edge, other, weight) in graph.edges_directed(from, *dir) {
                    if weight.rel_type != *rel_type {
                        continue;
                    }
                    let admissible = match self.uniqueness {
                        Uniqueness::RelationshipGlobal => !seen_edges.contains(&edge),
                        Uniqueness::NodeGlobal => !seen_nodes.contains(&other),
                    };
                    if admissible {
                        steps.push(Step {
                            edge,
                            rel_type: *rel_type,
                            node: other,
                        });
                    }
                }
            }
        }
        steps
    }
}

impl Default for Traversal {
    fn default() -> Self {
        Self::new()
    }
}
