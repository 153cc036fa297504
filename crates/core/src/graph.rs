//! Graph data structures for the organisational model
//!
//! Uses `petgraph::StableGraph` so node and edge indices stay valid for the
//! whole process lifetime. Query results hold [`NodeRef`]s, and those must keep
//! pointing at the same entity after later writes.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef as _, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Entity type of a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Manager,
    Designer,
    Programmer,
    Artist,
    Product,
}

impl Label {
    /// Labels of the people who can contribute to a product
    pub const PEOPLE: [Label; 4] = [
        Label::Manager,
        Label::Designer,
        Label::Programmer,
        Label::Artist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Manager => "MANAGER",
            Label::Designer => "DESIGNER",
            Label::Programmer => "PROGRAMMER",
            Label::Artist => "ARTIST",
            Label::Product => "PRODUCT",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a directed relationship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelType {
    /// Manager → Designer/Programmer/Artist
    Manage,
    /// Designer → Product
    Design,
    /// Programmer → Product
    Code,
    /// Artist → Product
    Draw,
}

impl RelType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelType::Manage => "MANAGE",
            RelType::Design => "DESIGN",
            RelType::Code => "CODE",
            RelType::Draw => "DRAW",
        }
    }

    /// Relationship a contributor of the given label uses to reach a product
    pub fn contribution_for(label: Label) -> Option<RelType> {
        match label {
            Label::Designer => Some(RelType::Design),
            Label::Programmer => Some(RelType::Code),
            Label::Artist => Some(RelType::Draw),
            Label::Manager | Label::Product => None,
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value stored on a node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum PropertyValue {
    Int(i64),
    Text(String),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(v) => Some(v),
            PropertyValue::Int(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

/// Attribute mapping of a node, ordered by key for stable snapshots
pub type Properties = BTreeMap<String, PropertyValue>;

/// A node in the graph: a labelled entity with attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub label: Label,
    pub properties: Properties,
}

impl Node {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            properties: Properties::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// An edge representing a relationship between two nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub rel_type: RelType,
}

/// Stable handle to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(pub(crate) NodeIndex);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

/// Stable handle to an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeRef(pub(crate) EdgeIndex);

impl EdgeRef {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

/// The organisational graph
///
/// Uses `StableGraph` so indices handed out as [`NodeRef`]/[`EdgeRef`] remain
/// consistent across clones, which is what copy-on-write transactions rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// The underlying stable graph (private to enforce encapsulation)
    inner: StableGraph<Node, Edge>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeRef {
        NodeRef(self.inner.add_node(node))
    }

    /// Add an edge between two nodes
    ///
    /// Returns `None` if either endpoint does not exist.
    pub fn add_edge(&mut self, from: NodeRef, to: NodeRef, edge: Edge) -> Option<EdgeRef> {
        if !self.inner.contains_node(from.0) || !self.inner.contains_node(to.0) {
            return None;
        }
        Some(EdgeRef(self.inner.add_edge(from.0, to.0, edge)))
    }

    /// Get a node by reference
    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        self.inner.node_weight(node.0)
    }

    /// Get an edge by reference
    pub fn edge(&self, edge: EdgeRef) -> Option<&Edge> {
        self.inner.edge_weight(edge.0)
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.inner
            .node_indices()
            .filter_map(|idx| self.inner.node_weight(idx).map(|n| (NodeRef(idx), n)))
    }

    /// Iterate over the nodes carrying `label`, in creation order
    pub fn nodes_with_label(&self, label: Label) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.nodes().filter(move |(_, n)| n.label == label)
    }

    /// Iterate over all edges as (edge, from, to, weight)
    pub fn edges(&self) -> impl Iterator<Item = (EdgeRef, NodeRef, NodeRef, &Edge)> {
        self.inner
            .edge_references()
            .map(|e| (EdgeRef(e.id()), NodeRef(e.source()), NodeRef(e.target()), e.weight()))
    }

    /// Edges touching `node` in the given direction, as (edge, other end, weight)
    ///
    /// `Direction::Incoming` yields edges pointing at `node` with their source;
    /// `Direction::Outgoing` yields edges leaving `node` with their target.
    pub fn edges_directed(
        &self,
        node: NodeRef,
        direction: Direction,
    ) -> impl Iterator<Item = (EdgeRef, NodeRef, &Edge)> {
        self.inner.edges_directed(node.0, direction).map(move |e| {
            let other = match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            };
            (EdgeRef(e.id()), NodeRef(other), e.weight())
        })
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
