//! Static graph description consumed by the layout simulation
//!
//! A `GraphModel` is built once (usually by [`crate::io::GraphReader`]) and is
//! read-only afterwards. Edges are resolved to node indices at construction, so
//! an edge naming an undeclared node can never reach the simulation.

use std::collections::HashMap;

use thiserror::Error;

/// Opaque node identifier, unique within a graph
pub type NodeId = String;

/// Errors raised while building a graph from a description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphFormatError {
    /// The first line is missing or is not `N M`
    #[error("line {line}: expected header `<node count> <edge count>`, found {found:?}")]
    BadHeader { line: usize, found: String },

    /// A declared count is not a non-negative integer
    #[error("line {line}: invalid {what} count {value:?}")]
    BadCount {
        line: usize,
        what: &'static str,
        value: String,
    },

    /// The description ended before all declared lines were read
    #[error("expected {expected} {what} line(s) but found only {found}")]
    MissingLines {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// An edge line does not hold exactly two node ids
    #[error("line {line}: expected edge `<a> <b>`, found {found:?}")]
    MalformedEdge { line: usize, found: String },

    /// A node line is blank
    #[error("line {line}: empty node id")]
    EmptyNodeId { line: usize },

    /// The same node id was declared twice
    #[error("duplicate node id {id:?}")]
    DuplicateNode { id: NodeId },

    /// An edge references a node that was not declared
    #[error("edge {source_id:?} -> {target_id:?} references unknown node {missing:?}")]
    UnknownNode {
        source_id: NodeId,
        target_id: NodeId,
        missing: NodeId,
    },

    /// Non-blank content after the declared node and edge lines
    #[error("line {line}: unexpected content after {nodes} node(s) and {edges} edge(s)")]
    TrailingContent {
        line: usize,
        nodes: usize,
        edges: usize,
    },
}

/// An undirected edge between two node indices of its `GraphModel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

/// Nodes and edges of the graph being laid out
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, usize>,
}

impl GraphModel {
    /// Build a graph from node ids and edges given as id pairs.
    ///
    /// Node order is kept: it fixes the order forces are summed in, which keeps
    /// runs with the same seed bit-for-bit reproducible.
    pub fn new<I, E, S>(nodes: I, edges: E) -> Result<Self, GraphFormatError>
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
        E: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let nodes: Vec<NodeId> = nodes.into_iter().map(Into::into).collect();

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, id) in nodes.iter().enumerate() {
            if index.insert(id.clone(), i).is_some() {
                return Err(GraphFormatError::DuplicateNode { id: id.clone() });
            }
        }

        let edges = edges
            .into_iter()
            .map(|(a, b)| {
                let (a, b) = (a.as_ref(), b.as_ref());
                let lookup = |id: &str| {
                    index
                        .get(id)
                        .copied()
                        .ok_or_else(|| GraphFormatError::UnknownNode {
                            source_id: a.to_string(),
                            target_id: b.to_string(),
                            missing: id.to_string(),
                        })
                };
                Ok(Edge {
                    source: lookup(a)?,
                    target: lookup(b)?,
                })
            })
            .collect::<Result<Vec<_>, GraphFormatError>>()?;

        Ok(Self {
            nodes,
            edges,
            index,
        })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of `id` in the node sequence
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Node id at `index`, if in range
    pub fn node(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }

    /// The endpoint ids of an edge of this graph
    pub fn edge_ids(&self, edge: &Edge) -> (&str, &str) {
        (&self.nodes[edge.source], &self.nodes[edge.target])
    }
}
