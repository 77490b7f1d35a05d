use crate::index::ModuleKind;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Unique identifier for a graph node
pub type NodeId = petgraph::graph::NodeIndex;

/// The dependency graph
pub type DepGraph = DiGraph<GraphNode, GraphEdge>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub kind: ModuleKind,
    /// Module file, or the marker file for packages
    pub path: PathBuf,
    /// Dotted name (e.g. "pkg.api.handler")
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Backed by at least one import statement
    Import,
    /// A package depending on one of its direct children
    PackageChild,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
}

/// Directed module graph with a path → node lookup table.
///
/// Nodes are identified by canonical file path; edges are deduplicated and
/// always connect two nodes of the graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DepGraph,
    node_map: HashMap<PathBuf, NodeId>,
}

impl DependencyGraph {
    pub(crate) fn from_parts(graph: DepGraph, node_map: HashMap<PathBuf, NodeId>) -> Self {
        Self { graph, node_map }
    }

    /// The underlying petgraph graph, for traversal by downstream tools.
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_id(&self, path: &Path) -> Option<NodeId> {
        self.node_map.get(path).copied()
    }

    pub fn node(&self, path: &Path) -> Option<&GraphNode> {
        self.node_id(path).map(|id| &self.graph[id])
    }

    /// Nodes in insertion (path) order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// Edges in insertion order as `(source, target, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &GraphEdge)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    pub fn contains_edge(&self, from: &Path, to: &Path) -> bool {
        match (self.node_id(from), self.node_id(to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Direct dependencies of a node, ordered by node insertion order.
    pub fn dependencies(&self, path: &Path) -> Vec<&GraphNode> {
        let Some(id) = self.node_id(path) else {
            return Vec::new();
        };
        let mut targets: Vec<NodeId> = self
            .graph
            .edges_directed(id, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        targets.sort();
        targets.into_iter().map(|t| &self.graph[t]).collect()
    }

    /// Minimal node/edge lists for renderers and exporters.
    pub fn to_interchange(&self) -> Interchange {
        Interchange {
            nodes: self
                .nodes()
                .map(|n| NodeRecord {
                    id: n.path.to_string_lossy().into_owned(),
                    label: n.name.clone(),
                    kind: n.kind,
                })
                .collect(),
            edges: self
                .edges()
                .map(|(s, t, _)| EdgeRecord {
                    source: s.path.to_string_lossy().into_owned(),
                    target: t.path.to_string_lossy().into_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interchange {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub kind: ModuleKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
}
