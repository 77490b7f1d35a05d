use crate::graph::ir::{DepGraph, DependencyGraph, EdgeKind, GraphEdge, GraphNode, NodeId};
use crate::index::{ModuleId, ModuleIndex, ModuleKind};
use crate::resolve::FileResolution;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Builds a DependencyGraph over a fixed index with edge deduplication.
///
/// Every index entry becomes a node up front, in index order, so node
/// handles line up with module handles and no edge can dangle.
pub struct GraphBuilder<'i> {
    index: &'i ModuleIndex,
    graph: DepGraph,
    nodes: Vec<NodeId>,
}

impl<'i> GraphBuilder<'i> {
    pub fn new(index: &'i ModuleIndex) -> Self {
        let mut graph = DepGraph::with_capacity(index.len(), index.len() * 2);
        let nodes = index
            .iter()
            .map(|(_, entry)| {
                graph.add_node(GraphNode {
                    kind: entry.kind,
                    path: entry.path.clone(),
                    name: entry.name.clone(),
                })
            })
            .collect();
        Self {
            index,
            graph,
            nodes,
        }
    }

    /// Add one edge unless it is a self-loop or already present.
    pub fn add_edge(&mut self, from: ModuleId, to: ModuleId, kind: EdgeKind) {
        if from == to {
            tracing::trace!("dropping self-import of {}", self.index.entry(from).name);
            return;
        }
        let (source, target) = (self.nodes[from.index()], self.nodes[to.index()]);
        if self.graph.find_edge(source, target).is_none() {
            self.graph.add_edge(source, target, GraphEdge { kind });
        }
    }

    /// Add an import edge between two paths, ignoring paths outside the index.
    pub fn add_path_edge(&mut self, from: &Path, to: &Path) {
        match (self.index.lookup_path(from), self.index.lookup_path(to)) {
            (Some(a), Some(b)) => self.add_edge(a, b, EdgeKind::Import),
            _ => tracing::warn!(
                "ignoring edge {} -> {}: endpoint not indexed",
                from.display(),
                to.display()
            ),
        }
    }

    /// Add the import edges of one file.
    pub fn add_resolution(&mut self, importer: ModuleId, resolution: &FileResolution) {
        for &target in &resolution.targets {
            self.add_edge(importer, target, EdgeKind::Import);
        }
    }

    /// Link a package to every direct child module and subpackage.
    pub fn add_package_children(&mut self, package: ModuleId) {
        let Some(dir) = self.index.entry(package).package_dir() else {
            return;
        };
        for &child in self.index.children_of(dir) {
            self.add_edge(package, child, EdgeKind::PackageChild);
        }
    }

    /// Consume the builder and return the built graph.
    pub fn build(self) -> DependencyGraph {
        let node_map: HashMap<PathBuf, NodeId> = self
            .graph
            .node_indices()
            .map(|i| (self.graph[i].path.clone(), i))
            .collect();
        DependencyGraph::from_parts(self.graph, node_map)
    }
}

/// Assemble the final graph: import edges in the given order, then the
/// package-child edges of every package in index order.
pub fn build_graph(index: &ModuleIndex, resolutions: &[(ModuleId, FileResolution)]) -> DependencyGraph {
    let mut builder = GraphBuilder::new(index);
    for (importer, resolution) in resolutions {
        builder.add_resolution(*importer, resolution);
    }
    for (id, entry) in index.iter() {
        if entry.kind == ModuleKind::Package {
            builder.add_package_children(id);
        }
    }
    let graph = builder.build();
    tracing::info!(
        "built graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

/// Path-keyed variant of [`build_graph`]; unknown paths are dropped.
pub fn build_graph_from_paths(index: &ModuleIndex, resolutions: &[(PathBuf, Vec<PathBuf>)]) -> DependencyGraph {
    let mut builder = GraphBuilder::new(index);
    for (importer, targets) in resolutions {
        for target in targets {
            builder.add_path_edge(importer, target);
        }
    }
    for (id, entry) in index.iter() {
        if entry.kind == ModuleKind::Package {
            builder.add_package_children(id);
        }
    }
    builder.build()
}
