pub mod builder;
pub mod ir;

pub use builder::{build_graph, GraphBuilder};
pub use ir::{DependencyGraph, EdgeKind, GraphEdge, GraphNode, Interchange};
