use crate::errors::Result;
use crate::graph::ir::{DependencyGraph, EdgeKind};
use crate::index::ModuleKind;
use std::io::Write;

/// Write the dependency graph in Graphviz DOT format.
///
/// Nodes are keyed by path and labelled with their dotted name. Packages are
/// boxes, modules ellipses; package-child edges are dashed.
pub fn write_dot<W: Write>(writer: &mut W, graph: &DependencyGraph) -> Result<()> {
    writeln!(writer, "digraph dependencies {{")?;
    writeln!(writer, "    rankdir=LR;")?;
    writeln!(writer, "    node [style=filled];")?;
    writeln!(writer)?;

    for node in graph.nodes() {
        let (shape, fill) = match node.kind {
            ModuleKind::Package => ("box", "lightblue"),
            ModuleKind::Module => ("ellipse", "lightgreen"),
        };
        writeln!(
            writer,
            "    \"{}\" [label=\"{}\", shape={}, fillcolor={}];",
            escape(&node.path.to_string_lossy()),
            escape(&node.name),
            shape,
            fill
        )?;
    }
    writeln!(writer)?;

    for (source, target, edge) in graph.edges() {
        let style = match edge.kind {
            EdgeKind::Import => "",
            EdgeKind::PackageChild => " [style=dashed]",
        };
        writeln!(
            writer,
            "    \"{}\" -> \"{}\"{};",
            escape(&source.path.to_string_lossy()),
            escape(&target.path.to_string_lossy()),
            style
        )?;
    }

    writeln!(writer, "}}")?;
    Ok(())
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
