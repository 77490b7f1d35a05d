use crate::errors::Result;
use crate::graph::ir::DependencyGraph;
use crate::pipeline::Analysis;
use std::io::Write;

/// Write the graph as a node table followed by each node's dependencies.
pub fn write_graph_text<W: Write>(writer: &mut W, analysis: &Analysis) -> Result<()> {
    let graph = &analysis.graph;
    let stats = &analysis.stats;

    writeln!(writer, "Dependency Graph")?;
    writeln!(writer, "================")?;
    writeln!(writer)?;
    writeln!(writer, "Nodes:      {}", graph.node_count())?;
    writeln!(writer, "Edges:      {}", graph.edge_count())?;
    writeln!(writer, "Parsed:     {} files", stats.files_parsed)?;
    writeln!(writer, "Skipped:    {} files", stats.files_skipped)?;
    writeln!(
        writer,
        "Imports:    {} resolved, {} unresolved",
        stats.imports_resolved, stats.imports_unresolved
    )?;
    writeln!(writer)?;

    write_node_table(writer, graph)?;
    writeln!(writer)?;
    write_dependencies(writer, graph)?;

    if !analysis.diagnostics.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Diagnostics")?;
        writeln!(writer, "-----------")?;
        for d in &analysis.diagnostics {
            writeln!(writer, "  {}: {}", d.file.display(), d.message)?;
        }
    }

    Ok(())
}

fn write_node_table<W: Write>(writer: &mut W, graph: &DependencyGraph) -> Result<()> {
    writeln!(writer, "Modules")?;
    writeln!(writer, "-------")?;
    let width = graph.nodes().map(|n| n.name.len()).max().unwrap_or(0).max(6);
    writeln!(writer, "  {:<width$}  {:<8}  Path", "Module", "Kind")?;
    for node in graph.nodes() {
        writeln!(
            writer,
            "  {:<width$}  {:<8}  {}",
            node.name,
            node.kind,
            node.path.display()
        )?;
    }
    Ok(())
}

fn write_dependencies<W: Write>(writer: &mut W, graph: &DependencyGraph) -> Result<()> {
    writeln!(writer, "Dependencies")?;
    writeln!(writer, "------------")?;
    for node in graph.nodes() {
        let deps = graph.dependencies(&node.path);
        if deps.is_empty() {
            continue;
        }
        writeln!(writer, "  {}", node.name)?;
        for dep in deps {
            writeln!(writer, "    -> {}", dep.name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze, PipelineOptions};
    use crate::walk::MemoryTree;
    use std::path::Path;

    #[test]
    fn text_lists_nodes_and_dependencies() {
        let tree = MemoryTree::new()
            .with_file("/proj/shop/__init__.py", "")
            .with_file("/proj/shop/cart.py", "from .pricing import total\n")
            .with_file("/proj/shop/pricing.py", "");
        let analysis = analyze(Path::new("/proj"), &tree, &PipelineOptions::default()).unwrap();

        let mut out = Vec::new();
        write_graph_text(&mut out, &analysis).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Nodes:      3"));
        assert!(text.contains("shop.cart"));
        assert!(text.contains("package"));
        assert!(text.contains("  shop.cart\n    -> shop.pricing\n"));
        assert!(text.contains("  shop\n    -> shop.cart\n    -> shop.pricing\n"));
        assert!(!text.contains("Diagnostics"));
    }
}
