use crate::errors::Result;
use crate::graph::ir::Interchange;
use crate::pipeline::{Analysis, AnalysisStats, FileDiagnostic};
use serde::Serialize;
use std::io::Write;

/// `depgraph graph --format json` document.
#[derive(Debug, Serialize)]
pub struct GraphOutput<'a> {
    #[serde(flatten)]
    pub graph: Interchange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<&'a [FileDiagnostic]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<&'a AnalysisStats>,
}

impl<'a> GraphOutput<'a> {
    pub fn new(analysis: &'a Analysis, with_diagnostics: bool) -> Self {
        Self {
            graph: analysis.graph.to_interchange(),
            diagnostics: with_diagnostics.then_some(analysis.diagnostics.as_slice()),
            stats: with_diagnostics.then_some(&analysis.stats),
        }
    }
}

/// Write the interchange document, optionally with diagnostics and stats.
pub fn write_graph_json<W: Write>(
    writer: &mut W,
    analysis: &Analysis,
    with_diagnostics: bool,
) -> Result<()> {
    let output = GraphOutput::new(analysis, with_diagnostics);
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

/// Write any serializable value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}
