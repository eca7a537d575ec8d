// ABOUTME: GraphML rendering of the application dependency graph.
// ABOUTME: Diagnostic output only; rendering never changes the ordering.

use std::fmt::Write;
use std::path::Path;

use super::graph::DependencyGraph;
use crate::error::Result;
use crate::types::AppName;

/// Render the graph as GraphML, labelling nodes with `label`.
pub fn render_graphml<F>(graph: &DependencyGraph, label: F) -> String
where
    F: Fn(&AppName) -> String,
{
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    out.push_str("  <graph edgedefault=\"directed\">\n");

    for node in graph.nodes() {
        let _ = writeln!(
            out,
            "    <node id=\"{}\"/>",
            escape(&label(graph.name(node)))
        );
    }
    for node in graph.nodes() {
        for dependency in graph.dependencies(node) {
            let _ = writeln!(
                out,
                "    <edge source=\"{}\" target=\"{}\"/>",
                escape(&label(graph.name(node))),
                escape(&label(graph.name(dependency)))
            );
        }
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

/// Write the graph, labelled by application name, to `path`.
pub fn dump_graph(graph: &DependencyGraph, path: &Path) -> Result<()> {
    tracing::info!(path = %path.display(), "dumping apps' dependencies graph");
    std::fs::write(path, render_graphml(graph, AppName::to_string))?;
    Ok(())
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
