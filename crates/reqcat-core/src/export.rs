//! Export the dependency graph as DOT (Graphviz) or Mermaid flowchart.

use crate::graph::DependencyGraph;
use std::fmt::Write;
use std::path::Path;

/// Export format for graph visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Dot,
    Mermaid,
}

impl ExportFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "mermaid" | "mmd" => Some(Self::Mermaid),
            _ => None,
        }
    }
}

/// Export the graph as a DOT (Graphviz) string. Labels are shown relative to `root`.
pub fn export_dot(graph: &DependencyGraph, root: &Path) -> String {
    let mut out = String::new();
    writeln!(out, "digraph reqcat {{").unwrap();
    writeln!(out, "  rankdir=LR;").unwrap();
    writeln!(out, "  node [shape=box, fontsize=10];").unwrap();
    writeln!(out).unwrap();

    for (idx, node) in graph.nodes().iter().enumerate() {
        let style = if node.discovered {
            "style=filled, fillcolor=\"#e0ffe0\""
        } else {
            "style=dashed"
        };
        writeln!(
            out,
            "  n{} [{}, label=\"{}\"];",
            idx,
            style,
            escape_label(&node.id.display_relative(root))
        )
        .unwrap();
    }

    writeln!(out).unwrap();

    for (idx, node) in graph.nodes().iter().enumerate() {
        for dep in &node.dependencies {
            writeln!(out, "  n{} -> n{} [label=\"requires\"];", idx, dep).unwrap();
        }
    }

    writeln!(out, "}}").unwrap();
    out
}

/// Export the graph as a Mermaid flowchart string. Labels are shown relative to `root`.
pub fn export_mermaid(graph: &DependencyGraph, root: &Path) -> String {
    let mut out = String::new();
    writeln!(out, "flowchart LR").unwrap();

    for (idx, node) in graph.nodes().iter().enumerate() {
        let label = escape_label(&node.id.display_relative(root));
        if node.discovered {
            writeln!(out, "  n{}[\"{}\"]", idx, label).unwrap();
        } else {
            writeln!(out, "  n{}([\"{} (missing)\"])", idx, label).unwrap();
        }
    }

    for (idx, node) in graph.nodes().iter().enumerate() {
        for dep in &node.dependencies {
            writeln!(out, "  n{} -->|requires| n{}", idx, dep).unwrap();
        }
    }

    out
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Export the graph in the specified format.
pub fn export(graph: &DependencyGraph, root: &Path, format: ExportFormat) -> String {
    match format {
        ExportFormat::Dot => export_dot(graph, root),
        ExportFormat::Mermaid => export_mermaid(graph, root),
    }
}
