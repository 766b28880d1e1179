//! Output formatting utilities

use cnm_analysis::AlgorithmResult;
use cnm_core::{GraphData, Node};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Pretty JSON for any serializable value
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// One line per node: id, type, label
pub fn node_line(node: &Node) -> String {
    let value = node
        .value
        .map(|v| format!(" value={:.4}", v))
        .unwrap_or_default();
    format!("  {} [{}] {}{}", node.id, node.node_type, node.label, value)
}

pub fn graph_table(graph: &GraphData) -> String {
    let mut out = format!("{} nodes, {} links\n", graph.node_count(), graph.link_count());
    for node in &graph.nodes {
        out.push_str(&node_line(node));
        out.push('\n');
    }
    if !graph.links.is_empty() {
        out.push_str("Links:\n");
        for link in &graph.links {
            out.push_str(&format!("  {} -[{}]-> {}\n", link.source, link.link_type, link.target));
        }
    }
    out
}

/// Header line plus one compact JSON row per line
pub fn result_table(result: &AlgorithmResult, limit: Option<usize>) -> String {
    let mut out = format!(
        "{} ({}): {} rows in {:.2}ms\n",
        result.algorithm_name,
        result.metadata.category,
        result.len(),
        result.metadata.execution_time_ms
    );
    let shown = limit.unwrap_or(result.len());
    for row in result.data.iter().take(shown) {
        out.push_str("  ");
        out.push_str(&row.to_string());
        out.push('\n');
    }
    if shown < result.len() {
        out.push_str(&format!("  ... {} more\n", result.len() - shown));
    }
    out
}
