//! Degree centrality

use crate::algorithm::{to_rows, AlgorithmCategory, GraphAlgorithm};
use crate::error::Result;
use crate::params::{AlgorithmParameter, ResolvedParams};
use cnm_core::{Adjacency, GraphData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeRow {
    pub node_id: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub centrality: f64,
}

/// Share of the other nodes a node is directly linked with
///
/// Directed degree is `in + out`; undirected degree counts each distinct
/// neighbor once. Normalized scores divide by `n - 1`, and a lone node
/// scores 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeCentrality;

impl DegreeCentrality {
    pub const NAME: &'static str = "Degree Centrality";

    pub fn new() -> Self {
        Self
    }
}

impl GraphAlgorithm for DegreeCentrality {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::RelationshipAnalysis
    }

    fn description(&self) -> &'static str {
        "Ranks concepts by how many other concepts they link with directly"
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("normalize", "Divide degrees by n - 1", true),
            AlgorithmParameter::new("directed", "Count incoming and outgoing links separately", true),
        ]
    }

    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>> {
        let normalize = params.bool("normalize")?;
        let directed = params.bool("directed")?;

        let outgoing = Adjacency::build(graph, directed, |_| true);
        let incoming = outgoing.transposed();
        let live: Vec<usize> = (0..outgoing.len())
            .filter(|&i| outgoing.is_canonical(i))
            .collect();
        let n = live.len();

        let mut rows: Vec<DegreeRow> = live
            .iter()
            .map(|&i| {
                let out_degree = outgoing.neighbors(i).len();
                let in_degree = incoming.neighbors(i).len();
                let degree = if directed { in_degree + out_degree } else { out_degree };
                let centrality = match (normalize, n) {
                    (false, _) => degree as f64,
                    (true, 0..=1) => 1.0,
                    (true, _) => degree as f64 / (n - 1) as f64,
                };
                DegreeRow {
                    node_id: outgoing.id(i).to_string(),
                    in_degree,
                    out_degree,
                    centrality,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));

        to_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamValue, Params};
    use cnm_core::{Category, Link, LinkType, Node, NodeType};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> GraphData {
        GraphData::from_parts(
            ids.iter()
                .map(|id| Node::new(*id, NodeType::Entity(Category::Phenomenon), *id))
                .collect(),
            edges
                .iter()
                .map(|(s, t)| Link::new(*s, *t, LinkType::Uses))
                .collect(),
        )
    }

    fn degrees(graph: &GraphData, params: &[(&str, bool)]) -> Vec<DegreeRow> {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
            .collect();
        DegreeCentrality
            .execute(graph, &params)
            .unwrap()
            .rows()
            .unwrap()
    }

    fn row<'a>(rows: &'a [DegreeRow], id: &str) -> &'a DegreeRow {
        rows.iter().find(|r| r.node_id == id).unwrap()
    }

    #[test]
    fn test_star_hub_first() {
        let g = graph(&["hub", "a", "b", "c"], &[("hub", "a"), ("hub", "b"), ("hub", "c")]);
        let rows = degrees(&g, &[]);

        assert_eq!(rows[0].node_id, "hub");
        assert_eq!(rows[0].out_degree, 3);
        assert_eq!(rows[0].in_degree, 0);
        assert_eq!(rows[0].centrality, 1.0);
        assert_eq!(row(&rows, "a").centrality, 1.0 / 3.0);
    }

    #[test]
    fn test_mutual_links_directed_and_undirected() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);

        let directed = degrees(&g, &[]);
        assert_eq!(row(&directed, "a").centrality, 2.0);

        let undirected = degrees(&g, &[("directed", false)]);
        assert_eq!(row(&undirected, "a").centrality, 1.0);
        assert_eq!(row(&undirected, "a").in_degree, 1);
    }

    #[test]
    fn test_raw_counts_and_edge_cases() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("c", "ghost")]);
        let raw = degrees(&g, &[("normalize", false)]);
        assert_eq!(row(&raw, "a").centrality, 2.0);
        assert_eq!(row(&raw, "c").centrality, 1.0);

        assert!(degrees(&GraphData::new(), &[]).is_empty());
        assert_eq!(degrees(&graph(&["solo"], &[]), &[])[0].centrality, 1.0);
    }
}
