//! Betweenness centrality

use crate::algorithm::{to_rows, AlgorithmCategory, GraphAlgorithm};
use crate::error::Result;
use crate::params::{AlgorithmParameter, ResolvedParams};
use cnm_core::{Adjacency, GraphData};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const UNREACHED: usize = usize::MAX;

/// One scored node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralityRow {
    pub node_id: String,
    pub betweenness: f64,
}

/// How often each node lies on shortest paths between other nodes
///
/// The default mode runs one breadth-first search per source and credits a
/// node once per source whenever it precedes another node on any shortest
/// path from that source; tied paths are not weighted. Normalization divides
/// by `(n-1)(n-2)/2` for both directed and undirected graphs. With `exact`
/// set, Brandes' dependency accumulation is used instead and normalization
/// uses `(n-1)(n-2)/2` undirected and `(n-1)(n-2)` directed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweennessCentrality;

impl BetweennessCentrality {
    pub const NAME: &'static str = "Betweenness Centrality";

    pub fn new() -> Self {
        Self
    }
}

impl GraphAlgorithm for BetweennessCentrality {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::RelationshipAnalysis
    }

    fn description(&self) -> &'static str {
        "Ranks nodes by how often they lie on shortest paths between other nodes"
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("normalize", "Scale scores by the number of node pairs", true),
            AlgorithmParameter::new("directed", "Follow links from source to target only", false),
            AlgorithmParameter::new(
                "exact",
                "Use exact fractional path accounting instead of per-source counting",
                false,
            ),
        ]
    }

    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>> {
        let normalize = params.bool("normalize")?;
        let directed = params.bool("directed")?;
        let exact = params.bool("exact")?;

        let adjacency = Adjacency::build(graph, directed, |_| true);
        let mut scores = if exact {
            brandes_scores(&adjacency, directed)
        } else {
            approximate_scores(&adjacency)
        };

        let n = (0..adjacency.len())
            .filter(|&i| adjacency.is_canonical(i))
            .count();
        if normalize && n > 2 {
            let pairs = ((n - 1) * (n - 2)) as f64;
            let scale = if exact && directed { pairs } else { pairs / 2.0 };
            for score in &mut scores {
                *score /= scale;
            }
        }

        let mut rows: Vec<CentralityRow> = (0..adjacency.len())
            .filter(|&i| adjacency.is_canonical(i))
            .map(|i| CentralityRow {
                node_id: adjacency.id(i).to_string(),
                betweenness: scores[i],
            })
            .collect();
        // Stable: equal scores keep node order
        rows.sort_by(|a, b| b.betweenness.total_cmp(&a.betweenness));

        to_rows(&rows)
    }
}

/// Per-source counting over the breadth-first shortest-path structure
fn approximate_scores(adjacency: &Adjacency<'_>) -> Vec<f64> {
    let n = adjacency.len();
    let mut scores = vec![0.0; n];
    let mut dist = vec![UNREACHED; n];
    let mut on_path = vec![false; n];
    let mut queue = VecDeque::new();

    for source in (0..n).filter(|&i| adjacency.is_canonical(i)) {
        dist.fill(UNREACHED);
        on_path.fill(false);
        dist[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let next = dist[v] + 1;
            for &w in adjacency.neighbors(v) {
                if dist[w] == UNREACHED {
                    dist[w] = next;
                    queue.push_back(w);
                } else if dist[w] != next {
                    continue;
                }
                // v precedes w on a shortest path from source, first or tied
                if v != source {
                    on_path[v] = true;
                }
            }
        }

        for (score, &hit) in scores.iter_mut().zip(&on_path) {
            if hit {
                *score += 1.0;
            }
        }
    }

    scores
}

/// Brandes' dependency accumulation
fn brandes_scores(adjacency: &Adjacency<'_>, directed: bool) -> Vec<f64> {
    let n = adjacency.len();
    let mut scores = vec![0.0; n];
    let mut dist = vec![UNREACHED; n];
    let mut sigma = vec![0.0f64; n];
    let mut delta = vec![0.0f64; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut stack = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    for source in (0..n).filter(|&i| adjacency.is_canonical(i)) {
        dist.fill(UNREACHED);
        sigma.fill(0.0);
        delta.fill(0.0);
        preds.iter_mut().for_each(Vec::clear);
        dist[source] = 0;
        sigma[source] = 1.0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in adjacency.neighbors(v) {
                if dist[w] == UNREACHED {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    if !directed {
        // Each undirected pair is counted from both ends
        for score in &mut scores {
            *score /= 2.0;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamValue, Params};
    use cnm_core::{Category, Link, LinkType, Node, NodeType};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> GraphData {
        GraphData::from_parts(
            ids.iter()
                .map(|id| Node::new(*id, NodeType::Entity(Category::Method), *id))
                .collect(),
            edges
                .iter()
                .map(|(s, t)| Link::new(*s, *t, LinkType::References))
                .collect(),
        )
    }

    fn scores(graph: &GraphData, params: &[(&str, bool)]) -> Vec<CentralityRow> {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
            .collect();
        BetweennessCentrality
            .execute(graph, &params)
            .unwrap()
            .rows()
            .unwrap()
    }

    /// Ring of `n` nodes plus one pseudo-random chord per node
    fn ring_with_chords(n: usize) -> GraphData {
        let ids: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut links = Vec::with_capacity(2 * n);
        for i in 0..n {
            links.push(Link::new(&ids[i], &ids[(i + 1) % n], LinkType::References));
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let j = (state >> 33) as usize % n;
            links.push(Link::new(&ids[i], &ids[j], LinkType::RelatesTo));
        }
        let nodes = ids
            .iter()
            .map(|id| Node::new(id.clone(), NodeType::Entity(Category::Theory), id.clone()))
            .collect();
        GraphData::from_parts(nodes, links)
    }

    fn score_of(rows: &[CentralityRow], id: &str) -> f64 {
        rows.iter().find(|r| r.node_id == id).unwrap().betweenness
    }

    #[test]
    fn test_path_graph_ranks_middle_first() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let rows = scores(&g, &[]);

        assert_eq!(rows[0].node_id, "B");
        assert!(score_of(&rows, "B") > score_of(&rows, "A"));
        assert!(score_of(&rows, "B") > score_of(&rows, "C"));
        // Each endpoint pair is credited from both sources
        assert_eq!(score_of(&rows, "B"), 2.0);
        assert_eq!(score_of(&rows, "A"), 0.0);
    }

    #[test]
    fn test_exact_path_graph() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let rows = scores(&g, &[("exact", true)]);
        assert_eq!(score_of(&rows, "B"), 1.0);
    }

    #[test]
    fn test_directed_normalization_modes() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);

        let approx = scores(&g, &[("directed", true)]);
        assert_eq!(score_of(&approx, "B"), 1.0);

        let exact = scores(&g, &[("directed", true), ("exact", true)]);
        assert_eq!(score_of(&exact, "B"), 0.5);
    }

    #[test]
    fn test_tied_paths_counted_once_per_source() {
        // 4-cycle: A-B-D and A-C-D tie
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let approx = scores(&g, &[("normalize", false)]);
        let exact = scores(&g, &[("normalize", false), ("exact", true)]);

        for id in ["A", "B", "C", "D"] {
            assert_eq!(score_of(&approx, id), 2.0);
            assert_eq!(score_of(&exact, id), 0.5);
        }
    }

    #[test]
    fn test_small_and_dangling_graphs() {
        assert!(scores(&GraphData::new(), &[]).is_empty());

        let g = graph(&["A", "B"], &[("A", "B"), ("B", "ghost")]);
        let rows = scores(&g, &[]);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.betweenness == 0.0));
    }

    #[test]
    fn test_rows_sorted_descending() {
        let g = graph(
            &["hub", "a", "b", "c", "d"],
            &[("hub", "a"), ("hub", "b"), ("hub", "c"), ("c", "d")],
        );
        let rows = scores(&g, &[]);

        assert_eq!(rows[0].node_id, "hub");
        assert_eq!(rows[1].node_id, "c");
        assert!(rows.windows(2).all(|w| w[0].betweenness >= w[1].betweenness));
    }

    #[test]
    fn test_rejects_non_boolean_flag() {
        let g = graph(&["A"], &[]);
        let params = Params::from([("normalize".to_string(), ParamValue::from(1.0))]);
        assert!(BetweennessCentrality.execute(&g, &params).is_err());
    }

    #[test]
    fn test_thousand_node_graph() {
        let g = ring_with_chords(1_000);
        assert_eq!(g.link_count(), 2_000);

        for exact in [false, true] {
            let params = Params::from([("exact".to_string(), ParamValue::from(exact))]);
            let result = BetweennessCentrality.execute(&g, &params).unwrap();
            let rows: Vec<CentralityRow> = result.rows().unwrap();

            assert_eq!(rows.len(), 1_000);
            assert!(rows
                .iter()
                .all(|r| r.betweenness.is_finite() && (0.0..=1.0).contains(&r.betweenness)));
            assert!(rows[0].betweenness > 0.0);
            if cfg!(not(debug_assertions)) {
                assert!(result.metadata.execution_time_ms < 1_000.0);
            }
        }
    }
}
