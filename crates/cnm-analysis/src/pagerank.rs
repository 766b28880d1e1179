//! PageRank importance

use crate::algorithm::{to_rows, AlgorithmCategory, GraphAlgorithm};
use crate::error::Result;
use crate::params::{positive, positive_integer, unit_fraction, AlgorithmParameter, ResolvedParams};
use cnm_core::{Adjacency, GraphData};
use serde::{Deserialize, Serialize};

/// One scored node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRankRow {
    pub node_id: String,
    pub pagerank: f64,
}

/// Random-surfer importance over the link graph
///
/// Power iteration of
/// ```text
/// PR(v) = (1-d)/N + d * (Σ PR(u)/out(u) + D/N)
///                       u→v
/// ```
/// where `D` is the mass held by nodes without outgoing links. Scores sum to
/// 1. Iteration stops once the L1 change falls below `N * tolerance`; when
/// `maxIterations` runs out first, the last iterate is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRank;

impl PageRank {
    pub const NAME: &'static str = "PageRank";

    pub fn new() -> Self {
        Self
    }
}

impl GraphAlgorithm for PageRank {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::RelationshipAnalysis
    }

    fn description(&self) -> &'static str {
        "Ranks concepts by the importance of the concepts linking to them"
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("damping", "Probability of following a link", 0.85)
                .with_validator(unit_fraction),
            AlgorithmParameter::new("maxIterations", "Power iteration cap", 100.0)
                .with_validator(positive_integer),
            AlgorithmParameter::new("tolerance", "Per-node convergence tolerance", 1e-6)
                .with_validator(positive),
            AlgorithmParameter::new("directed", "Follow links from source to target only", true),
        ]
    }

    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>> {
        let damping = params.number("damping")?;
        let max_iterations = params.count("maxIterations")?;
        let tolerance = params.number("tolerance")?;
        let directed = params.bool("directed")?;

        let outgoing = Adjacency::build(graph, directed, |_| true);
        let result = power_iteration(&outgoing, damping, max_iterations, tolerance);
        if result.converged {
            tracing::debug!("PageRank converged in {} iterations", result.iterations);
        } else {
            tracing::warn!(
                "PageRank stopped after {} iterations without converging",
                result.iterations
            );
        }

        let mut rows: Vec<PageRankRow> = (0..outgoing.len())
            .filter(|&i| outgoing.is_canonical(i))
            .map(|i| PageRankRow {
                node_id: outgoing.id(i).to_string(),
                pagerank: result.scores[i],
            })
            .collect();
        rows.sort_by(|a, b| b.pagerank.total_cmp(&a.pagerank));

        to_rows(&rows)
    }
}

struct Iteration {
    scores: Vec<f64>,
    iterations: usize,
    converged: bool,
}

fn power_iteration(
    outgoing: &Adjacency<'_>,
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
) -> Iteration {
    let len = outgoing.len();
    let live: Vec<usize> = (0..len).filter(|&i| outgoing.is_canonical(i)).collect();
    let mut scores = vec![0.0_f64; len];
    if live.is_empty() {
        return Iteration {
            scores,
            iterations: 0,
            converged: true,
        };
    }

    let incoming = outgoing.transposed();
    let n = live.len() as f64;
    let uniform = 1.0 / n;
    for &i in &live {
        scores[i] = uniform;
    }
    let mut next = vec![0.0_f64; len];

    for iteration in 1..=max_iterations {
        let dangling: f64 = live
            .iter()
            .filter(|&&i| outgoing.neighbors(i).is_empty())
            .map(|&i| scores[i])
            .sum();
        let base = ((1.0 - damping) + damping * dangling) * uniform;

        let mut delta = 0.0_f64;
        for &v in &live {
            // Every u here has at least the edge u -> v
            let inbound: f64 = incoming
                .neighbors(v)
                .iter()
                .map(|&u| scores[u] / outgoing.neighbors(u).len() as f64)
                .sum();
            next[v] = base + damping * inbound;
            delta += (next[v] - scores[v]).abs();
        }
        std::mem::swap(&mut scores, &mut next);

        if delta < n * tolerance {
            return Iteration {
                scores,
                iterations: iteration,
                converged: true,
            };
        }
    }

    Iteration {
        scores,
        iterations: max_iterations,
        converged: false,
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
                .map(|id| Node::new(*id, NodeType::Entity(Category::Mechanism), *id))
                .collect(),
            edges
                .iter()
                .map(|(s, t)| Link::new(*s, *t, LinkType::References))
                .collect(),
        )
    }

    fn ranks(graph: &GraphData, params: Params) -> Vec<PageRankRow> {
        PageRank.execute(graph, &params).unwrap().rows().unwrap()
    }

    fn rank_of(rows: &[PageRankRow], id: &str) -> f64 {
        rows.iter().find(|r| r.node_id == id).unwrap().pagerank
    }

    fn total(rows: &[PageRankRow]) -> f64 {
        rows.iter().map(|r| r.pagerank).sum()
    }

    #[test]
    fn test_linear_chain_accumulates_downstream() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let rows = ranks(&g, Params::new());

        assert_eq!(rows[0].node_id, "C");
        assert!(rank_of(&rows, "C") > rank_of(&rows, "B"));
        assert!(rank_of(&rows, "B") > rank_of(&rows, "A"));
        assert!((total(&rows) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_star_targets_share_rank() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("A", "D")]);
        let rows = ranks(&g, Params::new());

        assert!((rank_of(&rows, "B") - rank_of(&rows, "C")).abs() < 1e-12);
        assert!((rank_of(&rows, "C") - rank_of(&rows, "D")).abs() < 1e-12);
        assert!(rank_of(&rows, "B") > rank_of(&rows, "A"));
        assert_eq!(rows[3].node_id, "A");
    }

    #[test]
    fn test_cycle_is_uniform() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        for row in ranks(&g, Params::new()) {
            assert!((row.pagerank - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_undirected_view_is_symmetric() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let params = Params::from([("directed".to_string(), ParamValue::from(false))]);
        let rows = ranks(&g, params);

        assert_eq!(rows[0].node_id, "B");
        assert!((rank_of(&rows, "A") - rank_of(&rows, "C")).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_cap_still_returns_distribution() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let params = Params::from([("maxIterations".to_string(), ParamValue::from(1.0))]);
        let rows = ranks(&g, params);

        assert_eq!(rows.len(), 3);
        assert!((total(&rows) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_single_and_dangling() {
        assert!(ranks(&GraphData::new(), Params::new()).is_empty());

        let single = graph(&["A"], &[]);
        assert_eq!(rank_of(&ranks(&single, Params::new()), "A"), 1.0);

        let dangling = graph(&["A", "B"], &[("A", "ghost")]);
        let rows = ranks(&dangling, Params::new());
        assert!((rank_of(&rows, "A") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_damping_must_be_below_one() {
        let g = graph(&["A"], &[]);
        let params = Params::from([("damping".to_string(), ParamValue::from(1.0))]);
        assert!(PageRank.execute(&g, &params).is_err());
    }
}
