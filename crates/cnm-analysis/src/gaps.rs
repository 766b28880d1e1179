//! Research gap detection between categories

use crate::algorithm::{to_rows, AlgorithmCategory, GraphAlgorithm};
use crate::error::Result;
use crate::params::{non_negative, positive_integer, AlgorithmParameter, ResolvedParams};
use cnm_core::{Adjacency, Category, GraphData};
use serde::{Deserialize, Serialize};

/// A missing link worth investigating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRow {
    pub source: String,
    pub target: String,
    pub source_category: Category,
    pub target_category: Category,
    /// Ids both endpoints link to
    pub shared_successors: Vec<String>,
    /// Overlap of the sections mentioning either endpoint, 0 to 1
    pub cooccurrence: f64,
    pub bridge_bonus: f64,
    pub strength: f64,
}

/// Bonus for pairs spanning foundations and applications
pub fn bridge_bonus(a: Category, b: Category) -> f64 {
    use Category::*;
    match (a, b) {
        (Theory, Application) | (Application, Theory) => 1.5,
        (Material, Application) | (Application, Material) => 1.0,
        _ => 0.0,
    }
}

/// Scores unlinked cross-category node pairs
///
/// Strength is `2 * shared successors + w * co-occurrence + bridge bonus`.
/// Co-occurrence is the Jaccard overlap of the nodes linking to each
/// endpoint, so two concepts mentioned by the same sections score 1. Overview
/// nodes are skipped, and the source of each pair is the node whose category
/// comes first in [`Category::ORDER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResearchGapDetector;

impl ResearchGapDetector {
    pub const NAME: &'static str = "Research Gap Detector";

    pub fn new() -> Self {
        Self
    }
}

impl GraphAlgorithm for ResearchGapDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::GapDetection
    }

    fn description(&self) -> &'static str {
        "Finds unlinked pairs of concepts in different categories that share successors or mentions"
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("minStrength", "Keep pairs scoring above this", 1.0)
                .with_validator(non_negative),
            AlgorithmParameter::new("maxResults", "Maximum rows returned", 50.0)
                .with_validator(positive_integer),
            AlgorithmParameter::new(
                "cooccurrenceWeight",
                "Weight of the co-mention overlap in the score",
                1.0,
            )
            .with_validator(non_negative),
            AlgorithmParameter::new(
                "includeHierarchy",
                "Count categorizes links as successors",
                false,
            ),
        ]
    }

    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>> {
        let min_strength = params.number("minStrength")?;
        let max_results = params.count("maxResults")?;
        let cooccurrence_weight = params.number("cooccurrenceWeight")?;
        let include_hierarchy = params.bool("includeHierarchy")?;

        let successors = Adjacency::build(graph, true, |link| {
            include_hierarchy || !link.link_type.is_hierarchy()
        });
        let mentions = successors.transposed();
        let linked = Adjacency::undirected(graph);

        let candidates: Vec<usize> = (0..graph.nodes.len())
            .filter(|&i| linked.is_canonical(i) && !graph.nodes[i].node_type.is_overview())
            .collect();

        let mut rows = Vec::new();
        for (k, &u) in candidates.iter().enumerate() {
            for &v in &candidates[k + 1..] {
                let (cu, cv) = (graph.nodes[u].category(), graph.nodes[v].category());
                if cu == cv || linked.neighbors(u).binary_search(&v).is_ok() {
                    continue;
                }
                let (source, target) = if cu.rank() <= cv.rank() { (u, v) } else { (v, u) };

                let shared = intersect(successors.neighbors(source), successors.neighbors(target));
                let cooccurrence = jaccard(mentions.neighbors(source), mentions.neighbors(target));
                let bonus = bridge_bonus(cu, cv);
                let strength =
                    2.0 * shared.len() as f64 + cooccurrence_weight * cooccurrence + bonus;
                if strength <= min_strength {
                    continue;
                }

                rows.push(GapRow {
                    source: graph.nodes[source].id.clone(),
                    target: graph.nodes[target].id.clone(),
                    source_category: graph.nodes[source].category(),
                    target_category: graph.nodes[target].category(),
                    shared_successors: shared.iter().map(|&i| successors.id(i).to_string()).collect(),
                    cooccurrence,
                    bridge_bonus: bonus,
                    strength,
                });
            }
        }

        let found = rows.len();
        rows.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        rows.truncate(max_results);
        tracing::debug!(
            "Scored {} gaps over {} candidates, kept {}",
            found,
            candidates.len(),
            rows.len()
        );

        to_rows(&rows)
    }
}

/// Intersection of two sorted index lists
fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Jaccard similarity of two sorted index lists; 0 when both are empty
fn jaccard(a: &[usize], b: &[usize]) -> f64 {
    let shared = intersect(a, b).len();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamValue, Params};
    use cnm_core::{Link, LinkType, Node, NodeType};

    fn entity(id: &str, category: Category) -> Node {
        Node::new(id, NodeType::Entity(category), id)
    }

    /// graphene and sensing share two successors; theory links nothing
    fn create_test_graph() -> GraphData {
        GraphData::from_parts(
            vec![
                entity("graphene", Category::Material),
                entity("sensing", Category::Application),
                entity("quantum", Category::Theory),
                entity("cvd", Category::Method),
                entity("doping", Category::Mechanism),
                Node::new("materials", NodeType::Overview(Category::Material), "Materials"),
            ],
            vec![
                Link::new("graphene", "cvd", LinkType::References),
                Link::new("graphene", "doping", LinkType::References),
                Link::new("sensing", "cvd", LinkType::References),
                Link::new("sensing", "doping", LinkType::Uses),
                Link::new("materials", "graphene", LinkType::Categorizes),
                Link::new("materials", "sensing", LinkType::Categorizes),
            ],
        )
    }

    fn run(graph: &GraphData, params: Params) -> Vec<GapRow> {
        ResearchGapDetector
            .execute(graph, &params)
            .unwrap()
            .rows()
            .unwrap()
    }

    #[test]
    fn test_shared_successors_and_bonus() {
        let rows = run(&create_test_graph(), Params::new());

        let top = &rows[0];
        assert_eq!(top.source, "graphene");
        assert_eq!(top.target, "sensing");
        assert_eq!(top.shared_successors, vec!["cvd", "doping"]);
        assert_eq!(top.strength, 5.0);

        // Bonus alone clears the default threshold for theory-application
        let bridge = rows
            .iter()
            .find(|r| r.source == "quantum" && r.target == "sensing")
            .unwrap();
        assert_eq!(bridge.strength, 1.5);
        assert_eq!(bridge.source_category, Category::Theory);
    }

    #[test]
    fn test_linked_and_overview_pairs_skipped() {
        let rows = run(&create_test_graph(), Params::new());

        assert!(rows.iter().all(|r| r.source != "materials" && r.target != "materials"));
        assert!(!rows
            .iter()
            .any(|r| (r.source == "graphene" && r.target == "cvd")
                || (r.source == "cvd" && r.target == "graphene")));
        assert!(rows.windows(2).all(|w| w[0].strength >= w[1].strength));
    }

    #[test]
    fn test_source_takes_earlier_category() {
        let rows = run(&create_test_graph(), Params::new());
        for row in &rows {
            assert!(row.source_category.rank() < row.target_category.rank());
        }
    }

    #[test]
    fn test_threshold_and_limit() {
        let graph = create_test_graph();
        let strict = Params::from([("minStrength".to_string(), ParamValue::from(4.0))]);
        assert_eq!(run(&graph, strict).len(), 1);

        let limited = Params::from([("maxResults".to_string(), ParamValue::from(1.0))]);
        assert_eq!(run(&graph, limited).len(), 1);

        let negative = Params::from([("minStrength".to_string(), ParamValue::from(-1.0))]);
        assert!(ResearchGapDetector.execute(&graph, &negative).is_err());
    }

    /// review mentions both concepts, survey mentions only band-gap
    fn create_mention_graph() -> GraphData {
        GraphData::from_parts(
            vec![
                entity("band-gap", Category::Theory),
                entity("exciton", Category::Mechanism),
                entity("review", Category::Method),
                entity("survey", Category::Method),
            ],
            vec![
                Link::new("review", "band-gap", LinkType::References),
                Link::new("review", "exciton", LinkType::References),
                Link::new("survey", "band-gap", LinkType::References),
            ],
        )
    }

    #[test]
    fn test_cooccurrence_from_shared_mentions() {
        let graph = create_mention_graph();

        // 0.5 overlap alone stays under the default threshold
        assert!(run(&graph, Params::new()).is_empty());

        let weighted = Params::from([("cooccurrenceWeight".to_string(), ParamValue::from(3.0))]);
        let rows = run(&graph, weighted);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "band-gap");
        assert_eq!(rows[0].target, "exciton");
        assert_eq!(rows[0].cooccurrence, 0.5);
        assert_eq!(rows[0].strength, 1.5);
        assert!(rows[0].shared_successors.is_empty());
    }

    #[test]
    fn test_cooccurrence_weight_zero_disables_term() {
        let params = Params::from([
            ("cooccurrenceWeight".to_string(), ParamValue::from(0.0)),
            ("minStrength".to_string(), ParamValue::from(0.0)),
        ]);
        assert!(run(&create_mention_graph(), params).is_empty());

        let negative = Params::from([("cooccurrenceWeight".to_string(), ParamValue::from(-1.0))]);
        assert!(ResearchGapDetector
            .execute(&create_mention_graph(), &negative)
            .is_err());
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&[1, 2], &[2, 3]), 1.0 / 3.0);
        assert_eq!(jaccard(&[4], &[4]), 1.0);
        assert_eq!(jaccard(&[], &[]), 0.0);
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect(&[1, 3, 5, 7], &[2, 3, 7, 9]), vec![3, 7]);
        assert!(intersect(&[], &[1]).is_empty());
    }
}
