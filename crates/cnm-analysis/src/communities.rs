//! Modularity-based research cluster detection

use crate::algorithm::{to_rows, AlgorithmCategory, GraphAlgorithm};
use crate::error::Result;
use crate::params::{positive, positive_integer, AlgorithmParameter, ResolvedParams};
use cnm_core::{Adjacency, Category, GraphData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local moving sweeps per level before giving up on convergence
const MAX_SWEEPS: usize = 64;

/// Minimum modularity gain for a move
const MIN_GAIN: f64 = 1e-12;

/// One detected community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRow {
    pub cluster_id: String,
    pub size: usize,
    pub members: Vec<String>,
    /// Member with the most neighbors
    pub leader: String,
    pub category_counts: BTreeMap<String, usize>,
    pub dominant_category: Category,
    pub internal_links: usize,
    pub density: f64,
    /// Modularity of the whole partition
    pub modularity: f64,
}

/// Louvain-style communities on the undirected view of the graph
///
/// Nodes are visited in graph order and ties go to the first community
/// seen, so the partition is deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResearchClusterDetector;

impl ResearchClusterDetector {
    pub const NAME: &'static str = "Research Cluster Detector";

    pub fn new() -> Self {
        Self
    }
}

impl GraphAlgorithm for ResearchClusterDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn category(&self) -> AlgorithmCategory {
        AlgorithmCategory::PatternRecognition
    }

    fn description(&self) -> &'static str {
        "Groups densely interlinked concepts into research clusters by modularity"
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter::new("resolution", "Higher values favor smaller clusters", 1.0)
                .with_validator(positive),
            AlgorithmParameter::new("minClusterSize", "Smallest cluster reported", 2.0)
                .with_validator(positive_integer),
            AlgorithmParameter::new("maxPasses", "Maximum aggregation passes", 10.0)
                .with_validator(positive_integer),
        ]
    }

    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>> {
        let resolution = params.number("resolution")?;
        let min_size = params.count("minClusterSize")?;
        let max_passes = params.count("maxPasses")?;

        let adjacency = Adjacency::undirected(graph);
        let nodes: Vec<usize> = (0..adjacency.len())
            .filter(|&i| adjacency.is_canonical(i))
            .collect();
        let mut compact = vec![usize::MAX; adjacency.len()];
        for (c, &i) in nodes.iter().enumerate() {
            compact[i] = c;
        }

        let membership = louvain(
            LevelGraph::from_adjacency(&adjacency, &nodes, &compact),
            resolution,
            max_passes,
        );
        let community_count = membership.iter().max().map_or(0, |&m| m + 1);
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); community_count];
        for (c, &community) in membership.iter().enumerate() {
            groups[community].push(nodes[c]);
        }

        let modularity = modularity(&adjacency, &compact, &membership, community_count, resolution);

        groups.retain(|members| members.len() >= min_size);
        groups.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

        let rows: Vec<ClusterRow> = groups
            .iter()
            .enumerate()
            .map(|(ordinal, members)| describe(graph, &adjacency, ordinal, members, modularity))
            .collect();

        tracing::debug!(
            "Found {} communities, reporting {} (modularity {:.4})",
            community_count,
            rows.len(),
            modularity
        );
        to_rows(&rows)
    }
}

/// Weighted graph of one aggregation level
struct LevelGraph {
    adj: Vec<Vec<(usize, f64)>>,
    /// Weight of edges collapsed inside each node
    internal: Vec<f64>,
}

impl LevelGraph {
    fn from_adjacency(adjacency: &Adjacency<'_>, nodes: &[usize], compact: &[usize]) -> Self {
        let adj = nodes
            .iter()
            .map(|&i| {
                adjacency
                    .neighbors(i)
                    .iter()
                    .map(|&j| (compact[j], 1.0))
                    .collect()
            })
            .collect();
        Self {
            adj,
            internal: vec![0.0; nodes.len()],
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn degree(&self, i: usize) -> f64 {
        self.adj[i].iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self.internal[i]
    }
}

fn louvain(mut level: LevelGraph, resolution: f64, max_passes: usize) -> Vec<usize> {
    let mut membership: Vec<usize> = (0..level.len()).collect();

    for pass in 0..max_passes {
        let Some(community) = local_moving(&level, resolution) else {
            break;
        };
        let (next, renumbered) = aggregate(&level, &community);
        for m in &mut membership {
            *m = renumbered[*m];
        }
        tracing::trace!("Pass {} left {} communities", pass, next.len());
        level = next;
    }

    membership
}

/// Greedy moves of single nodes into neighboring communities
///
/// Returns `None` when no node moved.
fn local_moving(level: &LevelGraph, resolution: f64) -> Option<Vec<usize>> {
    let n = level.len();
    let k: Vec<f64> = (0..n).map(|i| level.degree(i)).collect();
    let two_m: f64 = k.iter().sum();
    if two_m == 0.0 {
        return None;
    }

    let mut community: Vec<usize> = (0..n).collect();
    let mut tot = k.clone();
    let mut weight_to = vec![0.0; n];
    let mut seen = vec![false; n];
    let mut touched: Vec<usize> = Vec::new();
    let mut moved_any = false;

    for _ in 0..MAX_SWEEPS {
        let mut moved = false;
        for i in 0..n {
            let current = community[i];
            for &(j, w) in &level.adj[i] {
                let c = community[j];
                if !seen[c] {
                    seen[c] = true;
                    touched.push(c);
                }
                weight_to[c] += w;
            }

            tot[current] -= k[i];
            let gain = |c: usize| weight_to[c] - resolution * tot[c] * k[i] / two_m;
            let mut best = current;
            let mut best_gain = gain(current);
            for &c in &touched {
                let g = gain(c);
                if g > best_gain + MIN_GAIN {
                    best = c;
                    best_gain = g;
                }
            }
            tot[best] += k[i];
            if best != current {
                community[i] = best;
                moved = true;
            }

            for &c in &touched {
                weight_to[c] = 0.0;
                seen[c] = false;
            }
            touched.clear();
        }
        if !moved {
            break;
        }
        moved_any = true;
    }

    moved_any.then_some(community)
}

/// Collapse each community into one node; also returns the old-to-new index map
fn aggregate(level: &LevelGraph, community: &[usize]) -> (LevelGraph, Vec<usize>) {
    let mut renumber = vec![usize::MAX; level.len()];
    let mut count = 0;
    for &c in community {
        if renumber[c] == usize::MAX {
            renumber[c] = count;
            count += 1;
        }
    }
    let mapped: Vec<usize> = community.iter().map(|&c| renumber[c]).collect();

    let mut edges: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
    let mut internal = vec![0.0; count];
    for (i, neighbors) in level.adj.iter().enumerate() {
        let ci = mapped[i];
        internal[ci] += level.internal[i];
        for &(j, w) in neighbors {
            let cj = mapped[j];
            if ci == cj {
                // Seen from both endpoints
                internal[ci] += w / 2.0;
            } else {
                *edges[ci].entry(cj).or_insert(0.0) += w;
            }
        }
    }

    let next = LevelGraph {
        adj: edges.into_iter().map(|m| m.into_iter().collect()).collect(),
        internal,
    };
    (next, mapped)
}

fn modularity(
    adjacency: &Adjacency<'_>,
    compact: &[usize],
    membership: &[usize],
    communities: usize,
    resolution: f64,
) -> f64 {
    let mut inside = vec![0.0_f64; communities];
    let mut tot = vec![0.0_f64; communities];
    let mut two_m = 0.0_f64;
    for i in 0..adjacency.len() {
        if compact[i] == usize::MAX {
            continue;
        }
        let ci = membership[compact[i]];
        for &j in adjacency.neighbors(i) {
            two_m += 1.0;
            tot[ci] += 1.0;
            if membership[compact[j]] == ci {
                inside[ci] += 0.5;
            }
        }
    }
    if two_m == 0.0 {
        return 0.0;
    }
    let m = two_m / 2.0;
    inside
        .iter()
        .zip(&tot)
        .map(|(l, d)| l / m - resolution * (d / two_m).powi(2))
        .sum()
}

fn describe(
    graph: &GraphData,
    adjacency: &Adjacency<'_>,
    ordinal: usize,
    members: &[usize],
    modularity: f64,
) -> ClusterRow {
    let in_cluster = |j: &usize| members.binary_search(j).is_ok();
    let internal_links = members
        .iter()
        .map(|&i| adjacency.neighbors(i).iter().filter(|&&j| in_cluster(&j)).count())
        .sum::<usize>()
        / 2;
    let size = members.len();
    let possible = size * size.saturating_sub(1) / 2;
    let density = if possible == 0 {
        0.0
    } else {
        internal_links as f64 / possible as f64
    };

    // max_by_key keeps the last maximum, so iterate in reverse to prefer earlier nodes
    let leader = members
        .iter()
        .rev()
        .copied()
        .max_by_key(|&i| adjacency.degree(i))
        .unwrap_or(members[0]);

    let mut by_category: BTreeMap<Category, usize> = BTreeMap::new();
    for &i in members {
        *by_category.entry(graph.nodes[i].category()).or_insert(0) += 1;
    }
    let dominant_category = Category::ORDER
        .iter()
        .rev()
        .copied()
        .max_by_key(|c| by_category.get(c).copied().unwrap_or(0))
        .unwrap_or(Category::Theory);

    ClusterRow {
        cluster_id: format!("community-{}", ordinal),
        size,
        members: members.iter().map(|&i| adjacency.id(i).to_string()).collect(),
        leader: adjacency.id(leader).to_string(),
        category_counts: by_category
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect(),
        dominant_category,
        internal_links,
        density,
        modularity,
    }
}
