//! Size-capped connectivity clustering for rendering

use crate::graph::{Adjacency, GraphData};
use crate::node::{Node, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    /// Smallest box holding every position; a degenerate box at the origin
    /// when there are none
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut iter = positions.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(
            Self {
                min: *first,
                max: *first,
            },
            |mut bounds, p| {
                bounds.min.x = bounds.min.x.min(p.x);
                bounds.min.y = bounds.min.y.min(p.y);
                bounds.min.z = bounds.min.z.min(p.z);
                bounds.max.x = bounds.max.x.max(p.x);
                bounds.max.y = bounds.max.y.max(p.y);
                bounds.max.z = bounds.max.z.max(p.z);
                bounds
            },
        )
    }

    pub fn contains(&self, p: &Position) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

/// A group of nodes rendered and queried together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCluster {
    pub id: String,
    pub nodes: Vec<Node>,
    /// Id of the member best connected inside the cluster
    pub center: String,
    /// Bounds of the positioned members
    pub bounds: BoundingBox,
}

impl NodeCluster {
    pub fn size(&self) -> usize {
        self.nodes.len()
    }
}

/// Partition every node into clusters of at most `max_nodes_per_cluster`
///
/// Seeds are taken in descending degree order; each cluster grows
/// breadth-first from its seed over not-yet-clustered neighbors, so connected
/// nodes land together and components larger than the cap are split. Every
/// node ends up in exactly one cluster.
pub fn cluster_nodes(graph: &GraphData, max_nodes_per_cluster: usize) -> Vec<NodeCluster> {
    let cap = if max_nodes_per_cluster == 0 {
        tracing::warn!("Cluster size cap of 0 requested, using 1");
        1
    } else {
        max_nodes_per_cluster
    };

    let adjacency = Adjacency::undirected(graph);
    let mut assigned = vec![false; graph.nodes.len()];
    // Later duplicates of an id are never clustered
    for (i, done) in assigned.iter_mut().enumerate() {
        *done = !adjacency.is_canonical(i);
    }

    let mut seeds: Vec<usize> = (0..graph.nodes.len()).collect();
    seeds.sort_by(|&a, &b| adjacency.degree(b).cmp(&adjacency.degree(a)).then(a.cmp(&b)));

    let mut clusters = Vec::new();
    for seed in seeds {
        if assigned[seed] {
            continue;
        }
        let members = grow_cluster(&adjacency, seed, cap, &mut assigned);
        clusters.push(make_cluster(graph, &adjacency, clusters.len(), &members));
    }

    tracing::debug!(
        "Clustered {} nodes into {} clusters (cap {})",
        graph.nodes.len(),
        clusters.len(),
        cap
    );
    clusters
}

fn grow_cluster(
    adjacency: &Adjacency<'_>,
    seed: usize,
    cap: usize,
    assigned: &mut [bool],
) -> Vec<usize> {
    let mut members = vec![seed];
    let mut queue = VecDeque::from([seed]);
    assigned[seed] = true;

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.neighbors(current) {
            if members.len() >= cap {
                return members;
            }
            if !assigned[next] {
                assigned[next] = true;
                members.push(next);
                queue.push_back(next);
            }
        }
    }

    members
}

fn make_cluster(
    graph: &GraphData,
    adjacency: &Adjacency<'_>,
    ordinal: usize,
    members: &[usize],
) -> NodeCluster {
    let internal_degree = |i: usize| {
        adjacency
            .neighbors(i)
            .iter()
            .filter(|n| members.contains(n))
            .count()
    };
    // max_by_key keeps the last maximum, so iterate in reverse to prefer the seed
    let center = members
        .iter()
        .rev()
        .copied()
        .max_by_key(|&i| internal_degree(i))
        .unwrap_or(members[0]);

    let nodes: Vec<Node> = members.iter().map(|&i| graph.nodes[i].clone()).collect();
    let bounds = BoundingBox::from_positions(nodes.iter().filter_map(|n| n.position.as_ref()));

    NodeCluster {
        id: format!("cluster-{}", ordinal),
        center: graph.nodes[center].id.clone(),
        nodes,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Link, LinkType};
    use crate::node::{Category, NodeType};
    use std::collections::HashSet;

    fn node(id: &str, x: f64, y: f64) -> Node {
        Node::new(id, NodeType::Entity(Category::Method), id).with_position(Position::new(x, y, 0.0))
    }

    /// Two components: a 5-node star around "hub" and a 2-node pair, plus an isolate
    fn create_test_graph() -> GraphData {
        GraphData::from_parts(
            vec![
                node("s1", 1.0, 0.0),
                node("hub", 0.0, 0.0),
                node("s2", -1.0, 0.0),
                node("s3", 0.0, 1.0),
                node("s4", 0.0, -1.0),
                node("p1", 10.0, 10.0),
                node("p2", 12.0, 11.0),
                Node::new("iso", NodeType::Entity(Category::Theory), "iso"),
            ],
            vec![
                Link::new("hub", "s1", LinkType::Uses),
                Link::new("hub", "s2", LinkType::Uses),
                Link::new("s3", "hub", LinkType::Uses),
                Link::new("s4", "hub", LinkType::Uses),
                Link::new("p1", "p2", LinkType::Uses),
                Link::new("p2", "nowhere", LinkType::Uses),
            ],
        )
    }

    fn assert_partition(graph: &GraphData, clusters: &[NodeCluster], cap: usize) {
        let mut seen = HashSet::new();
        for cluster in clusters {
            assert!(cluster.size() <= cap, "cluster {} too large", cluster.id);
            assert!(!cluster.nodes.is_empty());
            for node in &cluster.nodes {
                assert!(seen.insert(node.id.clone()), "duplicate {}", node.id);
            }
        }
        let all: HashSet<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(seen, all);
    }

    #[test]
    fn test_partition_for_every_cap() {
        let graph = create_test_graph();
        for cap in 1..=9 {
            let clusters = cluster_nodes(&graph, cap);
            assert_partition(&graph, &clusters, cap);
        }
    }

    #[test]
    fn test_connected_nodes_grouped() {
        let graph = create_test_graph();
        let clusters = cluster_nodes(&graph, 5);

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].center, "hub");
        assert_eq!(clusters[0].size(), 5);
        let pair: HashSet<&str> = clusters[1].nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(pair, HashSet::from(["p1", "p2"]));
    }

    #[test]
    fn test_large_component_is_split() {
        let graph = create_test_graph();
        let clusters = cluster_nodes(&graph, 3);

        let star: Vec<_> = clusters
            .iter()
            .filter(|c| c.nodes.iter().any(|n| n.id.starts_with('s') || n.id == "hub"))
            .collect();
        assert!(star.len() >= 2);
        assert!(star.iter().all(|c| c.size() <= 3));
        assert_partition(&graph, &clusters, 3);
    }

    #[test]
    fn test_bounds_cover_positioned_members() {
        let graph = create_test_graph();
        let clusters = cluster_nodes(&graph, 5);

        for cluster in &clusters {
            for node in &cluster.nodes {
                if let Some(p) = &node.position {
                    assert!(cluster.bounds.contains(p));
                }
            }
        }
        assert_eq!(clusters[1].bounds.min, Position::new(10.0, 10.0, 0.0));
        assert_eq!(clusters[1].bounds.max, Position::new(12.0, 11.0, 0.0));
        // The isolate has no position
        assert_eq!(clusters[2].bounds, BoundingBox::default());
    }

    #[test]
    fn test_zero_cap_and_empty_graph() {
        let graph = create_test_graph();
        assert_partition(&graph, &cluster_nodes(&graph, 0), 1);
        assert!(cluster_nodes(&GraphData::new(), 10).is_empty());
    }

    #[test]
    fn test_duplicate_ids_clustered_once() {
        let graph = GraphData {
            nodes: vec![node("a", 0.0, 0.0), node("a", 5.0, 5.0), node("b", 1.0, 1.0)],
            links: vec![],
        };
        let clusters = cluster_nodes(&graph, 10);
        let total: usize = clusters.iter().map(NodeCluster::size).sum();
        assert_eq!(total, 2);
    }
}
