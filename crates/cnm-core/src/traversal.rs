//! Read-only graph queries: neighborhood expansion, text filtering, paths

use crate::graph::{Adjacency, GraphData};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// A hop path through the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    /// Ordered node ids from start to target
    pub nodes: Vec<String>,

    /// Path length (number of hops)
    pub length: usize,
}

/// Traversal statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub edges_traversed: usize,
    pub max_depth_reached: u32,
}

/// Breadth-first reach from `start` over undirected links
fn bfs_reach(adjacency: &Adjacency<'_>, start: usize, max_depth: u32) -> (Vec<usize>, TraversalStats) {
    let mut visited = vec![false; adjacency.len()];
    let mut order = Vec::new();
    let mut queue: VecDeque<(usize, u32)> = VecDeque::new();
    let mut stats = TraversalStats::default();

    visited[start] = true;
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        order.push(current);
        stats.nodes_visited += 1;
        stats.max_depth_reached = stats.max_depth_reached.max(depth);

        if depth >= max_depth {
            continue;
        }

        for &next in adjacency.neighbors(current) {
            stats.edges_traversed += 1;
            if !visited[next] {
                visited[next] = true;
                queue.push_back((next, depth + 1));
            }
        }
    }

    (order, stats)
}

/// Nodes within `depth` hops of `start`, and the links among them
///
/// Links are followed in both directions. `depth = 0` yields only the start
/// node. An unknown start id yields an empty graph.
pub fn get_neighbors(graph: &GraphData, start: &str, depth: u32) -> GraphData {
    let adjacency = Adjacency::undirected(graph);
    let Some(start_index) = adjacency.position(start) else {
        tracing::debug!("Neighbor query for unknown node: {}", start);
        return GraphData::new();
    };

    if depth == 0 {
        let nodes = graph.nodes.get(start_index).cloned().into_iter().collect();
        return GraphData {
            nodes,
            links: Vec::new(),
        };
    }

    let (reached, stats) = bfs_reach(&adjacency, start_index, depth);
    tracing::debug!(
        "Neighbor BFS from {} visited {} nodes, traversed {} edges",
        start,
        stats.nodes_visited,
        stats.edges_traversed
    );

    let ids: HashSet<&str> = reached.iter().map(|&i| adjacency.id(i)).collect();
    graph.induced(&ids)
}

fn matches_query(graph: &GraphData, index: usize, needle: &str) -> bool {
    let node = &graph.nodes[index];
    node.id.to_lowercase().contains(needle)
        || node.label.to_lowercase().contains(needle)
        || node
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Nodes whose id, label or description contains `query`, plus their direct
/// neighbors, and the links among them
///
/// Matching is case-insensitive. A blank query returns the graph unchanged.
pub fn filter_graph_data(graph: &GraphData, query: &str) -> GraphData {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return graph.clone();
    }

    let adjacency = Adjacency::undirected(graph);
    let mut selected: HashSet<&str> = HashSet::new();
    let mut matched = 0usize;

    for i in 0..adjacency.len() {
        if !matches_query(graph, i, &needle) {
            continue;
        }
        matched += 1;
        selected.insert(adjacency.id(i));
        for &n in adjacency.neighbors(i) {
            selected.insert(adjacency.id(n));
        }
    }

    tracing::debug!(
        "Filter '{}' matched {} nodes, {} with neighbors",
        needle,
        matched,
        selected.len()
    );
    graph.induced(&selected)
}

/// Shortest hop path between two nodes, following links in both directions
pub fn find_path(graph: &GraphData, from: &str, to: &str) -> Option<GraphPath> {
    let adjacency = Adjacency::undirected(graph);
    let start = adjacency.position(from)?;
    let target = adjacency.position(to)?;

    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(current) = queue.pop_front() {
        if current == target {
            return Some(reconstruct_path(&adjacency, start, target, &parent));
        }
        for &next in adjacency.neighbors(current) {
            if !visited[next] {
                visited[next] = true;
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

fn reconstruct_path(
    adjacency: &Adjacency<'_>,
    start: usize,
    end: usize,
    parent: &HashMap<usize, usize>,
) -> GraphPath {
    let mut nodes = vec![adjacency.id(end).to_string()];
    let mut current = end;

    while current != start {
        match parent.get(&current) {
            Some(&prev) => {
                nodes.push(adjacency.id(prev).to_string());
                current = prev;
            }
            None => break,
        }
    }

    nodes.reverse();
    GraphPath {
        length: nodes.len() - 1,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Link, LinkType};
    use crate::node::{Category, Node, NodeType};

    fn create_test_graph() -> GraphData {
        let node = |id: &str, label: &str| Node::new(id, NodeType::Entity(Category::Material), label);

        // A -> B -> C -> D, B -> E, C -> F, E -> F, F -> A (cycle)
        GraphData::from_parts(
            vec![
                node("a", "Alpha"),
                node("b", "Beta").with_description("Contains GRAPHENE layers"),
                node("c", "Gamma"),
                node("d", "Delta"),
                node("e", "Epsilon"),
                node("f", "Graphene Foam"),
                node("lonely", "Lonely"),
            ],
            vec![
                Link::new("a", "b", LinkType::Uses),
                Link::new("b", "c", LinkType::Uses),
                Link::new("c", "d", LinkType::Uses),
                Link::new("b", "e", LinkType::Uses),
                Link::new("c", "f", LinkType::Uses),
                Link::new("e", "f", LinkType::Uses),
                Link::new("f", "a", LinkType::References),
                Link::new("d", "ghost", LinkType::References),
            ],
        )
    }

    fn ids(graph: &GraphData) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_depth_zero_is_start_only() {
        let graph = create_test_graph();
        for node in &graph.nodes {
            let result = get_neighbors(&graph, &node.id, 0);
            assert_eq!(ids(&result), vec![node.id.as_str()]);
            assert!(result.links.is_empty());
        }
    }

    #[test]
    fn test_depth_one_follows_both_directions() {
        let graph = create_test_graph();
        let result = get_neighbors(&graph, "b", 1);

        assert_eq!(ids(&result), vec!["a", "b", "c", "e"]);
        assert_eq!(result.links.len(), 3);
        assert!(result
            .links
            .iter()
            .all(|l| ["a", "b", "c", "e"].contains(&l.source.as_str())
                && ["a", "b", "c", "e"].contains(&l.target.as_str())));
    }

    #[test]
    fn test_cycle_is_deduplicated() {
        let graph = create_test_graph();
        let result = get_neighbors(&graph, "a", 10);

        assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e", "f"]);
        // The dangling link to "ghost" is never included
        assert_eq!(result.links.len(), 7);
    }

    #[test]
    fn test_unknown_start_and_empty_graph() {
        let graph = create_test_graph();
        assert!(get_neighbors(&graph, "ghost", 2).is_empty());
        assert!(get_neighbors(&GraphData::new(), "a", 2).is_empty());
    }

    #[test]
    fn test_neighbors_are_pure() {
        let graph = create_test_graph();
        assert_eq!(get_neighbors(&graph, "c", 2), get_neighbors(&graph, "c", 2));
    }

    #[test]
    fn test_filter_blank_query_is_identity() {
        let graph = create_test_graph();
        assert_eq!(filter_graph_data(&graph, ""), graph);
        assert_eq!(filter_graph_data(&graph, "   "), graph);
    }

    #[test]
    fn test_filter_case_insensitive_with_neighbors() {
        let graph = create_test_graph();
        let upper = filter_graph_data(&graph, "GRAPHENE");
        let lower = filter_graph_data(&graph, "graphene");

        assert_eq!(ids(&upper), ids(&lower));
        // b and f match; a, c, e join as neighbors
        assert_eq!(ids(&lower), vec!["a", "b", "c", "e", "f"]);
        assert!(lower
            .links
            .iter()
            .all(|l| l.source != "d" && l.target != "d"));
    }

    #[test]
    fn test_filter_without_match_is_empty() {
        let graph = create_test_graph();
        let result = filter_graph_data(&graph, "unobtainium");
        assert!(result.is_empty());
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_find_path() {
        let graph = create_test_graph();
        let path = find_path(&graph, "a", "d").unwrap();

        assert_eq!(path.nodes, vec!["a", "b", "c", "d"]);
        assert_eq!(path.length, 3);
        assert_eq!(find_path(&graph, "a", "a").unwrap().length, 0);
        assert!(find_path(&graph, "a", "lonely").is_none());
        assert!(find_path(&graph, "a", "ghost").is_none());
    }
}
