//! Graph data container and adjacency views

use crate::error::{Error, Result};
use crate::link::Link;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Nodes and links of one knowledge graph snapshot
///
/// A `GraphData` is built once per load and shared read-only afterwards.
/// Node ids are unique; links may reference ids that do not exist, and every
/// query tolerates such dangling endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph, keeping the first node for every duplicated id
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(nodes.len());
        let mut unique = Vec::with_capacity(nodes.len());
        for node in nodes {
            if seen.insert(node.id.clone()) {
                unique.push(node);
            } else {
                tracing::warn!("Dropping duplicate node id: {}", node.id);
            }
        }
        Self {
            nodes: unique,
            links,
        }
    }

    /// Parse a graph from JSON, skipping records that do not deserialize
    pub fn from_json_lenient(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::Validation("graph JSON must be an object".to_string()))?;

        let nodes = Self::lenient_records::<Node>(object.get("nodes"), "node");
        let links = Self::lenient_records::<Link>(object.get("links"), "link");
        Ok(Self::from_parts(nodes, links))
    }

    fn lenient_records<T: serde::de::DeserializeOwned>(
        value: Option<&serde_json::Value>,
        kind: &str,
    ) -> Vec<T> {
        let Some(items) = value.and_then(|v| v.as_array()) else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match T::deserialize(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} record #{}: {}", kind, i, e);
                    None
                }
            })
            .collect()
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up a node that has to exist, as for user-supplied ids
    pub fn require_node(&self, id: &str) -> Result<&Node> {
        if id.trim().is_empty() {
            return Err(Error::InvalidNodeId(id.to_string()));
        }
        self.node(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Map from node id to its position in `nodes`
    pub fn index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }
        index
    }

    /// Return a new snapshot with `value` replaced for every scored node
    pub fn with_values(&self, scores: &HashMap<String, f64>) -> Self {
        let mut graph = self.clone();
        for node in &mut graph.nodes {
            if let Some(score) = scores.get(&node.id) {
                node.value = Some(*score);
            }
        }
        graph
    }

    /// Sub-graph induced by a set of node ids, preserving original order
    pub fn induced(&self, ids: &HashSet<&str>) -> Self {
        let nodes = self
            .nodes
            .iter()
            .filter(|n| ids.contains(n.id.as_str()))
            .cloned()
            .collect();
        let links = self
            .links
            .iter()
            .filter(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str()))
            .cloned()
            .collect();
        Self { nodes, links }
    }
}

/// Index-based adjacency over the nodes of a graph
///
/// Links with an endpoint missing from the node set are ignored, as are
/// self-loops. Neighbor lists are sorted and deduplicated.
#[derive(Debug, Clone)]
pub struct Adjacency<'a> {
    ids: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    neighbors: Vec<Vec<usize>>,
}

impl<'a> Adjacency<'a> {
    /// Every link is traversable in both directions
    pub fn undirected(graph: &'a GraphData) -> Self {
        Self::build(graph, false, |_| true)
    }

    /// Links are traversable from source to target only
    pub fn directed(graph: &'a GraphData) -> Self {
        Self::build(graph, true, |_| true)
    }

    /// Build with an explicit direction and link predicate
    pub fn build(graph: &'a GraphData, directed: bool, keep: impl Fn(&Link) -> bool) -> Self {
        let index = graph.index();
        let ids: Vec<&'a str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut neighbors = vec![Vec::new(); graph.nodes.len()];

        for link in &graph.links {
            if !keep(link) {
                continue;
            }
            let (Some(&s), Some(&t)) = (
                index.get(link.source.as_str()),
                index.get(link.target.as_str()),
            ) else {
                continue;
            };
            if s == t {
                continue;
            }
            neighbors[s].push(t);
            if !directed {
                neighbors[t].push(s);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            ids,
            index,
            neighbors,
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn id(&self, i: usize) -> &'a str {
        self.ids[i]
    }

    /// False for later duplicates of an already indexed id
    pub fn is_canonical(&self, i: usize) -> bool {
        self.index.get(self.ids[i]) == Some(&i)
    }

    /// The same edges followed in the opposite direction
    pub fn transposed(&self) -> Self {
        let mut neighbors = vec![Vec::new(); self.neighbors.len()];
        // Ascending sources keep every reversed list sorted
        for (source, targets) in self.neighbors.iter().enumerate() {
            for &target in targets {
                neighbors[target].push(source);
            }
        }
        Self {
            ids: self.ids.clone(),
            index: self.index.clone(),
            neighbors,
        }
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }
}
