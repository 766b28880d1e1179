//! Inverted token index over nodes

use crate::node::Node;
use std::collections::{BTreeMap, HashMap};

/// Tokens shorter than this (in characters) are not indexed
pub const MIN_TOKEN_CHARS: usize = 2;

/// Split on whitespace and punctuation, lowercase, drop short tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
}

/// Lowercase token to the nodes whose id, label, description or type
/// contains it
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    nodes: Vec<Node>,
    postings: HashMap<String, Vec<usize>>,
}

impl SearchIndex {
    /// Nodes indexed under `token`, in first-seen order
    pub fn get(&self, token: &str) -> Vec<&Node> {
        self.postings
            .get(&token.to_lowercase())
            .map(|list| list.iter().map(|&i| &self.nodes[i]).collect())
            .unwrap_or_default()
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.postings.contains_key(&token.to_lowercase())
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Nodes matching every token of `query`, in first-seen order
    pub fn search(&self, query: &str) -> Vec<&Node> {
        let tokens: Vec<String> = tokenize(query).collect();
        let Some((first, rest)) = tokens.split_first() else {
            return Vec::new();
        };
        let Some(candidates) = self.postings.get(first) else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter(|i| {
                rest.iter().all(|t| {
                    self.postings
                        .get(t)
                        .is_some_and(|list| list.binary_search(i).is_ok())
                })
            })
            .map(|&i| &self.nodes[i])
            .collect()
    }

    /// Token to node ids, sorted by token
    pub fn to_id_map(&self) -> BTreeMap<&str, Vec<&str>> {
        self.postings
            .iter()
            .map(|(token, list)| {
                (
                    token.as_str(),
                    list.iter().map(|&i| self.nodes[i].id.as_str()).collect(),
                )
            })
            .collect()
    }
}

/// Build an inverted index over `nodes`
pub fn build_search_index(nodes: &[Node]) -> SearchIndex {
    let mut postings: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, node) in nodes.iter().enumerate() {
        let node_type = node.node_type.to_string();
        let fields = [
            Some(node.id.as_str()),
            Some(node.label.as_str()),
            node.description.as_deref(),
            Some(node_type.as_str()),
        ];
        for token in fields.into_iter().flatten().flat_map(tokenize) {
            let list = postings.entry(token).or_default();
            // Nodes are visited in order, so a repeat can only be the last entry
            if list.last() != Some(&i) {
                list.push(i);
            }
        }
    }

    tracing::debug!(
        "Indexed {} nodes under {} tokens",
        nodes.len(),
        postings.len()
    );
    SearchIndex {
        nodes: nodes.to_vec(),
        postings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Category, NodeType};

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("ab-material", NodeType::Entity(Category::Material), "A B Material"),
            Node::new("graphene", NodeType::Entity(Category::Material), "Graphene")
                .with_description("A 2D carbon allotrope; strong, conductive."),
            Node::new("sensors", NodeType::Overview(Category::Application), "Sensors")
                .with_description("Graphene-based sensors"),
        ]
    }

    #[test]
    fn test_short_tokens_excluded() {
        let index = build_search_index(&nodes());

        assert!(!index.contains_token("a"));
        assert!(!index.contains_token("b"));
        assert!(index.contains_token("material"));
        assert!(index.contains_token("2d"));
    }

    #[test]
    fn test_type_and_description_indexed_in_order() {
        let index = build_search_index(&nodes());

        let graphene: Vec<&str> = index.get("graphene").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(graphene, vec!["graphene", "sensors"]);

        let materials: Vec<&str> = index.get("Material").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(materials, vec!["ab-material", "graphene"]);

        assert_eq!(index.get("overview").len(), 1);
        assert!(index.get("missing").is_empty());
    }

    #[test]
    fn test_search_requires_every_token() {
        let index = build_search_index(&nodes());

        let hits: Vec<&str> = index
            .search("graphene sensors")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(hits, vec!["sensors"]);
        assert!(index.search("a").is_empty());
        assert!(index.search("").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let index = build_search_index(&[]);
        assert!(index.is_empty());
        assert!(index.to_id_map().is_empty());
    }
}
