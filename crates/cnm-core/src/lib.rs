//! CNM Core - Graph engine for category-organized knowledge graphs
//!
//! This crate turns hierarchical markdown documents into a typed graph of
//! nodes and links, and provides the read-only queries (neighbor expansion,
//! filtering, clustering, level-of-detail and search indexing) used to
//! explore it.

pub mod builder;
pub mod cluster;
pub mod error;
pub mod graph;
pub mod limits;
pub mod link;
pub mod lod;
pub mod node;
pub mod parser;
pub mod reference;
pub mod search_index;
pub mod traversal;

pub use builder::{build_graph, BuildReport, CategoryDocument, GraphBuilder};
pub use cluster::{cluster_nodes, BoundingBox, NodeCluster};
pub use error::{Error, Result};
pub use graph::{Adjacency, GraphData};
pub use link::{Link, LinkType};
pub use lod::{should_render_node, LevelOfDetail};
pub use node::{Category, Node, NodeStatus, NodeType, Position};
pub use parser::{parse_sections, slugify, ParsedSection};
pub use reference::extract_references;
pub use search_index::{build_search_index, tokenize, SearchIndex};
pub use traversal::{filter_graph_data, find_path, get_neighbors, GraphPath, TraversalStats};
