//! Node (vertex) types

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Entity category of a knowledge-graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Theory,
    Mechanism,
    Phenomenon,
    Method,
    Material,
    Application,
}

impl Category {
    /// Canonical category ordering, from foundations to applications
    pub const ORDER: [Category; 6] = [
        Category::Theory,
        Category::Mechanism,
        Category::Phenomenon,
        Category::Method,
        Category::Material,
        Category::Application,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theory => "Theory",
            Self::Mechanism => "Mechanism",
            Self::Phenomenon => "Phenomenon",
            Self::Method => "Method",
            Self::Material => "Material",
            Self::Application => "Application",
        }
    }

    /// Position of this category in [`Category::ORDER`]
    pub fn rank(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::ORDER.len())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ORDER
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

/// Node type: an entity of a category, or the overview marker of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeType {
    Entity(Category),
    Overview(Category),
}

const OVERVIEW_SUFFIX: &str = "_Overview";

impl NodeType {
    pub fn category(&self) -> Category {
        match self {
            Self::Entity(c) | Self::Overview(c) => *c,
        }
    }

    pub fn is_overview(&self) -> bool {
        matches!(self, Self::Overview(_))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(c) => write!(f, "{}", c),
            Self::Overview(c) => write!(f, "{}{}", c, OVERVIEW_SUFFIX),
        }
    }
}

impl FromStr for NodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let map_err = |_| Error::InvalidNodeType(s.to_string());
        match s.strip_suffix(OVERVIEW_SUFFIX) {
            Some(category) => Ok(Self::Overview(category.parse().map_err(map_err)?)),
            None => Ok(Self::Entity(s.parse().map_err(map_err)?)),
        }
    }
}

impl TryFrom<String> for NodeType {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.to_string()
    }
}

/// Lifecycle status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Active,
    Proposed,
    Deprecated,
}

/// Layout position assigned by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A node in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable slug identifier (unique within a graph)
    pub id: String,

    /// Entity category or category overview marker
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Display label (the section title)
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: NodeStatus,

    /// Importance score used for ranking and level-of-detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Arbitrary metadata, opaque to the engine
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Node {
    /// Create a new node
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            description: None,
            status: NodeStatus::default(),
            value: None,
            position: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn category(&self) -> Category {
        self.node_type.category()
    }

    /// Importance score, zero when unset or not finite
    pub fn importance(&self) -> f64 {
        self.value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}
