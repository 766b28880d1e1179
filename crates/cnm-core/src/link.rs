//! Link (edge) types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship a link expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// Parent section to subsection
    Categorizes,
    /// Cross-reference found in section content
    References,
    /// One entity uses another
    Uses,
    /// Any other association
    RelatesTo,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categorizes => "categorizes",
            Self::References => "references",
            Self::Uses => "uses",
            Self::RelatesTo => "relates-to",
        }
    }

    pub fn is_hierarchy(&self) -> bool {
        matches!(self, Self::Categorizes)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed link between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    #[serde(rename = "type")]
    pub link_type: LinkType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Link {
    /// Create a new link
    pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
            justification: None,
            weight: None,
        }
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    /// Set the weight of this link
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let link = Link::new("graphene", "cvd-growth", LinkType::Uses)
            .with_justification("grown by CVD")
            .with_weight(0.8);

        assert_eq!(link.source, "graphene");
        assert_eq!(link.target, "cvd-growth");
        assert_eq!(link.weight, Some(0.8));
    }

    #[test]
    fn test_link_type_wire_names() {
        let json = serde_json::to_value(Link::new("a", "b", LinkType::RelatesTo)).unwrap();
        assert_eq!(json["type"], "relates-to");
        assert_eq!(
            serde_json::from_str::<LinkType>("\"categorizes\"").unwrap(),
            LinkType::Categorizes
        );
    }
}
