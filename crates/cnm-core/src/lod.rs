//! Level-of-detail visibility decisions

use crate::node::Node;
use serde::{Deserialize, Serialize};

fn default_near_distance() -> f64 {
    300.0
}

fn default_importance_per_unit() -> f64 {
    0.01
}

/// Distance-scaled importance threshold
///
/// Within `near_distance` every node renders. Beyond it a node renders only
/// when its importance exceeds `(distance - near_distance) * importance_per_unit`.
/// Visibility therefore never grows with distance and never shrinks with
/// importance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOfDetail {
    #[serde(default = "default_near_distance")]
    pub near_distance: f64,

    #[serde(default = "default_importance_per_unit")]
    pub importance_per_unit: f64,
}

impl Default for LevelOfDetail {
    fn default() -> Self {
        Self {
            near_distance: default_near_distance(),
            importance_per_unit: default_importance_per_unit(),
        }
    }
}

impl LevelOfDetail {
    /// Negative inputs are clamped to zero
    pub fn new(near_distance: f64, importance_per_unit: f64) -> Self {
        Self {
            near_distance: near_distance.max(0.0),
            importance_per_unit: importance_per_unit.max(0.0),
        }
    }

    /// Importance a node must exceed to render at `distance`
    pub fn importance_threshold(&self, distance: f64) -> f64 {
        (distance - self.near_distance).max(0.0) * self.importance_per_unit
    }

    /// Whether `node` should render at `distance` from the camera
    ///
    /// A NaN distance never renders.
    pub fn should_render(&self, node: &Node, distance: f64) -> bool {
        if distance.is_nan() {
            return false;
        }
        if distance <= self.near_distance {
            return true;
        }
        node.importance() > self.importance_threshold(distance)
    }
}

/// [`LevelOfDetail::should_render`] with default thresholds
pub fn should_render_node(node: &Node, distance: f64) -> bool {
    LevelOfDetail::default().should_render(node, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Category, NodeType};

    fn node(value: Option<f64>) -> Node {
        let node = Node::new("n", NodeType::Entity(Category::Material), "N");
        match value {
            Some(v) => node.with_value(v),
            None => node,
        }
    }

    #[test]
    fn test_near_nodes_always_render() {
        assert!(should_render_node(&node(None), 0.0));
        assert!(should_render_node(&node(None), 300.0));
        assert!(should_render_node(&node(Some(-5.0)), 10.0));
    }

    #[test]
    fn test_far_nodes_need_importance() {
        // Threshold at 500 is (500 - 300) * 0.01 = 2.0
        assert!(!should_render_node(&node(None), 500.0));
        assert!(!should_render_node(&node(Some(2.0)), 500.0));
        assert!(should_render_node(&node(Some(2.5)), 500.0));
        assert!(!should_render_node(&node(Some(1e9)), f64::INFINITY));
        assert!(!should_render_node(&node(Some(1e9)), f64::NAN));
    }

    #[test]
    fn test_monotonic_in_distance_and_importance() {
        let lod = LevelOfDetail::new(50.0, 0.05);
        let distances: Vec<f64> = (0..40).map(|i| i as f64 * 25.0).collect();
        let values: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();

        for &v in &values {
            let n = node(Some(v));
            for pair in distances.windows(2) {
                // farther never renders what nearer hides
                assert!(!lod.should_render(&n, pair[1]) || lod.should_render(&n, pair[0]));
            }
        }
        for &d in &distances {
            for pair in values.windows(2) {
                let less = node(Some(pair[0]));
                let more = node(Some(pair[1]));
                assert!(!lod.should_render(&less, d) || lod.should_render(&more, d));
            }
        }
    }

    #[test]
    fn test_negative_config_clamped() {
        let lod = LevelOfDetail::new(-10.0, -1.0);
        assert_eq!(lod.near_distance, 0.0);
        assert_eq!(lod.importance_threshold(100.0), 0.0);
    }
}
