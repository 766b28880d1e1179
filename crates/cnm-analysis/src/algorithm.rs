//! Graph algorithm trait and result envelope

use crate::error::{AnalysisError, Result};
use crate::params::{AlgorithmParameter, Params, ResolvedParams};
use chrono::{DateTime, Utc};
use cnm_core::GraphData;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlgorithmCategory {
    GapDetection,
    PatternRecognition,
    RelationshipAnalysis,
}

impl AlgorithmCategory {
    pub const ALL: [AlgorithmCategory; 3] = [
        Self::GapDetection,
        Self::PatternRecognition,
        Self::RelationshipAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GapDetection => "GapDetection",
            Self::PatternRecognition => "PatternRecognition",
            Self::RelationshipAnalysis => "RelationshipAnalysis",
        }
    }
}

impl fmt::Display for AlgorithmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepts `GapDetection`, `gap-detection` and `gap_detection` spellings
impl FromStr for AlgorithmCategory {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == folded)
            .ok_or_else(|| AnalysisError::UnknownCategory(s.to_string()))
    }
}

/// Node and link counts of the analyzed graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSize {
    pub nodes: usize,
    pub links: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Wall-clock time of the run in milliseconds
    pub execution_time_ms: f64,
    pub graph_size: GraphSize,
    /// Effective parameters, defaults included
    pub parameters: Params,
    pub category: AlgorithmCategory,
}

/// Output of one algorithm execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmResult {
    pub algorithm_name: String,
    pub timestamp: DateTime<Utc>,
    /// Ordered rows, shaped per algorithm
    pub data: Vec<serde_json::Value>,
    pub metadata: ResultMetadata,
}

impl AlgorithmResult {
    /// Deserialize the rows into the algorithm's row type
    pub fn rows<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.data
            .iter()
            .map(|row| T::deserialize(row).map_err(AnalysisError::from))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Name, family and schema of a registered algorithm
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmDescriptor {
    pub name: String,
    pub category: AlgorithmCategory,
    pub description: String,
    pub parameters: Vec<AlgorithmParameter>,
}

/// Serialize typed rows into result rows
pub fn to_rows<T: Serialize>(rows: &[T]) -> Result<Vec<serde_json::Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(AnalysisError::from))
        .collect()
}

/// A named analysis over a read-only graph snapshot
///
/// Implementations must not keep state between runs: `run` is a pure
/// function of the graph and the resolved parameters, so one instance can
/// serve concurrent executions.
pub trait GraphAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn category(&self) -> AlgorithmCategory;

    fn description(&self) -> &'static str;

    /// Ordered parameter schema
    fn parameters(&self) -> Vec<AlgorithmParameter>;

    /// Compute rows from validated parameters
    fn run(&self, graph: &GraphData, params: &ResolvedParams) -> Result<Vec<serde_json::Value>>;

    /// Validate `params`, run, and wrap the rows with timing metadata
    ///
    /// Nothing runs when validation fails.
    fn execute(&self, graph: &GraphData, params: &Params) -> Result<AlgorithmResult> {
        let resolved = ResolvedParams::resolve(self.name(), &self.parameters(), params)?;
        let timestamp = Utc::now();
        let started = Instant::now();
        let data = self.run(graph, &resolved)?;
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(
            "{} produced {} rows in {:.2}ms ({} nodes, {} links)",
            self.name(),
            data.len(),
            execution_time_ms,
            graph.node_count(),
            graph.link_count()
        );

        Ok(AlgorithmResult {
            algorithm_name: self.name().to_string(),
            timestamp,
            data,
            metadata: ResultMetadata {
                execution_time_ms,
                graph_size: GraphSize {
                    nodes: graph.node_count(),
                    links: graph.link_count(),
                },
                parameters: resolved.into_values(),
                category: self.category(),
            },
        })
    }

    fn descriptor(&self) -> AlgorithmDescriptor {
        AlgorithmDescriptor {
            name: self.name().to_string(),
            category: self.category(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "gap-detection".parse::<AlgorithmCategory>().unwrap(),
            AlgorithmCategory::GapDetection
        );
        assert_eq!(
            "RelationshipAnalysis".parse::<AlgorithmCategory>().unwrap(),
            AlgorithmCategory::RelationshipAnalysis
        );
        assert_eq!(
            "pattern_recognition".parse::<AlgorithmCategory>().unwrap(),
            AlgorithmCategory::PatternRecognition
        );
        assert!("clustering".parse::<AlgorithmCategory>().is_err());
    }
}
