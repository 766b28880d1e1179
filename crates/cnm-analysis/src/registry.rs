//! Named algorithm registry

use crate::algorithm::{AlgorithmCategory, AlgorithmDescriptor, AlgorithmResult, GraphAlgorithm};
use crate::betweenness::BetweennessCentrality;
use crate::communities::ResearchClusterDetector;
use crate::degree::DegreeCentrality;
use crate::error::{AnalysisError, Result};
use crate::gaps::ResearchGapDetector;
use crate::pagerank::PageRank;
use crate::params::{AlgorithmParameter, Params};
use cnm_core::GraphData;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Algorithms by unique name
///
/// Constructed once at startup and shared read-only afterwards. Registering
/// a name twice is an error and leaves the first registration in place.
#[derive(Clone, Default)]
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<String, Arc<dyn GraphAlgorithm>>,
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("algorithms", &self.algorithms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in algorithm
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(BetweennessCentrality)?;
        registry.register(PageRank)?;
        registry.register(DegreeCentrality)?;
        registry.register(ResearchGapDetector)?;
        registry.register(ResearchClusterDetector)?;
        Ok(registry)
    }

    pub fn register(&mut self, algorithm: impl GraphAlgorithm + 'static) -> Result<()> {
        self.register_shared(Arc::new(algorithm))
    }

    pub fn register_shared(&mut self, algorithm: Arc<dyn GraphAlgorithm>) -> Result<()> {
        let name = algorithm.name();
        if self.algorithms.contains_key(name) {
            return Err(AnalysisError::DuplicateAlgorithm(name.to_string()));
        }
        tracing::debug!("Registered algorithm: {} ({})", name, algorithm.category());
        self.algorithms.insert(name.to_string(), algorithm);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn GraphAlgorithm>> {
        let removed = self.algorithms.remove(name);
        if removed.is_some() {
            tracing::debug!("Unregistered algorithm: {}", name);
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn GraphAlgorithm>> {
        self.algorithms.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    /// Algorithm names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }

    pub fn by_category(&self, category: AlgorithmCategory) -> Vec<Arc<dyn GraphAlgorithm>> {
        self.algorithms
            .values()
            .filter(|a| a.category() == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }

    /// Descriptors of every algorithm, or of one category
    pub fn descriptors(&self, category: Option<AlgorithmCategory>) -> Vec<AlgorithmDescriptor> {
        self.algorithms
            .values()
            .filter(|a| category.map_or(true, |c| a.category() == c))
            .map(|a| a.descriptor())
            .collect()
    }

    pub fn parameter_schema(&self, name: &str) -> Result<Vec<AlgorithmParameter>> {
        Ok(self.require(name)?.parameters())
    }

    /// Run a registered algorithm by name
    pub fn execute(&self, name: &str, graph: &GraphData, params: &Params) -> Result<AlgorithmResult> {
        self.require(name)?.execute(graph, params)
    }

    fn require(&self, name: &str) -> Result<&Arc<dyn GraphAlgorithm>> {
        self.algorithms
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownAlgorithm(name.to_string()))
    }
}
