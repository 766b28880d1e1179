//! CNM Analysis - Pluggable algorithms over knowledge graph snapshots
//!
//! Algorithms implement [`GraphAlgorithm`] and are looked up by name through
//! an explicitly constructed [`AlgorithmRegistry`].

pub mod algorithm;
pub mod betweenness;
pub mod communities;
pub mod degree;
pub mod error;
pub mod gaps;
pub mod pagerank;
pub mod params;
pub mod registry;

pub use algorithm::{
    to_rows, AlgorithmCategory, AlgorithmDescriptor, AlgorithmResult, GraphAlgorithm, GraphSize,
    ResultMetadata,
};
pub use betweenness::{BetweennessCentrality, CentralityRow};
pub use communities::{ClusterRow, ResearchClusterDetector};
pub use degree::{DegreeCentrality, DegreeRow};
pub use error::{AnalysisError, Result};
pub use gaps::{GapRow, ResearchGapDetector};
pub use pagerank::{PageRank, PageRankRow};
pub use params::{AlgorithmParameter, ParamValue, ParameterType, Params, ResolvedParams};
pub use registry::AlgorithmRegistry;
