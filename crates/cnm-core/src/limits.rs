//! Input validation limits for caller-supplied query arguments

/// Maximum neighbor expansion depth (50)
pub const MAX_TRAVERSAL_DEPTH: u32 = 50;

/// Maximum nodes per render cluster (10000)
pub const MAX_CLUSTER_SIZE: usize = 10_000;

/// Maximum filter query length (256 chars)
pub const MAX_QUERY_LEN: usize = 256;

/// Maximum markdown document size (16MB)
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    TraversalDepthTooLarge { depth: u32, max: u32 },
    ClusterSizeOutOfRange { size: usize, max: usize },
    QueryTooLong { len: usize, max: usize },
    DocumentTooLarge { len: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TraversalDepthTooLarge { depth, max } => {
                write!(f, "Traversal depth too large: {} (max {})", depth, max)
            }
            Self::ClusterSizeOutOfRange { size, max } => {
                write!(f, "Cluster size out of range: {} (1..={})", size, max)
            }
            Self::QueryTooLong { len, max } => {
                write!(f, "Query too long: {} chars (max {})", len, max)
            }
            Self::DocumentTooLarge { len, max } => {
                write!(f, "Document too large: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate traversal depth
pub fn validate_traversal_depth(depth: u32) -> Result<(), ValidationError> {
    if depth > MAX_TRAVERSAL_DEPTH {
        return Err(ValidationError::TraversalDepthTooLarge {
            depth,
            max: MAX_TRAVERSAL_DEPTH,
        });
    }
    Ok(())
}

/// Validate cluster size cap
pub fn validate_cluster_size(size: usize) -> Result<(), ValidationError> {
    if size == 0 || size > MAX_CLUSTER_SIZE {
        return Err(ValidationError::ClusterSizeOutOfRange {
            size,
            max: MAX_CLUSTER_SIZE,
        });
    }
    Ok(())
}

/// Validate filter query
pub fn validate_query(query: &str) -> Result<(), ValidationError> {
    let len = query.chars().count();
    if len > MAX_QUERY_LEN {
        return Err(ValidationError::QueryTooLong {
            len,
            max: MAX_QUERY_LEN,
        });
    }
    Ok(())
}

/// Validate markdown document size
pub fn validate_document(text: &str) -> Result<(), ValidationError> {
    if text.len() > MAX_DOCUMENT_BYTES {
        return Err(ValidationError::DocumentTooLarge {
            len: text.len(),
            max: MAX_DOCUMENT_BYTES,
        });
    }
    Ok(())
}
