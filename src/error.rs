// error.rs — Validation errors for domains, partitions, and dispatch.
//
// Every variant here is detected before the first kernel invocation.
// A run either completes over the whole domain or fails up front; there is
// no partially written output and nothing is transient, so callers have
// nothing to retry.

/// Result type for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which axis of a domain a partition error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Cols,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Rows => write!(f, "rows"),
            Axis::Cols => write!(f, "cols"),
        }
    }
}

/// Errors that can occur while building domains or dispatching kernels.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An extent is zero, or `rows * cols` overflows `usize`.
    #[error("invalid domain {rows}×{cols}: extents must be positive")]
    InvalidDomain { rows: usize, cols: usize },

    /// The local tile does not evenly divide the global extent.
    #[error("invalid partition: local size {local} does not divide {axis} extent {extent}")]
    InvalidPartition { axis: Axis, extent: usize, local: usize },

    /// A buffer length disagrees with the domain size.
    #[error("domain mismatch: domain has {expected} coordinates, buffer has {actual} elements")]
    DomainMismatch { expected: usize, actual: usize },

    /// An input buffer has the right length but a different shape.
    #[error("shape mismatch: domain is {}×{}, input buffer is {}×{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    ShapeMismatch { expected: (usize, usize), actual: (usize, usize) },

    /// The indexed-grid strategy was given a domain that was never partitioned.
    #[error("task '{task}' needs a worker grid: call partition() before indexed-grid dispatch")]
    PartitionRequired { task: String },

    /// The blur weight table is malformed.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A strategy selector string did not name any known strategy.
    #[error("unknown strategy '{0}' (expected seq, mt, loop or grid)")]
    UnknownStrategy(String),

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
