//! Error types for table construction.

use alloc::collections::TryReserveError;

/// Errors that can occur while constructing a table.
///
/// Lookups and removals never fail: absence is reported as `None` or `false`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A table needs at least one bucket.
    #[error("table capacity must be non-zero")]
    ZeroCapacity,

    /// The open-addressing table reduces keys with a mask and needs a
    /// power-of-two capacity.
    #[error("open-addressing capacity must be a power of two, got {0}")]
    NotPowerOfTwo(usize),

    /// The slot array could not be allocated.
    #[error("failed to allocate storage for {capacity} slots")]
    Allocation {
        /// Number of slots that were requested.
        capacity: usize,
        /// The allocator's report.
        #[source]
        source: TryReserveError,
    },
}
