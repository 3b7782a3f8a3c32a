//! Error types for the syndicate-agents crate.
//!
//! Both errors are recoverable: the caller logs them and carries on with
//! the next tick.

/// Errors raised by the counter-intelligence sweep.
#[derive(Debug, thiserror::Error)]
pub enum InvestigationError {
    /// The member snapshot could not be allocated.
    #[error("could not allocate snapshot for {members} members: {source}")]
    Allocation {
        /// Number of members the snapshot needed room for.
        members: usize,
        /// The underlying allocation failure.
        source: std::collections::TryReserveError,
    },
}

/// Errors raised while storing police intelligence.
#[derive(Debug, thiserror::Error)]
pub enum PoliceError {
    /// The report buffer could not grow to hold another report.
    #[error("report buffer could not grow beyond {capacity} entries")]
    BufferGrowth {
        /// Capacity at the time of the failed growth.
        capacity: usize,
    },
}
