//! Reconciliation of cash closings
//!
//! Severity classification of a closing's discrepancy, justification
//! balancing, and the statistics and filters that every review screen builds
//! on top of them. All functions are pure.

pub mod classifier;
pub mod justification;
pub mod stats;

pub use classifier::*;
pub use justification::*;
pub use stats::*;
