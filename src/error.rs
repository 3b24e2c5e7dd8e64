//! Public error type for the detection API.
//!
//! Strategy failures are handled internally by the orchestrator (a strategy
//! returns `None` and the decision tree falls through); only structurally
//! impossible input or an invalid configuration reaches the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    /// Fewer than two holes were supplied; no row structure can exist.
    #[error("insufficient input: {0} hole(s), at least 2 required")]
    InsufficientInput(usize),

    /// All holes are coincident (zero spatial extent).
    #[error("degenerate input: zero spatial extent")]
    DegenerateExtent,

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
