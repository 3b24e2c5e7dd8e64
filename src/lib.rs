#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod edit;
pub mod error;
pub mod progress;
pub mod types;

// "Expert" modules – still public, but considered unstable internals.
pub mod analysis;
pub mod angle;
pub mod graph;
pub mod math;
pub mod strategies;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector, configuration and results.
pub use crate::config::DetectorConfig;
pub use crate::detector::RowDetector;
pub use crate::error::DetectError;
pub use crate::progress::Progress;
pub use crate::types::{
    Hole, HoleLabel, LayoutClass, PatternResult, PatternType, Row, RowShape, SubPatternInfo,
    SubPatternRole,
};

// Post-detection manual override helpers.
pub use crate::edit::{invert_row, rename_row, resequence};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use row_detector::prelude::*;
///
/// let holes = vec![
///     Hole::new("H0", 0.0, 0.0, 0.0),
///     Hole::new("H1", 3.0, 0.0, 0.0),
///     Hole::new("H2", 6.0, 0.0, 0.0),
/// ];
/// let detector = RowDetector::with_defaults();
/// let result = detector.detect(&holes).unwrap();
/// println!("rows={} confidence={:.3}", result.rows.len(), result.confidence);
/// ```
pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::detector::RowDetector;
    pub use crate::types::{Hole, PatternResult, PatternType, RowShape};
}
