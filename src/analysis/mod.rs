//! Pre-detection analysis: point-set statistics, pattern classification and
//! sub-pattern separation.

pub mod classify;
pub mod point_set;
pub mod subpattern;

pub use classify::{classify, Classification, OrientationCluster};
pub use point_set::{analyze_point_set, PointSetStats};
pub use subpattern::{separate, SubPatternGroup};
