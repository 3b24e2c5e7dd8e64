//! Parameter types configuring the detection pipeline.
//!
//! This module groups the knobs for pattern classification, sub-pattern
//! separation, the row-detection strategies and post-detection validation.
//! One immutable [`DetectorConfig`] value is threaded through the whole
//! pipeline; there is no ambient/global configuration.
//!
//! Defaults aim for typical bench layouts (2–6 m spacing, tens to a few
//! hundred holes). For tuning, start with the classification cutoffs and the
//! snake-angle threshold.

use crate::error::DetectError;
use serde::{Deserialize, Serialize};

/// Detector-wide configuration controlling the multi-stage pipeline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub classify: ClassifyParams,
    pub detect: DetectParams,
    pub density: DensityParams,
    pub validate: ValidateParams,
}

impl DetectorConfig {
    /// Rejects out-of-range values before any strategy runs.
    pub fn validate(&self) -> Result<(), DetectError> {
        let c = &self.classify;
        if c.variance_ratio_straight <= c.variance_ratio_curved {
            return Err(DetectError::InvalidConfig(format!(
                "variance_ratio_straight ({}) must exceed variance_ratio_curved ({})",
                c.variance_ratio_straight, c.variance_ratio_curved
            )));
        }
        if c.curvature_curved <= c.curvature_straight {
            return Err(DetectError::InvalidConfig(format!(
                "curvature_curved ({}) must exceed curvature_straight ({})",
                c.curvature_curved, c.curvature_straight
            )));
        }
        if !(1.0..90.0).contains(&c.orientation_tol_deg) {
            return Err(DetectError::InvalidConfig(format!(
                "orientation_tol_deg ({}) must lie in (1, 90)",
                c.orientation_tol_deg
            )));
        }
        if c.curvature_neighbors < 3 {
            return Err(DetectError::InvalidConfig(
                "curvature_neighbors must be at least 3".into(),
            ));
        }
        let d = &self.detect;
        if !(75.0..=105.0).contains(&d.snake_angle_deg) {
            return Err(DetectError::InvalidConfig(format!(
                "snake_angle_deg ({}) must lie in [75, 105]",
                d.snake_angle_deg
            )));
        }
        if !(0.0..=1.0).contains(&d.min_confidence) {
            return Err(DetectError::InvalidConfig(format!(
                "min_confidence ({}) must lie in [0, 1]",
                d.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&d.sequence_reliability_thresh) {
            return Err(DetectError::InvalidConfig(format!(
                "sequence_reliability_thresh ({}) must lie in [0, 1]",
                d.sequence_reliability_thresh
            )));
        }
        if d.max_recursion_depth == 0 {
            return Err(DetectError::InvalidConfig(
                "max_recursion_depth must be at least 1".into(),
            ));
        }
        let n = &self.density;
        if n.min_pts < 2 {
            return Err(DetectError::InvalidConfig(
                "min_pts must be at least 2".into(),
            ));
        }
        if let Some(eps) = n.eps_override {
            if !eps.is_finite() || eps <= 0.0 {
                return Err(DetectError::InvalidConfig(format!(
                    "eps_override ({eps}) must be finite and positive"
                )));
            }
        }
        let v = &self.validate;
        if v.gap_factor <= 1.0 {
            return Err(DetectError::InvalidConfig(format!(
                "gap_factor ({}) must exceed 1.0",
                v.gap_factor
            )));
        }
        Ok(())
    }
}

/// Cutoffs used by the pattern classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifyParams {
    /// Minimum PCA eigenvalue ratio for a straight classification.
    pub variance_ratio_straight: f64,
    /// Below this ratio the set is considered curved.
    pub variance_ratio_curved: f64,
    /// Maximum mean |curvature| (1/m) still considered straight.
    pub curvature_straight: f64,
    /// Mean |curvature| above this is considered curved.
    pub curvature_curved: f64,
    /// Angular tolerance (degrees, mod 180) when clustering local bearings.
    pub orientation_tol_deg: f64,
    /// Neighbours per point for the local circle fit.
    pub curvature_neighbors: usize,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            variance_ratio_straight: 5.0,
            variance_ratio_curved: 3.0,
            curvature_straight: 0.1,
            curvature_curved: 0.3,
            orientation_tol_deg: 15.0,
            curvature_neighbors: 5,
        }
    }
}

/// Knobs shared by the orchestrator and the detection strategies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectParams {
    /// First strategy result at or above this confidence is accepted.
    pub min_confidence: f64,
    /// Sequence tokens are trusted when at least this fraction parses into a
    /// monotonic order.
    pub sequence_reliability_thresh: f64,
    /// Cumulative bearing change (degrees) over a 4-point window that flags a
    /// winding direction reversal. Valid range 75–105.
    pub snake_angle_deg: f64,
    /// Bearing deviation (degrees) that ends a row during k-NN traversal.
    pub gentle_turn_deg: f64,
    /// Bearing deviation (degrees) treated as a serpentine turn point.
    pub reversal_deg: f64,
    /// Override for the k-NN graph degree; `None` derives k = min(6, n/5).
    pub knn_k: Option<usize>,
    /// Recursion cap for multi-pattern separation; past it the density
    /// fallback is forced.
    pub max_recursion_depth: usize,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            min_confidence: 0.45,
            sequence_reliability_thresh: 0.7,
            snake_angle_deg: 90.0,
            gentle_turn_deg: 30.0,
            reversal_deg: 150.0,
            knn_k: None,
            max_recursion_depth: 3,
        }
    }
}

/// Density-clustering (DBSCAN) parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DensityParams {
    /// Neighbourhood radius; `None` derives ε from the k-distance elbow.
    pub eps_override: Option<f64>,
    /// Minimum neighbourhood size for a core point.
    pub min_pts: usize,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            eps_override: None,
            min_pts: 3,
        }
    }
}

/// Post-detection validation tolerances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidateParams {
    /// Intra-row gap warning threshold as a multiple of median spacing.
    pub gap_factor: f64,
    /// Half-width of the offset-ratio bands classifying square/staggered.
    pub offset_band: f64,
}

impl Default for ValidateParams {
    fn default() -> Self {
        Self {
            gap_factor: 2.0,
            offset_band: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn snake_angle_out_of_range_is_rejected() {
        let mut cfg = DetectorConfig::default();
        cfg.detect.snake_angle_deg = 60.0;
        assert!(matches!(
            cfg.validate(),
            Err(DetectError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_variance_cutoffs_are_rejected() {
        let mut cfg = DetectorConfig::default();
        cfg.classify.variance_ratio_straight = 2.0;
        assert!(cfg.validate().is_err());
    }
}
