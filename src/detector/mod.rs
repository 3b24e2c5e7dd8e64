//! The detection entry point: input validation, the recursive pipeline,
//! serpentine analysis and final validation, assembled into a
//! [`PatternResult`].

mod pipeline;
mod serpentine;
mod validate;

use std::time::Instant;

use log::info;

use crate::analysis::analyze_point_set;
use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::math::pca::pca2;
use crate::progress::Progress;
use crate::types::{Hole, PatternResult, Row, SubPatternInfo, SubPatternRole};

/// Stateless row/pattern detector. Construction validates the configuration;
/// every call to [`detect`](RowDetector::detect) is a pure function of the
/// supplied holes and the held configuration.
pub struct RowDetector {
    config: DetectorConfig,
}

impl RowDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Detector with the default parameter set.
    pub fn with_defaults() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs detection over the supplied holes.
    pub fn detect(&self, holes: &[Hole]) -> Result<PatternResult, DetectError> {
        self.detect_with_progress(holes, |_| {})
    }

    /// Like [`detect`](RowDetector::detect), reporting coarse stage progress
    /// through `progress`.
    pub fn detect_with_progress(
        &self,
        holes: &[Hole],
        mut progress: impl FnMut(Progress),
    ) -> Result<PatternResult, DetectError> {
        let started = Instant::now();
        if holes.len() < 2 {
            return Err(DetectError::InsufficientInput(holes.len()));
        }
        let pts: Vec<[f64; 2]> = holes.iter().map(Hole::xy).collect();
        let tokens: Vec<Option<&str>> = holes.iter().map(|h| h.sequence_token.as_deref()).collect();

        progress(Progress {
            percent: 5.0,
            stage: "analyze",
        });
        let stats = analyze_point_set(&pts, &tokens);
        if stats.extent <= 1e-9 {
            return Err(DetectError::DegenerateExtent);
        }

        progress(Progress {
            percent: 20.0,
            stage: "detect",
        });
        let indices: Vec<usize> = (0..holes.len()).collect();
        let detection = pipeline::detect_subset(&pts, &tokens, &indices, &self.config, 0);

        progress(Progress {
            percent: 70.0,
            stage: "serpentine",
        });
        let rows = number_rows(&pts, &detection);
        let (serpentine, serpentine_confidence) = serpentine::analyze(&pts, &rows);

        progress(Progress {
            percent: 85.0,
            stage: "validate",
        });
        let mut assigned = vec![false; holes.len()];
        for row in &rows {
            for &i in &row.holes {
                debug_assert!(!assigned[i], "hole {i} assigned twice");
                assigned[i] = true;
            }
        }
        let orphan_hole_ids: Vec<String> = holes
            .iter()
            .zip(&assigned)
            .filter_map(|(h, &a)| (!a).then(|| h.id.clone()))
            .collect();
        let validation = validate::validate(&pts, &rows, orphan_hole_ids.len(), &self.config.validate);
        let confidence = validate::overall_confidence(
            detection.confidence,
            &validation.metrics,
            validation.warnings.len(),
        );

        let pattern_type = pipeline::derive_pattern_type(&detection);
        let mut sub_patterns = detection.sub_patterns;
        if sub_patterns.is_empty() {
            // No separation happened: the whole set is one main group.
            let orientation_deg = pca2(&pts)
                .map(|p| crate::angle::normalize_half_pi(p.axis[1].atan2(p.axis[0])).to_degrees())
                .unwrap_or(0.0);
            sub_patterns.push(SubPatternInfo {
                role: SubPatternRole::Main,
                orientation_deg,
                hole_count: assigned.iter().filter(|&&a| a).count(),
            });
        }

        let latency_ms = started.elapsed().as_secs_f64() * 1e3;
        progress(Progress {
            percent: 100.0,
            stage: "done",
        });
        info!(
            "detected {} row(s), {:?}, serpentine={}, confidence {:.2}, {} orphan(s), {:.1} ms",
            rows.len(),
            pattern_type,
            serpentine,
            confidence,
            orphan_hole_ids.len(),
            latency_ms
        );
        Ok(PatternResult {
            rows,
            pattern_type,
            sub_patterns,
            serpentine,
            serpentine_confidence,
            confidence,
            metrics: validation.metrics,
            warnings: validation.warnings,
            orphan_hole_ids,
            hole_count: holes.len(),
            latency_ms,
        })
    }
}

/// Sorts detected rows along the pattern's minor axis and assigns indices.
fn number_rows(pts: &[[f64; 2]], detection: &pipeline::SubsetDetection) -> Vec<Row> {
    let minor = pca2(pts).map(|p| p.minor).unwrap_or([0.0, 1.0]);
    let mut keyed: Vec<(f64, usize)> = detection
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let n = row.order.len().max(1) as f64;
            let cx = row.order.iter().map(|&j| pts[j][0]).sum::<f64>() / n;
            let cy = row.order.iter().map(|&j| pts[j][1]).sum::<f64>() / n;
            (cx * minor[0] + cy * minor[1], i)
        })
        .collect();
    keyed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    keyed
        .into_iter()
        .enumerate()
        .map(|(index, (_, i))| {
            let src = &detection.rows[i];
            Row {
                index,
                holes: src.order.clone(),
                shape: src.shape,
                direction: src.direction,
            }
        })
        .collect()
}
