//! Post-detection validation: burden/spacing metrics, layout class, gap and
//! orphan warnings, and the overall confidence score.
//!
//! Geometric irregularity never hard-fails; it only lowers confidence and
//! adds warnings to the report.

use log::debug;

use crate::angle::dist;
use crate::config::ValidateParams;
use crate::math::mean_std;
use crate::types::{BurdenSpacingMetrics, LayoutClass, Row};

pub(crate) struct Validation {
    pub metrics: BurdenSpacingMetrics,
    pub warnings: Vec<String>,
}

pub(crate) fn validate(
    pts: &[[f64; 2]],
    rows: &[Row],
    orphan_count: usize,
    params: &ValidateParams,
) -> Validation {
    let mut warnings = Vec::new();

    // Intra-row spacing over all adjacent in-row hole pairs.
    let mut spacings = Vec::new();
    for row in rows {
        for w in row.holes.windows(2) {
            spacings.push(dist(pts[w[0]], pts[w[1]]));
        }
    }
    let (spacing_mean, spacing_std) = mean_std(&spacings);

    // Gaps: a step much longer than the typical spacing breaks contiguity.
    if spacing_mean > 0.0 {
        for row in rows {
            for (pos, w) in row.holes.windows(2).enumerate() {
                let step = dist(pts[w[0]], pts[w[1]]);
                if step > params.gap_factor * spacing_mean {
                    warnings.push(format!(
                        "row {}: gap of {:.1} between positions {} and {} (mean spacing {:.1})",
                        row.index,
                        step,
                        pos + 1,
                        pos + 2,
                        spacing_mean
                    ));
                }
            }
        }
    }

    // Burden and along-row offset between adjacent rows. The burden is the
    // perpendicular distance from the next row's centroid to the current
    // row's backbone line.
    let mut burdens = Vec::new();
    let mut offsets = Vec::new();
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.holes.is_empty() || b.holes.is_empty() {
            continue;
        }
        let ca = centroid(pts, &a.holes);
        let cb = centroid(pts, &b.holes);
        let dir = a.direction;
        let dx = cb[0] - ca[0];
        let dy = cb[1] - ca[1];
        burdens.push((dx * dir[1] - dy * dir[0]).abs());
        if spacing_mean > 0.0 {
            // Fractional along-row misalignment of b's holes against a's,
            // folded into [0, 0.5] spacings.
            let alongs_a: Vec<f64> = a
                .holes
                .iter()
                .map(|&i| (pts[i][0] - ca[0]) * dir[0] + (pts[i][1] - ca[1]) * dir[1])
                .collect();
            let mut sum = 0.0;
            for &i in &b.holes {
                let along = (pts[i][0] - ca[0]) * dir[0] + (pts[i][1] - ca[1]) * dir[1];
                let nearest = alongs_a
                    .iter()
                    .map(|&x| (along - x).abs())
                    .fold(f64::INFINITY, f64::min);
                sum += (nearest / spacing_mean).min(0.5);
            }
            offsets.push(sum / b.holes.len() as f64);
        }
    }
    let (burden_mean, burden_std) = mean_std(&burdens);
    let (offset_ratio, _) = mean_std(&offsets);
    let layout = if offsets.is_empty() {
        LayoutClass::Irregular
    } else if offset_ratio <= params.offset_band {
        LayoutClass::Square
    } else if (offset_ratio - 0.5).abs() <= params.offset_band {
        LayoutClass::Staggered
    } else {
        LayoutClass::Irregular
    };

    if orphan_count > 0 {
        warnings.push(format!(
            "{orphan_count} hole(s) could not be assigned to any row"
        ));
    }
    debug!(
        "validate: spacing {:.2}±{:.2} burden {:.2}±{:.2} offset {:.2} ({:?}), {} warning(s)",
        spacing_mean,
        spacing_std,
        burden_mean,
        burden_std,
        offset_ratio,
        layout,
        warnings.len()
    );

    Validation {
        metrics: BurdenSpacingMetrics {
            spacing_mean,
            spacing_std,
            burden_mean,
            burden_std,
            offset_ratio,
            layout,
        },
        warnings,
    }
}

/// Overall score: strategy confidence damped by spacing irregularity (the
/// coefficient of variation) and by accumulated warnings.
pub(crate) fn overall_confidence(
    strategy_confidence: f64,
    metrics: &BurdenSpacingMetrics,
    warning_count: usize,
) -> f64 {
    let regularity = if metrics.spacing_mean > 0.0 {
        1.0 / (1.0 + metrics.spacing_std / metrics.spacing_mean)
    } else {
        1.0
    };
    let penalty = 0.95f64.powi(warning_count as i32);
    (strategy_confidence * regularity * penalty).clamp(0.0, 1.0)
}

fn centroid(pts: &[[f64; 2]], holes: &[usize]) -> [f64; 2] {
    let n = holes.len() as f64;
    let x = holes.iter().map(|&i| pts[i][0]).sum::<f64>() / n;
    let y = holes.iter().map(|&i| pts[i][1]).sum::<f64>() / n;
    [x, y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowShape;

    fn row(index: usize, holes: Vec<usize>) -> Row {
        Row {
            index,
            holes,
            shape: RowShape::Straight,
            direction: [1.0, 0.0],
        }
    }

    #[test]
    fn square_grid_metrics() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| [3.0 * (i % 5) as f64, 3.0 * (i / 5) as f64])
            .collect();
        let rows: Vec<Row> = (0..4)
            .map(|r| row(r, (r * 5..r * 5 + 5).collect()))
            .collect();
        let v = validate(&pts, &rows, 0, &ValidateParams::default());
        assert!((v.metrics.spacing_mean - 3.0).abs() < 1e-9);
        assert!(v.metrics.spacing_std < 1e-9);
        assert!((v.metrics.burden_mean - 3.0).abs() < 1e-9);
        assert!(v.metrics.offset_ratio < 1e-9);
        assert_eq!(v.metrics.layout, LayoutClass::Square);
        assert!(v.warnings.is_empty());
        assert!(overall_confidence(1.0, &v.metrics, v.warnings.len()) > 0.99);
    }

    #[test]
    fn staggered_grid_and_gap_warning() {
        // Rows offset by half a spacing, with holes missing from row 1.
        let mut pts: Vec<[f64; 2]> = (0..5).map(|i| [3.0 * i as f64, 0.0]).collect();
        pts.extend([[1.5, 3.0], [4.5, 3.0], [13.5, 3.0]]);
        let rows = vec![row(0, vec![0, 1, 2, 3, 4]), row(1, vec![5, 6, 7])];
        let v = validate(&pts, &rows, 0, &ValidateParams::default());
        assert_eq!(v.metrics.layout, LayoutClass::Staggered);
        // The 9.0 step between x=4.5 and x=13.5 exceeds 2x the mean spacing.
        assert_eq!(v.warnings.len(), 1, "warnings: {:?}", v.warnings);
    }

    #[test]
    fn orphans_produce_a_warning() {
        let pts: Vec<[f64; 2]> = (0..4).map(|i| [3.0 * i as f64, 0.0]).collect();
        let rows = vec![row(0, vec![0, 1, 2])];
        let v = validate(&pts, &rows, 1, &ValidateParams::default());
        assert_eq!(v.warnings.len(), 1);
        assert!(v.warnings[0].contains("assigned"));
    }
}
