//! The recursive detection pipeline: per-subset classification, sub-pattern
//! recursion and the strategy priority tree.
//!
//! A subset is detected either by recursing into its separated sub-patterns
//! (MultiPattern, within the depth cap) or by walking the strategy priority
//! order until one result clears its confidence gate. Strategy failures are
//! swallowed here and only ever cause fallthrough.

use log::debug;

use crate::analysis::{analyze_point_set, classify, separate};
use crate::config::DetectorConfig;
use crate::strategies::{Detection, Strategy, StrategyContext};
use crate::types::{PatternType, SubPatternInfo};

/// Fraction of the confidence gate the density/backbone fallbacks must clear.
const FALLBACK_GATE_FACTOR: f64 = 0.6;

/// Detection outcome for one subset, with row orders in input-global indices.
pub(crate) struct SubsetDetection {
    pub rows: Vec<GlobalRow>,
    pub sub_patterns: Vec<SubPatternInfo>,
    /// Hole-count-weighted strategy confidence.
    pub confidence: f64,
    pub winding: bool,
}

pub(crate) struct GlobalRow {
    pub order: Vec<usize>,
    pub shape: crate::types::RowShape,
    pub direction: [f64; 2],
}

/// Detects rows for the subset named by `indices` (indices into `pts_all`).
pub(crate) fn detect_subset(
    pts_all: &[[f64; 2]],
    tokens_all: &[Option<&str>],
    indices: &[usize],
    config: &DetectorConfig,
    depth: usize,
) -> SubsetDetection {
    let pts: Vec<[f64; 2]> = indices.iter().map(|&i| pts_all[i]).collect();
    let tokens: Vec<Option<&str>> = indices.iter().map(|&i| tokens_all[i]).collect();
    let stats = analyze_point_set(&pts, &tokens);
    let classification = classify(&pts, stats.median_spacing, config);
    debug!(
        "subset depth {}: n={} {:?} ratio={:.2} curvature={:.3}",
        depth,
        pts.len(),
        classification.pattern_type,
        classification.variance_ratio,
        classification.curvature_mean
    );

    let depth_capped = depth + 1 >= config.detect.max_recursion_depth;
    if classification.pattern_type == PatternType::MultiPattern && !depth_capped {
        let groups = separate(&pts, &classification, stats.median_spacing);
        if groups.len() > 1 {
            let mut rows = Vec::new();
            let mut sub_patterns = Vec::new();
            let mut winding = false;
            let mut conf_weighted = 0.0;
            for group in &groups {
                sub_patterns.push(SubPatternInfo {
                    role: group.role,
                    orientation_deg: group.orientation.to_degrees(),
                    hole_count: group.indices.len(),
                });
                let global: Vec<usize> = group.indices.iter().map(|&i| indices[i]).collect();
                let nested = detect_subset(pts_all, tokens_all, &global, config, depth + 1);
                conf_weighted += nested.confidence * global.len() as f64;
                winding |= nested.winding;
                // Deeper splits are real sub-patterns too; plain subsets
                // report none.
                sub_patterns.extend(nested.sub_patterns);
                rows.extend(nested.rows);
            }
            let confidence = conf_weighted / indices.len().max(1) as f64;
            return SubsetDetection {
                rows,
                sub_patterns,
                confidence,
                winding,
            };
        }
    }

    let ctx = StrategyContext {
        pts: &pts,
        stats: &stats,
        classification: &classification,
        config,
    };
    let force_density = classification.pattern_type == PatternType::MultiPattern && depth_capped;
    let (detection, strategy) = orchestrate(&ctx, force_density);
    debug!(
        "subset depth {}: {} -> {} row(s), confidence {:.2}",
        depth,
        strategy.name(),
        detection.rows.len(),
        detection.confidence
    );
    SubsetDetection {
        rows: detection
            .rows
            .into_iter()
            .map(|r| GlobalRow {
                order: r.order.into_iter().map(|i| indices[i]).collect(),
                shape: r.shape,
                direction: r.direction,
            })
            .collect(),
        sub_patterns: Vec::new(),
        confidence: detection.confidence,
        winding: detection.winding,
    }
}

/// Walks the strategy priority order and returns the first detection above
/// its gate, ending with the unconditional single-row terminator.
fn orchestrate(ctx: &StrategyContext, force_density: bool) -> (Detection, Strategy) {
    let gate = ctx.config.detect.min_confidence;
    let fallback_gate = gate * FALLBACK_GATE_FACTOR;
    let attempt = |strategy: Strategy, min: f64| -> Option<(Detection, Strategy)> {
        match strategy.run(ctx) {
            Some(det) if det.confidence >= min => Some((det, strategy)),
            Some(det) => {
                debug!(
                    "{}: confidence {:.2} below gate {:.2}",
                    strategy.name(),
                    det.confidence,
                    min
                );
                None
            }
            None => {
                debug!("{}: not applicable", strategy.name());
                None
            }
        }
    };

    if force_density {
        // Recursion depth exhausted on a still-mixed subset.
        if let Some(hit) = attempt(Strategy::Density, fallback_gate) {
            return hit;
        }
    }
    if let Some(hit) = attempt(Strategy::Winding, gate) {
        return hit;
    }

    let reliable = ctx.stats.sequence_reliability >= ctx.config.detect.sequence_reliability_thresh;
    let curved = ctx.classification.pattern_type == PatternType::Curved;
    if reliable {
        // The line fit runs first even on a curved verdict: wide grids land
        // in the curved lane through the variance-ratio cutoff, and the line
        // fit's split rules recover their rows where the spline would thread
        // a serpentine sequence as one snake. Tight curves drop its
        // confidence below the gate and fall through to the spline.
        for strategy in [Strategy::SequenceLine, Strategy::SplineFit] {
            if let Some(hit) = attempt(strategy, gate) {
                return hit;
            }
        }
    }
    if curved {
        // Principal curve cross-checked against the MST path; the better
        // residual (higher confidence) wins.
        let pc = Strategy::PrincipalCurve.run(ctx);
        let mst = Strategy::MstPath.run(ctx);
        let best = match (pc, mst) {
            (Some(a), Some(b)) => Some(if b.confidence > a.confidence {
                (b, Strategy::MstPath)
            } else {
                (a, Strategy::PrincipalCurve)
            }),
            (Some(a), None) => Some((a, Strategy::PrincipalCurve)),
            (None, Some(b)) => Some((b, Strategy::MstPath)),
            (None, None) => None,
        };
        if let Some((det, strategy)) = best {
            if det.confidence >= gate {
                return (det, strategy);
            }
            debug!(
                "{}: confidence {:.2} below gate {:.2}",
                strategy.name(),
                det.confidence,
                gate
            );
        }
    }
    // Partial numbering suggests a drilling sequence the tokens alone cannot
    // order; the bearing traversal can still recover the turn points.
    if !reliable && ctx.stats.sequence_order.is_some() {
        if let Some(hit) = attempt(Strategy::KnnBearing, gate) {
            return hit;
        }
    }
    if let Some(hit) = attempt(Strategy::PcaLoess, gate) {
        return hit;
    }
    if !force_density {
        if let Some(hit) = attempt(Strategy::Density, fallback_gate) {
            return hit;
        }
    }
    if let Some(hit) = attempt(Strategy::Backbone, fallback_gate) {
        return hit;
    }
    (crate::strategies::fallback::single_row(ctx), Strategy::SingleRow)
}

/// Derives the result-level pattern type from what was actually detected.
pub(crate) fn derive_pattern_type(detection: &SubsetDetection) -> PatternType {
    if detection.sub_patterns.len() > 1 {
        return PatternType::MultiPattern;
    }
    let curved = detection
        .rows
        .iter()
        .filter(|r| r.shape != crate::types::RowShape::Straight)
        .count();
    if detection.winding || 2 * curved > detection.rows.len() {
        PatternType::Curved
    } else {
        PatternType::Straight
    }
}
