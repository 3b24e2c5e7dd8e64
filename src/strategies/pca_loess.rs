//! PCA + LOESS row binning.
//!
//! Points are rotated into the principal frame, a LOESS trend of the minor
//! coordinate over the major one absorbs global bending, and the residuals
//! cluster into parallel bands. Each band is one row, ordered along the
//! major axis. This is the workhorse for regular grids and gently curved
//! fans without sequence tokens.

use log::debug;

use super::{build_row, residual_confidence, Detection, StrategyContext};
use crate::math::loess::loess_smooth;
use crate::math::pca::pca2;

const LOESS_FRACTION: f64 = 0.3;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    if pts.len() < 4 {
        return None;
    }
    let spacing = ctx.spacing();
    let pca = pca2(pts)?;

    let along: Vec<f64> = pts.iter().map(|p| pca.project(*p)[0]).collect();
    let across: Vec<f64> = pts.iter().map(|p| pca.project(*p)[1]).collect();
    let trend = loess_smooth(&along, &across, LOESS_FRACTION);
    let resid: Vec<f64> = across
        .iter()
        .zip(&trend)
        .map(|(a, t)| a - t)
        .collect();

    // Bands form wherever the sorted residuals jump by more than half a
    // spacing; inside a band points stay within row-noise of each other.
    let mut by_resid: Vec<usize> = (0..pts.len()).collect();
    by_resid.sort_by(|&a, &b| {
        (resid[a], a)
            .partial_cmp(&(resid[b], b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let split = 0.5 * spacing;
    let mut bands: Vec<Vec<usize>> = Vec::new();
    for &i in &by_resid {
        match bands.last_mut() {
            Some(band) if (resid[i] - resid[*band.last().unwrap()]).abs() <= split => {
                band.push(i);
            }
            _ => bands.push(vec![i]),
        }
    }
    debug!(
        "pca-loess: {} points -> {} bands (spacing {:.3})",
        pts.len(),
        bands.len(),
        spacing
    );

    let singletons = bands.iter().filter(|b| b.len() == 1).count();
    let mut rows = Vec::with_capacity(bands.len());
    let mut dev_sum = 0.0;
    for mut band in bands {
        band.sort_by(|&a, &b| {
            (along[a], a)
                .partial_cmp(&(along[b], b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let center = band.iter().map(|&i| resid[i]).sum::<f64>() / band.len() as f64;
        dev_sum += band.iter().map(|&i| (resid[i] - center).abs()).sum::<f64>();
        rows.push(build_row(pts, band, spacing));
    }
    let mean_dev = dev_sum / pts.len() as f64;
    let singleton_share = singletons as f64 / rows.len().max(1) as f64;
    let confidence = residual_confidence(mean_dev, spacing) * (1.0 - 0.5 * singleton_share);

    Some(Detection {
        rows,
        confidence,
        winding: false,
    })
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;

    fn ctx_parts(pts: &[[f64; 2]]) -> (crate::analysis::PointSetStats, DetectorConfig) {
        let stats = analyze_point_set(pts, &vec![None; pts.len()]);
        (stats, DetectorConfig::default())
    }

    #[test]
    fn grid_bins_into_parallel_rows() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| [3.0 * (i % 5) as f64, 3.0 * (i / 5) as f64])
            .collect();
        let (stats, cfg) = ctx_parts(&pts);
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts: &pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 4);
        for row in &det.rows {
            assert_eq!(row.order.len(), 5);
            let y = pts[row.order[0]][1];
            assert!(row.order.iter().all(|&i| (pts[i][1] - y).abs() < 1e-9));
            // Ordered along the major axis.
            let xs: Vec<f64> = row.order.iter().map(|&i| pts[i][0]).collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(det.confidence > 0.9, "confidence={}", det.confidence);
    }

    #[test]
    fn concentric_arcs_follow_the_bend() {
        // Two arcs sharing a center, one spacing apart: the LOESS trend
        // absorbs the curvature so both bands survive intact.
        let mut pts = Vec::new();
        for r in [30.0f64, 33.0] {
            for i in 0..12 {
                let t = -0.5 + i as f64 / 11.0;
                pts.push([r * t.sin(), r * t.cos()]);
            }
        }
        let (stats, cfg) = ctx_parts(&pts);
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts: &pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 2, "rows={:?}", det.rows.len());
        assert!(det.rows.iter().all(|r| r.order.len() == 12));
    }
}
