//! Tricube-weighted local linear smoother (LOESS).
//!
//! Smooths y over x with a sliding window of the nearest fraction of points,
//! fitting a weighted line per query. Used by the PCA-LOESS binning strategy
//! (spine estimate along the principal axis) and by the principal-curve
//! iteration. Input x need not be sorted; neighbourhoods are selected by
//! absolute distance in x.

/// Smooths `y` as a function of `x` at every sample position.
///
/// `fraction` is the bandwidth as a share of the sample (clamped so the
/// window always holds at least two points). Falls back to the raw value
/// where the local weight mass degenerates.
pub fn loess_smooth(x: &[f64], y: &[f64], fraction: f64) -> Vec<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 3 {
        return y.to_vec();
    }
    let span = ((fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize).max(2);

    let mut out = Vec::with_capacity(n);
    let mut dists: Vec<(f64, usize)> = Vec::with_capacity(n);
    for i in 0..n {
        dists.clear();
        for j in 0..n {
            dists.push(((x[j] - x[i]).abs(), j));
        }
        dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let window = &dists[..span.min(n)];
        let h = window.last().map(|w| w.0).unwrap_or(0.0).max(1e-12);

        // Weighted linear fit: minimize Σ w (a + b·dx - y)².
        let mut sw = 0.0;
        let mut swx = 0.0;
        let mut swy = 0.0;
        let mut swxx = 0.0;
        let mut swxy = 0.0;
        for &(d, j) in window {
            let u = (d / h).min(1.0);
            let w = {
                let t = 1.0 - u * u * u;
                t * t * t
            };
            let dx = x[j] - x[i];
            sw += w;
            swx += w * dx;
            swy += w * y[j];
            swxx += w * dx * dx;
            swxy += w * dx * y[j];
        }
        let det = sw * swxx - swx * swx;
        if sw < 1e-12 {
            out.push(y[i]);
        } else if det.abs() < 1e-12 {
            out.push(swy / sw);
        } else {
            let a = (swxx * swy - swx * swxy) / det;
            out.push(a);
        }
    }
    out
}
