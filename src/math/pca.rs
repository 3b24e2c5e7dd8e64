//! Planar PCA via eigen-decomposition of the 2×2 coordinate covariance.
//!
//! Used for the variance-ratio classification cutoff, the principal-curve
//! initialisation and the PCA-LOESS rotation. Covariance sums are accumulated
//! online and decomposed with `SymmetricEigen`, the same scheme the region
//! line fit uses.

use nalgebra::{Matrix2, SymmetricEigen};

/// Principal axes of a planar point set, major axis first.
#[derive(Clone, Copy, Debug)]
pub struct Pca2 {
    pub center: [f64; 2],
    /// Unit major axis (largest eigenvalue).
    pub axis: [f64; 2],
    /// Unit minor axis, perpendicular to `axis`.
    pub minor: [f64; 2],
    /// Eigenvalues, `lambda[0] >= lambda[1] >= 0`.
    pub lambda: [f64; 2],
}

impl Pca2 {
    /// Eigenvalue ratio λ1/λ2; infinite when the minor variance vanishes.
    pub fn variance_ratio(&self) -> f64 {
        if self.lambda[1] < 1e-12 {
            f64::INFINITY
        } else {
            self.lambda[0] / self.lambda[1]
        }
    }

    /// Projects a point into (along-axis, across-axis) coordinates.
    #[inline]
    pub fn project(&self, p: [f64; 2]) -> [f64; 2] {
        let dx = p[0] - self.center[0];
        let dy = p[1] - self.center[1];
        [
            dx * self.axis[0] + dy * self.axis[1],
            dx * self.minor[0] + dy * self.minor[1],
        ]
    }
}

/// Fits principal axes to a planar point set. `None` for fewer than two
/// points or a degenerate covariance.
pub fn pca2(pts: &[[f64; 2]]) -> Option<Pca2> {
    if pts.len() < 2 {
        return None;
    }
    let n = pts.len() as f64;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for p in pts {
        sx += p[0];
        sy += p[1];
    }
    let cx = sx / n;
    let cy = sy / n;

    let mut cxx = 0.0;
    let mut cyy = 0.0;
    let mut cxy = 0.0;
    for p in pts {
        let dx = p[0] - cx;
        let dy = p[1] - cy;
        cxx += dx * dx;
        cyy += dy * dy;
        cxy += dx * dy;
    }
    cxx /= n;
    cyy /= n;
    cxy /= n;

    let cov = Matrix2::new(cxx, cxy, cxy, cyy);
    let eig = SymmetricEigen::new(cov);
    let (imax, imin) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };
    let vmax = eig.eigenvectors.column(imax);
    let norm = (vmax[0] * vmax[0] + vmax[1] * vmax[1]).sqrt();
    if !norm.is_finite() || norm < 1e-12 {
        return None;
    }
    let ax = vmax[0] / norm;
    let ay = vmax[1] / norm;

    Some(Pca2 {
        center: [cx, cy],
        axis: [ax, ay],
        minor: [-ay, ax],
        lambda: [
            eig.eigenvalues[imax].max(0.0),
            eig.eigenvalues[imin].max(0.0),
        ],
    })
}
