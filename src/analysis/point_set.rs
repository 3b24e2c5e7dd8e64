//! Point-set pre-analysis: count, extent, density estimate and reliability of
//! the operator-supplied sequence tokens.
//!
//! The spacing estimate seeds the clustering parameters downstream (k for the
//! k-NN graph, ε for density clustering); the sequence reliability decides
//! whether the token-driven strategies are allowed to run at all.

use crate::graph::median_nn_distance;
use log::debug;

/// Pre-analysis summary of one point (sub)set.
#[derive(Clone, Debug)]
pub struct PointSetStats {
    pub count: usize,
    pub min: [f64; 2],
    pub max: [f64; 2],
    /// Diagonal of the bounding extent.
    pub extent: f64,
    /// Median nearest-neighbour distance; the density estimate.
    pub median_spacing: f64,
    /// Fraction of tokens parseable into a unique monotonic order.
    pub sequence_reliability: f64,
    /// Point indices sorted by parsed token, present when any token parsed.
    pub sequence_order: Option<Vec<usize>>,
}

impl PointSetStats {
    /// Default k for the k-NN graph: min(6, n/5), at least 2.
    pub fn default_k(&self) -> usize {
        (self.count / 5).clamp(2, 6)
    }

    /// Default density-clustering ε: twice the estimated spacing.
    pub fn default_eps(&self) -> f64 {
        (self.median_spacing * 2.0).max(1e-9)
    }
}

/// Sortable key parsed from a sequence token: an optional alphabetic prefix
/// followed by a number ("17", "B4", "r2.5").
fn parse_token(token: &str) -> Option<(String, f64)> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let split = token
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let (prefix, rest) = token.split_at(split);
    if rest.is_empty() {
        return None;
    }
    let value: f64 = rest.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((prefix.to_ascii_uppercase(), value))
}

/// Analyzes positions and tokens of one subset. `tokens` runs parallel to
/// `pts`; `None` entries simply count against reliability.
pub fn analyze_point_set(pts: &[[f64; 2]], tokens: &[Option<&str>]) -> PointSetStats {
    debug_assert_eq!(pts.len(), tokens.len());
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in pts {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }
    if pts.is_empty() {
        min = [0.0, 0.0];
        max = [0.0, 0.0];
    }
    let extent = crate::angle::dist(min, max);
    let median_spacing = median_nn_distance(pts);

    let mut parsed: Vec<(String, f64, usize)> = Vec::new();
    for (i, t) in tokens.iter().enumerate() {
        if let Some((prefix, value)) = t.and_then(parse_token) {
            parsed.push((prefix, value, i));
        }
    }
    parsed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.2.cmp(&b.2))
    });
    // Duplicate keys cannot define a monotonic order; only unique keys count.
    let mut unique = 0usize;
    for (i, item) in parsed.iter().enumerate() {
        let dup_prev = i > 0 && parsed[i - 1].0 == item.0 && parsed[i - 1].1 == item.1;
        let dup_next =
            i + 1 < parsed.len() && parsed[i + 1].0 == item.0 && parsed[i + 1].1 == item.1;
        if !dup_prev && !dup_next {
            unique += 1;
        }
    }
    let reliability = if pts.is_empty() {
        0.0
    } else {
        unique as f64 / pts.len() as f64
    };
    let order = if parsed.is_empty() {
        None
    } else {
        Some(parsed.iter().map(|p| p.2).collect())
    };

    debug!(
        "point-set: n={} extent={:.2} spacing={:.3} seq_reliability={:.2}",
        pts.len(),
        extent,
        median_spacing,
        reliability
    );
    PointSetStats {
        count: pts.len(),
        min,
        max,
        extent,
        median_spacing,
        sequence_reliability: reliability,
        sequence_order: order,
    }
}
