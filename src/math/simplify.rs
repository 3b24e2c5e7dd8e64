//! Recursive point-to-segment polyline simplification (Ramer–Douglas–Peucker).
//!
//! The fallback strategy derives a row backbone from a nearest-neighbour
//! chain and thins it to the structurally significant vertices; the original
//! holes are then reassigned along the backbone preserving chain order.

use super::spline::point_segment_distance;

/// Returns the indices of the kept vertices, always including both ends.
pub fn simplify_polyline(pts: &[[f64; 2]], tolerance: f64) -> Vec<usize> {
    if pts.len() <= 2 {
        return (0..pts.len()).collect();
    }
    let mut keep = vec![false; pts.len()];
    keep[0] = true;
    keep[pts.len() - 1] = true;
    simplify_range(pts, 0, pts.len() - 1, tolerance, &mut keep);
    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}

fn simplify_range(pts: &[[f64; 2]], first: usize, last: usize, tol: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let mut max_dist = 0.0;
    let mut max_idx = first;
    for i in first + 1..last {
        let d = point_segment_distance(pts[i], pts[first], pts[last]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > tol {
        keep[max_idx] = true;
        simplify_range(pts, first, max_idx, tol, keep);
        simplify_range(pts, max_idx, last, tol, keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_collapses_to_endpoints() {
        let pts: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, 0.0]).collect();
        assert_eq!(simplify_polyline(&pts, 0.1), vec![0, 9]);
    }

    #[test]
    fn corner_is_kept() {
        let mut pts: Vec<[f64; 2]> = (0..5).map(|i| [i as f64, 0.0]).collect();
        pts.extend((1..5).map(|i| [4.0, i as f64]));
        let kept = simplify_polyline(&pts, 0.1);
        assert!(kept.contains(&4), "corner vertex dropped: {kept:?}");
    }

    #[test]
    fn short_input_is_untouched() {
        let pts = vec![[0.0, 0.0], [1.0, 1.0]];
        assert_eq!(simplify_polyline(&pts, 0.5), vec![0, 1]);
    }
}
