//! Serpentine (boustrophedon) direction analysis.
//!
//! Row shape and position-ordering direction are orthogonal: this runs after
//! row detection and only inspects row endpoints. For every adjacent row
//! pair, a shorter end-to-start hop than start-to-start means the drilling
//! direction flipped between the rows (a serpentine link).

use log::debug;

use crate::angle::dist;
use crate::types::Row;

/// Majority verdict over adjacent row pairs plus the fraction agreeing with
/// the majority. Fewer than two rows are trivially forward with full
/// confidence.
pub(crate) fn analyze(pts: &[[f64; 2]], rows: &[Row]) -> (bool, f64) {
    let mut linked = 0usize;
    let mut pairs = 0usize;
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (Some(&a_first), Some(&a_last)) = (a.holes.first(), a.holes.last()) else {
            continue;
        };
        let Some(&b_first) = b.holes.first() else {
            continue;
        };
        let end_to_start = dist(pts[a_last], pts[b_first]);
        let start_to_start = dist(pts[a_first], pts[b_first]);
        pairs += 1;
        if end_to_start < start_to_start {
            linked += 1;
        }
    }
    if pairs == 0 {
        return (false, 1.0);
    }
    let serpentine = 2 * linked > pairs;
    let majority = linked.max(pairs - linked);
    let confidence = majority as f64 / pairs as f64;
    debug!(
        "serpentine: {}/{} linked pairs -> {} ({:.2})",
        linked,
        pairs,
        if serpentine { "serpentine" } else { "forward" },
        confidence
    );
    (serpentine, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Row, RowShape};

    fn row(index: usize, holes: Vec<usize>) -> Row {
        Row {
            index,
            holes,
            shape: RowShape::Straight,
            direction: [1.0, 0.0],
        }
    }

    fn grid(rows: usize, cols: usize) -> Vec<[f64; 2]> {
        (0..rows * cols)
            .map(|i| [3.0 * (i % cols) as f64, 3.0 * (i / cols) as f64])
            .collect()
    }

    #[test]
    fn alternating_rows_are_serpentine() {
        let pts = grid(3, 5);
        let rows = vec![
            row(0, vec![0, 1, 2, 3, 4]),
            row(1, vec![9, 8, 7, 6, 5]),
            row(2, vec![10, 11, 12, 13, 14]),
        ];
        let (serp, conf) = analyze(&pts, &rows);
        assert!(serp);
        assert!((conf - 1.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_rows_are_forward() {
        let pts = grid(3, 5);
        let rows = vec![
            row(0, vec![0, 1, 2, 3, 4]),
            row(1, vec![5, 6, 7, 8, 9]),
            row(2, vec![10, 11, 12, 13, 14]),
        ];
        let (serp, conf) = analyze(&pts, &rows);
        assert!(!serp);
        assert!((conf - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_row_is_forward() {
        let pts = grid(1, 5);
        let rows = vec![row(0, vec![0, 1, 2, 3, 4])];
        let (serp, conf) = analyze(&pts, &rows);
        assert!(!serp);
        assert_eq!(conf, 1.0);
    }
}
