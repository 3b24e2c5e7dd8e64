//! Manual override helpers: small pure functions over a [`PatternResult`]
//! and the original holes, independent of re-running detection. The host's
//! editing surface calls these after an operator adjustment.

use crate::angle::dist;
use crate::types::{Hole, PatternResult};

/// Reverses the position order of one row. Returns false when no row has
/// that index.
pub fn invert_row(result: &mut PatternResult, row_index: usize) -> bool {
    let Some(row) = result.rows.iter_mut().find(|r| r.index == row_index) else {
        return false;
    };
    row.holes.reverse();
    row.direction = [-row.direction[0], -row.direction[1]];
    true
}

/// Moves the row at `from` to index `to` and renumbers all rows to stay
/// consecutive. Returns false when either index is out of range.
pub fn rename_row(result: &mut PatternResult, from: usize, to: usize) -> bool {
    let n = result.rows.len();
    if from >= n || to >= n {
        return false;
    }
    let Some(pos) = result.rows.iter().position(|r| r.index == from) else {
        return false;
    };
    let row = result.rows.remove(pos);
    result.rows.insert(to, row);
    for (index, row) in result.rows.iter_mut().enumerate() {
        row.index = index;
    }
    true
}

/// Rewrites within-row position order so numbering runs forward on every row
/// (`serpentine == false`) or alternates direction between linked rows
/// (`serpentine == true`). The result's serpentine flag is updated to match.
pub fn resequence(result: &mut PatternResult, holes: &[Hole], serpentine: bool) {
    let pts: Vec<[f64; 2]> = holes.iter().map(Hole::xy).collect();
    for i in 1..result.rows.len() {
        let (head, tail) = result.rows.split_at_mut(i);
        let prev = &head[i - 1];
        let row = &mut tail[0];
        let (Some(&prev_first), Some(&prev_last)) = (prev.holes.first(), prev.holes.last()) else {
            continue;
        };
        let (Some(&first), Some(&last)) = (row.holes.first(), row.holes.last()) else {
            continue;
        };
        let flip = if serpentine {
            // The next row should start near where the previous one ended.
            dist(pts[prev_last], pts[first]) > dist(pts[prev_last], pts[last])
        } else {
            // All rows should start on the same side.
            dist(pts[prev_first], pts[first]) > dist(pts[prev_first], pts[last])
        };
        if flip {
            row.holes.reverse();
            row.direction = [-row.direction[0], -row.direction[1]];
        }
    }
    result.serpentine = serpentine;
    result.serpentine_confidence = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BurdenSpacingMetrics, PatternType, Row, RowShape,
    };

    fn grid_holes(rows: usize, cols: usize) -> Vec<Hole> {
        (0..rows * cols)
            .map(|i| {
                Hole::new(
                    format!("H{i}"),
                    3.0 * (i % cols) as f64,
                    3.0 * (i / cols) as f64,
                    0.0,
                )
            })
            .collect()
    }

    fn forward_result(rows: usize, cols: usize) -> PatternResult {
        PatternResult {
            rows: (0..rows)
                .map(|r| Row {
                    index: r,
                    holes: (r * cols..(r + 1) * cols).collect(),
                    shape: RowShape::Straight,
                    direction: [1.0, 0.0],
                })
                .collect(),
            pattern_type: PatternType::Straight,
            sub_patterns: Vec::new(),
            serpentine: false,
            serpentine_confidence: 1.0,
            confidence: 1.0,
            metrics: BurdenSpacingMetrics::default(),
            warnings: Vec::new(),
            orphan_hole_ids: Vec::new(),
            hole_count: rows * cols,
            latency_ms: 0.0,
        }
    }

    #[test]
    fn invert_reverses_one_row() {
        let mut result = forward_result(2, 3);
        assert!(invert_row(&mut result, 1));
        assert_eq!(result.rows[1].holes, vec![5, 4, 3]);
        assert!(result.rows[1].direction[0] < 0.0);
        assert!(!invert_row(&mut result, 9));
    }

    #[test]
    fn rename_moves_and_renumbers() {
        let mut result = forward_result(3, 2);
        assert!(rename_row(&mut result, 0, 2));
        let indices: Vec<usize> = result.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(result.rows[2].holes, vec![0, 1]);
        assert!(!rename_row(&mut result, 3, 0));
    }

    #[test]
    fn resequence_alternates_and_restores() {
        let holes = grid_holes(3, 4);
        let mut result = forward_result(3, 4);
        resequence(&mut result, &holes, true);
        assert!(result.serpentine);
        assert_eq!(result.rows[0].holes, vec![0, 1, 2, 3]);
        assert_eq!(result.rows[1].holes, vec![7, 6, 5, 4]);
        assert_eq!(result.rows[2].holes, vec![8, 9, 10, 11]);

        resequence(&mut result, &holes, false);
        assert!(!result.serpentine);
        assert_eq!(result.rows[1].holes, vec![4, 5, 6, 7]);
    }
}
