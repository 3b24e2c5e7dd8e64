mod common;

use common::synthetic_pattern::{
    arc, grid, grid_forward_tokens, grid_serpentine_tokens, perpendicular_lines,
};
use row_detector::{PatternType, RowDetector, RowShape, SubPatternRole};

#[test]
fn axis_aligned_grid_is_straight_with_correct_labels() {
    let _ = env_logger::builder().is_test(true).try_init();
    let holes = grid(4, 5, 3.0);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    assert_eq!(result.pattern_type, PatternType::Straight);
    assert!(
        result.confidence > 0.9,
        "confidence too low: {:.3}",
        result.confidence
    );
    assert_eq!(result.rows.len(), 4);
    assert!(result.orphan_hole_ids.is_empty());

    for row in &result.rows {
        assert_eq!(row.holes.len(), 5);
        assert_eq!(row.shape, RowShape::Straight);
        // One physical row per detected row.
        let y = holes[row.holes[0]].y;
        assert!(row.holes.iter().all(|&i| (holes[i].y - y).abs() < 1e-9));
        // Positions sweep the row once.
        let xs: Vec<f64> = row.holes.iter().map(|&i| holes[i].x).collect();
        let monotone =
            xs.windows(2).all(|w| w[0] < w[1]) || xs.windows(2).all(|w| w[0] > w[1]);
        assert!(monotone, "row positions out of order: {xs:?}");
    }
    // Row indices run across the pattern in one direction.
    let row_ys: Vec<f64> = result.rows.iter().map(|r| holes[r.holes[0]].y).collect();
    let monotone = row_ys.windows(2).all(|w| w[0] < w[1])
        || row_ys.windows(2).all(|w| w[0] > w[1]);
    assert!(monotone, "row order not monotone: {row_ys:?}");

    // Every hole got a label.
    let labels = result.labels();
    assert!(labels.iter().all(|l| l.is_some()));
}

#[test]
fn arc_is_one_curved_row_in_arc_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let holes = arc(20, 50.0, std::f64::consts::PI);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    assert_eq!(result.pattern_type, PatternType::Curved);
    assert_eq!(result.rows.len(), 1, "rows: {:?}", result.rows.len());
    let order = &result.rows[0].holes;
    assert_eq!(order.len(), 20);
    let forward: Vec<usize> = (0..20).collect();
    let reverse: Vec<usize> = (0..20).rev().collect();
    assert!(
        order == &forward || order == &reverse,
        "not in arc order: {order:?}"
    );
    assert_ne!(result.rows[0].shape, RowShape::Straight);
}

#[test]
fn boustrophedon_tokens_classify_serpentine() {
    let _ = env_logger::builder().is_test(true).try_init();
    let holes = grid_serpentine_tokens(4, 5, 3.0);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    assert_eq!(result.rows.len(), 4);
    assert!(result.serpentine, "expected serpentine");
    assert!(
        result.serpentine_confidence >= 0.8,
        "serpentine confidence {:.2}",
        result.serpentine_confidence
    );
    // Alternating rows run in opposite directions.
    let dir0 = result.rows[0].direction[0];
    let dir1 = result.rows[1].direction[0];
    assert!(dir0 * dir1 < 0.0, "adjacent rows share a direction");
}

#[test]
fn forward_tokens_classify_forward() {
    let holes = grid_forward_tokens(4, 5, 3.0);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    assert_eq!(result.rows.len(), 4);
    assert!(!result.serpentine);
    assert!(result.serpentine_confidence >= 0.8);
}

#[test]
fn disjoint_perpendicular_lines_separate_into_two_sub_patterns() {
    let _ = env_logger::builder().is_test(true).try_init();
    let holes = perpendicular_lines(3.0);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    assert_eq!(result.pattern_type, PatternType::MultiPattern);
    assert_eq!(result.sub_patterns.len(), 2);
    assert_eq!(result.sub_patterns[0].role, SubPatternRole::Main);
    assert_eq!(result.sub_patterns[0].hole_count, 6);
    assert!(matches!(
        result.sub_patterns[1].role,
        SubPatternRole::Batter | SubPatternRole::Secondary
    ));

    // Each line comes back as one straight row covering its six holes.
    assert_eq!(result.rows.len(), 2);
    for row in &result.rows {
        assert_eq!(row.holes.len(), 6);
        assert_eq!(row.shape, RowShape::Straight);
        let ids: Vec<char> = row
            .holes
            .iter()
            .map(|&i| holes[i].id.chars().next().unwrap())
            .collect();
        assert!(
            ids.iter().all(|&c| c == ids[0]),
            "row mixes the two lines: {ids:?}"
        );
    }
    assert!(result.orphan_hole_ids.is_empty());
}

#[test]
fn report_serializes_to_json() {
    let holes = grid(3, 4, 3.0);
    let detector = RowDetector::with_defaults();
    let result = detector.detect(&holes).unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["hole_count"], 12);
    assert_eq!(value["pattern_type"], "Straight");
    assert!(value["rows"].as_array().unwrap().len() == 3);
    assert!(value["confidence"].as_f64().unwrap() > 0.0);
    assert!(value["metrics"]["spacing_mean"].as_f64().unwrap() > 0.0);
}
