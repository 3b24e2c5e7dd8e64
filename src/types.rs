//! Core data model: caller-owned holes and the engine's labelled output.
//!
//! The engine never mutates caller points; every result refers to holes by
//! their index into the input slice. A [`PatternResult`] is produced fresh per
//! invocation and upholds the partition invariant: every input hole appears in
//! exactly one row or in the orphan list, never both, never neither.

use serde::{Deserialize, Serialize};

/// A caller-owned blast hole. `sequence_token` is an optional numeric or
/// alphanumeric ordering hint recorded by the operator (e.g. "12", "A3").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hole {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub sequence_token: Option<String>,
}

impl Hole {
    pub fn new(id: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            sequence_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.sequence_token = Some(token.into());
        self
    }

    /// Planar position used by the row-detection geometry. Elevation only
    /// participates in reporting, not in row logic.
    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Overall classification of the supplied point set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PatternType {
    Straight,
    Curved,
    MultiPattern,
}

/// Shape of a single detected row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RowShape {
    Straight,
    Curved,
    /// A single continuously curving S-shaped row.
    Winding,
}

/// Role of a sub-pattern relative to the largest (main) group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SubPatternRole {
    Main,
    /// Near-perpendicular to main, outside its footprint.
    Batter,
    /// Near-perpendicular to main, inside its footprint.
    Buffer,
    Secondary,
}

/// Layout class derived from the inter-row offset ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LayoutClass {
    Square,
    Staggered,
    #[default]
    Irregular,
}

/// One detected row: an ordered list of hole indices in fire/drill sequence.
#[derive(Clone, Debug, Serialize)]
pub struct Row {
    /// Zero-based row index within the result.
    pub index: usize,
    /// Hole indices into the input slice, in within-row position order.
    pub holes: Vec<usize>,
    pub shape: RowShape,
    /// Unit backbone direction of the row (mean tangent for curved rows).
    pub direction: [f64; 2],
}

/// Summary of one separated sub-pattern.
#[derive(Clone, Debug, Serialize)]
pub struct SubPatternInfo {
    pub role: SubPatternRole,
    /// Dominant orientation in degrees, modulo 180.
    pub orientation_deg: f64,
    pub hole_count: usize,
}

/// Per-hole label: row and 1-based position in fire/drill sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HoleLabel {
    pub row_index: usize,
    pub position: usize,
}

/// Burden/spacing statistics computed by the validator.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BurdenSpacingMetrics {
    /// Mean distance between adjacent holes within a row.
    pub spacing_mean: f64,
    pub spacing_std: f64,
    /// Mean perpendicular distance between adjacent rows.
    pub burden_mean: f64,
    pub burden_std: f64,
    /// Along-row offset between adjacent rows as a fraction of spacing.
    pub offset_ratio: f64,
    pub layout: LayoutClass,
}

/// Complete output of one detection run.
#[derive(Clone, Debug, Serialize)]
pub struct PatternResult {
    pub rows: Vec<Row>,
    pub pattern_type: PatternType,
    pub sub_patterns: Vec<SubPatternInfo>,
    /// True when position numbering alternates direction between rows.
    pub serpentine: bool,
    /// Fraction of adjacent row pairs agreeing with the majority direction.
    pub serpentine_confidence: f64,
    /// Overall confidence combining strategy fit, spacing variance and
    /// warning count.
    pub confidence: f64,
    pub metrics: BurdenSpacingMetrics,
    pub warnings: Vec<String>,
    /// Ids of holes that no strategy could assign to a row.
    pub orphan_hole_ids: Vec<String>,
    /// Number of holes supplied to the run.
    pub hole_count: usize,
    pub latency_ms: f64,
}

impl PatternResult {
    /// Per-hole labels indexed like the input slice. `None` marks an orphan.
    pub fn labels(&self) -> Vec<Option<HoleLabel>> {
        let mut out = vec![None; self.hole_count];
        for row in &self.rows {
            for (pos, &hole) in row.holes.iter().enumerate() {
                out[hole] = Some(HoleLabel {
                    row_index: row.index,
                    position: pos + 1,
                });
            }
        }
        out
    }

    /// Total number of holes assigned to rows.
    pub fn assigned_count(&self) -> usize {
        self.rows.iter().map(|r| r.holes.len()).sum()
    }
}
