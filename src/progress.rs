//! Coarse progress reporting for long multi-strategy runs.

/// Snapshot delivered to the host's progress hook between pipeline stages.
/// Percentages are coarse stage boundaries, not a smooth gauge.
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    pub percent: f32,
    pub stage: &'static str,
}
