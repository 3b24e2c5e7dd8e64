//! Synthetic hole layouts shared by the integration tests.

use row_detector::Hole;

/// Axis-aligned grid, row-major hole ids, no sequence tokens.
pub fn grid(rows: usize, cols: usize, spacing: f64) -> Vec<Hole> {
    (0..rows * cols)
        .map(|i| {
            Hole::new(
                format!("H{i}"),
                spacing * (i % cols) as f64,
                spacing * (i / cols) as f64,
                0.0,
            )
        })
        .collect()
}

/// Grid with forward sequence tokens: every row numbered left to right.
pub fn grid_forward_tokens(rows: usize, cols: usize, spacing: f64) -> Vec<Hole> {
    grid(rows, cols, spacing)
        .into_iter()
        .enumerate()
        .map(|(i, h)| h.with_token(format!("{}", i + 1)))
        .collect()
}

/// Grid with boustrophedon tokens: odd rows numbered right to left.
pub fn grid_serpentine_tokens(rows: usize, cols: usize, spacing: f64) -> Vec<Hole> {
    grid(rows, cols, spacing)
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let row = i / cols;
            let col = i % cols;
            let pos = if row % 2 == 0 { col } else { cols - 1 - col };
            h.with_token(format!("{}", row * cols + pos + 1))
        })
        .collect()
}

/// `n` holes on a circular arc of the given radius, swept symmetrically
/// about the top of the circle.
pub fn arc(n: usize, radius: f64, sweep: f64) -> Vec<Hole> {
    (0..n)
        .map(|i| {
            let t = -sweep / 2.0 + sweep * i as f64 / (n - 1) as f64;
            Hole::new(format!("A{i}"), radius * t.sin(), radius * t.cos(), 0.0)
        })
        .collect()
}

/// Two spatially disjoint, mutually perpendicular lines: a horizontal main
/// line and a vertical one well off to the side.
pub fn perpendicular_lines(spacing: f64) -> Vec<Hole> {
    let mut holes: Vec<Hole> = (0..6)
        .map(|i| Hole::new(format!("M{i}"), spacing * i as f64, 0.0, 0.0))
        .collect();
    holes.extend(
        (0..6).map(|i| Hole::new(format!("B{i}"), 10.0 * spacing, spacing * i as f64 + 6.0 * spacing, 0.0)),
    );
    holes
}

/// Deterministic pseudo-random scatter (linear congruential generator).
pub fn scatter(n: usize, extent: f64) -> Vec<Hole> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };
    (0..n)
        .map(|i| Hole::new(format!("S{i}"), extent * next(), extent * next(), 0.0))
        .collect()
}
