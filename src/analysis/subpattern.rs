//! Sub-pattern separation for MultiPattern point sets.
//!
//! Partitions by orientation cluster, then enforces spatial connectivity
//! inside each cluster (union-find reachability under 2× the estimated
//! spacing); disconnected components become distinct sub-patterns even under
//! identical orientation. Points without an orientation vote attach to the
//! nearest group so the partition stays total. The largest group becomes
//! Main; near-perpendicular groups are tagged Batter (outside Main's
//! footprint) or Buffer (inside), anything else Secondary.

use crate::analysis::classify::{populated_threshold, Classification};
use crate::angle::{dist, orientation_difference};
use crate::graph::connected_components;
use crate::types::SubPatternRole;
use log::debug;

/// One separated group of subset-local point indices.
#[derive(Clone, Debug)]
pub struct SubPatternGroup {
    pub indices: Vec<usize>,
    pub role: SubPatternRole,
    /// Dominant orientation in radians, [0, π).
    pub orientation: f64,
}

/// Angular window (radians) around 90° that counts as perpendicular to Main.
const PERPENDICULAR_TOL: f64 = 25.0 * std::f64::consts::PI / 180.0;

/// Splits a classified subset into sub-pattern groups. Returns a single Main
/// group when no meaningful split exists.
pub fn separate(
    pts: &[[f64; 2]],
    classification: &Classification,
    spacing: f64,
) -> Vec<SubPatternGroup> {
    let n = pts.len();
    let min_members = populated_threshold(n);
    let reach = (spacing * 2.0).max(1e-9);

    // Orientation clusters first, connectivity split second.
    let mut groups: Vec<(Vec<usize>, f64)> = Vec::new();
    let mut grouped = vec![false; n];
    for cluster in &classification.clusters {
        if cluster.members.len() < min_members {
            continue;
        }
        let member_pts: Vec<[f64; 2]> = cluster.members.iter().map(|&i| pts[i]).collect();
        let labels = connected_components(&member_pts, reach);
        let parts = labels.iter().max().map(|&m| m + 1).unwrap_or(0);
        for part in 0..parts {
            let indices: Vec<usize> = cluster
                .members
                .iter()
                .zip(&labels)
                .filter_map(|(&idx, &l)| (l == part).then_some(idx))
                .collect();
            if indices.is_empty() {
                continue;
            }
            for &i in &indices {
                grouped[i] = true;
            }
            groups.push((indices, cluster.orientation));
        }
    }

    if groups.is_empty() {
        // No orientation structure at all; everything is one Main group.
        return vec![SubPatternGroup {
            indices: (0..n).collect(),
            role: SubPatternRole::Main,
            orientation: 0.0,
        }];
    }

    // Attach unvoted points to the group with the nearest member.
    for i in 0..n {
        if grouped[i] {
            continue;
        }
        let mut best_group = 0;
        let mut best_d = f64::INFINITY;
        for (g, (indices, _)) in groups.iter().enumerate() {
            for &j in indices {
                let d = dist(pts[i], pts[j]);
                if d < best_d {
                    best_d = d;
                    best_group = g;
                }
            }
        }
        groups[best_group].0.push(i);
    }
    for (indices, _) in groups.iter_mut() {
        indices.sort_unstable();
    }

    // Largest group is Main; order the rest by size, ties by first index.
    groups.sort_by(|a, b| {
        b.0.len()
            .cmp(&a.0.len())
            .then(a.0.first().cmp(&b.0.first()))
    });
    let main_orientation = groups[0].1;
    let (main_min, main_max) = bounding_box(pts, &groups[0].0);

    groups
        .into_iter()
        .enumerate()
        .map(|(g, (indices, orientation))| {
            let role = if g == 0 {
                SubPatternRole::Main
            } else {
                role_for(
                    pts,
                    &indices,
                    orientation,
                    main_orientation,
                    main_min,
                    main_max,
                    spacing,
                )
            };
            debug!(
                "sub-pattern {}: {:?} n={} orientation={:.1}°",
                g,
                role,
                indices.len(),
                orientation.to_degrees()
            );
            SubPatternGroup {
                indices,
                role,
                orientation,
            }
        })
        .collect()
}

fn role_for(
    pts: &[[f64; 2]],
    indices: &[usize],
    orientation: f64,
    main_orientation: f64,
    main_min: [f64; 2],
    main_max: [f64; 2],
    spacing: f64,
) -> SubPatternRole {
    let diff = orientation_difference(orientation, main_orientation);
    if (std::f64::consts::FRAC_PI_2 - diff).abs() > PERPENDICULAR_TOL {
        return SubPatternRole::Secondary;
    }
    // Perpendicular to Main: Batter sits outside Main's footprint, Buffer
    // inside. Advisory tag only.
    let cx = indices.iter().map(|&i| pts[i][0]).sum::<f64>() / indices.len() as f64;
    let cy = indices.iter().map(|&i| pts[i][1]).sum::<f64>() / indices.len() as f64;
    let margin = spacing * 0.5;
    let inside = cx >= main_min[0] - margin
        && cx <= main_max[0] + margin
        && cy >= main_min[1] - margin
        && cy <= main_max[1] + margin;
    if inside {
        SubPatternRole::Buffer
    } else {
        SubPatternRole::Batter
    }
}

fn bounding_box(pts: &[[f64; 2]], indices: &[usize]) -> ([f64; 2], [f64; 2]) {
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for &i in indices {
        min[0] = min[0].min(pts[i][0]);
        min[1] = min[1].min(pts[i][1]);
        max[0] = max[0].max(pts[i][0]);
        max[1] = max[1].max(pts[i][1]);
    }
    (min, max)
}
