//! Spatial graph helpers: k-NN lists, nearest-neighbour chain ordering,
//! connectivity components and a Kruskal minimum spanning tree.
//!
//! Point counts here are small (tens to a few hundred holes per pattern), so
//! the neighbour queries are plain O(n²) scans; the MST sorts all pairwise
//! edges and merges with a union-find (Kruskal). Ties are always broken by
//! index so repeated runs stay deterministic.

use petgraph::unionfind::UnionFind;

use crate::angle::dist;

/// Indices of the `k` nearest neighbours for every point, nearest first.
pub fn knn_indices(pts: &[[f64; 2]], k: usize) -> Vec<Vec<usize>> {
    let n = pts.len();
    let k = k.min(n.saturating_sub(1));
    let mut out = Vec::with_capacity(n);
    let mut scratch: Vec<(f64, usize)> = Vec::with_capacity(n);
    for i in 0..n {
        scratch.clear();
        for j in 0..n {
            if j != i {
                scratch.push((dist(pts[i], pts[j]), j));
            }
        }
        scratch.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        out.push(scratch.iter().take(k).map(|&(_, j)| j).collect());
    }
    out
}

/// Median nearest-neighbour distance; zero for fewer than two points.
pub fn median_nn_distance(pts: &[[f64; 2]]) -> f64 {
    if pts.len() < 2 {
        return 0.0;
    }
    let mut nn: Vec<f64> = Vec::with_capacity(pts.len());
    for (i, p) in pts.iter().enumerate() {
        let mut best = f64::INFINITY;
        for (j, q) in pts.iter().enumerate() {
            if i != j {
                let d = dist(*p, *q);
                if d < best {
                    best = d;
                }
            }
        }
        nn.push(best);
    }
    crate::math::median(&nn)
}

/// Orders a point set as a nearest-neighbour chain. The chain starts from the
/// point farthest from the centroid (an extremity), then greedily steps to
/// the nearest unvisited point. Deterministic tie-break by index.
pub fn nn_chain_order(pts: &[[f64; 2]]) -> Vec<usize> {
    let n = pts.len();
    if n == 0 {
        return Vec::new();
    }
    let cx = pts.iter().map(|p| p[0]).sum::<f64>() / n as f64;
    let cy = pts.iter().map(|p| p[1]).sum::<f64>() / n as f64;
    let mut start = 0;
    let mut best = -1.0;
    for (i, p) in pts.iter().enumerate() {
        let d = dist(*p, [cx, cy]);
        if d > best {
            best = d;
            start = i;
        }
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = start;
    visited[current] = true;
    order.push(current);
    for _ in 1..n {
        let mut next = None;
        let mut next_d = f64::INFINITY;
        for (j, p) in pts.iter().enumerate() {
            if visited[j] {
                continue;
            }
            let d = dist(pts[current], *p);
            if d < next_d {
                next_d = d;
                next = Some(j);
            }
        }
        let Some(j) = next else { break };
        visited[j] = true;
        order.push(j);
        current = j;
    }
    order
}

/// Component label per point under the "within `radius`" adjacency relation.
/// Labels are renumbered 0.. in order of first appearance.
pub fn connected_components(pts: &[[f64; 2]], radius: f64) -> Vec<usize> {
    let n = pts.len();
    let mut uf = UnionFind::<usize>::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if dist(pts[i], pts[j]) <= radius {
                uf.union(i, j);
            }
        }
    }
    let mut label_of_root = std::collections::HashMap::new();
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let root = uf.find(i);
        let next = label_of_root.len();
        let label = *label_of_root.entry(root).or_insert(next);
        labels.push(label);
    }
    labels
}

/// One undirected MST edge with its Euclidean weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

/// Kruskal MST over all pairwise distances. Returns `n - 1` edges for a
/// non-empty input (the complete graph is always connected).
pub fn kruskal_mst(pts: &[[f64; 2]]) -> Vec<MstEdge> {
    let n = pts.len();
    if n < 2 {
        return Vec::new();
    }
    let mut edges = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            edges.push(MstEdge {
                a: i,
                b: j,
                weight: dist(pts[i], pts[j]),
            });
        }
    }
    edges.sort_by(|x, y| {
        x.weight
            .partial_cmp(&y.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(x.a.cmp(&y.a))
            .then(x.b.cmp(&y.b))
    });

    let mut uf = UnionFind::<usize>::new(n);
    let mut mst = Vec::with_capacity(n - 1);
    for e in edges {
        if uf.union(e.a, e.b) {
            mst.push(e);
            if mst.len() == n - 1 {
                break;
            }
        }
    }
    mst
}

/// Adjacency lists of an edge set over `n` vertices.
pub fn adjacency(n: usize, edges: &[MstEdge]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n];
    for e in edges {
        adj[e.a].push(e.b);
        adj[e.b].push(e.a);
    }
    adj
}
