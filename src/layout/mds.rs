//! Classical multidimensional scaling on the BFS distance matrix.
//!
//! Double-centers the squared distance matrix and extracts the top two
//! eigenpairs by power iteration with deflation, starting each iteration
//! from a seeded random vector so no start direction sits orthogonal to
//! the dominant eigenspace. Any failure — a disconnected graph (infinite
//! distances), non-positive eigenvalues, or non-convergence — yields
//! `None` so the caller can simply omit the layout.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::paths;
use crate::graph::Graph;

use super::Layout;

const MAX_ITER: usize = 300;
const TOLERANCE: f64 = 1e-9;

/// Attempt the MDS embedding. `None` marks failure, never an error.
pub fn layout(graph: &Graph, seed: u64) -> Option<Layout> {
    let n = graph.node_count();
    if n <= 2 {
        return None;
    }

    let distances = paths::distance_matrix(&graph.undirected_adjacency());
    let mut squared = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let d = distances[i][j]? as f64; // disconnected pair: bail out
            squared[i][j] = d * d;
        }
    }

    // Double centering: B = -1/2 J D² J.
    let row_means: Vec<f64> = squared
        .iter()
        .map(|row| row.iter().sum::<f64>() / n as f64)
        .collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;
    let mut gram = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            gram[i][j] = -0.5 * (squared[i][j] - row_means[i] - row_means[j] + grand_mean);
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let (lambda1, v1) = top_eigenpair(&gram, None, &mut rng)?;
    if lambda1 <= 1e-12 {
        return None;
    }
    // A path-like graph embeds exactly in one dimension; its second
    // eigenvalue is numerically zero and the y axis degenerates to zero.
    let second: Vec<f64> = match top_eigenpair(&gram, Some((lambda1, &v1)), &mut rng) {
        Some((lambda2, v2)) if lambda2 > 1e-12 => {
            v2.iter().map(|&v| v * lambda2.sqrt()).collect()
        }
        _ => vec![0.0; n],
    };

    let points = (0..n)
        .map(|i| (v1[i] * lambda1.sqrt(), second[i]))
        .collect();
    Some(Layout::from_points(points))
}

/// Dominant eigenpair of a symmetric matrix by power iteration, optionally
/// deflating a previously found pair.
fn top_eigenpair(
    matrix: &[Vec<f64>],
    deflate: Option<(f64, &[f64])>,
    rng: &mut StdRng,
) -> Option<(f64, Vec<f64>)> {
    let n = matrix.len();
    let mut x: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    normalize(&mut x)?;

    let mut eigenvalue = 0.0;
    for _ in 0..MAX_ITER {
        let mut next = vec![0.0f64; n];
        for (i, row) in matrix.iter().enumerate() {
            next[i] = row.iter().zip(&x).map(|(m, v)| m * v).sum();
        }
        if let Some((lambda, vector)) = deflate {
            let dot: f64 = vector.iter().zip(&x).map(|(a, b)| a * b).sum();
            for (value, &component) in next.iter_mut().zip(vector) {
                *value -= lambda * dot * component;
            }
        }
        eigenvalue = next.iter().zip(&x).map(|(a, b)| a * b).sum();
        let norm = normalize(&mut next)?;
        let delta: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if norm < f64::MIN_POSITIVE {
            return None;
        }
        if delta < TOLERANCE {
            return Some((eigenvalue, x));
        }
    }
    // Accept the last iterate; classical MDS tolerates slow convergence on
    // near-degenerate spectra.
    Some((eigenvalue, x))
}

fn normalize(vector: &mut [f64]) -> Option<f64> {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm < f64::MIN_POSITIVE {
        return None;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
    Some(norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOptions;
    use crate::model::{EdgeRecord, NodeRecord};

    fn build(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        let nodes: Vec<NodeRecord> = ids.iter().map(|id| NodeRecord::new(*id, *id)).collect();
        let edges: Vec<EdgeRecord> = edges
            .iter()
            .map(|(from, to)| EdgeRecord::new(*from, *to))
            .collect();
        Graph::build(&nodes, &edges, &GraphOptions::default()).unwrap()
    }

    #[test]
    fn too_few_nodes_yields_none() {
        let graph = build(&["a", "b"], &[("a", "b")]);
        assert!(layout(&graph, 0).is_none());
    }

    #[test]
    fn disconnected_graph_yields_none() {
        let graph = build(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]);
        assert!(layout(&graph, 0).is_none());
    }

    #[test]
    fn chain_embedding_orders_nodes() {
        // a - b - c - d: the first MDS axis should order the chain.
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d")],
        );
        let result = layout(&graph, 0).unwrap();
        let d = |i: usize, j: usize| {
            let (ix, iy) = result.point(i);
            let (jx, jy) = result.point(j);
            ((ix - jx).powi(2) + (iy - jy).powi(2)).sqrt()
        };
        assert!(d(0, 3) > d(0, 1), "endpoints farther than neighbors");
        assert!(d(0, 3) > d(1, 2));
    }

    #[test]
    fn embedding_distances_approximate_graph_distances() {
        // 4-cycle: opposite corners at graph distance 2, adjacent at 1. The
        // dominant eigenvalue of its Gram matrix is a degenerate pair, so
        // the embedding must succeed for any start direction.
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
        );
        for seed in [0, 1, 42] {
            let result = layout(&graph, seed).unwrap();
            let d = |i: usize, j: usize| {
                let (ix, iy) = result.point(i);
                let (jx, jy) = result.point(j);
                ((ix - jx).powi(2) + (iy - jy).powi(2)).sqrt()
            };
            assert!(d(0, 2) > d(0, 1));
            assert!(d(1, 3) > d(1, 2));
        }
    }
}
