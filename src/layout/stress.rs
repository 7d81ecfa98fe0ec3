//! Stress-majorization layout.
//!
//! Minimizes Σ w_ij (‖p_i − p_j‖ − d_ij)² over all finitely-connected pairs,
//! where d_ij are BFS graph distances and w_ij = 1/d_ij². Uses the SMACOF
//! per-node majorization update, starting from a circular placement so the
//! result is deterministic.

use super::{simple, Layout};
use crate::graph::paths;
use crate::graph::Graph;

const MAX_ITER: usize = 100;
const TOLERANCE: f64 = 1e-4;

/// Compute the stress-majorization layout.
pub fn layout(graph: &Graph) -> Layout {
    let n = graph.node_count();
    if n == 0 {
        return Layout::from_points(vec![]);
    }
    if n == 1 {
        return Layout::from_points(vec![(0.0, 0.0)]);
    }

    let distances = paths::distance_matrix(&graph.undirected_adjacency());
    let start = simple::circular(n);
    let mut pos: Vec<(f64, f64)> = (0..n).map(|i| start.point(i)).collect();

    for _ in 0..MAX_ITER {
        let mut moved = 0.0f64;
        for i in 0..n {
            let mut weight_sum = 0.0;
            let mut x_sum = 0.0;
            let mut y_sum = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let Some(target) = distances[i][j] else { continue };
                let target = target as f64;
                let weight = 1.0 / (target * target);
                let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                let euclid = (dx * dx + dy * dy).sqrt().max(1e-9);
                // Majorized target position: p_j plus d_ij in the current
                // direction from j to i.
                x_sum += weight * (pos[j].0 + target * dx / euclid);
                y_sum += weight * (pos[j].1 + target * dy / euclid);
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                let next = (x_sum / weight_sum, y_sum / weight_sum);
                moved += (next.0 - pos[i].0).abs() + (next.1 - pos[i].1).abs();
                pos[i] = next;
            }
        }
        if moved / (n as f64) < TOLERANCE {
            break;
        }
    }

    Layout::from_points(pos)
}
