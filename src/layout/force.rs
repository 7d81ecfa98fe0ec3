//! Fruchterman-Reingold force-directed layout.
//!
//! Repulsion `k²/d` between every node pair, attraction `d²/k` along edges,
//! displacement capped by a linearly cooling temperature. The iteration
//! budget shrinks with graph size to keep worst-case latency bounded.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::Layout;
use crate::graph::Graph;

/// Iteration budget by node count.
fn iteration_budget(n: usize) -> usize {
    if n <= 100 {
        500
    } else if n <= 500 {
        200
    } else {
        50
    }
}

/// Run the force simulation. Seeded initial placement makes runs
/// reproducible for a given snapshot.
pub fn layout(graph: &Graph, seed: u64) -> Layout {
    let n = graph.node_count();
    if n == 0 {
        return Layout::from_points(vec![]);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.r#gen::<f64>(), rng.r#gen::<f64>()))
        .collect();
    if n == 1 {
        return Layout::from_points(vec![(0.0, 0.0)]);
    }

    let edges: Vec<(usize, usize)> = graph
        .edges()
        .filter(|&(u, v, _)| u != v)
        .map(|(u, v, _)| (u, v))
        .collect();

    let k = (1.0 / n as f64).sqrt();
    let iterations = iteration_budget(n);
    let initial_temperature = 0.1;

    for iteration in 0..iterations {
        // Repulsion: every pair pushes apart with k²/d.
        let mut disp: Vec<(f64, f64)> = (0..n)
            .into_par_iter()
            .map(|i| {
                let (ix, iy) = pos[i];
                let mut dx = 0.0;
                let mut dy = 0.0;
                for (j, &(jx, jy)) in pos.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let (ox, oy) = (ix - jx, iy - jy);
                    let dist = (ox * ox + oy * oy).sqrt().max(1e-9);
                    let force = k * k / dist;
                    dx += ox / dist * force;
                    dy += oy / dist * force;
                }
                (dx, dy)
            })
            .collect();

        // Attraction: edges pull endpoints together with d²/k.
        for &(u, v) in &edges {
            let (ux, uy) = pos[u];
            let (vx, vy) = pos[v];
            let (ox, oy) = (ux - vx, uy - vy);
            let dist = (ox * ox + oy * oy).sqrt().max(1e-9);
            let force = dist * dist / k;
            let (fx, fy) = (ox / dist * force, oy / dist * force);
            disp[u].0 -= fx;
            disp[u].1 -= fy;
            disp[v].0 += fx;
            disp[v].1 += fy;
        }

        // Move, capped by the cooling temperature.
        let temperature =
            initial_temperature * (1.0 - iteration as f64 / iterations as f64);
        for (p, d) in pos.iter_mut().zip(&disp) {
            let magnitude = (d.0 * d.0 + d.1 * d.1).sqrt();
            if magnitude > 1e-12 {
                let step = magnitude.min(temperature);
                p.0 += d.0 / magnitude * step;
                p.1 += d.1 / magnitude * step;
            }
        }
    }

    Layout::from_points(pos)
}
