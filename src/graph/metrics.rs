//! Structural metrics: density, diameter, transitivity, degree statistics,
//! and connectivity.
//!
//! All results are exact and deterministic for a given [`Graph`]; numeric
//! degeneracies (skewness of a constant degree sequence, diameter of a
//! disconnected graph) are reported as `None`, never as errors.

use serde::{Deserialize, Serialize};

use super::paths;
use super::Graph;

/// Degree distribution statistics over total degree (in + out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    pub mean: f64,
    pub median: f64,
    pub max: usize,
    pub variance: f64,
    /// Standardized third moment; `None` when n < 3 or the degree sequence
    /// is constant.
    pub skewness: Option<f64>,
}

/// Full structural-metrics result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    /// `m / (n*(n-1))` for directed graphs, doubled for undirected; 0 when n < 2.
    pub density: f64,
    /// Longest finite shortest-path length; `None` when no distinct pair is
    /// connected.
    pub diameter: Option<u32>,
    /// Global clustering coefficient on the undirected collapse.
    pub transitivity: f64,
    pub degree_stats: DegreeStats,
    pub is_connected: bool,
    /// Weak-component count on the undirected collapse.
    pub components: usize,
    /// Number of articulation points on the undirected collapse.
    pub articulation_points: usize,
}

/// Compute all structural metrics for a graph.
pub fn compute(graph: &Graph) -> GraphMetrics {
    let n = graph.node_count();
    let m = graph.edge_count();
    let undirected = graph.undirected_adjacency();

    let density = if n < 2 {
        0.0
    } else {
        let pairs = (n * (n - 1)) as f64;
        if graph.is_directed() {
            m as f64 / pairs
        } else {
            2.0 * m as f64 / pairs
        }
    };

    let components = weak_components(&undirected);

    GraphMetrics {
        node_count: n,
        edge_count: m,
        density,
        diameter: paths::diameter(&graph.traversal_adjacency()),
        transitivity: transitivity(&undirected),
        degree_stats: degree_stats(graph),
        is_connected: n > 0 && components == 1,
        components,
        articulation_points: articulation_points(&undirected).len(),
    }
}

// ---------------------------------------------------------------------------
// Transitivity
// ---------------------------------------------------------------------------

/// Global clustering coefficient: `3 * triangles / connected triples`.
pub fn transitivity(undirected: &[Vec<usize>]) -> f64 {
    let triples: usize = undirected
        .iter()
        .map(|neighbors| {
            let d = neighbors.len();
            d.saturating_sub(1) * d / 2
        })
        .sum();
    if triples == 0 {
        return 0.0;
    }

    // Count each triangle once: for edge (u, v) with u < v, a common
    // neighbor w > v closes exactly one triangle.
    let neighbor_sets: Vec<std::collections::HashSet<usize>> = undirected
        .iter()
        .map(|neighbors| neighbors.iter().copied().collect())
        .collect();
    let mut triangles = 0usize;
    for (u, neighbors) in undirected.iter().enumerate() {
        for &v in neighbors {
            if v <= u {
                continue;
            }
            triangles += neighbor_sets[u]
                .iter()
                .filter(|&&w| w > v && neighbor_sets[v].contains(&w))
                .count();
        }
    }
    3.0 * triangles as f64 / triples as f64
}

// ---------------------------------------------------------------------------
// Degree statistics
// ---------------------------------------------------------------------------

fn degree_stats(graph: &Graph) -> DegreeStats {
    let (in_deg, out_deg) = graph.degrees();
    let degrees: Vec<usize> = in_deg
        .iter()
        .zip(&out_deg)
        .map(|(i, o)| i + o)
        .collect();
    let n = degrees.len();
    if n == 0 {
        return DegreeStats {
            mean: 0.0,
            median: 0.0,
            max: 0,
            variance: 0.0,
            skewness: None,
        };
    }

    let mean = degrees.iter().sum::<usize>() as f64 / n as f64;
    let mut sorted = degrees.clone();
    sorted.sort_unstable();
    let median = if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    };
    let variance = degrees
        .iter()
        .map(|&d| (d as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    let std = variance.sqrt();
    let skewness = if n < 3 || std == 0.0 {
        None
    } else {
        Some(
            degrees
                .iter()
                .map(|&d| ((d as f64 - mean) / std).powi(3))
                .sum::<f64>()
                / n as f64,
        )
    };

    DegreeStats {
        mean,
        median,
        max: sorted[n - 1],
        variance,
        skewness,
    }
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Weak-component count via union-find.
pub fn weak_components(undirected: &[Vec<usize>]) -> usize {
    let n = undirected.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]]; // path halving
            x = parent[x];
        }
        x
    }

    let mut components = n;
    for (u, neighbors) in undirected.iter().enumerate() {
        for &v in neighbors {
            let ru = find(&mut parent, u);
            let rv = find(&mut parent, v);
            if ru != rv {
                parent[ru] = rv;
                components -= 1;
            }
        }
    }
    components
}

/// Articulation points via iterative DFS low-link on the undirected collapse.
pub fn articulation_points(undirected: &[Vec<usize>]) -> Vec<usize> {
    let n = undirected.len();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![usize::MAX; n];
    let mut is_cut = vec![false; n];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        // Explicit stack of (node, parent, neighbor cursor) frames.
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, usize::MAX, 0)];
        let mut root_children = 0usize;
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        loop {
            let Some(frame) = stack.last_mut() else { break };
            let (u, parent) = (frame.0, frame.1);
            if frame.2 < undirected[u].len() {
                let v = undirected[u][frame.2];
                frame.2 += 1;
                if disc[v] == usize::MAX {
                    if u == root {
                        root_children += 1;
                    }
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    stack.push((v, u, 0));
                } else if v != parent {
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                stack.pop();
                if let Some(&(p, _, _)) = stack.last() {
                    low[p] = low[p].min(low[u]);
                    if p != root && low[u] >= disc[p] {
                        is_cut[p] = true;
                    }
                }
            }
        }
        if root_children > 1 {
            is_cut[root] = true;
        }
    }

    (0..n).filter(|&v| is_cut[v]).collect()
}
