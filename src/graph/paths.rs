//! Unweighted shortest-path machinery shared by the engines.
//!
//! Diameter, closeness, stress majorization, and MDS all need per-source BFS
//! distances; computing them in one place keeps the per-engine code small.

use std::collections::VecDeque;

use rayon::prelude::*;

/// BFS distances from `source` over the given adjacency; `None` marks
/// unreachable nodes.
pub fn bfs_distances(adjacency: &[Vec<usize>], source: usize) -> Vec<Option<u32>> {
    let mut dist = vec![None; adjacency.len()];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let du = dist[u].expect("queued node has a distance");
        for &v in &adjacency[u] {
            if dist[v].is_none() {
                dist[v] = Some(du + 1);
                queue.push_back(v);
            }
        }
    }
    dist
}

/// Full distance matrix, one BFS per source, sources in parallel.
pub fn distance_matrix(adjacency: &[Vec<usize>]) -> Vec<Vec<Option<u32>>> {
    (0..adjacency.len())
        .into_par_iter()
        .map(|source| bfs_distances(adjacency, source))
        .collect()
}

/// Longest finite shortest-path length over all ordered pairs, or `None`
/// when no pair of distinct nodes is connected.
pub fn diameter(adjacency: &[Vec<usize>]) -> Option<u32> {
    distance_matrix(adjacency)
        .iter()
        .enumerate()
        .flat_map(|(source, row)| {
            row.iter()
                .enumerate()
                .filter(move |(target, _)| *target != source)
                .filter_map(|(_, d)| *d)
        })
        .max()
}
