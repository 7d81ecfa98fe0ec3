//! Sugiyama-style hierarchical layout for DAGs.
//!
//! Layers are assigned by longest path from the sources; within each layer,
//! edge crossings are reduced with a few barycenter sweeps. `y` is the layer
//! index (sources at 0), `x` the slot within the layer, centered.

use std::collections::VecDeque;

use crate::error::{LayoutError, LayoutResult};
use crate::graph::Graph;

use super::Layout;

const BARYCENTER_SWEEPS: usize = 4;

/// Compute the layered layout; fails on cyclic graphs.
pub fn layout(graph: &Graph) -> LayoutResult<Layout> {
    if !graph.is_dag() {
        return Err(LayoutError::CyclicGraph);
    }
    let n = graph.node_count();
    if n == 0 {
        return Ok(Layout::from_points(vec![]));
    }

    let adjacency = graph.out_adjacency();
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_deg = vec![0usize; n];
    for (u, targets) in adjacency.iter().enumerate() {
        for &v in targets {
            predecessors[v].push(u);
            in_deg[v] += 1;
        }
    }

    // Longest path from any source, via topological order.
    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| in_deg[v] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            layer[v] = layer[v].max(layer[u] + 1);
            in_deg[v] -= 1;
            if in_deg[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    let layer_count = layer.iter().max().map_or(0, |&max| max + 1);
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for (v, &l) in layer.iter().enumerate() {
        rows[l].push(v);
    }

    // Barycenter sweeps: order each row by the mean slot of its neighbors
    // in the adjacent row, alternating downward and upward passes.
    let mut slot = vec![0usize; n];
    for row in &rows {
        for (i, &v) in row.iter().enumerate() {
            slot[v] = i;
        }
    }
    for sweep in 0..BARYCENTER_SWEEPS {
        let downward = sweep % 2 == 0;
        let indices: Vec<usize> = if downward {
            (1..layer_count).collect()
        } else {
            (0..layer_count.saturating_sub(1)).rev().collect()
        };
        for row_index in indices {
            let neighbors: &[Vec<usize>] = if downward { &predecessors } else { &adjacency };
            let mut keyed: Vec<(f64, usize)> = rows[row_index]
                .iter()
                .map(|&v| {
                    let adjacent = &neighbors[v];
                    let barycenter = if adjacent.is_empty() {
                        slot[v] as f64
                    } else {
                        adjacent.iter().map(|&u| slot[u] as f64).sum::<f64>()
                            / adjacent.len() as f64
                    };
                    (barycenter, v)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            rows[row_index] = keyed.into_iter().map(|(_, v)| v).collect();
            for (i, &v) in rows[row_index].iter().enumerate() {
                slot[v] = i;
            }
        }
    }

    // Coordinates: center each row horizontally, one unit per layer.
    let mut points = vec![(0.0, 0.0); n];
    for (row_index, row) in rows.iter().enumerate() {
        let offset = (row.len() as f64 - 1.0) / 2.0;
        for (i, &v) in row.iter().enumerate() {
            points[v] = (i as f64 - offset, row_index as f64);
        }
    }
    Ok(Layout::from_points(points))
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
    fn cyclic_graph_is_rejected() {
        let graph = build(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert!(matches!(layout(&graph), Err(LayoutError::CyclicGraph)));
    }

    #[test]
    fn dag_layers_follow_longest_path() {
        // root -> a -> b, root -> c
        let graph = build(
            &["root", "a", "b", "c"],
            &[("root", "a"), ("a", "b"), ("root", "c")],
        );
        let result = layout(&graph).unwrap();
        assert_eq!(result.y[0], 0.0); // root
        assert_eq!(result.y[1], 1.0); // a
        assert_eq!(result.y[2], 2.0); // b
        assert_eq!(result.y[3], 1.0); // c

        let distinct: std::collections::BTreeSet<i64> =
            result.y.iter().map(|&y| y as i64).collect();
        assert!(distinct.len() >= 2, "at least two layers expected");
    }

    #[test]
    fn diamond_layers() {
        // a -> b, a -> c, b -> d, c -> d
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let result = layout(&graph).unwrap();
        assert_eq!(result.y[0], 0.0);
        assert_eq!(result.y[1], 1.0);
        assert_eq!(result.y[2], 1.0);
        assert_eq!(result.y[3], 2.0);
        // b and c share a layer but not a slot
        assert_ne!(result.x[1], result.x[2]);
    }

    #[test]
    fn isolated_nodes_land_on_layer_zero() {
        let graph = build(&["a", "b"], &[]);
        let result = layout(&graph).unwrap();
        assert_eq!(result.y, vec![0.0, 0.0]);
        assert_ne!(result.x[0], result.x[1]);
    }
}
