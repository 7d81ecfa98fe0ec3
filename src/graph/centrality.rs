//! Node centrality: degree, PageRank, betweenness, closeness, eigenvector,
//! and adjacency-similarity scores.
//!
//! Exact vs. approximate paths are chosen purely by graph size, matching the
//! latency gates in the component contract: Brandes betweenness is exact
//! below 200 nodes and sampled above; the adjacency-similarity signal is
//! skipped entirely above 500 nodes; PageRank switches from run-to-
//! convergence to a fixed iteration count at 500 nodes.
//!
//! All per-node vectors follow the graph's stable node order.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::paths;
use super::Graph;

/// Node count below which betweenness is computed exactly.
const BETWEENNESS_EXACT_LIMIT: usize = 200;
/// Number of source nodes sampled for approximate betweenness.
const BETWEENNESS_SAMPLE_SIZE: usize = 100;
/// Node count at which PageRank switches to a fixed iteration budget.
const PAGERANK_FIXED_ITER_LIMIT: usize = 500;
/// Node count above which the adjacency-similarity signal is skipped.
const SIMILARITY_LIMIT: usize = 500;

/// All centrality scores, one entry per node in stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityScores {
    pub degree_in: Vec<usize>,
    pub degree_out: Vec<usize>,
    pub degree_total: Vec<usize>,
    pub pagerank: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub eigenvector: Vec<f64>,
    /// Mean cosine similarity of each node's adjacency row against all
    /// others; `None` above the size gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<Vec<f64>>,
}

/// Compute every centrality measure for the graph.
///
/// `seed` controls source sampling for approximate betweenness so repeated
/// runs on the same snapshot agree.
pub fn compute(graph: &Graph, seed: u64) -> CentralityScores {
    let n = graph.node_count();
    let (degree_in, degree_out) = graph.degrees();
    let degree_total = degree_in
        .iter()
        .zip(&degree_out)
        .map(|(i, o)| i + o)
        .collect();

    debug!(nodes = n, edges = graph.edge_count(), "computing centrality");

    CentralityScores {
        degree_in,
        degree_out,
        degree_total,
        pagerank: pagerank(graph),
        betweenness: betweenness(graph, seed),
        closeness: closeness(graph),
        eigenvector: eigenvector(graph),
        similarity: similarity(graph),
    }
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Power-iteration PageRank with damping 0.85.
///
/// Dangling-node mass is redistributed uniformly. Graphs with at least 500
/// nodes run a fixed 20 iterations; smaller graphs iterate to an L1
/// tolerance of 1e-6, capped at 100 iterations.
pub fn pagerank(graph: &Graph) -> Vec<f64> {
    const DAMPING: f64 = 0.85;
    let n = graph.node_count();
    if n == 0 {
        return vec![];
    }

    let adjacency = graph.out_adjacency();
    let out_deg: Vec<usize> = adjacency.iter().map(|a| a.len()).collect();
    let (max_iter, tolerance) = if n >= PAGERANK_FIXED_ITER_LIMIT {
        (20, None)
    } else {
        (100, Some(1e-6))
    };

    let uniform = 1.0 / n as f64;
    let mut rank = vec![uniform; n];
    for _ in 0..max_iter {
        let dangling_mass: f64 = (0..n)
            .filter(|&v| out_deg[v] == 0)
            .map(|v| rank[v])
            .sum();
        let base = (1.0 - DAMPING) * uniform + DAMPING * dangling_mass * uniform;

        let mut next = vec![base; n];
        for (u, targets) in adjacency.iter().enumerate() {
            if targets.is_empty() {
                continue;
            }
            let share = DAMPING * rank[u] / targets.len() as f64;
            for &v in targets {
                next[v] += share;
            }
        }

        let delta: f64 = rank
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).abs())
            .sum();
        rank = next;
        if let Some(tol) = tolerance {
            if delta < tol {
                break;
            }
        }
    }
    rank
}

// ---------------------------------------------------------------------------
// Betweenness (Brandes)
// ---------------------------------------------------------------------------

/// Betweenness centrality.
///
/// Exact Brandes below 200 nodes; above that, a fixed random sample of 100
/// source nodes with scores scaled by `n / sample_size`.
pub fn betweenness(graph: &Graph, seed: u64) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return vec![];
    }
    let adjacency = graph.traversal_adjacency();

    let (sources, scale) = if n < BETWEENNESS_EXACT_LIMIT {
        ((0..n).collect::<Vec<_>>(), 1.0)
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = sample(&mut rng, n, BETWEENNESS_SAMPLE_SIZE).into_vec();
        (picked, n as f64 / BETWEENNESS_SAMPLE_SIZE as f64)
    };

    let totals = sources
        .par_iter()
        .map(|&source| brandes_single_source(&adjacency, source))
        .reduce(
            || vec![0.0; n],
            |mut acc, partial| {
                for (a, p) in acc.iter_mut().zip(&partial) {
                    *a += p;
                }
                acc
            },
        );

    totals.into_iter().map(|score| score * scale).collect()
}

/// One Brandes source pass: BFS orders, path counts, then dependency
/// accumulation in reverse BFS order.
fn brandes_single_source(adjacency: &[Vec<usize>], source: usize) -> Vec<f64> {
    let n = adjacency.len();
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![usize::MAX; n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut queue = std::collections::VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        order.push(u);
        for &v in &adjacency[u] {
            if dist[v] == usize::MAX {
                dist[v] = dist[u] + 1;
                queue.push_back(v);
            }
            if dist[v] == dist[u] + 1 {
                sigma[v] += sigma[u];
                predecessors[v].push(u);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    let mut scores = vec![0.0f64; n];
    for &v in order.iter().rev() {
        for &u in &predecessors[v] {
            delta[u] += sigma[u] / sigma[v] * (1.0 + delta[v]);
        }
        if v != source {
            scores[v] += delta[v];
        }
    }
    scores
}

// ---------------------------------------------------------------------------
// Closeness
// ---------------------------------------------------------------------------

/// Harmonic closeness: mean reciprocal distance over reachable nodes only.
///
/// Nodes that reach nothing score 0.
pub fn closeness(graph: &Graph) -> Vec<f64> {
    let adjacency = graph.traversal_adjacency();
    (0..adjacency.len())
        .into_par_iter()
        .map(|source| {
            let dist = paths::bfs_distances(&adjacency, source);
            let mut sum = 0.0;
            let mut reachable = 0usize;
            for (target, d) in dist.iter().enumerate() {
                if target == source {
                    continue;
                }
                if let Some(d) = d {
                    sum += 1.0 / *d as f64;
                    reachable += 1;
                }
            }
            if reachable == 0 {
                0.0
            } else {
                sum / reachable as f64
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Eigenvector centrality
// ---------------------------------------------------------------------------

/// Eigenvector centrality by power iteration over incoming edges.
///
/// Iterates on the shifted matrix A + I: the shift leaves the eigenvectors
/// untouched but gives the dominant eigenvalue a strictly larger modulus
/// than the rest of the spectrum, so directed cycles (whose unshifted
/// adjacency has complex eigenvalues of equal modulus) still converge.
/// Falls back to an all-zero vector when the iteration collapses or fails
/// to converge (e.g. on edgeless graphs) rather than failing the analysis.
pub fn eigenvector(graph: &Graph) -> Vec<f64> {
    const MAX_ITER: usize = 100;
    const TOLERANCE: f64 = 1e-6;

    let n = graph.node_count();
    if n == 0 {
        return vec![];
    }
    let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for (u, v, data) in graph.edges() {
        incoming[v].push((u, data.weight.max(f64::MIN_POSITIVE)));
        if !graph.is_directed() && u != v {
            incoming[u].push((v, data.weight.max(f64::MIN_POSITIVE)));
        }
    }
    if incoming.iter().all(|sources| sources.is_empty()) {
        return vec![0.0; n];
    }

    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..MAX_ITER {
        let mut next = x.clone(); // identity shift
        for (v, sources) in incoming.iter().enumerate() {
            for &(u, w) in sources {
                next[v] += w * x[u];
            }
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm < f64::MIN_POSITIVE {
            return vec![0.0; n];
        }
        for v in next.iter_mut() {
            *v /= norm;
        }
        let delta: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if delta < TOLERANCE {
            return x;
        }
    }
    // Did not converge within budget.
    vec![0.0; n]
}

// ---------------------------------------------------------------------------
// Adjacency similarity
// ---------------------------------------------------------------------------

/// Mean cosine similarity of each node's weighted out-adjacency row against
/// every other row, diagonal excluded. Skipped (returns `None`) above 500
/// nodes to bound the O(n^3) cost.
pub fn similarity(graph: &Graph) -> Option<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 || n > SIMILARITY_LIMIT {
        return None;
    }

    // Dense weighted rows with a zeroed diagonal: self-loops are excluded
    // from the similarity signal.
    let mut rows = vec![vec![0.0f64; n]; n];
    for (u, v, data) in graph.edges() {
        if u != v {
            rows[u][v] = data.weight;
        }
    }
    let norms: Vec<f64> = rows
        .iter()
        .map(|row| row.iter().map(|w| w * w).sum::<f64>().sqrt())
        .collect();

    let scores = (0..n)
        .into_par_iter()
        .map(|i| {
            if n == 1 {
                return 0.0;
            }
            let mut total = 0.0;
            for j in 0..n {
                if i == j || norms[i] == 0.0 || norms[j] == 0.0 {
                    continue;
                }
                let dot: f64 = rows[i].iter().zip(&rows[j]).map(|(a, b)| a * b).sum();
                total += dot / (norms[i] * norms[j]);
            }
            total / (n - 1) as f64
        })
        .collect();
    Some(scores)
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
    fn pagerank_sums_to_one() {
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")],
        );
        let ranks = pagerank(&graph);
        let total: f64 = ranks.iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "total = {total}");
    }

    #[test]
    fn pagerank_handles_dangling_nodes() {
        // b has no outgoing edges; its mass must be redistributed, not lost.
        let graph = build(&["a", "b"], &[("a", "b")]);
        let ranks = pagerank(&graph);
        let total: f64 = ranks.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(ranks[1] > ranks[0], "sink receives more rank");
    }

    #[test]
    fn pagerank_empty_graph() {
        let graph = build(&[], &[]);
        assert!(pagerank(&graph).is_empty());
    }

    #[test]
    fn betweenness_of_chain_middle_node() {
        // a -> b -> c: all shortest paths through b
        let graph = build(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let scores = betweenness(&graph, 0);
        assert!((scores[1] - 1.0).abs() < 1e-12, "middle = {}", scores[1]);
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn betweenness_star_hub() {
        // undirected-style star via reciprocal edges; hub lies on all pairs
        let graph = build(
            &["hub", "a", "b", "c"],
            &[
                ("hub", "a"),
                ("a", "hub"),
                ("hub", "b"),
                ("b", "hub"),
                ("hub", "c"),
                ("c", "hub"),
            ],
        );
        let scores = betweenness(&graph, 0);
        assert!(scores[0] > scores[1]);
        // 3 ordered leaf pairs * 2 directions = 6 dependent paths
        assert!((scores[0] - 6.0).abs() < 1e-12, "hub = {}", scores[0]);
    }

    #[test]
    fn closeness_favors_central_nodes() {
        let graph = build(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")],
        );
        let scores = closeness(&graph);
        assert!(scores[1] > scores[0]);
        assert!((scores[1] - 1.0).abs() < 1e-12);
        // a reaches b at 1 and c at 2: (1 + 0.5) / 2
        assert!((scores[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn closeness_isolated_node_is_zero() {
        let graph = build(&["a", "b", "c"], &[("a", "b")]);
        let scores = closeness(&graph);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn eigenvector_zero_fallback_on_edgeless_graph() {
        let graph = build(&["a", "b", "c"], &[]);
        assert_eq!(eigenvector(&graph), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn eigenvector_peaks_on_cycle_hub() {
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "a")],
        );
        let scores = eigenvector(&graph);
        let max = scores.iter().cloned().fold(0.0f64, f64::max);
        assert!(max > 0.0);
        // d gets no incoming edges, so it must score lowest
        assert!(scores[3] <= scores[0]);
    }

    #[test]
    fn eigenvector_uniform_on_directed_cycle() {
        // The cycle's unshifted adjacency has complex eigenvalues of equal
        // modulus; the shifted iteration must still settle on the uniform
        // eigenvector instead of collapsing to zero.
        let graph = build(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
        );
        let scores = eigenvector(&graph);
        assert!(scores.iter().all(|&s| s > 0.0), "scores = {scores:?}");
        for s in &scores {
            assert!((s - scores[0]).abs() < 1e-6, "scores = {scores:?}");
        }
    }

    #[test]
    fn sampled_betweenness_ranks_bridge_hubs_first() {
        // Two 124-leaf stars joined at their hubs: large enough to take the
        // source-sampling path. Leaves lie on no shortest path at all, so
        // any sample must score them zero and put the hubs on top.
        let leaf_count = 124;
        let mut nodes = vec![
            NodeRecord::new("hub_a", "hub_a"),
            NodeRecord::new("hub_b", "hub_b"),
        ];
        let mut edges = vec![
            EdgeRecord::new("hub_a", "hub_b"),
            EdgeRecord::new("hub_b", "hub_a"),
        ];
        for (hub, side) in [("hub_a", "a"), ("hub_b", "b")] {
            for i in 0..leaf_count {
                let id = format!("{side}{i}");
                nodes.push(NodeRecord::new(&id, &id));
                edges.push(EdgeRecord::new(hub, &id));
                edges.push(EdgeRecord::new(&id, hub));
            }
        }
        let graph = Graph::build(&nodes, &edges, &GraphOptions::default()).unwrap();
        let n = graph.node_count();
        assert!(n >= BETWEENNESS_EXACT_LIMIT);

        let sampled = betweenness(&graph, 42);
        assert_eq!(sampled.len(), n);
        assert!(sampled.iter().all(|s| s.is_finite()));
        assert!(sampled[2..].iter().all(|&s| s == 0.0));
        assert!(sampled[0] > 0.0 && sampled[1] > 0.0);

        // The scaled estimate stays close to the full Brandes total.
        let adjacency = graph.traversal_adjacency();
        let mut exact = vec![0.0f64; n];
        for source in 0..n {
            for (total, partial) in exact.iter_mut().zip(brandes_single_source(&adjacency, source))
            {
                *total += partial;
            }
        }
        for hub in [0, 1] {
            let relative = (sampled[hub] - exact[hub]).abs() / exact[hub];
            assert!(
                relative < 0.5,
                "hub {hub}: sampled {} vs exact {}",
                sampled[hub],
                exact[hub]
            );
        }
    }

    #[test]
    fn pagerank_fixed_iteration_budget_on_large_graph() {
        // 500 nodes triggers the fixed-iteration branch. A star converges
        // well inside that budget, and rank mass must still be conserved.
        let mut nodes = vec![NodeRecord::new("hub", "hub")];
        let mut edges = Vec::new();
        for i in 0..499 {
            let id = format!("leaf{i}");
            nodes.push(NodeRecord::new(&id, &id));
            edges.push(EdgeRecord::new(&id, "hub"));
        }
        let graph = Graph::build(&nodes, &edges, &GraphOptions::default()).unwrap();
        assert!(graph.node_count() >= PAGERANK_FIXED_ITER_LIMIT);

        let ranks = pagerank(&graph);
        let total: f64 = ranks.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {total}");
        assert!(ranks.iter().all(|r| *r > 0.0));
        assert!(ranks[0] > ranks[1], "hub collects leaf mass");
        assert!((ranks[1] - ranks[499]).abs() < 1e-12, "leaves are symmetric");
    }

    #[test]
    fn similarity_identical_rows_score_high() {
        // a and b both point only at c: identical adjacency rows.
        let graph = build(&["a", "b", "c"], &[("a", "c"), ("b", "c")]);
        let scores = similarity(&graph).unwrap();
        assert!((scores[0] - 0.5).abs() < 1e-12, "a = {}", scores[0]);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn similarity_skipped_for_empty_graph() {
        let graph = build(&[], &[]);
        assert!(similarity(&graph).is_none());
    }

    #[test]
    fn degrees_count_self_loops_on_both_sides() {
        let graph = build(&["a"], &[("a", "a")]);
        let scores = compute(&graph, 0);
        assert_eq!(scores.degree_in, vec![1]);
        assert_eq!(scores.degree_out, vec![1]);
        assert_eq!(scores.degree_total, vec![2]);
    }
}
