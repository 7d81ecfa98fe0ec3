//! Community detection on the undirected collapse of the graph.
//!
//! Five independent partitioning strategies run side by side; each reports
//! its membership vector, modularity, and community count. No winner is
//! chosen here — ranking the partitions (usually by modularity) is the
//! caller's concern.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Graph;

/// Node count above which spectral bisection degrades to a single community.
const SPECTRAL_LIMIT: usize = 500;
/// Random-walk length for Walktrap-style profiles.
const WALK_LENGTH: usize = 4;

/// Result of one partitioning method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    /// Community id per node, contiguous from 0, in stable node order.
    pub membership: Vec<usize>,
    /// Modularity of this partition.
    pub modularity: f64,
    /// Number of communities.
    pub community_count: usize,
}

impl CommunityResult {
    fn from_membership(membership: Vec<usize>, adjacency: &WeightedAdjacency) -> Self {
        let membership = relabel(membership);
        let community_count = membership.iter().max().map_or(0, |&max| max + 1);
        let modularity = modularity(adjacency, &membership);
        Self {
            membership,
            modularity,
            community_count,
        }
    }
}

/// Undirected weighted adjacency, as produced by
/// [`Graph::undirected_weighted`].
pub type WeightedAdjacency = Vec<Vec<(usize, f64)>>;

/// Run all partitioning methods, keyed by method name.
pub fn compute(graph: &Graph, seed: u64) -> BTreeMap<String, CommunityResult> {
    let adjacency = graph.undirected_weighted();
    debug!(nodes = adjacency.len(), "detecting communities");

    let mut results = BTreeMap::new();
    results.insert(
        "louvain".to_string(),
        CommunityResult::from_membership(louvain(&adjacency, seed), &adjacency),
    );
    results.insert(
        "fast_greedy".to_string(),
        CommunityResult::from_membership(fast_greedy(&adjacency), &adjacency),
    );
    results.insert(
        "label_propagation".to_string(),
        CommunityResult::from_membership(label_propagation(&adjacency, seed), &adjacency),
    );
    results.insert(
        "walktrap".to_string(),
        CommunityResult::from_membership(walktrap(&adjacency), &adjacency),
    );
    results.insert(
        "leading_eigenvector".to_string(),
        CommunityResult::from_membership(leading_eigenvector(&adjacency, seed), &adjacency),
    );
    results
}

// ---------------------------------------------------------------------------
// Modularity
// ---------------------------------------------------------------------------

/// Weighted modularity of a partition.
pub fn modularity(adjacency: &WeightedAdjacency, membership: &[usize]) -> f64 {
    let strengths: Vec<f64> = adjacency
        .iter()
        .map(|neighbors| neighbors.iter().map(|&(_, w)| w).sum())
        .collect();
    let two_m: f64 = strengths.iter().sum();
    if two_m == 0.0 {
        return 0.0;
    }

    let mut internal = 0.0;
    for (u, neighbors) in adjacency.iter().enumerate() {
        for &(v, w) in neighbors {
            if membership[u] == membership[v] {
                internal += w;
            }
        }
    }

    let mut community_strength: HashMap<usize, f64> = HashMap::new();
    for (v, &community) in membership.iter().enumerate() {
        *community_strength.entry(community).or_insert(0.0) += strengths[v];
    }
    let expected: f64 = community_strength
        .values()
        .map(|s| (s / two_m).powi(2))
        .sum();

    internal / two_m - expected
}

/// Relabel community ids to be contiguous from 0 in order of first appearance.
fn relabel(membership: Vec<usize>) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    membership
        .into_iter()
        .map(|community| {
            let next = mapping.len();
            *mapping.entry(community).or_insert(next)
        })
        .collect()
}

/// Subtract the mean, projecting the vector onto the complement of the
/// all-ones direction.
fn remove_mean(vector: &mut [f64]) {
    let mean = vector.iter().sum::<f64>() / vector.len() as f64;
    for value in vector.iter_mut() {
        *value -= mean;
    }
}

fn node_strengths(adjacency: &WeightedAdjacency) -> Vec<f64> {
    adjacency
        .iter()
        .map(|neighbors| neighbors.iter().map(|&(_, w)| w).sum())
        .collect()
}

// ---------------------------------------------------------------------------
// Louvain-style greedy modularity merging
// ---------------------------------------------------------------------------

/// Louvain method: repeated local-moving passes followed by graph
/// aggregation, until modularity stops improving.
pub fn louvain(adjacency: &WeightedAdjacency, seed: u64) -> Vec<usize> {
    let n = adjacency.len();
    if n == 0 {
        return vec![];
    }

    // Node-to-community assignment at the current aggregation level, plus
    // the mapping from original nodes to current-level nodes. Intra-community
    // weight folded away by aggregation is tracked per level node: it never
    // affects move choices (it stays internal wherever the node goes) but it
    // does count toward node strength.
    let mut node_of: Vec<usize> = (0..n).collect();
    let mut level_adjacency = adjacency.clone();
    let mut level_loops: Vec<f64> = vec![0.0; n];
    let mut rng = StdRng::seed_from_u64(seed);

    loop {
        let moved = local_moving(&level_adjacency, &level_loops, &mut rng);
        let membership = relabel(moved.clone());
        let communities = membership.iter().max().map_or(0, |&m| m + 1);
        if communities == level_adjacency.len() {
            // No merge happened at this level; we are done.
            break;
        }

        // Fold the level assignment into the original-node mapping.
        for community in node_of.iter_mut() {
            *community = membership[*community];
        }

        // Aggregate: one node per community, inter-community weights summed,
        // intra-community weight accumulated as loop weight.
        let mut pair_weights: HashMap<(usize, usize), f64> = HashMap::new();
        let mut next_loops = vec![0.0f64; communities];
        for (u, &loop_weight) in level_loops.iter().enumerate() {
            next_loops[membership[u]] += loop_weight;
        }
        for (u, neighbors) in level_adjacency.iter().enumerate() {
            for &(v, w) in neighbors {
                if u > v {
                    continue; // each undirected pair once
                }
                let (cu, cv) = (membership[u], membership[v]);
                if cu == cv {
                    next_loops[cu] += w;
                    continue;
                }
                let key = (cu.min(cv), cu.max(cv));
                *pair_weights.entry(key).or_insert(0.0) += w;
            }
        }
        let mut next = vec![Vec::new(); communities];
        for ((u, v), w) in pair_weights {
            next[u].push((v, w));
            next[v].push((u, w));
        }
        level_adjacency = next;
        level_loops = next_loops;
    }

    node_of
}

/// One local-moving pass: each node greedily joins the neighboring community
/// with the highest modularity gain, repeated until stable.
fn local_moving(adjacency: &WeightedAdjacency, loops: &[f64], rng: &mut StdRng) -> Vec<usize> {
    let n = adjacency.len();
    let strengths: Vec<f64> = node_strengths(adjacency)
        .into_iter()
        .zip(loops)
        .map(|(s, &l)| s + 2.0 * l)
        .collect();
    let two_m: f64 = strengths.iter().sum();
    let mut membership: Vec<usize> = (0..n).collect();
    if two_m == 0.0 {
        return membership;
    }
    let mut community_strength = strengths.clone();

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut improved = true;
    while improved {
        improved = false;
        for &u in &order {
            let current = membership[u];
            community_strength[current] -= strengths[u];

            // Weight from u into each neighboring community.
            let mut weight_to: HashMap<usize, f64> = HashMap::new();
            for &(v, w) in &adjacency[u] {
                *weight_to.entry(membership[v]).or_insert(0.0) += w;
            }

            let gain = |community: usize, weight: f64| {
                weight / two_m - strengths[u] * community_strength[community] / (two_m * two_m)
            };
            let stay = gain(current, weight_to.get(&current).copied().unwrap_or(0.0));
            let mut best = (current, stay);
            for (&community, &weight) in &weight_to {
                let g = gain(community, weight);
                if g > best.1 + 1e-12 {
                    best = (community, g);
                }
            }

            community_strength[best.0] += strengths[u];
            if best.0 != current {
                membership[u] = best.0;
                improved = true;
            }
        }
    }
    membership
}

// ---------------------------------------------------------------------------
// Fast-greedy agglomerative modularity maximization
// ---------------------------------------------------------------------------

/// Greedy agglomeration: start from singletons and merge the community pair
/// with the best modularity gain while any gain is positive.
pub fn fast_greedy(adjacency: &WeightedAdjacency) -> Vec<usize> {
    let n = adjacency.len();
    let mut membership: Vec<usize> = (0..n).collect();
    let strengths = node_strengths(adjacency);
    let two_m: f64 = strengths.iter().sum();
    if two_m == 0.0 {
        return membership;
    }

    // Community-pair edge weights and per-community strength fractions.
    let mut pair_weight: HashMap<(usize, usize), f64> = HashMap::new();
    for (u, neighbors) in adjacency.iter().enumerate() {
        for &(v, w) in neighbors {
            if u < v {
                *pair_weight.entry((u, v)).or_insert(0.0) += w;
            }
        }
    }
    let mut fraction: Vec<f64> = strengths.iter().map(|s| s / two_m).collect();
    let mut alive: Vec<bool> = vec![true; n];

    loop {
        // Best merge: ΔQ = 2 * (e_ab/2m − a_a * a_b)
        let mut best: Option<((usize, usize), f64)> = None;
        for (&(a, b), &w) in &pair_weight {
            let delta = 2.0 * (w / two_m - fraction[a] * fraction[b]);
            if delta > best.map_or(0.0, |(_, d)| d) {
                best = Some(((a, b), delta));
            }
        }
        let Some(((a, b), _)) = best else { break };

        // Merge b into a.
        for community in membership.iter_mut() {
            if *community == b {
                *community = a;
            }
        }
        fraction[a] += fraction[b];
        alive[b] = false;

        let mut merged: HashMap<(usize, usize), f64> = HashMap::new();
        for ((x, y), w) in pair_weight.drain() {
            let x = if x == b { a } else { x };
            let y = if y == b { a } else { y };
            if x == y {
                continue;
            }
            *merged.entry((x.min(y), x.max(y))).or_insert(0.0) += w;
        }
        pair_weight = merged;

        if alive.iter().filter(|&&live| live).count() <= 1 {
            break;
        }
    }
    membership
}

// ---------------------------------------------------------------------------
// Label propagation
// ---------------------------------------------------------------------------

/// Asynchronous label propagation: each node adopts the label carrying the
/// most neighbor weight, ties broken toward the smallest label. Iterates in
/// a seeded shuffled order until stable (capped at 100 sweeps).
pub fn label_propagation(adjacency: &WeightedAdjacency, seed: u64) -> Vec<usize> {
    const MAX_SWEEPS: usize = 100;
    let n = adjacency.len();
    let mut labels: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..MAX_SWEEPS {
        order.shuffle(&mut rng);
        let mut changed = 0usize;
        for &u in &order {
            if adjacency[u].is_empty() {
                continue;
            }
            let mut weight_of: HashMap<usize, f64> = HashMap::new();
            for &(v, w) in &adjacency[u] {
                *weight_of.entry(labels[v]).or_insert(0.0) += w;
            }
            let best = weight_of
                .into_iter()
                .max_by(|a, b| {
                    a.1.partial_cmp(&b.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(b.0.cmp(&a.0)) // smaller label wins ties
                })
                .map(|(label, _)| label)
                .unwrap_or(labels[u]);
            if best != labels[u] {
                labels[u] = best;
                changed += 1;
            }
        }
        if changed == 0 {
            break;
        }
    }
    labels
}

// ---------------------------------------------------------------------------
// Walktrap-style random-walk clustering
// ---------------------------------------------------------------------------

/// Random-walk clustering: t-step transition profiles per node, then
/// agglomerative merging of connected communities by profile distance,
/// keeping the partition with the best modularity along the merge sequence.
pub fn walktrap(adjacency: &WeightedAdjacency) -> Vec<usize> {
    let n = adjacency.len();
    if n == 0 {
        return vec![];
    }
    let strengths = node_strengths(adjacency);
    if strengths.iter().all(|&s| s == 0.0) {
        return (0..n).collect();
    }

    // Sparse t-step transition distribution per node.
    let profiles: Vec<HashMap<usize, f64>> = (0..n)
        .map(|start| {
            let mut current: HashMap<usize, f64> = HashMap::from([(start, 1.0)]);
            for _ in 0..WALK_LENGTH {
                let mut next: HashMap<usize, f64> = HashMap::new();
                for (&u, &p) in &current {
                    if strengths[u] == 0.0 {
                        *next.entry(u).or_insert(0.0) += p; // absorbing
                        continue;
                    }
                    for &(v, w) in &adjacency[u] {
                        *next.entry(v).or_insert(0.0) += p * w / strengths[u];
                    }
                }
                current = next;
            }
            current
        })
        .collect();

    // Degree-normalized squared distance between community profiles.
    let distance = |a: &HashMap<usize, f64>, b: &HashMap<usize, f64>| -> f64 {
        let mut total = 0.0;
        for (&k, &pa) in a {
            let pb = b.get(&k).copied().unwrap_or(0.0);
            let norm = strengths[k].max(f64::MIN_POSITIVE);
            total += (pa - pb).powi(2) / norm;
        }
        for (&k, &pb) in b {
            if !a.contains_key(&k) {
                let norm = strengths[k].max(f64::MIN_POSITIVE);
                total += pb.powi(2) / norm;
            }
        }
        total
    };

    let mut membership: Vec<usize> = (0..n).collect();
    let mut community_profile: Vec<HashMap<usize, f64>> = profiles;
    let mut community_size: Vec<usize> = vec![1; n];
    let mut connected: HashMap<(usize, usize), ()> = HashMap::new();
    for (u, neighbors) in adjacency.iter().enumerate() {
        for &(v, _) in neighbors {
            if u < v {
                connected.insert((u, v), ());
            }
        }
    }

    let mut best_membership = membership.clone();
    let mut best_q = modularity(adjacency, &membership);

    while !connected.is_empty() {
        let (&(a, b), _) = connected
            .iter()
            .min_by(|x, y| {
                let da = distance(&community_profile[x.0.0], &community_profile[x.0.1]);
                let db = distance(&community_profile[y.0.0], &community_profile[y.0.1]);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("non-empty candidate set");

        // Merge b into a; profile is the size-weighted mean.
        let (sa, sb) = (community_size[a] as f64, community_size[b] as f64);
        let mut merged: HashMap<usize, f64> = HashMap::new();
        for (&k, &p) in &community_profile[a] {
            *merged.entry(k).or_insert(0.0) += p * sa;
        }
        for (&k, &p) in &community_profile[b] {
            *merged.entry(k).or_insert(0.0) += p * sb;
        }
        for value in merged.values_mut() {
            *value /= sa + sb;
        }
        community_profile[a] = merged;
        community_size[a] += community_size[b];
        for community in membership.iter_mut() {
            if *community == b {
                *community = a;
            }
        }
        let rewired: Vec<(usize, usize)> = connected
            .keys()
            .copied()
            .map(|(x, y)| {
                let x = if x == b { a } else { x };
                let y = if y == b { a } else { y };
                (x.min(y), x.max(y))
            })
            .filter(|&(x, y)| x != y)
            .collect();
        connected = rewired.into_iter().map(|key| (key, ())).collect();

        let q = modularity(adjacency, &membership);
        if q > best_q {
            best_q = q;
            best_membership = membership.clone();
        }
    }

    best_membership
}

// ---------------------------------------------------------------------------
// Leading eigenvector
// ---------------------------------------------------------------------------

/// One-level spectral bisection by the sign of the leading eigenvector of
/// the modularity matrix. The power iteration starts from a seeded random
/// vector and projects out the all-ones direction (a zero-eigenvalue
/// direction of the modularity matrix) every step, keeping the search in
/// the subspace where community contrast lives. Falls back to a single
/// community when the iteration fails to converge, the split is trivial,
/// or it does not improve modularity. Degrades to a single community above
/// the spectral size gate.
pub fn leading_eigenvector(adjacency: &WeightedAdjacency, seed: u64) -> Vec<usize> {
    // The spectral shift slows per-step contraction, so the iteration budget
    // is deliberately generous.
    const MAX_ITER: usize = 500;
    const TOLERANCE: f64 = 1e-7;

    let n = adjacency.len();
    if n == 0 {
        return vec![];
    }
    let single = vec![0usize; n];
    if n > SPECTRAL_LIMIT {
        return single;
    }
    let strengths = node_strengths(adjacency);
    let two_m: f64 = strengths.iter().sum();
    if two_m == 0.0 {
        return (0..n).collect();
    }

    // Power iteration on B + sI where B = A − k kᵀ/2m and the shift makes
    // the dominant eigenvalue positive.
    let shift: f64 = strengths
        .iter()
        .cloned()
        .fold(0.0, f64::max)
        * 2.0
        + 1.0;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    remove_mean(&mut x);
    let mut converged = false;
    for _ in 0..MAX_ITER {
        let k_dot_x: f64 = strengths.iter().zip(&x).map(|(k, v)| k * v).sum();
        let mut next = vec![0.0f64; n];
        for (u, neighbors) in adjacency.iter().enumerate() {
            for &(v, w) in neighbors {
                next[u] += w * x[v];
            }
        }
        for u in 0..n {
            next[u] += shift * x[u] - strengths[u] * k_dot_x / two_m;
        }
        remove_mean(&mut next);
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm < f64::MIN_POSITIVE {
            return single;
        }
        for value in next.iter_mut() {
            *value /= norm;
        }
        let delta: f64 = x.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if delta < TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged {
        return single;
    }

    let membership: Vec<usize> = x.iter().map(|&v| usize::from(v >= 0.0)).collect();
    let split_sizes = membership.iter().filter(|&&c| c == 1).count();
    if split_sizes == 0 || split_sizes == n {
        return single;
    }
    if modularity(adjacency, &membership) <= modularity(adjacency, &single) {
        return single;
    }
    membership
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOptions;
    use crate::model::{EdgeRecord, NodeRecord};

    /// Two dense 4-cliques joined by a single bridge edge.
    fn two_cliques() -> WeightedAdjacency {
        let ids: Vec<String> = (0..8).map(|i| format!("n{i}")).collect();
        let nodes: Vec<NodeRecord> = ids.iter().map(|id| NodeRecord::new(id, id)).collect();
        let mut edges = Vec::new();
        for base in [0, 4] {
            for i in base..base + 4 {
                for j in (i + 1)..base + 4 {
                    edges.push(EdgeRecord::new(format!("n{i}"), format!("n{j}")));
                }
            }
        }
        edges.push(EdgeRecord::new("n0", "n4"));
        let graph = Graph::build(&nodes, &edges, &GraphOptions::default()).unwrap();
        graph.undirected_weighted()
    }

    fn assert_splits_cliques(membership: &[usize], method: &str) {
        let first = membership[0];
        assert!(
            membership[..4].iter().all(|&c| c == first),
            "{method}: first clique split: {membership:?}"
        );
        let second = membership[4];
        assert!(
            membership[4..].iter().all(|&c| c == second),
            "{method}: second clique split: {membership:?}"
        );
        assert_ne!(first, second, "{method}: cliques merged: {membership:?}");
    }

    #[test]
    fn louvain_separates_cliques() {
        let adjacency = two_cliques();
        let membership = relabel(louvain(&adjacency, 7));
        assert_splits_cliques(&membership, "louvain");
    }

    #[test]
    fn fast_greedy_separates_cliques() {
        let adjacency = two_cliques();
        let membership = relabel(fast_greedy(&adjacency));
        assert_splits_cliques(&membership, "fast_greedy");
    }

    #[test]
    fn label_propagation_groups_cliques() {
        let adjacency = two_cliques();
        let membership = relabel(label_propagation(&adjacency, 7));
        // Label propagation can collapse the bridge, but must never split a clique.
        let first = membership[0];
        assert!(membership[..4].iter().all(|&c| c == first));
        let second = membership[4];
        assert!(membership[4..].iter().all(|&c| c == second));
    }

    #[test]
    fn walktrap_separates_cliques() {
        let adjacency = two_cliques();
        let membership = relabel(walktrap(&adjacency));
        assert_splits_cliques(&membership, "walktrap");
    }

    #[test]
    fn leading_eigenvector_separates_cliques() {
        let adjacency = two_cliques();
        let membership = relabel(leading_eigenvector(&adjacency, 7));
        assert_splits_cliques(&membership, "leading_eigenvector");
    }

    #[test]
    fn leading_eigenvector_split_is_seed_independent() {
        let adjacency = two_cliques();
        for seed in [0, 1, 42] {
            let membership = relabel(leading_eigenvector(&adjacency, seed));
            assert_splits_cliques(&membership, "leading_eigenvector");
        }
    }

    #[test]
    fn modularity_of_good_split_is_positive() {
        let adjacency = two_cliques();
        let membership = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let q = modularity(&adjacency, &membership);
        assert!(q > 0.3, "q = {q}");
        let merged = vec![0; 8];
        assert!(modularity(&adjacency, &merged) < q);
    }

    #[test]
    fn modularity_zero_for_edgeless_graph() {
        let adjacency: WeightedAdjacency = vec![vec![], vec![], vec![]];
        assert_eq!(modularity(&adjacency, &[0, 1, 2]), 0.0);
    }

    #[test]
    fn all_methods_report_on_empty_graph() {
        let graph = Graph::build(&[], &[], &GraphOptions::default()).unwrap();
        let results = compute(&graph, 0);
        assert_eq!(results.len(), 5);
        for result in results.values() {
            assert!(result.membership.is_empty());
            assert_eq!(result.community_count, 0);
        }
    }

    #[test]
    fn results_keyed_by_method_name() {
        let graph = Graph::build(
            &[NodeRecord::new("a", "A"), NodeRecord::new("b", "B")],
            &[EdgeRecord::new("a", "b")],
            &GraphOptions::default(),
        )
        .unwrap();
        let results = compute(&graph, 0);
        for method in [
            "louvain",
            "fast_greedy",
            "label_propagation",
            "walktrap",
            "leading_eigenvector",
        ] {
            assert!(results.contains_key(method), "missing {method}");
            assert_eq!(results[method].membership.len(), 2);
        }
    }
}
