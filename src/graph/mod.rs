//! Typed knowledge graph: construction and read-only access.
//!
//! [`Graph::build`] assembles an immutable graph from raw snapshot records:
//! it filters edges by relevance, optionally bounds the graph to a BFS
//! neighborhood around a center node, deduplicates parallel edges, and
//! resolves the placeholder policy for dangling edge references. Everything
//! downstream (metrics, centrality, communities, layouts) takes `&Graph`
//! and only reads, so the engines are safe to run concurrently.
//!
//! The graph is backed by `petgraph`'s [`DiGraph`] purely as a container;
//! every analytic algorithm in this crate is implemented locally.

pub mod centrality;
pub mod community;
pub mod metrics;
pub mod paths;

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::model::{NodeKind, NodeRecord};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options controlling graph construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Edges with weight below this threshold are discarded.
    #[serde(default)]
    pub min_relevance: f64,
    /// Maximum BFS depth from `center_id`; `None` means unbounded.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// When set, keep only the BFS neighborhood around this node.
    #[serde(default)]
    pub center_id: Option<String>,
    /// When true, synthesize a placeholder node for edges that reference a
    /// missing node id instead of failing with an error.
    #[serde(default)]
    pub create_placeholder: bool,
    /// Whether edges are interpreted as directed.
    #[serde(default = "default_directed")]
    pub directed: bool,
}

fn default_directed() -> bool {
    true
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            min_relevance: 0.0,
            max_depth: None,
            center_id: None,
            create_placeholder: false,
            directed: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Node and edge payloads
// ---------------------------------------------------------------------------

/// Node payload stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Unique identifier.
    pub id: String,
    /// Display title (empty for placeholder nodes).
    pub title: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Importance, clamped to [0, 1].
    pub importance: f64,
}

/// Edge payload stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Relevance weight, non-negative.
    pub weight: f64,
    /// Link classification carried through from the record.
    pub link_type: String,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Immutable analysis graph.
///
/// Node order is stable (snapshot record order, placeholders appended in
/// first-reference order) and defines the index space for every per-node
/// result array produced by the engines.
#[derive(Debug)]
pub struct Graph {
    graph: DiGraph<NodeData, EdgeData>,
    index_of: HashMap<String, NodeIndex>,
    directed: bool,
}

impl Graph {
    /// Build a graph from raw records.
    ///
    /// Fails with [`GraphError::InvalidEdge`] if an edge references a missing
    /// node and `create_placeholder` is not set, and with
    /// [`GraphError::CenterNotFound`] if `center_id` names an unknown node.
    pub fn build(
        nodes: &[NodeRecord],
        edges: &[crate::model::EdgeRecord],
        options: &GraphOptions,
    ) -> GraphResult<Self> {
        // Unique node records, first occurrence wins; importance clamped here
        // so downstream code never re-validates.
        let mut records: Vec<NodeData> = Vec::with_capacity(nodes.len());
        let mut position: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if position.contains_key(&node.id) {
                continue;
            }
            position.insert(node.id.clone(), records.len());
            records.push(NodeData {
                id: node.id.clone(),
                title: node.title.clone(),
                kind: node.kind.clone(),
                importance: node.importance.clamp(0.0, 1.0),
            });
        }

        // Relevance filter, then placeholder resolution for dangling ids.
        let mut kept_edges: Vec<(String, String, EdgeData)> = Vec::new();
        for edge in edges {
            let weight = edge.weight.max(0.0);
            if weight < options.min_relevance {
                continue;
            }
            for endpoint in [&edge.from, &edge.to] {
                if !position.contains_key(endpoint) {
                    if !options.create_placeholder {
                        return Err(GraphError::InvalidEdge {
                            from: edge.from.clone(),
                            to: edge.to.clone(),
                            missing: endpoint.clone(),
                        });
                    }
                    position.insert(endpoint.clone(), records.len());
                    records.push(NodeData {
                        id: endpoint.clone(),
                        title: String::new(),
                        kind: NodeKind::Unknown,
                        importance: 0.0,
                    });
                }
            }
            kept_edges.push((
                edge.from.clone(),
                edge.to.clone(),
                EdgeData {
                    weight,
                    link_type: edge.link_type.clone(),
                },
            ));
        }

        // Parallel-edge dedup: max weight wins per (from, to) pair.
        let mut best: HashMap<(usize, usize), EdgeData> = HashMap::new();
        let mut pair_order: Vec<(usize, usize)> = Vec::new();
        for (from, to, data) in kept_edges {
            let key = (position[&from], position[&to]);
            match best.get(&key) {
                Some(existing) if existing.weight >= data.weight => {}
                Some(_) => {
                    best.insert(key, data);
                }
                None => {
                    pair_order.push(key);
                    best.insert(key, data);
                }
            }
        }

        // Optional BFS neighborhood bounding.
        let kept_nodes: Vec<bool> = match &options.center_id {
            Some(center) => {
                let start = *position
                    .get(center)
                    .ok_or_else(|| GraphError::CenterNotFound { id: center.clone() })?;
                let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
                for &(u, v) in &pair_order {
                    adjacency[u].push(v);
                    if !options.directed {
                        adjacency[v].push(u);
                    }
                }
                bounded_bfs(&adjacency, start, options.max_depth)
            }
            None => vec![true; records.len()],
        };

        let mut graph = DiGraph::with_capacity(records.len(), pair_order.len());
        let mut index_of = HashMap::with_capacity(records.len());
        let mut node_index: Vec<Option<NodeIndex>> = vec![None; records.len()];
        for (pos, record) in records.into_iter().enumerate() {
            if !kept_nodes[pos] {
                continue;
            }
            let idx = graph.add_node(record);
            index_of.insert(graph[idx].id.clone(), idx);
            node_index[pos] = Some(idx);
        }
        for key in pair_order {
            if let (Some(u), Some(v)) = (node_index[key.0], node_index[key.1]) {
                let data = best.remove(&key).expect("deduped edge present");
                graph.add_edge(u, v, data);
            }
        }

        Ok(Self {
            graph,
            index_of,
            directed: options.directed,
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges (after dedup and filtering).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether edges are interpreted as directed.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Node payloads in stable order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Node ids in stable order.
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes().map(|n| n.id.clone()).collect()
    }

    /// Position of a node id in the stable order, if present.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).map(|idx| idx.index())
    }

    /// All edges as (source position, target position, payload).
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &EdgeData)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// In-degree and out-degree per node, self-loops counted on both sides.
    pub fn degrees(&self) -> (Vec<usize>, Vec<usize>) {
        let n = self.node_count();
        let mut in_deg = vec![0usize; n];
        let mut out_deg = vec![0usize; n];
        for (u, v, _) in self.edges() {
            out_deg[u] += 1;
            in_deg[v] += 1;
        }
        (in_deg, out_deg)
    }

    /// Adjacency lists in traversal direction: outgoing edges when directed,
    /// both directions otherwise. Used by BFS-based metrics.
    pub fn traversal_adjacency(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut adjacency = vec![Vec::new(); n];
        for (u, v, _) in self.edges() {
            adjacency[u].push(v);
            if !self.directed && u != v {
                adjacency[v].push(u);
            }
        }
        adjacency
    }

    /// Outgoing adjacency lists regardless of the directed flag.
    pub fn out_adjacency(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut adjacency = vec![Vec::new(); n];
        for (u, v, _) in self.edges() {
            adjacency[u].push(v);
        }
        adjacency
    }

    /// Undirected collapse: deduplicated neighbor sets, self-loops excluded.
    ///
    /// This is the substrate for transitivity, components, articulation
    /// points, and community detection.
    pub fn undirected_adjacency(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut adjacency = vec![Vec::new(); n];
        for (u, v, _) in self.edges() {
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            if seen.insert(key) {
                adjacency[u].push(v);
                adjacency[v].push(u);
            }
        }
        adjacency
    }

    /// Weighted undirected collapse: per-pair weights summed over both
    /// directions, self-loops excluded. Used by community detection.
    pub fn undirected_weighted(&self) -> Vec<Vec<(usize, f64)>> {
        let n = self.node_count();
        let mut weights: HashMap<(usize, usize), f64> = HashMap::new();
        for (u, v, data) in self.edges() {
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            *weights.entry(key).or_insert(0.0) += data.weight;
        }
        let mut adjacency = vec![Vec::new(); n];
        for ((u, v), w) in weights {
            adjacency[u].push((v, w));
            adjacency[v].push((u, w));
        }
        adjacency
    }

    /// Whether the directed graph is acyclic (Kahn's algorithm).
    ///
    /// Self-loops make a graph cyclic. An undirected graph is never a DAG
    /// for layout purposes.
    pub fn is_dag(&self) -> bool {
        if !self.directed {
            return false;
        }
        let n = self.node_count();
        let adjacency = self.out_adjacency();
        let mut in_deg = vec![0usize; n];
        for (u, v, _) in self.edges() {
            if u == v {
                return false;
            }
            in_deg[v] += 1;
        }
        let mut queue: VecDeque<usize> =
            (0..n).filter(|&v| in_deg[v] == 0).collect();
        let mut visited = 0usize;
        while let Some(u) = queue.pop_front() {
            visited += 1;
            for &v in &adjacency[u] {
                in_deg[v] -= 1;
                if in_deg[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        visited == n
    }

    /// Direct access to petgraph indices, for callers that iterate edges by
    /// endpoint payloads.
    pub fn node_data(&self, position: usize) -> &NodeData {
        &self.graph[NodeIndex::new(position)]
    }
}

/// Bounded BFS over precomputed adjacency; returns a keep-mask.
fn bounded_bfs(adjacency: &[Vec<usize>], start: usize, max_depth: Option<usize>) -> Vec<bool> {
    let mut kept = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    kept[start] = true;
    queue.push_back((start, 0usize));
    while let Some((u, depth)) = queue.pop_front() {
        if let Some(limit) = max_depth {
            if depth >= limit {
                continue;
            }
        }
        for &v in &adjacency[u] {
            if !kept[v] {
                kept[v] = true;
                queue.push_back((v, depth + 1));
            }
        }
    }
    kept
}
