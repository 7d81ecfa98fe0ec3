//! 2D graph layouts: force-directed, stress-majorization, hierarchical,
//! MDS, and trivial fallbacks, plus per-layout quality scoring and a
//! size-bucket recommendation heuristic.
//!
//! [`compute_all`] returns every layout that applies to the given graph;
//! inapplicable or failed layouts (hierarchical on a cyclic graph, MDS on a
//! disconnected one) are omitted from the result set rather than surfaced
//! as errors.

pub mod force;
pub mod hierarchy;
pub mod mds;
pub mod simple;
pub mod stress;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LayoutError, LayoutResult};
use crate::graph::Graph;

/// Node count below which only the trivial layouts are attempted.
const TRIVIAL_LIMIT: usize = 3;
/// Node count above which MDS is not attempted.
const MDS_LIMIT: usize = 1000;

/// 2D coordinates, one (x, y) pair per node in stable node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Layout {
    pub(crate) fn from_points(points: Vec<(f64, f64)>) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self { x, y }
    }

    /// Number of positioned nodes.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the layout has no nodes.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The (x, y) position of node `i`.
    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.x[i], self.y[i])
    }
}

/// Quality metrics for one computed layout; higher `quality_score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutQuality {
    /// Variance of Euclidean edge lengths (lower is better).
    pub edge_length_variance: f64,
    /// Smallest pairwise node distance (higher is better, avoids overlap).
    pub min_node_distance: f64,
    /// Bounding-box width over height (closer to 1 is better).
    pub aspect_ratio: f64,
    /// Combined score: uniform edge lengths, node separation, and a square
    /// bounding box each contribute, weighted 0.4 / 0.3 / 0.3.
    pub quality_score: f64,
}

/// Heuristic layout recommendation, a pure function of graph size and
/// DAG-ness (it does not search over computed quality scores).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecommendation {
    pub recommended: String,
    pub size_bucket: String,
    pub is_dag: bool,
    pub reason: String,
}

/// All computed layouts plus their metrics and the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub layouts: BTreeMap<String, Layout>,
    pub layout_metrics: BTreeMap<String, LayoutQuality>,
    pub recommendations: LayoutRecommendation,
}

/// Compute every applicable layout for the graph.
///
/// Fails only on an empty graph; individual algorithms that do not apply
/// are omitted from the result set.
pub fn compute_all(graph: &Graph, seed: u64) -> LayoutResult<LayoutReport> {
    let n = graph.node_count();
    if n == 0 {
        return Err(LayoutError::EmptyGraph);
    }
    debug!(nodes = n, "computing layouts");

    let mut layouts: BTreeMap<String, Layout> = BTreeMap::new();
    layouts.insert("circular".into(), simple::circular(n));
    layouts.insert("grid".into(), simple::grid(n));

    if n >= TRIVIAL_LIMIT {
        layouts.insert("force_directed".into(), force::layout(graph, seed));
        layouts.insert("stress_majorization".into(), stress::layout(graph));
        if let Ok(layered) = hierarchy::layout(graph) {
            layouts.insert("hierarchical".into(), layered);
        }
        if n < MDS_LIMIT {
            if let Some(embedded) = mds::layout(graph, seed) {
                layouts.insert("mds".into(), embedded);
            }
        }
    }

    let layout_metrics = layouts
        .iter()
        .map(|(name, layout)| (name.clone(), quality(graph, layout)))
        .collect();

    Ok(LayoutReport {
        recommendations: recommend(graph),
        layouts,
        layout_metrics,
    })
}

// ---------------------------------------------------------------------------
// Quality scoring
// ---------------------------------------------------------------------------

/// Score one layout against the graph it was computed for.
pub fn quality(graph: &Graph, layout: &Layout) -> LayoutQuality {
    let n = layout.len();

    let lengths: Vec<f64> = graph
        .edges()
        .filter(|&(u, v, _)| u != v)
        .map(|(u, v, _)| {
            let (ux, uy) = layout.point(u);
            let (vx, vy) = layout.point(v);
            ((ux - vx).powi(2) + (uy - vy).powi(2)).sqrt()
        })
        .collect();
    let edge_length_variance = if lengths.is_empty() {
        0.0
    } else {
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64
    };

    let mut min_node_distance = f64::INFINITY;
    for i in 0..n {
        for j in (i + 1)..n {
            let (ix, iy) = layout.point(i);
            let (jx, jy) = layout.point(j);
            let d = ((ix - jx).powi(2) + (iy - jy).powi(2)).sqrt();
            min_node_distance = min_node_distance.min(d);
        }
    }
    if !min_node_distance.is_finite() {
        min_node_distance = 0.0;
    }

    let aspect_ratio = {
        let width = spread(&layout.x);
        let height = spread(&layout.y);
        width.max(1e-9) / height.max(1e-9)
    };

    let uniformity = 1.0 / (1.0 + edge_length_variance);
    let separation = min_node_distance.min(1.0);
    let squareness = (aspect_ratio.min(1.0 / aspect_ratio)).clamp(0.0, 1.0);
    LayoutQuality {
        edge_length_variance,
        min_node_distance,
        aspect_ratio,
        quality_score: 0.4 * uniformity + 0.3 * separation + 0.3 * squareness,
    }
}

fn spread(values: &[f64]) -> f64 {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Recommend a layout name from the size bucket and DAG-ness alone.
pub fn recommend(graph: &Graph) -> LayoutRecommendation {
    let n = graph.node_count();
    let is_dag = graph.is_dag();
    let (size_bucket, recommended, reason) = if n < TRIVIAL_LIMIT {
        ("tiny", "circular", "too few nodes for simulation-based layouts")
    } else if is_dag && n <= 500 {
        (
            bucket_name(n),
            "hierarchical",
            "acyclic graphs read best with layered drawing",
        )
    } else if n <= 100 {
        ("small", "force_directed", "small graphs converge quickly under force simulation")
    } else if n <= 1000 {
        (
            "medium",
            "stress_majorization",
            "stress majorization preserves distances at medium scale",
        )
    } else {
        ("large", "grid", "deterministic placement keeps large graphs tractable")
    };

    LayoutRecommendation {
        recommended: recommended.into(),
        size_bucket: size_bucket.into(),
        is_dag,
        reason: reason.into(),
    }
}

fn bucket_name(n: usize) -> &'static str {
    if n <= 100 {
        "small"
    } else if n <= 1000 {
        "medium"
    } else {
        "large"
    }
}
