//! Combined analysis entry point: one snapshot in, one report out.
//!
//! The four graph engines are independent once the graph is built, so they
//! run under nested `rayon::join`. Temporal and knowledge analysis read the
//! snapshot directly and run on the calling thread; they are cheap relative
//! to the graph work.

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::error::{InsightResult, TemporalError};
use crate::graph::centrality::{self, CentralityScores};
use crate::graph::community::{self, CommunityResult};
use crate::graph::metrics::{self, GraphMetrics};
use crate::graph::Graph;
use crate::knowledge::{self, KnowledgeReport};
use crate::layout::{self, LayoutReport};
use crate::model::Snapshot;
use crate::temporal::{self, DiscoveryMilestone, GrowthReport, PhaseReport};

use std::collections::BTreeMap;

/// Everything the analytics core derives from one snapshot.
///
/// Per-node arrays in `metrics`, `centrality`, `communities`, and `layouts`
/// all follow the order of `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Node ids in stable analysis order.
    pub nodes: Vec<String>,
    pub metrics: GraphMetrics,
    pub centrality: CentralityScores,
    pub communities: BTreeMap<String, CommunityResult>,
    /// `None` for an empty graph, where no layout is defined.
    pub layouts: Option<LayoutReport>,
    pub growth: GrowthReport,
    pub milestones: Vec<DiscoveryMilestone>,
    /// `None` when there are too few events to segment phases.
    pub phases: Option<PhaseReport>,
    pub rkd: KnowledgeReport,
}

/// Run the full analysis pipeline over a snapshot.
pub fn analyze(snapshot: &Snapshot) -> InsightResult<AnalysisReport> {
    let span = info_span!("analyze", nodes = snapshot.nodes.len(), edges = snapshot.edges.len());
    let _guard = span.enter();

    let graph = Graph::build(&snapshot.nodes, &snapshot.edges, &snapshot.options)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph built"
    );

    let seed = snapshot.seed;
    let ((graph_metrics, centrality_scores), (communities, layouts)) = rayon::join(
        || {
            rayon::join(
                || metrics::compute(&graph),
                || centrality::compute(&graph, seed),
            )
        },
        || {
            rayon::join(
                || community::compute(&graph, seed),
                || {
                    if graph.node_count() == 0 {
                        Ok(None)
                    } else {
                        layout::compute_all(&graph, seed).map(Some)
                    }
                },
            )
        },
    );
    let layouts = layouts?;

    let growth = temporal::growth(&snapshot.node_events, &snapshot.edge_events);
    let milestones = temporal::discovery_milestones(&snapshot.node_events);
    let phases = match temporal::learning_phases(&snapshot.node_events) {
        Ok(report) => Some(report),
        Err(TemporalError::InsufficientEvents { count, required }) => {
            debug!(count, required, "skipping phase segmentation");
            None
        }
    };
    let rkd = knowledge::score(&snapshot.content, &snapshot.subjects);

    Ok(AnalysisReport {
        nodes: graph.node_ids(),
        metrics: graph_metrics,
        centrality: centrality_scores,
        communities,
        layouts,
        growth,
        milestones,
        phases,
        rkd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeRecord, NodeRecord, TemporalEvent};
    use chrono::NaiveDate;

    fn snapshot(ids: &[&str], edges: &[(&str, &str, f64)]) -> Snapshot {
        Snapshot {
            nodes: ids.iter().map(|id| NodeRecord::new(*id, *id)).collect(),
            edges: edges
                .iter()
                .map(|(from, to, weight)| EdgeRecord::new(*from, *to).with_weight(*weight))
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn triangle_snapshot_produces_a_full_report() {
        let snap = snapshot(
            &["a", "b", "c"],
            &[("a", "b", 0.9), ("b", "c", 0.7), ("c", "a", 0.5)],
        );
        let report = analyze(&snap).unwrap();
        assert_eq!(report.nodes, vec!["a", "b", "c"]);
        assert_eq!(report.metrics.node_count, 3);
        assert_eq!(report.metrics.edge_count, 3);
        assert!((report.metrics.density - 0.5).abs() < 1e-12);
        assert_eq!(report.centrality.pagerank.len(), 3);
        assert!(report.communities.contains_key("louvain"));
        let layouts = report.layouts.unwrap();
        assert!(layouts.layouts.contains_key("circular"));
        assert!(report.phases.is_none(), "3 nodes, no events");
    }

    #[test]
    fn empty_snapshot_is_not_an_error() {
        let report = analyze(&Snapshot::default()).unwrap();
        assert!(report.nodes.is_empty());
        assert_eq!(report.metrics.node_count, 0);
        assert!(report.layouts.is_none());
        assert!(report.growth.dates.is_empty());
        assert_eq!(report.rkd.breadth, 0);
    }

    #[test]
    fn phases_appear_once_enough_events_exist() {
        let mut snap = snapshot(&["a"], &[]);
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        snap.node_events = (0..12)
            .map(|i| TemporalEvent {
                entity_id: format!("n{i}"),
                created_at: day + chrono::Duration::days(i % 3),
                category: "article".into(),
                title: None,
            })
            .collect();
        let report = analyze(&snap).unwrap();
        assert!(report.phases.is_some());
        assert_eq!(report.milestones.len(), 1);
        assert_eq!(*report.growth.cumulative.last().unwrap(), 12);
    }

    #[test]
    fn report_round_trips_through_json() {
        let snap = snapshot(&["a", "b"], &[("a", "b", 1.0)]);
        let report = analyze(&snap).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes, report.nodes);
        assert_eq!(back.metrics.node_count, report.metrics.node_count);
        assert_eq!(back.centrality.pagerank.len(), report.centrality.pagerank.len());
        assert_eq!(back.communities.len(), report.communities.len());
    }
}
