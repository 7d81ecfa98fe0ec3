//! Input data model: the snapshot records supplied by storage.
//!
//! All analytics entry points consume plain records deserialized from a
//! [`Snapshot`]. Defaulting and clamping happen exactly once, at the
//! graph-builder / analyzer boundary; downstream code never re-validates.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::graph::GraphOptions;

// ---------------------------------------------------------------------------
// Graph records
// ---------------------------------------------------------------------------

/// Kind of a knowledge-graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Article,
    Category,
    Disambiguation,
    Redirect,
    /// Any kind this crate does not interpret specially.
    #[serde(other)]
    Unknown,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Article
    }
}

/// A raw node record from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique identifier.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Node kind.
    #[serde(default, rename = "node_type")]
    pub kind: NodeKind,
    /// Importance in [0, 1]; out-of-range values are clamped at build time.
    #[serde(default = "default_importance")]
    pub importance: f64,
}

fn default_importance() -> f64 {
    0.5
}

impl NodeRecord {
    /// Create a record with default kind and importance.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: NodeKind::default(),
            importance: default_importance(),
        }
    }

    /// Set the importance (clamped later, at graph build).
    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    /// Set the node kind.
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A raw edge record from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Non-negative relevance weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Free-form link classification (e.g. "wikilink", "related").
    #[serde(default)]
    pub link_type: String,
    /// Creation date, when storage tracked it.
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

fn default_weight() -> f64 {
    1.0
}

impl EdgeRecord {
    /// Create an edge with default weight and link type.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: default_weight(),
            link_type: String::new(),
            created_at: None,
        }
    }

    /// Set the relevance weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

// ---------------------------------------------------------------------------
// Temporal records
// ---------------------------------------------------------------------------

/// One timestamped creation event (an article discovered, a link added).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEvent {
    /// Id of the entity this event belongs to.
    pub entity_id: String,
    /// Creation date (daily resolution).
    pub created_at: NaiveDate,
    /// Category the entity belongs to, for milestone grouping.
    #[serde(default)]
    pub category: String,
    /// Display title, when known; falls back to `entity_id` in milestones.
    #[serde(default)]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Learning content records
// ---------------------------------------------------------------------------

/// Content type, mapped to a fixed knowledge-weight factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Book,
    Course,
    Article,
    Video,
    Youtube,
    Text,
    Poetry,
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Fixed weight factor per content type.
    ///
    /// A book counts for twice an article; short-form media count for less.
    pub fn weight_factor(self) -> f64 {
        match self {
            ContentType::Book => 2.0,
            ContentType::Course => 1.8,
            ContentType::Article => 1.0,
            ContentType::Video => 0.8,
            ContentType::Youtube => 0.6,
            ContentType::Text => 0.4,
            ContentType::Poetry => 0.3,
            ContentType::Other => 1.0,
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Article
    }
}

/// A learning content item with progress tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier.
    pub id: String,
    /// Subjects this item is tagged with.
    #[serde(default)]
    pub subject_ids: BTreeSet<String>,
    /// Completion percentage in [0, 100]; clamped at scoring time.
    #[serde(default)]
    pub completion_percentage: f64,
    /// Difficulty level in [1, 5]; clamped at scoring time.
    #[serde(default = "default_difficulty")]
    pub difficulty_level: u8,
    /// Content type.
    #[serde(default)]
    pub content_type: ContentType,
    /// Length of the item's text in characters; 0 means "empty" and is
    /// treated as length 100 when weighting.
    #[serde(default)]
    pub text_length: usize,
}

fn default_difficulty() -> u8 {
    3
}

/// A subject (topic) that content items can be tagged with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A complete analysis input: one storage snapshot plus options.
///
/// This is the JSON document the CLI reads and the shape the API layer is
/// expected to assemble from storage. Everything is optional except nodes
/// and edges; missing sections simply produce empty result sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Graph nodes.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Graph edges.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    /// Node-creation events for temporal analysis.
    #[serde(default)]
    pub node_events: Vec<TemporalEvent>,
    /// Edge-creation events for temporal analysis.
    #[serde(default)]
    pub edge_events: Vec<TemporalEvent>,
    /// Learning content items for knowledge-depth scoring.
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Known subjects (used for naming; scoring keys off `subject_ids`).
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Graph construction options.
    #[serde(default)]
    pub options: GraphOptions,
    /// Seed for the randomized algorithms (sampling, shuffles, initial
    /// layout placement) so results are reproducible.
    #[serde(default)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_deserializes_unknown_values() {
        let kind: NodeKind = serde_json::from_str("\"portal\"").unwrap();
        assert_eq!(kind, NodeKind::Unknown);
        let kind: NodeKind = serde_json::from_str("\"category\"").unwrap();
        assert_eq!(kind, NodeKind::Category);
    }

    #[test]
    fn node_record_defaults() {
        let node: NodeRecord = serde_json::from_str(r#"{"id": "n1"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Article);
        assert!((node.importance - 0.5).abs() < f64::EPSILON);
        assert!(node.title.is_empty());
    }

    #[test]
    fn edge_record_defaults() {
        let edge: EdgeRecord = serde_json::from_str(r#"{"from": "a", "to": "b"}"#).unwrap();
        assert!((edge.weight - 1.0).abs() < f64::EPSILON);
        assert!(edge.created_at.is_none());
    }

    #[test]
    fn content_type_factors_are_ordered() {
        assert!(ContentType::Book.weight_factor() > ContentType::Course.weight_factor());
        assert!(ContentType::Article.weight_factor() > ContentType::Video.weight_factor());
        assert!(ContentType::Poetry.weight_factor() < ContentType::Text.weight_factor());
    }

    #[test]
    fn snapshot_round_trips() {
        let snapshot = Snapshot {
            nodes: vec![NodeRecord::new("a", "A"), NodeRecord::new("b", "B")],
            edges: vec![EdgeRecord::new("a", "b").with_weight(0.8)],
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes, snapshot.nodes);
        assert_eq!(back.edges, snapshot.edges);
    }
}
