//! Rich diagnostic error types for the tessera-insight analytics core.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Only structurally invalid input surfaces
//! as a hard error; recoverable degradations (a layout that does not apply, a
//! centrality that does not converge) are encoded as `Option` fields or omitted
//! map entries in the result structs, never raised.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the analytics core.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum InsightError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Snapshot(#[from] SnapshotError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("edge ({from} -> {to}) references unknown node \"{missing}\"")]
    #[diagnostic(
        code(tessera::graph::invalid_edge),
        help(
            "Every edge endpoint must match a node id in the snapshot. \
             Either fix the snapshot, or set `create_placeholder` in the \
             graph options to synthesize a stub node for dangling references."
        )
    )]
    InvalidEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("center node not found: \"{id}\"")]
    #[diagnostic(
        code(tessera::graph::center_not_found),
        help(
            "The `center_id` used for neighborhood extraction does not exist \
             in the filtered graph. Check the id, or lower `min_relevance` if \
             the node was dropped by the relevance filter."
        )
    )]
    CenterNotFound { id: String },
}

// ---------------------------------------------------------------------------
// Layout errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    #[error("hierarchical layout requires an acyclic graph")]
    #[diagnostic(
        code(tessera::layout::cyclic),
        help(
            "Sugiyama-style layering is only defined for DAGs. Use the \
             force-directed or stress-majorization layout for cyclic graphs."
        )
    )]
    CyclicGraph,

    #[error("cannot lay out an empty graph")]
    #[diagnostic(
        code(tessera::layout::empty),
        help("Layouts need at least one node. Check the relevance filter and neighborhood bounds.")
    )]
    EmptyGraph,
}

// ---------------------------------------------------------------------------
// Temporal errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TemporalError {
    #[error("not enough events for phase detection: {count} < {required}")]
    #[diagnostic(
        code(tessera::temporal::insufficient_events),
        help(
            "Learning-phase segmentation needs a minimum number of timestamped \
             events to produce meaningful weekly buckets. Widen the date range \
             or wait for more activity."
        )
    )]
    InsufficientEvents { count: usize, required: usize },
}

// ---------------------------------------------------------------------------
// Snapshot errors (CLI / deserialization boundary)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("I/O error reading snapshot: {source}")]
    #[diagnostic(
        code(tessera::snapshot::io),
        help("Check that the snapshot file exists and is readable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {message}")]
    #[diagnostic(
        code(tessera::snapshot::parse),
        help(
            "The snapshot JSON did not match the expected shape. \
             It must contain `nodes` and `edges` arrays; see the Snapshot \
             struct for the full schema."
        )
    )]
    Parse { message: String },
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Parse {
            message: err.to_string(),
        }
    }
}

/// Convenience alias for functions returning analytics results.
pub type InsightResult<T> = std::result::Result<T, InsightError>;

/// Result type for graph construction.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Result type for layout operations.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Result type for temporal operations.
pub type TemporalResult<T> = std::result::Result<T, TemporalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_converts_to_insight_error() {
        let err = GraphError::InvalidEdge {
            from: "a".into(),
            to: "b".into(),
            missing: "b".into(),
        };
        let top: InsightError = err.into();
        assert!(matches!(
            top,
            InsightError::Graph(GraphError::InvalidEdge { .. })
        ));
    }

    #[test]
    fn layout_error_converts_to_insight_error() {
        let top: InsightError = LayoutError::CyclicGraph.into();
        assert!(matches!(top, InsightError::Layout(LayoutError::CyclicGraph)));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = TemporalError::InsufficientEvents {
            count: 4,
            required: 10,
        };
        let msg = format!("{err}");
        assert!(msg.contains('4'));
        assert!(msg.contains("10"));
    }
}
