//! # tessera-insight
//!
//! Knowledge-graph analytics core: a pure function from a graph/time-series
//! snapshot to derived analytics. No storage, no network, no rendering.
//!
//! ## Engines
//!
//! - **Graph construction** (`graph`): typed graph from node/edge records,
//!   with relevance filtering and bounded neighborhood extraction
//! - **Metrics** (`graph::metrics`): density, diameter, transitivity,
//!   degree statistics, connectivity
//! - **Centrality** (`graph::centrality`): degree, PageRank, betweenness,
//!   closeness, eigenvector, with exact vs. sampled selection by graph size
//! - **Communities** (`graph::community`): five partitioning algorithms plus
//!   modularity scoring
//! - **Layouts** (`layout`): six 2D layout algorithms, quality scoring, and
//!   a size/shape-based recommendation
//! - **Temporal** (`temporal`): growth curves, velocity/acceleration,
//!   discovery milestones, learning-phase segmentation
//! - **Knowledge depth** (`knowledge`): content weighting and Relative
//!   Knowledge Depth (RKD) personal metrics
//!
//! ## Library usage
//!
//! ```no_run
//! use tessera_insight::model::{EdgeRecord, NodeRecord, Snapshot};
//! use tessera_insight::report;
//!
//! let snapshot = Snapshot {
//!     nodes: vec![NodeRecord::new("a", "A"), NodeRecord::new("b", "B")],
//!     edges: vec![EdgeRecord::new("a", "b")],
//!     ..Snapshot::default()
//! };
//! let analysis = report::analyze(&snapshot).unwrap();
//! println!("density = {}", analysis.metrics.density);
//! ```

pub mod error;
pub mod graph;
pub mod knowledge;
pub mod layout;
pub mod model;
pub mod report;
pub mod temporal;
