//! Relative Knowledge Depth (RKD) scoring over content and subjects.
//!
//! Each content item carries a weight derived from its length, difficulty,
//! and medium; a subject's RKD is the weighted completion fraction of its
//! content, in [0, 1]. Personal aggregates (breadth, depth, coherence) roll
//! those per-subject scores up into a profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ContentItem, Subject};

/// Reference length for the logarithmic text-length factor.
const LENGTH_SCALE: f64 = 1000.0;
/// Weight assigned when a content item records no text at all.
const EMPTY_TEXT_LENGTH: usize = 100;

/// Personal knowledge profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeReport {
    /// Number of subjects with at least one content item.
    pub breadth: usize,
    /// Mean RKD across subjects with content.
    pub depth: f64,
    /// Identical to `depth` in the current model.
    pub velocity: f64,
    /// 1 − coefficient of variation of per-subject RKD, floored at 0.
    pub coherence: f64,
    /// RKD per subject id, including zero entries for content-free subjects.
    pub subject_depths: BTreeMap<String, f64>,
}

/// Weight of one content item: length, difficulty, and medium combined.
///
/// Difficulty is clamped to 1..=5 before use; a missing or empty text is
/// treated as 100 characters so trivial items still carry some weight.
pub fn content_weight(item: &ContentItem) -> f64 {
    let length = if item.text_length == 0 {
        EMPTY_TEXT_LENGTH
    } else {
        item.text_length
    };
    let length_factor = ((length as f64) + 1.0).ln() / LENGTH_SCALE.ln();
    let difficulty = item.difficulty_level.clamp(1, 5) as f64 / 3.0;
    length_factor * difficulty * item.content_type.weight_factor()
}

/// Score every subject and aggregate the personal profile.
pub fn score(content: &[ContentItem], subjects: &[Subject]) -> KnowledgeReport {
    // Per-subject weight and weighted-completion accumulators. Seed with the
    // declared subject catalogue so content-free subjects still appear.
    let mut totals: BTreeMap<&str, (f64, f64, usize)> = subjects
        .iter()
        .map(|subject| (subject.id.as_str(), (0.0, 0.0, 0)))
        .collect();

    for item in content {
        let weight = content_weight(item);
        let completion = item.completion_percentage.clamp(0.0, 100.0) / 100.0;
        for subject_id in &item.subject_ids {
            let entry = totals.entry(subject_id.as_str()).or_insert((0.0, 0.0, 0));
            entry.0 += weight;
            entry.1 += weight * completion;
            entry.2 += 1;
        }
    }

    let mut subject_depths = BTreeMap::new();
    let mut covered: Vec<f64> = Vec::new();
    for (subject_id, (weight_sum, weighted_completion, item_count)) in &totals {
        let rkd = if *weight_sum > 0.0 {
            weighted_completion / weight_sum
        } else {
            0.0
        };
        subject_depths.insert((*subject_id).to_string(), rkd);
        if *item_count > 0 {
            covered.push(rkd);
        }
    }

    let breadth = covered.len();
    let depth = if covered.is_empty() {
        0.0
    } else {
        covered.iter().sum::<f64>() / covered.len() as f64
    };
    let coherence = match covered.len() {
        0 => 0.0,
        1 => 1.0,
        n => {
            let mean = depth;
            if mean == 0.0 {
                0.0
            } else {
                let variance =
                    covered.iter().map(|rkd| (rkd - mean).powi(2)).sum::<f64>() / n as f64;
                (1.0 - variance.sqrt() / mean).max(0.0)
            }
        }
    };

    debug!(breadth, depth, coherence, "knowledge profile scored");

    KnowledgeReport {
        breadth,
        depth,
        velocity: depth,
        coherence,
        subject_depths,
    }
}
