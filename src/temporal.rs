//! Temporal analysis: growth curves, discovery milestones, and
//! learning-phase segmentation over timestamped creation events.
//!
//! Everything here operates on daily resolution. Growth series are built on
//! a contiguous date axis spanning the full event range, so cumulative
//! sequences are non-decreasing by construction.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TemporalError, TemporalResult};
use crate::model::TemporalEvent;

/// Minimum event count for phase segmentation.
const PHASE_MIN_EVENTS: usize = 10;

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// Growth-over-time result. All vectors share the length of `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    /// Daily date axis spanning [min event date, max event date].
    pub dates: Vec<NaiveDate>,
    /// Cumulative node count per day.
    pub cumulative: Vec<u64>,
    /// Cumulative edge count per day.
    pub edges_cumulative: Vec<u64>,
    /// Nodes created per day (first difference of `cumulative`).
    pub daily: Vec<u64>,
    /// Growth velocity; identical to `daily` at daily resolution.
    pub velocity: Vec<u64>,
    /// Change in velocity per day (second difference; first entry is 0).
    pub acceleration: Vec<i64>,
    /// Edges per node over time: `edges_cumulative / max(cumulative, 1)`.
    pub knowledge_density_over_time: Vec<f64>,
}

/// Build the growth series from node- and edge-creation events.
///
/// With no events at all, every vector is empty (not an error).
pub fn growth(node_events: &[TemporalEvent], edge_events: &[TemporalEvent]) -> GrowthReport {
    let all_dates = node_events
        .iter()
        .chain(edge_events)
        .map(|event| event.created_at);
    let Some(first) = all_dates.clone().min() else {
        return GrowthReport {
            dates: vec![],
            cumulative: vec![],
            edges_cumulative: vec![],
            daily: vec![],
            velocity: vec![],
            acceleration: vec![],
            knowledge_density_over_time: vec![],
        };
    };
    let last = all_dates.max().expect("non-empty after min");

    let mut nodes_per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for event in node_events {
        *nodes_per_day.entry(event.created_at).or_insert(0) += 1;
    }
    let mut edges_per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for event in edge_events {
        *edges_per_day.entry(event.created_at).or_insert(0) += 1;
    }

    let span = (last - first).num_days() as usize + 1;
    let mut dates = Vec::with_capacity(span);
    let mut cumulative = Vec::with_capacity(span);
    let mut edges_cumulative = Vec::with_capacity(span);
    let mut daily = Vec::with_capacity(span);
    let mut node_total = 0u64;
    let mut edge_total = 0u64;
    let mut day = first;
    while day <= last {
        let created = nodes_per_day.get(&day).copied().unwrap_or(0);
        node_total += created;
        edge_total += edges_per_day.get(&day).copied().unwrap_or(0);
        dates.push(day);
        daily.push(created);
        cumulative.push(node_total);
        edges_cumulative.push(edge_total);
        day += Duration::days(1);
    }

    let velocity = daily.clone();
    let mut acceleration = vec![0i64; velocity.len()];
    for i in 1..velocity.len() {
        acceleration[i] = velocity[i] as i64 - velocity[i - 1] as i64;
    }
    let knowledge_density_over_time = cumulative
        .iter()
        .zip(&edges_cumulative)
        .map(|(&nodes, &edges)| edges as f64 / (nodes.max(1)) as f64)
        .collect();

    debug!(days = dates.len(), nodes = node_total, edges = edge_total, "growth series built");

    GrowthReport {
        dates,
        cumulative,
        edges_cumulative,
        daily,
        velocity,
        acceleration,
        knowledge_density_over_time,
    }
}

// ---------------------------------------------------------------------------
// Discovery milestones
// ---------------------------------------------------------------------------

/// Earliest discovery per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryMilestone {
    pub category: String,
    pub date: NaiveDate,
    pub entity_id: String,
    /// Representative title; the entity id when no title was recorded.
    pub title: String,
}

/// Per-category earliest event, sorted by date then category.
pub fn discovery_milestones(events: &[TemporalEvent]) -> Vec<DiscoveryMilestone> {
    let mut earliest: BTreeMap<&str, &TemporalEvent> = BTreeMap::new();
    for event in events {
        match earliest.get(event.category.as_str()) {
            Some(existing) if existing.created_at <= event.created_at => {}
            _ => {
                earliest.insert(&event.category, event);
            }
        }
    }
    let mut milestones: Vec<DiscoveryMilestone> = earliest
        .into_values()
        .map(|event| DiscoveryMilestone {
            category: event.category.clone(),
            date: event.created_at,
            entity_id: event.entity_id.clone(),
            title: event
                .title
                .clone()
                .unwrap_or_else(|| event.entity_id.clone()),
        })
        .collect();
    milestones.sort_by(|a, b| a.date.cmp(&b.date).then(a.category.cmp(&b.category)));
    milestones
}

// ---------------------------------------------------------------------------
// Learning phases
// ---------------------------------------------------------------------------

/// Activity level of a learning phase, relative to the median week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    High,
    Low,
}

/// One contiguous run of weeks on the same side of the median.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub activity_level: ActivityLevel,
    pub avg_per_week: f64,
}

/// Phase segmentation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase_count: usize,
    pub phases: Vec<Phase>,
}

/// Segment events into high/low-activity phases.
///
/// Events are bucketed into weeks from the earliest event; the median weekly
/// count is the threshold, with a boundary wherever consecutive weeks land
/// on different sides of it. Weeks exactly at the median count as low.
/// Fails with [`TemporalError::InsufficientEvents`] below 10 events.
pub fn learning_phases(events: &[TemporalEvent]) -> TemporalResult<PhaseReport> {
    if events.len() < PHASE_MIN_EVENTS {
        return Err(TemporalError::InsufficientEvents {
            count: events.len(),
            required: PHASE_MIN_EVENTS,
        });
    }

    let first = events
        .iter()
        .map(|event| event.created_at)
        .min()
        .expect("events checked non-empty");
    let last = events
        .iter()
        .map(|event| event.created_at)
        .max()
        .expect("events checked non-empty");
    let week_count = ((last - first).num_days() / 7) as usize + 1;

    let mut weekly = vec![0u64; week_count];
    for event in events {
        let week = ((event.created_at - first).num_days() / 7) as usize;
        weekly[week] += 1;
    }

    let mut sorted = weekly.clone();
    sorted.sort_unstable();
    let median = if week_count % 2 == 1 {
        sorted[week_count / 2] as f64
    } else {
        (sorted[week_count / 2 - 1] + sorted[week_count / 2]) as f64 / 2.0
    };

    let level_of = |count: u64| {
        if (count as f64) > median {
            ActivityLevel::High
        } else {
            ActivityLevel::Low
        }
    };

    let mut phases: Vec<Phase> = Vec::new();
    let mut run_start = 0usize;
    for week in 1..=week_count {
        let boundary = week == week_count || level_of(weekly[week]) != level_of(weekly[run_start]);
        if !boundary {
            continue;
        }
        let weeks_in_run = (week - run_start) as f64;
        let total: u64 = weekly[run_start..week].iter().sum();
        let start_date = first + Duration::weeks(run_start as i64);
        let end_date = (first + Duration::weeks(week as i64) - Duration::days(1)).min(last);
        phases.push(Phase {
            start_date,
            end_date,
            activity_level: level_of(weekly[run_start]),
            avg_per_week: total as f64 / weeks_in_run,
        });
        run_start = week;
    }

    Ok(PhaseReport {
        phase_count: phases.len(),
        phases,
    })
}
