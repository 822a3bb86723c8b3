//! Temporal edge-event replay.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::Reader;

use crate::config::TemporalSummary;
use crate::error::{GraphError, GraphResult};
use crate::graph::layout::layout;
use crate::graph::social_graph::{EdgeData, SocialGraph};
use crate::render;

/// What an event does to its edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeAction {
    Add,
    Remove,
    Unknown(String),
}

impl EdgeAction {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "add" => Self::Add,
            "remove" => Self::Remove,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Lowercase action name, as read from the log.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Unknown(raw) => raw,
        }
    }
}

/// A timestamped edge event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEvent {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub target: String,
    pub action: EdgeAction,
}

const COLUMNS: [&str; 4] = ["timestamp", "source", "target", "action"];

/// Read a `timestamp,source,target,action` CSV and return events sorted by
/// `(timestamp, source, target, action)`.
pub fn parse_events(path: impl AsRef<Path>) -> GraphResult<Vec<EdgeEvent>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GraphError::NotFound(path.to_path_buf()));
    }
    let mut reader = Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut positions = [0usize; 4];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| GraphError::MissingColumn(name.to_string()))?;
    }
    let [ts_col, src_col, tgt_col, action_col] = positions;

    let mut events = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let raw_ts = field(ts_col);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| GraphError::Timestamp {
            value: raw_ts.to_string(),
            row,
        })?;
        events.push(EdgeEvent {
            timestamp,
            source: field(src_col).to_string(),
            target: field(tgt_col).to_string(),
            action: EdgeAction::parse(field(action_col)),
        });
    }

    sort_events(&mut events);
    log::debug!("Parsed {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Order events by `(timestamp, source, target, action name)`.
pub fn sort_events(events: &mut [EdgeEvent]) {
    events.sort_by(|a, b| {
        (a.timestamp, &a.source, &a.target, a.action.as_str())
            .cmp(&(b.timestamp, &b.source, &b.target, b.action.as_str()))
    });
}

/// Parse an ISO 8601 timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Apply events in order, returning one snapshot per event.
///
/// `add` creates missing endpoints, removing an absent edge is a no-op and
/// unknown actions leave the graph unchanged.
pub fn replay(graph: &mut SocialGraph, events: &[EdgeEvent]) -> Vec<SocialGraph> {
    let mut snapshots = Vec::with_capacity(events.len());
    for event in events {
        match &event.action {
            EdgeAction::Add => {
                graph.add_edge(&event.source, &event.target, EdgeData::default());
            }
            EdgeAction::Remove => {
                graph.remove_edge(&event.source, &event.target);
            }
            EdgeAction::Unknown(action) => {
                log::warn!(
                    "Ignoring unknown action '{}' for {} -- {}",
                    action,
                    event.source,
                    event.target
                );
            }
        }
        snapshots.push(graph.clone());
    }
    snapshots
}

/// Parse, replay and optionally animate an event log against the graph.
///
/// The layout is fixed before replay so every frame shares node positions.
pub fn temporal(
    graph: &mut SocialGraph,
    events_path: impl AsRef<Path>,
    animation: Option<&Path>,
) -> GraphResult<TemporalSummary> {
    let events = parse_events(events_path)?;
    let positions = layout(graph);
    let snapshots = replay(graph, &events);

    if let Some(path) = animation {
        render::animate_snapshots(&snapshots, &positions, path)?;
    }

    Ok(TemporalSummary {
        events: events.len(),
        snapshots: snapshots.len(),
        final_nodes: graph.node_count(),
        final_edges: graph.edge_count(),
        animation: animation.map(|p| p.display().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ts: &str, s: &str, t: &str, action: &str) -> EdgeEvent {
        EdgeEvent {
            timestamp: parse_timestamp(ts).unwrap(),
            source: s.to_string(),
            target: t.to_string(),
            action: EdgeAction::parse(action),
        }
    }

    #[test]
    fn timestamp_forms() {
        let a = parse_timestamp("2024-01-02T03:04:05").unwrap();
        let b = parse_timestamp("2024-01-02 03:04:05").unwrap();
        let c = parse_timestamp("2024-01-02T03:04:05+00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("2024-01-02T03:04:05.250").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn offsets_are_normalised() {
        let local = parse_timestamp("2024-01-02T05:00:00+02:00").unwrap();
        let utc = parse_timestamp("2024-01-02T03:00:00").unwrap();
        assert_eq!(local, utc);
    }

    #[test]
    fn actions_are_case_insensitive() {
        assert_eq!(EdgeAction::parse("ADD"), EdgeAction::Add);
        assert_eq!(EdgeAction::parse(" Remove "), EdgeAction::Remove);
        assert_eq!(EdgeAction::parse("flip"), EdgeAction::Unknown("flip".into()));
    }

    #[test]
    fn ties_sort_by_action_name() {
        let mut events = vec![
            event("2024-01-01", "a", "b", "remove"),
            event("2024-01-01", "a", "b", "flip"),
            event("2024-01-01", "a", "b", "add"),
        ];
        sort_events(&mut events);
        let names: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(names, vec!["add", "flip", "remove"]);
    }

    #[test]
    fn replay_snapshots_each_event() {
        let mut g = SocialGraph::from_edges([("a", "b")]);
        let events = vec![
            event("2024-01-01", "b", "c", "add"),
            event("2024-01-02", "a", "b", "remove"),
            event("2024-01-03", "x", "y", "remove"),
            event("2024-01-04", "a", "c", "teleport"),
        ];
        let snaps = replay(&mut g, &events);
        assert_eq!(snaps.len(), 4);
        assert_eq!(snaps[0].edge_count(), 2);
        assert_eq!(snaps[1].edge_count(), 1);
        assert_eq!(snaps[2].edge_count(), 1);
        assert_eq!(snaps[3].edge_count(), 1);
        assert!(!g.has_node("x"), "removing an absent edge adds nothing");
        assert!(g.has_edge("b", "c"));
    }
}
