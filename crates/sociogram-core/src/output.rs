//! JSON report assembly.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;

use crate::config::{AnalysisConfig, AnalysisReport};
use crate::error::{GraphError, GraphResult};
use crate::graph::social_graph::SocialGraph;

/// Mean of the stored clustering coefficients, if any were computed.
fn average_clustering(graph: &SocialGraph) -> Option<f64> {
    let values: Vec<f64> = graph.nodes().filter_map(|(_, n)| n.cc).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Fill in the report's metadata and stats from the final graph state.
pub fn finish_report(
    report: &mut AnalysisReport,
    config: &AnalysisConfig,
    graph: &SocialGraph,
    timings: &HashMap<String, f64>,
    total_ms: f64,
) {
    let metadata = &mut report.metadata;
    metadata.insert(
        "graph_path".to_string(),
        serde_json::Value::String(config.graph_path.clone()),
    );
    metadata.insert(
        "analysed_at".to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339()),
    );
    metadata.insert(
        "sociogram_version".to_string(),
        serde_json::Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    metadata.insert("seed".to_string(), serde_json::json!(config.seed));
    metadata.insert(
        "analysis_duration_ms".to_string(),
        serde_json::json!(((total_ms * 10.0).round() / 10.0)),
    );
    metadata.insert(
        "step_timings".to_string(),
        serde_json::to_value(timings).unwrap_or_default(),
    );

    let stats = &mut report.stats;
    stats.insert("nodes".to_string(), serde_json::json!(graph.node_count()));
    stats.insert("edges".to_string(), serde_json::json!(graph.edge_count()));
    stats.insert(
        "components".to_string(),
        serde_json::json!(graph.component_count()),
    );
    stats.insert(
        "communities".to_string(),
        serde_json::json!(report.communities.len()),
    );
    stats.insert(
        "avg_clustering".to_string(),
        serde_json::json!(average_clustering(graph)),
    );
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &AnalysisReport, path: impl AsRef<Path>) -> GraphResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|e| GraphError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::metrics;

    #[test]
    fn stats_keys_present() {
        let config = AnalysisConfig::default();
        let mut graph = SocialGraph::from_edges([("a", "b"), ("b", "c"), ("c", "a")]);
        metrics::clustering(&mut graph);
        let mut report = AnalysisReport::default();
        finish_report(&mut report, &config, &graph, &HashMap::new(), 12.34);

        for key in ["nodes", "edges", "components", "communities", "avg_clustering"] {
            assert!(report.stats.contains_key(key), "Missing stat key: {key}");
        }
        assert_eq!(report.stats["avg_clustering"], serde_json::json!(1.0));
        assert_eq!(report.metadata["analysis_duration_ms"], serde_json::json!(12.3));
    }

    #[test]
    fn json_roundtrip_preserves_sections() {
        let config = AnalysisConfig::default();
        let graph = SocialGraph::new();
        let mut report = AnalysisReport {
            balanced: Some(true),
            ..Default::default()
        };
        finish_report(&mut report, &config, &graph, &HashMap::new(), 1.0);

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.balanced, Some(true));
        assert!(parsed.metadata.contains_key("analysed_at"));
        assert!(parsed.metadata.contains_key("sociogram_version"));
        assert_eq!(parsed.stats["avg_clustering"], serde_json::Value::Null);
    }
}
