//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sociogram_core::config::AnalysisConfig;
use sociogram_core::graph::gml::load_graph;
use sociogram_core::graph::social_graph::SocialGraph;

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

/// Load a GML fixture, panicking on parse failure.
pub fn load_fixture(name: &str) -> SocialGraph {
    load_graph(fixture_path(name))
        .unwrap_or_else(|e| panic!("fixture {name} should load: {e}"))
}

/// Config pointed at a GML fixture with every optional step disabled.
pub fn config_for(name: &str) -> AnalysisConfig {
    AnalysisConfig {
        graph_path: fixture_path(name).to_string_lossy().to_string(),
        seed: Some(7),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Graph builders
// ---------------------------------------------------------------------------

/// Sorted edge list as key pairs, each pair ordered.
pub fn edge_keys(graph: &SocialGraph) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = graph
        .edges()
        .map(|(_, a, b, _)| {
            let (a, b) = (graph.key(a).to_string(), graph.key(b).to_string());
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    edges.sort();
    edges
}

/// Ring of `n` nodes named `n0..n{n-1}`.
pub fn ring(n: usize) -> SocialGraph {
    let names: Vec<String> = (0..n).map(|i| format!("n{i}")).collect();
    let pairs: Vec<(&str, &str)> = (0..n)
        .map(|i| (names[i].as_str(), names[(i + 1) % n].as_str()))
        .collect();
    SocialGraph::from_edges(pairs)
}
