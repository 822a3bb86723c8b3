//! Plot output integration tests.

mod common;

use std::path::Path;

use common::*;
use sociogram_core::config::PlotMode;
use sociogram_core::graph::layout::layout;
use sociogram_core::render::{default_plot_path, plot_graph};

#[test]
fn layout_is_bounded_and_cached() {
    let mut g = load_fixture("two_triangles.gml");
    let first = layout(&mut g);
    assert_eq!(first.len(), 6);
    for (x, y) in first.values() {
        assert!((-1.0..=1.0).contains(x) && (-1.0..=1.0).contains(y));
    }
    let second = layout(&mut g);
    assert_eq!(first, second);
}

#[test]
fn layout_is_deterministic() {
    let mut a = load_fixture("two_triangles.gml");
    let mut b = load_fixture("two_triangles.gml");
    assert_eq!(layout(&mut a), layout(&mut b));
}

#[test]
fn clustering_plot_recomputes_cc() {
    let mut g = load_fixture("two_triangles.gml");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cc.svg");
    plot_graph(&mut g, PlotMode::Clustering, &out).unwrap();

    assert_eq!(g.node("A").unwrap().cc, Some(1.0));
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<circle").count(), 6);
    assert_eq!(svg.matches("<line").count(), 7);
    assert!(svg.contains(">A</text>"));
}

#[test]
fn polarity_plot_uses_node_colors() {
    let mut g = load_fixture("two_triangles.gml");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("p.svg");
    plot_graph(&mut g, PlotMode::Polarity, &out).unwrap();

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("fill=\"red\""));
    assert!(svg.contains("fill=\"blue\""));
    assert!(svg.contains("stroke=\"green\""));
}

#[test]
fn signed_polarity_dot_output() {
    let mut g = load_fixture("signed_unbalanced.gml");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("signs.dot");
    plot_graph(&mut g, PlotMode::Polarity, &out).unwrap();

    let dot = std::fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("graph {"));
    assert_eq!(dot.matches("color=\"red\"").count(), 3);
    assert!(dot.contains("fillcolor=\"gray\""));
}

#[test]
fn overlap_plot_scales_edges() {
    let mut g = load_fixture("two_triangles.gml");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("no.svg");
    plot_graph(&mut g, PlotMode::Overlap, &out).unwrap();

    assert_eq!(g.edge("A", "B").and_then(|e| e.overlap), Some(1.0));
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("stroke=\"gray\""));
}

#[test]
fn default_path_sits_next_to_input() {
    let input = fixture_path("two_triangles.gml");
    let path = default_plot_path(&input, PlotMode::Overlap);
    assert_eq!(path.file_name().unwrap(), "two_triangles_N.svg");
    assert_eq!(path.parent(), input.parent());
    assert_eq!(
        default_plot_path(Path::new("g.gml"), PlotMode::Plain),
        Path::new("g_default.svg")
    );
}
