//! Clustering coefficient and neighbourhood overlap integration tests.

mod common;

use common::*;
use sociogram_core::phases::metrics;

fn overlap_of(values: &[(String, String, f64)], a: &str, b: &str) -> f64 {
    values
        .iter()
        .find(|(u, v, _)| (u == a && v == b) || (u == b && v == a))
        .map(|(_, _, o)| *o)
        .unwrap_or_else(|| panic!("no overlap for {a} -- {b}"))
}

#[test]
fn triangle_corners_fully_clustered() {
    let mut g = load_fixture("two_triangles.gml");
    let cc = metrics::clustering(&mut g);
    assert_eq!(cc["A"], 1.0);
    assert_eq!(cc["F"], 1.0);
    assert!((cc["C"] - 1.0 / 3.0).abs() < 1e-12);
    assert!((cc["D"] - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn clustering_is_stored_on_nodes() {
    let mut g = load_fixture("two_triangles.gml");
    metrics::clustering(&mut g);
    for (_, node) in g.nodes() {
        let cc = node.cc.expect("cc should be set");
        assert!((0.0..=1.0).contains(&cc));
    }
}

#[test]
fn ring_has_zero_clustering() {
    let mut g = ring(5);
    let cc = metrics::clustering(&mut g);
    assert!(cc.values().all(|&v| v == 0.0));
}

#[test]
fn bridge_has_zero_overlap() {
    let mut g = load_fixture("two_triangles.gml");
    let values = metrics::overlap(&mut g);
    assert_eq!(values.len(), 7);
    assert_eq!(overlap_of(&values, "C", "D"), 0.0);
    assert_eq!(overlap_of(&values, "A", "B"), 1.0);
    assert!((overlap_of(&values, "A", "C") - 0.5).abs() < 1e-12);
}

#[test]
fn overlap_is_stored_on_edges() {
    let mut g = load_fixture("two_triangles.gml");
    metrics::overlap(&mut g);
    assert_eq!(g.edge("D", "C").and_then(|e| e.overlap), Some(0.0));
    assert!(g.edges().all(|(_, _, _, e)| e.overlap.is_some()));
}
