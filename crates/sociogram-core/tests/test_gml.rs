//! GML loading and export integration tests.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use sociogram_core::error::GraphError;
use sociogram_core::graph::gml::{load_graph, parse_gml, write_gml};
use sociogram_core::phases::{communities, metrics};

#[test]
fn loads_nodes_edges_and_colors() {
    let g = load_fixture("two_triangles.gml");
    assert_eq!(g.node_count(), 6);
    assert_eq!(g.edge_count(), 7);
    assert_eq!(g.node("A").and_then(|n| n.color.as_deref()), Some("red"));
    assert_eq!(g.node("F").and_then(|n| n.color.as_deref()), Some("blue"));
}

#[test]
fn node_order_follows_file() {
    let g = load_fixture("two_triangles.gml");
    let keys: Vec<&str> = g.node_indices().map(|idx| g.key(idx)).collect();
    assert_eq!(keys, vec!["A", "B", "C", "D", "E", "F"]);
}

#[test]
fn directed_input_is_coerced() {
    let g = load_fixture("directed.gml");
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2, "reciprocal edges should merge");
    assert!(g.has_edge("20", "10"));
    assert!(g.has_edge("30", "20"));
}

#[test]
fn empty_graph_loads() {
    let g = load_fixture("empty.gml");
    assert!(g.is_empty());
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn missing_file_is_not_found() {
    let err = load_graph(fixture_path("does_not_exist.gml")).unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
    assert!(err.to_string().contains("does_not_exist.gml"));
}

#[test]
fn unknown_endpoint_is_rejected() {
    let err = parse_gml("graph [ node [ id 1 ] edge [ source 1 target 9 ] ]").unwrap_err();
    assert!(matches!(err, GraphError::UnknownEndpoint(ref id) if id == "9"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let src = r#"graph [
        node [ id 1 label "a" ]
        node [ id 1 label "b" ]
        node [ id 2 label "c" ]
        edge [ source 1 target 2 ]
    ]"#;
    let err = parse_gml(src).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateId(ref id) if id == "1"));
}

#[test]
fn duplicate_labels_are_rejected() {
    let err = parse_gml(r#"graph [ node [ id 1 label "x" ] node [ id 2 label "x" ] ]"#).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNode(ref key) if key == "x"));
}

#[test]
fn export_roundtrip_preserves_annotations() {
    let mut g = load_fixture("signed_balanced.gml");
    metrics::clustering(&mut g);
    metrics::overlap(&mut g);
    let parts = communities::partition(&g, 2);
    communities::annotate(&mut g, &parts);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out.gml");
    write_gml(&g, &path).unwrap();
    let back = load_graph(&path).unwrap();

    assert_eq!(edge_keys(&back), edge_keys(&g));
    for (_, node) in g.nodes() {
        let other = back.node(&node.key).unwrap();
        assert_eq!(other.cc, node.cc, "cc for {}", node.key);
        assert_eq!(other.community, node.community, "community for {}", node.key);
    }
    for (_, a, b, data) in g.edges() {
        let other = back.edge(g.key(a), g.key(b)).unwrap();
        assert_eq!(other.sign, data.sign);
        assert_eq!(other.overlap, data.overlap);
    }
}

#[test]
fn export_roundtrip_preserves_colors() {
    let g = load_fixture("two_triangles.gml");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colors.gml");
    write_gml(&g, &path).unwrap();
    let back = load_graph(&path).unwrap();
    for (_, node) in g.nodes() {
        assert_eq!(back.node(&node.key).unwrap().color, node.color);
    }
}
