//! Structural balance integration tests.

mod common;

use common::*;
use sociogram_core::graph::social_graph::{EdgeData, SocialGraph};
use sociogram_core::phases::balance::{balance_labeling, is_balanced};

#[test]
fn balanced_fixture() {
    let g = load_fixture("signed_balanced.gml");
    assert!(is_balanced(&g));
    let labels = balance_labeling(&g).unwrap();
    assert_eq!(labels["ann"], labels["bob"]);
    assert_eq!(labels["cat"], labels["dan"]);
    assert_ne!(labels["ann"], labels["cat"]);
}

#[test]
fn all_negative_triangle_is_unbalanced() {
    let g = load_fixture("signed_unbalanced.gml");
    assert!(!is_balanced(&g));
    let conflict = balance_labeling(&g).unwrap_err();
    assert_eq!(conflict.sign, -1);
}

#[test]
fn unsigned_edges_count_as_positive() {
    let g = load_fixture("two_triangles.gml");
    assert!(is_balanced(&g));
}

#[test]
fn every_component_is_labelled() {
    let mut g = SocialGraph::new();
    g.add_edge("a", "b", EdgeData::signed(-1));
    g.add_edge("c", "d", EdgeData::signed(1));
    let labels = balance_labeling(&g).unwrap();
    assert_eq!(labels.len(), 4);
    assert_ne!(labels["a"], labels["b"]);
    assert_eq!(labels["c"], labels["d"]);
}

#[test]
fn odd_negative_cycle_breaks_balance() {
    let mut g = SocialGraph::new();
    g.add_edge("a", "b", EdgeData::signed(1));
    g.add_edge("b", "c", EdgeData::signed(1));
    g.add_edge("c", "d", EdgeData::signed(-1));
    g.add_edge("d", "a", EdgeData::signed(1));
    assert!(!is_balanced(&g));
    g.add_edge("a", "b", EdgeData::signed(-1));
    assert!(is_balanced(&g), "second negative edge restores balance");
}
