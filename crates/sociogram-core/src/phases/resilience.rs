//! Random edge-failure simulation and robustness trials.

use std::collections::{HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{ComponentStats, FailureReport, RobustnessReport};
use crate::graph::social_graph::SocialGraph;

/// Build the run's RNG: seeded when a seed is given, from entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Component count, sizes and the average shortest path length of the
/// largest component (first one wins on ties).
pub fn component_stats(graph: &SocialGraph) -> ComponentStats {
    let components = graph.connected_components();
    if components.is_empty() {
        return ComponentStats::default();
    }

    let sizes: Vec<usize> = components.iter().map(Vec::len).collect();
    let mut largest = &components[0];
    for component in &components[1..] {
        if component.len() > largest.len() {
            largest = component;
        }
    }

    let has_edges = largest
        .iter()
        .any(|&idx| graph.incident_edges(idx).next().is_some());
    let aspl = has_edges.then(|| average_shortest_path(graph, largest));

    ComponentStats {
        aspl,
        components: components.len(),
        sizes,
    }
}

/// Mean BFS distance over ordered pairs of a connected node set.
fn average_shortest_path(graph: &SocialGraph, nodes: &[NodeIndex]) -> f64 {
    let n = nodes.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0usize;
    for &source in nodes {
        let mut seen: HashSet<NodeIndex> = HashSet::from([source]);
        let mut queue = VecDeque::from([(source, 0usize)]);
        while let Some((u, d)) = queue.pop_front() {
            total += d;
            for v in graph.neighbors(u) {
                if seen.insert(v) {
                    queue.push_back((v, d + 1));
                }
            }
        }
    }
    total as f64 / (n * (n - 1)) as f64
}

/// Remove `min(k, |E|)` random edges from a copy of the graph and compare
/// connectivity before and after. The input graph is not modified.
pub fn simulate_failures<R: Rng + ?Sized>(graph: &SocialGraph, k: usize, rng: &mut R) -> FailureReport {
    let before = component_stats(graph);
    let mut damaged = graph.clone();
    damaged.clear_layout();

    let edges = graph.edge_indices();
    let take = k.min(edges.len());
    let mut removed = Vec::with_capacity(take);
    for &edge in edges.choose_multiple(rng, take) {
        if let Some((a, b)) = graph.edge_endpoints(edge) {
            removed.push((graph.key(a).to_string(), graph.key(b).to_string()));
        }
        damaged.remove_edge_index(edge);
    }

    let after = component_stats(&damaged);
    log::info!(
        "Removed {} edges: components {} -> {}",
        removed.len(),
        before.components,
        after.components
    );
    FailureReport {
        before,
        after,
        removed,
    }
}

/// Repeat the failure trial and aggregate the resulting component counts.
pub fn robustness<R: Rng + ?Sized>(
    graph: &SocialGraph,
    k: usize,
    trials: usize,
    rng: &mut R,
) -> RobustnessReport {
    let edges = graph.edge_indices();
    let take = k.min(edges.len());
    let mut counts = Vec::with_capacity(trials);
    let mut largest = Vec::with_capacity(trials);

    for _ in 0..trials {
        let mut damaged = graph.clone();
        damaged.clear_layout();
        for &edge in edges.choose_multiple(rng, take) {
            damaged.remove_edge_index(edge);
        }
        let components = damaged.connected_components();
        counts.push(components.len());
        largest.push(components.iter().map(Vec::len).max().unwrap_or(0));
    }

    let avg = |values: &[usize]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<usize>() as f64 / values.len() as f64
        }
    };

    RobustnessReport {
        trials,
        edges_removed: take,
        avg_components: avg(&counts),
        min_components: counts.iter().copied().min().unwrap_or(0),
        max_components: counts.iter().copied().max().unwrap_or(0),
        avg_largest_component: avg(&largest),
    }
}
