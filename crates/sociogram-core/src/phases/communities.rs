//! Community detection via Girvan–Newman divisive clustering.
//!
//! The edge with the highest betweenness is removed repeatedly until the
//! graph splits into more connected components. Each split yields a finer
//! partition.

use std::collections::{HashMap, VecDeque};

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::NodeIndexable;

use crate::config::Community;
use crate::graph::social_graph::SocialGraph;

/// An ordered sequence of disjoint node-key sets.
pub type Partition = Vec<Vec<String>>;

const TIE_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Partition the graph into communities.
///
/// `requested` selects the `max(requested − 1, 1)`-th Girvan–Newman level;
/// if the hierarchy runs out first, the finest level reached is returned.
/// A graph without edges returns its connected components (singletons).
pub fn partition(graph: &SocialGraph, requested: usize) -> Partition {
    if graph.is_empty() {
        return Vec::new();
    }

    let mut levels = GirvanNewman::new(graph);
    let Some(mut current) = levels.next() else {
        return components_as_keys(graph);
    };

    let level = requested.saturating_sub(1).max(1);
    for _ in 1..level {
        match levels.next() {
            Some(finer) => current = finer,
            None => break,
        }
    }

    log::debug!(
        "Girvan-Newman produced {} communities for {} requested",
        current.len(),
        requested
    );
    current
}

/// Store `community = index` on every node of the partition.
pub fn annotate(graph: &mut SocialGraph, parts: &[Vec<String>]) {
    for (i, members) in parts.iter().enumerate() {
        for key in members {
            if let Some(idx) = graph.node_index(key) {
                graph.node_data_mut(idx).community = Some(i);
            }
        }
    }
}

/// Convert a partition into output records.
pub fn to_communities(parts: &[Vec<String>]) -> Vec<Community> {
    parts
        .iter()
        .enumerate()
        .map(|(id, members)| Community {
            id,
            members: members.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Girvan–Newman generator
// ---------------------------------------------------------------------------

/// Iterator over successively finer partitions.
///
/// Works on a private copy of the graph; the caller's graph is untouched.
pub struct GirvanNewman {
    graph: SocialGraph,
}

impl GirvanNewman {
    pub fn new(graph: &SocialGraph) -> Self {
        let mut graph = graph.clone();
        graph.clear_layout();
        // Self-loops never disconnect anything.
        let loops: Vec<EdgeIndex> = graph
            .edges()
            .filter(|(_, a, b, _)| a == b)
            .map(|(e, _, _, _)| e)
            .collect();
        for edge in loops {
            graph.remove_edge_index(edge);
        }
        Self { graph }
    }

    /// Remove most-central edges until the component count grows.
    fn split(&mut self) {
        let before = self.graph.component_count();
        while self.graph.edge_count() > 0 {
            let scores = edge_betweenness(&self.graph);
            let Some(edge) = most_central(&scores) else {
                break;
            };
            self.graph.remove_edge_index(edge);
            if self.graph.component_count() > before {
                break;
            }
        }
    }
}

impl Iterator for GirvanNewman {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.graph.edge_count() == 0 {
            return None;
        }
        self.split();
        Some(components_as_keys(&self.graph))
    }
}

/// Connected components as sorted key lists, ordered by first insertion.
fn components_as_keys(graph: &SocialGraph) -> Partition {
    graph
        .connected_components()
        .into_iter()
        .map(|component| {
            let mut keys: Vec<String> = component
                .into_iter()
                .map(|idx| graph.key(idx).to_string())
                .collect();
            keys.sort();
            keys
        })
        .collect()
}

/// Highest-scoring edge; ties go to the lowest edge index.
fn most_central(scores: &HashMap<EdgeIndex, f64>) -> Option<EdgeIndex> {
    let mut ranked: Vec<(EdgeIndex, f64)> = scores.iter().map(|(&e, &s)| (e, s)).collect();
    ranked.sort_by_key(|(e, _)| e.index());

    let mut best: Option<(EdgeIndex, f64)> = None;
    for (e, score) in ranked {
        match best {
            Some((_, top)) if score <= top + TIE_EPSILON => {}
            _ => best = Some((e, score)),
        }
    }
    best.map(|(e, _)| e)
}

// ---------------------------------------------------------------------------
// Edge betweenness (Brandes)
// ---------------------------------------------------------------------------

/// Unnormalised edge betweenness over unweighted shortest paths.
///
/// Each unordered node pair contributes once. Self-loops score 0.
pub fn edge_betweenness(graph: &SocialGraph) -> HashMap<EdgeIndex, f64> {
    let mut scores: HashMap<EdgeIndex, f64> =
        graph.edge_indices().into_iter().map(|e| (e, 0.0)).collect();
    let bound = graph.inner().node_bound();

    for source in graph.node_indices() {
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut preds: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); bound];
        let mut sigma = vec![0.0_f64; bound];
        let mut dist: Vec<Option<usize>> = vec![None; bound];

        sigma[source.index()] = 1.0;
        dist[source.index()] = Some(0);
        let mut queue = VecDeque::from([source]);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v.index()].unwrap_or(0);
            for (edge, w) in graph.incident_edges(v) {
                if w == v {
                    continue;
                }
                let wi = w.index();
                if dist[wi].is_none() {
                    dist[wi] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[wi] == Some(dv + 1) {
                    sigma[wi] += sigma[v.index()];
                    preds[wi].push((v, edge));
                }
            }
        }

        let mut delta = vec![0.0_f64; bound];
        while let Some(w) = stack.pop() {
            let wi = w.index();
            for &(v, edge) in &preds[wi] {
                let share = sigma[v.index()] / sigma[wi] * (1.0 + delta[wi]);
                if let Some(score) = scores.get_mut(&edge) {
                    *score += share;
                }
                delta[v.index()] += share;
            }
        }
    }

    // Every pair was counted from both ends.
    for score in scores.values_mut() {
        *score /= 2.0;
    }
    scores
}
