//! Clustering coefficient and neighbourhood overlap.
//!
//! Both are derived attributes: they are recomputed on every call and
//! written back onto the graph (`cc` on nodes, `no` on edges).

use std::collections::HashMap;

use crate::graph::social_graph::SocialGraph;

/// Compute the local clustering coefficient of every node and store it as `cc`.
///
/// `cc(v) = 2·T(v) / (deg(v)·(deg(v) − 1))`, where `T(v)` counts triangles
/// through `v`. Self-loops are ignored; nodes with fewer than two neighbours
/// score 0.
pub fn clustering(graph: &mut SocialGraph) -> HashMap<String, f64> {
    let indices: Vec<_> = graph.node_indices().collect();
    let neighbours: HashMap<_, _> = indices
        .iter()
        .map(|&idx| (idx, graph.neighbor_set(idx)))
        .collect();

    let mut scores = HashMap::with_capacity(indices.len());
    for &idx in &indices {
        let nbrs = &neighbours[&idx];
        let deg = nbrs.len();
        let cc = if deg < 2 {
            0.0
        } else {
            let links: usize = nbrs
                .iter()
                .map(|u| neighbours[u].intersection(nbrs).count())
                .sum();
            // Each triangle edge is seen from both ends.
            let triangles = links / 2;
            (2 * triangles) as f64 / (deg * (deg - 1)) as f64
        };
        graph.node_data_mut(idx).cc = Some(cc);
        scores.insert(graph.key(idx).to_string(), cc);
    }
    scores
}

/// Compute the neighbourhood overlap of every edge and store it as `no`.
///
/// For an edge `(u, v)` the overlap is `|Nu ∩ Nv| / |Nu ∪ Nv|` with
/// `Nu = N(u) \ {v}` and `Nv = N(v) \ {u}`; 0 when the union is empty.
pub fn overlap(graph: &mut SocialGraph) -> Vec<(String, String, f64)> {
    let edges: Vec<_> = graph.edges().map(|(e, a, b, _)| (e, a, b)).collect();
    let mut result = Vec::with_capacity(edges.len());

    for (e, a, b) in edges {
        let mut na = graph.neighbor_set(a);
        let mut nb = graph.neighbor_set(b);
        na.remove(&b);
        nb.remove(&a);

        let union = na.union(&nb).count();
        let score = if union == 0 {
            0.0
        } else {
            na.intersection(&nb).count() as f64 / union as f64
        };

        graph.edge_data_mut(e).overlap = Some(score);
        result.push((graph.key(a).to_string(), graph.key(b).to_string(), score));
    }
    result
}
