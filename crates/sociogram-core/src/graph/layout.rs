//! Seeded Fruchterman–Reingold spring layout.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::social_graph::SocialGraph;

/// Node key → (x, y) position in `[-1, 1]`.
pub type Layout = HashMap<String, (f64, f64)>;

const LAYOUT_SEED: u64 = 42;
const ITERATIONS: usize = 50;

/// Return the cached layout, computing and caching it on first use.
pub fn layout(graph: &mut SocialGraph) -> Layout {
    if let Some(cached) = graph.layout() {
        return cached.clone();
    }
    let positions = spring_layout(graph, LAYOUT_SEED);
    graph.set_layout(positions.clone());
    positions
}

/// Compute a spring layout with a fixed seed.
pub fn spring_layout(graph: &SocialGraph, seed: u64) -> Layout {
    let keys: Vec<&str> = graph.nodes().map(|(_, n)| n.key.as_str()).collect();
    let n = keys.len();
    match n {
        0 => return Layout::new(),
        1 => return Layout::from([(keys[0].to_string(), (0.0, 0.0))]),
        _ => {}
    }

    let index: HashMap<&str, usize> = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let mut adjacency = vec![vec![false; n]; n];
    for (_, a, b, _) in graph.edges() {
        let (i, j) = (index[graph.key(a)], index[graph.key(b)]);
        adjacency[i][j] = true;
        adjacency[j][i] = true;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();

    let k = (1.0 / n as f64).sqrt();
    let span = |pos: &[(f64, f64)]| {
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for &(x, y) in pos {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        (max_x - min_x).max(max_y - min_y)
    };
    let mut temperature = span(&pos) * 0.1;
    let cooling = temperature / (ITERATIONS as f64 + 1.0);

    for _ in 0..ITERATIONS {
        let mut displacement = vec![(0.0_f64, 0.0_f64); n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let attraction = if adjacency[i][j] { dist / k } else { 0.0 };
                let force = k * k / (dist * dist) - attraction;
                displacement[i].0 += dx * force;
                displacement[i].1 += dy * force;
            }
        }
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = (d.0 * d.0 + d.1 * d.1).sqrt().max(0.01);
            p.0 += d.0 * temperature / length;
            p.1 += d.1 * temperature / length;
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    keys.into_iter()
        .map(str::to_string)
        .zip(pos)
        .collect()
}

/// Centre positions on the origin and scale the largest coordinate to 1.
fn rescale(pos: &mut [(f64, f64)]) {
    let n = pos.len() as f64;
    let (cx, cy) = pos
        .iter()
        .fold((0.0, 0.0), |acc, p| (acc.0 + p.0 / n, acc.1 + p.1 / n));
    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        lim = lim.max(p.0.abs()).max(p.1.abs());
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= lim;
            p.1 /= lim;
        }
    }
}

/// Position for a node missing from the cached layout: a point on a ring,
/// chosen deterministically from its position in the graph.
pub fn ring_position(slot: usize, total: usize) -> (f64, f64) {
    let angle = std::f64::consts::TAU * slot as f64 / total.max(1) as f64;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_deterministic() {
        let g = SocialGraph::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        assert_eq!(spring_layout(&g, 42), spring_layout(&g, 42));
    }

    #[test]
    fn layout_is_bounded() {
        let g = SocialGraph::from_edges([("a", "b"), ("b", "c"), ("x", "y")]);
        for (x, y) in spring_layout(&g, 42).values() {
            assert!(x.abs() <= 1.0 + 1e-9 && y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn layout_is_cached_on_graph() {
        let mut g = SocialGraph::from_edges([("a", "b")]);
        let first = layout(&mut g);
        assert!(g.layout().is_some());
        assert_eq!(first, layout(&mut g));
    }
}
