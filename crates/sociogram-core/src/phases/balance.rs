//! Structural balance check by BFS two-colouring.

use std::collections::{HashMap, VecDeque};

use crate::graph::social_graph::SocialGraph;

/// Edge whose sign contradicts the labels forced by the rest of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceConflict {
    pub source: String,
    pub target: String,
    pub sign: i64,
}

impl std::fmt::Display for BalanceConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "edge {} -- {} (sign {}) contradicts the two-coloring",
            self.source, self.target, self.sign
        )
    }
}

/// Two-colour the graph so that positive edges join equal labels and
/// negative edges join opposite labels.
///
/// Each connected component is seeded with `+1` at its first node in
/// insertion order. Missing signs count as positive.
pub fn balance_labeling(graph: &SocialGraph) -> Result<HashMap<String, i8>, BalanceConflict> {
    let mut label: HashMap<_, i8> = HashMap::new();

    for start in graph.node_indices() {
        if label.contains_key(&start) {
            continue;
        }
        label.insert(start, 1);
        let mut queue = VecDeque::from([start]);

        while let Some(u) = queue.pop_front() {
            let lu = label[&u];
            for (edge, v) in graph.incident_edges(u) {
                let data = graph.edge_data(edge);
                let expected = if data.is_positive() { lu } else { -lu };
                match label.get(&v) {
                    None => {
                        label.insert(v, expected);
                        queue.push_back(v);
                    }
                    Some(&lv) if lv != expected => {
                        return Err(BalanceConflict {
                            source: graph.key(u).to_string(),
                            target: graph.key(v).to_string(),
                            sign: data.sign.unwrap_or(1),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    Ok(label
        .into_iter()
        .map(|(idx, l)| (graph.key(idx).to_string(), l))
        .collect())
}

/// True iff a consistent two-colouring exists.
pub fn is_balanced(graph: &SocialGraph) -> bool {
    match balance_labeling(graph) {
        Ok(_) => true,
        Err(conflict) => {
            log::debug!("Graph is not balanced: {conflict}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::social_graph::EdgeData;

    fn signed(edges: &[(&str, &str, i64)]) -> SocialGraph {
        let mut g = SocialGraph::new();
        for &(a, b, s) in edges {
            g.add_edge(a, b, EdgeData::signed(s));
        }
        g
    }

    #[test]
    fn all_positive_is_balanced() {
        let g = SocialGraph::from_edges([("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(is_balanced(&g));
    }

    #[test]
    fn two_factions_are_balanced() {
        let g = signed(&[("a", "b", 1), ("c", "d", 1), ("a", "c", -1), ("b", "d", -1)]);
        let labels = balance_labeling(&g).unwrap();
        assert_eq!(labels["a"], labels["b"]);
        assert_ne!(labels["a"], labels["c"]);
    }

    #[test]
    fn odd_negative_cycle_is_unbalanced() {
        let g = signed(&[("a", "b", 1), ("b", "c", 1), ("c", "a", -1)]);
        assert!(!is_balanced(&g));
        assert!(balance_labeling(&g).is_err());
    }

    #[test]
    fn three_mutual_enemies_are_unbalanced() {
        let g = signed(&[("a", "b", -1), ("b", "c", -1), ("c", "a", -1)]);
        assert!(!is_balanced(&g));
    }

    #[test]
    fn components_checked_independently() {
        let mut g = signed(&[("a", "b", -1), ("x", "y", 1), ("y", "z", -1), ("z", "x", -1)]);
        g.ensure_node("lonely");
        let labels = balance_labeling(&g).unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels["lonely"], 1);
    }

    #[test]
    fn negative_self_loop_is_unbalanced() {
        let g = signed(&[("a", "a", -1)]);
        assert!(!is_balanced(&g));
    }

    #[test]
    fn zero_sign_counts_as_positive() {
        let g = signed(&[("a", "b", 0), ("b", "c", -1), ("a", "c", -1)]);
        assert!(is_balanced(&g));
    }
}
