//! Attributed undirected graph used by every analysis step.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::error::{GraphError, GraphResult};
use crate::graph::gml::GmlValue;
use crate::graph::layout::Layout;

/// Attributes carried by a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Node key: the GML label, or the GML id when no label is present.
    pub key: String,
    /// Group label used by the homophily test and `P` plots.
    pub color: Option<String>,
    /// Local clustering coefficient.
    pub cc: Option<f64>,
    /// Community index assigned by the partition step.
    pub community: Option<usize>,
    /// Any other GML attributes, in file order.
    pub attrs: Vec<(String, GmlValue)>,
}

impl NodeData {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Attributes carried by an edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    /// +1 / -1 for signed graphs. Missing means positive.
    pub sign: Option<i64>,
    /// Neighbourhood overlap, written to GML as `no`.
    pub overlap: Option<f64>,
    pub attrs: Vec<(String, GmlValue)>,
}

impl EdgeData {
    pub fn signed(sign: i64) -> Self {
        Self {
            sign: Some(sign),
            ..Default::default()
        }
    }

    /// Whether the edge counts as positive for balance purposes.
    pub fn is_positive(&self) -> bool {
        self.sign.unwrap_or(1) >= 0
    }

    /// Overwrite fields that `other` sets, keeping the rest.
    fn merge(&mut self, other: EdgeData) {
        if other.sign.is_some() {
            self.sign = other.sign;
        }
        if other.overlap.is_some() {
            self.overlap = other.overlap;
        }
        for (key, value) in other.attrs {
            if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                self.attrs.push((key, value));
            }
        }
    }
}

/// Wrapper around `petgraph::StableUnGraph` with string-keyed node lookup.
///
/// Nodes are never removed, so node index order equals insertion order.
/// Adding an edge that already exists updates its attributes instead of
/// creating a parallel edge.
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    graph: StableUnGraph<NodeData, EdgeData>,
    /// O(1) node key → NodeIndex lookup.
    key_index: HashMap<String, NodeIndex>,
    /// Graph-level GML attributes other than `node` and `edge`.
    attrs: Vec<(String, GmlValue)>,
    /// Cached node positions, see [`crate::graph::layout`].
    layout: Option<Layout>,
}

impl SocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(source, target)` key pairs, creating nodes on first use.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut g = Self::new();
        for (a, b) in edges {
            g.add_edge(a, b, EdgeData::default());
        }
        g
    }

    // --- Nodes ---

    /// Insert a fully specified node. Fails if the key is already taken.
    pub fn add_node(&mut self, data: NodeData) -> GraphResult<NodeIndex> {
        if self.key_index.contains_key(&data.key) {
            return Err(GraphError::DuplicateNode(data.key));
        }
        let key = data.key.clone();
        let idx = self.graph.add_node(data);
        self.key_index.insert(key, idx);
        Ok(idx)
    }

    /// Get or create a node by key.
    pub fn ensure_node(&mut self, key: &str) -> NodeIndex {
        if let Some(&idx) = self.key_index.get(key) {
            idx
        } else {
            let idx = self.graph.add_node(NodeData::new(key));
            self.key_index.insert(key.to_string(), idx);
            idx
        }
    }

    pub fn node_index(&self, key: &str) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<&NodeData> {
        self.node_index(key)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_data(&self, idx: NodeIndex) -> &NodeData {
        &self.graph[idx]
    }

    pub fn node_data_mut(&mut self, idx: NodeIndex) -> &mut NodeData {
        &mut self.graph[idx]
    }

    pub fn key(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].key
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &NodeData)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    // --- Edges ---

    /// Add (or update) an undirected edge between two keys.
    pub fn add_edge(&mut self, a: &str, b: &str, data: EdgeData) -> EdgeIndex {
        let ai = self.ensure_node(a);
        let bi = self.ensure_node(b);
        self.add_edge_between(ai, bi, data)
    }

    /// Add (or update) an undirected edge between two existing nodes.
    pub fn add_edge_between(&mut self, a: NodeIndex, b: NodeIndex, data: EdgeData) -> EdgeIndex {
        if let Some(e) = self.graph.find_edge(a, b) {
            self.graph[e].merge(data);
            e
        } else {
            self.graph.add_edge(a, b, data)
        }
    }

    /// Remove the edge between two keys. Returns false if there was none.
    pub fn remove_edge(&mut self, a: &str, b: &str) -> bool {
        match self.find_edge(a, b) {
            Some(e) => self.graph.remove_edge(e).is_some(),
            None => false,
        }
    }

    pub fn remove_edge_index(&mut self, e: EdgeIndex) -> Option<EdgeData> {
        self.graph.remove_edge(e)
    }

    pub fn find_edge(&self, a: &str, b: &str) -> Option<EdgeIndex> {
        let ai = self.node_index(a)?;
        let bi = self.node_index(b)?;
        self.graph.find_edge(ai, bi)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.find_edge(a, b).is_some()
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&EdgeData> {
        self.find_edge(a, b).map(|e| &self.graph[e])
    }

    pub fn edge_data(&self, e: EdgeIndex) -> &EdgeData {
        &self.graph[e]
    }

    pub fn edge_data_mut(&mut self, e: EdgeIndex) -> &mut EdgeData {
        &mut self.graph[e]
    }

    pub fn edge_endpoints(&self, e: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(e)
    }

    pub fn edge_indices(&self) -> Vec<EdgeIndex> {
        self.graph.edge_indices().collect()
    }

    /// Edges as `(edge, source, target, data)` in index order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &EdgeData)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.id(), e.source(), e.target(), e.weight()))
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // --- Adjacency ---

    /// Distinct neighbours of a node, excluding the node itself.
    pub fn neighbor_set(&self, idx: NodeIndex) -> HashSet<NodeIndex> {
        self.graph.neighbors(idx).filter(|&n| n != idx).collect()
    }

    /// Neighbour iterator including self-loops.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Incident edges of a node as `(edge, other_endpoint)`.
    pub fn incident_edges(&self, idx: NodeIndex) -> impl Iterator<Item = (EdgeIndex, NodeIndex)> + '_ {
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (e.id(), other)
        })
    }

    /// Node degree, with self-loops counted twice.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges(idx)
            .map(|e| if e.source() == e.target() { 2 } else { 1 })
            .sum()
    }

    /// Connected components as node index lists.
    ///
    /// Components are ordered by their first node in insertion order, and
    /// members are listed in BFS discovery order.
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut components = Vec::new();

        for start in self.graph.node_indices() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for v in self.graph.neighbors(u) {
                    if seen.insert(v) {
                        component.push(v);
                        queue.push_back(v);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    pub fn component_count(&self) -> usize {
        self.connected_components().len()
    }

    // --- Graph-level state ---

    pub fn graph_attrs(&self) -> &[(String, GmlValue)] {
        &self.attrs
    }

    pub fn set_graph_attr(&mut self, key: impl Into<String>, value: GmlValue) {
        let key = key.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.attrs.push((key, value));
        }
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = Some(layout);
    }

    pub fn clear_layout(&mut self) {
        self.layout = None;
    }

    /// Borrow the underlying petgraph graph.
    pub fn inner(&self) -> &StableUnGraph<NodeData, EdgeData> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_creates_nodes() {
        let g = SocialGraph::from_edges([("a", "b"), ("b", "c")]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.has_edge("b", "a"));
    }

    #[test]
    fn duplicate_edge_updates_attributes() {
        let mut g = SocialGraph::new();
        g.add_edge("a", "b", EdgeData::signed(1));
        g.add_edge("b", "a", EdgeData::signed(-1));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge("a", "b").and_then(|e| e.sign), Some(-1));
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut g = SocialGraph::new();
        g.add_edge("a", "b", EdgeData::signed(-1));
        g.add_edge("a", "b", EdgeData::default());
        assert_eq!(g.edge("a", "b").and_then(|e| e.sign), Some(-1));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = SocialGraph::new();
        g.add_node(NodeData::new("x")).unwrap();
        assert!(matches!(
            g.add_node(NodeData::new("x")),
            Err(GraphError::DuplicateNode(_))
        ));
    }

    #[test]
    fn self_loop_degree_counts_twice() {
        let g = SocialGraph::from_edges([("a", "a"), ("a", "b")]);
        let a = g.node_index("a").unwrap();
        assert_eq!(g.degree(a), 3);
        assert_eq!(g.neighbor_set(a).len(), 1);
    }

    #[test]
    fn remove_edge_keeps_nodes() {
        let mut g = SocialGraph::from_edges([("a", "b")]);
        assert!(g.remove_edge("a", "b"));
        assert!(!g.remove_edge("a", "b"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn components_follow_insertion_order() {
        let mut g = SocialGraph::from_edges([("a", "b"), ("c", "d")]);
        g.ensure_node("e");
        let comps = g.connected_components();
        assert_eq!(comps.len(), 3);
        assert_eq!(g.key(comps[0][0]), "a");
        assert_eq!(g.key(comps[1][0]), "c");
        assert_eq!(g.key(comps[2][0]), "e");
    }
}
