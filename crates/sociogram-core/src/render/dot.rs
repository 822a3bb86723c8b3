//! Graphviz DOT output through `petgraph::dot`.

use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::{EdgeReference, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;

use crate::config::PlotMode;
use crate::graph::layout::Layout;
use crate::graph::social_graph::{EdgeData, NodeData, SocialGraph};
use crate::render::scene::Styler;

/// Render the graph as DOT with the plot mode's styling and layout positions
/// pinned (`pos="x,y!"`, for `neato -n`).
pub fn render(graph: &SocialGraph, layout: &Layout, mode: PlotMode) -> String {
    let styler = Styler::new(graph, mode);
    let config = [Config::NodeNoLabel, Config::EdgeNoLabel];

    let edge_attrs = |_: &StableUnGraph<NodeData, EdgeData>, edge: EdgeReference<'_, EdgeData>| {
        format!(
            "color=\"{}\", penwidth={:.2}",
            styler.edge_stroke(edge.id()),
            styler.edge_width(edge.id())
        )
    };
    let node_attrs = |_: &StableUnGraph<NodeData, EdgeData>, (idx, data): (NodeIndex, &NodeData)| {
        let pos = layout
            .get(&data.key)
            .map(|(x, y)| format!(", pos=\"{:.3},{:.3}!\"", x * 5.0, y * 5.0))
            .unwrap_or_default();
        format!(
            "label=\"{}\", style=filled, fillcolor=\"{}\", width={:.2}{}",
            data.key.replace('"', "\\\""),
            styler.node_fill(idx),
            styler.node_size(idx).sqrt() / 72.0,
            pos
        )
    };

    let dot = Dot::with_attr_getters(graph.inner(), &config, &edge_attrs, &node_attrs);
    format!("{:?}", dot)
}
