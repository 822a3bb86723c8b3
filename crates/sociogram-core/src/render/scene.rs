//! Plot styling shared by the SVG and DOT backends.

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::NodeIndexable;

use crate::config::PlotMode;
use crate::graph::layout::{ring_position, Layout};
use crate::graph::social_graph::SocialGraph;

/// Default node area (matplotlib points², as in the classic networkx drawing).
pub const DEFAULT_NODE_SIZE: f64 = 300.0;
pub const DEFAULT_NODE_FILL: &str = "#1f78b4";
pub const DEFAULT_EDGE_STROKE: &str = "black";

/// Viridis anchors, low to high.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (0x44, 0x01, 0x54),
    (0x3b, 0x52, 0x8b),
    (0x21, 0x91, 0x8c),
    (0x5e, 0xc9, 0x62),
    (0xfd, 0xe7, 0x25),
];

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub key: String,
    pub x: f64,
    pub y: f64,
    /// Marker area in points².
    pub size: f64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGlyph {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub width: f64,
    pub stroke: String,
}

/// Everything needed to draw one picture of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeGlyph>,
    pub edges: Vec<EdgeGlyph>,
    pub labels: bool,
}

/// Styling rules for one plot mode.
pub struct Styler<'g> {
    graph: &'g SocialGraph,
    mode: PlotMode,
    degree_range: (usize, usize),
}

impl<'g> Styler<'g> {
    pub fn new(graph: &'g SocialGraph, mode: PlotMode) -> Self {
        let degrees: Vec<usize> = graph.node_indices().map(|i| graph.degree(i)).collect();
        let degree_range = (
            degrees.iter().copied().min().unwrap_or(0),
            degrees.iter().copied().max().unwrap_or(0),
        );
        Self {
            graph,
            mode,
            degree_range,
        }
    }

    pub fn node_size(&self, idx: NodeIndex) -> f64 {
        match self.mode {
            PlotMode::Clustering => {
                300.0 + 2000.0 * self.graph.node_data(idx).cc.unwrap_or(0.0)
            }
            _ => DEFAULT_NODE_SIZE,
        }
    }

    pub fn node_fill(&self, idx: NodeIndex) -> String {
        match self.mode {
            PlotMode::Clustering => {
                let (lo, hi) = self.degree_range;
                let span = (hi - lo) as f64;
                let t = if span > 0.0 {
                    (self.graph.degree(idx) - lo) as f64 / span
                } else {
                    0.0
                };
                viridis(t)
            }
            PlotMode::Polarity => self
                .graph
                .node_data(idx)
                .color
                .clone()
                .unwrap_or_else(|| "gray".to_string()),
            _ => DEFAULT_NODE_FILL.to_string(),
        }
    }

    pub fn edge_width(&self, edge: EdgeIndex) -> f64 {
        match self.mode {
            PlotMode::Overlap => 1.0 + 6.0 * self.graph.edge_data(edge).overlap.unwrap_or(0.0),
            _ => 1.0,
        }
    }

    pub fn edge_stroke(&self, edge: EdgeIndex) -> &'static str {
        match self.mode {
            PlotMode::Overlap => "gray",
            PlotMode::Polarity => {
                if self.graph.edge_data(edge).is_positive() {
                    "green"
                } else {
                    "red"
                }
            }
            _ => DEFAULT_EDGE_STROKE,
        }
    }
}

/// Build the scene for a `--plot` drawing.
pub fn plot_scene(graph: &SocialGraph, layout: &Layout, mode: PlotMode) -> Scene {
    let styler = Styler::new(graph, mode);
    let positions = positions(graph, layout);

    let nodes = graph
        .node_indices()
        .map(|idx| {
            let (x, y) = positions[idx.index()];
            NodeGlyph {
                key: graph.key(idx).to_string(),
                x,
                y,
                size: styler.node_size(idx),
                fill: styler.node_fill(idx),
            }
        })
        .collect();

    let edges = graph
        .edges()
        .map(|(e, a, b, _)| EdgeGlyph {
            from: positions[a.index()],
            to: positions[b.index()],
            width: styler.edge_width(e),
            stroke: styler.edge_stroke(e).to_string(),
        })
        .collect();

    Scene {
        nodes,
        edges,
        labels: true,
    }
}

/// Build one animation frame: small unlabelled nodes, thin edges.
pub fn frame_scene(graph: &SocialGraph, layout: &Layout) -> Scene {
    let positions = positions(graph, layout);
    Scene {
        nodes: graph
            .node_indices()
            .map(|idx| {
                let (x, y) = positions[idx.index()];
                NodeGlyph {
                    key: graph.key(idx).to_string(),
                    x,
                    y,
                    size: 100.0,
                    fill: DEFAULT_NODE_FILL.to_string(),
                }
            })
            .collect(),
        edges: graph
            .edges()
            .map(|(_, a, b, _)| EdgeGlyph {
                from: positions[a.index()],
                to: positions[b.index()],
                width: 0.8,
                stroke: DEFAULT_EDGE_STROKE.to_string(),
            })
            .collect(),
        labels: false,
    }
}

/// Positions indexed by node index; nodes absent from the layout go on a ring.
fn positions(graph: &SocialGraph, layout: &Layout) -> Vec<(f64, f64)> {
    let missing: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| !layout.contains_key(graph.key(idx)))
        .collect();

    let mut out = vec![(0.0, 0.0); graph.inner().node_bound()];
    for idx in graph.node_indices() {
        if let Some(&p) = layout.get(graph.key(idx)) {
            out[idx.index()] = p;
        }
    }
    for (slot, idx) in missing.iter().enumerate() {
        out[idx.index()] = ring_position(slot, missing.len());
    }
    out
}

/// Map `t` in `[0, 1]` onto the viridis ramp.
pub fn viridis(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
