//! Plot and animation output.
//!
//! Files ending in `.dot` are written as Graphviz DOT; everything else is SVG.

pub mod dot;
pub mod scene;
pub mod svg;

use std::path::{Path, PathBuf};

use crate::config::PlotMode;
use crate::error::{GraphError, GraphResult};
use crate::graph::layout::{layout, Layout};
use crate::graph::social_graph::SocialGraph;
use crate::phases::metrics;

/// Milliseconds each animation frame stays on screen.
pub const FRAME_MS: u64 = 500;

/// Draw the graph in the given mode and write it to `path`.
///
/// Clustering and overlap modes recompute their metric first.
pub fn plot_graph(graph: &mut SocialGraph, mode: PlotMode, path: &Path) -> GraphResult<()> {
    match mode {
        PlotMode::Clustering => {
            metrics::clustering(graph);
        }
        PlotMode::Overlap => {
            metrics::overlap(graph);
        }
        PlotMode::Polarity | PlotMode::Plain => {}
    }
    let positions = layout(graph);

    let body = if is_dot(path) {
        dot::render(graph, &positions, mode)
    } else {
        svg::render(&scene::plot_scene(graph, &positions, mode))
    };
    write_file(path, &body)?;
    log::info!("Saved {} plot to {}", mode, path.display());
    Ok(())
}

/// Write snapshots as an animated SVG sharing one layout.
pub fn animate_snapshots(snapshots: &[SocialGraph], layout: &Layout, path: &Path) -> GraphResult<()> {
    let frames: Vec<_> = snapshots
        .iter()
        .map(|snap| scene::frame_scene(snap, layout))
        .collect();
    write_file(path, &svg::animate(&frames, FRAME_MS))?;
    log::info!("Saved {}-frame animation to {}", frames.len(), path.display());
    Ok(())
}

/// Default plot path: `<input-stem>_<mode>.svg` next to the input.
pub fn default_plot_path(graph_path: &Path, mode: PlotMode) -> PathBuf {
    let stem = graph_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "graph".to_string());
    graph_path.with_file_name(format!("{stem}_{}.svg", mode.as_str()))
}

fn is_dot(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("dot") || e.eq_ignore_ascii_case("gv"))
        .unwrap_or(false)
}

fn write_file(path: &Path, body: &str) -> GraphResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }
    std::fs::write(path, body).map_err(|e| GraphError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_uses_stem_and_mode() {
        let p = default_plot_path(Path::new("/data/karate.gml"), PlotMode::Clustering);
        assert_eq!(p, PathBuf::from("/data/karate_C.svg"));
    }

    #[test]
    fn dot_extension_detection() {
        assert!(is_dot(Path::new("out.DOT")));
        assert!(!is_dot(Path::new("out.svg")));
        assert!(!is_dot(Path::new("out")));
    }
}
