//! SVG output for plots and animations.

use std::fmt::Write as _;

use crate::render::scene::Scene;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN: f64 = 50.0;
/// Pixels per typographic point at 100 dpi.
const PX_PER_PT: f64 = 100.0 / 72.0;

fn to_canvas(x: f64, y: f64) -> (f64, f64) {
    let cx = MARGIN + (x + 1.0) / 2.0 * (WIDTH - 2.0 * MARGIN);
    let cy = MARGIN + (1.0 - (y + 1.0) / 2.0) * (HEIGHT - 2.0 * MARGIN);
    (cx, cy)
}

/// Marker radius in pixels for an area given in points².
fn radius(size: f64) -> f64 {
    size.max(0.0).sqrt() / 2.0 * PX_PER_PT
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn header() -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n"
    )
}

fn write_scene(out: &mut String, scene: &Scene) {
    for edge in &scene.edges {
        let (x1, y1) = to_canvas(edge.from.0, edge.from.1);
        let (x2, y2) = to_canvas(edge.to.0, edge.to.1);
        let _ = writeln!(
            out,
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
            escape(&edge.stroke),
            edge.width * PX_PER_PT
        );
    }
    for node in &scene.nodes {
        let (cx, cy) = to_canvas(node.x, node.y);
        let _ = writeln!(
            out,
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\"><title>{}</title></circle>",
            radius(node.size),
            escape(&node.fill),
            escape(&node.key)
        );
    }
    if scene.labels {
        for node in &scene.nodes {
            let (cx, cy) = to_canvas(node.x, node.y);
            let _ = writeln!(
                out,
                "<text x=\"{cx:.2}\" y=\"{cy:.2}\" font-family=\"sans-serif\" font-size=\"12\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                escape(&node.key)
            );
        }
    }
}

/// Render a single scene as a standalone SVG document.
pub fn render(scene: &Scene) -> String {
    let mut out = header();
    write_scene(&mut out, scene);
    out.push_str("</svg>\n");
    out
}

/// Render frames as a looping SMIL-animated SVG, `frame_ms` per frame.
pub fn animate(frames: &[Scene], frame_ms: u64) -> String {
    let mut out = header();
    let n = frames.len();
    let total_s = (n as u64 * frame_ms) as f64 / 1000.0;

    for (i, frame) in frames.iter().enumerate() {
        let start = i as f64 / n as f64;
        let end = (i + 1) as f64 / n as f64;
        let (values, key_times) = if n == 1 {
            ("inline".to_string(), "0".to_string())
        } else if i == 0 {
            ("inline;none".to_string(), format!("0;{end:.6}"))
        } else if i + 1 == n {
            ("none;inline".to_string(), format!("0;{start:.6}"))
        } else {
            ("none;inline;none".to_string(), format!("0;{start:.6};{end:.6}"))
        };

        let initial = if i == 0 { "inline" } else { "none" };
        let _ = writeln!(out, "<g id=\"frame-{i}\" display=\"{initial}\">");
        let _ = writeln!(
            out,
            "<animate attributeName=\"display\" values=\"{values}\" keyTimes=\"{key_times}\" dur=\"{total_s}s\" calcMode=\"discrete\" repeatCount=\"indefinite\"/>"
        );
        write_scene(&mut out, frame);
        out.push_str("</g>\n");
    }

    out.push_str("</svg>\n");
    out
}
