//! GML reading and writing.
//!
//! Supports the subset of GML produced by common graph tools: integer, real
//! and string values, nested `[ ... ]` lists, `#` comments and HTML-style
//! character entities inside strings. Directed and multigraph inputs are
//! coerced into the undirected simple [`SocialGraph`].

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use petgraph::stable_graph::NodeIndex;

use crate::error::{GraphError, GraphResult};
use crate::graph::social_graph::{EdgeData, NodeData, SocialGraph};

/// A GML attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum GmlValue {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, GmlValue)>),
}

impl GmlValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            GmlValue::Int(i) => Some(*i as f64),
            GmlValue::Real(r) => Some(*r),
            GmlValue::Str(s) => s.trim().parse().ok(),
            GmlValue::List(_) => None,
        }
    }

    /// Scalar rendered as a plain string (strings unquoted).
    fn as_plain_string(&self) -> Option<String> {
        match self {
            GmlValue::Int(i) => Some(i.to_string()),
            GmlValue::Real(r) => Some(format_real(*r)),
            GmlValue::Str(s) => Some(s.clone()),
            GmlValue::List(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            GmlValue::List(_) => "[...]".to_string(),
            other => other.as_plain_string().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load a graph from a GML file.
///
/// A missing file is an error; an empty graph only logs a warning.
pub fn load_graph(path: impl AsRef<Path>) -> GraphResult<SocialGraph> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GraphError::NotFound(path.to_path_buf()));
    }
    let source = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
    let graph = parse_gml(&source)?;

    if graph.is_empty() {
        log::warn!("Empty graph loaded from {}", path.display());
    } else {
        log::info!(
            "Loaded {} nodes, {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            path.display()
        );
    }
    Ok(graph)
}

/// Parse GML source text into a graph.
pub fn parse_gml(source: &str) -> GraphResult<SocialGraph> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let document = parser.parse_list(false)?;

    let body = document
        .into_iter()
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("graph", GmlValue::List(items)) => Some(items),
            _ => None,
        })
        .ok_or_else(|| GraphError::Gml {
            line: 1,
            message: "missing 'graph [ ... ]' block".to_string(),
        })?;

    build_graph(body)
}

/// Serialise a graph to GML text. Cached layout positions are not written.
pub fn to_gml(graph: &SocialGraph) -> String {
    let mut out = String::from("graph [\n");
    for (key, value) in graph.graph_attrs() {
        write_attr(&mut out, 1, key, value);
    }

    let mut ids: HashMap<NodeIndex, usize> = HashMap::new();
    for (i, (idx, node)) in graph.nodes().enumerate() {
        ids.insert(idx, i);
        out.push_str("  node [\n");
        write_attr(&mut out, 2, "id", &GmlValue::Int(i as i64));
        write_attr(&mut out, 2, "label", &GmlValue::Str(node.key.clone()));
        if let Some(color) = &node.color {
            write_attr(&mut out, 2, "color", &GmlValue::Str(color.clone()));
        }
        if let Some(cc) = node.cc {
            write_attr(&mut out, 2, "cc", &GmlValue::Real(cc));
        }
        if let Some(community) = node.community {
            write_attr(&mut out, 2, "community", &GmlValue::Int(community as i64));
        }
        for (key, value) in &node.attrs {
            write_attr(&mut out, 2, key, value);
        }
        out.push_str("  ]\n");
    }

    for (_, a, b, edge) in graph.edges() {
        out.push_str("  edge [\n");
        write_attr(&mut out, 2, "source", &GmlValue::Int(ids[&a] as i64));
        write_attr(&mut out, 2, "target", &GmlValue::Int(ids[&b] as i64));
        if let Some(sign) = edge.sign {
            write_attr(&mut out, 2, "sign", &GmlValue::Int(sign));
        }
        if let Some(no) = edge.overlap {
            write_attr(&mut out, 2, "no", &GmlValue::Real(no));
        }
        for (key, value) in &edge.attrs {
            write_attr(&mut out, 2, key, value);
        }
        out.push_str("  ]\n");
    }

    out.push_str("]\n");
    out
}

/// Write a graph to a GML file, creating parent directories as needed.
pub fn write_gml(graph: &SocialGraph, path: impl AsRef<Path>) -> GraphResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }
    std::fs::write(path, to_gml(graph)).map_err(|e| GraphError::io(path, e))
}

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

fn build_graph(body: Vec<(String, GmlValue)>) -> GraphResult<SocialGraph> {
    let mut graph = SocialGraph::new();
    let mut node_items = Vec::new();
    let mut edge_items = Vec::new();

    for (key, value) in body {
        match (key.as_str(), value) {
            ("node", GmlValue::List(items)) => node_items.push(items),
            ("edge", GmlValue::List(items)) => edge_items.push(items),
            ("directed", value) => {
                if value.as_f64().unwrap_or(0.0) != 0.0 {
                    log::debug!("Directed input coerced to undirected");
                }
            }
            ("multigraph", value) => {
                if value.as_f64().unwrap_or(0.0) != 0.0 {
                    log::debug!("Multigraph input collapsed to simple graph");
                }
            }
            (_, value) => graph.set_graph_attr(key, value),
        }
    }

    // Edges may reference nodes declared later in the file.
    let mut by_id: HashMap<String, NodeIndex> = HashMap::new();
    for items in node_items {
        let (id, data) = node_from_items(items)?;
        if by_id.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        let idx = graph.add_node(data)?;
        by_id.insert(id, idx);
    }

    for items in edge_items {
        let mut source = None;
        let mut target = None;
        let mut data = EdgeData::default();

        for (key, value) in items {
            match key.as_str() {
                "source" => source = value.as_plain_string(),
                "target" => target = value.as_plain_string(),
                "sign" => data.sign = Some(parse_sign(&value)?),
                "no" => data.overlap = Some(real_attr("no", &value)?),
                _ => data.attrs.push((key, value)),
            }
        }

        let lookup = |end: Option<String>, which: &str| -> GraphResult<NodeIndex> {
            let id = end.ok_or_else(|| GraphError::Gml {
                line: 0,
                message: format!("edge without '{which}'"),
            })?;
            by_id
                .get(&id)
                .copied()
                .ok_or(GraphError::UnknownEndpoint(id))
        };
        let a = lookup(source, "source")?;
        let b = lookup(target, "target")?;
        graph.add_edge_between(a, b, data);
    }

    Ok(graph)
}

fn node_from_items(items: Vec<(String, GmlValue)>) -> GraphResult<(String, NodeData)> {
    let mut id = None;
    let mut label = None;
    let mut data = NodeData::default();

    for (key, value) in items {
        match key.as_str() {
            "id" => id = value.as_plain_string(),
            "label" => label = value.as_plain_string(),
            "color" => {
                data.color = Some(value.as_plain_string().ok_or_else(|| invalid("color", &value))?)
            }
            "cc" => data.cc = Some(real_attr("cc", &value)?),
            "community" => {
                data.community = match value {
                    GmlValue::Int(i) if i >= 0 => Some(i as usize),
                    ref other => return Err(invalid("community", other)),
                }
            }
            _ => data.attrs.push((key, value)),
        }
    }

    let id = id.ok_or_else(|| GraphError::Gml {
        line: 0,
        message: "node without 'id'".to_string(),
    })?;
    data.key = label.unwrap_or_else(|| id.clone());
    Ok((id, data))
}

fn parse_sign(value: &GmlValue) -> GraphResult<i64> {
    match value {
        GmlValue::Int(i) => Ok(*i),
        GmlValue::Real(r) if r.is_finite() => Ok(r.trunc() as i64),
        GmlValue::Str(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|r| r.is_finite()).map(|r| r.trunc() as i64))
                .ok_or_else(|| invalid("sign", value))
        }
        other => Err(invalid("sign", other)),
    }
}

fn real_attr(key: &str, value: &GmlValue) -> GraphResult<f64> {
    value.as_f64().ok_or_else(|| invalid(key, value))
}

fn invalid(key: &str, value: &GmlValue) -> GraphError {
    GraphError::InvalidAttribute {
        key: key.to_string(),
        value: value.describe(),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

fn tokenize(source: &str) -> GraphResult<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '[' => {
                chars.next();
                tokens.push((Token::Open, line));
            }
            ']' => {
                chars.next();
                tokens.push((Token::Close, line));
            }
            '"' => {
                chars.next();
                let start_line = line;
                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            raw.push(c);
                        }
                        None => {
                            return Err(GraphError::Gml {
                                line: start_line,
                                message: "unterminated string".to_string(),
                            })
                        }
                    }
                }
                tokens.push((Token::Str(unescape(&raw)), start_line));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let word = take_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
                let token = match word.as_str() {
                    "INF" => Token::Real(f64::INFINITY),
                    "NAN" => Token::Real(f64::NAN),
                    _ => Token::Key(word),
                };
                tokens.push((token, line));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let text = take_while(&mut chars, |c| {
                    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')
                });
                tokens.push((number_token(&text, line)?, line));
            }
            other => {
                return Err(GraphError::Gml {
                    line,
                    message: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(tokens)
}

fn take_while(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    pred: impl Fn(char) -> bool,
) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !pred(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn number_token(text: &str, line: usize) -> GraphResult<Token> {
    match text {
        "-INF" => return Ok(Token::Real(f64::NEG_INFINITY)),
        "+INF" => return Ok(Token::Real(f64::INFINITY)),
        "-NAN" | "+NAN" => return Ok(Token::Real(f64::NAN)),
        _ => {}
    }
    let is_real = text.contains(['.', 'e', 'E']);
    let parsed = if is_real {
        text.parse::<f64>().ok().map(Token::Real)
    } else {
        text.parse::<i64>()
            .ok()
            .map(Token::Int)
            .or_else(|| text.parse::<f64>().ok().map(Token::Real))
    };
    parsed.ok_or_else(|| GraphError::Gml {
        line,
        message: format!("invalid number '{text}'"),
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "quot" => Some('"'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "apos" => Some('\''),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    /// Parse `key value` pairs until `]` (nested) or end of input (top level).
    fn parse_list(&mut self, nested: bool) -> GraphResult<Vec<(String, GmlValue)>> {
        let mut items = Vec::new();
        loop {
            let Some((token, line)) = self.tokens.get(self.pos).cloned() else {
                if nested {
                    return Err(GraphError::Gml {
                        line: self.line(),
                        message: "unclosed '['".to_string(),
                    });
                }
                return Ok(items);
            };
            self.pos += 1;

            let key = match token {
                Token::Close if nested => return Ok(items),
                Token::Key(key) => key,
                other => {
                    return Err(GraphError::Gml {
                        line,
                        message: format!("expected key, found {other:?}"),
                    })
                }
            };

            let Some((value_token, value_line)) = self.tokens.get(self.pos).cloned() else {
                return Err(GraphError::Gml {
                    line,
                    message: format!("key '{key}' has no value"),
                });
            };
            self.pos += 1;

            let value = match value_token {
                Token::Int(i) => GmlValue::Int(i),
                Token::Real(r) => GmlValue::Real(r),
                Token::Str(s) => GmlValue::Str(s),
                Token::Open => GmlValue::List(self.parse_list(true)?),
                other => {
                    return Err(GraphError::Gml {
                        line: value_line,
                        message: format!("invalid value for '{key}': {other:?}"),
                    })
                }
            };
            items.push((key, value));
        }
    }
}

// ---------------------------------------------------------------------------
// Writer helpers
// ---------------------------------------------------------------------------

/// Format a real so it reads back as a real (always has a `.` or exponent).
fn format_real(r: f64) -> String {
    if r.is_nan() {
        "NAN".to_string()
    } else if r.is_infinite() {
        if r > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{r:?}")
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

fn write_attr(out: &mut String, depth: usize, key: &str, value: &GmlValue) {
    let indent = "  ".repeat(depth);
    match value {
        GmlValue::Int(i) => {
            let _ = writeln!(out, "{indent}{key} {i}");
        }
        GmlValue::Real(r) => {
            let _ = writeln!(out, "{indent}{key} {}", format_real(*r));
        }
        GmlValue::Str(s) => {
            let _ = writeln!(out, "{indent}{key} \"{}\"", escape(s));
        }
        GmlValue::List(items) => {
            let _ = writeln!(out, "{indent}{key} [");
            for (k, v) in items {
                write_attr(out, depth + 1, k, v);
            }
            let _ = writeln!(out, "{indent}]");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_mixed_values() {
        let tokens: Vec<Token> = tokenize("a 1 b -2.5 c \"x\" d [ ] e 1e3")
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(tokens[1], Token::Int(1));
        assert_eq!(tokens[3], Token::Real(-2.5));
        assert_eq!(tokens[5], Token::Str("x".into()));
        assert_eq!(tokens[7], Token::Open);
        assert_eq!(tokens.len(), 11);
        assert_eq!(tokens[10], Token::Real(1000.0));
    }

    #[test]
    fn comments_are_skipped() {
        let g = parse_gml("# header\ngraph [\n # c\n node [ id 0 ]\n]").unwrap();
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(unescape("a &amp; b &quot;c&quot; &#65;"), "a & b \"c\" A");
        assert_eq!(unescape("no entity & here"), "no entity & here");
    }

    #[test]
    fn label_falls_back_to_id() {
        let g = parse_gml("graph [ node [ id 7 ] node [ id 8 label \"b\" ] edge [ source 7 target 8 ] ]")
            .unwrap();
        assert!(g.has_node("7"));
        assert!(g.has_edge("7", "b"));
    }

    #[test]
    fn unknown_endpoint_is_error() {
        let err = parse_gml("graph [ node [ id 0 ] edge [ source 0 target 3 ] ]").unwrap_err();
        assert!(matches!(err, GraphError::UnknownEndpoint(id) if id == "3"));
    }

    #[test]
    fn missing_graph_block() {
        assert!(matches!(
            parse_gml("Creator \"x\""),
            Err(GraphError::Gml { .. })
        ));
    }

    #[test]
    fn unclosed_list_reports_line() {
        let err = parse_gml("graph [\n node [ id 0 ]\n").unwrap_err();
        assert!(matches!(err, GraphError::Gml { line: 2, .. }));
    }

    #[test]
    fn string_sign_is_accepted() {
        let g = parse_gml(
            "graph [ node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 sign \"-1\" ] ]",
        )
        .unwrap();
        assert_eq!(g.edge("0", "1").and_then(|e| e.sign), Some(-1));
    }

    #[test]
    fn bad_sign_is_error() {
        let err = parse_gml(
            "graph [ node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 sign \"plus\" ] ]",
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::InvalidAttribute { key, .. } if key == "sign"));
    }

    #[test]
    fn reals_keep_decimal_point() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(0.25), "0.25");
        assert_eq!(format_real(f64::NEG_INFINITY), "-INF");
    }

    #[test]
    fn nested_attributes_survive_writing() {
        let src = "graph [ node [ id 0 label \"a\" graphics [ x 1.5 y 2.0 ] ] ]";
        let g = parse_gml(src).unwrap();
        let text = to_gml(&g);
        assert!(text.contains("graphics ["));
        let again = parse_gml(&text).unwrap();
        assert_eq!(again.node("a").unwrap().attrs, g.node("a").unwrap().attrs);
    }
}
