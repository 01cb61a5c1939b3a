// dot.rs — Graphviz DOT output for node graphs
//
// Renders the graph's nodes and links in DOT format for inspection with
// `dot` or `xdot`. Data flows left to right, from sources toward the output
// node. Node fill colors come from the kind's palette entry.
//
// Preconditions: none.
// Postconditions: returns a valid DOT string; identical graphs render
//                 identically (nodes and links in insertion order).
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::fmt::Write;

use crate::graph::Graph;
use crate::id::NodeId;
use crate::node::Node;
use crate::pin::PinType;
use crate::registry::NodeKind;

/// Emit the graph as a Graphviz DOT string.
pub fn emit_dot(graph: &Graph) -> String {
    let mut buf = String::new();
    line(&mut buf, "digraph aktino {");
    line(&mut buf, "    rankdir=LR;");
    line(&mut buf, "    node [fontname=\"Helvetica\", fontsize=10];");
    line(&mut buf, "    edge [fontname=\"Helvetica\", fontsize=9];");

    if !graph.nodes().is_empty() {
        line(&mut buf, "");
    }
    for node in graph.nodes() {
        let _ = writeln!(
            buf,
            "    {} [{}];",
            dot_node_id(node.id),
            node_attrs(node)
        );
    }

    if !graph.links().is_empty() {
        line(&mut buf, "");
    }
    for link in graph.links() {
        let (Some(start), Some(end)) = (graph.pin(link.start), graph.pin(link.end)) else {
            continue;
        };
        let _ = writeln!(
            buf,
            "    {} -> {} [taillabel=\"{}\", headlabel=\"{}\", color=\"{}\"];",
            dot_node_id(start.node),
            dot_node_id(end.node),
            escape(start.name),
            escape(end.name),
            edge_color(start.ty)
        );
    }

    line(&mut buf, "}");
    buf
}

fn line(buf: &mut String, s: &str) {
    buf.push_str(s);
    buf.push('\n');
}

/// Keep only characters that are safe in a DOT identifier.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn dot_node_id(node: NodeId) -> String {
    format!("n{}", node.0)
}

fn node_attrs(node: &Node) -> String {
    let def = node.definition();
    let [r, g, b] = def.color;
    let shape = match node.kind {
        NodeKind::Output => "house",
        NodeKind::InputPosition | NodeKind::InputTime => "ellipse",
        NodeKind::SurfaceCode | NodeKind::Vec3Code => "note",
        _ => "box",
    };
    format!(
        "shape={shape}, style=filled, fillcolor=\"#{r:02x}{g:02x}{b:02x}\", label=\"{}\\n{}\"",
        escape(def.name),
        sanitize(node.kind.tag())
    )
}

fn edge_color(ty: PinType) -> &'static str {
    match ty {
        PinType::Surface => "black",
        PinType::Vec3 => "blue",
        PinType::Float => "gray40",
        PinType::Light => "orange",
    }
}
