// demo.rs — Built-in demo scene
//
// Two boxes and a sphere under a smooth union, one box moved by a translated
// position, a sky color and a point light. Used by `aktino --demo`, the
// benchmarks and the reproducibility test.

use crate::error::GraphError;
use crate::graph::Graph;
use crate::id::{NodeId, PinId};
use crate::registry::NodeKind;

fn input(graph: &Graph, node: NodeId, index: usize) -> Result<PinId, GraphError> {
    graph
        .node(node)
        .and_then(|n| n.inputs.get(index))
        .map(|p| p.id)
        .ok_or(GraphError::UnknownNode(node))
}

fn output(graph: &Graph, node: NodeId) -> Result<PinId, GraphError> {
    graph
        .node(node)
        .and_then(|n| n.outputs.first())
        .map(|p| p.id)
        .ok_or(GraphError::UnknownNode(node))
}

fn connect(graph: &mut Graph, from: NodeId, to: NodeId, index: usize) -> Result<(), GraphError> {
    let start = output(graph, from)?;
    let end = input(graph, to, index)?;
    graph.create_link(start, end)?;
    Ok(())
}

/// Build the demo graph.
pub fn scene() -> Result<Graph, GraphError> {
    let mut graph = Graph::new();
    let out = graph.output_id().ok_or(GraphError::UnknownNode(NodeId(1)))?;

    let union = graph.add_node(NodeKind::SurfaceBoolean)?;
    graph.set_param(union, 0, 0.25)?;
    graph.set_position(union, [-220.0, 0.0])?;

    let floor = graph.add_node(NodeKind::SurfaceBox)?;
    for (i, v) in [0.6, 0.6, 0.6, 0.0, -1.0, 0.0, 4.0, 0.1, 4.0].into_iter().enumerate() {
        graph.set_param(floor, i, v)?;
    }
    graph.set_position(floor, [-480.0, -160.0])?;

    let pillar = graph.add_node(NodeKind::SurfaceBox)?;
    graph.set_param(pillar, 0, 0.9)?;
    graph.set_param(pillar, 1, 0.3)?;
    graph.set_param(pillar, 2, 0.2)?;
    graph.set_param(pillar, 9, 0.1)?;
    graph.set_position(pillar, [-480.0, 0.0])?;

    let shift = graph.add_node(NodeKind::Vec3Translate)?;
    graph.set_param(shift, 0, -1.5)?;
    graph.set_position(shift, [-700.0, 0.0])?;
    let pos = graph.add_node(NodeKind::InputPosition)?;
    graph.set_position(pos, [-900.0, 0.0])?;

    let ball = graph.add_node(NodeKind::SurfaceSphere)?;
    graph.set_param(ball, 3, 1.5)?;
    graph.set_param(ball, 6, 0.8)?;
    graph.set_position(ball, [-480.0, 160.0])?;

    let sky = graph.add_node(NodeKind::Vec3Constant)?;
    for (i, v) in [0.4, 0.6, 0.9].into_iter().enumerate() {
        graph.set_param(sky, i, v)?;
    }
    graph.set_position(sky, [-220.0, 200.0])?;

    let lamp = graph.add_node(NodeKind::LightPoint)?;
    graph.set_param(lamp, 0, 2.0)?;
    graph.set_param(lamp, 1, 4.0)?;
    graph.set_param(lamp, 6, 1.5)?;
    graph.set_position(lamp, [-220.0, 320.0])?;

    connect(&mut graph, pos, shift, 0)?;
    connect(&mut graph, shift, pillar, 1)?;
    connect(&mut graph, floor, union, 0)?;
    connect(&mut graph, pillar, union, 1)?;
    connect(&mut graph, ball, union, 1)?;
    connect(&mut graph, union, out, 0)?;
    connect(&mut graph, sky, out, 1)?;
    connect(&mut graph, lamp, out, 2)?;

    Ok(graph)
}
