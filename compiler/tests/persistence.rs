// Persistence tests: snapshot load diagnostics and recovery.
//
// Fixtures are hand-written JSON. Pin ids follow from node ids:
//   output 1          → Surface 2, Sky 3, Lights 4
//   surface_sphere 5  → Color 6, Position 7, Radius 8, out 9
//   surface_box 10    → Color 11, Position 12, Size 13, Roundness 14, out 15
//   surface_boolean 16 → Input A 17, Input B,C... 18, out 19
//
// The id space ends at MAX_ID = 4294967294.

use aktino::codegen::{generate, CodegenOptions, Variant};
use aktino::graph::Graph;
use aktino::diag::has_errors;
use aktino::error::GraphError;
use aktino::id::{LinkId, NodeId, PinId, MAX_ID};
use aktino::registry::NodeKind;
use aktino::snapshot::{GraphSnapshot, LoadResult};

// ── Helpers ─────────────────────────────────────────────────────────────────

const NODES: &str = r#"
    {"id": 1, "kind": "output"},
    {"id": 5, "kind": "surface_sphere", "position": [10.0, 20.0]},
    {"id": 10, "kind": "surface_box"},
    {"id": 16, "kind": "surface_boolean"}
"#;

fn load(nodes: &str, links: &str) -> LoadResult {
    let json = format!(r#"{{"nodes": [{}], "links": [{}]}}"#, nodes, links);
    let snapshot = GraphSnapshot::from_json(&json).unwrap();
    Graph::load(&snapshot)
}

fn codes(result: &LoadResult) -> Vec<&'static str> {
    result
        .diagnostics
        .iter()
        .filter_map(|d| d.code.map(|c| c.0))
        .collect()
}

// ── Clean loads ─────────────────────────────────────────────────────────────

#[test]
fn clean_snapshot_has_no_diagnostics() {
    let result = load(
        NODES,
        r#"{"id": 20, "start": 15, "end": 17}, {"id": 21, "start": 19, "end": 2}"#,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let graph = &result.graph;
    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.links().len(), 2);
    assert_eq!(graph.link(LinkId(21)).unwrap().end, PinId(2));
    assert_eq!(graph.node(NodeId(5)).unwrap().position, [10.0, 20.0]);
    assert_eq!(graph.next_id(), 22);
    assert!(graph.check_consistency().is_ok());
}

#[test]
fn multi_input_order_survives_reload() {
    // a second sphere (20, out 24) feeds Input A
    let nodes = format!(r#"{}, {{"id": 20, "kind": "surface_sphere"}}"#, NODES);
    let result = load(
        &nodes,
        r#"{"id": 30, "start": 24, "end": 17},
           {"id": 31, "start": 15, "end": 18}, {"id": 32, "start": 9, "end": 18},
           {"id": 33, "start": 19, "end": 2}"#,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let multi = result.graph.pin(PinId(18)).unwrap();
    assert_eq!(multi.links, vec![PinId(15), PinId(9)]);

    let options = CodegenOptions {
        inline_parameters: true,
        ..CodegenOptions::default()
    };
    let code = generate(&result.graph, Variant::Surface, &options).unwrap();
    assert!(code.source.starts_with(
        "s=uSurf(uSurf(Surface(sdfSphere(pos+vec3(0.0,0.0,0.0),1.0)"
    ));
    let box_at = code.source.find("sdfBox").unwrap();
    let sphere_at = code.source.rfind("sdfSphere").unwrap();
    assert!(box_at < sphere_at);
}

#[test]
fn new_ids_continue_past_restored_ones() {
    let mut result = load(NODES, r#"{"id": 40, "start": 9, "end": 2}"#);
    let id = result
        .graph
        .add_node(aktino::registry::NodeKind::FloatConstant)
        .unwrap();
    assert_eq!(id, NodeId(41));
}

// ── Node diagnostics ────────────────────────────────────────────────────────

#[test]
fn duplicate_and_overlapping_node_ids() {
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 5, "kind": "float_constant"},
           {"id": 5, "kind": "float_constant"},
           {"id": 6, "kind": "input_time"},
           {"id": 3, "kind": "input_time"}"#,
        "",
    );
    assert_eq!(codes(&result), vec!["W0102", "W0102", "W0102"]);
    assert_eq!(result.graph.nodes().len(), 2);
}

#[test]
fn unknown_kind_and_extra_output() {
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 5, "kind": "output"},
           {"id": 9, "kind": "surface_torus"}"#,
        "",
    );
    assert_eq!(codes(&result), vec!["W0103", "W0101"]);
    assert_eq!(result.graph.nodes().len(), 1);
    assert_eq!(result.graph.output_id(), Some(NodeId(1)));
}

#[test]
fn parameter_length_is_repaired() {
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 5, "kind": "surface_sphere", "data": [0.5, 0.5]},
           {"id": 10, "kind": "vec3_scale", "data": [2.0, 2.0, 2.0, 9.0]}"#,
        "",
    );
    assert_eq!(codes(&result), vec!["W0104", "W0104"]);
    let sphere = result.graph.node(NodeId(5)).unwrap();
    assert_eq!(sphere.data, vec![0.5, 0.5, 1.0, 0.0, 0.0, 0.0, 1.0]);
    let scale = result.graph.node(NodeId(10)).unwrap();
    assert_eq!(scale.data, vec![2.0, 2.0, 2.0]);
    assert!(result.diagnostics[0].hint.is_some());
}

#[test]
fn missing_output_is_created() {
    let result = load(r#"{"id": 5, "kind": "surface_sphere"}"#, "");
    assert_eq!(codes(&result), vec!["W0105"]);
    let out = result.graph.output_node().unwrap();
    assert_eq!(out.id, NodeId(10));
}

#[test]
fn code_text_is_restored() {
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 5, "kind": "vec3_code", "code": "vec3(sin(t))"},
           {"id": 7, "kind": "float_constant", "code": "ignored"}"#,
        r#"{"id": 9, "start": 6, "end": 3}"#,
    );
    assert!(result.diagnostics.is_empty());
    let sky = generate(&result.graph, Variant::Sky, &CodegenOptions::default()).unwrap();
    assert_eq!(sky.source, "sky=vec3(sin(t));");
    assert_eq!(result.graph.node(NodeId(7)).unwrap().code, None);
}

// ── Link diagnostics ────────────────────────────────────────────────────────

#[test]
fn links_with_missing_endpoints_are_skipped() {
    let result = load(
        NODES,
        r#"{"id": 30, "start": 99, "end": 2}, {"id": 31, "start": 9, "end": 100}"#,
    );
    assert_eq!(codes(&result), vec!["W0201", "W0201"]);
    assert!(result.graph.links().is_empty());
}

#[test]
fn invalid_links_are_rejected() {
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 5, "kind": "surface_sphere"},
           {"id": 10, "kind": "vec3_translate"},
           {"id": 13, "kind": "vec3_scale"}"#,
        r#"{"id": 20, "start": 9, "end": 6},
           {"id": 21, "start": 12, "end": 14},
           {"id": 22, "start": 15, "end": 11},
           {"id": 23, "start": 9, "end": 9},
           {"id": 24, "start": 2, "end": 17}"#,
    );
    // type mismatch, accepted, cycle, same pin, endpoint 17 missing
    assert_eq!(codes(&result), vec!["W0202", "W0202", "W0202", "W0201"]);
    assert_eq!(result.graph.links().len(), 1);
    assert!(!result.graph.has_cycle());
}

#[test]
fn duplicate_link_ids_are_skipped() {
    let result = load(
        NODES,
        r#"{"id": 30, "start": 15, "end": 17},
           {"id": 30, "start": 9, "end": 18},
           {"id": 7, "start": 19, "end": 2}"#,
    );
    assert_eq!(codes(&result), vec!["W0203", "W0203"]);
    assert_eq!(result.graph.links().len(), 1);
}

#[test]
fn second_link_into_single_input_is_skipped() {
    let result = load(
        NODES,
        r#"{"id": 30, "start": 15, "end": 2}, {"id": 31, "start": 9, "end": 2}"#,
    );
    assert_eq!(codes(&result), vec!["W0202"]);
    assert_eq!(result.graph.links().len(), 1);
    assert_eq!(result.graph.link(LinkId(30)).unwrap().start, PinId(15));
    assert!(result.graph.link(LinkId(31)).is_none());
    assert!(!result.graph.pin(PinId(9)).unwrap().is_linked());
    assert!(result.graph.check_consistency().is_ok());
}

#[test]
fn repeated_link_under_a_new_id_is_skipped() {
    let result = load(
        NODES,
        r#"{"id": 30, "start": 15, "end": 18}, {"id": 31, "start": 15, "end": 18}"#,
    );
    assert_eq!(codes(&result), vec!["W0202"]);
    assert_eq!(result.graph.links().len(), 1);
    assert_eq!(result.graph.pin(PinId(18)).unwrap().links, vec![PinId(15)]);
}

// ── Id ceiling ──────────────────────────────────────────────────────────────

#[test]
fn node_range_past_the_ceiling_is_skipped() {
    // float_constant has one pin, so its range would end at u32::MAX
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 4294967294, "kind": "float_constant"}"#,
        "",
    );
    assert_eq!(codes(&result), vec!["W0102"]);
    assert_eq!(result.graph.nodes().len(), 1);
    assert_eq!(result.graph.next_id(), 5);
}

#[test]
fn link_id_past_the_ceiling_is_skipped() {
    let result = load(NODES, r#"{"id": 4294967295, "start": 9, "end": 2}"#);
    assert_eq!(codes(&result), vec!["W0203"]);
    assert!(result.graph.links().is_empty());

    let mut graph = result.graph;
    let id = graph.add_node(NodeKind::FloatConstant).unwrap();
    assert_eq!(id, NodeId(20));
}

#[test]
fn range_ending_at_the_ceiling_fills_the_id_space() {
    // surface_code has a single output pin, MAX_ID
    let result = load(
        r#"{"id": 1, "kind": "output"},
           {"id": 4294967293, "kind": "surface_code"}"#,
        "",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.graph.node(NodeId(MAX_ID - 1)).unwrap().last_id(), MAX_ID);

    let mut graph = result.graph;
    assert_eq!(
        graph.add_node(NodeKind::FloatConstant),
        Err(GraphError::IdSpaceExhausted)
    );
    assert_eq!(graph.create_link(PinId(MAX_ID), PinId(2)), Err(GraphError::IdSpaceExhausted));
    assert_eq!(graph.nodes().len(), 2);
    assert!(graph.links().is_empty());
    assert!(graph.check_consistency().is_ok());
}

#[test]
fn missing_output_with_no_room_is_an_error() {
    let result = load(r#"{"id": 4294967293, "kind": "float_constant"}"#, "");
    assert_eq!(codes(&result), vec!["E0106"]);
    assert!(has_errors(&result.diagnostics));
    assert_eq!(result.graph.output_id(), None);
}

#[test]
fn link_id_below_a_later_node_range_stays_unique() {
    // link 5 sits just below sphere 6 (pins 7, 8, 9, out 10)
    let result = load(
        r#"{"id": 1, "kind": "output"}, {"id": 6, "kind": "surface_sphere"}"#,
        r#"{"id": 5, "start": 10, "end": 2}"#,
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.graph.link(LinkId(5)).unwrap().start, PinId(10));

    let mut graph = result.graph;
    let node = graph.add_node(NodeKind::SurfaceSphere).unwrap();
    assert_eq!(node, NodeId(11));
    let out = graph.node(node).unwrap().outputs[0].id;
    let link = graph.create_link(out, PinId(2)).unwrap().link();
    assert!(link.0 > out.0);
    assert_ne!(link, LinkId(5));
    assert!(graph.link(LinkId(5)).is_none());
    assert_eq!(graph.links().len(), 1);
    assert!(graph.check_consistency().is_ok());
}

// ── Files ───────────────────────────────────────────────────────────────────

#[test]
fn write_then_read_file() {
    let graph = aktino::demo::scene().unwrap();
    let path = std::env::temp_dir().join(format!("aktino-persist-{}.json", std::process::id()));
    graph.save().write(&path).unwrap();
    let back = GraphSnapshot::read(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(back, graph.save());
}

#[test]
fn reading_a_missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("aktino-no-such-file.json");
    let err = GraphSnapshot::read(&path).unwrap_err();
    assert!(matches!(err, aktino::error::SnapshotError::Io { .. }));
    assert!(err.to_string().contains("aktino-no-such-file.json"));
}
