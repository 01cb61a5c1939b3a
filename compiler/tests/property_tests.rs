// Property-based tests for graph invariants.
//
// Four categories:
// 1. Random link sequences: the graph stays acyclic and consistent, single
//    inputs hold at most one link, and rejections change nothing
// 2. Replace / append: a committed link always ends up in adjacency
// 3. Generation idempotence on random graphs
// 4. Save → load round trip preserves structure and generated code
//
// Uses proptest with explicit configuration to prevent CI flakiness.

use aktino::codegen::{generate_all, CodegenOptions};
use aktino::graph::{Graph, LinkOutcome};
use aktino::id::PinId;
use aktino::pin::PinKind;
use aktino::registry::{NodeKind, ALL_KINDS};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Graph generator ─────────────────────────────────────────────────────────

/// A graph holding the output node plus the given kinds (output excluded),
/// and the list of every pin id in it.
fn build_nodes(kinds: &[usize]) -> (Graph, Vec<PinId>) {
    let mut graph = Graph::new();
    let addable: Vec<NodeKind> = ALL_KINDS
        .iter()
        .copied()
        .filter(|k| *k != NodeKind::Output)
        .collect();
    for k in kinds {
        graph.add_node(addable[k % addable.len()]).unwrap();
    }
    let pins = graph
        .nodes()
        .iter()
        .flat_map(|n| n.pins().map(|p| p.id))
        .collect();
    (graph, pins)
}

/// Apply link attempts, asserting per-step invariants.
fn apply_links(
    graph: &mut Graph,
    pins: &[PinId],
    attempts: &[(Index, Index)],
) -> Result<(), TestCaseError> {
    for (a, b) in attempts {
        let a = pins[a.index(pins.len())];
        let b = pins[b.index(pins.len())];
        let before = graph.save();
        match graph.create_link(a, b) {
            Ok(LinkOutcome::Existing(_)) => {
                prop_assert_eq!(graph.save(), before);
            }
            Ok(outcome) => {
                let link = *graph.link(outcome.link()).unwrap();
                let end = graph.pin(link.end).unwrap();
                prop_assert!(end.is_linked_to(link.start));
                prop_assert!(graph.pin(link.start).unwrap().is_linked_to(link.end));
                if end.kind == PinKind::Input {
                    prop_assert_eq!(end.links.len(), 1);
                }
            }
            Err(_) => {
                prop_assert_eq!(graph.save(), before);
            }
        }
    }
    Ok(())
}

fn arb_scene() -> impl Strategy<Value = (Vec<usize>, Vec<(Index, Index)>)> {
    (
        prop::collection::vec(0usize..16, 1..12),
        prop::collection::vec((any::<Index>(), any::<Index>()), 0..60),
    )
}

// ── Link invariants ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 200,
        .. ProptestConfig::default()
    })]

    #[test]
    fn random_links_keep_graph_valid((kinds, attempts) in arb_scene()) {
        let (mut graph, pins) = build_nodes(&kinds);
        apply_links(&mut graph, &pins, &attempts)?;

        prop_assert!(!graph.has_cycle());
        let consistency = graph.check_consistency();
        prop_assert!(consistency.is_ok(), "{:?}", consistency);
        for node in graph.nodes() {
            for pin in &node.inputs {
                if pin.kind == PinKind::Input {
                    prop_assert!(pin.links.len() <= 1);
                }
            }
        }
    }

    #[test]
    fn removing_nodes_leaves_no_dangling_links((kinds, attempts) in arb_scene(), victim in any::<Index>()) {
        let (mut graph, pins) = build_nodes(&kinds);
        apply_links(&mut graph, &pins, &attempts)?;

        let ids: Vec<_> = graph.nodes().iter().map(|n| n.id).collect();
        let id = ids[victim.index(ids.len())];
        let is_output = Some(id) == graph.output_id();
        prop_assert_eq!(graph.remove_node(id).is_ok(), !is_output);

        let consistency = graph.check_consistency();
        prop_assert!(consistency.is_ok(), "{:?}", consistency);
        for link in graph.links() {
            prop_assert!(graph.pin(link.start).is_some());
            prop_assert!(graph.pin(link.end).is_some());
        }
    }
}

// ── Generation and persistence ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 50,
        max_shrink_iters: 100,
        .. ProptestConfig::default()
    })]

    #[test]
    fn generation_is_idempotent((kinds, attempts) in arb_scene(), inline in any::<bool>()) {
        let (mut graph, pins) = build_nodes(&kinds);
        apply_links(&mut graph, &pins, &attempts)?;
        let options = CodegenOptions { inline_parameters: inline, ..CodegenOptions::default() };

        let first = generate_all(&graph, &options).unwrap();
        let second = generate_all(&graph, &options).unwrap();
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn save_load_round_trip((kinds, attempts) in arb_scene()) {
        let (mut graph, pins) = build_nodes(&kinds);
        apply_links(&mut graph, &pins, &attempts)?;

        let json = graph.save().to_json().unwrap();
        let snapshot = aktino::snapshot::GraphSnapshot::from_json(&json).unwrap();
        let loaded = Graph::load(&snapshot);
        prop_assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
        prop_assert_eq!(loaded.graph.save(), graph.save());
        prop_assert_eq!(loaded.graph.next_id(), graph.next_id());

        let options = CodegenOptions::default();
        prop_assert_eq!(
            generate_all(&loaded.graph, &options).unwrap(),
            generate_all(&graph, &options).unwrap()
        );
    }
}
