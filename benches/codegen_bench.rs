use aktino::codegen::{generate_all, CodegenOptions};
use aktino::graph::Graph;
use aktino::registry::NodeKind;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

// Scenarios: the demo scene, and a union of N boxes each moved by its own
// translate node (scales generation and the uniform accumulator).

fn union_of_boxes(n: usize) -> Graph {
    let mut graph = Graph::new();
    let out = graph.output_node().unwrap().inputs[0].id;
    let union = graph.add_node(NodeKind::SurfaceBoolean).unwrap();
    let (first, rest, union_out) = {
        let node = graph.node(union).unwrap();
        (node.inputs[0].id, node.inputs[1].id, node.outputs[0].id)
    };
    graph.create_link(union_out, out).unwrap();

    for i in 0..n {
        let b = graph.add_node(NodeKind::SurfaceBox).unwrap();
        let t = graph.add_node(NodeKind::Vec3Translate).unwrap();
        graph.set_param(t, 0, i as f32).unwrap();
        let t_out = graph.node(t).unwrap().outputs[0].id;
        let (b_pos, b_out) = {
            let node = graph.node(b).unwrap();
            (node.inputs[1].id, node.outputs[0].id)
        };
        graph.create_link(t_out, b_pos).unwrap();
        graph
            .create_link(b_out, if i == 0 { first } else { rest })
            .unwrap();
    }
    graph
}

fn bench_codegen(c: &mut Criterion) {
    let options = CodegenOptions::default();
    let demo = aktino::demo::scene().unwrap();
    c.bench_function("codegen/demo", |b| {
        b.iter(|| generate_all(black_box(&demo), &options).unwrap())
    });

    let mut group = c.benchmark_group("codegen/union_of_boxes");
    for n in [8, 64, 256] {
        let graph = union_of_boxes(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, g| {
            b.iter(|| generate_all(black_box(g), &options).unwrap())
        });
    }
    group.finish();
}

fn bench_graph(c: &mut Criterion) {
    c.bench_function("graph/build_256", |b| {
        b.iter(|| union_of_boxes(black_box(256)))
    });

    let snapshot = union_of_boxes(256).save();
    c.bench_function("graph/load_256", |b| {
        b.iter_batched(
            || snapshot.clone(),
            |s| Graph::load(&s),
            BatchSize::SmallInput,
        )
    });

    let graph = aktino::demo::scene().unwrap();
    let fragments = generate_all(&graph, &CodegenOptions::default()).unwrap();
    c.bench_function("uniforms/gather_demo", |b| {
        b.iter(|| fragments.uniforms.gather(black_box(&graph)))
    });
}

criterion_group!(benches, bench_codegen, bench_graph);
criterion_main!(benches);
