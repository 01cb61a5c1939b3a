use clap::Parser;
use std::path::{Path, PathBuf};

use aktino::codegen::{self, CodegenOptions, ShaderFragments};
use aktino::error::SnapshotError;
use aktino::graph::Graph;
use aktino::snapshot::GraphSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum EmitStage {
    Surface,
    Sky,
    Lights,
    All,
    Uniforms,
    Dot,
    Snapshot,
    Fingerprint,
}

#[derive(Parser, Debug)]
#[command(
    name = "aktino",
    version,
    about = "Aktino — generates raymarcher GLSL from saved node graphs"
)]
struct Cli {
    /// Input graph snapshot (.json)
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    graph: Option<PathBuf>,

    /// Use the built-in demo scene instead of a file
    #[arg(long)]
    demo: bool,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::All)]
    emit: EmitStage,

    /// Shader template to splice the fragments into (overrides --emit)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Inline every parameter as a literal instead of a uniform reference
    #[arg(long)]
    inline_params: bool,

    /// Name of the uniform float array
    #[arg(long, default_value = "uN")]
    uniform_array: String,

    /// Log graph mutations and generation passes
    #[arg(long)]
    verbose: bool,
}

fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("aktino: error: {}", message);
    std::process::exit(code);
}

fn load_graph(cli: &Cli) -> Graph {
    let Some(path) = &cli.graph else {
        return match aktino::demo::scene() {
            Ok(graph) => graph,
            Err(e) => fail(1, e),
        };
    };

    let snapshot = match GraphSnapshot::read(path) {
        Ok(s) => s,
        Err(e @ SnapshotError::Io { .. }) => fail(2, e),
        Err(e) => fail(1, format!("{}: {}", path.display(), e)),
    };
    let result = Graph::load(&snapshot);
    for diag in &result.diagnostics {
        eprintln!("aktino: {}", diag);
    }
    if aktino::diag::has_errors(&result.diagnostics) {
        std::process::exit(1);
    }
    log::info!(
        "loaded {}: {} nodes, {} links",
        path.display(),
        result.graph.nodes().len(),
        result.graph.links().len()
    );
    result.graph
}

fn generate(graph: &Graph, options: &CodegenOptions) -> ShaderFragments {
    match codegen::generate_all(graph, options) {
        Ok(f) => f,
        Err(e) => fail(1, e),
    }
}

fn render_uniforms(graph: &Graph, fragments: &ShaderFragments, array: &str) -> String {
    let values = fragments.uniforms.gather(graph);
    let mut out = String::new();
    for (i, (slot, value)) in fragments.uniforms.slots().iter().zip(values).enumerate() {
        out.push_str(&format!(
            "{}[{}] = {}  // {}[{}]\n",
            array,
            i,
            codegen::fmt_float(value),
            slot.node,
            slot.index
        ));
    }
    out
}

fn write_output(path: Option<&Path>, text: &str) {
    match path {
        Some(path) => {
            if let Err(e) = std::fs::write(path, text) {
                fail(2, format!("{}: {}", path.display(), e));
            }
        }
        None => print!("{}", text),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let graph = load_graph(&cli);
    let options = CodegenOptions {
        uniform_array: cli.uniform_array.clone(),
        inline_parameters: cli.inline_params,
    };

    // ── Template splicing ──
    if let Some(template_path) = &cli.template {
        let template = match std::fs::read_to_string(template_path) {
            Ok(t) => t,
            Err(e) => fail(2, format!("{}: {}", template_path.display(), e)),
        };
        let fragments = generate(&graph, &options);
        let shader = match aktino::template::splice(&template, &fragments) {
            Ok(s) => s,
            Err(e) => fail(1, format!("{}: {}", template_path.display(), e)),
        };
        write_output(cli.output.as_deref(), &shader);
        return;
    }

    let text = match cli.emit {
        EmitStage::Dot => aktino::dot::emit_dot(&graph),
        EmitStage::Snapshot => match graph.save().to_json() {
            Ok(json) => json + "\n",
            Err(e) => fail(1, e),
        },
        stage => {
            let fragments = generate(&graph, &options);
            match stage {
                EmitStage::Surface => format!("{}\n", fragments.surface),
                EmitStage::Sky => format!("{}\n", fragments.sky),
                EmitStage::Lights => format!("{}\n", fragments.lights),
                EmitStage::Uniforms => render_uniforms(&graph, &fragments, &options.uniform_array),
                EmitStage::Fingerprint => format!("{}\n", fragments.fingerprint()),
                _ => format!(
                    "// surface\n{}\n// sky\n{}\n// lights\n{}\n",
                    fragments.surface, fragments.sky, fragments.lights
                ),
            }
        }
    };
    write_output(cli.output.as_deref(), &text);
}
