// Reproducibility tests for the command-line front end.
//
// These tests verify that the binary produces byte-identical output for
// identical inputs, and that a saved graph regenerates the same shader as
// the graph it was saved from.

use std::path::PathBuf;
use std::process::Command;

fn aktino_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_aktino"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("aktino-{}-{}", std::process::id(), name))
}

fn run_aktino(args: &[&str]) -> String {
    let output = Command::new(aktino_binary())
        .args(args)
        .output()
        .expect("failed to run aktino");
    assert!(
        output.status.success(),
        "aktino failed with args {:?}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("non-UTF8 output")
}

fn exit_code(args: &[&str]) -> Option<i32> {
    Command::new(aktino_binary())
        .args(args)
        .output()
        .expect("failed to run aktino")
        .status
        .code()
}

/// Generating the demo scene twice produces byte-identical fragments.
#[test]
fn demo_output_is_identical_across_runs() {
    for emit in ["all", "uniforms", "dot", "snapshot"] {
        let first = run_aktino(&["--demo", "--emit", emit]);
        let second = run_aktino(&["--demo", "--emit", emit]);
        assert_eq!(first, second, "--emit {} differs across runs", emit);
        assert!(!first.is_empty());
    }
}

/// A snapshot written by the binary regenerates the same shader.
#[test]
fn saved_snapshot_regenerates_same_fingerprint() {
    let path = temp_path("demo.json");
    let path_str = path.to_str().unwrap();
    run_aktino(&["--demo", "--emit", "snapshot", "-o", path_str]);

    let from_demo = run_aktino(&["--demo", "--emit", "fingerprint"]);
    let from_file = run_aktino(&[path_str, "--emit", "fingerprint"]);
    std::fs::remove_file(&path).ok();

    assert_eq!(from_demo, from_file);
    assert_eq!(from_demo.trim().len(), 64);
}

#[test]
fn inline_params_change_the_fingerprint() {
    let uniform = run_aktino(&["--demo", "--emit", "fingerprint"]);
    let inline = run_aktino(&["--demo", "--emit", "fingerprint", "--inline-params"]);
    assert_ne!(uniform, inline);
}

#[test]
fn template_is_spliced() {
    let template = temp_path("raymarch.frag");
    let shader = temp_path("raymarch.out.frag");
    std::fs::write(
        &template,
        "void scene() {\n    // !sdf_inline\n}\nvoid sky() {\n    // !sky_inline\n}\nvoid lights() {\n    // !lights_inline\n}\n",
    )
    .unwrap();

    run_aktino(&[
        "--demo",
        "--template",
        template.to_str().unwrap(),
        "-o",
        shader.to_str().unwrap(),
    ]);
    let text = std::fs::read_to_string(&shader).unwrap();
    std::fs::remove_file(&template).ok();
    std::fs::remove_file(&shader).ok();

    assert!(text.contains("    s=uSurf(uSurf(Surface(sdfBox("));
    assert!(text.contains("    sky=vec3(uN[30],uN[31],uN[32]);\n    // !sky_inline"));
    assert!(text.contains("nl=1;\n    // !lights_inline"));
}

#[test]
fn exit_codes() {
    // missing file → I/O error
    let missing = temp_path("missing.json");
    assert_eq!(exit_code(&[missing.to_str().unwrap()]), Some(2));

    // malformed snapshot → graph error
    let bad = temp_path("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    let code = exit_code(&[bad.to_str().unwrap()]);
    std::fs::remove_file(&bad).ok();
    assert_eq!(code, Some(1));

    // no output and no room to add one → error diagnostic
    let full = temp_path("full.json");
    std::fs::write(
        &full,
        r#"{"nodes": [{"id": 4294967293, "kind": "surface_code"}], "links": []}"#,
    )
    .unwrap();
    let code = exit_code(&[full.to_str().unwrap()]);
    std::fs::remove_file(&full).ok();
    assert_eq!(code, Some(1));

    // template without markers → graph error
    let template = temp_path("plain.frag");
    std::fs::write(&template, "void main() {}\n").unwrap();
    let code = exit_code(&["--demo", "--template", template.to_str().unwrap()]);
    std::fs::remove_file(&template).ok();
    assert_eq!(code, Some(1));
}
