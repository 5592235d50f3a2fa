//! Integration tests for `sift bundle`.
//!
//! These tests verify:
//! - `--json` output is always valid JSON with an `ok` boolean
//! - Error codes are SCREAMING_SNAKE_CASE
//! - No output file is written when bundling fails
//! - Images are copied next to the bundle

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn sift() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sift"))
}

fn write(path: &Path, content: impl AsRef<[u8]>) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn is_screaming_snake_case(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[test]
fn test_bundle_json_success() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("src/main.js"), "import { add } from './math';\nconsole.log(add(1, 2));\n");
    write(&dir.path().join("src/math.js"), "export const add = (a, b) => a + b;\n");

    let output = sift()
        .args(["bundle", "src/main.js", "-o", "build/main.bundle.js", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], true);
    assert_eq!(json["modules"].as_array().unwrap().len(), 2);
    assert!(json["size_bytes"].as_u64().unwrap() > 0);
    assert!(json.get("error").is_none());

    let code = std::fs::read_to_string(dir.path().join("build/main.bundle.js")).unwrap();
    assert!(code.starts_with("(function"), "{code}");
    assert!(code.contains("console.log"));
}

#[test]
fn test_bundle_missing_import_json_error() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("main.js"), "import x from './util';\n");
    write(&dir.path().join("out.js"), "previous");

    let output = sift()
        .args(["bundle", "main.js", "-o", "out.js", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], false);
    let code = json["error"]["code"].as_str().unwrap();
    assert_eq!(code, "JS_IMPORTED_MODULE_MISSING");
    assert!(is_screaming_snake_case(code));
    assert!(json["error"]["message"].as_str().unwrap().contains("./util"));

    let previous = std::fs::read_to_string(dir.path().join("out.js")).unwrap();
    assert_eq!(previous, "previous", "failed bundles must not overwrite output");
}

#[test]
fn test_bundle_syntax_error_human_output() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("main.js"), "let a = 1;\nlet b = ;\n");

    let output = sift()
        .args(["bundle", "main.js", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("main.js:2:"), "stderr: {stderr}");
}

#[test]
fn test_bundle_to_stdout_minified() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("main.js"), "const message = 'hi';\nconsole.log(message);\n");

    let output = sift()
        .args(["bundle", "main.js", "--minify", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains('\n'), "{stdout}");
    assert!(stdout.contains("console.log"));
    assert!(!stdout.contains("message"), "locals are mangled: {stdout}");
}

#[test]
fn test_bundle_copies_images() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("main.js"), "import a from './a/logo.png';\nimport b from './b/logo.png';\nshow(a, b);\n");
    write(&dir.path().join("a/logo.png"), b"\x89PNG\r\n\x1a\na");
    write(&dir.path().join("b/logo.png"), b"\x89PNG\r\n\x1a\nb");

    let output = sift()
        .args(["bundle", "main.js", "-o", "dist/app.js", "--json", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["images"], serde_json::json!(["logo.png", "logo-1.png"]));
    assert_eq!(std::fs::read(dir.path().join("dist/logo.png")).unwrap(), b"\x89PNG\r\n\x1a\na");
    assert_eq!(std::fs::read(dir.path().join("dist/logo-1.png")).unwrap(), b"\x89PNG\r\n\x1a\nb");
}

#[test]
fn test_bundle_reads_config_file() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("sift.json"), r#"{"bundle": {"allowJSX": true, "format": false}}"#);
    write(&dir.path().join("main.js"), "document.body.appendChild(<b>bold</b>);\n");

    let output = sift()
        .args(["bundle", "main.js", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("createElement"), "{stdout}");
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("sift.json"), "{ not json");
    write(&dir.path().join("main.js"), "run();\n");

    let output = sift()
        .args(["bundle", "main.js", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run bundle command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sift.json"), "stderr: {stderr}");
}
