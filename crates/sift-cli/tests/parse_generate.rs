//! Integration tests for `sift parse` and `sift generate`.

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn sift() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sift"))
}

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_parse_prints_tree() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.js"), "import x from './x';\nx();\n");

    let output = sift().args(["parse", "a.js", "--cwd"]).arg(dir.path()).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Program"), "{stdout}");
    assert!(stdout.contains("Import"), "{stdout}");
}

#[test]
fn test_parse_script_rejects_import() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.js"), "import x from './x';\n");

    let output = sift()
        .args(["parse", "a.js", "--script", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_generate_formats_source() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.js"), "if(a){b()}else{c()}");

    let output = sift().args(["generate", "a.js", "--cwd"]).arg(dir.path()).output().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("if (a) {\n  b();\n}"), "{stdout}");
}

#[test]
fn test_generate_minify_and_lower() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.js"), "const greeting = `hello ${name}`;\nconsole.log(greeting ?? 'none');\n");

    let output = sift()
        .args(["generate", "a.js", "--lower", "--minify", "--cwd"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains('`'), "{stdout}");
    assert!(!stdout.contains("??"), "{stdout}");
    assert!(stdout.contains("\"hello \"+name"), "{stdout}");
}

#[test]
fn test_generate_reports_syntax_error_location() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("bad.js"), "let = ;");

    let output = sift().args(["generate", "bad.js", "--cwd"]).arg(dir.path()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.js:1:"), "stderr: {stderr}");
}
