//! End-to-end bundling over real module graphs on disk.

use sift_core::bundler::Bundler;
use sift_core::config::BundleOptions;
use sift_parser::{parse, ParserOptions, SourceType};
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: impl AsRef<[u8]>) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn compact() -> BundleOptions {
    BundleOptions::default().with_format(false)
}

#[test]
fn shared_dependency_is_initialized_by_one_function() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import './a'; import './b';");
    write(&root.join("a.js"), "import { n } from './shared'; log('a', n);");
    write(&root.join("b.js"), "import { n } from './shared'; log('b', n);");
    write(&root.join("shared.js"), "export const n = 1; log('shared');");

    let output = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap();

    assert_eq!(output.modules.len(), 4);
    assert_eq!(output.code.matches("log(\"shared\")").count(), 1);
    assert_eq!(output.code.matches("function _m").count(), 4);
    // Both importers call the one initializer of `shared.js`.
    assert_eq!(output.code.matches("function _m4(){").count(), 1, "{}", output.code);
    assert_eq!(output.code.matches("var n=_m4().n;").count(), 2, "{}", output.code);
    // Discovery is depth-first in import order.
    let names: Vec<_> = output
        .modules
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["main.js", "a.js", "shared.js", "b.js"]);
}

#[test]
fn import_without_extension_resolves() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import util from './util'; util();");
    write(&root.join("util.js"), "export default function util() {}");

    let output = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap();
    assert!(output.modules.iter().any(|p| p.ends_with("util.js")));
    assert!(output.code.contains("function util(){}"), "{}", output.code);
}

#[test]
fn missing_import_names_specifier_and_location() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import x from './util';");

    let err = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap_err();
    assert_eq!(err.code(), "JS_IMPORTED_MODULE_MISSING");
    let message = err.to_string();
    assert!(message.starts_with("Cannot find module './util'"), "{message}");
    assert!(message.ends_with("main.js:1:11"), "{message}");
}

#[test]
fn syntax_error_reports_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import './bad';");
    write(&root.join("bad.js"), "let a = 1;\nlet b = ;");

    let err = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap_err();
    assert_eq!(err.code(), "EXPRESSION_EXPECTED");
    assert!(err.path().unwrap().ends_with("bad.js"));
    assert_eq!(err.location().unwrap().line, 2);
}

#[test]
fn colliding_image_names_are_suffixed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("main.js"),
        "import a from './one/icon.png'; import b from './two/icon.png'; show(a, b);",
    );
    write(&root.join("one/icon.png"), b"\x89PNG\r\n\x1a\n");
    write(&root.join("two/icon.png"), b"\x89PNG\r\n\x1a\n");

    let output = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap();
    let names: Vec<_> = output.images.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["icon.png", "icon-1.png"]);
    assert!(output.code.contains("var a=\"icon.png\";"), "{}", output.code);
    assert!(output.code.contains("var b=\"icon-1.png\";"), "{}", output.code);
}

#[test]
fn image_type_checking_rejects_mislabelled_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import logo from './logo.png';");
    write(&root.join("logo.png"), "not an image");

    let lenient = Bundler::new(compact()).bundle(&root.join("main.js"));
    assert!(lenient.is_ok());

    let strict = BundleOptions::default().with_check_image_types(true);
    let err = Bundler::new(strict).bundle(&root.join("main.js")).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_IMAGE_FORMAT");
}

#[test]
fn stylesheets_are_collected_not_bundled() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import './app.css'; import './b'; start();");
    write(&root.join("b.js"), "import './app.css';");
    write(&root.join("app.css"), "body { margin: 0 }");

    let output = Bundler::new(compact()).bundle(&root.join("main.js")).unwrap();
    assert_eq!(output.stylesheets.len(), 1);
    assert!(output.stylesheets[0].ends_with("app.css"));
    assert!(!output.code.contains("margin"));
}

#[test]
fn jsx_emits_factory_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import './view'; document.body.appendChild(<p>hi</p>);");
    write(&root.join("view.js"), "export const view = <div class=\"x\" />;");

    let output = Bundler::new(compact().with_jsx(true))
        .bundle(&root.join("main.js"))
        .unwrap();
    assert_eq!(output.code.matches("function _h1(").count(), 1, "{}", output.code);
    assert!(output.code.contains("_h1(\"p\""), "{}", output.code);
    assert!(output.code.contains("document.createElement"));
}

#[test]
fn no_jsx_no_factory() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "run();");

    let output = Bundler::new(compact().with_jsx(true))
        .bundle(&root.join("main.js"))
        .unwrap();
    assert!(!output.code.contains("createElement"));
}

#[test]
fn minified_output_is_valid_script() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("main.js"),
        "import { greet } from './greet';\nconst message = `hello ${greet('you')}`;\nconsole.log(message);\n",
    );
    write(
        &root.join("greet.js"),
        "export function greet(name = 'world', ...rest) {\n  const { length } = rest;\n  return name + length;\n}\n",
    );

    let output = Bundler::new(BundleOptions::default().with_minify(true))
        .bundle(&root.join("main.js"))
        .unwrap();
    assert!(!output.code.contains('\n'));
    assert!(output.code.starts_with("(function(){"), "{}", output.code);
    assert!(output.code.contains("console.log"));

    let options = ParserOptions::default().with_source_type(SourceType::Script);
    assert!(parse(&output.code, options).is_ok(), "{}", output.code);
}

#[test]
fn formatted_output_reparses() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("main.js"), "import * as m from './m';\nif (m.ok) { m.run(); } else { stop(); }\n");
    write(&root.join("m.js"), "export let ok = true;\nexport function run() { return a?.b ?? 1; }\n");

    let output = Bundler::new(BundleOptions::default()).bundle(&root.join("main.js")).unwrap();
    assert!(output.code.contains('\n'));
    let options = ParserOptions::default().with_source_type(SourceType::Script);
    assert!(parse(&output.code, options).is_ok(), "{}", output.code);
}
