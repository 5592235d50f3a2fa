//! Import specifier resolution.
//!
//! Candidates are tried in a fixed order and the first existing file wins:
//!
//! 1. the path itself
//! 2. path + `.js`
//! 3. path + `/index.js`
//! 4. path + `.jsx`, path + `/index.jsx` (JSX enabled only)
//! 5. for bare specifiers (`lodash`, `@scope/pkg/sub`), the package under
//!    the nearest `node_modules`: its `package.json` `main`, else `index.js`

use std::path::{Path, PathBuf};

/// Import resolver for one bundle.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    allow_jsx: bool,
}

impl Resolver {
    #[must_use]
    pub fn new(allow_jsx: bool) -> Self {
        Self { allow_jsx }
    }

    /// Resolve `specifier` as imported from the file `from`.
    #[must_use]
    pub fn resolve(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        let from_dir = from.parent().unwrap_or(Path::new("."));
        let target = from_dir.join(specifier);

        if let Some(found) = self.resolve_file(&target) {
            return Some(found);
        }
        if is_bare(specifier) {
            return self.resolve_package(specifier, from_dir);
        }
        None
    }

    /// Try `target` and its extension/index fallbacks.
    fn resolve_file(&self, target: &Path) -> Option<PathBuf> {
        let base = target.as_os_str().to_string_lossy();
        let mut candidates = vec![
            target.to_path_buf(),
            PathBuf::from(format!("{base}.js")),
            target.join("index.js"),
        ];
        if self.allow_jsx {
            candidates.push(PathBuf::from(format!("{base}.jsx")));
            candidates.push(target.join("index.jsx"));
        }
        candidates.into_iter().find(|c| c.is_file()).map(canonical)
    }

    /// Look for the package in `node_modules` directories from `dir` up.
    fn resolve_package(&self, specifier: &str, dir: &Path) -> Option<PathBuf> {
        let (pkg_name, subpath) = parse_bare_specifier(specifier);

        for ancestor in dir.ancestors() {
            let pkg_dir = ancestor.join("node_modules").join(&pkg_name);
            if !pkg_dir.is_dir() {
                continue;
            }
            tracing::trace!(specifier, package = %pkg_dir.display(), "found package");

            if let Some(sub) = subpath {
                return self.resolve_file(&pkg_dir.join(sub));
            }
            if let Some(main) = package_main(&pkg_dir) {
                if let Some(found) = self.resolve_file(&pkg_dir.join(main)) {
                    return Some(found);
                }
            }
            let index = pkg_dir.join("index.js");
            return index.is_file().then(|| canonical(index));
        }
        None
    }
}

/// Whether `specifier` names a package rather than a path.
#[must_use]
pub fn is_bare(specifier: &str) -> bool {
    !(specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || Path::new(specifier).is_absolute())
}

/// Split a bare specifier into package name and subpath.
fn parse_bare_specifier(specifier: &str) -> (String, Option<&str>) {
    let mut parts = specifier.splitn(3, '/');
    let first = parts.next().unwrap_or_default();
    if first.starts_with('@') {
        match parts.next() {
            Some(name) => (format!("{first}/{name}"), parts.next()),
            None => (specifier.to_string(), None),
        }
    } else {
        let rest = specifier.split_once('/').map(|(_, sub)| sub);
        (first.to_string(), rest)
    }
}

/// The `main` field of the package's `package.json`.
fn package_main(pkg_dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(pkg_dir.join("package.json")).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    json.get("main")?.as_str().map(str::to_string)
}

fn canonical(path: PathBuf) -> PathBuf {
    dunce::canonicalize(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_bare_specifier() {
        assert_eq!(parse_bare_specifier("lodash"), ("lodash".to_string(), None));
        assert_eq!(parse_bare_specifier("lodash/get"), ("lodash".to_string(), Some("get")));
        assert_eq!(parse_bare_specifier("@types/node"), ("@types/node".to_string(), None));
        assert_eq!(
            parse_bare_specifier("@babel/core/lib/parse"),
            ("@babel/core".to_string(), Some("lib/parse"))
        );
    }

    #[test]
    fn test_is_bare() {
        assert!(is_bare("react"));
        assert!(is_bare("@scope/pkg"));
        assert!(!is_bare("./util"));
        assert!(!is_bare("../util"));
    }

    #[test]
    fn test_extension_fallback() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("util.js"), "");

        let found = Resolver::new(false).resolve("./util", &main).unwrap();
        assert!(found.ends_with("util.js"));
        assert!(Resolver::new(false).resolve("./missing", &main).is_none());
    }

    #[test]
    fn test_exact_path_wins_over_fallbacks() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("util"), "");
        write(&dir.path().join("util.js"), "");

        let found = Resolver::new(false).resolve("./util", &main).unwrap();
        assert_eq!(found.file_name().unwrap(), "util");
    }

    #[test]
    fn test_directory_index() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("lib/index.js"), "");

        let found = Resolver::new(false).resolve("./lib", &main).unwrap();
        assert!(found.ends_with("lib/index.js"));
    }

    #[test]
    fn test_jsx_candidates_need_jsx() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("main.js");
        write(&main, "");
        write(&dir.path().join("App.jsx"), "");
        write(&dir.path().join("views/index.jsx"), "");

        assert!(Resolver::new(false).resolve("./App", &main).is_none());
        assert!(Resolver::new(true).resolve("./App", &main).unwrap().ends_with("App.jsx"));
        assert!(Resolver::new(true).resolve("./views", &main).unwrap().ends_with("views/index.jsx"));
    }

    #[test]
    fn test_package_main_and_index() {
        let dir = tempdir().unwrap();
        let main = dir.path().join("src/main.js");
        write(&main, "");
        write(
            &dir.path().join("node_modules/with-main/package.json"),
            r#"{"name": "with-main", "main": "lib/entry"}"#,
        );
        write(&dir.path().join("node_modules/with-main/lib/entry.js"), "");
        write(&dir.path().join("node_modules/plain/index.js"), "");
        write(&dir.path().join("node_modules/@s/p/sub/x.js"), "");

        let resolver = Resolver::new(false);
        assert!(resolver.resolve("with-main", &main).unwrap().ends_with("lib/entry.js"));
        assert!(resolver.resolve("plain", &main).unwrap().ends_with("plain/index.js"));
        assert!(resolver.resolve("@s/p/sub/x", &main).unwrap().ends_with("sub/x.js"));
        assert!(resolver.resolve("absent", &main).is_none());
    }
}
