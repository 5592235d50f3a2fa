use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "sift.json";

/// Project configuration, read from `sift.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory source files are read from.
    pub root_dir: PathBuf,

    /// Directory bundles are written to.
    pub out_dir: PathBuf,

    /// Options for every bundle built in this project.
    pub bundle: BundleOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("build"),
            bundle: BundleOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `sift.json` from `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// Set the bundle options.
    #[must_use]
    pub fn with_bundle(mut self, bundle: BundleOptions) -> Self {
        self.bundle = bundle;
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: PathBuf) -> Self {
        self.out_dir = out_dir;
        self
    }
}

/// Options for one bundle invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct BundleOptions {
    /// Parse JSX and resolve `.jsx` files.
    #[serde(alias = "allowJSX")]
    pub allow_jsx: bool,

    /// Accepted for compatibility; no source maps are produced.
    pub source_maps: bool,

    /// Mangle names and print without whitespace.
    pub minify: bool,

    /// Print with newlines and indentation (ignored when minifying).
    pub format: bool,

    /// Indentation unit for formatted output.
    pub indent: String,

    /// Treat images as opaque files instead of renamed image assets.
    pub write_images_into_bundle: bool,

    /// Reject images whose contents do not match their extension.
    pub check_image_types: bool,

    /// Inline bundles into documents instead of writing `<name>.bundle.js`.
    #[serde(alias = "internalJS")]
    pub internal_js: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            allow_jsx: false,
            source_maps: false,
            minify: false,
            format: true,
            indent: "  ".to_string(),
            write_images_into_bundle: false,
            check_image_types: false,
            internal_js: false,
        }
    }
}

impl BundleOptions {
    #[must_use]
    pub fn with_jsx(mut self, allow_jsx: bool) -> Self {
        self.allow_jsx = allow_jsx;
        self
    }

    #[must_use]
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_check_image_types(mut self, check: bool) -> Self {
        self.check_image_types = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.bundle.format);
        assert_eq!(config.bundle.indent, "  ");
    }

    #[test]
    fn test_camel_case_fields_and_partial_objects() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"outDir": "dist", "bundle": {"allowJSX": true, "checkImageTypes": true, "internalJs": true}}"#,
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("dist"));
        assert_eq!(config.root_dir, PathBuf::from("src"));
        assert!(config.bundle.allow_jsx);
        assert!(config.bundle.check_image_types);
        assert!(config.bundle.internal_js);
        assert!(!config.bundle.minify);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_PARSE");
    }

    #[test]
    fn test_builders() {
        let options = BundleOptions::default().with_jsx(true).with_minify(true).with_format(false);
        assert!(options.allow_jsx && options.minify && !options.format);
        let config = Config::default().with_bundle(options.clone()).with_out_dir(PathBuf::from("out"));
        assert_eq!(config.bundle, options);
        assert_eq!(config.out_dir, PathBuf::from("out"));
    }
}
