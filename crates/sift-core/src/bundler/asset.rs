//! Bundled files and how each kind is handled.

use crate::config::BundleOptions;
use sift_parser::Program;
use std::path::{Path, PathBuf};

/// How a file takes part in a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// JavaScript/JSX: parsed, wrapped and merged into the bundle.
    Script,
    /// CSS: recorded as a stylesheet reference for the document.
    Stylesheet,
    /// Image: renamed into the output directory.
    Image,
    /// Anything else: copied as-is and referenced by file name.
    Opaque,
}

impl AssetKind {
    /// Determine the kind of `path` from its extension.
    #[must_use]
    pub fn classify(path: &Path, options: &BundleOptions) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Self::Script,
            "css" => Self::Stylesheet,
            _ if is_image_extension(&ext) && !options.write_images_into_bundle => Self::Image,
            _ => Self::Opaque,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
            Self::Opaque => "opaque",
        }
    }
}

/// Extensions handled as images.
#[must_use]
pub fn is_image_extension(ext: &str) -> bool {
    matches!(
        ext,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif"
    )
}

/// A resolved import of an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The specifier as written.
    pub specifier: String,
    /// Absolute path it resolved to.
    pub path: PathBuf,
}

/// One file of the bundle.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Absolute, canonical path.
    pub path: PathBuf,
    pub kind: AssetKind,
    /// Parsed source of a script.
    pub program: Option<Program>,
    /// Imports, in source order.
    pub dependencies: Vec<Dependency>,
}

impl Asset {
    /// A file with no further expansion.
    #[must_use]
    pub fn leaf(path: PathBuf, kind: AssetKind) -> Self {
        Self {
            path,
            kind,
            program: None,
            dependencies: Vec::new(),
        }
    }

    /// The resolved path of `specifier`.
    #[must_use]
    pub fn dependency(&self, specifier: &str) -> Option<&Path> {
        self.dependencies
            .iter()
            .find(|d| d.specifier == specifier)
            .map(|d| d.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let options = BundleOptions::default();
        assert_eq!(AssetKind::classify(Path::new("a.js"), &options), AssetKind::Script);
        assert_eq!(AssetKind::classify(Path::new("a.JSX"), &options), AssetKind::Script);
        assert_eq!(AssetKind::classify(Path::new("a.css"), &options), AssetKind::Stylesheet);
        assert_eq!(AssetKind::classify(Path::new("a.png"), &options), AssetKind::Image);
        assert_eq!(AssetKind::classify(Path::new("a.woff2"), &options), AssetKind::Opaque);
        assert_eq!(AssetKind::classify(Path::new("LICENSE"), &options), AssetKind::Opaque);
    }

    #[test]
    fn test_images_written_into_bundle_are_opaque() {
        let options = BundleOptions {
            write_images_into_bundle: true,
            ..BundleOptions::default()
        };
        assert_eq!(AssetKind::classify(Path::new("a.png"), &options), AssetKind::Opaque);
    }
}
