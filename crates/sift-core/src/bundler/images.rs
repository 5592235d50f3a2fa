//! Output names for image assets.
//!
//! The first image to claim a file name keeps it. A later image with the
//! same name from another directory becomes `name-N.ext` with the smallest
//! free `N`. The same source path always maps to the same output name.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap as HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ImageNames {
    by_name: HashMap<String, PathBuf>,
    by_path: HashMap<PathBuf, String>,
    /// `(output name, source path)` in allocation order.
    order: Vec<(String, PathBuf)>,
}

impl ImageNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The output name of the image at `path`.
    pub fn name_for(&mut self, path: &Path) -> String {
        if let Some(name) = self.by_path.get(path) {
            return name.clone();
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let mut name = format!("{stem}{ext}");
        let mut n = 1;
        while self.by_name.contains_key(&name) {
            name = format!("{stem}-{n}{ext}");
            n += 1;
        }

        tracing::debug!(path = %path.display(), name = %name, "named image");
        self.by_name.insert(name.clone(), path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), name.clone());
        self.order.push((name.clone(), path.to_path_buf()));
        name
    }

    /// Every allocated `(output name, source path)` pair.
    #[must_use]
    pub fn pairs(&self) -> &[(String, PathBuf)] {
        &self.order
    }

    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, PathBuf)> {
        self.order
    }
}

/// Fail with `UNSUPPORTED_IMAGE_FORMAT` unless the contents of `path` look
/// like the format its extension names.
pub fn check_format(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;
    if matches_extension(&ext, &bytes) {
        Ok(())
    } else {
        Err(Error::UnsupportedImageFormat {
            path: path.to_path_buf(),
        })
    }
}

fn matches_extension(ext: &str, bytes: &[u8]) -> bool {
    match ext {
        "png" => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "jpg" | "jpeg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "webp" => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        "bmp" => bytes.starts_with(b"BM"),
        "ico" => bytes.starts_with(&[0, 0, 1, 0]),
        "avif" => bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && &bytes[8..12] == b"avif",
        "svg" => {
            let head = &bytes[..bytes.len().min(1024)];
            String::from_utf8_lossy(head).contains("<svg")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_colliding_names_get_suffixes() {
        let mut names = ImageNames::new();
        assert_eq!(names.name_for(Path::new("/a/icon.png")), "icon.png");
        assert_eq!(names.name_for(Path::new("/b/icon.png")), "icon-1.png");
        assert_eq!(names.name_for(Path::new("/c/icon.png")), "icon-2.png");
        assert_eq!(names.name_for(Path::new("/a/logo.png")), "logo.png");
    }

    #[test]
    fn test_same_path_same_name() {
        let mut names = ImageNames::new();
        let first = names.name_for(Path::new("/b/icon.png"));
        names.name_for(Path::new("/a/icon.png"));
        assert_eq!(names.name_for(Path::new("/b/icon.png")), first);
        assert_eq!(names.pairs().len(), 2);
    }

    #[test]
    fn test_check_format() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("ok.png");
        std::fs::write(&png, b"\x89PNG\r\n\x1a\nrest").unwrap();
        assert!(check_format(&png).is_ok());

        let fake = dir.path().join("fake.png");
        std::fs::write(&fake, b"GIF89a").unwrap();
        let err = check_format(&fake).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_IMAGE_FORMAT");

        let svg = dir.path().join("icon.svg");
        std::fs::write(&svg, "<?xml version=\"1.0\"?><svg></svg>").unwrap();
        assert!(check_format(&svg).is_ok());
    }
}
