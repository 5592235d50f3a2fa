//! Embedding a bundle into an HTML document.
//!
//! The document parser is not part of this crate. It hands over each module
//! `<script>` it finds as a [`ScriptTag`]; [`embed`] answers with the nodes
//! to insert at that position.

use crate::bundler::BundleOutput;
use crate::config::BundleOptions;
use crate::error::{Error, Result};
use std::path::{Component, Path};

/// A `<script>` tag found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub type_attr: Option<String>,
    /// Byte offset of the tag in the document.
    pub position: usize,
}

impl ScriptTag {
    #[must_use]
    pub fn new(src: impl Into<String>, position: usize) -> Self {
        Self {
            src: Some(src.into()),
            type_attr: Some("module".to_string()),
            position,
        }
    }

    /// Only `<script type="module" src="...">` tags are bundled.
    pub fn validate(&self, document: &Path) -> Result<&str> {
        if self.type_attr.as_deref() != Some("module") {
            return Err(Error::MissingAttribute {
                tag: "script".to_string(),
                attribute: "type=\"module\"".to_string(),
                path: document.to_path_buf(),
            });
        }
        self.src.as_deref().ok_or_else(|| Error::MissingAttribute {
            tag: "script".to_string(),
            attribute: "src".to_string(),
            path: document.to_path_buf(),
        })
    }
}

/// A node to insert in place of a script tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// `<script type="module">code</script>`
    InlineScript(String),
    /// `<script type="module" src="file">`, with `code` written to `file`
    /// next to the document.
    ExternalScript { file: String, code: String },
    /// `<link rel="stylesheet" href="href">`
    Stylesheet { href: String },
}

impl Insertion {
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::InlineScript(code) => format!("<script type=\"module\">{code}</script>"),
            Self::ExternalScript { file, .. } => {
                format!("<script type=\"module\" src=\"{}\"></script>", escape_attribute(file))
            }
            Self::Stylesheet { href } => {
                format!("<link rel=\"stylesheet\" href=\"{}\">", escape_attribute(href))
            }
        }
    }
}

/// The insertions that replace `tag` in the document written to
/// `destination`: stylesheets first, then the script.
pub fn embed(
    tag: &ScriptTag,
    output: &BundleOutput,
    options: &BundleOptions,
    destination: &Path,
) -> Vec<Insertion> {
    let base = destination.parent().unwrap_or(Path::new(""));
    let mut insertions: Vec<Insertion> = output
        .stylesheets
        .iter()
        .map(|sheet| Insertion::Stylesheet {
            href: relative_path(sheet, base),
        })
        .collect();

    if options.internal_js {
        insertions.push(Insertion::InlineScript(output.code.clone()));
    } else {
        let stem = tag
            .src
            .as_deref()
            .and_then(|src| Path::new(src).file_stem())
            .map_or_else(|| "index".to_string(), |s| s.to_string_lossy().into_owned());
        insertions.push(Insertion::ExternalScript {
            file: format!("{stem}.bundle.js"),
            code: output.code.clone(),
        });
    }
    tracing::debug!(position = tag.position, count = insertions.len(), "embedding bundle");
    insertions
}

/// `path` relative to the directory `base`, with `/` separators.
fn relative_path(path: &Path, base: &Path) -> String {
    let path: Vec<Component<'_>> = path.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = base[common..]
        .iter()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|_| "..".to_string())
        .collect();
    parts.extend(
        path[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_parser::{Program, SourceType, Span};
    use std::path::PathBuf;

    fn output(stylesheets: &[&str]) -> BundleOutput {
        BundleOutput {
            program: Program::new(Vec::new(), SourceType::Script, Span::default()),
            code: "(function(){}());".to_string(),
            stylesheets: stylesheets.iter().map(PathBuf::from).collect(),
            images: Vec::new(),
            files: Vec::new(),
            modules: Vec::new(),
        }
    }

    #[test]
    fn test_validate() {
        let doc = Path::new("/site/index.html");
        assert_eq!(ScriptTag::new("main.js", 0).validate(doc).unwrap(), "main.js");

        let classic = ScriptTag { type_attr: None, ..ScriptTag::new("main.js", 0) };
        assert_eq!(classic.validate(doc).unwrap_err().code(), "MISSING_ATTRIBUTE");

        let inline = ScriptTag { src: None, ..ScriptTag::new("", 0) };
        let err = inline.validate(doc).unwrap_err();
        assert!(err.to_string().contains("src"), "{err}");
    }

    #[test]
    fn test_external_script() {
        let tag = ScriptTag::new("js/app.js", 10);
        let insertions = embed(&tag, &output(&[]), &BundleOptions::default(), Path::new("/out/index.html"));
        assert_eq!(
            insertions,
            vec![Insertion::ExternalScript {
                file: "app.bundle.js".to_string(),
                code: "(function(){}());".to_string(),
            }]
        );
        assert_eq!(
            insertions[0].to_html(),
            "<script type=\"module\" src=\"app.bundle.js\"></script>"
        );
    }

    #[test]
    fn test_inline_script_and_stylesheets() {
        let options = BundleOptions {
            internal_js: true,
            ..BundleOptions::default()
        };
        let insertions = embed(
            &ScriptTag::new("app.js", 0),
            &output(&["/site/css/main.css", "/shared/reset.css"]),
            &options,
            Path::new("/site/index.html"),
        );
        assert_eq!(
            insertions,
            vec![
                Insertion::Stylesheet { href: "css/main.css".to_string() },
                Insertion::Stylesheet { href: "../shared/reset.css".to_string() },
                Insertion::InlineScript("(function(){}());".to_string()),
            ]
        );
        assert_eq!(insertions[0].to_html(), "<link rel=\"stylesheet\" href=\"css/main.css\">");
    }
}
