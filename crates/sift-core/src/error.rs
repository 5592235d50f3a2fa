use sift_parser::{Location, ParseError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error type for sift operations. Every error aborts the bundle it
/// was raised in.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{source}\n    at {}:{location}", .path.display())]
    Syntax {
        path: PathBuf,
        location: Location,
        #[source]
        source: ParseError,
    },

    #[error("Cannot find module '{specifier}'\n    at {}:{location}", .importer.display())]
    ImportedModuleMissing {
        specifier: String,
        importer: PathBuf,
        location: Location,
    },

    #[error(
        "{} is not a supported image format.\n\n To stop image checking, set checkImageTypes to false in your config file.",
        .path.display()
    )]
    UnsupportedImageFormat { path: PathBuf },

    #[error("<{tag}> in {} requires a {attribute} attribute", .path.display())]
    MissingAttribute {
        tag: String,
        attribute: String,
        path: PathBuf,
    },

    #[error("sift could not find {}", .path.display())]
    FileNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Attach a file to a parse error, locating it within `source`.
    #[must_use]
    pub fn syntax(path: &Path, source: &str, error: ParseError) -> Self {
        Self::Syntax {
            path: path.to_path_buf(),
            location: error.locate(source),
            source: error,
        }
    }

    /// Stable SCREAMING_SNAKE code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ConfigRead { .. } => "CONFIG_READ",
            Self::ConfigParse { .. } => "CONFIG_PARSE",
            Self::Syntax { source, .. } => source.code(),
            Self::ImportedModuleMissing { .. } => "JS_IMPORTED_MODULE_MISSING",
            Self::UnsupportedImageFormat { .. } => "UNSUPPORTED_IMAGE_FORMAT",
            Self::MissingAttribute { .. } => "MISSING_ATTRIBUTE",
            Self::FileNotFound { .. } => "FILE_NON_EXISTENT",
        }
    }

    /// The file the error points into, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io(_) => None,
            Self::ConfigRead { path, .. }
            | Self::ConfigParse { path, .. }
            | Self::Syntax { path, .. }
            | Self::UnsupportedImageFormat { path }
            | Self::MissingAttribute { path, .. }
            | Self::FileNotFound { path } => Some(path),
            Self::ImportedModuleMissing { importer, .. } => Some(importer),
        }
    }

    /// Line and column within [`Error::path`], for errors raised in source.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Syntax { location, .. } | Self::ImportedModuleMissing { location, .. } => {
                Some(*location)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_parser::{parse, ParserOptions};

    #[test]
    fn test_syntax_error_carries_location() {
        let source = "let a = 1;\n  let b = ;";
        let err = parse(source, ParserOptions::default()).unwrap_err();
        let err = Error::syntax(Path::new("/src/app.js"), source, err);

        assert_eq!(err.code(), "EXPRESSION_EXPECTED");
        let location = err.location().unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(err.path(), Some(Path::new("/src/app.js")));
        assert!(err.to_string().contains("/src/app.js:2:"), "{err}");
    }

    #[test]
    fn test_codes_are_screaming_snake_case() {
        let errors = [
            Error::FileNotFound { path: PathBuf::from("a.js") },
            Error::UnsupportedImageFormat { path: PathBuf::from("a.png") },
            Error::ImportedModuleMissing {
                specifier: "./util".to_string(),
                importer: PathBuf::from("main.js"),
                location: Location { line: 1, column: 0 },
            },
        ];
        for err in errors {
            let code = err.code();
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{code}");
        }
    }

    #[test]
    fn test_missing_module_message_names_specifier() {
        let err = Error::ImportedModuleMissing {
            specifier: "./util".to_string(),
            importer: PathBuf::from("/p/main.js"),
            location: Location { line: 3, column: 7 },
        };
        assert_eq!(err.to_string(), "Cannot find module './util'\n    at /p/main.js:3:7");
    }
}
