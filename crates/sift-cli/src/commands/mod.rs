pub mod bundle;
pub mod generate;
pub mod parse;

use miette::{miette, Report};
use sift_core::Error;

/// Render a core error for the terminal: message, code, and where it
/// happened.
pub fn report(error: Error) -> Report {
    let code = error.code();
    match (error.path(), error.location()) {
        // Source errors already carry `path:line:column` in their message.
        (Some(_), Some(_)) => miette!(code = code, "{error}"),
        (Some(path), None) => miette!(code = code, "{error}\n    at {}", path.display()),
        (None, _) => miette!(code = code, "{error}"),
    }
}
