//! `sift bundle` command implementation.
//!
//! Bundles a module graph into a single script, next to which image and
//! opaque assets are copied.

use super::report;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sift_core::bundler::{BundleOutput, Bundler};
use sift_core::BundleOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Bundle command action.
#[derive(Debug, Clone)]
pub struct BundleAction {
    /// Entry point file.
    pub entry: PathBuf,
    /// Output file (if None, prints to stdout).
    pub outfile: Option<PathBuf>,
    pub options: BundleOptions,
}

/// JSON output for bundle command.
#[derive(Serialize)]
struct BundleResultJson {
    ok: bool,
    entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    modules: Vec<String>,
    stylesheets: Vec<String>,
    images: Vec<String>,
    size_bytes: usize,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BundleErrorJson>,
}

#[derive(Serialize)]
struct BundleErrorJson {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Run the bundle command.
pub fn run(action: BundleAction, json: bool) -> Result<()> {
    let start = Instant::now();
    let result = Bundler::new(action.options.clone()).bundle(&action.entry);
    let duration_ms = start.elapsed().as_millis() as u64;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            if json {
                let json_result = BundleResultJson {
                    ok: false,
                    entry: action.entry.display().to_string(),
                    outfile: action.outfile.as_ref().map(|p| p.display().to_string()),
                    modules: Vec::new(),
                    stylesheets: Vec::new(),
                    images: Vec::new(),
                    size_bytes: 0,
                    duration_ms,
                    error: Some(BundleErrorJson {
                        code: e.code().to_string(),
                        message: e.to_string(),
                        path: e.path().map(|p| p.display().to_string()),
                    }),
                };
                println!("{}", serde_json::to_string(&json_result).into_diagnostic()?);
                std::process::exit(1);
            }
            return Err(report(e));
        }
    };

    if let Some(outfile) = &action.outfile {
        write_output(outfile, &output)?;
    }

    if json {
        let json_result = BundleResultJson {
            ok: true,
            entry: action.entry.display().to_string(),
            outfile: action.outfile.as_ref().map(|p| p.display().to_string()),
            modules: output.modules.iter().map(|p| p.display().to_string()).collect(),
            stylesheets: output.stylesheets.iter().map(|p| p.display().to_string()).collect(),
            images: output.images.iter().map(|(name, _)| name.clone()).collect(),
            size_bytes: output.code.len(),
            duration_ms,
            error: None,
        };
        println!("{}", serde_json::to_string(&json_result).into_diagnostic()?);
    } else if let Some(outfile) = &action.outfile {
        println!(
            "  {} -> {} ({} modules, {:.1}KB, {}ms)",
            action.entry.display(),
            outfile.display(),
            output.modules.len(),
            output.code.len() as f64 / 1024.0,
            duration_ms
        );
        for sheet in &output.stylesheets {
            println!("    + {} (stylesheet)", sheet.display());
        }
        for (name, _) in &output.images {
            println!("    + {name}");
        }
    } else {
        print!("{}", output.code);
    }

    Ok(())
}

/// Write the bundle and copy its images and files next to it.
fn write_output(outfile: &Path, output: &BundleOutput) -> Result<()> {
    let parent = outfile.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(outfile, &output.code).into_diagnostic()?;

    for (name, source) in &output.images {
        std::fs::copy(source, parent.join(name)).into_diagnostic()?;
    }
    for file in &output.files {
        if let Some(name) = file.file_name() {
            std::fs::copy(file, parent.join(name)).into_diagnostic()?;
        }
    }
    tracing::debug!(outfile = %outfile.display(), "wrote bundle");
    Ok(())
}
