#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sift_core::config::CONFIG_FILE;
use sift_core::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about = "A JavaScript bundler, transpiler and minifier", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted logs on stderr
    #[arg(long = "json-logs", global = true)]
    json_logs: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH", env = "SIFT_CWD")]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to sift.json in the working directory)
    #[arg(long, global = true, value_name = "FILE", env = "SIFT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Bundle a module graph into one script
    Bundle {
        /// Entry point file
        entry: PathBuf,

        /// Output file (if not specified, prints to stdout)
        #[arg(long, short = 'o')]
        outfile: Option<PathBuf>,

        /// Parse JSX and resolve .jsx files
        #[arg(long)]
        jsx: bool,

        /// Mangle names and strip whitespace
        #[arg(long)]
        minify: bool,

        /// Print without newlines and indentation
        #[arg(long)]
        no_format: bool,

        /// Reject images whose contents do not match their extension
        #[arg(long)]
        check_image_types: bool,

        /// Print a JSON summary instead of human output
        #[arg(long)]
        json: bool,
    },

    /// Parse a file and print its syntax tree
    Parse {
        file: PathBuf,

        /// Enable JSX
        #[arg(long)]
        jsx: bool,

        /// Parse as a classic script instead of a module
        #[arg(long)]
        script: bool,
    },

    /// Parse a file and print it back out
    Generate {
        file: PathBuf,

        /// Mangle names and strip whitespace
        #[arg(long)]
        minify: bool,

        /// Enable JSX
        #[arg(long)]
        jsx: bool,

        /// Desugar modern syntax before printing
        #[arg(long)]
        lower: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config_path = cli.config.unwrap_or_else(|| cwd.join(CONFIG_FILE));
    let config = Config::load(&cwd.join(config_path)).into_diagnostic()?;

    match cli.command {
        Commands::Bundle {
            entry,
            outfile,
            jsx,
            minify,
            no_format,
            check_image_types,
            json,
        } => {
            let mut options = config.bundle.clone();
            if jsx {
                options = options.with_jsx(true);
            }
            if minify {
                options = options.with_minify(true);
            }
            if no_format {
                options = options.with_format(false);
            }
            if check_image_types {
                options = options.with_check_image_types(true);
            }
            let action = commands::bundle::BundleAction {
                entry: cwd.join(entry),
                outfile: outfile.map(|o| cwd.join(o)),
                options,
            };
            let span = tracing::info_span!("bundle", entry = %action.entry.display());
            let _guard = span.enter();
            commands::bundle::run(action, json)
        }
        Commands::Parse { file, jsx, script } => {
            let span = tracing::info_span!("parse", file = %file.display());
            let _guard = span.enter();
            commands::parse::run(&cwd.join(file), jsx, script)
        }
        Commands::Generate {
            file,
            minify,
            jsx,
            lower,
        } => {
            let span = tracing::info_span!("generate", file = %file.display());
            let _guard = span.enter();
            let jsx = jsx || config.bundle.allow_jsx;
            commands::generate::run(&cwd.join(file), &config.bundle.indent, minify, jsx, lower)
        }
    }
}
