//! Defines the command-line arguments and subcommands for the trefoil CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::run::DEFAULT_CHUNK_SIZE;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "trefoil",
    version,
    about = "Incremental parsing with caret diagnostics."
)]
pub struct TrefoilArgs {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML file with diagnostic layout settings (width, ribbon, color).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream logfmt records from a file or stdin, printing each as it is parsed.
    Logfmt {
        /// The file to read. Reads stdin when omitted.
        file: Option<PathBuf>,
        /// Bytes fed to the parser at a time.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Print records as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Parse a whole file against a built-in grammar.
    Check {
        /// The file to check.
        #[arg(required = true)]
        file: PathBuf,
        /// Which grammar to check the file against.
        #[arg(long, value_enum, default_value_t = Pattern::Logfmt)]
        pattern: Pattern,
    },
}

/// Built-in grammars for `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// One unsigned integer per line.
    Digits,
    /// Lines of `key=value` pairs.
    Logfmt,
}
