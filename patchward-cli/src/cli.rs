//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Patchward -- construct signature diffing and archive maliciousness analysis.
///
/// Use `patchward <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "patchward", version, about, long_about = None)]
pub struct Cli {
    /// Path to the patchward.toml configuration file.
    #[arg(short, long, global = true, default_value = "patchward.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the digest of a file.
    Digest(DigestArgs),

    /// Scan archives for zip-slip, zip-bomb and symlink escapes.
    Malice(MaliceArgs),

    /// Classify the change between two versions of one construct.
    Diff(DiffArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- digest ----

/// Compute a file digest.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// File to digest.
    pub file: PathBuf,

    /// Digest algorithm (SHA1, SHA256, MD5).
    #[arg(short, long, default_value = "SHA256")]
    pub algorithm: String,
}

// ---- malice ----

/// Scan archives for malicious entries.
#[derive(Args, Debug)]
pub struct MaliceArgs {
    /// Archives to scan (zip, jar, war, ear, tar, tar.gz).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Run only these analyzers (zip-slip, zip-bomb, symlink). Repeatable.
    #[arg(short, long = "analyzer")]
    pub analyzers: Vec<String>,

    /// Override the number of parallel workers.
    #[arg(short, long)]
    pub workers: Option<usize>,
}

// ---- diff ----

/// Compare two versions of a construct body.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Source language (java, py, js).
    #[arg(short, long)]
    pub language: String,

    /// Construct type code (METH, CONS, CLAS, FUNC, ...).
    #[arg(short = 't', long = "type", default_value = "METH")]
    pub construct_type: String,

    /// Qualified construct name, e.g. `com.acme.Parser.parse(String)`.
    #[arg(short, long)]
    pub qname: String,

    /// File containing the old construct body.
    pub old_file: PathBuf,

    /// File containing the new construct body.
    pub new_file: PathBuf,
}

// ---- config ----

/// Manage patchward configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, signature, malice).
        #[arg(long)]
        section: Option<String>,
    },
}
