//! `patchward digest` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use patchward_core::digest::{DigestAlgorithm, digest_file};

use crate::cli::DigestArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `digest` command.
pub async fn execute(args: DigestArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let algorithm: DigestAlgorithm = args.algorithm.parse()?;

    info!(path = %args.file.display(), %algorithm, "computing digest");

    let path = args.file.clone();
    let digest = tokio::task::spawn_blocking(move || digest_file(&path, algorithm))
        .await
        .map_err(|e| CliError::Command(format!("digest task failed: {e}")))??;

    let report = DigestReport {
        path: args.file.display().to_string(),
        algorithm: algorithm.as_str().to_owned(),
        digest: hex::encode(digest),
    };
    writer.render(&report)?;

    Ok(())
}

/// Digest result.
#[derive(Serialize)]
pub struct DigestReport {
    /// Digested file
    pub path: String,
    /// Algorithm name (SHA1, SHA256, MD5)
    pub algorithm: String,
    /// Lowercase hex digest
    pub digest: String,
}

impl Render for DigestReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}  {}  {}", self.algorithm, self.digest, self.path)
    }
}
