//! `patchward diff` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use patchward_core::config::PatchwardConfig;
use patchward_core::types::{ConstructId, ConstructType, ProgrammingLanguage};
use patchward_signature::{SignatureChange, SignatureEngineConfig, SignatureFactories};

use crate::cli::DiffArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `diff` command.
pub async fn execute(
    args: DiffArgs,
    config: &PatchwardConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let lang = parse_language(&args.language)?;
    let construct_type: ConstructType = args
        .construct_type
        .to_ascii_uppercase()
        .parse()
        .map_err(|e| CliError::Command(format!("{e}")))?;
    let id = ConstructId::new(lang, construct_type, args.qname);

    let engine_config = SignatureEngineConfig::from_core(&config.signature);
    engine_config.validate()?;
    let factories = SignatureFactories::from_config(&engine_config);

    info!(construct = %id, old = %args.old_file.display(), new = %args.new_file.display(), "comparing construct versions");

    let (old_file, new_file) = (args.old_file, args.new_file);
    let report = tokio::task::spawn_blocking(move || {
        let factory = factories.for_construct(&id);
        let from = factory.create_signature_from_file(&id, &old_file)?;
        let to = factory.create_signature_from_file(&id, &new_file)?;
        let change = factory.compute_change(&from, &to)?;
        Ok::<_, patchward_signature::SignatureEngineError>(DiffReport {
            factory: factory.name().to_owned(),
            similarity: factory.similarity().name().to_owned(),
            change,
        })
    })
    .await
    .map_err(|e| CliError::Command(format!("diff task failed: {e}")))??;

    writer.render(&report)?;
    Ok(())
}

/// Accepts wire codes case-insensitively plus the `python` and `javascript` aliases.
fn parse_language(s: &str) -> Result<ProgrammingLanguage, CliError> {
    let upper = s.to_ascii_uppercase();
    let code = match upper.as_str() {
        "PYTHON" => "PY",
        "JAVASCRIPT" => "JS",
        other => other,
    };
    code.parse()
        .map_err(|e| CliError::Command(format!("{e} (expected: java, py, js)")))
}

/// Construct diff result.
#[derive(Serialize)]
pub struct DiffReport {
    /// Factory that produced both signatures
    pub factory: String,
    /// Similarity algorithm used for scoring
    pub similarity: String,
    pub change: SignatureChange,
}

impl Render for DiffReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let line = self.change.to_string();
        if self.change.is_changed() {
            writeln!(w, "{}", line.yellow().bold())?;
        } else {
            writeln!(w, "{}", line.green())?;
        }
        writeln!(w, "  factory: {} (similarity: {})", self.factory, self.similarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_aliases() {
        assert_eq!(parse_language("java").unwrap(), ProgrammingLanguage::Java);
        assert_eq!(parse_language("PY").unwrap(), ProgrammingLanguage::Python);
        assert_eq!(parse_language("python").unwrap(), ProgrammingLanguage::Python);
        assert_eq!(parse_language("javascript").unwrap(), ProgrammingLanguage::JavaScript);
        assert!(parse_language("rust").is_err());
    }
}
