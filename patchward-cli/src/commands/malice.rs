//! `patchward malice` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use patchward_core::config::PatchwardConfig;
use patchward_malice::{
    AnalyzerKind, FileScanOutcome, MaliceScannerBuilder, MaliceScannerConfig,
};

use crate::cli::MaliceArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `malice` command.
///
/// Returns `CliError::Malicious` (exit code 4) when any archive is malicious, and
/// `CliError::Command` when none is malicious but some could not be analyzed.
pub async fn execute(
    args: MaliceArgs,
    config: &PatchwardConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut scanner_config = MaliceScannerConfig::from_core(&config.malice);
    if !args.analyzers.is_empty() {
        scanner_config.analyzers = parse_analyzers(&args.analyzers)?;
    }
    if let Some(workers) = args.workers {
        scanner_config.workers = workers;
    }

    let scanner = MaliceScannerBuilder::new()
        .config(scanner_config)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    info!(
        archives = args.paths.len(),
        analyzers = ?scanner.analyzer_names(),
        "starting archive scan"
    );

    let outcomes = scanner.scan_all(args.paths).await;
    let report = MaliceReport::from_outcomes(outcomes);
    writer.render(&report)?;

    if report.malicious > 0 {
        return Err(CliError::Malicious(format!(
            "{} of {} archives",
            report.malicious,
            report.archives.len()
        )));
    }
    if report.failed > 0 {
        return Err(CliError::Command(format!(
            "{} of {} archives could not be analyzed",
            report.failed,
            report.archives.len()
        )));
    }

    Ok(())
}

fn parse_analyzers(names: &[String]) -> Result<Vec<AnalyzerKind>, CliError> {
    names
        .iter()
        .map(|name| {
            name.parse::<AnalyzerKind>().map_err(|e| {
                CliError::Command(format!("{e} (expected: zip-slip, zip-bomb, symlink)"))
            })
        })
        .collect()
}

/// Per-archive status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    Benign,
    Malicious,
    Error,
}

/// One scanned archive.
#[derive(Serialize)]
pub struct ArchiveEntryReport {
    pub path: String,
    pub status: ArchiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Top finding (analyzer, entry, reason)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch scan report.
#[derive(Serialize)]
pub struct MaliceReport {
    pub archives: Vec<ArchiveEntryReport>,
    pub malicious: usize,
    pub failed: usize,
}

impl MaliceReport {
    fn from_outcomes(outcomes: Vec<FileScanOutcome>) -> Self {
        let archives: Vec<ArchiveEntryReport> = outcomes
            .into_iter()
            .map(|outcome| {
                let path = outcome.path.display().to_string();
                match outcome.result {
                    Ok(report) => ArchiveEntryReport {
                        path,
                        status: if report.malicious {
                            ArchiveStatus::Malicious
                        } else {
                            ArchiveStatus::Benign
                        },
                        kind: Some(report.kind.to_string()),
                        score: Some(report.score),
                        finding: report
                            .top_result()
                            .filter(|r| r.is_malicious())
                            .map(ToString::to_string),
                        // analyzers that failed after another one already flagged the archive
                        error: (!report.errors.is_empty()).then(|| report.errors.join("; ")),
                    },
                    Err(e) => ArchiveEntryReport {
                        path,
                        status: ArchiveStatus::Error,
                        kind: None,
                        score: None,
                        finding: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect();

        let malicious = archives
            .iter()
            .filter(|a| a.status == ArchiveStatus::Malicious)
            .count();
        let failed = archives
            .iter()
            .filter(|a| a.status == ArchiveStatus::Error)
            .count();

        Self {
            archives,
            malicious,
            failed,
        }
    }
}

impl Render for MaliceReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{:<10} {:<8} {:<6} {}", "STATUS", "KIND", "SCORE", "PATH")?;
        writeln!(w, "{}", "-".repeat(60))?;

        for archive in &self.archives {
            let status = match archive.status {
                ArchiveStatus::Benign => "BENIGN".green(),
                ArchiveStatus::Malicious => "MALICIOUS".red().bold(),
                ArchiveStatus::Error => "ERROR".yellow(),
            };
            let score = archive
                .score
                .map_or_else(|| "-".to_owned(), |s| format!("{s:.1}"));
            writeln!(
                w,
                "{:<10} {:<8} {:<6} {}",
                status,
                archive.kind.as_deref().unwrap_or("-"),
                score,
                archive.path
            )?;
            if let Some(finding) = &archive.finding {
                writeln!(w, "  {finding}")?;
            }
            if let Some(error) = &archive.error {
                writeln!(w, "  {}", error.yellow())?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "{} archives, {} malicious, {} failed",
            self.archives.len(),
            self.malicious,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyzers() {
        let kinds = parse_analyzers(&["zip-bomb".to_owned(), "symlink".to_owned()]).unwrap();
        assert_eq!(kinds, vec![AnalyzerKind::ZipBomb, AnalyzerKind::Symlink]);
        let err = parse_analyzers(&["virus".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("virus"));
    }

    #[test]
    fn test_malicious_report_keeps_analyzer_failures() {
        use patchward_malice::{ArchiveKind, MaliciousnessAnalysisResult, ScanReport};

        let outcome = FileScanOutcome {
            path: "mixed.tar".into(),
            result: Ok(ScanReport {
                path: "mixed.tar".to_owned(),
                kind: ArchiveKind::Tar,
                score: 1.0,
                malicious: true,
                results: vec![MaliciousnessAnalysisResult::malicious(
                    "zip-slip",
                    Some("../../evil.sh".to_owned()),
                    "entry escapes extraction root",
                )],
                errors: vec!["zip-bomb: corrupt header".to_owned()],
            }),
        };

        let report = MaliceReport::from_outcomes(vec![outcome]);
        assert_eq!(report.malicious, 1);
        assert_eq!(report.failed, 0);
        let archive = &report.archives[0];
        assert_eq!(archive.status, ArchiveStatus::Malicious);
        assert!(archive.finding.as_deref().unwrap().contains("../../evil.sh"));
        assert_eq!(archive.error.as_deref(), Some("zip-bomb: corrupt header"));
    }

    #[test]
    fn test_report_counts_and_render() {
        let report = MaliceReport {
            archives: vec![
                ArchiveEntryReport {
                    path: "a.zip".to_owned(),
                    status: ArchiveStatus::Malicious,
                    kind: Some("zip".to_owned()),
                    score: Some(1.0),
                    finding: Some("zip-slip (score: 1.0): ../x: escape".to_owned()),
                    error: None,
                },
                ArchiveEntryReport {
                    path: "b.tar".to_owned(),
                    status: ArchiveStatus::Error,
                    kind: None,
                    score: None,
                    finding: None,
                    error: Some("corrupt archive".to_owned()),
                },
            ],
            malicious: 1,
            failed: 1,
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("a.zip"));
        assert!(output.contains("../x"));
        assert!(output.contains("corrupt archive"));
        assert!(output.contains("2 archives, 1 malicious, 1 failed"));

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["archives"][0]["status"], "malicious");
        assert!(json["archives"][1].get("score").is_none());
    }
}
