#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`MaliceScanError`)
//! - [`config`]: Scanner configuration (`MaliceScannerConfig`, builder)
//! - [`path`]: Extraction-root containment resolver
//! - [`archive`]: Format detection and visitor-based entry walking
//! - [`analyzer`]: `MaliciousnessAnalyzer` trait, zip-slip / zip-bomb / symlink analyzers
//! - [`scanner`]: `MaliceScanner` orchestrator with bounded parallel `scan_all`

pub mod analyzer;
pub mod archive;
pub mod config;
pub mod error;
pub mod path;
pub mod scanner;

// --- Public API Re-exports ---

// Configuration
pub use config::{MaliceScannerConfig, MaliceScannerConfigBuilder};

// Error
pub use error::MaliceScanError;

// Archive walking
pub use archive::{ArchiveEntry, ArchiveKind, ArchiveWalker, EntryType, WalkSummary, detect};

// Analyzers
pub use analyzer::{
    AnalyzerKind, Evidence, MALICIOUS_THRESHOLD, MaliciousnessAnalysisResult,
    MaliciousnessAnalyzer, SymlinkAnalyzer, ZipBombAnalyzer, ZipSlipAnalyzer, aggregate,
};

// Scanner
pub use scanner::{FileScanOutcome, MaliceScanner, MaliceScannerBuilder, ScanReport};
