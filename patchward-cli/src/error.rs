//! CLI-specific error types and exit code mapping

use patchward_core::error::{DigestError, PatchwardError};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one scanned archive was classified malicious.
    #[error("malicious archive detected: {0}")]
    Malicious(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from patchward-core.
    #[error("{0}")]
    Core(#[from] PatchwardError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 4    | Malicious archive found              |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(PatchwardError::Config(_)) => 2,
            Self::Malicious(_) => 4,
            Self::Io(_)
            | Self::Core(PatchwardError::Io(_))
            | Self::Core(PatchwardError::Digest(DigestError::Io { .. })) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<patchward_signature::SignatureEngineError> for CliError {
    fn from(e: patchward_signature::SignatureEngineError) -> Self {
        Self::Core(e.into())
    }
}

impl From<patchward_malice::MaliceScanError> for CliError {
    fn from(e: patchward_malice::MaliceScanError) -> Self {
        Self::Core(e.into())
    }
}

impl From<DigestError> for CliError {
    fn from(e: DigestError) -> Self {
        Self::Core(e.into())
    }
}
