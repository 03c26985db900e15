//! 아카이브 악성 분석 에러 타입
//!
//! [`MaliceScanError`]는 아카이브 순회와 분석 중 발생하는 모든 에러를 나타냅니다.
//! `From<MaliceScanError> for PatchwardError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **판정 불가**: `CorruptArchive` (양성 0.0과 구분)
//! - **형식 판별 실패**: `UnsupportedFormat`
//! - **파일 I/O**: `Io`
//! - **설정**: `Config`
//! - **작업 실행**: `Task`

use patchward_core::error::{ConfigError, MaliceError, PatchwardError};

/// 아카이브 악성 분석 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MaliceScanError {
    /// 구조적으로 유효하지 않은 아카이브 헤더
    #[error("corrupt archive: {path}: {reason}")]
    CorruptArchive {
        /// 아카이브 경로
        path: String,
        /// 손상 사유
        reason: String,
    },

    /// 내용과 확장자 모두로 형식을 판별할 수 없음
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat {
        /// 아카이브 경로
        path: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 워커 작업 실패
    #[error("task error: {0}")]
    Task(String),
}

impl MaliceScanError {
    /// 손상된 아카이브 에러를 생성합니다.
    pub(crate) fn corrupt(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::CorruptArchive {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// I/O 에러를 생성합니다.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// 판정 불가(손상) 에러인지 여부
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptArchive { .. })
    }
}

impl From<MaliceScanError> for PatchwardError {
    fn from(err: MaliceScanError) -> Self {
        match err {
            MaliceScanError::CorruptArchive { .. } => {
                PatchwardError::Malice(MaliceError::CorruptArchive(err.to_string()))
            }
            MaliceScanError::UnsupportedFormat { path } => {
                PatchwardError::Malice(MaliceError::UnsupportedFormat(path))
            }
            MaliceScanError::Io { source, .. } => PatchwardError::Io(source),
            MaliceScanError::Config { field, reason } => {
                PatchwardError::Config(ConfigError::InvalidValue { field, reason })
            }
            MaliceScanError::Task(msg) => PatchwardError::Malice(MaliceError::AnalysisFailed(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn corrupt_archive_display() {
        let err = MaliceScanError::corrupt(Path::new("/tmp/a.zip"), "invalid central directory");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.zip"));
        assert!(msg.contains("invalid central directory"));
        assert!(err.is_corrupt());
    }

    #[test]
    fn io_error_is_not_corrupt() {
        let err = MaliceScanError::io(
            Path::new("/tmp/a.zip"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_corrupt());
    }

    #[test]
    fn converts_corrupt_to_patchward_error() {
        let err: PatchwardError = MaliceScanError::corrupt(Path::new("x.tar"), "bad checksum").into();
        assert!(matches!(
            err,
            PatchwardError::Malice(MaliceError::CorruptArchive(_))
        ));
    }

    #[test]
    fn converts_unsupported_format() {
        let err: PatchwardError = MaliceScanError::UnsupportedFormat {
            path: "x.bin".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            PatchwardError::Malice(MaliceError::UnsupportedFormat(p)) if p == "x.bin"
        ));
    }

    #[test]
    fn converts_config_and_io() {
        let err: PatchwardError = MaliceScanError::Config {
            field: "workers".to_owned(),
            reason: "must be 1-256".to_owned(),
        }
        .into();
        assert!(matches!(err, PatchwardError::Config(_)));

        let err: PatchwardError = MaliceScanError::io(
            Path::new("x"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
        .into();
        assert!(matches!(err, PatchwardError::Io(_)));
    }
}
