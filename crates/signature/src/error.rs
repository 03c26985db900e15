//! 시그니처 엔진 에러 타입
//!
//! [`SignatureEngineError`]는 시그니처 생성과 비교 중 발생하는 모든 에러를 나타냅니다.
//! `From<SignatureEngineError> for PatchwardError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **지원하지 않는 construct**: `UnsupportedConstruct` (건너뛰고 계속 진행)
//! - **전제 조건 위반**: `ConstructMismatch`, `AlgorithmMismatch`, `NoSignatures` (호출자 버그)
//! - **입력 크기**: `BodyTooLarge`
//! - **파일 I/O**: `Io`
//! - **설정**: `Config`

use patchward_core::error::{ConfigError, PatchwardError, SignatureError};

/// 시그니처 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SignatureEngineError {
    /// 팩토리가 지문을 만들 수 없는 construct
    #[error("unsupported construct: {construct_id} (language: {language})")]
    UnsupportedConstruct {
        /// 대상 construct 식별자
        construct_id: String,
        /// 요청을 받은 팩토리의 언어
        language: String,
    },

    /// 서로 다른 ConstructId의 시그니처 비교
    #[error("construct mismatch: cannot compare {from} with {to}")]
    ConstructMismatch {
        /// 이전 버전 식별자
        from: String,
        /// 새 버전 식별자
        to: String,
    },

    /// 서로 다른 알고리즘으로 만든 시그니처 비교
    #[error("algorithm mismatch: cannot compare {from} signature with {to} signature")]
    AlgorithmMismatch {
        /// 이전 버전 알고리즘
        from: String,
        /// 새 버전 알고리즘
        to: String,
    },

    /// 양쪽 모두 시그니처가 없음
    #[error("no signature on either side")]
    NoSignatures,

    /// 본문 크기 초과
    #[error("construct body too large: {construct_id}: {size} bytes (max: {max})")]
    BodyTooLarge {
        /// 대상 construct 식별자
        construct_id: String,
        /// 실제 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
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
}

impl SignatureEngineError {
    /// 배치를 계속 진행해도 되는 항목별 에러인지 반환합니다.
    ///
    /// 전제 조건 위반은 호출자 버그이므로 `false`입니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedConstruct { .. } | Self::BodyTooLarge { .. } | Self::Io { .. }
        )
    }
}

impl From<SignatureEngineError> for PatchwardError {
    fn from(err: SignatureEngineError) -> Self {
        match err {
            SignatureEngineError::UnsupportedConstruct { .. } => {
                PatchwardError::Signature(SignatureError::UnsupportedConstruct(err.to_string()))
            }
            SignatureEngineError::ConstructMismatch { .. }
            | SignatureEngineError::AlgorithmMismatch { .. }
            | SignatureEngineError::NoSignatures => {
                PatchwardError::Signature(SignatureError::Precondition(err.to_string()))
            }
            SignatureEngineError::BodyTooLarge { .. } => {
                PatchwardError::Signature(SignatureError::CreationFailed(err.to_string()))
            }
            SignatureEngineError::Io { source, .. } => PatchwardError::Io(source),
            SignatureEngineError::Config { field, reason } => {
                PatchwardError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
