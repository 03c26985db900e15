//! 에러 타입 -- 도메인별 에러 정의
//!
//! 각 엔진 크레이트는 자신의 도메인 에러를 정의하고
//! `From<DomainError> for PatchwardError`를 구현하여 `?`로 전파합니다.
//!
//! 어떤 에러도 배치 전체를 중단시키지 않습니다. 호출자(오케스트레이터)가
//! 항목별 결과를 모으고 다음 항목으로 진행합니다.

/// Patchward 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PatchwardError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 시그니처 엔진 에러
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// 아카이브 악성 분석 에러
    #[error("malice error: {0}")]
    Malice(#[from] MaliceError),

    /// 다이제스트 계산 에러
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 시그니처 엔진 에러 요약
///
/// `patchward-signature`의 상세 에러가 이 형태로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// 언어 프론트엔드가 지원하지 않는 construct
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// 서로 다른 ConstructId 간 비교 시도 (호출자 버그)
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// 시그니처 생성 실패
    #[error("signature creation failed: {0}")]
    CreationFailed(String),
}

/// 아카이브 악성 분석 에러 요약
#[derive(Debug, thiserror::Error)]
pub enum MaliceError {
    /// 손상된 아카이브 헤더 -- "판정 불가"이며 양성(0.0)과 구분됩니다
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    /// 지원하지 않는 컨테이너 형식
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// 분석 실패
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
}

/// 다이제스트 계산 에러
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// 닫힌 알고리즘 집합 밖의 이름
    #[error("[{0}] is not a valid digest algorithm")]
    UnsupportedAlgorithm(String),

    /// 파일 읽기 실패
    #[error("io error: {path}: {source}")]
    Io {
        /// 대상 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}
