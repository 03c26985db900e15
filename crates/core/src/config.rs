//! 설정 관리 -- patchward.toml 파싱 및 런타임 설정
//!
//! [`PatchwardConfig`]는 모든 엔진의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PATCHWARD_MALICE_WORKERS=8` 형식)
//! 3. 설정 파일 (`patchward.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), patchward_core::error::PatchwardError> {
//! use patchward_core::config::PatchwardConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PatchwardConfig::load("patchward.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PatchwardConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PatchwardError};

/// 허용되는 유사도 알고리즘 이름
pub const SIMILARITY_ALGORITHMS: [&str; 3] = ["levenshtein", "ngram", "jaccard"];

/// 허용되는 분석기 이름
pub const ANALYZER_NAMES: [&str; 3] = ["zip-slip", "zip-bomb", "symlink"];

/// Patchward 통합 설정
///
/// `patchward.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 엔진은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchwardConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 시그니처 엔진 설정
    #[serde(default)]
    pub signature: SignatureConfig,
    /// 아카이브 악성 분석 설정
    #[serde(default)]
    pub malice: MaliceConfig,
}

impl PatchwardConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PatchwardError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PatchwardError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PatchwardError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PatchwardError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PatchwardError> {
        toml::from_str(toml_str).map_err(|e| {
            PatchwardError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PATCHWARD_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PATCHWARD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PATCHWARD_GENERAL_LOG_FORMAT");

        // Signature
        override_string(
            &mut self.signature.java_similarity,
            "PATCHWARD_SIGNATURE_JAVA_SIMILARITY",
        );
        override_string(
            &mut self.signature.python_similarity,
            "PATCHWARD_SIGNATURE_PYTHON_SIMILARITY",
        );
        override_usize(&mut self.signature.ngram_size, "PATCHWARD_SIGNATURE_NGRAM_SIZE");
        override_usize(
            &mut self.signature.max_body_size,
            "PATCHWARD_SIGNATURE_MAX_BODY_SIZE",
        );
        override_bool(
            &mut self.signature.strip_comments,
            "PATCHWARD_SIGNATURE_STRIP_COMMENTS",
        );

        // Malice
        override_csv(&mut self.malice.analyzers, "PATCHWARD_MALICE_ANALYZERS");
        override_usize(&mut self.malice.max_entries, "PATCHWARD_MALICE_MAX_ENTRIES");
        override_u64(
            &mut self.malice.max_compression_ratio,
            "PATCHWARD_MALICE_MAX_COMPRESSION_RATIO",
        );
        override_u64(
            &mut self.malice.max_total_uncompressed,
            "PATCHWARD_MALICE_MAX_TOTAL_UNCOMPRESSED",
        );
        override_usize(&mut self.malice.workers, "PATCHWARD_MALICE_WORKERS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PatchwardError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 유사도 알고리즘 검증
        for (field, value) in [
            ("signature.java_similarity", &self.signature.java_similarity),
            ("signature.python_similarity", &self.signature.python_similarity),
        ] {
            if !SIMILARITY_ALGORITHMS.contains(&value.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("must be one of: {}", SIMILARITY_ALGORITHMS.join(", ")),
                }
                .into());
            }
        }

        if self.signature.ngram_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "signature.ngram_size".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        // 분석기 이름 검증
        if self.malice.analyzers.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "malice.analyzers".to_owned(),
                reason: "at least one analyzer required".to_owned(),
            }
            .into());
        }
        for name in &self.malice.analyzers {
            if !ANALYZER_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "malice.analyzers".to_owned(),
                    reason: format!(
                        "unknown analyzer '{name}', must be one of: {}",
                        ANALYZER_NAMES.join(", ")
                    ),
                }
                .into());
            }
        }

        if self.malice.workers == 0 || self.malice.workers > 256 {
            return Err(ConfigError::InvalidValue {
                field: "malice.workers".to_owned(),
                reason: "must be 1-256".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 시그니처 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Java construct 비교에 쓰는 유사도 알고리즘
    pub java_similarity: String,
    /// Python construct 비교에 쓰는 유사도 알고리즘
    pub python_similarity: String,
    /// n-gram 알고리즘의 n
    pub ngram_size: usize,
    /// construct 본문 최대 크기 (바이트)
    pub max_body_size: usize,
    /// 정규화 시 주석 제거 여부
    pub strip_comments: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            java_similarity: "ngram".to_owned(),
            python_similarity: "levenshtein".to_owned(),
            ngram_size: 2,
            max_body_size: 1024 * 1024, // 1 MB
            strip_comments: true,
        }
    }
}

/// 아카이브 악성 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaliceConfig {
    /// 실행할 분석기 (zip-slip, zip-bomb, symlink)
    pub analyzers: Vec<String>,
    /// 아카이브당 최대 엔트리 수
    pub max_entries: usize,
    /// 허용 최대 압축률 (선언 크기 / 압축 크기)
    pub max_compression_ratio: u64,
    /// 허용 최대 선언 크기 합계 (바이트)
    pub max_total_uncompressed: u64,
    /// 병렬 스캔 워커 수
    pub workers: usize,
}

impl Default for MaliceConfig {
    fn default() -> Self {
        Self {
            analyzers: ANALYZER_NAMES.iter().map(|s| (*s).to_owned()).collect(),
            max_entries: 1_000_000,
            max_compression_ratio: 100,
            max_total_uncompressed: 4 * 1024 * 1024 * 1024, // 4 GB
            workers: 4,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
