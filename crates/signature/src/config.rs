//! 시그니처 엔진 설정
//!
//! [`SignatureEngineConfig`]는 core의 [`SignatureConfig`](patchward_core::config::SignatureConfig)를
//! 타입이 있는 값으로 변환하고, 엔진 고유 설정(다이제스트 알고리즘)을 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use patchward_signature::{SignatureEngineConfig, SignatureEngineConfigBuilder};
//! use patchward_signature::similarity::SimilarityAlgorithm;
//!
//! let config = SignatureEngineConfig::default();
//! config.validate().unwrap();
//!
//! let config = SignatureEngineConfigBuilder::new()
//!     .java_similarity(SimilarityAlgorithm::Levenshtein)
//!     .ngram_size(3)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.ngram_size, 3);
//! ```

use serde::{Deserialize, Serialize};

use patchward_core::digest::DigestAlgorithm;

use crate::error::SignatureEngineError;
use crate::similarity::SimilarityAlgorithm;

/// 설정 상한값 상수
const MAX_NGRAM_SIZE: usize = 16;
const MAX_BODY_SIZE_LIMIT: usize = 64 * 1024 * 1024; // 64 MB

/// 시그니처 엔진 설정
///
/// # 필드
///
/// - **java_similarity**: Java construct 비교 알고리즘
/// - **python_similarity**: Python construct 비교 알고리즘
/// - **ngram_size**: n-gram 알고리즘의 n
/// - **max_body_size**: construct 본문 최대 크기 (바이트)
/// - **strip_comments**: 정규화 시 주석 제거 여부
/// - **digest_algorithm**: 다이제스트 팩토리가 사용하는 해시
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEngineConfig {
    /// Java construct 비교 알고리즘
    pub java_similarity: SimilarityAlgorithm,
    /// Python construct 비교 알고리즘
    pub python_similarity: SimilarityAlgorithm,
    /// n-gram 크기
    pub ngram_size: usize,
    /// construct 본문 최대 크기 (바이트)
    pub max_body_size: usize,
    /// 주석 제거 여부
    pub strip_comments: bool,

    // --- 엔진 고유 확장 ---
    /// 다이제스트 시그니처 알고리즘
    pub digest_algorithm: DigestAlgorithm,
}

impl Default for SignatureEngineConfig {
    fn default() -> Self {
        Self {
            java_similarity: SimilarityAlgorithm::NGram,
            python_similarity: SimilarityAlgorithm::Levenshtein,
            ngram_size: 2,
            max_body_size: 1024 * 1024, // 1 MB
            strip_comments: true,
            digest_algorithm: DigestAlgorithm::Sha256,
        }
    }
}

impl SignatureEngineConfig {
    /// core의 `SignatureConfig`에서 엔진 설정을 생성합니다.
    ///
    /// 알 수 없는 알고리즘 이름은 기본값으로 대체합니다 (core 검증을 통과한 설정이라면
    /// 발생하지 않습니다).
    pub fn from_core(core: &patchward_core::config::SignatureConfig) -> Self {
        let defaults = Self::default();
        Self {
            java_similarity: core
                .java_similarity
                .parse()
                .unwrap_or(defaults.java_similarity),
            python_similarity: core
                .python_similarity
                .parse()
                .unwrap_or(defaults.python_similarity),
            ngram_size: core.ngram_size,
            max_body_size: core.max_body_size,
            strip_comments: core.strip_comments,
            ..defaults
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `ngram_size`: 1-16
    /// - `max_body_size`: 1-67108864 (64MB)
    pub fn validate(&self) -> Result<(), SignatureEngineError> {
        if self.ngram_size == 0 || self.ngram_size > MAX_NGRAM_SIZE {
            return Err(SignatureEngineError::Config {
                field: "ngram_size".to_owned(),
                reason: format!("must be 1-{MAX_NGRAM_SIZE}"),
            });
        }

        if self.max_body_size == 0 || self.max_body_size > MAX_BODY_SIZE_LIMIT {
            return Err(SignatureEngineError::Config {
                field: "max_body_size".to_owned(),
                reason: format!("must be 1-{MAX_BODY_SIZE_LIMIT}"),
            });
        }

        Ok(())
    }
}

/// [`SignatureEngineConfig`] 빌더
#[derive(Default)]
pub struct SignatureEngineConfigBuilder {
    config: SignatureEngineConfig,
}

impl SignatureEngineConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// Java 유사도 알고리즘을 설정합니다.
    pub fn java_similarity(mut self, algorithm: SimilarityAlgorithm) -> Self {
        self.config.java_similarity = algorithm;
        self
    }

    /// Python 유사도 알고리즘을 설정합니다.
    pub fn python_similarity(mut self, algorithm: SimilarityAlgorithm) -> Self {
        self.config.python_similarity = algorithm;
        self
    }

    /// n-gram 크기를 설정합니다.
    pub fn ngram_size(mut self, n: usize) -> Self {
        self.config.ngram_size = n;
        self
    }

    /// 본문 최대 크기를 설정합니다.
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// 주석 제거 여부를 설정합니다.
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.config.strip_comments = strip;
        self
    }

    /// 다이제스트 알고리즘을 설정합니다.
    pub fn digest_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.config.digest_algorithm = algorithm;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `SignatureEngineError::Config` 반환
    pub fn build(self) -> Result<SignatureEngineConfig, SignatureEngineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SignatureEngineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = patchward_core::config::SignatureConfig {
            java_similarity: "jaccard".to_owned(),
            python_similarity: "ngram".to_owned(),
            ngram_size: 4,
            max_body_size: 2048,
            strip_comments: false,
        };
        let config = SignatureEngineConfig::from_core(&core);
        assert_eq!(config.java_similarity, SimilarityAlgorithm::Jaccard);
        assert_eq!(config.python_similarity, SimilarityAlgorithm::NGram);
        assert_eq!(config.ngram_size, 4);
        assert_eq!(config.max_body_size, 2048);
        assert!(!config.strip_comments);
        // extended field uses default
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn from_core_with_unknown_algorithm_falls_back() {
        let core = patchward_core::config::SignatureConfig {
            java_similarity: "cosine".to_owned(),
            python_similarity: "soundex".to_owned(),
            ..Default::default()
        };
        let config = SignatureEngineConfig::from_core(&core);
        assert_eq!(config.java_similarity, SimilarityAlgorithm::NGram);
        assert_eq!(config.python_similarity, SimilarityAlgorithm::Levenshtein);
    }

    #[test]
    fn validate_rejects_zero_ngram_size() {
        let config = SignatureEngineConfig {
            ngram_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_large_ngram_size() {
        let config = SignatureEngineConfig {
            ngram_size: 17,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_body_size() {
        let config = SignatureEngineConfig {
            max_body_size: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_body_size"));
    }

    #[test]
    fn builder_validates_on_build() {
        assert!(SignatureEngineConfigBuilder::new().ngram_size(0).build().is_err());
        let config = SignatureEngineConfigBuilder::new()
            .python_similarity(SimilarityAlgorithm::Jaccard)
            .strip_comments(false)
            .digest_algorithm(DigestAlgorithm::Sha1)
            .max_body_size(4096)
            .build()
            .unwrap();
        assert_eq!(config.python_similarity, SimilarityAlgorithm::Jaccard);
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha1);
        assert!(!config.strip_comments);
    }
}
