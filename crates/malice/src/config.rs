//! 악성 분석 스캐너 설정
//!
//! [`MaliceScannerConfig`]는 core의 [`MaliceConfig`](patchward_core::config::MaliceConfig)를
//! 타입이 있는 값으로 변환합니다.
//!
//! # 사용 예시
//!
//! ```
//! use patchward_malice::{AnalyzerKind, MaliceScannerConfigBuilder};
//!
//! let config = MaliceScannerConfigBuilder::new()
//!     .analyzers(vec![AnalyzerKind::ZipSlip])
//!     .workers(2)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.workers, 2);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyzer::AnalyzerKind;
use crate::error::MaliceScanError;

/// 설정 상한값 상수
const MAX_WORKERS: usize = 256;
const MAX_ENTRIES_LIMIT: usize = 100_000_000;

/// 악성 분석 스캐너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaliceScannerConfig {
    /// 실행할 분석기 (실행 순서)
    pub analyzers: Vec<AnalyzerKind>,
    /// 아카이브당 최대 엔트리 수
    pub max_entries: usize,
    /// 엔트리 최대 압축률
    pub max_compression_ratio: u64,
    /// 선언 크기 합계 상한 (바이트)
    pub max_total_uncompressed: u64,
    /// `scan_all` 동시 실행 수
    pub workers: usize,
}

impl Default for MaliceScannerConfig {
    fn default() -> Self {
        Self {
            analyzers: AnalyzerKind::ALL.to_vec(),
            max_entries: 1_000_000,
            max_compression_ratio: 100,
            max_total_uncompressed: 4 * 1024 * 1024 * 1024, // 4 GB
            workers: 4,
        }
    }
}

impl MaliceScannerConfig {
    /// core의 `MaliceConfig`에서 스캐너 설정을 생성합니다.
    ///
    /// 알 수 없는 분석기 이름은 경고 후 무시합니다.
    pub fn from_core(core: &patchward_core::config::MaliceConfig) -> Self {
        let analyzers = core
            .analyzers
            .iter()
            .filter_map(|name| match name.parse::<AnalyzerKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!(error = %e, "ignoring unknown analyzer");
                    None
                }
            })
            .collect();

        Self {
            analyzers,
            max_entries: core.max_entries,
            max_compression_ratio: core.max_compression_ratio,
            max_total_uncompressed: core.max_total_uncompressed,
            workers: core.workers,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `analyzers`: 비어 있으면 안 됨
    /// - `max_entries`: 1-100000000
    /// - `max_compression_ratio`: 1 이상
    /// - `max_total_uncompressed`: 1 이상
    /// - `workers`: 1-256
    pub fn validate(&self) -> Result<(), MaliceScanError> {
        if self.analyzers.is_empty() {
            return Err(config_error("analyzers", "at least one analyzer is required"));
        }
        if self.max_entries == 0 || self.max_entries > MAX_ENTRIES_LIMIT {
            return Err(config_error(
                "max_entries",
                format!("must be 1-{MAX_ENTRIES_LIMIT}"),
            ));
        }
        if self.max_compression_ratio == 0 {
            return Err(config_error("max_compression_ratio", "must be greater than 0"));
        }
        if self.max_total_uncompressed == 0 {
            return Err(config_error("max_total_uncompressed", "must be greater than 0"));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(config_error("workers", format!("must be 1-{MAX_WORKERS}")));
        }
        Ok(())
    }
}

fn config_error(field: &str, reason: impl Into<String>) -> MaliceScanError {
    MaliceScanError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

/// [`MaliceScannerConfig`] 빌더
#[derive(Default)]
pub struct MaliceScannerConfigBuilder {
    config: MaliceScannerConfig,
}

impl MaliceScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 실행할 분석기를 설정합니다.
    pub fn analyzers(mut self, analyzers: Vec<AnalyzerKind>) -> Self {
        self.config.analyzers = analyzers;
        self
    }

    /// 최대 엔트리 수를 설정합니다.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.config.max_entries = max;
        self
    }

    /// 최대 압축률을 설정합니다.
    pub fn max_compression_ratio(mut self, ratio: u64) -> Self {
        self.config.max_compression_ratio = ratio;
        self
    }

    /// 선언 크기 합계 상한을 설정합니다.
    pub fn max_total_uncompressed(mut self, bytes: u64) -> Self {
        self.config.max_total_uncompressed = bytes;
        self
    }

    /// 워커 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `MaliceScanError::Config` 반환
    pub fn build(self) -> Result<MaliceScannerConfig, MaliceScanError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MaliceScannerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.analyzers.len(), 3);
    }

    #[test]
    fn from_core_maps_names_and_skips_unknown() {
        let core = patchward_core::config::MaliceConfig {
            analyzers: vec!["symlink".to_owned(), "bogus".to_owned(), "zip-slip".to_owned()],
            workers: 8,
            ..Default::default()
        };
        let config = MaliceScannerConfig::from_core(&core);
        assert_eq!(
            config.analyzers,
            vec![AnalyzerKind::Symlink, AnalyzerKind::ZipSlip]
        );
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn validate_rejects_empty_analyzers() {
        let config = MaliceScannerConfig {
            analyzers: Vec::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("analyzers"));
    }

    #[test]
    fn validate_rejects_bad_workers() {
        for workers in [0, 257] {
            let config = MaliceScannerConfig {
                workers,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "workers = {workers}");
        }
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = MaliceScannerConfig {
            max_compression_ratio: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MaliceScannerConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MaliceScannerConfig {
            max_total_uncompressed: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_validates_on_build() {
        assert!(MaliceScannerConfigBuilder::new().workers(0).build().is_err());
        let config = MaliceScannerConfigBuilder::new()
            .max_entries(10)
            .max_compression_ratio(50)
            .max_total_uncompressed(1024)
            .build()
            .unwrap();
        assert_eq!(config.max_entries, 10);
        assert_eq!(config.max_compression_ratio, 50);
    }
}
