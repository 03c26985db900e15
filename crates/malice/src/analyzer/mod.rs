//! 악성 아카이브 분석기
//!
//! [`MaliciousnessAnalyzer`] trait은 아카이브 한 개를 분석하여
//! [`MaliciousnessAnalysisResult`]를 반환합니다. 각 분석기는 [`ArchiveWalker`]로
//! 파일을 직접 열어 순회하며 상태를 갖지 않습니다.
//!
//! # 분석기
//!
//! | 이름 | 규칙 |
//! |------|------|
//! | `zip-slip` | 추출 경로가 루트 밖으로 나가는 엔트리 |
//! | `zip-bomb` | 압축률 또는 선언 크기 합계 초과 |
//! | `symlink` | 링크 대상이 루트 밖으로 나가는 엔트리 |
//!
//! [`ArchiveWalker`]: crate::archive::ArchiveWalker

mod symlink;
mod zip_bomb;
mod zip_slip;

pub use symlink::SymlinkAnalyzer;
pub use zip_bomb::ZipBombAnalyzer;
pub use zip_slip::ZipSlipAnalyzer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use patchward_core::types::UnknownVariant;

use crate::config::MaliceScannerConfig;
use crate::error::MaliceScanError;

/// 악성 판정 임계값 (점수가 이 값 이상이면 악성)
pub const MALICIOUS_THRESHOLD: f64 = 0.5;

/// 아카이브 악성 분석기
///
/// 구현체는 `Send + Sync`이어야 하며 여러 워커에서 동시에 호출됩니다.
pub trait MaliciousnessAnalyzer: Send + Sync {
    /// 분석기 이름
    fn name(&self) -> &'static str;

    /// 아카이브를 분석합니다.
    ///
    /// # Errors
    ///
    /// - 손상된 아카이브: `MaliceScanError::CorruptArchive` (양성 0.0과 구분)
    /// - 형식 판별 실패: `MaliceScanError::UnsupportedFormat`
    /// - 읽기 실패: `MaliceScanError::Io`
    fn is_malicious(&self, path: &Path) -> Result<MaliciousnessAnalysisResult, MaliceScanError>;
}

/// 악성 판정 근거
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    /// 문제가 된 엔트리 경로 (아카이브 전체에 대한 판정이면 `None`)
    pub entry_path: Option<String>,
    /// 사유
    pub reason: String,
}

/// 분석 결과
///
/// `score`는 [0.0, 1.0] 범위의 실수입니다. 현재 분석기는 0.0 또는 1.0만 반환합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaliciousnessAnalysisResult {
    /// 악성 점수
    pub score: f64,
    /// 결과를 만든 분석기
    pub analyzer: String,
    /// 판정 근거 (양성이면 `None`)
    pub evidence: Option<Evidence>,
}

impl MaliciousnessAnalysisResult {
    /// 양성 결과 (점수 0.0)
    pub fn benign(analyzer: &str) -> Self {
        Self {
            score: 0.0,
            analyzer: analyzer.to_owned(),
            evidence: None,
        }
    }

    /// 악성 결과 (점수 1.0)
    pub fn malicious(analyzer: &str, entry_path: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            score: 1.0,
            analyzer: analyzer.to_owned(),
            evidence: Some(Evidence {
                entry_path,
                reason: reason.into(),
            }),
        }
    }

    /// 악성 여부 (`score >= MALICIOUS_THRESHOLD`)
    pub fn is_malicious(&self) -> bool {
        self.score >= MALICIOUS_THRESHOLD
    }
}

impl fmt::Display for MaliciousnessAnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (score: {:.1})", self.analyzer, self.score)?;
        if let Some(evidence) = &self.evidence {
            match &evidence.entry_path {
                Some(entry) => write!(f, ": {entry}: {}", evidence.reason)?,
                None => write!(f, ": {}", evidence.reason)?,
            }
        }
        Ok(())
    }
}

/// 여러 분석 결과를 최대 점수로 합칩니다.
///
/// 점수가 같으면 먼저 나온 결과를 유지합니다. 결과가 없으면 `None`입니다.
pub fn aggregate(results: &[MaliciousnessAnalysisResult]) -> Option<&MaliciousnessAnalysisResult> {
    results.iter().fold(None, |best, current| match best {
        Some(b) if b.score >= current.score => Some(b),
        _ => Some(current),
    })
}

/// 분석기 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerKind {
    /// 경로 탈출
    ZipSlip,
    /// 압축 폭탄
    ZipBomb,
    /// 링크 탈출
    Symlink,
}

impl AnalyzerKind {
    /// 모든 분석기 (기본 실행 순서)
    pub const ALL: [Self; 3] = [Self::ZipSlip, Self::ZipBomb, Self::Symlink];

    /// 설정 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZipSlip => "zip-slip",
            Self::ZipBomb => "zip-bomb",
            Self::Symlink => "symlink",
        }
    }

    /// 설정에 맞는 분석기 인스턴스를 생성합니다.
    pub fn build(&self, config: &MaliceScannerConfig) -> Box<dyn MaliciousnessAnalyzer> {
        match self {
            Self::ZipSlip => Box::new(ZipSlipAnalyzer::new(config.max_entries)),
            Self::ZipBomb => Box::new(ZipBombAnalyzer::new(
                config.max_entries,
                config.max_compression_ratio,
                config.max_total_uncompressed,
            )),
            Self::Symlink => Box::new(SymlinkAnalyzer::new(config.max_entries)),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "analyzer",
                value: s.to_owned(),
            })
    }
}
