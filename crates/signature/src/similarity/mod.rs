//! 유사도 알고리즘 -- 두 문자열의 정규화 점수 계산
//!
//! 모든 구현은 [`StringSimilarity`] 트레이트를 구현하며 서로 교체 가능합니다.
//! 점수는 항상 `[0.0, 1.0]` 범위이고, 두 입력이 같거나 모두 비어 있으면 `1.0`입니다.
//! 모든 구현은 대칭입니다 (`sim(a, b) == sim(b, a)`).
//!
//! # 사용 예시
//!
//! ```
//! use patchward_signature::similarity::{SimilarityAlgorithm, StringSimilarity};
//!
//! let sim = SimilarityAlgorithm::Levenshtein.build(2);
//! assert_eq!(sim.calculate_similarity("", ""), 1.0);
//! assert!(sim.calculate_similarity("kitten", "sitting") < 1.0);
//! ```

mod jaccard;
mod levenshtein;
mod ngram;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use patchward_core::types::UnknownVariant;

pub use jaccard::TokenJaccard;
pub use levenshtein::Levenshtein;
pub use ngram::NGram;

/// 문자열 유사도 계산 트레이트
///
/// 구현체는 순수 함수여야 하며 여러 스레드에서 동시에 호출될 수 있습니다.
pub trait StringSimilarity: Send + Sync {
    /// 알고리즘 이름
    fn name(&self) -> &'static str;

    /// 두 문자열의 유사도를 `[0.0, 1.0]` 범위로 반환합니다.
    fn calculate_similarity(&self, left: &str, right: &str) -> f64;
}

/// 완전 일치 비교 (1.0 또는 0.0)
///
/// 다이제스트 시그니처처럼 부분 유사도가 의미 없는 표현에 사용합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl StringSimilarity for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn calculate_similarity(&self, left: &str, right: &str) -> f64 {
        if left == right { 1.0 } else { 0.0 }
    }
}

/// 설정으로 선택 가능한 유사도 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityAlgorithm {
    /// 편집 거리 기반
    Levenshtein,
    /// 문자 n-gram Dice 계수
    NGram,
    /// 토큰 다중집합 Jaccard 계수
    Jaccard,
}

impl SimilarityAlgorithm {
    /// 모든 알고리즘 목록
    pub const ALL: [Self; 3] = [Self::Levenshtein, Self::NGram, Self::Jaccard];

    /// 설정 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Levenshtein => "levenshtein",
            Self::NGram => "ngram",
            Self::Jaccard => "jaccard",
        }
    }

    /// 구현체를 생성합니다. `ngram_size`는 n-gram 알고리즘에만 사용됩니다.
    pub fn build(&self, ngram_size: usize) -> Box<dyn StringSimilarity> {
        match self {
            Self::Levenshtein => Box::new(Levenshtein),
            Self::NGram => Box::new(NGram::new(ngram_size)),
            Self::Jaccard => Box::new(TokenJaccard),
        }
    }
}

impl fmt::Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "similarity algorithm",
                value: s.to_owned(),
            })
    }
}

/// 부동소수 오차로 범위를 벗어나지 않도록 점수를 고정합니다.
pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
