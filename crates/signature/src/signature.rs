//! 시그니처와 변경 분류 타입
//!
//! [`Signature`]는 하나의 [`Construct`](patchward_core::Construct)에서 만들어진 뒤
//! 변경되지 않습니다. [`SignatureChange`]는 같은 ConstructId를 가진 두 시그니처의
//! 비교 결과이며, 한쪽이 없는 경우(ADDED / REMOVED)는 `Option`으로 명시합니다.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use patchward_core::digest::DigestAlgorithm;
use patchward_core::types::{ConstructId, UnknownVariant};

/// 시그니처 생성 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAlgorithm {
    /// 언어별 정규화된 소스 문자열
    NormalizedSource,
    /// 원본 본문의 다이제스트
    Digest(DigestAlgorithm),
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalizedSource => f.write_str("normalized-source"),
            Self::Digest(alg) => write!(f, "digest:{alg}"),
        }
    }
}

/// 시그니처의 비교 가능한 표현
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureRepr {
    /// 정규화된 문자열
    Normalized(String),
    /// 다이제스트 바이트 (직렬화 시 16진 문자열)
    Digest(#[serde(serialize_with = "serialize_hex")] Vec<u8>),
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

impl SignatureRepr {
    /// 유사도 계산에 사용할 문자열 형태
    pub fn as_comparable(&self) -> Cow<'_, str> {
        match self {
            Self::Normalized(s) => Cow::Borrowed(s.as_str()),
            Self::Digest(bytes) => Cow::Owned(hex::encode(bytes)),
        }
    }

    /// 표현의 바이트 길이
    pub fn len(&self) -> usize {
        match self {
            Self::Normalized(s) => s.len(),
            Self::Digest(bytes) => bytes.len(),
        }
    }

    /// 빈 표현인지 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Construct 본문의 정규화된 지문
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    construct_id: ConstructId,
    algorithm: SignatureAlgorithm,
    repr: SignatureRepr,
}

impl Signature {
    /// 정규화 문자열 시그니처를 생성합니다.
    pub fn normalized(construct_id: ConstructId, normalized: String) -> Self {
        Self {
            construct_id,
            algorithm: SignatureAlgorithm::NormalizedSource,
            repr: SignatureRepr::Normalized(normalized),
        }
    }

    /// 다이제스트 시그니처를 생성합니다.
    pub fn digest(construct_id: ConstructId, algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            construct_id,
            algorithm: SignatureAlgorithm::Digest(algorithm),
            repr: SignatureRepr::Digest(bytes),
        }
    }

    /// 대상 construct 식별자
    pub fn construct_id(&self) -> &ConstructId {
        &self.construct_id
    }

    /// 생성 전략
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// 비교 가능한 표현
    pub fn repr(&self) -> &SignatureRepr {
        &self.repr
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, {} bytes]",
            self.construct_id,
            self.algorithm,
            self.repr.len()
        )
    }
}

/// 변경 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// 동일 (점수 1.0)
    Unchanged,
    /// 변경됨
    Modified,
    /// 새 버전에만 존재
    Added,
    /// 이전 버전에만 존재
    Removed,
}

impl ChangeType {
    /// 모든 분류 목록
    pub const ALL: [Self; 4] = [Self::Unchanged, Self::Modified, Self::Added, Self::Removed];

    /// 와이어 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "UNCHANGED",
            Self::Modified => "MODIFIED",
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "change type",
                value: s.to_owned(),
            })
    }
}

/// 두 시그니처의 비교 결과
///
/// - `Unchanged`이면 `score == 1.0`
/// - `Added`이면 `from`이 없고 `Removed`이면 `to`가 없음, 점수는 `0.0`
#[derive(Debug, Clone, Serialize)]
pub struct SignatureChange {
    construct_id: ConstructId,
    change_type: ChangeType,
    score: f64,
    from: Option<Signature>,
    to: Option<Signature>,
}

impl SignatureChange {
    /// 양쪽이 모두 있는 비교 결과를 점수로 분류합니다.
    pub(crate) fn compared(from: Signature, to: Signature, score: f64) -> Self {
        let change_type = if score >= 1.0 {
            ChangeType::Unchanged
        } else {
            ChangeType::Modified
        };
        Self {
            construct_id: from.construct_id.clone(),
            change_type,
            score: if score >= 1.0 { 1.0 } else { score },
            from: Some(from),
            to: Some(to),
        }
    }

    pub(crate) fn added(to: Signature) -> Self {
        Self {
            construct_id: to.construct_id.clone(),
            change_type: ChangeType::Added,
            score: 0.0,
            from: None,
            to: Some(to),
        }
    }

    pub(crate) fn removed(from: Signature) -> Self {
        Self {
            construct_id: from.construct_id.clone(),
            change_type: ChangeType::Removed,
            score: 0.0,
            from: Some(from),
            to: None,
        }
    }

    /// 대상 construct 식별자
    pub fn construct_id(&self) -> &ConstructId {
        &self.construct_id
    }

    /// 변경 분류
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// 유사도 점수 `[0.0, 1.0]`
    pub fn score(&self) -> f64 {
        self.score
    }

    /// 이전 버전 시그니처 (`Added`이면 없음)
    pub fn from(&self) -> Option<&Signature> {
        self.from.as_ref()
    }

    /// 새 버전 시그니처 (`Removed`이면 없음)
    pub fn to(&self) -> Option<&Signature> {
        self.to.as_ref()
    }

    /// `Unchanged`가 아닌지 여부
    pub fn is_changed(&self) -> bool {
        self.change_type != ChangeType::Unchanged
    }
}

impl fmt::Display for SignatureChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (score: {:.3})",
            self.change_type, self.construct_id, self.score
        )
    }
}
