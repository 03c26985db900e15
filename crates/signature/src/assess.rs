//! 패치 판정 -- 사용 중인 construct가 취약 버전과 수정 버전 중 어디에 가까운지 판정
//!
//! 애플리케이션이 사용하는 라이브러리 버전의 construct를 취약(vulnerable) 참조와
//! 수정(fixed) 참조에 각각 비교합니다. 두 유사도 점수는 판정 근거로 함께 반환됩니다.
//!
//! | 조건 | 판정 |
//! |------|------|
//! | 취약 참조와 수정 참조가 동일 | `Unknown` (패치가 이 construct를 바꾸지 않음) |
//! | 수정 참조와 일치 (1.0) | `Fixed` |
//! | 취약 참조와 일치 (1.0) | `Vulnerable` |
//! | 수정 참조에 더 가까움 | `Fixed` |
//! | 취약 참조에 더 가까움 | `Vulnerable` |
//! | 동점 | `Unknown` |

use std::fmt;

use serde::Serialize;
use tracing::info;

use patchward_core::types::{Construct, ConstructId};

use crate::error::SignatureEngineError;
use crate::factory::SignatureFactory;

/// 패치 적용 여부 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchVerdict {
    /// 수정 버전과 같거나 더 가까움
    Fixed,
    /// 취약 버전과 같거나 더 가까움
    Vulnerable,
    /// 판정 불가
    Unknown,
}

impl PatchVerdict {
    /// 와이어 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Vulnerable => "VULNERABLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for PatchVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 패치 판정 결과
#[derive(Debug, Clone, Serialize)]
pub struct PatchAssessment {
    /// 대상 construct 식별자
    pub construct_id: ConstructId,
    /// 판정
    pub verdict: PatchVerdict,
    /// 사용 버전과 취약 참조의 유사도 (취약 참조가 없으면 `None`)
    pub similarity_to_vulnerable: Option<f64>,
    /// 사용 버전과 수정 참조의 유사도 (수정 참조가 없으면 `None`)
    pub similarity_to_fixed: Option<f64>,
}

/// 세 버전이 모두 있는 construct의 패치 여부를 판정합니다.
///
/// # Errors
///
/// - 세 construct의 식별자가 다르면 `SignatureEngineError::ConstructMismatch`
/// - 시그니처 생성 실패 시 해당 에러
pub fn assess_patch(
    factory: &dyn SignatureFactory,
    vulnerable: &Construct,
    fixed: &Construct,
    used: &Construct,
) -> Result<PatchAssessment, SignatureEngineError> {
    assess_construct(factory, Some(vulnerable), Some(fixed), Some(used))
}

/// 일부 버전에 없을 수 있는 construct의 패치 여부를 판정합니다.
///
/// - 수정으로 삭제된 construct(`fixed`가 없음)를 사용 버전도 갖지 않으면 `Fixed`
/// - 수정으로 추가된 construct(`vulnerable`이 없음)를 사용 버전이 갖지 않으면 `Vulnerable`
/// - 그 외에는 존재하는 참조와의 유사도로 판정합니다.
///
/// # Errors
///
/// - 참조가 하나도 없으면 `SignatureEngineError::NoSignatures`
/// - 식별자가 서로 다르면 `SignatureEngineError::ConstructMismatch`
pub fn assess_construct(
    factory: &dyn SignatureFactory,
    vulnerable: Option<&Construct>,
    fixed: Option<&Construct>,
    used: Option<&Construct>,
) -> Result<PatchAssessment, SignatureEngineError> {
    let construct_id = common_id([vulnerable, fixed, used])?;

    let vulnerable = vulnerable.map(|c| factory.create_signature(c)).transpose()?;
    let fixed = fixed.map(|c| factory.create_signature(c)).transpose()?;
    let used = used.map(|c| factory.create_signature(c)).transpose()?;

    let (verdict, to_vulnerable, to_fixed) = match (&vulnerable, &fixed, &used) {
        (None, None, _) => return Err(SignatureEngineError::NoSignatures),
        (Some(v), Some(f), _) if v.repr() == f.repr() => (PatchVerdict::Unknown, None, None),
        (Some(_), None, None) => (PatchVerdict::Fixed, None, None),
        (None, Some(_), None) => (PatchVerdict::Vulnerable, None, None),
        (_, _, Some(u)) => {
            let to_vulnerable = vulnerable
                .as_ref()
                .map(|v| factory.compute_change(u, v).map(|c| c.score()))
                .transpose()?;
            let to_fixed = fixed
                .as_ref()
                .map(|f| factory.compute_change(u, f).map(|c| c.score()))
                .transpose()?;
            (decide(to_vulnerable, to_fixed), to_vulnerable, to_fixed)
        }
        // 양쪽 참조가 있고 사용 버전이 없음
        (Some(_), Some(_), None) => (PatchVerdict::Unknown, None, None),
    };

    info!(
        construct = %construct_id,
        verdict = %verdict,
        to_vulnerable = ?to_vulnerable,
        to_fixed = ?to_fixed,
        "patch assessed"
    );

    Ok(PatchAssessment {
        construct_id,
        verdict,
        similarity_to_vulnerable: to_vulnerable,
        similarity_to_fixed: to_fixed,
    })
}

/// 두 점수로 판정합니다. 한쪽 참조만 있으면 완전 일치일 때만 판정합니다.
fn decide(to_vulnerable: Option<f64>, to_fixed: Option<f64>) -> PatchVerdict {
    match (to_vulnerable, to_fixed) {
        (_, Some(f)) if f >= 1.0 => PatchVerdict::Fixed,
        (Some(v), _) if v >= 1.0 => PatchVerdict::Vulnerable,
        (Some(v), Some(f)) if f > v => PatchVerdict::Fixed,
        (Some(v), Some(f)) if v > f => PatchVerdict::Vulnerable,
        _ => PatchVerdict::Unknown,
    }
}

fn common_id(constructs: [Option<&Construct>; 3]) -> Result<ConstructId, SignatureEngineError> {
    let mut present = constructs.into_iter().flatten();
    let first = present.next().ok_or(SignatureEngineError::NoSignatures)?;
    for other in present {
        if other.id != first.id {
            return Err(SignatureEngineError::ConstructMismatch {
                from: first.id.to_string(),
                to: other.id.to_string(),
            });
        }
    }
    Ok(first.id.clone())
}
