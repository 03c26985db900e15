//! 버전 비교 -- 두 버전의 construct 집합 전체를 비교
//!
//! 양쪽을 ConstructId로 묶어 합집합의 각 식별자마다 하나의 [`SignatureChange`]를
//! 만듭니다. 지원하지 않는 construct는 건너뛰고, 개별 실패는 보고서에 모은 뒤
//! 계속 진행합니다.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use patchward_core::types::{Construct, ConstructId};

use crate::error::SignatureEngineError;
use crate::factory::SignatureFactory;
use crate::signature::{ChangeType, Signature, SignatureChange};

/// 개별 construct 비교 실패
#[derive(Debug, Clone, Serialize)]
pub struct ConstructFailure {
    /// 대상 construct 식별자
    pub construct_id: ConstructId,
    /// 실패 사유
    pub reason: String,
}

/// 버전 비교 보고서
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionComparison {
    /// ConstructId 순으로 정렬된 변경 목록
    pub changes: Vec<SignatureChange>,
    /// 팩토리가 지원하지 않아 건너뛴 construct
    pub skipped: Vec<ConstructId>,
    /// 시그니처 생성에 실패한 construct
    pub failed: Vec<ConstructFailure>,
}

impl VersionComparison {
    /// 특정 분류의 변경 개수
    pub fn count(&self, change_type: ChangeType) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type() == change_type)
            .count()
    }

    /// `Unchanged`가 아닌 변경이 하나라도 있는지 여부
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(SignatureChange::is_changed)
    }
}

/// 두 버전의 construct 집합을 비교합니다.
///
/// 같은 쪽에 중복된 ConstructId가 있으면 마지막 construct를 사용합니다.
/// 한쪽의 시그니처 생성이 실패한 식별자는 `Added`/`Removed`로 오분류하지 않도록
/// `failed`에 기록합니다.
pub fn compare_versions(
    factory: &dyn SignatureFactory,
    old: &[Construct],
    new: &[Construct],
) -> VersionComparison {
    let old_by_id = index_by_id(old, "old");
    let new_by_id = index_by_id(new, "new");
    let ids: BTreeSet<&ConstructId> = old_by_id.keys().chain(new_by_id.keys()).copied().collect();

    let mut report = VersionComparison::default();

    for id in ids {
        if !factory.is_supported_construct_id(id) {
            debug!(construct = %id, factory = factory.name(), "skipping unsupported construct");
            report.skipped.push(id.clone());
            continue;
        }

        let from = match signature_for(factory, old_by_id.get(id).copied()) {
            Ok(sig) => sig,
            Err(e) => {
                record_failure(&mut report, id, e);
                continue;
            }
        };
        let to = match signature_for(factory, new_by_id.get(id).copied()) {
            Ok(sig) => sig,
            Err(e) => {
                record_failure(&mut report, id, e);
                continue;
            }
        };

        match factory.compute_change_between(from.as_ref(), to.as_ref()) {
            Ok(change) => report.changes.push(change),
            Err(e) => record_failure(&mut report, id, e),
        }
    }

    info!(
        factory = factory.name(),
        changes = report.changes.len(),
        modified = report.count(ChangeType::Modified),
        added = report.count(ChangeType::Added),
        removed = report.count(ChangeType::Removed),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "version comparison completed"
    );

    report
}

fn index_by_id<'a>(
    constructs: &'a [Construct],
    side: &'static str,
) -> BTreeMap<&'a ConstructId, &'a Construct> {
    let mut map = BTreeMap::new();
    for construct in constructs {
        if map.insert(&construct.id, construct).is_some() {
            warn!(construct = %construct.id, side, "duplicate construct id, keeping last");
        }
    }
    map
}

fn signature_for(
    factory: &dyn SignatureFactory,
    construct: Option<&Construct>,
) -> Result<Option<Signature>, SignatureEngineError> {
    construct.map(|c| factory.create_signature(c)).transpose()
}

fn record_failure(report: &mut VersionComparison, id: &ConstructId, err: SignatureEngineError) {
    warn!(construct = %id, error = %err, "construct comparison failed");
    report.failed.push(ConstructFailure {
        construct_id: id.clone(),
        reason: err.to_string(),
    });
}
