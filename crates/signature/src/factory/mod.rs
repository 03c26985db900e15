//! 시그니처 팩토리 -- 언어별 지문 생성과 공통 변경 분류
//!
//! 각 언어 프론트엔드는 [`SignatureFactory`]를 구현하여 자신의 정규화 전략을
//! 제공합니다. 변경 분류 정책은 [`compute_change_with`]와
//! [`compute_change_between`]에 한 번만 구현되어 모든 팩토리가 공유합니다.
//!
//! # 새 언어 추가하기
//!
//! 1. `SignatureFactory` 트레이트를 구현
//! 2. `is_supported_construct_id`에서 지원하는 construct 종류를 판정
//! 3. `create_signature`에서 정규화 후 [`Signature`]를 반환
//! 4. [`SignatureFactories`]에 등록

mod digest;
mod java;
mod python;

use std::io::Read;
use std::path::Path;

use tracing::debug;

use patchward_core::metrics as m;
use patchward_core::types::{Construct, ConstructId, ConstructLocation, ProgrammingLanguage};

use crate::config::SignatureEngineConfig;
use crate::error::SignatureEngineError;
use crate::signature::{Signature, SignatureChange, SignatureRepr};
use crate::similarity::StringSimilarity;

pub use digest::DigestSignatureFactory;
pub use java::JavaSignatureFactory;
pub use python::PythonSignatureFactory;

/// 언어별 시그니처 팩토리 트레이트
///
/// 구현체는 `Send + Sync`여야 하며, 모든 메서드는 공유 상태를 변경하지 않으므로
/// 여러 워커에서 동시에 호출할 수 있습니다.
///
/// # 구현 예시
///
/// ```ignore
/// struct RubyFactory;
///
/// impl SignatureFactory for RubyFactory {
///     fn name(&self) -> &'static str { "ruby" }
///     fn is_supported_construct_id(&self, id: &ConstructId) -> bool { /* ... */ }
///     fn create_signature(&self, construct: &Construct) -> Result<Signature, SignatureEngineError> { /* ... */ }
///     fn similarity(&self) -> &dyn StringSimilarity { &ExactMatch }
///     fn max_body_size(&self) -> usize { 1024 * 1024 }
/// }
/// ```
pub trait SignatureFactory: Send + Sync {
    /// 팩토리 이름 (로그용)
    fn name(&self) -> &'static str;

    /// 이 팩토리가 지문을 만들 수 있는 construct인지 반환합니다.
    fn is_supported_construct_id(&self, id: &ConstructId) -> bool;

    /// 메모리 내 construct에서 시그니처를 생성합니다.
    ///
    /// # Errors
    ///
    /// - 지원하지 않는 construct면 `SignatureEngineError::UnsupportedConstruct`
    /// - 본문이 최대 크기를 넘으면 `SignatureEngineError::BodyTooLarge`
    fn create_signature(&self, construct: &Construct) -> Result<Signature, SignatureEngineError>;

    /// 변경 점수 계산에 사용하는 유사도 알고리즘
    fn similarity(&self) -> &dyn StringSimilarity;

    /// 허용하는 본문 최대 크기 (바이트)
    fn max_body_size(&self) -> usize;

    /// 파일에서 본문을 읽어 시그니처를 생성합니다.
    ///
    /// # Errors
    ///
    /// - 지원하지 않는 construct면 `SignatureEngineError::UnsupportedConstruct`
    /// - 읽기 실패 시 `SignatureEngineError::Io`
    /// - 파일이 최대 크기를 넘으면 `SignatureEngineError::BodyTooLarge`
    fn create_signature_from_file(
        &self,
        id: &ConstructId,
        path: &Path,
    ) -> Result<Signature, SignatureEngineError> {
        if !self.is_supported_construct_id(id) {
            return Err(unsupported(id));
        }
        let body = read_body(id, path, self.max_body_size())?;
        let construct = Construct::new(id.clone(), body)
            .with_location(ConstructLocation::File(path.display().to_string()));
        self.create_signature(&construct)
    }

    /// 같은 construct의 두 시그니처를 비교합니다.
    ///
    /// # Errors
    ///
    /// ConstructId가 다르면 `SignatureEngineError::ConstructMismatch`
    fn compute_change(
        &self,
        from: &Signature,
        to: &Signature,
    ) -> Result<SignatureChange, SignatureEngineError> {
        compute_change_with(self.similarity(), from, to)
    }

    /// 한쪽이 없을 수 있는 두 시그니처를 비교합니다.
    fn compute_change_between(
        &self,
        from: Option<&Signature>,
        to: Option<&Signature>,
    ) -> Result<SignatureChange, SignatureEngineError> {
        compute_change_between(self.similarity(), from, to)
    }
}

/// 주어진 유사도 알고리즘으로 두 시그니처를 비교하고 분류합니다.
///
/// 점수가 1.0이면 `Unchanged`, 그 외(0.0 포함)는 `Modified`입니다.
/// 다이제스트 표현끼리는 바이트 완전 일치로만 비교합니다.
///
/// # Errors
///
/// - ConstructId가 다르면 `SignatureEngineError::ConstructMismatch`
/// - 생성 전략이 다르면 `SignatureEngineError::AlgorithmMismatch`
pub fn compute_change_with(
    similarity: &dyn StringSimilarity,
    from: &Signature,
    to: &Signature,
) -> Result<SignatureChange, SignatureEngineError> {
    if from.construct_id() != to.construct_id() {
        return Err(SignatureEngineError::ConstructMismatch {
            from: from.construct_id().to_string(),
            to: to.construct_id().to_string(),
        });
    }
    if from.algorithm() != to.algorithm() {
        return Err(SignatureEngineError::AlgorithmMismatch {
            from: from.algorithm().to_string(),
            to: to.algorithm().to_string(),
        });
    }

    let score = match (from.repr(), to.repr()) {
        (SignatureRepr::Digest(a), SignatureRepr::Digest(b)) => {
            if a == b {
                1.0
            } else {
                0.0
            }
        }
        (a, b) => similarity.calculate_similarity(&a.as_comparable(), &b.as_comparable()),
    };

    let change = SignatureChange::compared(from.clone(), to.clone(), score);
    record_change(&change, similarity.name());
    Ok(change)
}

/// 한쪽이 없을 수 있는 두 시그니처를 비교합니다.
///
/// 한쪽이 없으면 유사도 계산 없이 `Added` / `Removed`로 분류합니다.
///
/// # Errors
///
/// - 양쪽 모두 없으면 `SignatureEngineError::NoSignatures`
/// - 양쪽이 있으면 [`compute_change_with`]와 동일
pub fn compute_change_between(
    similarity: &dyn StringSimilarity,
    from: Option<&Signature>,
    to: Option<&Signature>,
) -> Result<SignatureChange, SignatureEngineError> {
    match (from, to) {
        (Some(from), Some(to)) => compute_change_with(similarity, from, to),
        (None, Some(to)) => {
            let change = SignatureChange::added(to.clone());
            record_change(&change, similarity.name());
            Ok(change)
        }
        (Some(from), None) => {
            let change = SignatureChange::removed(from.clone());
            record_change(&change, similarity.name());
            Ok(change)
        }
        (None, None) => Err(SignatureEngineError::NoSignatures),
    }
}

fn record_change(change: &SignatureChange, similarity: &str) {
    metrics::counter!(
        m::SIGNATURE_CHANGES_TOTAL,
        m::LABEL_CHANGE => change.change_type().as_str()
    )
    .increment(1);
    debug!(
        construct = %change.construct_id(),
        change = %change.change_type(),
        score = change.score(),
        similarity,
        "signature change computed"
    );
}

/// 지원하지 않는 construct 에러를 만들고 카운터를 증가시킵니다.
pub(crate) fn unsupported(id: &ConstructId) -> SignatureEngineError {
    metrics::counter!(
        m::SIGNATURE_UNSUPPORTED_TOTAL,
        m::LABEL_LANGUAGE => id.lang.as_str()
    )
    .increment(1);
    debug!(construct = %id, "unsupported construct");
    SignatureEngineError::UnsupportedConstruct {
        construct_id: id.to_string(),
        language: id.lang.as_str().to_owned(),
    }
}

/// 본문 크기 상한을 검사합니다.
pub(crate) fn check_body_size(
    construct: &Construct,
    max_body_size: usize,
) -> Result<(), SignatureEngineError> {
    if construct.body.len() > max_body_size {
        return Err(SignatureEngineError::BodyTooLarge {
            construct_id: construct.id.to_string(),
            size: construct.body.len() as u64,
            max: max_body_size as u64,
        });
    }
    Ok(())
}

/// 시그니처 생성 카운터를 증가시킵니다.
pub(crate) fn record_created(signature: &Signature, factory: &str) {
    metrics::counter!(
        m::SIGNATURE_CREATED_TOTAL,
        m::LABEL_LANGUAGE => signature.construct_id().lang.as_str()
    )
    .increment(1);
    debug!(
        construct = %signature.construct_id(),
        factory,
        size = signature.repr().len(),
        "signature created"
    );
}

/// 파일에서 본문을 최대 `max_body_size`까지 읽습니다.
///
/// 상한보다 한 바이트 더 읽어 초과 여부를 판정하므로 메타데이터 크기에 의존하지 않습니다.
fn read_body(
    id: &ConstructId,
    path: &Path,
    max_body_size: usize,
) -> Result<String, SignatureEngineError> {
    let io_err = |source| SignatureEngineError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut buf = Vec::new();
    file.take(max_body_size as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(io_err)?;

    if buf.len() > max_body_size {
        return Err(SignatureEngineError::BodyTooLarge {
            construct_id: id.to_string(),
            size: buf.len() as u64,
            max: max_body_size as u64,
        });
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 언어별 팩토리 레지스트리
///
/// JavaScript처럼 정규화 프론트엔드가 없는 언어는 다이제스트 팩토리로 처리합니다.
pub struct SignatureFactories {
    java: JavaSignatureFactory,
    python: PythonSignatureFactory,
    digest: DigestSignatureFactory,
}

impl SignatureFactories {
    /// 설정으로 모든 팩토리를 생성합니다.
    pub fn from_config(config: &SignatureEngineConfig) -> Self {
        Self {
            java: JavaSignatureFactory::new(config),
            python: PythonSignatureFactory::new(config),
            digest: DigestSignatureFactory::new(config),
        }
    }

    /// 언어에 맞는 팩토리를 반환합니다.
    pub fn for_language(&self, lang: ProgrammingLanguage) -> &dyn SignatureFactory {
        match lang {
            ProgrammingLanguage::Java => &self.java,
            ProgrammingLanguage::Python => &self.python,
            ProgrammingLanguage::JavaScript => &self.digest,
        }
    }

    /// construct 식별자의 언어에 맞는 팩토리를 반환합니다.
    pub fn for_construct(&self, id: &ConstructId) -> &dyn SignatureFactory {
        self.for_language(id.lang)
    }

    /// 언어 무관 다이제스트 팩토리
    pub fn digest(&self) -> &DigestSignatureFactory {
        &self.digest
    }
}

impl Default for SignatureFactories {
    fn default() -> Self {
        Self::from_config(&SignatureEngineConfig::default())
    }
}
