//! 다이제스트 시그니처 팩토리 -- 언어 무관 완전 일치 비교

use std::path::Path;

use patchward_core::digest::{DigestAlgorithm, digest_bytes, digest_file};
use patchward_core::error::DigestError;
use patchward_core::types::{Construct, ConstructId, ConstructType};

use super::{SignatureFactory, check_body_size, record_created, unsupported};
use crate::config::SignatureEngineConfig;
use crate::error::SignatureEngineError;
use crate::signature::Signature;
use crate::similarity::{ExactMatch, StringSimilarity};

/// 원본 본문을 해시하는 팩토리
///
/// 정규화를 하지 않으므로 공백 한 글자만 달라도 `Modified`입니다.
/// 패키지는 본문이 없으므로 지원하지 않습니다.
pub struct DigestSignatureFactory {
    algorithm: DigestAlgorithm,
    max_body_size: usize,
}

impl DigestSignatureFactory {
    /// 설정으로 팩토리를 생성합니다.
    pub fn new(config: &SignatureEngineConfig) -> Self {
        Self {
            algorithm: config.digest_algorithm,
            max_body_size: config.max_body_size,
        }
    }

    /// 사용하는 다이제스트 알고리즘
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl Default for DigestSignatureFactory {
    fn default() -> Self {
        Self::new(&SignatureEngineConfig::default())
    }
}

impl SignatureFactory for DigestSignatureFactory {
    fn name(&self) -> &'static str {
        "digest"
    }

    fn is_supported_construct_id(&self, id: &ConstructId) -> bool {
        id.construct_type != ConstructType::Package
    }

    fn create_signature(&self, construct: &Construct) -> Result<Signature, SignatureEngineError> {
        if !self.is_supported_construct_id(&construct.id) {
            return Err(unsupported(&construct.id));
        }
        check_body_size(construct, self.max_body_size)?;

        let bytes = digest_bytes(construct.body.as_bytes(), self.algorithm);
        let signature = Signature::digest(construct.id.clone(), self.algorithm, bytes);
        record_created(&signature, self.name());
        Ok(signature)
    }

    /// 파일을 스트리밍으로 해시하므로 본문 크기 상한을 적용하지 않습니다.
    fn create_signature_from_file(
        &self,
        id: &ConstructId,
        path: &Path,
    ) -> Result<Signature, SignatureEngineError> {
        if !self.is_supported_construct_id(id) {
            return Err(unsupported(id));
        }
        let bytes = digest_file(path, self.algorithm).map_err(|e| match e {
            DigestError::Io { path, source } => SignatureEngineError::Io { path, source },
            DigestError::UnsupportedAlgorithm(name) => SignatureEngineError::Config {
                field: "digest_algorithm".to_owned(),
                reason: format!("[{name}] is not a valid digest algorithm"),
            },
        })?;
        let signature = Signature::digest(id.clone(), self.algorithm, bytes);
        record_created(&signature, self.name());
        Ok(signature)
    }

    fn similarity(&self) -> &dyn StringSimilarity {
        &ExactMatch
    }

    fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{ChangeType, SignatureAlgorithm};
    use patchward_core::types::ProgrammingLanguage;
    use std::io::Write;

    fn js(body: &str) -> Construct {
        Construct::new(
            ConstructId::new(ProgrammingLanguage::JavaScript, ConstructType::Function, "lib.f"),
            body,
        )
    }

    #[test]
    fn any_language_is_supported_except_packages() {
        let factory = DigestSignatureFactory::default();
        for lang in ProgrammingLanguage::ALL {
            let id = ConstructId::new(lang, ConstructType::Function, "x");
            assert!(factory.is_supported_construct_id(&id));
            let id = ConstructId::new(lang, ConstructType::Package, "x");
            assert!(!factory.is_supported_construct_id(&id));
        }
    }

    #[test]
    fn whitespace_difference_is_modified_with_zero_score() {
        let factory = DigestSignatureFactory::default();
        let a = factory.create_signature(&js("return 1;")).unwrap();
        let b = factory.create_signature(&js("return  1;")).unwrap();
        let change = factory.compute_change(&a, &b).unwrap();
        assert_eq!(change.change_type(), ChangeType::Modified);
        assert_eq!(change.score(), 0.0);
    }

    #[test]
    fn same_body_is_unchanged() {
        let factory = DigestSignatureFactory::default();
        let a = factory.create_signature(&js("return 1;")).unwrap();
        let b = factory.create_signature(&js("return 1;")).unwrap();
        assert_eq!(
            factory.compute_change(&a, &b).unwrap().change_type(),
            ChangeType::Unchanged
        );
        assert_eq!(a.algorithm(), SignatureAlgorithm::Digest(DigestAlgorithm::Sha256));
    }

    #[test]
    fn file_signature_matches_in_memory_signature() {
        let factory = DigestSignatureFactory::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"function f() { return 1; }").unwrap();
        file.flush().unwrap();

        let construct = js("function f() { return 1; }");
        let from_file = factory
            .create_signature_from_file(&construct.id, file.path())
            .unwrap();
        let in_memory = factory.create_signature(&construct).unwrap();
        assert_eq!(from_file.repr(), in_memory.repr());
    }

    #[test]
    fn missing_file_is_io_error() {
        let factory = DigestSignatureFactory::default();
        let construct = js("");
        let err = factory
            .create_signature_from_file(&construct.id, Path::new("/nonexistent/patchward.js"))
            .unwrap_err();
        assert!(matches!(err, SignatureEngineError::Io { .. }));
    }
}
