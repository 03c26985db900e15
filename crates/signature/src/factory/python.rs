//! Python 시그니처 팩토리

use patchward_core::types::{Construct, ConstructId, ConstructType, ProgrammingLanguage};

use super::{SignatureFactory, check_body_size, record_created, unsupported};
use crate::config::SignatureEngineConfig;
use crate::error::SignatureEngineError;
use crate::normalize::normalize_python;
use crate::signature::Signature;
use crate::similarity::StringSimilarity;

const SUPPORTED_TYPES: [ConstructType; 5] = [
    ConstructType::Function,
    ConstructType::Method,
    ConstructType::Constructor,
    ConstructType::Module,
    ConstructType::Class,
];

/// Python 소스 정규화 팩토리
///
/// 들여쓰기는 의미가 있으므로 제거하지 않고 중첩 깊이로 정규화합니다.
pub struct PythonSignatureFactory {
    similarity: Box<dyn StringSimilarity>,
    strip_comments: bool,
    max_body_size: usize,
}

impl PythonSignatureFactory {
    /// 설정으로 팩토리를 생성합니다.
    pub fn new(config: &SignatureEngineConfig) -> Self {
        Self {
            similarity: config.python_similarity.build(config.ngram_size),
            strip_comments: config.strip_comments,
            max_body_size: config.max_body_size,
        }
    }

    /// 유사도 알고리즘을 교체합니다.
    pub fn with_similarity(mut self, similarity: Box<dyn StringSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }
}

impl Default for PythonSignatureFactory {
    fn default() -> Self {
        Self::new(&SignatureEngineConfig::default())
    }
}

impl SignatureFactory for PythonSignatureFactory {
    fn name(&self) -> &'static str {
        "python"
    }

    fn is_supported_construct_id(&self, id: &ConstructId) -> bool {
        id.lang == ProgrammingLanguage::Python && SUPPORTED_TYPES.contains(&id.construct_type)
    }

    fn create_signature(&self, construct: &Construct) -> Result<Signature, SignatureEngineError> {
        if !self.is_supported_construct_id(&construct.id) {
            return Err(unsupported(&construct.id));
        }
        check_body_size(construct, self.max_body_size)?;

        let normalized = normalize_python(&construct.body, self.strip_comments);
        let signature = Signature::normalized(construct.id.clone(), normalized);
        record_created(&signature, self.name());
        Ok(signature)
    }

    fn similarity(&self) -> &dyn StringSimilarity {
        self.similarity.as_ref()
    }

    fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}
