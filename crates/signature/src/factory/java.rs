//! Java 시그니처 팩토리
//!
//! 메서드, 생성자, 정적 초기화 블록, 타입 선언 본문을 정규화하여 지문을 만듭니다.
//! 패키지와 필드는 비교할 본문이 없으므로 지원하지 않습니다.

use patchward_core::types::{Construct, ConstructId, ConstructType, ProgrammingLanguage};

use super::{SignatureFactory, check_body_size, record_created, unsupported};
use crate::config::SignatureEngineConfig;
use crate::error::SignatureEngineError;
use crate::normalize::normalize_java;
use crate::signature::Signature;
use crate::similarity::StringSimilarity;

/// 지원하는 construct 종류
const SUPPORTED_TYPES: [ConstructType; 6] = [
    ConstructType::Method,
    ConstructType::Constructor,
    ConstructType::ClassInit,
    ConstructType::Class,
    ConstructType::Enum,
    ConstructType::Interface,
];

/// Java 소스 정규화 팩토리
pub struct JavaSignatureFactory {
    similarity: Box<dyn StringSimilarity>,
    strip_comments: bool,
    max_body_size: usize,
}

impl JavaSignatureFactory {
    /// 설정으로 팩토리를 생성합니다.
    pub fn new(config: &SignatureEngineConfig) -> Self {
        Self {
            similarity: config.java_similarity.build(config.ngram_size),
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

impl Default for JavaSignatureFactory {
    fn default() -> Self {
        Self::new(&SignatureEngineConfig::default())
    }
}

impl SignatureFactory for JavaSignatureFactory {
    fn name(&self) -> &'static str {
        "java"
    }

    fn is_supported_construct_id(&self, id: &ConstructId) -> bool {
        id.lang == ProgrammingLanguage::Java && SUPPORTED_TYPES.contains(&id.construct_type)
    }

    fn create_signature(&self, construct: &Construct) -> Result<Signature, SignatureEngineError> {
        if !self.is_supported_construct_id(&construct.id) {
            return Err(unsupported(&construct.id));
        }
        check_body_size(construct, self.max_body_size)?;

        let normalized = normalize_java(&construct.body, self.strip_comments);
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
