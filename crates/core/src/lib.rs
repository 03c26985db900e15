#![doc = include_str!("../README.md")]

pub mod config;
pub mod digest;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, DigestError, MaliceError, PatchwardError, SignatureError};

// 설정
pub use config::PatchwardConfig;

// 다이제스트
pub use digest::{DigestAlgorithm, digest_file};

// 도메인 타입
pub use types::{
    Construct, ConstructId, ConstructLocation, ConstructType, ProgrammingLanguage, UnknownVariant,
};
