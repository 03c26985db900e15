#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`SignatureEngineError`)
//! - [`config`]: Engine configuration (`SignatureEngineConfig`, builder)
//! - [`similarity`]: Similarity algorithms (`StringSimilarity` trait, Levenshtein, n-gram, Jaccard)
//! - [`normalize`]: Language-specific source normalization
//! - [`signature`]: `Signature`, `SignatureChange`, `ChangeType`
//! - [`factory`]: Per-language factories (`SignatureFactory` trait, Java, Python, digest)
//! - [`compare`]: Whole-version comparison (`compare_versions`)
//! - [`assess`]: Patch assessment against vulnerable/fixed references (`assess_patch`)

pub mod assess;
pub mod compare;
pub mod config;
pub mod error;
pub mod factory;
pub mod normalize;
pub mod signature;
pub mod similarity;

// --- Public API Re-exports ---

// Configuration
pub use config::{SignatureEngineConfig, SignatureEngineConfigBuilder};

// Error
pub use error::SignatureEngineError;

// Signatures
pub use signature::{ChangeType, Signature, SignatureAlgorithm, SignatureChange, SignatureRepr};

// Factories
pub use factory::{
    DigestSignatureFactory, JavaSignatureFactory, PythonSignatureFactory, SignatureFactories,
    SignatureFactory, compute_change_between, compute_change_with,
};

// Similarity
pub use similarity::{SimilarityAlgorithm, StringSimilarity};

// Comparison and assessment
pub use assess::{PatchAssessment, PatchVerdict, assess_construct, assess_patch};
pub use compare::{ConstructFailure, VersionComparison, compare_versions};
