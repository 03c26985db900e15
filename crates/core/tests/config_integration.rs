//! patchward.toml 통합 설정 테스트
//!
//! - patchward.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use patchward_core::config::PatchwardConfig;
use patchward_core::error::{ConfigError, PatchwardError};
use serial_test::serial;

// =============================================================================
// patchward.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../patchward.toml.example");
    let config = PatchwardConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../patchward.toml.example");
    let config = PatchwardConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_has_expected_signature_section() {
    let content = include_str!("../../../patchward.toml.example");
    let config = PatchwardConfig::parse(content).expect("should parse");

    assert_eq!(config.signature.java_similarity, "ngram");
    assert_eq!(config.signature.python_similarity, "levenshtein");
    assert_eq!(config.signature.ngram_size, 2);
    assert_eq!(config.signature.max_body_size, 1_048_576);
    assert!(config.signature.strip_comments);
}

#[test]
fn example_config_has_expected_malice_section() {
    let content = include_str!("../../../patchward.toml.example");
    let config = PatchwardConfig::parse(content).expect("should parse");

    assert_eq!(
        config.malice.analyzers,
        vec!["zip-slip", "zip-bomb", "symlink"]
    );
    assert_eq!(config.malice.max_entries, 1_000_000);
    assert_eq!(config.malice.max_compression_ratio, 100);
    assert_eq!(config.malice.max_total_uncompressed, 4_294_967_296);
    assert_eq!(config.malice.workers, 4);
}

// =============================================================================
// 부분 설정 / 에러 테스트
// =============================================================================

#[test]
fn only_malice_section_uses_defaults_elsewhere() {
    let config = PatchwardConfig::parse("[malice]\nworkers = 2\n").expect("should parse");
    assert_eq!(config.malice.workers, 2);
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.signature.java_similarity, "ngram");
}

#[test]
fn wrong_type_is_parse_error() {
    let err = PatchwardConfig::parse("[malice]\nworkers = \"many\"\n").unwrap_err();
    assert!(matches!(
        err,
        PatchwardError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patchward.toml");
    std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").unwrap();

    let err = PatchwardConfig::load(&path).await.unwrap_err();
    assert!(matches!(
        err,
        PatchwardError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
#[serial]
async fn env_override_wins_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patchward.toml");
    std::fs::write(&path, "[malice]\nworkers = 2\n").unwrap();

    // SAFETY: #[serial]로 직렬 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("PATCHWARD_MALICE_WORKERS", "12") };
    let result = PatchwardConfig::load(&path).await;
    unsafe { std::env::remove_var("PATCHWARD_MALICE_WORKERS") };

    let config = result.expect("should load");
    assert_eq!(config.malice.workers, 12);
}

#[tokio::test]
#[serial]
async fn env_override_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patchward.toml");
    std::fs::write(&path, "").unwrap();

    // SAFETY: #[serial]로 직렬 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("PATCHWARD_MALICE_ANALYZERS", "zip-slip,trojan") };
    let result = PatchwardConfig::load(&path).await;
    unsafe { std::env::remove_var("PATCHWARD_MALICE_ANALYZERS") };

    assert!(result.is_err());
}
