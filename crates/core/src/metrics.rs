//! 메트릭 상수 정의
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 엔진은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 익스포터는 설치하지 않으며, 임베딩 프로세스가 레코더를 설치하지 않으면 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `patchward_`
//! - 엔진명: `signature_`, `malice_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(patchward_core::metrics::MALICE_ARCHIVES_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 변경 분류 레이블 키 (UNCHANGED, MODIFIED, ADDED, REMOVED)
pub const LABEL_CHANGE: &str = "change";

/// 언어 레이블 키 (JAVA, PY, JS)
pub const LABEL_LANGUAGE: &str = "language";

/// 분석기 레이블 키 (zip-slip, zip-bomb, symlink)
pub const LABEL_ANALYZER: &str = "analyzer";

/// 아카이브 형식 레이블 키 (zip, jar, tar, tar.gz)
pub const LABEL_ARCHIVE_KIND: &str = "kind";

// ─── Signature Engine 메트릭 ────────────────────────────────────────

/// Signature: 생성된 시그니처 수 (counter, label: language)
pub const SIGNATURE_CREATED_TOTAL: &str = "patchward_signature_created_total";

/// Signature: 지원하지 않는 construct로 건너뛴 수 (counter, label: language)
pub const SIGNATURE_UNSUPPORTED_TOTAL: &str = "patchward_signature_unsupported_total";

/// Signature: 계산된 변경 수 (counter, label: change)
pub const SIGNATURE_CHANGES_TOTAL: &str = "patchward_signature_changes_total";

// ─── Malice Scanner 메트릭 ──────────────────────────────────────────

/// Malice: 스캔한 아카이브 수 (counter, label: kind)
pub const MALICE_ARCHIVES_SCANNED_TOTAL: &str = "patchward_malice_archives_scanned_total";

/// Malice: 순회한 아카이브 엔트리 수 (counter)
pub const MALICE_ENTRIES_WALKED_TOTAL: &str = "patchward_malice_entries_walked_total";

/// Malice: 악성 판정 수 (counter, label: analyzer)
pub const MALICE_MALICIOUS_TOTAL: &str = "patchward_malice_malicious_total";

/// Malice: 손상된 아카이브 수 (counter)
pub const MALICE_CORRUPT_ARCHIVES_TOTAL: &str = "patchward_malice_corrupt_archives_total";
