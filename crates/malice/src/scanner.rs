//! 악성 분석 스캐너 -- 분석기 실행과 병렬 배치 스캔
//!
//! [`MaliceScanner`]는 설정된 분석기를 아카이브 한 개에 순서대로 실행하고
//! 최대 점수로 결과를 합칩니다. [`MaliceScanner::scan_all`]은 여러 파일을
//! `spawn_blocking` 워커에서 병렬로 스캔하며 동시 실행 수를 세마포어로 제한합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! paths --> Semaphore(workers) --> spawn_blocking(scan) --> Vec<FileScanOutcome>
//!                                        |
//!                          detect --> analyzers --> aggregate --> ScanReport
//! ```
//!
//! 한 파일의 실패(손상, I/O)는 해당 항목의 `Err`로만 반환되며 배치를 중단하지 않습니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use patchward_core::metrics as m;

use crate::analyzer::{MaliciousnessAnalysisResult, MaliciousnessAnalyzer, aggregate};
use crate::archive::{ArchiveKind, detect};
use crate::config::MaliceScannerConfig;
use crate::error::MaliceScanError;

/// 아카이브 한 개의 스캔 결과
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// 아카이브 경로
    pub path: String,
    /// 판별된 형식
    pub kind: ArchiveKind,
    /// 합산 점수 (분석기 결과 중 최대)
    pub score: f64,
    /// 악성 여부
    pub malicious: bool,
    /// 분석기별 결과 (실행 순서)
    pub results: Vec<MaliciousnessAnalysisResult>,
    /// 악성 판정 이후에도 남은 분석기 실패 (`분석기: 메시지`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ScanReport {
    /// 점수가 가장 높은 결과 (동점이면 먼저 실행된 분석기)
    pub fn top_result(&self) -> Option<&MaliciousnessAnalysisResult> {
        aggregate(&self.results)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.malicious { "MALICIOUS" } else { "BENIGN" };
        write!(f, "{verdict} {} [{}] (score: {:.1})", self.path, self.kind, self.score)
    }
}

/// 배치 스캔의 항목별 결과
#[derive(Debug)]
pub struct FileScanOutcome {
    /// 입력 경로
    pub path: PathBuf,
    /// 스캔 결과 또는 항목 에러
    pub result: Result<ScanReport, MaliceScanError>,
}

/// 악성 분석 스캐너
///
/// 내부 상태를 `Arc`로 공유하므로 복제 비용이 작고, 복제본은 같은 카운터를 갱신합니다.
#[derive(Clone)]
pub struct MaliceScanner {
    inner: Arc<Inner>,
}

struct Inner {
    config: MaliceScannerConfig,
    analyzers: Vec<Box<dyn MaliciousnessAnalyzer>>,
    /// 스캔 완료 아카이브 수
    archives_scanned: AtomicU64,
    /// 악성 판정 수
    malicious_found: AtomicU64,
    /// 손상 아카이브 수
    corrupt_found: AtomicU64,
}

impl MaliceScanner {
    /// 기본 설정으로 스캐너를 생성합니다.
    pub fn new() -> Self {
        let config = MaliceScannerConfig::default();
        let analyzers = config.analyzers.iter().map(|kind| kind.build(&config)).collect();
        Self::from_parts(config, analyzers)
    }

    fn from_parts(config: MaliceScannerConfig, analyzers: Vec<Box<dyn MaliciousnessAnalyzer>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                analyzers,
                archives_scanned: AtomicU64::new(0),
                malicious_found: AtomicU64::new(0),
                corrupt_found: AtomicU64::new(0),
            }),
        }
    }

    /// 스캐너 설정
    pub fn config(&self) -> &MaliceScannerConfig {
        &self.inner.config
    }

    /// 실행 순서대로의 분석기 이름
    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.inner.analyzers.iter().map(|a| a.name()).collect()
    }

    /// 스캔 완료 아카이브 수를 반환합니다.
    pub fn archives_scanned(&self) -> u64 {
        self.inner.archives_scanned.load(Ordering::Relaxed)
    }

    /// 악성 판정 수를 반환합니다.
    pub fn malicious_found(&self) -> u64 {
        self.inner.malicious_found.load(Ordering::Relaxed)
    }

    /// 손상 아카이브 수를 반환합니다.
    pub fn corrupt_found(&self) -> u64 {
        self.inner.corrupt_found.load(Ordering::Relaxed)
    }

    /// 아카이브 한 개를 스캔합니다 (동기 I/O).
    ///
    /// 비동기 컨텍스트에서는 `spawn_blocking` 안에서 호출하거나 [`scan_all`](Self::scan_all)을
    /// 사용합니다.
    ///
    /// # Errors
    ///
    /// 모든 분석기를 실행한 뒤, 악성 판정에 도달한 분석기가 없고 실패한 분석기가 있으면
    /// 첫 번째 실패를 반환합니다. 손상된 아카이브는 양성으로 취급하지 않습니다.
    /// 다른 분석기가 이미 악성으로 판정했다면 실패는 [`ScanReport::errors`]에 남깁니다.
    pub fn scan(&self, path: &Path) -> Result<ScanReport, MaliceScanError> {
        let kind = detect(path)?;

        let mut results = Vec::with_capacity(self.inner.analyzers.len());
        let mut failures: Vec<(&'static str, MaliceScanError)> = Vec::new();
        for analyzer in &self.inner.analyzers {
            match analyzer.is_malicious(path) {
                Ok(result) => {
                    debug!(
                        path = %path.display(),
                        analyzer = analyzer.name(),
                        score = result.score,
                        "analyzer finished"
                    );
                    results.push(result);
                }
                Err(e) => {
                    debug!(
                        path = %path.display(),
                        analyzer = analyzer.name(),
                        error = %e,
                        "analyzer failed"
                    );
                    failures.push((analyzer.name(), e));
                }
            }
        }

        if failures.iter().any(|(_, e)| e.is_corrupt()) {
            self.inner.corrupt_found.fetch_add(1, Ordering::Relaxed);
        }

        let top = aggregate(&results);
        let score = top.map_or(0.0, |r| r.score);
        let malicious = top.is_some_and(MaliciousnessAnalysisResult::is_malicious);

        if !malicious && !failures.is_empty() {
            return Err(failures.swap_remove(0).1);
        }
        // 여기까지 남은 실패는 악성 판정을 뒤집지 않음
        let errors: Vec<String> = failures
            .iter()
            .map(|(name, e)| format!("{name}: {e}"))
            .collect();

        self.inner.archives_scanned.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(m::MALICE_ARCHIVES_SCANNED_TOTAL, m::LABEL_ARCHIVE_KIND => kind.as_str())
            .increment(1);

        if let Some(top) = top.filter(|r| r.is_malicious()) {
            self.inner.malicious_found.fetch_add(1, Ordering::Relaxed);
            metrics::counter!(m::MALICE_MALICIOUS_TOTAL, m::LABEL_ANALYZER => top.analyzer.clone())
                .increment(1);
            warn!(path = %path.display(), kind = %kind, finding = %top, "malicious archive detected");
            if !errors.is_empty() {
                warn!(
                    path = %path.display(),
                    failed = errors.len(),
                    "malicious verdict kept despite analyzer failures"
                );
            }
        }

        Ok(ScanReport {
            path: path.display().to_string(),
            kind,
            score,
            malicious,
            results,
            errors,
        })
    }

    /// 여러 아카이브를 병렬로 스캔합니다.
    ///
    /// 동시 실행 수는 `workers`로 제한되며, 결과는 입력 순서를 유지합니다.
    /// 항목별 에러는 해당 `FileScanOutcome::result`에만 담깁니다.
    pub async fn scan_all(&self, paths: Vec<PathBuf>) -> Vec<FileScanOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.inner.config.workers));
        let mut pending = Vec::with_capacity(paths.len());

        for path in paths {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| MaliceScanError::Task(format!("worker semaphore closed: {e}")));
            let scanner = self.clone();
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit?;
                scanner.scan(&task_path)
            });
            pending.push((path, handle));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (path, handle) in pending {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(MaliceScanError::Task(format!("scan task failed: {e}"))),
            };
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "archive scan failed");
            }
            outcomes.push(FileScanOutcome { path, result });
        }

        let malicious = outcomes
            .iter()
            .filter(|o| o.result.as_ref().is_ok_and(|r| r.malicious))
            .count();
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            total = outcomes.len(),
            malicious,
            failed,
            workers = self.inner.config.workers,
            "batch scan completed"
        );

        outcomes
    }
}

impl Default for MaliceScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MaliceScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaliceScanner")
            .field("analyzers", &self.analyzer_names())
            .field("workers", &self.inner.config.workers)
            .field("archives_scanned", &self.archives_scanned())
            .finish()
    }
}

/// 악성 분석 스캐너 빌더
pub struct MaliceScannerBuilder {
    config: MaliceScannerConfig,
    extra: Vec<Box<dyn MaliciousnessAnalyzer>>,
}

impl MaliceScannerBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: MaliceScannerConfig::default(),
            extra: Vec::new(),
        }
    }

    /// 스캐너 설정을 지정합니다.
    pub fn config(mut self, config: MaliceScannerConfig) -> Self {
        self.config = config;
        self
    }

    /// 설정된 분석기 뒤에 실행할 분석기를 추가합니다.
    pub fn analyzer(mut self, analyzer: Box<dyn MaliciousnessAnalyzer>) -> Self {
        self.extra.push(analyzer);
        self
    }

    /// 스캐너를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `MaliceScanError::Config` 반환
    pub fn build(self) -> Result<MaliceScanner, MaliceScanError> {
        self.config.validate()?;

        let mut analyzers: Vec<Box<dyn MaliciousnessAnalyzer>> = self
            .config
            .analyzers
            .iter()
            .map(|kind| kind.build(&self.config))
            .collect();
        analyzers.extend(self.extra);

        Ok(MaliceScanner::from_parts(self.config, analyzers))
    }
}

impl Default for MaliceScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzerKind;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_in(dir: &Path, file_name: &str, entries: &[&str]) -> PathBuf {
        let path = dir.join(file_name);
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        for name in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(b"content").unwrap();
        }
        writer.finish().unwrap();
        path
    }

    struct AlwaysHalf;

    impl MaliciousnessAnalyzer for AlwaysHalf {
        fn name(&self) -> &'static str {
            "always-half"
        }

        fn is_malicious(&self, _path: &Path) -> Result<MaliciousnessAnalysisResult, MaliceScanError> {
            Ok(MaliciousnessAnalysisResult {
                score: 0.5,
                analyzer: "always-half".to_owned(),
                evidence: None,
            })
        }
    }

    #[test]
    fn default_scanner_runs_all_analyzers() {
        let scanner = MaliceScanner::new();
        assert_eq!(scanner.analyzer_names(), vec!["zip-slip", "zip-bomb", "symlink"]);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = MaliceScannerConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(MaliceScannerBuilder::new().config(config).build().is_err());
    }

    #[test]
    fn scan_benign_and_malicious() {
        let dir = tempfile::tempdir().unwrap();
        let good = zip_in(dir.path(), "good.zip", &["a.txt", "b/c.txt"]);
        let bad = zip_in(dir.path(), "bad.zip", &["a.txt", "../../x.sh"]);

        let scanner = MaliceScanner::new();
        let report = scanner.scan(&good).unwrap();
        assert!(!report.malicious);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.results.len(), 3);

        let report = scanner.scan(&bad).unwrap();
        assert!(report.malicious);
        assert_eq!(report.top_result().unwrap().analyzer, "zip-slip");
        assert!(report.to_string().starts_with("MALICIOUS"));

        assert_eq!(scanner.archives_scanned(), 2);
        assert_eq!(scanner.malicious_found(), 1);
    }

    #[test]
    fn corrupt_archive_is_error_not_benign() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"PK\x03\x04 truncated").unwrap();

        let scanner = MaliceScanner::new();
        let err = scanner.scan(&path).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(scanner.corrupt_found(), 1);
        assert_eq!(scanner.archives_scanned(), 0);
    }

    /// `../../evil.sh` 엔트리 뒤에 체크섬이 깨진 헤더가 오는 tar
    fn traversal_then_corrupt_tar(dir: &Path) -> PathBuf {
        let mut builder = tar::Builder::new(Vec::new());

        // `append_data`는 `..` 경로를 거부하므로 이름 필드를 직접 채움
        let mut header = tar::Header::new_gnu();
        let name = b"../../evil.sh";
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        header.set_size(4);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, &b"boom"[..]).unwrap();

        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, "later.txt", &b"hello"[..]).unwrap();

        let mut bytes = builder.into_inner().unwrap();
        // 두 번째 헤더(1024) 체크섬 손상
        bytes[1024 + 148] = b'9';

        let path = dir.join("mixed.tar");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn malicious_verdict_survives_later_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = traversal_then_corrupt_tar(dir.path());

        let scanner = MaliceScanner::new();
        let report = scanner.scan(&path).unwrap();
        assert!(report.malicious);
        assert_eq!(report.score, 1.0);
        assert_eq!(report.kind, ArchiveKind::Tar);
        let top = report.top_result().unwrap();
        assert_eq!(top.analyzer, "zip-slip");
        assert_eq!(
            top.evidence.as_ref().and_then(|e| e.entry_path.as_deref()),
            Some("../../evil.sh")
        );
        // zip-bomb, symlink는 손상 헤더까지 읽다가 실패
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("zip-bomb: "));
        assert!(report.errors[1].starts_with("symlink: "));

        assert_eq!(scanner.archives_scanned(), 1);
        assert_eq!(scanner.malicious_found(), 1);
        assert_eq!(scanner.corrupt_found(), 1);
    }

    #[test]
    fn corruption_without_verdict_is_still_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = traversal_then_corrupt_tar(dir.path());

        let config = MaliceScannerConfig {
            analyzers: vec![AnalyzerKind::ZipBomb, AnalyzerKind::Symlink],
            ..Default::default()
        };
        let scanner = MaliceScannerBuilder::new().config(config).build().unwrap();
        let err = scanner.scan(&path).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(scanner.archives_scanned(), 0);
        assert_eq!(scanner.corrupt_found(), 1);
    }

    #[test]
    fn custom_analyzer_participates_in_aggregation() {
        let dir = tempfile::tempdir().unwrap();
        let good = zip_in(dir.path(), "good.zip", &["a.txt"]);

        let config = MaliceScannerConfig {
            analyzers: vec![AnalyzerKind::ZipSlip],
            ..Default::default()
        };
        let scanner = MaliceScannerBuilder::new()
            .config(config)
            .analyzer(Box::new(AlwaysHalf))
            .build()
            .unwrap();
        let report = scanner.scan(&good).unwrap();
        assert_eq!(report.score, 0.5);
        assert!(report.malicious);
        assert_eq!(report.top_result().unwrap().analyzer, "always-half");
    }

    #[tokio::test]
    async fn scan_all_keeps_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = zip_in(dir.path(), "good.zip", &["a.txt"]);
        let bad = zip_in(dir.path(), "bad.zip", &["../evil"]);
        let broken = dir.path().join("broken.zip");
        std::fs::write(&broken, b"not a zip").unwrap();
        let missing = dir.path().join("missing.zip");

        let config = MaliceScannerConfig {
            workers: 2,
            ..Default::default()
        };
        let scanner = MaliceScannerBuilder::new().config(config).build().unwrap();
        let outcomes = scanner
            .scan_all(vec![good.clone(), bad.clone(), broken.clone(), missing.clone()])
            .await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0].path, good);
        assert!(!outcomes[0].result.as_ref().unwrap().malicious);
        assert!(outcomes[1].result.as_ref().unwrap().malicious);
        assert!(outcomes[2].result.as_ref().unwrap_err().is_corrupt());
        assert!(matches!(
            outcomes[3].result,
            Err(MaliceScanError::Io { .. })
        ));
        assert_eq!(scanner.archives_scanned(), 2);
    }

    #[tokio::test]
    async fn scan_all_with_single_worker() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| zip_in(dir.path(), &format!("a{i}.zip"), &["x.txt"]))
            .collect();

        let config = MaliceScannerConfig {
            workers: 1,
            ..Default::default()
        };
        let scanner = MaliceScannerBuilder::new().config(config).build().unwrap();
        let outcomes = scanner.scan_all(paths.clone()).await;
        let returned: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(returned, paths);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }
}
