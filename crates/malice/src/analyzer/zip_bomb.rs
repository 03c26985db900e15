//! 압축 폭탄(zip-bomb) 분석기
//!
//! 선언된 크기만으로 판정하며 내용을 압축 해제하지 않습니다.
//!
//! - zip/jar: 엔트리별 `size / compressed_size` 비율 (작은 엔트리는 제외)
//! - tar.gz: 선언 크기 합계 / 파일 크기 비율
//! - 모든 형식: 선언 크기 합계가 `max_total_uncompressed` 초과

use std::ops::ControlFlow;
use std::path::Path;

use tracing::debug;

use super::{MaliciousnessAnalysisResult, MaliciousnessAnalyzer};
use crate::archive::{ArchiveKind, ArchiveWalker, EntryType, detect};
use crate::error::MaliceScanError;

const NAME: &str = "zip-bomb";

/// 압축률 검사 최소 선언 크기 (1 MiB). 작은 엔트리는 높은 비율이 흔함
const MIN_RATIO_CHECK_SIZE: u64 = 1024 * 1024;

/// 압축 폭탄 분석기
#[derive(Debug, Clone)]
pub struct ZipBombAnalyzer {
    walker: ArchiveWalker,
    max_compression_ratio: u64,
    max_total_uncompressed: u64,
}

impl ZipBombAnalyzer {
    /// 상한값을 지정하여 생성합니다.
    pub fn new(max_entries: usize, max_compression_ratio: u64, max_total_uncompressed: u64) -> Self {
        Self {
            walker: ArchiveWalker::new(max_entries),
            max_compression_ratio,
            max_total_uncompressed,
        }
    }

    /// 엔트리 비율이 상한을 넘는지 확인합니다. 압축 크기 0은 무한대 비율입니다.
    fn ratio_exceeded(&self, size: u64, compressed: u64) -> bool {
        if size < MIN_RATIO_CHECK_SIZE {
            return false;
        }
        if compressed == 0 {
            return true;
        }
        size / compressed > self.max_compression_ratio
    }
}

impl Default for ZipBombAnalyzer {
    fn default() -> Self {
        Self::new(1_000_000, 100, 4 * 1024 * 1024 * 1024)
    }
}

impl MaliciousnessAnalyzer for ZipBombAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_malicious(&self, path: &Path) -> Result<MaliciousnessAnalysisResult, MaliceScanError> {
        let kind = detect(path)?;
        let mut total: u64 = 0;
        let mut finding: Option<(Option<String>, String)> = None;

        self.walker.walk_kind(path, kind, |entry| {
            if entry.entry_type != EntryType::File {
                return ControlFlow::Continue(());
            }
            if let Some(compressed) = entry.compressed_size {
                if self.ratio_exceeded(entry.size, compressed) {
                    finding = Some((
                        Some(entry.path.clone()),
                        format!(
                            "compression ratio exceeds {} ({} -> {} bytes)",
                            self.max_compression_ratio, compressed, entry.size
                        ),
                    ));
                    return ControlFlow::Break(());
                }
            }
            total = total.saturating_add(entry.size);
            if total > self.max_total_uncompressed {
                finding = Some((
                    Some(entry.path.clone()),
                    format!(
                        "total uncompressed size exceeds {} bytes",
                        self.max_total_uncompressed
                    ),
                ));
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;

        if finding.is_none() && kind == ArchiveKind::TarGz {
            let file_len = std::fs::metadata(path)
                .map_err(|e| MaliceScanError::io(path, e))?
                .len();
            if self.ratio_exceeded(total, file_len) {
                finding = Some((
                    None,
                    format!(
                        "compression ratio exceeds {} ({} -> {} bytes)",
                        self.max_compression_ratio, file_len, total
                    ),
                ));
            }
        }

        Ok(match finding {
            Some((entry, reason)) => {
                debug!(archive = %path.display(), reason = %reason, "zip-bomb detected");
                MaliciousnessAnalysisResult::malicious(NAME, entry, reason)
            }
            None => MaliciousnessAnalysisResult::benign(NAME),
        })
    }
}
