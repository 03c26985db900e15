//! 경로 탈출(zip-slip) 분석기
//!
//! 각 엔트리의 선언 경로를 개념적 추출 루트 기준으로 해석하여, 루트 밖으로
//! 나가는 첫 엔트리에서 순회를 멈추고 악성(1.0)으로 판정합니다. zip, jar, tar
//! 모두 같은 규칙을 적용하며 `/`와 `\` 구분자를 모두 처리합니다.

use std::ops::ControlFlow;
use std::path::Path;

use tracing::debug;

use super::{MaliciousnessAnalysisResult, MaliciousnessAnalyzer};
use crate::archive::ArchiveWalker;
use crate::error::MaliceScanError;
use crate::path::resolve;

const NAME: &str = "zip-slip";

/// 경로 탈출 분석기
#[derive(Debug, Clone, Default)]
pub struct ZipSlipAnalyzer {
    walker: ArchiveWalker,
}

impl ZipSlipAnalyzer {
    /// 엔트리 수 상한을 지정하여 생성합니다.
    pub fn new(max_entries: usize) -> Self {
        Self {
            walker: ArchiveWalker::new(max_entries),
        }
    }
}

impl MaliciousnessAnalyzer for ZipSlipAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_malicious(&self, path: &Path) -> Result<MaliciousnessAnalysisResult, MaliceScanError> {
        let mut finding = None;
        self.walker.walk(path, |entry| {
            match resolve(&entry.path).escape {
                Some(reason) => {
                    finding = Some((entry.path.clone(), reason));
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        })?;

        Ok(match finding {
            Some((entry, reason)) => {
                debug!(archive = %path.display(), entry = %entry, %reason, "zip-slip entry found");
                MaliciousnessAnalysisResult::malicious(
                    NAME,
                    Some(entry),
                    format!("entry escapes extraction root: {reason}"),
                )
            }
            None => MaliciousnessAnalysisResult::benign(NAME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(names: &[&str]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        for name in names {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(b"payload").unwrap();
        }
        writer.finish().unwrap();
        file
    }

    #[test]
    fn benign_zip_scores_zero() {
        let zip = zip_with(&["a.txt", "dir/b.txt", "dir/../c.txt"]);
        let result = ZipSlipAnalyzer::default().is_malicious(zip.path()).unwrap();
        assert_eq!(result.score, 0.0);
        assert!(result.evidence.is_none());
    }

    #[test]
    fn traversal_entry_scores_one() {
        let zip = zip_with(&["good.txt", "../../evil.sh", "later.txt"]);
        let result = ZipSlipAnalyzer::default().is_malicious(zip.path()).unwrap();
        assert_eq!(result.score, 1.0);
        let evidence = result.evidence.unwrap();
        assert_eq!(evidence.entry_path.as_deref(), Some("../../evil.sh"));
    }

    #[test]
    fn windows_style_traversal_scores_one() {
        let zip = zip_with(&[r"..\..\evil.dll"]);
        let result = ZipSlipAnalyzer::default().is_malicious(zip.path()).unwrap();
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn absolute_entry_scores_one() {
        let zip = zip_with(&["/etc/cron.d/evil"]);
        let result = ZipSlipAnalyzer::default().is_malicious(zip.path()).unwrap();
        assert!(result.is_malicious());
    }
}
