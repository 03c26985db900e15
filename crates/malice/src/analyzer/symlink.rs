//! 링크 탈출 분석기
//!
//! 심볼릭 링크 대상은 링크가 있는 디렉토리 기준으로, tar 하드 링크 대상은
//! 아카이브 루트 기준으로 해석합니다. 링크 엔트리 자체의 경로가 이미 루트
//! 밖이면 zip-slip 분석기의 판정 대상이므로 여기서는 건너뜁니다.

use std::ops::ControlFlow;
use std::path::Path;

use tracing::debug;

use super::{MaliciousnessAnalysisResult, MaliciousnessAnalyzer};
use crate::archive::{ArchiveWalker, EntryType};
use crate::error::MaliceScanError;
use crate::path::{resolve, resolve_from};

const NAME: &str = "symlink";

/// 링크 탈출 분석기
#[derive(Debug, Clone, Default)]
pub struct SymlinkAnalyzer {
    walker: ArchiveWalker,
}

impl SymlinkAnalyzer {
    /// 엔트리 수 상한을 지정하여 생성합니다.
    pub fn new(max_entries: usize) -> Self {
        Self {
            walker: ArchiveWalker::new(max_entries),
        }
    }
}

impl MaliciousnessAnalyzer for SymlinkAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_malicious(&self, path: &Path) -> Result<MaliciousnessAnalysisResult, MaliceScanError> {
        let mut finding = None;
        self.walker.walk(path, |entry| {
            let Some(target) = entry.link_target.as_deref() else {
                return ControlFlow::Continue(());
            };
            let link = resolve(&entry.path);
            if !link.is_contained() {
                return ControlFlow::Continue(());
            }
            let resolved = match entry.entry_type {
                EntryType::Symlink => resolve_from(link.parent(), target),
                EntryType::Hardlink => resolve(target),
                _ => return ControlFlow::Continue(()),
            };
            match resolved.escape {
                Some(reason) => {
                    finding = Some((entry.path.clone(), target.to_owned(), reason));
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        })?;

        Ok(match finding {
            Some((entry, target, reason)) => {
                debug!(archive = %path.display(), entry = %entry, target = %target, "link escape found");
                MaliciousnessAnalysisResult::malicious(
                    NAME,
                    Some(entry),
                    format!("link target '{target}' escapes extraction root: {reason}"),
                )
            }
            None => MaliciousnessAnalysisResult::benign(NAME),
        })
    }
}
