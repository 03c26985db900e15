//! tar / tar.gz 순회
//!
//! 헤더를 순서대로 읽으며 엔트리 내용은 건너뜁니다. GNU long name과 PAX 확장
//! 헤더는 `tar` 크레이트가 다음 엔트리에 반영하므로 별도 엔트리로 방문하지 않습니다.

use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

use super::{ArchiveEntry, EntryType};
use crate::error::MaliceScanError;

pub(super) fn walk_tar<R, F>(
    path: &Path,
    reader: R,
    max_entries: usize,
    visitor: &mut F,
) -> Result<ControlFlow<()>, MaliceScanError>
where
    R: Read,
    F: FnMut(&ArchiveEntry) -> ControlFlow<()>,
{
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| MaliceScanError::corrupt(path, e))?;

    for (count, entry) in entries.enumerate() {
        let entry = entry.map_err(|e| MaliceScanError::corrupt(path, e))?;
        if count >= max_entries {
            return Err(MaliceScanError::corrupt(
                path,
                format!("entry count exceeds limit {max_entries}"),
            ));
        }

        let header_type = entry.header().entry_type();
        let entry_type = if header_type.is_symlink() {
            EntryType::Symlink
        } else if header_type.is_hard_link() {
            EntryType::Hardlink
        } else if header_type.is_dir() {
            EntryType::Directory
        } else if header_type.is_file() || header_type.is_contiguous() || header_type.is_gnu_sparse()
        {
            EntryType::File
        } else {
            EntryType::Other
        };

        let link_target = match entry_type {
            EntryType::Symlink | EntryType::Hardlink => entry
                .link_name_bytes()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            _ => None,
        };

        let record = ArchiveEntry {
            path: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
            entry_type,
            size: entry.size(),
            compressed_size: None,
            link_target,
        };

        if visitor(&record).is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
