//! zip / jar 순회
//!
//! 중앙 디렉토리를 읽어 엔트리를 저장 순서대로 방문합니다. 메타데이터는
//! `by_index_raw`로 읽어 압축 해제를 하지 않으며, 심볼릭 링크 대상만 제한된
//! 크기로 압축 해제합니다.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::Path;

use tracing::debug;

use super::{ArchiveEntry, EntryType};
use crate::error::MaliceScanError;

/// 심볼릭 링크 대상 읽기 상한
const MAX_LINK_TARGET: u64 = 4096;

/// unix 파일 모드의 형식 비트
const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

pub(super) fn walk_zip<F>(
    path: &Path,
    file: File,
    max_entries: usize,
    visitor: &mut F,
) -> Result<ControlFlow<()>, MaliceScanError>
where
    F: FnMut(&ArchiveEntry) -> ControlFlow<()>,
{
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| MaliceScanError::corrupt(path, e))?;

    if archive.len() > max_entries {
        return Err(MaliceScanError::corrupt(
            path,
            format!("entry count {} exceeds limit {max_entries}", archive.len()),
        ));
    }

    for index in 0..archive.len() {
        let (mut entry, is_symlink) = {
            let raw = archive
                .by_index_raw(index)
                .map_err(|e| MaliceScanError::corrupt(path, e))?;
            let is_symlink = raw.unix_mode().is_some_and(|mode| mode & S_IFMT == S_IFLNK);
            let entry_type = if is_symlink {
                EntryType::Symlink
            } else if raw.is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            };
            let entry = ArchiveEntry {
                path: raw.name().to_owned(),
                entry_type,
                size: raw.size(),
                compressed_size: Some(raw.compressed_size()),
                link_target: None,
            };
            (entry, is_symlink)
        };

        if is_symlink {
            entry.link_target = read_link_target(&mut archive, index);
        }

        if visitor(&entry).is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}

/// 심볼릭 링크 엔트리의 내용(대상 경로)을 읽습니다.
///
/// 암호화되었거나 지원하지 않는 압축 방식이면 `None`을 반환합니다.
fn read_link_target<R>(archive: &mut zip::ZipArchive<R>, index: usize) -> Option<String>
where
    R: Read + std::io::Seek,
{
    let mut entry = match archive.by_index(index) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(index, error = %e, "cannot read symlink target");
            return None;
        }
    };
    let mut buf = Vec::new();
    if let Err(e) = entry.by_ref().take(MAX_LINK_TARGET).read_to_end(&mut buf) {
        debug!(index, error = %e, "cannot read symlink target");
        return None;
    }
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// 주어진 이름의 엔트리가 있는지 확인합니다 (jar 판별용).
pub(super) fn has_entry(path: &Path, name: &str) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    match zip::ZipArchive::new(BufReader::new(file)) {
        Ok(archive) => archive.index_for_name(name).is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        file
    }

    fn collect(path: &Path, max_entries: usize) -> Result<Vec<ArchiveEntry>, MaliceScanError> {
        let mut out = Vec::new();
        walk_zip(path, File::open(path).unwrap(), max_entries, &mut |e: &ArchiveEntry| {
            out.push(e.clone());
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    #[test]
    fn entries_in_storage_order_with_sizes() {
        let zip = build_zip(&[("b.txt", b"bbbb"), ("a/c.txt", b"c")]);
        let entries = collect(zip.path(), 100).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "b.txt");
        assert_eq!(entries[0].size, 4);
        assert!(entries[0].compressed_size.is_some());
        assert_eq!(entries[1].path, "a/c.txt");
        assert_eq!(entries[1].entry_type, EntryType::File);
    }

    #[test]
    fn directories_and_symlinks_are_typed() {
        let file = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .add_directory("dir/", SimpleFileOptions::default())
            .unwrap();
        writer
            .add_symlink("dir/link", "../../etc/passwd", SimpleFileOptions::default())
            .unwrap();
        writer.finish().unwrap();

        let entries = collect(file.path(), 100).unwrap();
        assert_eq!(entries[0].entry_type, EntryType::Directory);
        assert_eq!(entries[1].entry_type, EntryType::Symlink);
        assert_eq!(entries[1].link_target.as_deref(), Some("../../etc/passwd"));
    }

    #[test]
    fn too_many_entries_is_corrupt() {
        let zip = build_zip(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
        let err = collect(zip.path(), 2).unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[test]
    fn visitor_break_stops_walk() {
        let zip = build_zip(&[("a", b"1"), ("b", b"2"), ("c", b"3")]);
        let mut seen = 0;
        let flow = walk_zip(
            zip.path(),
            File::open(zip.path()).unwrap(),
            100,
            &mut |_: &ArchiveEntry| {
                seen += 1;
                ControlFlow::Break(())
            },
        )
        .unwrap();
        assert!(flow.is_break());
        assert_eq!(seen, 1);
    }

    #[test]
    fn manifest_lookup() {
        let jar = build_zip(&[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")]);
        assert!(has_entry(jar.path(), "META-INF/MANIFEST.MF"));
        let zip = build_zip(&[("a.txt", b"a")]);
        assert!(!has_entry(zip.path(), "META-INF/MANIFEST.MF"));
    }
}
