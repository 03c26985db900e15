//! 아카이브 순회기 -- 엔트리 헤더를 저장 순서대로 방문
//!
//! [`ArchiveWalker`]는 컨테이너 파일을 열어 각 엔트리의 선언된 경로, 종류, 크기를
//! 방문자에게 전달합니다. 엔트리 내용은 디스크에 추출하지 않으며, 선언된 크기를
//! 신뢰하지 않습니다.
//!
//! 파일 핸들은 `walk` 호출이 소유하며 정상 종료, 조기 종료(`ControlFlow::Break`),
//! 에러 경로 모두에서 해제됩니다. 다시 순회하려면 `walk`를 다시 호출합니다.
//!
//! # 형식 판별
//!
//! | 내용 | 형식 |
//! |------|------|
//! | `PK\x03\x04`, `PK\x05\x06` | zip (확장자나 `META-INF/MANIFEST.MF`로 jar 구분) |
//! | `1f 8b` | tar.gz |
//! | 오프셋 257의 `ustar` 또는 유효한 헤더 체크섬 | tar |
//!
//! 내용으로 판별되지 않으면 확장자(`.zip`, `.jar`, `.war`, `.ear`, `.tar`, `.tgz`, `.tar.gz`)로
//! 판별합니다.

mod tar;
mod zip;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use patchward_core::metrics as m;

use crate::error::MaliceScanError;

/// tar 헤더 블록 크기
const TAR_BLOCK: usize = 512;
/// tar 헤더 내 `ustar` 매직 오프셋
const USTAR_OFFSET: usize = 257;
/// jar 매니페스트 엔트리
const JAR_MANIFEST: &str = "META-INF/MANIFEST.MF";

/// 컨테이너 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    /// zip
    Zip,
    /// Java 아카이브 (매니페스트가 있는 zip)
    Jar,
    /// tar
    Tar,
    /// gzip 압축 tar
    TarGz,
}

impl ArchiveKind {
    /// 형식 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Jar => "jar",
            Self::Tar => "tar",
            Self::TarGz => "tar-gz",
        }
    }

    /// zip 계열 여부
    pub fn is_zip_family(&self) -> bool {
        matches!(self, Self::Zip | Self::Jar)
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 엔트리 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    /// 일반 파일
    File,
    /// 디렉토리
    Directory,
    /// 심볼릭 링크
    Symlink,
    /// 하드 링크 (tar)
    Hardlink,
    /// 장치 파일, FIFO, 확장 헤더 등
    Other,
}

/// 순회 중 생성되는 엔트리 레코드 (저장되지 않음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// 컨테이너에 저장된 경로 (컨테이너 고유 구분자 그대로, 손실 UTF-8)
    pub path: String,
    /// 엔트리 종류
    pub entry_type: EntryType,
    /// 선언된 비압축 크기
    pub size: u64,
    /// 압축 크기 (zip만)
    pub compressed_size: Option<u64>,
    /// 링크 대상 (tar 링크, zip 심볼릭 링크)
    pub link_target: Option<String>,
}

/// 한 번의 순회 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// 판별된 형식
    pub kind: ArchiveKind,
    /// 방문한 엔트리 수
    pub entries_visited: usize,
    /// 방문자가 조기 종료했는지 여부
    pub stopped_early: bool,
}

/// 아카이브 순회기
///
/// 상태를 갖지 않으므로 여러 스레드에서 동시에 사용할 수 있습니다.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveWalker {
    max_entries: usize,
}

impl ArchiveWalker {
    /// 엔트리 수 상한을 지정하여 생성합니다.
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// 엔트리 수 상한
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// 아카이브를 판별하고 엔트리를 저장 순서대로 방문합니다.
    ///
    /// # Errors
    ///
    /// - 형식을 판별할 수 없으면 `MaliceScanError::UnsupportedFormat`
    /// - 헤더가 손상되었거나 엔트리 수가 상한을 넘으면 `MaliceScanError::CorruptArchive`
    /// - 파일을 열 수 없으면 `MaliceScanError::Io`
    pub fn walk<F>(&self, path: &Path, visitor: F) -> Result<WalkSummary, MaliceScanError>
    where
        F: FnMut(&ArchiveEntry) -> ControlFlow<()>,
    {
        let kind = detect(path)?;
        self.walk_kind(path, kind, visitor)
    }

    /// 이미 판별된 형식으로 아카이브를 순회합니다.
    pub fn walk_kind<F>(
        &self,
        path: &Path,
        kind: ArchiveKind,
        mut visitor: F,
    ) -> Result<WalkSummary, MaliceScanError>
    where
        F: FnMut(&ArchiveEntry) -> ControlFlow<()>,
    {
        let file = File::open(path).map_err(|e| MaliceScanError::io(path, e))?;
        let mut visited = 0usize;
        let mut counting = |entry: &ArchiveEntry| {
            visited += 1;
            visitor(entry)
        };

        let result = match kind {
            ArchiveKind::Zip | ArchiveKind::Jar => {
                zip::walk_zip(path, file, self.max_entries, &mut counting)
            }
            ArchiveKind::Tar => {
                tar::walk_tar(path, std::io::BufReader::new(file), self.max_entries, &mut counting)
            }
            ArchiveKind::TarGz => {
                let decoder = flate2::read::GzDecoder::new(std::io::BufReader::new(file));
                tar::walk_tar(path, decoder, self.max_entries, &mut counting)
            }
        };

        metrics::counter!(m::MALICE_ENTRIES_WALKED_TOTAL, m::LABEL_ARCHIVE_KIND => kind.as_str())
            .increment(visited as u64);

        match result {
            Ok(flow) => {
                let summary = WalkSummary {
                    kind,
                    entries_visited: visited,
                    stopped_early: flow.is_break(),
                };
                debug!(
                    path = %path.display(),
                    kind = %kind,
                    entries = visited,
                    stopped_early = summary.stopped_early,
                    "archive walked"
                );
                Ok(summary)
            }
            Err(e) => {
                if e.is_corrupt() {
                    metrics::counter!(m::MALICE_CORRUPT_ARCHIVES_TOTAL).increment(1);
                }
                Err(e)
            }
        }
    }

    /// 모든 엔트리를 수집합니다.
    pub fn entries(&self, path: &Path) -> Result<(ArchiveKind, Vec<ArchiveEntry>), MaliceScanError> {
        let mut entries = Vec::new();
        let summary = self.walk(path, |entry| {
            entries.push(entry.clone());
            ControlFlow::Continue(())
        })?;
        Ok((summary.kind, entries))
    }
}

impl Default for ArchiveWalker {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

/// 내용(매직 바이트)과 확장자로 형식을 판별합니다.
///
/// # Errors
///
/// - 파일을 읽을 수 없으면 `MaliceScanError::Io`
/// - 어느 쪽으로도 판별되지 않으면 `MaliceScanError::UnsupportedFormat`
pub fn detect(path: &Path) -> Result<ArchiveKind, MaliceScanError> {
    let mut file = File::open(path).map_err(|e| MaliceScanError::io(path, e))?;
    let mut head = [0u8; TAR_BLOCK];
    let n = read_up_to(&mut file, &mut head).map_err(|e| MaliceScanError::io(path, e))?;
    drop(file);
    let head = &head[..n];

    let by_extension = kind_from_extension(path);

    if head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06") {
        if by_extension == Some(ArchiveKind::Jar) || zip::has_entry(path, JAR_MANIFEST) {
            return Ok(ArchiveKind::Jar);
        }
        return Ok(ArchiveKind::Zip);
    }
    if head.starts_with(&[0x1f, 0x8b]) {
        return Ok(ArchiveKind::TarGz);
    }
    if head.len() == TAR_BLOCK
        && (head[USTAR_OFFSET..].starts_with(b"ustar") || tar_checksum_valid(head))
    {
        return Ok(ArchiveKind::Tar);
    }

    by_extension.ok_or_else(|| MaliceScanError::UnsupportedFormat {
        path: path.display().to_string(),
    })
}

/// 확장자로 형식을 추정합니다.
pub fn kind_from_extension(path: &Path) -> Option<ArchiveKind> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return Some(ArchiveKind::TarGz);
    }
    match name.rsplit_once('.')?.1 {
        "zip" => Some(ArchiveKind::Zip),
        "jar" | "war" | "ear" => Some(ArchiveKind::Jar),
        "tar" => Some(ArchiveKind::Tar),
        _ => None,
    }
}

/// 인터럽트를 재시도하며 버퍼를 최대한 채웁니다.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// v7 tar 헤더 체크섬 검증 (체크섬 필드는 공백으로 간주)
fn tar_checksum_valid(header: &[u8]) -> bool {
    let field = &header[148..156];
    // 선행 공백 뒤의 8진수 숫자열, NUL 또는 공백에서 끝남
    let digits: String = field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| b != 0 && b != b' ')
        .map(|&b| b as char)
        .collect();
    let Ok(expected) = u32::from_str_radix(&digits, 8) else {
        return false;
    };
    let actual: u32 = header
        .iter()
        .enumerate()
        .map(|(i, &b)| if (148..156).contains(&i) { u32::from(b' ') } else { u32::from(b) })
        .sum();
    // 전부 0인 블록은 아카이브 끝 표시이므로 tar로 보지 않음
    expected != 0 && expected == actual
}
