//! 다이제스트 제공자 -- 스트리밍 파일 해시
//!
//! [`DigestAlgorithm`]은 닫힌 열거형이며 문자열 형식과 정확한 전단사 관계를 가집니다
//! (`SHA1`, `SHA256`, `MD5`). 파일은 고정 크기 버퍼로 읽으므로 전체 내용을
//! 메모리에 올리지 않습니다.
//!
//! # 사용 예시
//!
//! ```no_run
//! use patchward_core::digest::{DigestAlgorithm, digest_file};
//!
//! let bytes = digest_file("lib.jar", DigestAlgorithm::Sha1).unwrap();
//! println!("{}", hex::encode(bytes));
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest;
use tracing::debug;

use crate::error::DigestError;

/// 읽기 버퍼 크기
const READ_BUF_SIZE: usize = 64 * 1024;

/// 다이제스트 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-1 (아티팩트 식별에 주로 사용)
    #[serde(rename = "SHA1")]
    Sha1,
    /// SHA-256
    #[serde(rename = "SHA256")]
    Sha256,
    /// MD5
    #[serde(rename = "MD5")]
    Md5,
}

impl DigestAlgorithm {
    /// 모든 알고리즘 목록
    pub const ALL: [Self; 3] = [Self::Sha1, Self::Sha256, Self::Md5];

    /// 와이어 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Md5 => "MD5",
        }
    }

    /// 다이제스트 길이 (바이트)
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Md5 => 16,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    /// 정확히 일치하는 이름만 허용합니다. 기본값으로 대체하지 않습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| DigestError::UnsupportedAlgorithm(s.to_owned()))
    }
}

/// 알고리즘별 해시 상태
enum Hasher {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Md5(md5::Context),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            DigestAlgorithm::Md5 => Self::Md5(md5::Context::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Md5(ctx) => ctx.consume(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Md5(ctx) => ctx.compute().0.to_vec(),
        }
    }
}

/// 메모리 내 바이트의 다이제스트를 계산합니다.
pub fn digest_bytes(data: &[u8], algorithm: DigestAlgorithm) -> Vec<u8> {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// 리더에서 스트리밍으로 다이제스트를 계산합니다.
pub fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: DigestAlgorithm,
) -> std::io::Result<Vec<u8>> {
    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// 파일의 다이제스트를 계산합니다.
///
/// # Errors
///
/// 파일을 열거나 읽지 못하면 `DigestError::Io`
pub fn digest_file(
    path: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
) -> Result<Vec<u8>, DigestError> {
    let path = path.as_ref();
    let io_err = |source| DigestError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let digest = digest_reader(BufReader::new(file), algorithm).map_err(io_err)?;
    debug!(path = %path.display(), algorithm = %algorithm, "digest computed");
    Ok(digest)
}

/// 알고리즘 이름 문자열로 파일 다이제스트를 계산합니다.
///
/// # Errors
///
/// - 알 수 없는 알고리즘 이름이면 `DigestError::UnsupportedAlgorithm`
/// - 읽기 실패 시 `DigestError::Io`
pub fn digest_file_named(path: impl AsRef<Path>, algorithm: &str) -> Result<Vec<u8>, DigestError> {
    let algorithm = algorithm.parse::<DigestAlgorithm>()?;
    digest_file(path, algorithm)
}

/// 파일 다이제스트를 소문자 16진 문자열로 반환합니다.
pub fn digest_file_hex(
    path: impl AsRef<Path>,
    algorithm: DigestAlgorithm,
) -> Result<String, DigestError> {
    digest_file(path, algorithm).map(hex::encode)
}
