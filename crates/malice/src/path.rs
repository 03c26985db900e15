//! 엔트리 경로 포함 판정 -- 개념적 추출 루트 기준 경로 해석
//!
//! 실제 파일 시스템에 접근하지 않고, 아카이브에 저장된 경로 문자열만으로
//! 추출 시 경로가 루트 밖으로 나가는지 판정합니다. 호스트 플랫폼의 구분자에
//! 의존하지 않도록 `\`와 `/`를 모두 구분자로 취급합니다.
//!
//! # 탈출로 판정하는 경우
//!
//! - 선행 `/` (절대 경로)
//! - `C:` 같은 드라이브 문자 접두사
//! - `\\server\share` 같은 UNC 경로
//! - 루트 위로 올라가는 `..` 시퀀스

use std::fmt;

use serde::Serialize;

/// 루트 밖으로 나가는 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeReason {
    /// 절대 경로
    Absolute,
    /// 드라이브 문자 접두사
    DriveLetter,
    /// UNC 경로
    Unc,
    /// `..`로 루트 위로 이동
    ParentTraversal,
}

impl fmt::Display for EscapeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absolute => "absolute path",
            Self::DriveLetter => "drive letter prefix",
            Self::Unc => "UNC path",
            Self::ParentTraversal => "parent directory traversal",
        })
    }
}

/// 경로 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// 루트 기준 정규화된 구성 요소
    pub components: Vec<String>,
    /// 탈출 이유 (루트 안이면 `None`)
    pub escape: Option<EscapeReason>,
}

impl Resolution {
    /// 루트 안에 머무는지 여부
    pub fn is_contained(&self) -> bool {
        self.escape.is_none()
    }

    /// 부모 디렉토리 구성 요소 (심볼릭 링크 대상 해석 기준)
    pub fn parent(&self) -> &[String] {
        match self.components.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}

/// 엔트리 경로를 추출 루트 기준으로 해석합니다.
pub fn resolve(raw: &str) -> Resolution {
    resolve_from(&[], raw)
}

/// `base` 디렉토리(루트 기준 구성 요소)에서 상대 경로 `raw`를 해석합니다.
///
/// `raw`가 절대 경로, 드라이브 문자, UNC 경로이면 `base`와 관계없이 탈출입니다.
pub fn resolve_from(base: &[String], raw: &str) -> Resolution {
    let normalized = raw.replace('\\', "/");

    if let Some(reason) = rooted_prefix(&normalized) {
        return Resolution {
            components: Vec::new(),
            escape: Some(reason),
        };
    }

    let mut components: Vec<String> = base.to_vec();
    for part in normalized.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if components.pop().is_none() {
                    return Resolution {
                        components,
                        escape: Some(EscapeReason::ParentTraversal),
                    };
                }
            }
            other => components.push(other.to_owned()),
        }
    }

    Resolution {
        components,
        escape: None,
    }
}

/// 엔트리 경로가 루트 밖으로 나가는지 여부
pub fn escapes_root(raw: &str) -> bool {
    !resolve(raw).is_contained()
}

fn rooted_prefix(normalized: &str) -> Option<EscapeReason> {
    if normalized.starts_with("//") {
        return Some(EscapeReason::Unc);
    }
    if normalized.starts_with('/') {
        return Some(EscapeReason::Absolute);
    }
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Some(EscapeReason::DriveLetter);
    }
    None
}
