//! 도메인 타입 -- construct 식별자와 본문
//!
//! [`ConstructId`]는 라이브러리의 여러 버전에 걸쳐 동일한 코드 단위를 가리키는
//! 맵 키입니다. [`Construct`]는 파싱 협력자가 추출한 본문을 담으며,
//! 시그니처 엔진은 이를 읽기 전용으로 빌려 씁니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 열거형 문자열 파싱 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// 파싱 대상 열거형 이름
    pub kind: &'static str,
    /// 입력 문자열
    pub value: String,
}

/// 소스 언어
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProgrammingLanguage {
    /// Java (소스 및 바이트코드)
    #[serde(rename = "JAVA")]
    Java,
    /// Python
    #[serde(rename = "PY")]
    Python,
    /// JavaScript
    #[serde(rename = "JS")]
    JavaScript,
}

impl ProgrammingLanguage {
    /// 모든 언어 목록
    pub const ALL: [Self; 3] = [Self::Java, Self::Python, Self::JavaScript];

    /// 와이어 문자열 코드
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "JAVA",
            Self::Python => "PY",
            Self::JavaScript => "JS",
        }
    }
}

impl fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgrammingLanguage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "programming language",
                value: s.to_owned(),
            })
    }
}

/// Construct 종류 (판별자)
///
/// 와이어 형식은 4글자 코드입니다 (예: `METH`, `CONS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstructType {
    /// 패키지
    #[serde(rename = "PACK")]
    Package,
    /// 클래스
    #[serde(rename = "CLAS")]
    Class,
    /// 열거형
    #[serde(rename = "ENUM")]
    Enum,
    /// 인터페이스
    #[serde(rename = "INTF")]
    Interface,
    /// 정적 초기화 블록
    #[serde(rename = "INIT")]
    ClassInit,
    /// 메서드
    #[serde(rename = "METH")]
    Method,
    /// 생성자
    #[serde(rename = "CONS")]
    Constructor,
    /// 필드
    #[serde(rename = "FIEL")]
    Field,
    /// 모듈 (Python, JS)
    #[serde(rename = "MODU")]
    Module,
    /// 함수 (Python, JS)
    #[serde(rename = "FUNC")]
    Function,
}

impl ConstructType {
    /// 모든 종류 목록
    pub const ALL: [Self; 10] = [
        Self::Package,
        Self::Class,
        Self::Enum,
        Self::Interface,
        Self::ClassInit,
        Self::Method,
        Self::Constructor,
        Self::Field,
        Self::Module,
        Self::Function,
    ];

    /// 와이어 문자열 코드
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "PACK",
            Self::Class => "CLAS",
            Self::Enum => "ENUM",
            Self::Interface => "INTF",
            Self::ClassInit => "INIT",
            Self::Method => "METH",
            Self::Constructor => "CONS",
            Self::Field => "FIEL",
            Self::Module => "MODU",
            Self::Function => "FUNC",
        }
    }
}

impl fmt::Display for ConstructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstructType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "construct type",
                value: s.to_owned(),
            })
    }
}

/// 코드 단위의 불변 식별자
///
/// 동등성과 순서는 (언어, 종류, 정규화된 이름) 순으로 결정됩니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstructId {
    /// 소스 언어
    pub lang: ProgrammingLanguage,
    /// Construct 종류
    #[serde(rename = "type")]
    pub construct_type: ConstructType,
    /// 정규화된 전체 이름 (예: `com.acme.Foo.bar(int)`)
    pub qname: String,
}

impl ConstructId {
    /// 새 식별자를 생성합니다.
    pub fn new(
        lang: ProgrammingLanguage,
        construct_type: ConstructType,
        qname: impl Into<String>,
    ) -> Self {
        Self {
            lang,
            construct_type,
            qname: qname.into(),
        }
    }
}

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.lang, self.construct_type, self.qname)
    }
}

/// 본문이 추출된 위치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructLocation {
    /// 아카이브 내부 멤버 (예: JAR 안의 `.class` 파일)
    ArchiveMember {
        /// 아카이브 경로
        archive: String,
        /// 멤버 이름
        member: String,
    },
    /// 파일 시스템 경로
    File(String),
    /// 위치 정보 없음
    Unknown,
}

/// 식별자와 본문을 가진 코드 단위
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Construct {
    /// 식별자
    pub id: ConstructId,
    /// 본문 내용
    pub body: String,
    /// 추출 위치
    pub location: ConstructLocation,
}

impl Construct {
    /// 위치 정보 없이 construct를 생성합니다.
    pub fn new(id: ConstructId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            location: ConstructLocation::Unknown,
        }
    }

    /// 추출 위치를 지정합니다.
    pub fn with_location(mut self, location: ConstructLocation) -> Self {
        self.location = location;
        self
    }

    /// 소스 언어
    pub fn lang(&self) -> ProgrammingLanguage {
        self.id.lang
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.id, self.body.len())
    }
}
