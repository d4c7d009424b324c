//! SQL 방언 설정
//!
//! 식별자 인용 문자, placeholder 문법, 대소문자 변환 규칙을 담습니다.
//! 다른 DB를 지원할 때는 컴파일러 로직이 아니라 이 구조체만 바꿉니다.

use serde::{Deserialize, Serialize};

/// 식별자 대소문자 변환 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFolding {
    /// 선언된 이름 그대로 (기본값)
    #[default]
    Preserve,
    /// 소문자로
    Lower,
    /// 대문자로
    Upper,
}

impl CaseFolding {
    pub fn apply(&self, ident: &str) -> String {
        match self {
            CaseFolding::Preserve => ident.to_string(),
            CaseFolding::Lower => ident.to_lowercase(),
            CaseFolding::Upper => ident.to_uppercase(),
        }
    }
}

/// SQL 방언
///
/// # Placeholder 번호
///
/// - `insert` 문은 `insert_base`부터 번호를 매깁니다 (기본 0: `@p0`, `@p1`, ...).
/// - 그 외 문장은 `statement_base`부터 번호를 매깁니다 (기본 1: `@p1`, `@p2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// 여는 인용 문자
    pub open_quote: char,

    /// 닫는 인용 문자 (이름 안에 나오면 두 번 씀)
    pub close_quote: char,

    /// placeholder 접두사 (`@p`, `$`, `?`)
    pub placeholder_prefix: String,

    /// insert 문 첫 placeholder 번호
    pub insert_base: usize,

    /// 그 외 문장 첫 placeholder 번호
    pub statement_base: usize,

    /// 식별자 대소문자 변환
    pub case_folding: CaseFolding,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::sql_server()
    }
}

impl Dialect {
    /// SQL Server: `[dbo].[Users]`, `@p0`
    pub fn sql_server() -> Self {
        Self {
            open_quote: '[',
            close_quote: ']',
            placeholder_prefix: "@p".to_string(),
            insert_base: 0,
            statement_base: 1,
            case_folding: CaseFolding::Preserve,
        }
    }

    /// PostgreSQL: `"public"."users"`, `$1`
    pub fn postgres() -> Self {
        Self {
            open_quote: '"',
            close_quote: '"',
            placeholder_prefix: "$".to_string(),
            insert_base: 1,
            statement_base: 1,
            case_folding: CaseFolding::Lower,
        }
    }

    /// SQLite: `"main"."Users"`, `?1`
    pub fn sqlite() -> Self {
        Self {
            open_quote: '"',
            close_quote: '"',
            placeholder_prefix: "?".to_string(),
            insert_base: 1,
            statement_base: 1,
            case_folding: CaseFolding::Preserve,
        }
    }

    /// 이름으로 프리셋 선택 (`sqlserver`, `postgres`, `sqlite`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" | "tsql" => Some(Self::sql_server()),
            "postgres" | "postgresql" | "pg" => Some(Self::postgres()),
            "sqlite" => Some(Self::sqlite()),
            _ => None,
        }
    }

    /// 식별자 구간 하나 인용
    pub fn quote(&self, ident: &str) -> String {
        let folded = self.case_folding.apply(ident);
        let mut out = String::with_capacity(folded.len() + 2);
        out.push(self.open_quote);
        for ch in folded.chars() {
            if ch == self.close_quote {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(self.close_quote);
        out
    }

    /// 한정 이름 인용 (`[dbo].[Users].[Name]`)
    pub fn qualified(&self, segments: &[&str]) -> String {
        segments
            .iter()
            .map(|s| self.quote(s))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// n번째 placeholder 토큰
    pub fn placeholder(&self, n: usize) -> String {
        format!("{}{}", self.placeholder_prefix, n)
    }
}
