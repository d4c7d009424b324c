//! Call Parser
//!
//! `FindByNameAndAge`, `UpdateById`, `Insert` 같은 동적 연산 이름을
//! 연산 종류와 조건 컬럼 이름 목록으로 분해합니다.
//!
//! 인식하는 동사는 [`VERBS`] 표에 있는 것뿐이며, 긴 접두사부터 비교합니다.

use serde::Serialize;

use dsq_core::{Error, Result, Table};

/// 연산 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    /// 조건식 하나로 단건 조회
    Find,
    /// `FindBy<Columns>` 단건 조회
    FindBy,
    /// 조건식으로 다건 조회
    FindAll,
    /// `FindAllBy<Columns>` 다건 조회
    FindAllBy,
    /// 전체 조회
    All,
    Insert,
    /// 기본키 기준 수정
    Update,
    /// `UpdateBy<Columns>` 수정
    UpdateBy,
    Delete,
    /// `DeleteBy<Columns>` 삭제
    DeleteBy,
}

impl OperationKind {
    /// 이름 뒤에 `By<Columns>`가 붙는 연산인지
    pub fn is_by(&self) -> bool {
        matches!(
            self,
            OperationKind::FindBy
                | OperationKind::FindAllBy
                | OperationKind::UpdateBy
                | OperationKind::DeleteBy
        )
    }

    /// SELECT로 컴파일되는지
    pub fn is_select(&self) -> bool {
        matches!(
            self,
            OperationKind::Find
                | OperationKind::FindBy
                | OperationKind::FindAll
                | OperationKind::FindAllBy
                | OperationKind::All
        )
    }

    /// 첫 행만 돌려주는 조회인지
    pub fn returns_single(&self) -> bool {
        matches!(self, OperationKind::Find | OperationKind::FindBy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Find => "Find",
            OperationKind::FindBy => "FindBy",
            OperationKind::FindAll => "FindAll",
            OperationKind::FindAllBy => "FindAllBy",
            OperationKind::All => "All",
            OperationKind::Insert => "Insert",
            OperationKind::Update => "Update",
            OperationKind::UpdateBy => "UpdateBy",
            OperationKind::Delete => "Delete",
            OperationKind::DeleteBy => "DeleteBy",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 동사 접두사 표 (긴 것부터)
pub const VERBS: &[(&str, OperationKind)] = &[
    ("FindAllBy", OperationKind::FindAllBy),
    ("FindBy", OperationKind::FindBy),
    ("FindAll", OperationKind::FindAll),
    ("Find", OperationKind::Find),
    ("All", OperationKind::All),
    ("Insert", OperationKind::Insert),
    ("UpdateBy", OperationKind::UpdateBy),
    ("Update", OperationKind::Update),
    ("DeleteBy", OperationKind::DeleteBy),
    ("Delete", OperationKind::Delete),
];

const CONJUNCTION: &str = "And";

/// 파싱된 호출
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCall {
    /// 원래 연산 이름
    pub operation: String,

    /// 연산 종류
    pub kind: OperationKind,

    /// `By` 뒤의 조건 컬럼 이름들 (선언 순)
    pub criterion_names: Vec<String>,
}

/// 스키마 없이 파싱 (`And` 기준 단순 분리)
pub fn parse(operation: &str) -> Result<ParsedCall> {
    let (kind, suffix) = match_verb(operation)?;
    let criterion_names = match suffix {
        Some(suffix) => naive_split(suffix).ok_or_else(|| unsupported(operation))?,
        None => Vec::new(),
    };

    Ok(ParsedCall {
        operation: operation.to_string(),
        kind,
        criterion_names,
    })
}

/// 테이블 컬럼을 참고해 파싱
///
/// `By` 뒤의 문자열을 컬럼 이름으로 나눌 수 있으면 가장 긴 컬럼 이름을 우선합니다.
/// (`Android` 컬럼이 `And` + `roid`로 쪼개지지 않음)
/// 컬럼 이름으로 나눌 수 없으면 단순 분리 결과를 돌려주고, 검증은 이름 해석 단계에 맡깁니다.
pub fn parse_for_table(operation: &str, table: &Table) -> Result<ParsedCall> {
    let (kind, suffix) = match_verb(operation)?;
    let criterion_names = match suffix {
        Some(suffix) => match segment_by_columns(suffix, table) {
            Some(names) => names,
            None => naive_split(suffix).ok_or_else(|| unsupported(operation))?,
        },
        None => Vec::new(),
    };

    Ok(ParsedCall {
        operation: operation.to_string(),
        kind,
        criterion_names,
    })
}

fn unsupported(operation: &str) -> Error {
    Error::UnsupportedOperation {
        name: operation.to_string(),
    }
}

/// 동사 매칭: (종류, `By` 뒤 문자열)
fn match_verb(operation: &str) -> Result<(OperationKind, Option<&str>)> {
    let operation = operation.trim();

    for (verb, kind) in VERBS {
        let Some(head) = operation.get(..verb.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(verb) {
            continue;
        }

        let rest = &operation[verb.len()..];
        if kind.is_by() {
            if rest.is_empty() {
                return Err(unsupported(operation));
            }
            return Ok((*kind, Some(rest)));
        }
        if rest.is_empty() {
            return Ok((*kind, None));
        }
    }

    Err(unsupported(operation))
}

/// `NameAndAge` → `["Name", "Age"]`
///
/// `And` 바로 뒤가 대문자/숫자/`_`일 때만 구분자로 봅니다. (`Android`는 분리하지 않음)
/// 대문자가 하나도 없는 이름(`nameandage`)은 경계를 알 수 없으므로
/// `and`가 나올 때마다 나눕니다.
fn naive_split(suffix: &str) -> Option<Vec<String>> {
    let bytes = suffix.as_bytes();
    let cased = bytes.iter().any(u8::is_ascii_uppercase);
    let mut names = Vec::new();
    let mut start = 0;
    let mut i = 1;

    while i + CONJUNCTION.len() < bytes.len() {
        let is_conjunction = if cased {
            suffix.get(i..i + CONJUNCTION.len()) == Some(CONJUNCTION)
                && matches!(bytes[i + CONJUNCTION.len()], b'A'..=b'Z' | b'0'..=b'9' | b'_')
        } else {
            i > start
                && suffix
                    .get(i..i + CONJUNCTION.len())
                    .is_some_and(|s| s.eq_ignore_ascii_case(CONJUNCTION))
        };
        if is_conjunction {
            names.push(suffix[start..i].to_string());
            i += CONJUNCTION.len();
            start = i;
        } else {
            i += 1;
        }
    }
    names.push(suffix[start..].to_string());

    if names.iter().any(|n| n.is_empty()) {
        return None;
    }
    Some(names)
}

/// 컬럼 이름으로 전체를 나눌 수 있는 분할을 찾음 (긴 이름 우선, 백트래킹)
fn segment_by_columns(suffix: &str, table: &Table) -> Option<Vec<String>> {
    let mut forms: Vec<(String, &str)> = Vec::new();
    for column in &table.columns {
        forms.push((column.name.clone(), column.name.as_str()));
        let compact: String = column
            .name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        if compact != column.name && !compact.is_empty() {
            forms.push((compact, column.name.as_str()));
        }
    }
    forms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    segment_from(suffix, 0, &forms)
}

fn segment_from(suffix: &str, start: usize, forms: &[(String, &str)]) -> Option<Vec<String>> {
    for (form, column) in forms {
        let end = start + form.len();
        let matches = suffix
            .get(start..end)
            .is_some_and(|s| s.eq_ignore_ascii_case(form));
        if !matches {
            continue;
        }

        if end == suffix.len() {
            return Some(vec![column.to_string()]);
        }

        let next = end + CONJUNCTION.len();
        let has_conjunction = suffix
            .get(end..next)
            .is_some_and(|s| s.eq_ignore_ascii_case(CONJUNCTION));
        if has_conjunction && next < suffix.len() {
            if let Some(mut rest) = segment_from(suffix, next, forms) {
                rest.insert(0, column.to_string());
                return Some(rest);
            }
        }
    }

    None
}
