//! Identifier Resolver
//!
//! 느슨하게 지정된 이름(대소문자, 스키마 한정자 누락, 단/복수형 차이)을
//! 스키마 모델의 정확한 테이블/컬럼으로 해석합니다.
//!
//! # 매칭 단계
//!
//! 1. 대소문자 무시 일치
//! 2. 정규화(homogenized) 일치: 대소문자 무시 + `_`, `-`, 공백 무시
//! 3. 단수/복수 변형 일치 (`User` ↔ `Users`, `Category` ↔ `Categories`)
//!
//! 후보가 나온 첫 단계의 결과만 사용합니다. 한 단계에서 후보가 여럿이면
//! 대소문자까지 정확히 같은 후보 하나만 인정하고, 그렇지 않으면 `AmbiguousName`입니다.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, NameKind, Result};
use crate::schema::{Column, SchemaModel, Table};

/// 해석 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveContext<'a> {
    /// 테이블 이름
    Table,
    /// 주어진 테이블의 컬럼 이름
    Column { table: &'a str },
}

/// 해석 결과 (정확한 선언 이름)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedIdentifier {
    pub schema: String,
    pub table: String,
    pub column: Option<String>,
}

impl QualifiedIdentifier {
    /// 한정자 구간들 (`[schema, table]` 또는 `[schema, table, column]`)
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec![self.schema.as_str(), self.table.as_str()];
        if let Some(column) = &self.column {
            segments.push(column.as_str());
        }
        segments
    }
}

impl fmt::Display for QualifiedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("."))
    }
}

/// 스키마 모델 위의 이름 해석기
///
/// 상태가 없으므로 여러 작업 단위에서 동시에 사용해도 됩니다.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    model: &'a SchemaModel,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    /// 원시 이름 해석
    pub fn resolve(&self, raw: &str, context: ResolveContext<'_>) -> Result<QualifiedIdentifier> {
        match context {
            ResolveContext::Table => {
                let table = find_table(self.model, raw)?;
                Ok(QualifiedIdentifier {
                    schema: table.schema.clone(),
                    table: table.name.clone(),
                    column: None,
                })
            }
            ResolveContext::Column { table } => {
                let table = find_table(self.model, table)?;
                let column = find_column(table, raw)?;
                Ok(QualifiedIdentifier {
                    schema: table.schema.clone(),
                    table: table.name.clone(),
                    column: Some(column.name.clone()),
                })
            }
        }
    }

    /// 테이블 해석
    pub fn table(&self, raw: &str) -> Result<&'a Table> {
        find_table(self.model, raw)
    }

    /// 컬럼 해석
    pub fn column<'t>(&self, table: &'t Table, raw: &str) -> Result<&'t Column> {
        find_column(table, raw)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Table / Column lookup
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn find_table<'a>(model: &'a SchemaModel, raw: &str) -> Result<&'a Table> {
    let parts = split_qualified(raw);
    let not_found = || Error::NameNotFound {
        kind: NameKind::Table,
        name: raw.to_string(),
    };

    match parts.as_slice() {
        [schema, name] => {
            let schema = resolve_schema(model, schema).ok_or_else(not_found)?;
            let tables: Vec<&Table> = model.tables_in(schema).collect();
            pick_table(raw, name, &tables)?.ok_or_else(not_found)
        }
        [name] => {
            // 단계마다 기본 스키마 먼저, 그다음 전체
            let defaults: Vec<&Table> = match model.default_schema() {
                Some(default) => model.tables_in(default).collect(),
                None => Vec::new(),
            };
            let all: Vec<&Table> = model.tables().collect();

            for stage in MatchStage::ALL {
                for tables in [&defaults, &all] {
                    if let Some(table) = pick_table_at(raw, name, tables, stage)? {
                        return Ok(table);
                    }
                }
            }
            Err(not_found())
        }
        _ => Err(not_found()),
    }
}

pub(crate) fn find_column<'a>(table: &'a Table, raw: &str) -> Result<&'a Column> {
    let parts = split_qualified(raw);
    let not_found = || Error::NameNotFound {
        kind: NameKind::Column,
        name: format!("{}.{}", table.qualified_name(), raw),
    };

    let (qualifier, name) = match parts.split_last() {
        Some((name, qualifier)) => (qualifier, name),
        None => return Err(not_found()),
    };

    // `Users.Name` / `dbo.Users.Name` 한정자는 대상 테이블을 가리켜야 함
    let qualifier_ok = match qualifier {
        [] => true,
        [t] => matches!(select(t, &[table.name.as_str()], true), Selection::One(_)),
        [s, t] => {
            matches!(select(s, &[table.schema.as_str()], false), Selection::One(_))
                && matches!(select(t, &[table.name.as_str()], true), Selection::One(_))
        }
        _ => false,
    };
    if !qualifier_ok {
        return Err(not_found());
    }

    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    match select(name, &names, false) {
        Selection::One(idx) => Ok(&table.columns[idx]),
        Selection::Many(indices) => Err(Error::AmbiguousName {
            kind: NameKind::Column,
            name: raw.to_string(),
            candidates: indices
                .into_iter()
                .map(|i| table.columns[i].name.clone())
                .collect(),
        }),
        Selection::None => Err(not_found()),
    }
}

fn resolve_schema<'a>(model: &'a SchemaModel, raw: &str) -> Option<&'a str> {
    let schemas: Vec<&str> = model.schemas().collect();
    match select(raw, &schemas, false) {
        Selection::One(idx) => Some(schemas[idx]),
        _ => None,
    }
}

fn pick_table<'a>(raw: &str, name: &str, tables: &[&'a Table]) -> Result<Option<&'a Table>> {
    for stage in MatchStage::ALL {
        if let Some(table) = pick_table_at(raw, name, tables, stage)? {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

fn pick_table_at<'a>(
    raw: &str,
    name: &str,
    tables: &[&'a Table],
    stage: MatchStage,
) -> Result<Option<&'a Table>> {
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    match select_at(name, &names, stage) {
        Selection::One(idx) => Ok(Some(tables[idx])),
        Selection::Many(indices) => Err(Error::AmbiguousName {
            kind: NameKind::Table,
            name: raw.to_string(),
            candidates: indices
                .into_iter()
                .map(|i| tables[i].qualified_name())
                .collect(),
        }),
        Selection::None => Ok(None),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Name matching
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Selection {
    None,
    One(usize),
    Many(Vec<usize>),
}

/// 이름 매칭 단계 (앞 단계가 우선)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStage {
    CaseInsensitive,
    Homogenized,
    Plural,
}

impl MatchStage {
    const ALL: [MatchStage; 3] = [
        MatchStage::CaseInsensitive,
        MatchStage::Homogenized,
        MatchStage::Plural,
    ];
}

/// 매칭 단계를 순서대로 적용해 후보 인덱스를 고름
fn select(raw: &str, names: &[&str], allow_plural: bool) -> Selection {
    for stage in MatchStage::ALL {
        if stage == MatchStage::Plural && !allow_plural {
            break;
        }
        match select_at(raw, names, stage) {
            Selection::None => continue,
            hit => return hit,
        }
    }
    Selection::None
}

/// 한 단계만 적용
fn select_at(raw: &str, names: &[&str], stage: MatchStage) -> Selection {
    let wanted = homogenize(raw);
    let matches = |name: &str| match stage {
        MatchStage::CaseInsensitive => name.to_lowercase() == raw.to_lowercase(),
        MatchStage::Homogenized => homogenize(name) == wanted,
        MatchStage::Plural => plural_variants(&wanted).contains(&homogenize(name)),
    };

    let hits: Vec<usize> = (0..names.len()).filter(|&i| matches(names[i])).collect();
    match hits.len() {
        0 => Selection::None,
        1 => Selection::One(hits[0]),
        _ => {
            let exact: Vec<usize> = hits.iter().copied().filter(|&i| names[i] == raw).collect();
            match exact.as_slice() {
                [only] => Selection::One(*only),
                _ => Selection::Many(hits),
            }
        }
    }
}

/// 정규화된 이름: 소문자 + `_`, `-`, 공백 제거
pub fn homogenize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// 정규화된 이름끼리 같은지
pub fn homogenized_eq(a: &str, b: &str) -> bool {
    homogenize(a) == homogenize(b)
}

/// 정규화된 이름의 단수/복수 변형
fn plural_variants(name: &str) -> Vec<String> {
    let mut variants = Vec::new();
    if name.is_empty() {
        return variants;
    }

    if let Some(stem) = name.strip_suffix("ies") {
        variants.push(format!("{stem}y"));
    }
    if let Some(stem) = name.strip_suffix("es") {
        variants.push(stem.to_string());
    }
    if let Some(stem) = name.strip_suffix('s') {
        variants.push(stem.to_string());
        // address <-> addresses
        variants.push(format!("{name}es"));
    } else {
        variants.push(format!("{name}s"));
        variants.push(format!("{name}es"));
        if let Some(stem) = name.strip_suffix('y') {
            variants.push(format!("{stem}ies"));
        }
    }

    variants.retain(|v| !v.is_empty() && v != name);
    variants
}

/// `[dbo].[Users]`, `"dbo"."Users"`, `dbo.Users` 형태를 구간으로 분리
pub fn split_qualified(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '[' | '"' | '`' => {
                let close = if ch == '[' { ']' } else { ch };
                while let Some(inner) = chars.next() {
                    if inner == close {
                        // 닫는 문자를 두 번 쓰면 이스케이프
                        if chars.peek() == Some(&close) {
                            chars.next();
                            current.push(close);
                            continue;
                        }
                        break;
                    }
                    current.push(inner);
                }
            }
            '.' => {
                parts.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_string());

    if parts.iter().any(String::is_empty) {
        return Vec::new();
    }
    parts
}
