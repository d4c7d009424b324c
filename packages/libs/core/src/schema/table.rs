//! 테이블 정의

use std::fmt;

use serde::{Deserialize, Serialize};

use super::column::Column;
use crate::error::Result;
use crate::resolver;

/// 테이블 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

impl TableKind {
    /// `INFORMATION_SCHEMA.TABLES.TABLE_TYPE` 값에서 변환
    pub fn from_table_type(table_type: &str) -> Self {
        if table_type.trim().eq_ignore_ascii_case("view") {
            TableKind::View
        } else {
            TableKind::Table
        }
    }
}

/// 테이블 정의
///
/// 스키마 로드 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// 스키마 이름 (예: `dbo`)
    pub schema: String,

    /// 테이블 이름
    pub name: String,

    /// 테이블 종류
    #[serde(default)]
    pub kind: TableKind,

    /// 선언 순서대로의 컬럼 목록
    pub columns: Vec<Column>,

    /// 기본키 컬럼 이름 (ordinal 순)
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl Table {
    /// 빈 테이블 생성
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind: TableKind::Table,
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// `schema.name` 형태의 이름
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// 컬럼 조회 (대소문자 무시, `Users.Name` 같은 한정자 허용)
    pub fn find_column(&self, name: &str) -> Result<&Column> {
        resolver::find_column(self, name)
    }

    /// 컬럼 존재 여부
    pub fn has_column(&self, name: &str) -> bool {
        self.find_column(name).is_ok()
    }

    /// 선언 순서에서의 컬럼 위치
    pub fn column_position(&self, column: &Column) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column.name)
    }

    /// 기본키 컬럼들 (ordinal 순)
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.primary_key
            .iter()
            .filter_map(|pk| self.columns.iter().find(|c| &c.name == pk))
    }

    /// 기본키가 아닌 컬럼들 (선언 순)
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_primary_key)
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}
