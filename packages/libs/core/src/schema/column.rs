//! 컬럼 정의
//!
//! 스키마 모델에 속한 컬럼 메타데이터를 정의합니다.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// 컬럼 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// 컬럼 이름 (DB에 선언된 그대로)
    pub name: String,

    /// 컬럼 타입 태그
    #[serde(default)]
    pub column_type: ColumnType,

    /// 기본키 포함 여부
    #[serde(default)]
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_primary_key: false,
        }
    }
}
