//! 스키마 제공자
//!
//! 실제 DB의 카탈로그 조회(I/O)는 외부 제공자가 담당합니다.
//! 제공자는 `INFORMATION_SCHEMA` 형태의 행(row)만 넘겨주고, [`SchemaModel`]이 이를 한 번 조립합니다.
//!
//! [`SchemaModel`]: super::SchemaModel

use serde::{Deserialize, Serialize};

/// 테이블 행 (schema, table, table_type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub schema: String,
    pub name: String,
    /// `BASE TABLE` / `VIEW`
    #[serde(default = "default_table_type")]
    pub table_type: String,
}

fn default_table_type() -> String {
    "BASE TABLE".to_string()
}

/// 컬럼 행 (schema, table, column, data_type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

/// 기본키 행 (schema, table, column, ordinal)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub ordinal: u32,
}

/// 스키마 행 제공자
///
/// 데이터 소스당 한 번 호출되어 스키마 모델을 만드는 데 사용됩니다.
pub trait SchemaProvider {
    fn tables(&self) -> Vec<TableRow>;
    fn columns(&self) -> Vec<ColumnRow>;
    fn primary_keys(&self) -> Vec<PrimaryKeyRow>;
}

/// 메모리 기반 스키마 제공자
///
/// 테스트나 스키마를 코드로 선언하는 임베더가 사용합니다.
///
/// ```
/// use dsq_core::schema::StaticSchemaProvider;
///
/// let provider = StaticSchemaProvider::new()
///     .table("dbo", "Users")
///     .columns("dbo", "Users", &["Id", "Name", "Password", "Age"])
///     .primary_key("dbo", "Users", "Id", 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    primary_keys: Vec<PrimaryKeyRow>,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테이블 추가
    pub fn table(mut self, schema: &str, name: &str) -> Self {
        self.tables.push(TableRow {
            schema: schema.to_string(),
            name: name.to_string(),
            table_type: default_table_type(),
        });
        self
    }

    /// 뷰 추가
    pub fn view(mut self, schema: &str, name: &str) -> Self {
        self.tables.push(TableRow {
            schema: schema.to_string(),
            name: name.to_string(),
            table_type: "VIEW".to_string(),
        });
        self
    }

    /// 타입 정보 없이 컬럼들 추가
    pub fn columns(mut self, schema: &str, table: &str, names: &[&str]) -> Self {
        for name in names {
            self.columns.push(ColumnRow {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
                data_type: None,
            });
        }
        self
    }

    /// 타입이 있는 컬럼 추가
    pub fn typed_column(mut self, schema: &str, table: &str, name: &str, data_type: &str) -> Self {
        self.columns.push(ColumnRow {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            data_type: Some(data_type.to_string()),
        });
        self
    }

    /// 기본키 컬럼 추가
    pub fn primary_key(mut self, schema: &str, table: &str, column: &str, ordinal: u32) -> Self {
        self.primary_keys.push(PrimaryKeyRow {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            ordinal,
        });
        self
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn tables(&self) -> Vec<TableRow> {
        self.tables.clone()
    }

    fn columns(&self) -> Vec<ColumnRow> {
        self.columns.clone()
    }

    fn primary_keys(&self) -> Vec<PrimaryKeyRow> {
        self.primary_keys.clone()
    }
}
