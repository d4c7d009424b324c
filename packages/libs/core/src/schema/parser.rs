//! 스키마 YAML 파서
//!
//! 스키마 문서(YAML)를 파싱하여 제공자 행(row)으로 변환합니다.
//!
//! ```yaml
//! default_schema: dbo
//! tables:
//!   - name: Users
//!     columns:
//!       - { name: Id, type: int }
//!       - { name: Name, type: nvarchar(100) }
//!       - Password
//!       - { name: Age, type: int }
//!     primary_key: [Id]
//! ```
//!
//! `schema`를 생략한 테이블은 `default_schema`(없으면 `dbo`)에 속합니다.
//! 모델의 기본 스키마는 처음 등장한 스키마이므로, 기본 스키마의 테이블을
//! 먼저 내보내고 나머지는 선언 순서를 유지합니다.

use serde::Deserialize;

use super::provider::{ColumnRow, PrimaryKeyRow, SchemaProvider, TableRow};
use super::SchemaModel;
use crate::error::{Error, Result};

/// YAML 문서 기반 스키마 제공자
#[derive(Debug, Clone, Default)]
pub struct YamlSchemaProvider {
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    primary_keys: Vec<PrimaryKeyRow>,
}

impl YamlSchemaProvider {
    /// 단일 YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        let raw: RawSchema = serde_yaml::from_str(yaml)?;
        Self::convert_raw_schema(raw)
    }

    /// 여러 YAML 문서를 하나의 제공자로 합침 (문서 순서 유지)
    pub fn parse_multiple(yamls: &[&str]) -> Result<Self> {
        let mut merged = Self::default();

        for yaml in yamls {
            let provider = Self::parse_yaml(yaml)?;
            merged.tables.extend(provider.tables);
            merged.columns.extend(provider.columns);
            merged.primary_keys.extend(provider.primary_keys);
        }

        Ok(merged)
    }

    /// 파일에서 읽어 바로 스키마 모델 생성
    pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<SchemaModel> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::SchemaLoad {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let provider = Self::parse_yaml(&content)?;
        SchemaModel::from_provider(&provider)
    }

    /// Raw 스키마를 행 목록으로 변환
    fn convert_raw_schema(raw: RawSchema) -> Result<Self> {
        let mut provider = Self::default();

        let (defaults, others): (Vec<(String, RawTable)>, Vec<(String, RawTable)>) = raw
            .tables
            .into_iter()
            .map(|raw_table| {
                let schema = raw_table
                    .schema
                    .clone()
                    .unwrap_or_else(|| raw.default_schema.clone());
                (schema, raw_table)
            })
            .partition(|(schema, _)| *schema == raw.default_schema);

        for (schema, raw_table) in defaults.into_iter().chain(others) {
            provider.convert_raw_table(schema, raw_table)?;
        }

        Ok(provider)
    }

    /// Raw 테이블 변환
    fn convert_raw_table(&mut self, schema: String, raw: RawTable) -> Result<()> {
        if raw.name.trim().is_empty() {
            return Err(Error::SchemaLoad {
                message: format!("table without a name in schema '{}'", schema),
            });
        }

        self.tables.push(TableRow {
            schema: schema.clone(),
            name: raw.name.clone(),
            table_type: raw.kind.as_table_type().to_string(),
        });

        for raw_col in raw.columns {
            let (name, data_type) = match raw_col {
                RawColumn::Name(name) => (name, None),
                RawColumn::Full { name, data_type } => (name, data_type),
            };
            self.columns.push(ColumnRow {
                schema: schema.clone(),
                table: raw.name.clone(),
                name,
                data_type,
            });
        }

        for (ordinal, column) in raw.primary_key.into_iter().enumerate() {
            self.primary_keys.push(PrimaryKeyRow {
                schema: schema.clone(),
                table: raw.name.clone(),
                column,
                ordinal: ordinal as u32,
            });
        }

        Ok(())
    }
}

impl SchemaProvider for YamlSchemaProvider {
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

// ─────────────────────────────────────────────────────────────────────────────
// Raw YAML 구조
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(default = "default_schema_name")]
    default_schema: String,

    #[serde(default)]
    tables: Vec<RawTable>,
}

fn default_schema_name() -> String {
    "dbo".to_string()
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    schema: Option<String>,

    name: String,

    #[serde(default)]
    kind: RawTableKind,

    #[serde(default)]
    columns: Vec<RawColumn>,

    #[serde(default)]
    primary_key: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawTableKind {
    #[default]
    Table,
    View,
}

impl RawTableKind {
    fn as_table_type(&self) -> &'static str {
        match self {
            RawTableKind::Table => "BASE TABLE",
            RawTableKind::View => "VIEW",
        }
    }
}

/// 컬럼은 이름만 쓰거나 `{ name, type }` 형태로 쓸 수 있음
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Name(String),
    Full {
        name: String,
        #[serde(default, rename = "type")]
        data_type: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    const USERS_YAML: &str = r#"
default_schema: dbo
tables:
  - name: Users
    columns:
      - { name: Id, type: int }
      - { name: Name, type: nvarchar(100) }
      - Password
      - { name: Age, type: int }
    primary_key: [Id]
  - schema: audit
    name: UserLog
    kind: view
    columns: [Id, Message]
"#;

    #[test]
    fn test_parse_yaml_rows() {
        let provider = YamlSchemaProvider::parse_yaml(USERS_YAML).unwrap();

        let tables = provider.tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].schema, "dbo");
        assert_eq!(tables[1].schema, "audit");
        assert_eq!(tables[1].table_type, "VIEW");

        let columns = provider.columns();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[1].data_type.as_deref(), Some("nvarchar(100)"));
        assert_eq!(columns[2].data_type, None);

        let pks = provider.primary_keys();
        assert_eq!(pks.len(), 1);
        assert_eq!(pks[0].column, "Id");
    }

    #[test]
    fn test_yaml_to_schema_model() {
        let provider = YamlSchemaProvider::parse_yaml(USERS_YAML).unwrap();
        let model = SchemaModel::from_provider(&provider).unwrap();

        let users = model.find_table("users").unwrap();
        assert_eq!(users.primary_key, vec!["Id".to_string()]);
        assert_eq!(users.columns[0].column_type, ColumnType::Int);
        assert_eq!(users.columns[2].column_type, ColumnType::Other);
        assert_eq!(model.default_schema(), Some("dbo"));
    }

    #[test]
    fn test_parse_multiple_keeps_document_order() {
        let provider = YamlSchemaProvider::parse_multiple(&[
            "tables: [{ name: A, columns: [Id] }]",
            "tables: [{ name: B, columns: [Id] }]",
        ])
        .unwrap();

        let names: Vec<_> = provider.tables().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_declared_default_schema_wins() {
        let yaml = r#"
default_schema: sales
tables:
  - schema: audit
    name: Orders
    columns: [Id]
  - name: Orders
    columns: [Id]
"#;
        let provider = YamlSchemaProvider::parse_yaml(yaml).unwrap();
        let model = SchemaModel::from_provider(&provider).unwrap();

        assert_eq!(model.default_schema(), Some("sales"));
        assert_eq!(model.find_table("Orders").unwrap().schema, "sales");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = YamlSchemaProvider::parse_yaml("tables: {").unwrap_err();
        assert_eq!(err.code(), "YAML_ERROR");
    }
}
