//! Schema Model
//!
//! 데이터 소스 하나의 테이블/컬럼/기본키 카탈로그입니다.
//! 로드 시 한 번 만들어지고 이후에는 읽기 전용으로 공유됩니다 (`Arc<SchemaModel>`).

use serde::Serialize;

use super::column::Column;
use super::provider::{ColumnRow, PrimaryKeyRow, SchemaProvider, TableRow};
use super::table::{Table, TableKind};
use super::types::ColumnType;
use crate::error::{Error, Result};
use crate::resolver;

/// 스키마 모델
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaModel {
    /// 제공자 순서대로의 테이블 목록
    tables: Vec<Table>,

    /// 처음 등장한 순서대로의 스키마 이름
    schemas: Vec<String>,
}

impl SchemaModel {
    /// 제공자 행으로부터 스키마 모델 생성
    ///
    /// - 테이블은 제공자 순서, 컬럼은 테이블 내 제공자 순서를 유지합니다.
    /// - 테이블 행 없이 컬럼 행에만 등장한 테이블은 암묵적으로 생성됩니다.
    /// - 기본키는 ordinal 순으로 정렬됩니다.
    pub fn load(
        tables: &[TableRow],
        columns: &[ColumnRow],
        primary_keys: &[PrimaryKeyRow],
    ) -> Result<Self> {
        let mut model = Self::default();

        for row in tables {
            if model.position_exact(&row.schema, &row.name).is_some() {
                return Err(Error::SchemaLoad {
                    message: format!("duplicate table: {}.{}", row.schema, row.name),
                });
            }
            let mut table = Table::new(row.schema.clone(), row.name.clone());
            table.kind = TableKind::from_table_type(&row.table_type);
            model.push_table(table);
        }

        for row in columns {
            let idx = match model.position_exact(&row.schema, &row.table) {
                Some(idx) => idx,
                None => model.push_table(Table::new(row.schema.clone(), row.table.clone())),
            };
            let table = &mut model.tables[idx];

            if table.columns.iter().any(|c| c.name == row.name) {
                return Err(Error::SchemaLoad {
                    message: format!(
                        "duplicate column: {}.{}.{}",
                        row.schema, row.table, row.name
                    ),
                });
            }

            let column_type = row
                .data_type
                .as_deref()
                .map(ColumnType::from_data_type)
                .unwrap_or_default();
            table.columns.push(Column::new(row.name.clone(), column_type));
        }

        let mut keys: Vec<&PrimaryKeyRow> = primary_keys.iter().collect();
        keys.sort_by_key(|row| row.ordinal);

        for row in keys {
            let idx = model
                .position_exact(&row.schema, &row.table)
                .ok_or_else(|| Error::SchemaLoad {
                    message: format!(
                        "primary key references unknown table: {}.{}",
                        row.schema, row.table
                    ),
                })?;
            let table = &mut model.tables[idx];

            let column = table
                .columns
                .iter_mut()
                .find(|c| c.name == row.column)
                .ok_or_else(|| Error::SchemaLoad {
                    message: format!(
                        "primary key references unknown column: {}.{}.{}",
                        row.schema, row.table, row.column
                    ),
                })?;
            if column.is_primary_key {
                return Err(Error::SchemaLoad {
                    message: format!(
                        "duplicate primary key column: {}.{}.{}",
                        row.schema, row.table, row.column
                    ),
                });
            }
            column.is_primary_key = true;
            table.primary_key.push(column.name.clone());
        }

        tracing::debug!(
            tables = model.tables.len(),
            schemas = model.schemas.len(),
            "schema model loaded"
        );

        Ok(model)
    }

    /// 제공자로부터 스키마 모델 생성
    pub fn from_provider(provider: &dyn SchemaProvider) -> Result<Self> {
        Self::load(
            &provider.tables(),
            &provider.columns(),
            &provider.primary_keys(),
        )
    }

    /// 테이블 조회 (대소문자 무시, 스키마 한정자 선택)
    pub fn find_table(&self, name: &str) -> Result<&Table> {
        resolver::find_table(self, name)
    }

    /// 컬럼 조회
    pub fn find_column<'a>(&'a self, table: &'a Table, name: &str) -> Result<&'a Column> {
        resolver::find_column(table, name)
    }

    /// 기본 스키마 (처음 등장한 스키마)
    pub fn default_schema(&self) -> Option<&str> {
        self.schemas.first().map(String::as_str)
    }

    /// 모든 스키마 이름
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(String::as_str)
    }

    /// 모든 테이블
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    /// 특정 스키마의 테이블들
    pub fn tables_in<'a>(&'a self, schema: &'a str) -> impl Iterator<Item = &'a Table> + 'a {
        self.tables.iter().filter(move |t| t.schema == schema)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn position_exact(&self, schema: &str, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.schema == schema && t.name == name)
    }

    fn push_table(&mut self, table: Table) -> usize {
        if !self.schemas.contains(&table.schema) {
            self.schemas.push(table.schema.clone());
        }
        self.tables.push(table);
        self.tables.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchemaProvider;

    fn users_provider() -> StaticSchemaProvider {
        StaticSchemaProvider::new()
            .table("dbo", "Users")
            .columns("dbo", "Users", &["Id", "Name", "Password", "Age"])
            .primary_key("dbo", "Users", "Id", 0)
    }

    #[test]
    fn test_load_keeps_declared_order() {
        let model = SchemaModel::from_provider(&users_provider()).unwrap();
        let users = model.find_table("Users").unwrap();

        let names: Vec<_> = users.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Name", "Password", "Age"]);
        assert!(users.columns[0].is_primary_key);
        assert!(!users.columns[1].is_primary_key);
    }

    #[test]
    fn test_composite_key_sorted_by_ordinal() {
        let provider = StaticSchemaProvider::new()
            .table("dbo", "OrderLines")
            .columns("dbo", "OrderLines", &["OrderId", "LineNo", "Sku"])
            .primary_key("dbo", "OrderLines", "LineNo", 1)
            .primary_key("dbo", "OrderLines", "OrderId", 0);
        let model = SchemaModel::from_provider(&provider).unwrap();
        let table = model.find_table("OrderLines").unwrap();

        assert_eq!(table.primary_key, vec!["OrderId", "LineNo"]);
        let keys: Vec<_> = table.primary_key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, vec!["OrderId", "LineNo"]);
    }

    #[test]
    fn test_implicit_table_from_columns() {
        let provider = StaticSchemaProvider::new().columns("sales", "Orders", &["Id"]);
        let model = SchemaModel::from_provider(&provider).unwrap();

        assert_eq!(model.default_schema(), Some("sales"));
        assert!(model.find_table("Orders").is_ok());
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let provider = StaticSchemaProvider::new()
            .table("dbo", "Users")
            .table("dbo", "Users");
        let err = SchemaModel::from_provider(&provider).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_LOAD_ERROR");
    }

    #[test]
    fn test_primary_key_on_unknown_column_rejected() {
        let provider = users_provider().primary_key("dbo", "Users", "Missing", 1);
        let err = SchemaModel::from_provider(&provider).unwrap_err();
        assert!(err.to_string().contains("unknown column"));
    }

    #[test]
    fn test_duplicate_primary_key_rejected() {
        let provider = users_provider().primary_key("dbo", "Users", "Id", 1);
        let err = SchemaModel::from_provider(&provider).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_LOAD_ERROR");
        assert!(err.to_string().contains("duplicate primary key"));
    }

    #[test]
    fn test_default_schema_is_first_seen() {
        let provider = StaticSchemaProvider::new()
            .table("dbo", "Users")
            .table("audit", "Users")
            .columns("dbo", "Users", &["Id"])
            .columns("audit", "Users", &["Id"]);
        let model = SchemaModel::from_provider(&provider).unwrap();

        assert_eq!(model.default_schema(), Some("dbo"));
        assert_eq!(model.schemas().collect::<Vec<_>>(), vec!["dbo", "audit"]);
        assert_eq!(model.tables_in("audit").count(), 1);
    }
}
