//! 호출 컴파일 파이프라인
//!
//! 파싱 → 이름 해석 → 바인딩 → 컴파일을 한 번에 수행합니다.
//! 스키마 외에는 상태가 없으므로 여러 스레드에서 공유할 수 있습니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dsq_core::{Resolver, Result, SchemaModel};

use crate::binder::{FinderMatch, ValueBinder};
use crate::call::parse_for_table;
use crate::compiler::{CompiledStatement, StatementCompiler};
use crate::dialect::Dialect;
use crate::params::ValueSource;

/// 컴파일 옵션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub dialect: Dialect,
    pub finder_match: FinderMatch,
}

/// 동적 호출 컴파일러
#[derive(Debug, Clone)]
pub struct CallCompiler {
    schema: Arc<SchemaModel>,
    options: CompilerOptions,
}

impl CallCompiler {
    pub fn new(schema: Arc<SchemaModel>, options: CompilerOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// `table`에 대한 `operation` 호출을 SQL로 컴파일
    pub fn compile(
        &self,
        table: &str,
        operation: &str,
        source: ValueSource<'_>,
    ) -> Result<CompiledStatement> {
        let table = Resolver::new(&self.schema).table(table)?;
        let call = parse_for_table(operation, table)?;
        let bound = ValueBinder::new(table, self.options.finder_match).bind(&call, source)?;

        StatementCompiler::new(&self.options.dialect).compile(call.kind, table, &bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::equals;
    use crate::params::{NamedArguments, SerializedRecord};
    use crate::test_support::users_schema;
    use serde_json::json;

    fn compiler() -> CallCompiler {
        CallCompiler::new(Arc::new(users_schema()), CompilerOptions::default())
    }

    #[test]
    fn test_resolves_table_variants() {
        let compiler = compiler();
        for name in ["Users", "users", "dbo.Users", "[dbo].[Users]", "User"] {
            let stmt = compiler
                .compile(name, "FindById", ValueSource::Positional(vec![json!(1)]))
                .unwrap();
            assert_eq!(
                stmt.sql,
                "select [dbo].[Users].* from [dbo].[Users] where [dbo].[Users].[Id] = @p1",
                "{name}"
            );
        }
    }

    #[test]
    fn test_unknown_table() {
        let err = compiler()
            .compile("Customers", "All", ValueSource::None)
            .unwrap_err();
        assert_eq!(err.code(), "NAME_NOT_FOUND");
    }

    #[test]
    fn test_unsupported_operation() {
        let err = compiler()
            .compile("Users", "Upsert", ValueSource::None)
            .unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_OPERATION");
    }

    #[test]
    fn test_serialized_record_insert() {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct NewUser {
            name: String,
            age: i64,
            nickname: String,
        }

        let record = SerializedRecord::from_serialize(&NewUser {
            name: "Steve".to_string(),
            age: 50,
            nickname: "dropped".to_string(),
        })
        .unwrap();

        let stmt = compiler()
            .compile("Users", "Insert", ValueSource::Record(&record))
            .unwrap();
        assert_eq!(stmt.sql, "insert into [dbo].[Users] ([Name],[Age]) values (@p0,@p1)");
        assert_eq!(stmt.parameters, vec![json!("Steve"), json!(50)]);
    }

    #[test]
    fn test_equality_policy() {
        let compiler = CallCompiler::new(
            Arc::new(users_schema()),
            CompilerOptions {
                finder_match: FinderMatch::Equality,
                ..Default::default()
            },
        );
        let stmt = compiler
            .compile("Users", "FindAllByName", ValueSource::Positional(vec![json!("Foo")]))
            .unwrap();
        assert!(stmt.sql.ends_with("[dbo].[Users].[Name] = @p1"));
    }

    #[test]
    fn test_find_with_criteria() {
        let stmt = compiler()
            .compile("Users", "Find", equals("dbo.Users.Id", 1).into())
            .unwrap();
        assert_eq!(stmt.parameters, vec![json!(1)]);

        let stmt = compiler()
            .compile("Users", "Find", NamedArguments::new().arg("id", 1).into())
            .unwrap();
        assert_eq!(stmt.parameters, vec![json!(1)]);
    }

    #[test]
    fn test_options_deserialization() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{ "finder_match": "equality" }"#).unwrap();
        assert_eq!(options.finder_match, FinderMatch::Equality);
        assert_eq!(options.dialect, Dialect::sql_server());
    }

    #[test]
    fn test_compiler_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CallCompiler>();
    }
}
