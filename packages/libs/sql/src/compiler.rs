//! Statement Compiler
//!
//! 바인딩된 호출을 방언에 맞는 SQL 문자열과 파라미터 목록으로 변환합니다.
//! 순수 함수이며, 같은 입력에 대해 항상 같은 문자열을 만듭니다.

use serde::Serialize;
use serde_json::Value;

use dsq_core::{Error, Result, Table};

use crate::binder::{Binding, BoundCall, Predicate};
use crate::call::OperationKind;
use crate::criteria::Operator;
use crate::dialect::Dialect;

/// 컴파일된 문장
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub kind: OperationKind,

    /// SQL 텍스트
    pub sql: String,

    /// placeholder 순서대로의 값
    pub parameters: Vec<Value>,
}

impl CompiledStatement {
    /// 행을 돌려주는 문장인지 (SELECT)
    pub fn returns_rows(&self) -> bool {
        self.kind.is_select()
    }
}

impl std::fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// placeholder 번호 발급기 (재사용 없음)
struct Placeholders<'d> {
    dialect: &'d Dialect,
    next: usize,
    values: Vec<Value>,
}

impl<'d> Placeholders<'d> {
    fn starting_at(dialect: &'d Dialect, base: usize) -> Self {
        Self {
            dialect,
            next: base,
            values: Vec::new(),
        }
    }

    fn bind(&mut self, value: &Value) -> String {
        let token = self.dialect.placeholder(self.next);
        self.next += 1;
        self.values.push(value.clone());
        token
    }
}

/// 문장 컴파일러
pub struct StatementCompiler<'d> {
    dialect: &'d Dialect,
}

impl<'d> StatementCompiler<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    /// SQL 생성
    pub fn compile(
        &self,
        kind: OperationKind,
        table: &Table,
        bound: &BoundCall,
    ) -> Result<CompiledStatement> {
        let (sql, parameters) = match kind {
            OperationKind::Insert => self.insert(table, bound)?,
            OperationKind::Update | OperationKind::UpdateBy => self.update(kind, table, bound)?,
            OperationKind::Delete | OperationKind::DeleteBy => self.delete(kind, table, bound)?,
            OperationKind::Find
            | OperationKind::FindBy
            | OperationKind::FindAll
            | OperationKind::FindAllBy
            | OperationKind::All => self.select(table, bound),
        };

        tracing::debug!(%kind, table = %table, sql = %sql, parameters = parameters.len(), "compiled statement");

        Ok(CompiledStatement {
            kind,
            sql,
            parameters,
        })
    }

    fn insert(&self, table: &Table, bound: &BoundCall) -> Result<(String, Vec<Value>)> {
        if bound.assignments.is_empty() {
            return Err(Error::MissingValues {
                operation: format!("{} on {}", OperationKind::Insert, table),
            });
        }

        let mut placeholders = Placeholders::starting_at(self.dialect, self.dialect.insert_base);
        let columns: Vec<String> = bound
            .assignments
            .iter()
            .map(|b| self.dialect.quote(&b.column.name))
            .collect();
        let tokens: Vec<String> = bound
            .assignments
            .iter()
            .map(|b| placeholders.bind(&b.value))
            .collect();

        let sql = format!(
            "insert into {} ({}) values ({})",
            self.table_name(table),
            columns.join(","),
            tokens.join(",")
        );
        Ok((sql, placeholders.values))
    }

    fn update(
        &self,
        kind: OperationKind,
        table: &Table,
        bound: &BoundCall,
    ) -> Result<(String, Vec<Value>)> {
        if bound.predicates.is_empty() {
            return Err(Error::MissingCriteria {
                operation: format!("{kind} on {table}"),
            });
        }
        if bound.assignments.is_empty() {
            return Err(Error::MissingValues {
                operation: format!("{kind} on {table}"),
            });
        }

        let mut placeholders = Placeholders::starting_at(self.dialect, self.dialect.statement_base);
        // SET 먼저 번호를 받음
        let sets: Vec<String> = bound
            .assignments
            .iter()
            .map(|b| self.assignment(b, &mut placeholders))
            .collect();
        let filter = self.where_clause(table, &bound.predicates, &mut placeholders);

        let sql = format!(
            "update {} set {}{}",
            self.table_name(table),
            sets.join(", "),
            filter
        );
        Ok((sql, placeholders.values))
    }

    fn delete(
        &self,
        kind: OperationKind,
        table: &Table,
        bound: &BoundCall,
    ) -> Result<(String, Vec<Value>)> {
        if bound.predicates.is_empty() {
            return Err(Error::MissingCriteria {
                operation: format!("{kind} on {table}"),
            });
        }

        let mut placeholders = Placeholders::starting_at(self.dialect, self.dialect.statement_base);
        let filter = self.where_clause(table, &bound.predicates, &mut placeholders);

        let sql = format!("delete from {}{}", self.table_name(table), filter);
        Ok((sql, placeholders.values))
    }

    fn select(&self, table: &Table, bound: &BoundCall) -> (String, Vec<Value>) {
        let mut placeholders = Placeholders::starting_at(self.dialect, self.dialect.statement_base);
        let filter = self.where_clause(table, &bound.predicates, &mut placeholders);

        let table_name = self.table_name(table);
        let sql = format!("select {table_name}.* from {table_name}{filter}");
        (sql, placeholders.values)
    }

    fn assignment(&self, binding: &Binding, placeholders: &mut Placeholders<'_>) -> String {
        format!(
            "{} = {}",
            self.dialect.quote(&binding.column.name),
            placeholders.bind(&binding.value)
        )
    }

    /// ` where a = @p1 and b like @p2` (조건이 없으면 빈 문자열)
    fn where_clause(
        &self,
        table: &Table,
        predicates: &[Predicate],
        placeholders: &mut Placeholders<'_>,
    ) -> String {
        if predicates.is_empty() {
            return String::new();
        }

        let conditions: Vec<String> = predicates
            .iter()
            .map(|p| {
                let column = self
                    .dialect
                    .qualified(&[table.schema.as_str(), table.name.as_str(), p.column.name.as_str()]);
                match (p.operator, &p.value) {
                    (Operator::Equal, Value::Null) => format!("{column} is null"),
                    (operator, value) => {
                        format!("{column} {} {}", operator.as_sql(), placeholders.bind(value))
                    }
                }
            })
            .collect();

        format!(" where {}", conditions.join(" and "))
    }

    fn table_name(&self, table: &Table) -> String {
        self.dialect.qualified(&[table.schema.as_str(), table.name.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{FinderMatch, ValueBinder};
    use crate::call::parse_for_table;
    use crate::criteria::equals;
    use crate::params::{NamedArguments, ValueSource};
    use crate::test_support::users_schema;
    use serde_json::json;

    fn compile_with(dialect: &Dialect, operation: &str, source: ValueSource<'_>) -> Result<CompiledStatement> {
        let schema = users_schema();
        let table = schema.find_table("Users")?;
        let call = parse_for_table(operation, table)?;
        let bound = ValueBinder::new(table, FinderMatch::default()).bind(&call, source)?;
        StatementCompiler::new(dialect).compile(call.kind, table, &bound)
    }

    fn compile(operation: &str, source: ValueSource<'_>) -> Result<CompiledStatement> {
        compile_with(&Dialect::default(), operation, source)
    }

    #[test]
    fn test_find_by_name() {
        let stmt = compile("FindByName", ValueSource::Positional(vec![json!("Foo")])).unwrap();
        assert_eq!(
            stmt.sql,
            "select [dbo].[Users].* from [dbo].[Users] where [dbo].[Users].[Name] like @p1"
        );
        assert_eq!(stmt.parameters, vec![json!("Foo")]);
        assert!(stmt.returns_rows());
    }

    #[test]
    fn test_insert() {
        let record = json!({ "Name": "Steve", "Age": 50 });
        let stmt = compile("Insert", ValueSource::Record(record.as_object().unwrap())).unwrap();
        assert_eq!(
            stmt.sql,
            "insert into [dbo].[Users] ([Name],[Age]) values (@p0,@p1)"
        );
        assert_eq!(stmt.parameters, vec![json!("Steve"), json!(50)]);
        assert!(!stmt.returns_rows());
    }

    #[test]
    fn test_update_by_id() {
        let record = json!({ "Id": 1, "Name": "Steve", "Age": 50 });
        let stmt = compile("UpdateById", ValueSource::Record(record.as_object().unwrap())).unwrap();
        assert_eq!(
            stmt.sql,
            "update [dbo].[Users] set [Name] = @p1, [Age] = @p2 where [dbo].[Users].[Id] = @p3"
        );
        assert_eq!(stmt.parameters, vec![json!("Steve"), json!(50), json!(1)]);
    }

    #[test]
    fn test_update_by_primary_key() {
        let args = NamedArguments::new().arg("Age", 51).arg("Id", 3);
        let stmt = compile("Update", ValueSource::Named(args)).unwrap();
        assert_eq!(
            stmt.sql,
            "update [dbo].[Users] set [Age] = @p1 where [dbo].[Users].[Id] = @p2"
        );
        assert_eq!(stmt.parameters, vec![json!(51), json!(3)]);
    }

    #[test]
    fn test_find_and_delete_share_parameter_order() {
        let expr = || equals("Name", "Steve").and(equals("Age", 50));

        let find = compile("FindAll", ValueSource::Criteria(expr())).unwrap();
        let delete = compile("Delete", ValueSource::Criteria(expr())).unwrap();

        assert_eq!(
            find.sql,
            "select [dbo].[Users].* from [dbo].[Users] where [dbo].[Users].[Name] = @p1 and [dbo].[Users].[Age] = @p2"
        );
        assert_eq!(
            delete.sql,
            "delete from [dbo].[Users] where [dbo].[Users].[Name] = @p1 and [dbo].[Users].[Age] = @p2"
        );
        assert_eq!(find.parameters, delete.parameters);
    }

    #[test]
    fn test_all_has_no_where() {
        let stmt = compile("All", ValueSource::None).unwrap();
        assert_eq!(stmt.sql, "select [dbo].[Users].* from [dbo].[Users]");
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn test_null_equality() {
        let args = NamedArguments::new().arg("Password", Value::Null).arg("Age", 30);
        let stmt = compile("FindAll", ValueSource::Named(args)).unwrap();
        assert_eq!(
            stmt.sql,
            "select [dbo].[Users].* from [dbo].[Users] where [dbo].[Users].[Password] is null and [dbo].[Users].[Age] = @p1"
        );
        assert_eq!(stmt.parameters, vec![json!(30)]);
    }

    #[test]
    fn test_column_order_ignores_input_order() {
        let a = compile(
            "Insert",
            ValueSource::Named(NamedArguments::new().arg("Age", 50).arg("Name", "Steve")),
        )
        .unwrap();
        let b = compile(
            "Insert",
            ValueSource::Named(NamedArguments::new().arg("Name", "Steve").arg("Age", 50)),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let first = compile("FindAllByNameAndAge", ValueSource::Positional(vec![json!("S%"), json!(5)])).unwrap();
        let second = compile("FindAllByNameAndAge", ValueSource::Positional(vec![json!("S%"), json!(5)])).unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.parameters, second.parameters);
    }

    #[test]
    fn test_unrestricted_statements_refused() {
        let schema = users_schema();
        let table = schema.find_table("Users").unwrap();
        let dialect = Dialect::default();
        let compiler = StatementCompiler::new(&dialect);

        let err = compiler
            .compile(OperationKind::Delete, table, &BoundCall::default())
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_CRITERIA");

        let err = compiler
            .compile(OperationKind::Update, table, &BoundCall::default())
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_CRITERIA");

        let err = compiler
            .compile(OperationKind::Insert, table, &BoundCall::default())
            .unwrap_err();
        assert_eq!(err.code(), "MISSING_VALUES");
    }

    #[test]
    fn test_postgres_dialect() {
        let stmt = compile_with(
            &Dialect::postgres(),
            "Insert",
            ValueSource::Named(NamedArguments::new().arg("Name", "Steve")),
        )
        .unwrap();
        assert_eq!(stmt.sql, "insert into \"dbo\".\"users\" (\"name\") values ($1)");

        let stmt = compile_with(
            &Dialect::postgres(),
            "DeleteById",
            ValueSource::Positional(vec![json!(1)]),
        )
        .unwrap();
        assert_eq!(stmt.sql, "delete from \"dbo\".\"users\" where \"dbo\".\"users\".\"id\" = $1");
    }
}
