//! Value Binder
//!
//! 호출 인자(이름 있는 인자, 레코드, 조건식, 위치 인자)를
//! 컬럼과 값의 순서 있는 쌍으로 정규화합니다.
//!
//! # 순서 규칙
//!
//! - Insert/Update의 SET 값은 스키마에 선언된 컬럼 순서를 따릅니다. (입력 순서와 무관)
//! - Find/Delete 조건은 조건이 선언된 순서를 따릅니다.
//! - Update의 기본키는 SET에서 빠지고 WHERE로 갑니다. `UpdateBy<Columns>`는 `By` 컬럼이 WHERE가 됩니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dsq_core::{Column, Error, Result, Table};

use crate::call::{OperationKind, ParsedCall};
use crate::criteria::{CriteriaExpression, Operator};
use crate::params::{json_kind, NamedArguments, Record, ValueSource};

/// `FindBy<Column>` 위치 인자의 비교 연산자 정책
///
/// 호출마다 의도를 추측하지 않고, 컴파일러 단위로 하나를 고정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderMatch {
    /// 문자열 값은 `like`, 그 외는 `=` (기본값)
    #[default]
    LikeForStrings,
    /// 항상 `=`
    Equality,
}

impl FinderMatch {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "like" | "like_for_strings" => Some(FinderMatch::LikeForStrings),
            "equals" | "equality" | "eq" => Some(FinderMatch::Equality),
            _ => None,
        }
    }

    fn operator_for(&self, value: &Value) -> Operator {
        match (self, value) {
            (FinderMatch::LikeForStrings, Value::String(_)) => Operator::Like,
            _ => Operator::Equal,
        }
    }
}

/// SET 절 값 하나
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub column: Column,
    pub value: Value,
}

/// WHERE 절 조건 하나
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Column,
    pub operator: Operator,
    pub value: Value,
}

/// 바인딩 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundCall {
    /// SET / VALUES 값 (스키마 선언 순)
    pub assignments: Vec<Binding>,

    /// WHERE 조건 (선언 순, AND 결합)
    pub predicates: Vec<Predicate>,
}

impl BoundCall {
    /// placeholder 순서대로의 값 (SET 먼저, WHERE 나중)
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.assignments
            .iter()
            .map(|b| &b.value)
            .chain(self.predicates.iter().map(|p| &p.value))
    }
}

/// 값 바인더
pub struct ValueBinder<'a> {
    table: &'a Table,
    finder_match: FinderMatch,
}

impl<'a> ValueBinder<'a> {
    pub fn new(table: &'a Table, finder_match: FinderMatch) -> Self {
        Self {
            table,
            finder_match,
        }
    }

    /// 파싱된 호출과 인자를 바인딩
    pub fn bind(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        match call.kind {
            OperationKind::Insert => self.bind_insert(call, source),
            OperationKind::Update => self.bind_update(call, source),
            OperationKind::UpdateBy => self.bind_update_by(call, source),
            OperationKind::Delete => self.bind_delete(call, source),
            OperationKind::Find | OperationKind::FindAll => self.bind_find(call, source),
            OperationKind::FindBy | OperationKind::FindAllBy | OperationKind::DeleteBy => {
                self.bind_by(call, source)
            }
            OperationKind::All => self.bind_all(call, source),
        }
    }

    fn bind_insert(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        let fields = self.fields(call, source)?;
        let assignments = self.in_schema_order(fields);

        if assignments.is_empty() {
            return Err(Error::MissingValues {
                operation: call.operation.clone(),
            });
        }

        Ok(BoundCall {
            assignments,
            predicates: Vec::new(),
        })
    }

    fn bind_update(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        if !self.table.has_primary_key() {
            return Err(Error::MissingCriteria {
                operation: format!("{} on {} (table has no primary key)", call.operation, self.table),
            });
        }

        let fields = self.fields(call, source)?;
        let key_columns: Vec<&Column> = self.table.primary_key_columns().collect();
        let predicates = self.take_predicates(call, &key_columns, &fields)?;

        let assignments = self.in_schema_order(
            fields
                .into_iter()
                .filter(|b| !b.column.is_primary_key)
                .collect(),
        );
        if assignments.is_empty() {
            return Err(Error::MissingValues {
                operation: call.operation.clone(),
            });
        }

        Ok(BoundCall {
            assignments,
            predicates,
        })
    }

    fn bind_update_by(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        let by_columns = self.by_columns(call)?;
        let fields = self.fields(call, source)?;
        let predicates = self.take_predicates(call, &by_columns, &fields)?;

        let assignments = self.in_schema_order(
            fields
                .into_iter()
                .filter(|b| !b.column.is_primary_key)
                .filter(|b| !by_columns.iter().any(|c| c.name == b.column.name))
                .collect(),
        );
        if assignments.is_empty() {
            return Err(Error::MissingValues {
                operation: call.operation.clone(),
            });
        }

        Ok(BoundCall {
            assignments,
            predicates,
        })
    }

    fn bind_delete(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        let predicates = match source {
            ValueSource::Named(args) => self
                .named_fields(&args)?
                .into_iter()
                .map(|b| self.equality(b.column, b.value))
                .collect::<Result<Vec<_>>>()?,
            ValueSource::Record(record) => {
                // 레코드 삭제는 기본키 기준
                let key_columns: Vec<&Column> = self.table.primary_key_columns().collect();
                if key_columns.is_empty() {
                    return Err(Error::MissingCriteria {
                        operation: format!(
                            "{} on {} (table has no primary key)",
                            call.operation, self.table
                        ),
                    });
                }
                let fields = self.record_fields(record)?;
                self.take_predicates(call, &key_columns, &fields)?
            }
            ValueSource::Criteria(expr) => self.criteria_predicates(&expr)?,
            other => return Err(self.invalid(call, &other)),
        };

        if predicates.is_empty() {
            return Err(Error::MissingCriteria {
                operation: call.operation.clone(),
            });
        }

        Ok(BoundCall {
            assignments: Vec::new(),
            predicates,
        })
    }

    fn bind_find(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        let predicates = match source {
            ValueSource::Criteria(expr) => self.criteria_predicates(&expr)?,
            ValueSource::Named(args) => self
                .named_fields(&args)?
                .into_iter()
                .map(|b| self.equality(b.column, b.value))
                .collect::<Result<Vec<_>>>()?,
            other => return Err(self.invalid(call, &other)),
        };

        if predicates.is_empty() {
            return Err(Error::MissingCriteria {
                operation: call.operation.clone(),
            });
        }

        Ok(BoundCall {
            assignments: Vec::new(),
            predicates,
        })
    }

    /// `FindBy`, `FindAllBy`, `DeleteBy`
    fn bind_by(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        let by_columns = self.by_columns(call)?;

        let values: Vec<Value> = match source {
            ValueSource::Positional(values) => {
                if values.len() != by_columns.len() {
                    return Err(Error::ArgumentCount {
                        operation: call.operation.clone(),
                        expected: by_columns.len(),
                        actual: values.len(),
                    });
                }
                values
            }
            ValueSource::Named(args) => {
                let fields = self.named_fields(&args)?;
                // 이름 있는 인자는 모두 `By` 컬럼이어야 함
                if let Some(extra) = fields
                    .iter()
                    .find(|b| !by_columns.iter().any(|c| c.name == b.column.name))
                {
                    return Err(Error::InvalidArguments {
                        operation: call.operation.clone(),
                        message: format!("'{}' is not a criterion of the call", extra.column.name),
                    });
                }
                self.take_predicates(call, &by_columns, &fields)?
                    .into_iter()
                    .map(|p| p.value)
                    .collect()
            }
            ValueSource::Record(record) => {
                let fields = self.record_fields(record)?;
                self.take_predicates(call, &by_columns, &fields)?
                    .into_iter()
                    .map(|p| p.value)
                    .collect()
            }
            other => return Err(self.invalid(call, &other)),
        };

        let predicates = by_columns
            .into_iter()
            .zip(values)
            .map(|(column, value)| {
                let operator = if call.kind == OperationKind::DeleteBy {
                    Operator::Equal
                } else {
                    self.finder_match.operator_for(&value)
                };
                self.predicate(column.clone(), operator, value)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BoundCall {
            assignments: Vec::new(),
            predicates,
        })
    }

    fn bind_all(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<BoundCall> {
        match source {
            ValueSource::None => Ok(BoundCall::default()),
            ValueSource::Positional(values) if values.is_empty() => Ok(BoundCall::default()),
            other => Err(self.invalid(call, &other)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert/Update 값 추출: 이름 있는 인자 또는 레코드
    fn fields(&self, call: &ParsedCall, source: ValueSource<'_>) -> Result<Vec<Binding>> {
        match source {
            ValueSource::Named(args) => self.named_fields(&args),
            ValueSource::Record(record) => self.record_fields(record),
            other => Err(self.invalid(call, &other)),
        }
    }

    /// 이름 있는 인자: 모르는 컬럼은 `UnknownColumn`
    fn named_fields(&self, args: &NamedArguments) -> Result<Vec<Binding>> {
        let mut fields: Vec<Binding> = Vec::with_capacity(args.len());

        for (name, value) in args.iter() {
            let column = match self.table.find_column(name) {
                Ok(column) => column,
                Err(Error::NameNotFound { .. }) => {
                    return Err(Error::UnknownColumn {
                        table: self.table.qualified_name(),
                        column: name.to_string(),
                    })
                }
                Err(e) => return Err(e),
            };
            self.push_field(&mut fields, column, value.clone())?;
        }

        Ok(fields)
    }

    /// 레코드: 모르는 멤버는 조용히 버림
    fn record_fields(&self, record: &dyn Record) -> Result<Vec<Binding>> {
        let mut fields: Vec<Binding> = Vec::new();

        for (name, value) in record.fields() {
            let column = match self.table.find_column(&name) {
                Ok(column) => column,
                Err(Error::NameNotFound { .. }) => {
                    tracing::trace!(member = %name, table = %self.table, "record member dropped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.push_field(&mut fields, column, value)?;
        }

        Ok(fields)
    }

    fn push_field(&self, fields: &mut Vec<Binding>, column: &Column, value: Value) -> Result<()> {
        if fields.iter().any(|b| b.column.name == column.name) {
            return Err(Error::InvalidArguments {
                operation: self.table.qualified_name(),
                message: format!("column '{}' supplied more than once", column.name),
            });
        }
        check_type(column, &value)?;
        fields.push(Binding {
            column: column.clone(),
            value,
        });
        Ok(())
    }

    /// 지정한 컬럼들의 값을 꺼내 조건으로 (컬럼 순서대로)
    fn take_predicates(
        &self,
        call: &ParsedCall,
        columns: &[&Column],
        fields: &[Binding],
    ) -> Result<Vec<Predicate>> {
        columns
            .iter()
            .map(|column| {
                let binding = fields
                    .iter()
                    .find(|b| b.column.name == column.name)
                    .ok_or_else(|| Error::MissingCriteria {
                        operation: format!("{} (no value for '{}')", call.operation, column.name),
                    })?;
                self.equality(binding.column.clone(), binding.value.clone())
            })
            .collect()
    }

    fn by_columns(&self, call: &ParsedCall) -> Result<Vec<&'a Column>> {
        if call.criterion_names.is_empty() {
            return Err(Error::UnsupportedOperation {
                name: call.operation.clone(),
            });
        }
        call.criterion_names
            .iter()
            .map(|name| self.table.find_column(name))
            .collect()
    }

    fn criteria_predicates(&self, expr: &CriteriaExpression) -> Result<Vec<Predicate>> {
        expr.criteria()
            .into_iter()
            .map(|criterion| {
                let column = self.table.find_column(&criterion.column)?;
                self.predicate(column.clone(), criterion.operator, criterion.value.clone())
            })
            .collect()
    }

    fn equality(&self, column: Column, value: Value) -> Result<Predicate> {
        self.predicate(column, Operator::Equal, value)
    }

    fn predicate(&self, column: Column, operator: Operator, value: Value) -> Result<Predicate> {
        if operator == Operator::Equal {
            check_type(&column, &value)?;
        }
        Ok(Predicate {
            column,
            operator,
            value,
        })
    }

    /// 선언 순으로 정렬
    fn in_schema_order(&self, mut fields: Vec<Binding>) -> Vec<Binding> {
        fields.sort_by_key(|b| self.table.column_position(&b.column).unwrap_or(usize::MAX));
        fields
    }

    fn invalid(&self, call: &ParsedCall, source: &ValueSource<'_>) -> Error {
        Error::InvalidArguments {
            operation: call.operation.clone(),
            message: format!("{} does not accept {}", call.kind, source.describe()),
        }
    }
}

/// 컬럼 타입 태그와 값 종류가 맞는지 검사
fn check_type(column: &Column, value: &Value) -> Result<()> {
    if column.column_type.accepts(value) {
        return Ok(());
    }
    Err(Error::TypeMismatch {
        column: column.name.clone(),
        expected: format!(
            "{}, got {}",
            column.column_type.expected_json_type(),
            json_kind(value)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::parse_for_table;
    use crate::criteria::{equals, like};
    use crate::test_support::{typed_users_schema, users_schema};
    use serde_json::json;

    fn bind(operation: &str, source: ValueSource<'_>) -> Result<BoundCall> {
        let schema = users_schema();
        let table = schema.find_table("Users").unwrap();
        let call = parse_for_table(operation, table)?;
        ValueBinder::new(table, FinderMatch::default()).bind(&call, source)
    }

    fn columns(bindings: &[Binding]) -> Vec<&str> {
        bindings.iter().map(|b| b.column.name.as_str()).collect()
    }

    fn predicate_columns(predicates: &[Predicate]) -> Vec<&str> {
        predicates.iter().map(|p| p.column.name.as_str()).collect()
    }

    #[test]
    fn test_insert_uses_schema_order() {
        let args = NamedArguments::new().arg("age", 50).arg("NAME", "Steve");
        let bound = bind("Insert", ValueSource::Named(args)).unwrap();

        assert_eq!(columns(&bound.assignments), vec!["Name", "Age"]);
        assert_eq!(bound.values().collect::<Vec<_>>(), vec![&json!("Steve"), &json!(50)]);
    }

    #[test]
    fn test_named_unknown_column_fails() {
        let args = NamedArguments::new().arg("Name", "Steve").arg("Shoe", 9);
        let err = bind("Insert", ValueSource::Named(args)).unwrap_err();
        match err {
            Error::UnknownColumn { column, .. } => assert_eq!(column, "Shoe"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_record_unknown_member_dropped() {
        let record = json!({ "Name": "Steve", "Shoe": 9 });
        let bound = bind("Insert", ValueSource::Record(record.as_object().unwrap())).unwrap();
        assert_eq!(columns(&bound.assignments), vec!["Name"]);
    }

    #[test]
    fn test_update_routes_key_to_where() {
        let record = json!({ "Id": 1, "Name": "Steve", "Age": 50 });
        let bound = bind("Update", ValueSource::Record(record.as_object().unwrap())).unwrap();

        assert_eq!(columns(&bound.assignments), vec!["Name", "Age"]);
        assert_eq!(predicate_columns(&bound.predicates), vec!["Id"]);
        assert_eq!(
            bound.values().cloned().collect::<Vec<_>>(),
            vec![json!("Steve"), json!(50), json!(1)]
        );
    }

    #[test]
    fn test_update_without_key_value() {
        let args = NamedArguments::new().arg("Name", "Steve");
        let err = bind("Update", ValueSource::Named(args)).unwrap_err();
        assert_eq!(err.code(), "MISSING_CRITERIA");
    }

    #[test]
    fn test_update_by_other_column() {
        let args = NamedArguments::new()
            .arg("Id", 1)
            .arg("Name", "Steve")
            .arg("Age", 50);
        let bound = bind("UpdateByName", ValueSource::Named(args)).unwrap();

        // 기본키와 By 컬럼 모두 SET에서 제외
        assert_eq!(columns(&bound.assignments), vec!["Age"]);
        assert_eq!(predicate_columns(&bound.predicates), vec!["Name"]);
    }

    #[test]
    fn test_update_with_only_keys_has_nothing_to_set() {
        let args = NamedArguments::new().arg("Id", 1);
        let err = bind("UpdateById", ValueSource::Named(args)).unwrap_err();
        assert_eq!(err.code(), "MISSING_VALUES");
    }

    #[test]
    fn test_find_by_string_uses_like() {
        let bound = bind("FindByName", ValueSource::Positional(vec![json!("Foo")])).unwrap();
        assert_eq!(bound.predicates[0].operator, Operator::Like);

        let bound = bind("FindById", ValueSource::Positional(vec![json!(1)])).unwrap();
        assert_eq!(bound.predicates[0].operator, Operator::Equal);
    }

    #[test]
    fn test_find_by_equality_policy() {
        let schema = users_schema();
        let table = schema.find_table("Users").unwrap();
        let call = parse_for_table("FindByName", table).unwrap();
        let bound = ValueBinder::new(table, FinderMatch::Equality)
            .bind(&call, ValueSource::Positional(vec![json!("Foo")]))
            .unwrap();
        assert_eq!(bound.predicates[0].operator, Operator::Equal);
    }

    #[test]
    fn test_find_by_argument_count() {
        let err = bind("FindByNameAndAge", ValueSource::Positional(vec![json!("Foo")])).unwrap_err();
        match err {
            Error::ArgumentCount { expected, actual, .. } => {
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_find_by_unknown_column() {
        let err = bind("FindByShoeSize", ValueSource::Positional(vec![json!(9)])).unwrap_err();
        assert_eq!(err.code(), "NAME_NOT_FOUND");
    }

    #[test]
    fn test_criteria_keep_declaration_order() {
        let expr = equals("Users.Age", 50).and(like("Name", "St%"));
        let bound = bind("FindAll", ValueSource::Criteria(expr)).unwrap();

        assert_eq!(predicate_columns(&bound.predicates), vec!["Age", "Name"]);
        assert_eq!(bound.predicates[1].operator, Operator::Like);
    }

    #[test]
    fn test_criteria_on_unknown_column() {
        let err = bind("Find", ValueSource::Criteria(equals("Nope", 1).into())).unwrap_err();
        assert_eq!(err.code(), "NAME_NOT_FOUND");
    }

    #[test]
    fn test_delete_sources() {
        let bound = bind("Delete", ValueSource::Named(NamedArguments::new().arg("Id", 1))).unwrap();
        assert_eq!(predicate_columns(&bound.predicates), vec!["Id"]);

        let record = json!({ "Id": 7, "Name": "ignored" });
        let bound = bind("Delete", ValueSource::Record(record.as_object().unwrap())).unwrap();
        assert_eq!(predicate_columns(&bound.predicates), vec!["Id"]);
        assert_eq!(bound.predicates[0].value, json!(7));

        let err = bind("Delete", ValueSource::None).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");

        let err = bind("Delete", ValueSource::Named(NamedArguments::new())).unwrap_err();
        assert_eq!(err.code(), "MISSING_CRITERIA");
    }

    #[test]
    fn test_delete_by_always_equality() {
        let bound = bind("DeleteByName", ValueSource::Positional(vec![json!("Foo")])).unwrap();
        assert_eq!(bound.predicates[0].operator, Operator::Equal);
    }

    #[test]
    fn test_by_named_arguments_must_be_criteria() {
        let args = NamedArguments::new().arg("Id", 1).arg("Name", "Bob");
        let err = bind("DeleteById", ValueSource::Named(args)).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
        assert!(err.to_string().contains("Name"));

        let args = NamedArguments::new().arg("Id", 1);
        let bound = bind("DeleteById", ValueSource::Named(args)).unwrap();
        assert_eq!(predicate_columns(&bound.predicates), vec!["Id"]);

        // 레코드는 남는 멤버를 허용
        let record = json!({ "Id": 1, "Name": "Bob" });
        let bound = bind("DeleteById", ValueSource::Record(record.as_object().unwrap())).unwrap();
        assert_eq!(predicate_columns(&bound.predicates), vec!["Id"]);
    }

    #[test]
    fn test_all_takes_no_arguments() {
        let bound = bind("All", ValueSource::None).unwrap();
        assert!(bound.predicates.is_empty());

        let err = bind("All", ValueSource::Positional(vec![json!(1)])).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }

    #[test]
    fn test_duplicate_named_argument() {
        let args = NamedArguments::new().arg("Name", "a").arg("name", "b");
        let err = bind("Insert", ValueSource::Named(args)).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }

    #[test]
    fn test_type_sanity() {
        let schema = typed_users_schema();
        let table = schema.find_table("Users").unwrap();
        let binder = ValueBinder::new(table, FinderMatch::default());

        let call = parse_for_table("Insert", table).unwrap();
        let args = NamedArguments::new().arg("Name", "Steve").arg("Age", "fifty");
        let err = binder.bind(&call, ValueSource::Named(args)).unwrap_err();
        match err {
            Error::TypeMismatch { column, .. } => assert_eq!(column, "Age"),
            other => panic!("unexpected error: {other:?}"),
        }

        let args = NamedArguments::new().arg("Name", Value::Null).arg("Age", 50);
        assert!(binder.bind(&call, ValueSource::Named(args)).is_ok());
    }
}
