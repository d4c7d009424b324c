//! Database facade
//!
//! 호출 컴파일과 실행을 묶습니다. 트랜잭션은 암묵적 문맥이 아니라
//! `call`의 `scope` 인자로 명시적으로 전달합니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use dsq_core::{Error, Result, SchemaModel};
use dsq_sql::{CallCompiler, CompiledStatement, CompilerOptions, ValueSource};

use crate::engine::{ExecutionEngine, Outcome, Row};
use crate::scope::TransactionScope;

/// 호출 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CallResult {
    /// `Find`, `FindBy`: 첫 행
    Record(Option<Row>),
    /// `FindAll`, `FindAllBy`, `All`: 모든 행
    Records(Vec<Row>),
    /// 쓰기 연산: 영향받은 행 수
    Affected(u64),
}

/// 작업 단위
///
/// 한 번에 하나의 트랜잭션 스코프만 열 수 있습니다.
pub struct Database {
    compiler: CallCompiler,
    engine: Arc<dyn ExecutionEngine>,
    scope_active: Arc<AtomicBool>,
}

impl Database {
    pub fn new(
        schema: Arc<SchemaModel>,
        engine: Arc<dyn ExecutionEngine>,
        options: CompilerOptions,
    ) -> Self {
        Self {
            compiler: CallCompiler::new(schema, options),
            engine,
            scope_active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn compiler(&self) -> &CallCompiler {
        &self.compiler
    }

    pub fn schema(&self) -> &SchemaModel {
        self.compiler.schema()
    }

    /// 트랜잭션 스코프 시작
    pub fn begin_transaction(&self) -> Result<TransactionScope> {
        if self
            .scope_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ScopeAlreadyActive);
        }

        match self.engine.begin() {
            Ok(handle) => Ok(TransactionScope::new(handle, self.scope_active.clone())),
            Err(e) => {
                self.scope_active.store(false, Ordering::Release);
                Err(Error::execution(e))
            }
        }
    }

    /// 실행 없이 컴파일만
    pub fn compile(
        &self,
        table: &str,
        operation: &str,
        source: ValueSource<'_>,
    ) -> Result<CompiledStatement> {
        self.compiler.compile(table, operation, source)
    }

    /// 컴파일 후 실행
    ///
    /// `scope`가 주어지면 그 스코프의 트랜잭션에서, 아니면 엔진에서 바로 실행합니다.
    pub fn call(
        &self,
        table: &str,
        operation: &str,
        source: ValueSource<'_>,
        scope: Option<&mut TransactionScope>,
    ) -> Result<CallResult> {
        let statement = self.compile(table, operation, source)?;

        let outcome = match scope {
            Some(scope) => scope.submit(&statement)?,
            None => self.engine.execute(&statement).map_err(Error::execution)?,
        };

        Ok(shape(&statement, outcome))
    }
}

fn shape(statement: &CompiledStatement, outcome: Outcome) -> CallResult {
    if !statement.returns_rows() {
        return CallResult::Affected(outcome.affected());
    }

    let rows = outcome.rows();
    if statement.kind.returns_single() {
        CallResult::Record(rows.into_iter().next())
    } else {
        CallResult::Records(rows)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("options", self.compiler.options())
            .field("scope_active", &self.scope_active.load(Ordering::Acquire))
            .finish()
    }
}
