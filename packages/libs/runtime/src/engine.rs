//! 실행 엔진 경계
//!
//! 컴파일된 문장을 실제로 실행하는 쪽(드라이버)과의 경계입니다.
//! 엔진 에러는 `BoxError`로 돌려주고, 호출 측에서 `Error::ExecutionFailed`로 감쌉니다.

use serde::Serialize;
use serde_json::{Map, Value};

use dsq_core::BoxError;
use dsq_sql::CompiledStatement;

/// 결과 행 (컬럼 이름 → 값, 컬럼 순서 유지)
pub type Row = Map<String, Value>;

/// 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// SELECT 결과
    Rows(Vec<Row>),
    /// 영향받은 행 수
    Affected(u64),
}

impl Outcome {
    pub fn rows(self) -> Vec<Row> {
        match self {
            Outcome::Rows(rows) => rows,
            Outcome::Affected(_) => Vec::new(),
        }
    }

    pub fn affected(&self) -> u64 {
        match self {
            Outcome::Rows(rows) => rows.len() as u64,
            Outcome::Affected(n) => *n,
        }
    }
}

/// 실행 엔진
///
/// 타임아웃, 재시도, 취소는 엔진 구현의 책임입니다.
pub trait ExecutionEngine: Send + Sync {
    /// 트랜잭션 없이 실행 (문장마다 독립된 작업 단위)
    fn execute(&self, statement: &CompiledStatement) -> Result<Outcome, BoxError>;

    /// 트랜잭션 시작
    fn begin(&self) -> Result<Box<dyn TransactionHandle>, BoxError>;
}

/// 열린 트랜잭션 하나
pub trait TransactionHandle: Send {
    fn execute(&mut self, statement: &CompiledStatement) -> Result<Outcome, BoxError>;

    fn commit(self: Box<Self>) -> Result<(), BoxError>;

    fn rollback(self: Box<Self>) -> Result<(), BoxError>;
}
