//! 기록용 실행 엔진
//!
//! 실제 DB 없이 실행된 문장, 연결 수, 커밋/롤백 호출을 기록합니다.
//! dry run과 테스트에 사용합니다.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;

use dsq_core::BoxError;
use dsq_sql::CompiledStatement;

use crate::engine::{ExecutionEngine, Outcome, TransactionHandle};

/// 주입 가능한 실패 지점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePoint {
    Execute,
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("injected failure at {0:?}")]
    Injected(FailurePoint),
}

/// 기록된 문장
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedStatement {
    pub sql: String,
    pub parameters: Vec<Value>,

    /// 트랜잭션 번호 (없으면 자동 커밋 실행)
    pub transaction: Option<usize>,
}

/// 지금까지의 실행 기록
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    pub statements: Vec<RecordedStatement>,

    /// 열린 연결 수 (트랜잭션 하나 = 연결 하나)
    pub connections_opened: usize,

    pub commits: usize,
    pub rollbacks: usize,
}

impl Trace {
    /// 마지막으로 실행된 문장
    pub fn last(&self) -> Option<&RecordedStatement> {
        self.statements.last()
    }
}

#[derive(Debug, Default)]
struct State {
    trace: Trace,
    queued: VecDeque<Outcome>,
    failures: Vec<FailurePoint>,
    next_transaction: usize,
}

impl State {
    /// 주입된 실패가 있으면 소비하고 에러 반환
    fn check(&mut self, point: FailurePoint) -> Result<(), BoxError> {
        match self.failures.iter().position(|p| *p == point) {
            Some(i) => {
                self.failures.remove(i);
                Err(Box::new(RecordingError::Injected(point)))
            }
            None => Ok(()),
        }
    }

    fn record(&mut self, statement: &CompiledStatement, transaction: Option<usize>) -> Outcome {
        self.trace.statements.push(RecordedStatement {
            sql: statement.sql.clone(),
            parameters: statement.parameters.clone(),
            transaction,
        });

        // 예약된 결과가 없으면 빈 결과
        self.queued.pop_front().unwrap_or_else(|| {
            if statement.returns_rows() {
                Outcome::Rows(Vec::new())
            } else {
                Outcome::Affected(1)
            }
        })
    }
}

/// 기록용 엔진 (clone은 같은 기록을 공유)
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    state: Arc<Mutex<State>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 실행 결과 예약 (FIFO)
    pub fn push_outcome(&self, outcome: Outcome) {
        self.lock().queued.push_back(outcome);
    }

    /// 다음 `point` 호출 한 번을 실패시킴
    pub fn fail_next(&self, point: FailurePoint) {
        self.lock().failures.push(point);
    }

    /// 기록 스냅샷
    pub fn trace(&self) -> Trace {
        self.lock().trace.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // 패닉한 테스트가 남긴 poison은 무시
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ExecutionEngine for RecordingEngine {
    fn execute(&self, statement: &CompiledStatement) -> Result<Outcome, BoxError> {
        let mut state = self.lock();
        state.check(FailurePoint::Execute)?;
        state.trace.connections_opened += 1;
        Ok(state.record(statement, None))
    }

    fn begin(&self) -> Result<Box<dyn TransactionHandle>, BoxError> {
        let mut state = self.lock();
        state.check(FailurePoint::Begin)?;
        state.trace.connections_opened += 1;
        state.next_transaction += 1;

        Ok(Box::new(RecordingTransaction {
            id: state.next_transaction,
            engine: self.clone(),
        }))
    }
}

struct RecordingTransaction {
    id: usize,
    engine: RecordingEngine,
}

impl TransactionHandle for RecordingTransaction {
    fn execute(&mut self, statement: &CompiledStatement) -> Result<Outcome, BoxError> {
        let mut state = self.engine.lock();
        state.check(FailurePoint::Execute)?;
        Ok(state.record(statement, Some(self.id)))
    }

    fn commit(self: Box<Self>) -> Result<(), BoxError> {
        let mut state = self.engine.lock();
        state.check(FailurePoint::Commit)?;
        state.trace.commits += 1;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), BoxError> {
        let mut state = self.engine.lock();
        state.check(FailurePoint::Rollback)?;
        state.trace.rollbacks += 1;
        Ok(())
    }
}
