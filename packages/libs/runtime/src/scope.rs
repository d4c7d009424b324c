//! Transaction Scope
//!
//! 한 트랜잭션 핸들에 묶인 작업 단위입니다.
//!
//! ```text
//! Open ──commit()──▶ Committed
//!   │
//!   └──rollback() / drop──▶ RolledBack
//! ```
//!
//! 두 종료 상태에서는 더 이상 문장을 받지 않습니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use dsq_core::{Error, Result};
use dsq_sql::CompiledStatement;

use crate::engine::{Outcome, TransactionHandle};

/// 스코프 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeState {
    Open,
    Committed,
    RolledBack,
}

impl ScopeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeState::Open => "open",
            ScopeState::Committed => "committed",
            ScopeState::RolledBack => "rolled back",
        }
    }
}

/// 트랜잭션 스코프
///
/// `Database::begin_transaction()`으로 만듭니다. 커밋하지 않고 drop되면 롤백됩니다.
pub struct TransactionScope {
    handle: Option<Box<dyn TransactionHandle>>,
    state: ScopeState,

    /// 소유 `Database`의 활성 스코프 플래그
    active: Arc<AtomicBool>,

    submitted: usize,
}

impl TransactionScope {
    pub(crate) fn new(handle: Box<dyn TransactionHandle>, active: Arc<AtomicBool>) -> Self {
        tracing::debug!("transaction scope opened");
        Self {
            handle: Some(handle),
            state: ScopeState::Open,
            active,
            submitted: 0,
        }
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ScopeState::Open
    }

    /// 지금까지 제출된 문장 수
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// 스코프의 핸들로 문장 실행
    pub fn submit(&mut self, statement: &CompiledStatement) -> Result<Outcome> {
        let state = self.state;
        let handle = match (state, self.handle.as_mut()) {
            (ScopeState::Open, Some(handle)) => handle,
            _ => {
                return Err(Error::ScopeClosed {
                    state: state.as_str(),
                })
            }
        };

        let outcome = handle.execute(statement).map_err(Error::execution)?;
        self.submitted += 1;
        Ok(outcome)
    }

    /// 커밋
    ///
    /// 커밋이 실패해도 스코프는 닫히고 `RolledBack` 상태가 됩니다.
    pub fn commit(&mut self) -> Result<()> {
        let handle = self.take_open_handle()?;

        match handle.commit() {
            Ok(()) => {
                self.close(ScopeState::Committed);
                Ok(())
            }
            Err(e) => {
                self.close(ScopeState::RolledBack);
                Err(Error::execution(e))
            }
        }
    }

    /// 롤백
    pub fn rollback(&mut self) -> Result<()> {
        let handle = self.take_open_handle()?;
        self.close(ScopeState::RolledBack);
        handle.rollback().map_err(Error::execution)
    }

    fn take_open_handle(&mut self) -> Result<Box<dyn TransactionHandle>> {
        match (self.state, self.handle.take()) {
            (ScopeState::Open, Some(handle)) => Ok(handle),
            (state, _) => Err(Error::ScopeClosed {
                state: state.as_str(),
            }),
        }
    }

    fn close(&mut self, state: ScopeState) {
        self.state = state;
        self.active.store(false, Ordering::Release);
        tracing::debug!(state = state.as_str(), submitted = self.submitted, "transaction scope closed");
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if self.state != ScopeState::Open {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.rollback() {
                tracing::warn!(error = %e, "rollback of dropped transaction scope failed");
            }
        }
        self.close(ScopeState::RolledBack);
    }
}

impl std::fmt::Debug for TransactionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionScope")
            .field("state", &self.state)
            .field("submitted", &self.submitted)
            .finish()
    }
}
