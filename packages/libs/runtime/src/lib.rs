//! dsq-runtime: 실행 경계와 트랜잭션 스코프
//!
//! # 모듈 구조
//!
//! - `engine`: 실행 엔진 trait (드라이버 경계)
//! - `scope`: 트랜잭션 스코프 상태 기계
//! - `database`: 컴파일 + 실행 facade
//! - `recording`: 문장을 기록만 하는 엔진 (dry run, 테스트)

pub mod database;
pub mod engine;
pub mod recording;
pub mod scope;

pub use database::{CallResult, Database};
pub use engine::{ExecutionEngine, Outcome, Row, TransactionHandle};
pub use recording::{FailurePoint, RecordingEngine, Trace};
pub use scope::{ScopeState, TransactionScope};
