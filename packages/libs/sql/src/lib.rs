//! dsq-sql: 동적 호출 SQL 컴파일러
//!
//! `FindByName("Foo")`, `Insert(record)` 같은 동적 호출을
//! Schema Model 기준으로 해석해 파라미터화된 SQL로 변환합니다.
//! 값은 항상 placeholder로 전달되고 SQL 텍스트에 들어가지 않습니다.
//!
//! # 모듈 구조
//!
//! - `call`: 연산 이름 파싱 (동사 + `By` 컬럼)
//! - `criteria`: 조건식 빌더
//! - `params`: 호출 인자 (이름 있는 인자, 레코드, 위치 인자)
//! - `binder`: 인자를 컬럼/값 쌍으로 정규화
//! - `compiler`: SQL 텍스트 생성
//! - `dialect`: 인용/placeholder 규칙
//! - `pipeline`: 위 단계를 묶은 `CallCompiler`

pub mod binder;
pub mod call;
pub mod compiler;
pub mod criteria;
pub mod dialect;
pub mod params;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use binder::{BoundCall, FinderMatch, ValueBinder};
pub use call::{OperationKind, ParsedCall};
pub use compiler::{CompiledStatement, StatementCompiler};
pub use criteria::{CriteriaExpression, Criterion, Operator};
pub use dialect::{CaseFolding, Dialect};
pub use params::{NamedArguments, Record, SerializedRecord, ValueSource};
pub use pipeline::{CallCompiler, CompilerOptions};
