//! dsq-core: 스키마 모델과 식별자 해석
//!
//! 동적 호출을 SQL로 컴파일하는 엔진이 공유하는 핵심 타입을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `schema`: 스키마 카탈로그(테이블/컬럼/기본키)와 스키마 제공자
//! - `resolver`: 느슨한 이름을 정확한 테이블/컬럼으로 해석
//! - `error`: 공통 에러 타입

pub mod error;
pub mod resolver;
pub mod schema;

pub use error::{BoxError, Error, NameKind, Result};
pub use resolver::{QualifiedIdentifier, ResolveContext, Resolver};
pub use schema::{Column, ColumnType, SchemaModel, Table};
