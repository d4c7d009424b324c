//! Schema Model
//!
//! # 개요
//!
//! 스키마 제공자가 넘겨준 테이블/컬럼/기본키 행을 대소문자 무시 카탈로그로 조립합니다.
//! 데이터 소스당 한 번 만들어지고, 이후에는 변경 API 없이 읽기 전용으로 재사용됩니다.
//!
//! # 모듈 구조
//!
//! - `types`: 컬럼 타입 태그 (바인딩 검증용)
//! - `column`: 컬럼 정의
//! - `table`: 테이블 정의
//! - `model`: Schema Model (조회 진입점)
//! - `provider`: 스키마 제공자 행과 메모리 제공자
//! - `parser`: YAML 스키마 문서 제공자

mod column;
mod model;
mod parser;
mod provider;
mod table;
mod types;

pub use column::Column;
pub use model::SchemaModel;
pub use parser::YamlSchemaProvider;
pub use provider::{ColumnRow, PrimaryKeyRow, SchemaProvider, StaticSchemaProvider, TableRow};
pub use table::{Table, TableKind};
pub use types::ColumnType;
