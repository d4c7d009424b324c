//! 공통 에러 타입
//!
//! 파싱/해석/바인딩/컴파일/실행 전 단계에서 사용되는 에러 타입을 정의합니다.
//! 실행(`ExecutionFailed`)을 제외한 모든 에러는 SQL이 실행 경계에 도달하기 전에 발생합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 실행 엔진(드라이버)이 돌려주는 에러
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 식별자가 가리켜야 하는 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Table,
    Column,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Table => f.write_str("table"),
            NameKind::Column => f.write_str("column"),
        }
    }
}

/// dsq 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("{kind} not found: {name}")]
    NameNotFound { kind: NameKind, name: String },

    #[error("ambiguous {kind} name '{name}': matches {}", .candidates.join(", "))]
    AmbiguousName {
        kind: NameKind,
        name: String,
        candidates: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Call / Binding Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unsupported operation: {name}")]
    UnsupportedOperation { name: String },

    #[error("unknown column '{column}' on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("{operation} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} requires at least one criterion")]
    MissingCriteria { operation: String },

    #[error("{operation} has no values to write")]
    MissingValues { operation: String },

    #[error("type mismatch for column {column}: expected {expected}")]
    TypeMismatch { column: String, expected: String },

    #[error("invalid arguments for {operation}: {message}")]
    InvalidArguments { operation: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Schema Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema load error: {message}")]
    SchemaLoad { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Transaction / Execution Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("transaction scope is already {state}")]
    ScopeClosed { state: &'static str },

    #[error("a transaction scope is already active for this unit of work")]
    ScopeAlreadyActive,

    #[error("execution failed: {source}")]
    ExecutionFailed {
        #[source]
        source: BoxError,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 실행 엔진 에러 래핑
    pub fn execution(source: impl Into<BoxError>) -> Self {
        Error::ExecutionFailed {
            source: source.into(),
        }
    }

    /// 실행 경계에 도달하기 전에 검출되는 에러인지
    pub fn is_compile_error(&self) -> bool {
        !matches!(
            self,
            Error::ExecutionFailed { .. } | Error::ScopeClosed { .. } | Error::ScopeAlreadyActive
        )
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::NameNotFound { .. } => "NAME_NOT_FOUND",
            Error::AmbiguousName { .. } => "AMBIGUOUS_NAME",
            Error::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Error::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            Error::ArgumentCount { .. } => "ARGUMENT_COUNT",
            Error::MissingCriteria { .. } => "MISSING_CRITERIA",
            Error::MissingValues { .. } => "MISSING_VALUES",
            Error::TypeMismatch { .. } => "TYPE_MISMATCH",
            Error::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            Error::SchemaLoad { .. } => "SCHEMA_LOAD_ERROR",
            Error::ScopeClosed { .. } => "SCOPE_CLOSED",
            Error::ScopeAlreadyActive => "SCOPE_ALREADY_ACTIVE",
            Error::ExecutionFailed { .. } => "EXECUTION_FAILED",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
