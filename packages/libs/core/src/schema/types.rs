//! 컬럼 타입 태그
//!
//! 스키마 제공자가 넘겨주는 DB 타입 문자열을 논리적 타입 태그로 분류합니다.
//! 타입 태그는 바인딩 시 값 검증(sanity check)에만 사용되며, 전체 타입 추론은 하지 않습니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 논리적 컬럼 타입
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// 문자열 (CHAR/VARCHAR/NVARCHAR/TEXT)
    String,

    /// 32비트 이하 정수
    Int,

    /// 64비트 정수
    Bigint,

    /// 부동소수점
    Float,

    /// 고정 소수점 (JSON: number 또는 string)
    Decimal,

    /// 불리언 (BIT/BOOLEAN)
    Boolean,

    /// 날짜 (JSON: ISO 8601 string)
    Date,

    /// 타임스탬프 (JSON: ISO 8601 string)
    Timestamp,

    /// 바이트 배열 (JSON: base64 string 또는 number 배열)
    Bytes,

    /// JSON/JSONB
    Json,

    /// 분류되지 않은 타입 - 검증하지 않음
    #[default]
    Other,
}

impl ColumnType {
    /// 간단한 타입 문자열에서 파싱
    pub fn from_simple_str(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ColumnType::String),
            "int" => Some(ColumnType::Int),
            "bigint" => Some(ColumnType::Bigint),
            "float" => Some(ColumnType::Float),
            "decimal" => Some(ColumnType::Decimal),
            "boolean" | "bool" => Some(ColumnType::Boolean),
            "date" => Some(ColumnType::Date),
            "timestamp" => Some(ColumnType::Timestamp),
            "bytes" => Some(ColumnType::Bytes),
            "json" => Some(ColumnType::Json),
            "other" => Some(ColumnType::Other),
            _ => None,
        }
    }

    /// DB 타입 이름(`nvarchar(50)`, `INT4`, `datetime2` 등)에서 분류
    ///
    /// 알 수 없는 타입은 `Other`로 분류됩니다.
    pub fn from_data_type(data_type: &str) -> Self {
        let lower = data_type.trim().to_ascii_lowercase();
        let base = lower
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        if let Some(simple) = Self::from_simple_str(base) {
            return simple;
        }

        match base {
            "char" | "nchar" | "varchar" | "nvarchar" | "text" | "ntext" | "character"
            | "uniqueidentifier" | "uuid" | "citext" | "clob" => ColumnType::String,
            "tinyint" | "smallint" | "integer" | "int2" | "int4" | "mediumint" | "serial" => {
                ColumnType::Int
            }
            "int8" | "bigserial" => ColumnType::Bigint,
            "real" | "double" | "float4" | "float8" => ColumnType::Float,
            "numeric" | "money" | "smallmoney" | "number" => ColumnType::Decimal,
            "bit" => ColumnType::Boolean,
            "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" | "timestamptz" => {
                ColumnType::Timestamp
            }
            "binary" | "varbinary" | "image" | "bytea" | "blob" => ColumnType::Bytes,
            "jsonb" => ColumnType::Json,
            _ => ColumnType::Other,
        }
    }

    /// 값이 이 타입 컬럼에 바인딩될 수 있는지
    ///
    /// `null`은 모든 타입에 허용됩니다.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Other | ColumnType::Json, _) => true,
            (ColumnType::String, Value::String(_)) => true,
            (ColumnType::Int | ColumnType::Bigint, Value::Number(n)) => n.is_i64() || n.is_u64(),
            // 정밀도 보존을 위해 문자열로 전달되는 경우
            (ColumnType::Bigint | ColumnType::Decimal, Value::String(_)) => true,
            (ColumnType::Float | ColumnType::Decimal, Value::Number(_)) => true,
            (ColumnType::Boolean, Value::Bool(_)) => true,
            (ColumnType::Boolean, Value::Number(n)) => matches!(n.as_u64(), Some(0 | 1)),
            (ColumnType::Date | ColumnType::Timestamp, Value::String(_)) => true,
            (ColumnType::Bytes, Value::String(_) | Value::Array(_)) => true,
            _ => false,
        }
    }

    /// 값 검증 에러 메시지에 쓰이는 예상 타입
    pub fn expected_json_type(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "integer",
            ColumnType::Bigint => "integer or string (serialized)",
            ColumnType::Float => "number",
            ColumnType::Decimal => "number or string (serialized)",
            ColumnType::Boolean => "boolean",
            ColumnType::Date | ColumnType::Timestamp => "string (ISO 8601)",
            ColumnType::Bytes => "string (base64) or byte array",
            ColumnType::Json | ColumnType::Other => "any",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Bigint => "bigint",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Bytes => "bytes",
            ColumnType::Json => "json",
            ColumnType::Other => "other",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_type_parsing() {
        assert_eq!(ColumnType::from_simple_str("string"), Some(ColumnType::String));
        assert_eq!(ColumnType::from_simple_str("int"), Some(ColumnType::Int));
        assert_eq!(ColumnType::from_simple_str("bool"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_simple_str("unknown"), None);
        assert_eq!(ColumnType::Timestamp.to_string(), "timestamp");
        assert_eq!(ColumnType::from_simple_str(ColumnType::Bigint.as_str()), Some(ColumnType::Bigint));
    }

    #[test]
    fn test_data_type_classification() {
        assert_eq!(ColumnType::from_data_type("nvarchar(50)"), ColumnType::String);
        assert_eq!(ColumnType::from_data_type("INT4"), ColumnType::Int);
        assert_eq!(ColumnType::from_data_type("datetime2"), ColumnType::Timestamp);
        assert_eq!(ColumnType::from_data_type("numeric(18, 2)"), ColumnType::Decimal);
        assert_eq!(ColumnType::from_data_type("double precision"), ColumnType::Float);
        assert_eq!(ColumnType::from_data_type("geography"), ColumnType::Other);
    }

    #[test]
    fn test_value_acceptance() {
        assert!(ColumnType::String.accepts(&json!("Steve")));
        assert!(!ColumnType::String.accepts(&json!(50)));
        assert!(ColumnType::Int.accepts(&json!(50)));
        assert!(!ColumnType::Int.accepts(&json!(1.5)));
        assert!(!ColumnType::Int.accepts(&json!("50")));
        assert!(ColumnType::Bigint.accepts(&json!("9007199254740993")));
        assert!(ColumnType::Boolean.accepts(&json!(1)));
        assert!(ColumnType::Date.accepts(&json!("2024-01-01")));
        assert!(ColumnType::Other.accepts(&json!({"any": "thing"})));
        assert!(ColumnType::Int.accepts(&Value::Null));
    }
}
