//! 호출 인자
//!
//! 동적 호출에 넘길 수 있는 값의 형태를 정의합니다.
//!
//! - 이름 있는 인자 (`Insert(Name: "Steve", Age: 50)`)
//! - 임의의 레코드 (이름/값 쌍을 노출하는 어떤 타입이든)
//! - 조건식 (`Find(Users.Id == 1)`)
//! - 위치 인자 (`FindByName("Foo")`, `DeleteById(1)`)

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use dsq_core::{Error, Result};

use crate::criteria::CriteriaExpression;

/// 이름 있는 인자 (입력 순서 유지)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedArguments(pub Vec<(String, Value)>);

impl NamedArguments {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 인자 추가
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NamedArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// 이름/값 쌍을 순서대로 노출하는 레코드
///
/// 구체 타입을 요구하지 않습니다. 맵, 쌍 목록, 직렬화 가능한 구조체 모두 레코드가 될 수 있습니다.
pub trait Record {
    fn fields(&self) -> Vec<(String, Value)>;
}

impl Record for Map<String, Value> {
    fn fields(&self) -> Vec<(String, Value)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Record for HashMap<String, Value> {
    fn fields(&self) -> Vec<(String, Value)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Record for BTreeMap<String, Value> {
    fn fields(&self) -> Vec<(String, Value)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Record for Vec<(String, Value)> {
    fn fields(&self) -> Vec<(String, Value)> {
        self.clone()
    }
}

impl Record for NamedArguments {
    fn fields(&self) -> Vec<(String, Value)> {
        self.0.clone()
    }
}

/// `Serialize` 구현 타입을 레코드로 감싼 것
///
/// ```
/// use dsq_sql::params::{Record, SerializedRecord};
///
/// #[derive(serde::Serialize)]
/// struct User { id: i64, name: String }
///
/// let record = SerializedRecord::from_serialize(&User { id: 1, name: "Steve".into() }).unwrap();
/// assert_eq!(record.fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedRecord(Map<String, Value>);

impl SerializedRecord {
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidArguments {
                operation: "record".to_string(),
                message: format!("expected an object, got {}", json_kind(&other)),
            }),
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Record for SerializedRecord {
    fn fields(&self) -> Vec<(String, Value)> {
        self.0.fields()
    }
}

/// 바인딩할 값의 출처
pub enum ValueSource<'a> {
    /// 인자 없음 (`All`)
    None,
    /// `By` 컬럼과 짝지어지는 위치 인자
    Positional(Vec<Value>),
    /// 이름 있는 인자 - 모르는 컬럼은 에러
    Named(NamedArguments),
    /// 임의의 레코드 - 모르는 멤버는 무시
    Record(&'a dyn Record),
    /// 조건식
    Criteria(CriteriaExpression),
}

impl<'a> ValueSource<'a> {
    /// 에러 메시지용 이름
    pub fn describe(&self) -> &'static str {
        match self {
            ValueSource::None => "no arguments",
            ValueSource::Positional(_) => "positional arguments",
            ValueSource::Named(_) => "named arguments",
            ValueSource::Record(_) => "a record",
            ValueSource::Criteria(_) => "a criteria expression",
        }
    }
}

impl std::fmt::Debug for ValueSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::None => f.write_str("None"),
            ValueSource::Positional(values) => f.debug_tuple("Positional").field(values).finish(),
            ValueSource::Named(args) => f.debug_tuple("Named").field(args).finish(),
            ValueSource::Record(record) => f.debug_tuple("Record").field(&record.fields()).finish(),
            ValueSource::Criteria(expr) => f.debug_tuple("Criteria").field(expr).finish(),
        }
    }
}

impl From<NamedArguments> for ValueSource<'_> {
    fn from(args: NamedArguments) -> Self {
        ValueSource::Named(args)
    }
}

impl From<CriteriaExpression> for ValueSource<'_> {
    fn from(expr: CriteriaExpression) -> Self {
        ValueSource::Criteria(expr)
    }
}

impl From<crate::criteria::Criterion> for ValueSource<'_> {
    fn from(criterion: crate::criteria::Criterion) -> Self {
        ValueSource::Criteria(criterion.into())
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_arguments_keep_order() {
        let args = NamedArguments::new().arg("Name", "Steve").arg("Age", 50);
        let names: Vec<_> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Name", "Age"]);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_named_arguments_deserialization() {
        let args: NamedArguments = serde_json::from_str(r#"[["Name", "Steve"], ["Age", 50]]"#).unwrap();
        assert_eq!(args, NamedArguments::new().arg("Name", "Steve").arg("Age", 50));
    }

    #[test]
    fn test_serialized_record() {
        #[derive(Serialize)]
        struct User {
            #[serde(rename = "Id")]
            id: i64,
            #[serde(rename = "Name")]
            name: String,
        }

        let record = SerializedRecord::from_serialize(&User {
            id: 1,
            name: "Steve".to_string(),
        })
        .unwrap();
        assert_eq!(
            record.fields(),
            vec![
                ("Id".to_string(), json!(1)),
                ("Name".to_string(), json!("Steve")),
            ]
        );
    }

    #[test]
    fn test_serialized_record_rejects_scalars() {
        let err = SerializedRecord::from_serialize(&42).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENTS");
    }

    #[test]
    fn test_map_record() {
        let map = json!({ "Name": "Phil", "Age": 42 });
        let record = map.as_object().unwrap();
        assert_eq!(record.fields().len(), 2);
    }
}
