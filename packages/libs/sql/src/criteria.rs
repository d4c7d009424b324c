//! 조건식 빌더
//!
//! `Users.Id == 1` 같은 연산자 오버로딩 대신 명시적인 생성자를 씁니다.
//!
//! ```
//! use dsq_sql::criteria::{equals, like};
//! use serde_json::json;
//!
//! let expr = equals("Name", json!("Steve")).and(like("Password", json!("%secret%")));
//! assert_eq!(expr.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `=`
    Equal,
    /// `like` (부분 문자열 매칭)
    Like,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::Like => "like",
        }
    }
}

/// 단일 조건 (컬럼, 연산자, 값)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// 컬럼 참조 (`Name`, `Users.Name`, `dbo.Users.Name`)
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Criterion {
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::Equal,
            value: value.into(),
        }
    }

    pub fn like(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::Like,
            value: value.into(),
        }
    }

    /// AND 결합
    pub fn and(self, other: impl Into<CriteriaExpression>) -> CriteriaExpression {
        CriteriaExpression::from(self).and(other)
    }
}

/// `Criterion::equals`의 짧은 형태
pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Criterion {
    Criterion::equals(column, value)
}

/// `Criterion::like`의 짧은 형태
pub fn like(column: impl Into<String>, value: impl Into<Value>) -> Criterion {
    Criterion::like(column, value)
}

/// 조건식 트리 (암묵적 AND)
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaExpression {
    Criterion(Criterion),
    And(Box<CriteriaExpression>, Box<CriteriaExpression>),
}

impl CriteriaExpression {
    pub fn and(self, other: impl Into<CriteriaExpression>) -> Self {
        CriteriaExpression::And(Box::new(self), Box::new(other.into()))
    }

    /// 왼쪽에서 오른쪽 순서로 펼친 조건들
    pub fn criteria(&self) -> Vec<&Criterion> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Criterion>) {
        match self {
            CriteriaExpression::Criterion(c) => out.push(c),
            CriteriaExpression::And(left, right) => {
                left.collect_into(out);
                right.collect_into(out);
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CriteriaExpression::Criterion(_) => 1,
            CriteriaExpression::And(left, right) => left.len() + right.len(),
        }
    }

    /// 트리는 항상 조건을 하나 이상 가짐
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Criterion> for CriteriaExpression {
    fn from(criterion: Criterion) -> Self {
        CriteriaExpression::Criterion(criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_order() {
        let expr = equals("A", json!(1))
            .and(equals("B", json!(2)).and(like("C", json!("%x%"))))
            .and(equals("D", json!(4)));

        let columns: Vec<_> = expr.criteria().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["A", "B", "C", "D"]);
        assert_eq!(expr.len(), 4);
        assert_eq!(expr.criteria()[2].operator, Operator::Like);
    }

    #[test]
    fn test_operator_sql() {
        assert_eq!(Operator::Equal.as_sql(), "=");
        assert_eq!(Operator::Like.as_sql(), "like");
    }

    #[test]
    fn test_criterion_deserialization() {
        let json = r#"{ "column": "Users.Id", "operator": "equal", "value": 1 }"#;
        let criterion: Criterion = serde_json::from_str(json).unwrap();
        assert_eq!(criterion, Criterion::equals("Users.Id", 1));
    }
}
