//! 호출 입력 (`compile`, `run` 공용)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use serde_json::{Map, Value};

use dsq_core::schema::YamlSchemaProvider;
use dsq_core::SchemaModel;
use dsq_sql::criteria::{equals, CriteriaExpression};
use dsq_sql::{NamedArguments, ValueSource};

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
    /// Schema YAML file
    #[arg(long)]
    pub schema: PathBuf,

    /// Table name (case-insensitive, `schema.table` allowed)
    #[arg(long)]
    pub table: String,

    /// Operation name (`FindByName`, `Insert`, `UpdateById`, ...)
    #[arg(long)]
    pub call: String,

    /// Positional argument (repeatable)
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Named argument `Column=Value` (repeatable)
    #[arg(long = "named")]
    pub named: Vec<String>,

    /// Equality criterion `Column=Value` (repeatable, AND-joined)
    #[arg(long = "where")]
    pub criteria: Vec<String>,

    /// Record as a JSON object
    #[arg(long)]
    pub record: Option<String>,
}

/// 파싱된 호출 입력 (레코드를 빌려줄 수 있도록 소유)
#[derive(Debug)]
pub enum CallInput {
    None,
    Positional(Vec<Value>),
    Named(NamedArguments),
    Criteria(CriteriaExpression),
    Record(Map<String, Value>),
}

impl CallInput {
    pub fn source(&self) -> ValueSource<'_> {
        match self {
            CallInput::None => ValueSource::None,
            CallInput::Positional(values) => ValueSource::Positional(values.clone()),
            CallInput::Named(args) => ValueSource::Named(args.clone()),
            CallInput::Criteria(expr) => ValueSource::Criteria(expr.clone()),
            CallInput::Record(map) => ValueSource::Record(map),
        }
    }
}

impl CallArgs {
    pub fn load_schema(&self) -> anyhow::Result<Arc<SchemaModel>> {
        let model = YamlSchemaProvider::load_file(&self.schema)
            .with_context(|| format!("failed to load schema {}", self.schema.display()))?;
        Ok(Arc::new(model))
    }

    /// 입력 종류는 하나만 허용
    pub fn input(&self) -> anyhow::Result<CallInput> {
        let given = [
            !self.args.is_empty(),
            !self.named.is_empty(),
            !self.criteria.is_empty(),
            self.record.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if given > 1 {
            anyhow::bail!("use only one of --arg, --named, --where, --record");
        }

        if !self.args.is_empty() {
            return Ok(CallInput::Positional(
                self.args.iter().map(|s| parse_value(s)).collect(),
            ));
        }

        if !self.named.is_empty() {
            let args = self
                .named
                .iter()
                .map(|pair| split_pair(pair))
                .collect::<anyhow::Result<NamedArguments>>()?;
            return Ok(CallInput::Named(args));
        }

        if !self.criteria.is_empty() {
            let mut expr: Option<CriteriaExpression> = None;
            for pair in &self.criteria {
                let (column, value) = split_pair(pair)?;
                let criterion = equals(column, value);
                expr = Some(match expr {
                    Some(expr) => expr.and(criterion),
                    None => criterion.into(),
                });
            }
            return Ok(expr.map(CallInput::Criteria).unwrap_or(CallInput::None));
        }

        if let Some(record) = &self.record {
            let value: Value = serde_json::from_str(record).context("--record must be JSON")?;
            return match value {
                Value::Object(map) => Ok(CallInput::Record(map)),
                _ => anyhow::bail!("--record must be a JSON object"),
            };
        }

        Ok(CallInput::None)
    }
}

/// JSON으로 해석, 실패하면 문자열
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn split_pair(pair: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected Column=Value, got '{}'", pair))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("empty column name in '{}'", pair);
    }
    Ok((key.to_string(), parse_value(value)))
}
