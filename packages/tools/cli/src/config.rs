//! CLI 설정

use std::env;

use dsq_sql::{CompilerOptions, Dialect, FinderMatch};

/// CLI 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// SQL 방언
    pub dialect: Dialect,

    /// `FindBy` 문자열 비교 정책
    pub finder_match: FinderMatch,

    /// tracing 필터
    pub log_filter: String,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let dialect_name = lookup("DSQ_DIALECT").unwrap_or_else(|| "sqlserver".to_string());
        let dialect = Dialect::from_name(&dialect_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown DSQ_DIALECT: {}", dialect_name))?;

        let finder_name = lookup("DSQ_FINDER_MATCH").unwrap_or_else(|| "like".to_string());
        let finder_match = FinderMatch::from_name(&finder_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown DSQ_FINDER_MATCH: {}", finder_name))?;

        Ok(Self {
            dialect,
            finder_match,
            log_filter: lookup("DSQ_LOG").unwrap_or_else(|| "dsq=info".to_string()),
        })
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            dialect: self.dialect.clone(),
            finder_match: self.finder_match,
        }
    }
}
