//! dsq CLI (`dsq`)
//!
//! 스키마 파일을 기준으로 동적 호출을 SQL로 컴파일하고,
//! 기록용 엔진에서 트랜잭션 스코프와 함께 실행해 봅니다.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::input::CallArgs;
use config::Config;
use dsq_sql::{Dialect, FinderMatch};

#[derive(Parser)]
#[command(name = "dsq")]
#[command(author, version, about = "dsq - compile dynamic calls to parameterized SQL", long_about = None)]
struct Cli {
    /// SQL dialect (overrides DSQ_DIALECT)
    #[arg(long, global = true)]
    dialect: Option<DialectName>,

    /// FindBy string comparison (overrides DSQ_FINDER_MATCH)
    #[arg(long, global = true)]
    finder_match: Option<FinderMatchName>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DialectName {
    Sqlserver,
    Postgres,
    Sqlite,
}

impl DialectName {
    fn dialect(self) -> Dialect {
        match self {
            DialectName::Sqlserver => Dialect::sql_server(),
            DialectName::Postgres => Dialect::postgres(),
            DialectName::Sqlite => Dialect::sqlite(),
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FinderMatchName {
    Like,
    Equals,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables, columns and primary keys of a schema file
    Tables {
        /// Schema YAML file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Compile a call and print SQL with parameters
    Compile {
        #[command(flatten)]
        call: CallArgs,
    },

    /// Execute a call against the recording engine inside a transaction scope
    Run {
        #[command(flatten)]
        call: CallArgs,

        /// Commit the scope (rolled back otherwise)
        #[arg(long)]
        commit: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 설정 로드 (CLI 옵션 > 환경변수)
    let mut config = Config::from_env()?;
    if let Some(name) = cli.dialect {
        config.dialect = name.dialect();
    }
    if let Some(name) = cli.finder_match {
        config.finder_match = match name {
            FinderMatchName::Like => FinderMatch::LikeForStrings,
            FinderMatchName::Equals => FinderMatch::Equality,
        };
    }

    // 로그는 stderr (stdout은 결과 출력용)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "dsq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting dsq with config: {:?}", config);

    match cli.command {
        Commands::Tables { schema } => commands::tables::list(&schema, cli.format),
        Commands::Compile { call } => {
            commands::compile::compile(&call, config.compiler_options(), cli.format)
        }
        Commands::Run { call, commit } => {
            commands::run::run(&call, config.compiler_options(), commit, cli.format)
        }
    }
}
