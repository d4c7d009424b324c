//! 실행 명령어 (기록용 엔진, 트랜잭션 스코프 안에서)

use std::sync::Arc;

use serde::Serialize;

use dsq_runtime::{CallResult, Database, RecordingEngine, Trace};
use dsq_sql::CompilerOptions;

use crate::commands::input::CallArgs;
use crate::OutputFormat;

#[derive(Serialize)]
struct RunReport {
    result: CallResult,
    committed: bool,
    trace: Trace,
}

pub fn run(
    args: &CallArgs,
    options: CompilerOptions,
    commit: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let schema = args.load_schema()?;
    let input = args.input()?;

    let engine = RecordingEngine::new();
    let db = Database::new(schema, Arc::new(engine.clone()), options);

    let mut scope = db.begin_transaction()?;
    let result = db.call(&args.table, &args.call, input.source(), Some(&mut scope))?;
    if commit {
        scope.commit()?;
    } else {
        scope.rollback()?;
    }
    tracing::info!(state = scope.state().as_str(), "dry run finished");

    let report = RunReport {
        result,
        committed: commit,
        trace: engine.trace(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            for (i, statement) in report.trace.statements.iter().enumerate() {
                println!("#{} {}", i + 1, statement.sql);
                for (n, value) in statement.parameters.iter().enumerate() {
                    println!("  [{}] {}", n, value);
                }
            }
            println!(
                "connections: {}, commits: {}, rollbacks: {}",
                report.trace.connections_opened, report.trace.commits, report.trace.rollbacks
            );
            println!("result: {}", serde_json::to_string(&report.result)?);
        }
    }
    Ok(())
}
