//! 컴파일 명령어 (실행 없음)

use dsq_sql::{CallCompiler, CompiledStatement, CompilerOptions};

use crate::commands::input::CallArgs;
use crate::OutputFormat;

pub fn compile(args: &CallArgs, options: CompilerOptions, format: OutputFormat) -> anyhow::Result<()> {
    let schema = args.load_schema()?;
    let input = args.input()?;

    let compiler = CallCompiler::new(schema, options);
    let statement = compiler.compile(&args.table, &args.call, input.source())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statement)?),
        OutputFormat::Text => print_statement(&statement),
    }
    Ok(())
}

pub fn print_statement(statement: &CompiledStatement) {
    println!("{}", statement.sql);
    for (i, value) in statement.parameters.iter().enumerate() {
        println!("  [{}] {}", i, value);
    }
}
