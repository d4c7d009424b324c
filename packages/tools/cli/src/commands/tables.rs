//! 테이블 목록 명령어

use std::path::Path;

use dsq_core::schema::YamlSchemaProvider;

use crate::OutputFormat;

pub fn list(schema: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let model = YamlSchemaProvider::load_file(schema)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    if model.is_empty() {
        println!("No tables in {}", schema.display());
        return Ok(());
    }

    for table in model.tables() {
        println!("{} ({:?})", table, table.kind);
        for column in &table.columns {
            let key = if column.is_primary_key { " [pk]" } else { "" };
            println!("  - {}: {}{}", column.name, column.column_type, key);
        }
    }

    Ok(())
}
