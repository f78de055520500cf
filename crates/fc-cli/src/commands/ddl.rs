//! DDL command implementation

use anyhow::{Context, Result};
use fc_core::{CompileOptions, ConnectionString, DefinitionCompiler, Dialect, SchemaCompiler};

use crate::cli::{DdlArgs, GlobalArgs};
use crate::commands::common::CommandContext;

/// Execute the ddl command
pub async fn execute(args: &DdlArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global, &args.cases)?;
    let dialect = resolve_dialect(args, global, &ctx)?;
    let options = CompileOptions {
        system_columns: !args.no_system_columns,
    };

    for loaded in &ctx.cases {
        println!("-- case: {} ({})", loaded.case.name, loaded.path.display());
        for (resource, fixture) in &loaded.case.resources {
            let statements = DefinitionCompiler
                .create_table_definitions(dialect, &fixture.table, &options)
                .with_context(|| format!("Failed to generate DDL for resource {}", resource))?;
            println!("-- resource: {}", resource);
            for sql in statements {
                println!("{};", sql);
            }
            println!();
        }
    }
    Ok(())
}

/// `--dialect`, then the project's dialect, then the connection string's
fn resolve_dialect(args: &DdlArgs, global: &GlobalArgs, ctx: &CommandContext) -> Result<Dialect> {
    if let Some(dialect) = args.dialect {
        return Ok(dialect.into());
    }
    if let Some(dialect) = ctx.project.as_ref().and_then(|p| p.dialect) {
        return Ok(dialect);
    }
    let url = ctx.database_url(global);
    let conn = ConnectionString::parse(&url).context("Invalid database connection string")?;
    Ok(conn.dialect)
}
