//! Idempotent table provisioning
//!
//! Each resource's table tree is torn down (parent first, cascading) and then
//! recreated from the compiler's statements, so a case always starts from
//! empty tables.

use crate::error::{HarnessError, HarnessResult};
use fc_core::{CompileOptions, DefinitionCompiler, Dialect, SchemaCompiler, Table};
use fc_db::Database;

/// Drops and recreates table trees on the shared connection
pub struct SchemaManager<'a> {
    db: &'a dyn Database,
    dialect: Dialect,
    compiler: &'a dyn SchemaCompiler,
    options: CompileOptions,
}

impl<'a> SchemaManager<'a> {
    /// Manager using the default [`DefinitionCompiler`]
    pub fn new(db: &'a dyn Database, dialect: Dialect) -> Self {
        Self {
            db,
            dialect,
            compiler: &DefinitionCompiler,
            options: CompileOptions::default(),
        }
    }

    pub fn with_compiler(mut self, compiler: &'a dyn SchemaCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Drop every table of the tree, visiting each table before its
    /// relations
    pub async fn drop_tables(&self, table: &Table) -> HarnessResult<()> {
        for node in table.iter() {
            log::debug!("Dropping table {}", node.name);
            self.db
                .drop_table_cascade(&node.name)
                .await
                .map_err(|source| HarnessError::Provision {
                    table: node.name.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Generate the definitions, drop the old tree, then create the new one
    pub async fn provision(&self, table: &Table) -> HarnessResult<()> {
        let statements = self
            .compiler
            .create_table_definitions(self.dialect, table, &self.options)
            .map_err(|source| HarnessError::SchemaCompile {
                table: table.name.to_string(),
                source,
            })?;

        self.drop_tables(table).await?;

        for sql in &statements {
            self.db
                .execute(sql)
                .await
                .map_err(|source| HarnessError::Provision {
                    table: table.name.to_string(),
                    source,
                })?;
        }
        log::debug!(
            "Provisioned {} table(s) for {}",
            statements.len(),
            table.name
        );
        Ok(())
    }
}
