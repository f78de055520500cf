//! fc-core - Core library for Fetchcheck
//!
//! This crate provides the shared types used across all Fetchcheck
//! components: the table tree a provider declares, provider diagnostics,
//! dialect-aware DDL generation, connection-string resolution and the case
//! file format consumed by the CLI.

pub mod case_file;
pub mod config;
pub mod ddl;
pub mod diagnostics;
pub mod error;
mod newtype_string;
pub mod resource_name;
pub mod sql_utils;
pub mod table;
pub mod table_name;

pub use case_file::{CaseFile, FixtureRow, ResourceFixture};
pub use config::{resolve_database_url, ConnectionString, Dialect, ProjectConfig};
pub use ddl::{CompileOptions, DefinitionCompiler, SchemaCompiler};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, CoreResult};
pub use resource_name::ResourceName;
pub use table::{Column, ColumnType, Table};
pub use table_name::TableName;
