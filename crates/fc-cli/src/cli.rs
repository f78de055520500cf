//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use fc_core::Dialect;

/// Fetchcheck - verify that data-ingestion providers populate every column
#[derive(Parser, Debug)]
#[command(name = "fc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Connection string of the shared test database
    #[arg(short, long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run resource test cases
    Test(TestArgs),

    /// List the resources and table trees of case files
    Ls(LsArgs),

    /// Print the CREATE statements for case files
    Ddl(DdlArgs),
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Case files, directories or globs (default: the project's case paths)
    pub cases: Vec<String>,

    /// Evaluate tables and columns marked ignore_in_tests
    #[arg(long)]
    pub include_ignored: bool,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Case files, directories or globs (default: the project's case paths)
    pub cases: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tree")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Indented table tree
    Tree,
    /// JSON output
    Json,
}

/// Arguments for the ddl command
#[derive(Args, Debug)]
pub struct DdlArgs {
    /// Case files, directories or globs (default: the project's case paths)
    pub cases: Vec<String>,

    /// SQL dialect (default: project dialect, then the connection's)
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Omit cq_id, cq_parent_id and cq_fetch_date
    #[arg(long)]
    pub no_system_columns: bool,
}

/// Dialects accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Duckdb,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
