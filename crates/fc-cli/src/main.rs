//! Fetchcheck CLI - verify that data-ingestion providers populate every column

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logger;

use cli::Cli;
use commands::common::ExitCode;
use commands::{ddl, ls, test};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Test(args) => test::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Ddl(args) => ddl::execute(args, &cli.global).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::exit(*code),
            None => Err(err),
        },
        ok => ok,
    }
}
