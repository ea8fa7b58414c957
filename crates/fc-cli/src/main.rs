//! framecheck CLI - static schema checking for dataframe pipelines

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::check;
use commands::common::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => *code,
            None => {
                eprintln!("Error: {:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
