use clap::Parser;

use bookmaker::cli::{check, run, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => run::execute(&cli, args).await,
        Commands::Check(CheckCommand::Config) => check::config(&cli),
        Commands::Check(CheckCommand::Connection) => check::connection(&cli).await,
    };

    if let Err(e) = result {
        eprintln!("bookmaker: {e}");
        std::process::exit(1);
    }
}
