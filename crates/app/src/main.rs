mod args;
mod db;
mod error;
mod pomodoro;
mod serve;
mod stats;

use tracing_subscriber::EnvFilter;

use crate::args::{Command, print_usage};
use crate::error::AppError;

async fn run() -> Result<(), AppError> {
    let command = Command::parse(std::env::args().skip(1)).inspect_err(|_| print_usage())?;
    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Serve(args) => serve::run(args).await,
        Command::Pomodoro(args) => pomodoro::run(args).await,
        Command::Stats(args) => stats::run(args).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
