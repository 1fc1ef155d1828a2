mod cli;
mod db;
mod migrations;
mod notify;

use clap::Parser;
use cli::config::Environment;
use cli::error::CliErrorKind;
use cli::{commands, ux};

/// Entry point for the dbmate CLI tool.
///
/// This program manages database migrations by delegating to subcommands:
/// - `new`: Generate a new migration file.
/// - `up`: Create the database (if necessary) and migrate to the latest version.
/// - `create` / `drop`: Create or drop the database itself.
/// - `migrate` / `rollback`: Apply pending migrations or revert the most recent one.
/// - `status`: List applied and pending migrations.
/// - `dump`: Write the database schema to disk.
/// - `wait`: Block until the database becomes available.
///
/// Exit codes: 0 on success, 1 when `status` runs with exit-code behavior and
/// pending migrations exist, 2 for any other error (reported on stderr).
#[tokio::main]
async fn main() {
    load_dotenv();

    let args = cli::Cli::parse();

    ux::setup_logging();

    let env = Environment::from_process();

    if let Err(e) = commands::run(args, &env).await {
        if let CliErrorKind::PendingMigrations(_) = e.kind {
            // status --exit-code: signal pending migrations without a message
            std::process::exit(1);
        }

        eprintln!("Error: {e}");
        std::process::exit(2);
    }
}

/// Load environment variables from a .env file in the working directory, if present.
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => {
            eprintln!("Error: failed to load .env file: {e}");
            std::process::exit(2);
        }
    }
}
