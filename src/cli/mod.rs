pub mod commands;
pub mod config;
pub mod error;
pub mod ux;

pub use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dbmate",
    version,
    about = "A lightweight, framework-independent database migration tool."
)]
pub struct Cli {
    #[arg(
        short,
        long,
        default_value = "DATABASE_URL",
        help = "specify an environment variable containing the database URL"
    )]
    pub env: String,

    #[arg(
        short = 'd',
        long,
        default_value = "./db/migrations",
        help = "specify the directory containing migration files"
    )]
    pub migrations_dir: String,

    #[arg(
        short = 's',
        long,
        default_value = "./db/schema.sql",
        help = "specify the schema file location"
    )]
    pub schema_file: String,

    #[arg(
        long,
        default_value = "SLACK_WEBHOOK_URL",
        help = "specify an environment variable containing the webhook URL notified when migrations fail"
    )]
    pub slack_webhook_var: String,

    #[arg(
        long,
        default_value = "",
        help = "environment variable names to attach to failure notifications (comma delimited)"
    )]
    pub env_vars: String,

    #[arg(
        long,
        action = clap::ArgAction::SetTrue,
        help = "don't update the schema file on migrate/rollback"
    )]
    pub no_dump_schema: bool,

    #[arg(
        long,
        action = clap::ArgAction::SetTrue,
        help = "wait for the db to become available before executing the subsequent command"
    )]
    pub wait: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Generate a new migration file", alias = "n")]
    New {
        #[arg(help = "name for the migration, e.g. create_users")]
        name: String,
    },

    #[command(about = "Create database (if necessary) and migrate to the latest version")]
    Up {},

    #[command(about = "Create database")]
    Create {},

    #[command(about = "Drop database (if it exists)")]
    Drop {},

    #[command(about = "Migrate to the latest version")]
    Migrate {},

    #[command(about = "Rollback the most recent migration", alias = "down")]
    Rollback {},

    #[command(about = "List applied and pending migrations")]
    Status {
        #[arg(long, help = "return 1 if there are pending migrations")]
        exit_code: bool,

        #[arg(long, help = "don't output any text (implies --exit-code)")]
        quiet: bool,
    },

    #[command(about = "Write the database schema to disk")]
    Dump {},

    #[command(about = "Wait for the database to become available")]
    Wait {},
}

impl std::fmt::Display for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Commands::New { .. } => "new",
            Commands::Up { .. } => "up",
            Commands::Create { .. } => "create",
            Commands::Drop { .. } => "drop",
            Commands::Migrate { .. } => "migrate",
            Commands::Rollback { .. } => "rollback",
            Commands::Status { .. } => "status",
            Commands::Dump { .. } => "dump",
            Commands::Wait { .. } => "wait",
        };
        write!(f, "{name}")
    }
}
