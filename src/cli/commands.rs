use crate::cli::config::{Config, Environment};
use crate::cli::error::{CliError, CliErrorKind};
use crate::cli::{Cli, Commands};
use crate::db::{Db, Engine};
use crate::notify;

/// Resolve configuration, build the engine handle, and run the requested
/// subcommand.
pub async fn run(cli: Cli, env: &Environment) -> Result<(), CliError> {
    let config = Config::resolve(&cli, env)?;

    let mut db = Db::new(config.database_url.clone());
    db.auto_dump_schema = config.auto_dump_schema;
    db.migrations_dir = config.migrations_dir.clone();
    db.schema_file = config.schema_file.clone();
    db.wait_before = config.wait_before;

    execute(cli.command, &db, &config, env).await
}

/// Dispatch a single subcommand against the engine.
///
/// `migrate` is the one operation with a post-call hook: on failure the
/// notification pipeline runs, and the engine's original error is returned
/// regardless of the notification outcome.
pub async fn execute<E: Engine>(
    command: Commands,
    db: &E,
    config: &Config,
    env: &Environment,
) -> Result<(), CliError> {
    match command {
        Commands::New { name } => db.new_migration(&name).await?,
        Commands::Up {} => db.create_and_migrate().await?,
        Commands::Create {} => db.create().await?,
        Commands::Drop {} => db.drop_database().await?,
        Commands::Migrate {} => {
            let result = db.migrate().await;

            if let Err(err) = &result {
                notify::migration_failure(config, env, &err.kind.to_string()).await;
            }

            result?
        }
        Commands::Rollback {} => db.rollback().await?,
        Commands::Status { exit_code, quiet } => {
            // --quiet implies --exit-code
            let exit_code = exit_code || quiet;

            let pending = db.status(quiet).await?;

            if pending > 0 && exit_code {
                return Err(CliError {
                    kind: CliErrorKind::PendingMigrations(pending),
                });
            }
        }
        Commands::Dump {} => db.dump_schema().await?,
        Commands::Wait {} => db.wait().await?,
    }

    Ok(())
}
