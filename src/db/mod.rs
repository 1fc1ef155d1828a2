mod error;
mod postgres;

pub use error::{EngineError, EngineErrorKind};

use crate::migrations;

use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const WAIT_ATTEMPTS: u32 = 60;
const WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Abstract operation set exposed by the migration engine.
///
/// The command dispatcher is generic over this trait so it can run against
/// a recording mock under test.
#[allow(async_fn_in_trait)]
pub trait Engine {
    async fn new_migration(&self, name: &str) -> Result<(), EngineError>;
    async fn create(&self) -> Result<(), EngineError>;
    async fn create_and_migrate(&self) -> Result<(), EngineError>;
    async fn drop_database(&self) -> Result<(), EngineError>;
    async fn migrate(&self) -> Result<(), EngineError>;
    async fn rollback(&self) -> Result<(), EngineError>;
    async fn status(&self, quiet: bool) -> Result<usize, EngineError>;
    async fn dump_schema(&self) -> Result<(), EngineError>;
    async fn wait(&self) -> Result<(), EngineError>;
}

/// Handle to the PostgreSQL migration engine for a single invocation.
///
/// The public fields are knobs the dispatcher sets from configuration
/// before running any operation.
pub struct Db {
    url: Url,
    pub auto_dump_schema: bool,
    pub migrations_dir: String,
    pub schema_file: String,
    pub wait_before: bool,
}

impl Db {
    pub fn new(url: Url) -> Self {
        Db {
            url,
            auto_dump_schema: true,
            migrations_dir: "./db/migrations".to_string(),
            schema_file: "./db/schema.sql".to_string(),
            wait_before: false,
        }
    }

    async fn wait_if_requested(&self) -> Result<(), EngineError> {
        if self.wait_before {
            self.wait_for_server().await
        } else {
            Ok(())
        }
    }

    /// Poll the server (via the maintenance database, so the target
    /// database doesn't need to exist yet) until it accepts connections.
    async fn wait_for_server(&self) -> Result<(), EngineError> {
        let maintenance = postgres::maintenance_url(&self.url);

        for attempt in 1..=WAIT_ATTEMPTS {
            match postgres::connect(&maintenance).await {
                Ok(pool) => {
                    pool.close().await;
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(
                        "Database not ready (attempt {attempt}/{WAIT_ATTEMPTS}): {}",
                        e.kind
                    );
                    tokio::time::sleep(WAIT_INTERVAL).await;
                }
            }
        }

        Err(EngineError {
            kind: EngineErrorKind::WaitTimeout { attempts: WAIT_ATTEMPTS },
        })
    }

    async fn apply_pending_migrations(&self) -> Result<(), EngineError> {
        let pool = postgres::connect(&self.url).await?;
        postgres::ensure_migrations_table(&pool).await?;

        let files = migrations::collect_from_directory(&self.migrations_dir)?;
        if files.is_empty() {
            return Err(EngineError {
                kind: EngineErrorKind::NoMigrationFiles(self.migrations_dir.clone()),
            });
        }

        let applied = postgres::applied_versions(&pool).await?;

        for (version, migration) in &files {
            if applied.contains(version) {
                continue;
            }

            tracing::info!("Applying: {}", migration.file_name());
            postgres::apply(&pool, &migration.version, &migration.up).await?;
        }

        Ok(())
    }

    async fn dump_if_enabled(&self) -> Result<(), EngineError> {
        if self.auto_dump_schema {
            self.write_schema_file().await
        } else {
            Ok(())
        }
    }

    /// Dump the schema with pg_dump, append the applied-version records,
    /// and write the result to the schema file.
    async fn write_schema_file(&self) -> Result<(), EngineError> {
        let mut schema = postgres::dump(&self.url)?;

        let pool = postgres::connect(&self.url).await?;
        postgres::ensure_migrations_table(&pool).await?;
        let applied = postgres::applied_versions(&pool).await?;

        if !applied.is_empty() {
            schema.push_str(
                "\n--\n-- Dbmate schema migrations\n--\n\nINSERT INTO public.schema_migrations (version) VALUES\n",
            );
            let rows: Vec<String> = applied.iter().map(|v| format!("    ('{v}')")).collect();
            schema.push_str(&rows.join(",\n"));
            schema.push_str(";\n");
        }

        let path = Path::new(&self.schema_file);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| EngineError {
                    kind: EngineErrorKind::Io {
                        source,
                        path: parent.to_path_buf(),
                    },
                })?;
            }
        }

        tracing::info!("Writing: {}", self.schema_file);
        fs::write(path, schema).map_err(|source| EngineError {
            kind: EngineErrorKind::Io {
                source,
                path: path.to_path_buf(),
            },
        })?;

        Ok(())
    }
}

impl Engine for Db {
    async fn new_migration(&self, name: &str) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError {
                kind: EngineErrorKind::EmptyMigrationName,
            });
        }

        let version = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let path = migrations::scaffold(&self.migrations_dir, &version, name)?;

        tracing::info!("Creating migration: {}", path.display());

        Ok(())
    }

    async fn create(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        let name = postgres::database_name(&self.url)?;
        let maintenance = postgres::connect(&postgres::maintenance_url(&self.url)).await?;

        tracing::info!("Creating: {name}");
        postgres::create_database(&maintenance, &name).await
    }

    async fn create_and_migrate(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        let name = postgres::database_name(&self.url)?;
        let maintenance = postgres::connect(&postgres::maintenance_url(&self.url)).await?;

        if !postgres::database_exists(&maintenance, &name).await? {
            tracing::info!("Creating: {name}");
            postgres::create_database(&maintenance, &name).await?;
        }

        self.apply_pending_migrations().await?;
        self.dump_if_enabled().await
    }

    async fn drop_database(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        let name = postgres::database_name(&self.url)?;
        let maintenance = postgres::connect(&postgres::maintenance_url(&self.url)).await?;

        tracing::info!("Dropping: {name}");
        postgres::drop_database(&maintenance, &name).await
    }

    async fn migrate(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        self.apply_pending_migrations().await?;
        self.dump_if_enabled().await
    }

    async fn rollback(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        let pool = postgres::connect(&self.url).await?;
        postgres::ensure_migrations_table(&pool).await?;

        let version = postgres::latest_applied_version(&pool)
            .await?
            .ok_or(EngineError {
                kind: EngineErrorKind::NothingToRollback,
            })?;

        let files = migrations::collect_from_directory(&self.migrations_dir)?;
        let migration = files.get(&version).ok_or_else(|| EngineError {
            kind: EngineErrorKind::MissingMigrationFile(version.clone()),
        })?;

        let down = migration.down.as_deref().ok_or_else(|| EngineError {
            kind: EngineErrorKind::Migration(migrations::MigrationError {
                kind: migrations::MigrationErrorKind::MissingDownBlock(migration.path.clone()),
            }),
        })?;

        tracing::info!("Rolling back: {}", migration.file_name());
        postgres::revert(&pool, &migration.version, down).await?;

        self.dump_if_enabled().await
    }

    async fn status(&self, quiet: bool) -> Result<usize, EngineError> {
        self.wait_if_requested().await?;

        let pool = postgres::connect(&self.url).await?;
        postgres::ensure_migrations_table(&pool).await?;

        let files = migrations::collect_from_directory(&self.migrations_dir)?;
        let applied = postgres::applied_versions(&pool).await?;

        let mut pending = 0;
        for (version, migration) in &files {
            let marker = if applied.contains(version) {
                "X"
            } else {
                pending += 1;
                " "
            };

            if !quiet {
                println!("[{marker}] {}", migration.file_name());
            }
        }

        if !quiet {
            println!();
            println!("Applied: {}", files.len() - pending);
            println!("Pending: {pending}");
        }

        Ok(pending)
    }

    async fn dump_schema(&self) -> Result<(), EngineError> {
        self.wait_if_requested().await?;

        self.write_schema_file().await
    }

    async fn wait(&self) -> Result<(), EngineError> {
        self.wait_for_server().await
    }
}
