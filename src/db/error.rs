use crate::migrations::MigrationError;

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
#[non_exhaustive]
pub struct EngineError {
    pub kind: EngineErrorKind,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineError: {}", self.kind)
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum EngineErrorKind {
    EmptyMigrationName,
    Io { source: std::io::Error, path: PathBuf },
    Migration(MigrationError),
    MissingDatabaseName,
    MissingMigrationFile(String),
    NoMigrationFiles(String),
    NothingToRollback,
    PgDump(String),
    Process { source: std::io::Error, cmd: String },
    Sqlx(sqlx::Error),
    Utf8(std::string::FromUtf8Error),
    WaitTimeout { attempts: u32 },
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMigrationName => write!(f, "Migration name is required"),
            Self::Io { path, .. } => write!(f, "Failed to write file: '{}'", path.display()),
            Self::Migration(error) => write!(f, "{}", error.kind),
            Self::MissingDatabaseName => write!(f, "No database name in connection URL"),
            Self::MissingMigrationFile(version) => {
                write!(f, "Can't find migration file for version {version}")
            }
            Self::NoMigrationFiles(dir) => write!(f, "No migration files found in '{dir}'"),
            Self::NothingToRollback => {
                write!(f, "Can't rollback: no migrations have been applied")
            }
            Self::PgDump(stderr) => write!(f, "pg_dump failed: '{stderr}'"),
            Self::Process { cmd, .. } => write!(f, "Failed to run a command: '{cmd}'"),
            Self::Sqlx(e) => write!(f, "{e}"),
            Self::Utf8(e) => write!(f, "UTF-8 conversion error: {e}"),
            Self::WaitTimeout { attempts } => {
                write!(f, "Database is still unavailable after {attempts} attempts")
            }
        }
    }
}

impl Error for EngineErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Migration(source) => Some(source),
            Self::Process { source, .. } => Some(source),
            Self::Sqlx(source) => Some(source),
            Self::Utf8(source) => Some(source),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(error: sqlx::Error) -> Self {
        EngineError {
            kind: EngineErrorKind::Sqlx(error),
        }
    }
}

impl From<MigrationError> for EngineError {
    fn from(error: MigrationError) -> Self {
        EngineError {
            kind: EngineErrorKind::Migration(error),
        }
    }
}
