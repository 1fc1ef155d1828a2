use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub struct MigrationError {
    pub kind: MigrationErrorKind,
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MigrationError: {}", self.kind)
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum MigrationErrorKind {
    InvalidDirectory(PathBuf),
    Io { source: std::io::Error, path: PathBuf },
    MissingUpBlock(PathBuf),
    MissingDownBlock(PathBuf),
}

impl fmt::Display for MigrationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDirectory(path) => write!(
                f,
                "Migrations directory '{}' does not exist or is not a directory",
                path.display()
            ),
            Self::Io { path, .. } => write!(f, "Failed to read '{}'", path.display()),
            Self::MissingUpBlock(path) => write!(
                f,
                "Migration file '{}' has no '-- migrate:up' block",
                path.display()
            ),
            Self::MissingDownBlock(path) => write!(
                f,
                "Migration file '{}' has no '-- migrate:down' block",
                path.display()
            ),
        }
    }
}

impl Error for MigrationErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
