mod error;

pub use error::{MigrationError, MigrationErrorKind};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const UP_MARKER: &str = "-- migrate:up";
pub const DOWN_MARKER: &str = "-- migrate:down";

const TEMPLATE: &str = "-- migrate:up\n\n\n-- migrate:down\n\n";

/// A single migration file, split into its up and down sections.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: String,
    pub path: PathBuf,
    pub up: String,
    pub down: Option<String>,
}

impl Migration {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Extract the version prefix from a migration file name:
/// "20240101120000_create_users.sql" -> "20240101120000"
pub fn version_from_file_name(file_name: &str) -> Option<String> {
    let version: String = file_name
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if version.is_empty() { None } else { Some(version) }
}

/// Split migration file contents on the up/down markers.
///
/// Everything after `-- migrate:up` and before `-- migrate:down` is the up
/// block; everything after `-- migrate:down` is the down block. The up
/// marker is required, the down marker is not.
pub fn split_sections(
    contents: &str,
    path: &Path,
) -> Result<(String, Option<String>), MigrationError> {
    let after_up = match contents.split_once(UP_MARKER) {
        Some((_, rest)) => rest,
        None => {
            return Err(MigrationError {
                kind: MigrationErrorKind::MissingUpBlock(path.to_path_buf()),
            });
        }
    };

    match after_up.split_once(DOWN_MARKER) {
        Some((up, down)) => Ok((up.trim().to_string(), Some(down.trim().to_string()))),
        None => Ok((after_up.trim().to_string(), None)),
    }
}

/// Collect all migration files in a directory, keyed and ordered by version.
pub fn collect_from_directory(directory: &str) -> Result<BTreeMap<String, Migration>, MigrationError> {
    let path = Path::new(directory);
    if !path.is_dir() {
        return Err(MigrationError {
            kind: MigrationErrorKind::InvalidDirectory(path.to_path_buf()),
        });
    }

    let entries = fs::read_dir(path).map_err(|source| MigrationError {
        kind: MigrationErrorKind::Io {
            source,
            path: path.to_path_buf(),
        },
    })?;

    let mut migrations = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|source| MigrationError {
            kind: MigrationErrorKind::Io {
                source,
                path: path.to_path_buf(),
            },
        })?;

        let file_path = entry.path();
        if !file_path.is_file() || file_path.extension().and_then(|s| s.to_str()) != Some("sql") {
            tracing::debug!("Skipping non-migration entry: {:?}", file_path);
            continue;
        }

        let file_name = match file_path.file_name().and_then(|s| s.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let version = match version_from_file_name(&file_name) {
            Some(version) => version,
            None => {
                tracing::debug!("Skipping file without version prefix: {:?}", file_path);
                continue;
            }
        };

        let contents = fs::read_to_string(&file_path).map_err(|source| MigrationError {
            kind: MigrationErrorKind::Io {
                source,
                path: file_path.clone(),
            },
        })?;

        let (up, down) = split_sections(&contents, &file_path)?;

        migrations.insert(
            version.clone(),
            Migration {
                version,
                path: file_path,
                up,
                down,
            },
        );
    }

    Ok(migrations)
}

/// Write a new migration scaffold into the directory, creating the
/// directory first if needed. Returns the path of the new file.
pub fn scaffold(directory: &str, version: &str, name: &str) -> Result<PathBuf, MigrationError> {
    let dir = Path::new(directory);

    fs::create_dir_all(dir).map_err(|source| MigrationError {
        kind: MigrationErrorKind::Io {
            source,
            path: dir.to_path_buf(),
        },
    })?;

    let path = dir.join(format!("{version}_{name}.sql"));

    fs::write(&path, TEMPLATE).map_err(|source| MigrationError {
        kind: MigrationErrorKind::Io {
            source,
            path: path.clone(),
        },
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn version_is_the_leading_digit_run() {
        assert_eq!(
            version_from_file_name("20240101120000_create_users.sql"),
            Some("20240101120000".to_string())
        );
        assert_eq!(version_from_file_name("001_init.sql"), Some("001".to_string()));
        assert_eq!(version_from_file_name("create_users.sql"), None);
        assert_eq!(version_from_file_name(""), None);
    }

    #[test]
    fn split_sections_separates_up_and_down() {
        let contents = "-- migrate:up\nCREATE TABLE users (id int);\n\n-- migrate:down\nDROP TABLE users;\n";

        let (up, down) = split_sections(contents, Path::new("x.sql")).unwrap();

        assert_eq!(up, "CREATE TABLE users (id int);");
        assert_eq!(down.as_deref(), Some("DROP TABLE users;"));
    }

    #[test]
    fn split_sections_allows_a_missing_down_block() {
        let contents = "-- migrate:up\nCREATE TABLE users (id int);\n";

        let (up, down) = split_sections(contents, Path::new("x.sql")).unwrap();

        assert_eq!(up, "CREATE TABLE users (id int);");
        assert!(down.is_none());
    }

    #[test]
    fn split_sections_requires_an_up_block() {
        let err = split_sections("CREATE TABLE users (id int);", Path::new("x.sql")).unwrap_err();

        assert!(matches!(err.kind, MigrationErrorKind::MissingUpBlock(_)));
    }

    #[test]
    fn collect_orders_by_version_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str| {
            fs::write(
                dir.path().join(name),
                "-- migrate:up\nSELECT 1;\n-- migrate:down\nSELECT 2;\n",
            )
            .unwrap();
        };

        write("20240201000000_second.sql");
        write("20240101000000_first.sql");
        fs::write(dir.path().join("README.md"), "not a migration").unwrap();
        fs::write(dir.path().join("notes.sql"), "-- no version prefix").unwrap();

        let migrations = collect_from_directory(dir.path().to_str().unwrap()).unwrap();

        let versions: Vec<&String> = migrations.keys().collect();
        assert_eq!(versions, vec!["20240101000000", "20240201000000"]);
        assert_eq!(
            migrations["20240101000000"].file_name(),
            "20240101000000_first.sql"
        );
    }

    #[test]
    fn collect_rejects_a_missing_directory() {
        let err = collect_from_directory("./definitely/not/here").unwrap_err();

        assert!(matches!(err.kind, MigrationErrorKind::InvalidDirectory(_)));
    }

    #[test]
    fn scaffold_creates_the_directory_and_template() {
        let dir = tempfile::tempdir().unwrap();
        let migrations_dir = dir.path().join("migrations");

        let path = scaffold(
            migrations_dir.to_str().unwrap(),
            "20240101120000",
            "create_users",
        )
        .unwrap();

        assert_eq!(
            path.file_name().and_then(|s| s.to_str()),
            Some("20240101120000_create_users.sql")
        );

        let contents = fs::read_to_string(&path).unwrap();
        let (up, down) = split_sections(&contents, &path).unwrap();
        assert_eq!(up, "");
        assert_eq!(down.as_deref(), Some(""));
    }
}
