use crate::db::EngineError;

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub struct CliError {
    pub kind: CliErrorKind,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum CliErrorKind {
    Config {
        var: String,
        source: url::ParseError,
    },
    Engine(EngineError),
    /// Control signal for `status` with exit-code behavior: pending
    /// migrations exist. Maps to exit status 1 with no message.
    PendingMigrations(usize),
}

impl fmt::Display for CliErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { var, source } => {
                write!(f, "Invalid database URL in {var}: {source}")
            }
            Self::Engine(error) => write!(f, "{}", error.kind),
            Self::PendingMigrations(count) => write!(f, "{count} pending migration(s)"),
        }
    }
}

impl Error for CliErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config { source, .. } => Some(source),
            Self::Engine(source) => Some(source),
            _ => None,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(error: EngineError) -> Self {
        CliError {
            kind: CliErrorKind::Engine(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{EngineError, EngineErrorKind};
    use std::error::Error;

    #[test]
    fn cli_error_display_formats_correctly() {
        let parse_err = url::Url::parse("").unwrap_err();
        let engine_err = EngineError {
            kind: EngineErrorKind::NothingToRollback,
        };

        let cases: Vec<(CliErrorKind, &str)> = vec![
            (
                CliErrorKind::Config {
                    var: "DATABASE_URL".into(),
                    source: parse_err,
                },
                "Invalid database URL in DATABASE_URL",
            ),
            (CliErrorKind::Engine(engine_err), "rollback"),
            (CliErrorKind::PendingMigrations(3), "3 pending migration(s)"),
        ];

        for (kind, expect) in cases {
            let text = kind.to_string();
            assert!(
                text.contains(expect),
                "Expected `{}` in `{}`",
                expect,
                text
            );
        }
    }

    #[test]
    fn engine_variant_displays_the_raw_engine_message() {
        // stderr output is `Error: <message>`, so no type-name prefix here.
        let err = CliError {
            kind: CliErrorKind::Engine(EngineError {
                kind: EngineErrorKind::PgDump("boom".into()),
            }),
        };

        assert_eq!(err.to_string(), "pg_dump failed: 'boom'");
    }

    #[test]
    fn cli_error_source_chain_works() {
        let kind = CliErrorKind::Config {
            var: "DATABASE_URL".into(),
            source: url::Url::parse("").unwrap_err(),
        };
        assert!(kind.source().is_some());

        let kind = CliErrorKind::PendingMigrations(1);
        assert!(kind.source().is_none());
    }

    #[test]
    fn cli_error_from_engine_error_works() {
        let engine_err = EngineError {
            kind: EngineErrorKind::MissingDatabaseName,
        };

        let e: CliError = engine_err.into();

        assert!(matches!(e.kind, CliErrorKind::Engine(_)));
    }
}
