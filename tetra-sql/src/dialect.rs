use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DriverError;

/// Engine-specific spelling of the generated SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    MySql,
}

impl Dialect {
    /// Placeholder for the `n`th (1-based) bound parameter.
    #[must_use]
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${n}"),
            Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    /// Quotes an identifier, doubling any embedded quote character.
    #[must_use]
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            Dialect::Sqlite | Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Native error codes meaning "unique constraint violated".
    #[must_use]
    pub fn unique_violation_codes(&self) -> &'static [&'static str] {
        match self {
            // SQLITE_CONSTRAINT_UNIQUE, SQLITE_CONSTRAINT_PRIMARYKEY
            Dialect::Sqlite => &["2067", "1555"],
            // unique_violation (class 23)
            Dialect::Postgres => &["23505"],
            // ER_DUP_ENTRY
            Dialect::MySql => &["1062"],
        }
    }

    #[must_use]
    pub fn is_unique_violation(&self, err: &DriverError) -> bool {
        err.code
            .as_deref()
            .is_some_and(|code| self.unique_violation_codes().contains(&code))
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pgx" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            other => Err(DriverError::new(format!("sql: unknown driver {other:?}"))),
        }
    }
}
