//! Enumerations shared across the SDK models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL database flavour a diagram or a script belongs to
///
/// Serialized in snake_case (`"postgresql"`, `"sql_server"`, ...), matching the
/// identifiers the rest of the application stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseType {
    /// Unspecified dialect; triggers detection on import
    #[default]
    Generic,
    Postgresql,
    Mysql,
    SqlServer,
    Mariadb,
    Sqlite,
    Clickhouse,
    Cockroachdb,
    Oracle,
}

impl DatabaseType {
    /// Identifier used in serialized models and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::Generic => "generic",
            DatabaseType::Postgresql => "postgresql",
            DatabaseType::Mysql => "mysql",
            DatabaseType::SqlServer => "sql_server",
            DatabaseType::Mariadb => "mariadb",
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Clickhouse => "clickhouse",
            DatabaseType::Cockroachdb => "cockroachdb",
            DatabaseType::Oracle => "oracle",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::Generic => "Generic SQL",
            DatabaseType::Postgresql => "PostgreSQL",
            DatabaseType::Mysql => "MySQL",
            DatabaseType::SqlServer => "SQL Server",
            DatabaseType::Mariadb => "MariaDB",
            DatabaseType::Sqlite => "SQLite",
            DatabaseType::Clickhouse => "ClickHouse",
            DatabaseType::Cockroachdb => "CockroachDB",
            DatabaseType::Oracle => "Oracle",
        }
    }

    /// Schema used when a table carries none (`public`, `dbo`)
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            DatabaseType::Postgresql | DatabaseType::Cockroachdb => Some("public"),
            DatabaseType::SqlServer => Some("dbo"),
            _ => None,
        }
    }

    /// MySQL and MariaDB share grammar, quoting and exporter
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, DatabaseType::Mysql | DatabaseType::Mariadb)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "" => Ok(DatabaseType::Generic),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::Postgresql),
            "mysql" => Ok(DatabaseType::Mysql),
            "sql_server" | "sqlserver" | "mssql" => Ok(DatabaseType::SqlServer),
            "mariadb" => Ok(DatabaseType::Mariadb),
            "sqlite" => Ok(DatabaseType::Sqlite),
            "clickhouse" => Ok(DatabaseType::Clickhouse),
            "cockroachdb" => Ok(DatabaseType::Cockroachdb),
            "oracle" => Ok(DatabaseType::Oracle),
            other => Err(format!("Unknown database type: {}", other)),
        }
    }
}

/// Relationship endpoint cardinality
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    /// `one` for unique or primary-key columns, `many` otherwise
    pub fn from_uniqueness(is_unique: bool) -> Self {
        if is_unique {
            Cardinality::One
        } else {
            Cardinality::Many
        }
    }
}

/// Kind of a user-defined type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CustomTypeKind {
    Enum,
    Composite,
}
