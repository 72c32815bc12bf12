//! SQL import
//!
//! Parses DDL scripts from PostgreSQL, MySQL/MariaDB, SQL Server and SQLite
//! into a dialect-neutral [`SQLParserResult`]. Hand-written DDL goes through the
//! statement-by-statement engine; `pg_dump`/`mysqldump` output goes through the
//! phase-ordered dump extractor.

pub mod detect;
pub mod dump;
pub mod engine;
pub mod fallback;
pub mod grammar;
pub mod mysql;
pub mod postgres;
pub mod result;
pub mod sqlite;
pub mod sqlserver;
pub mod text;
pub mod types;

pub use detect::{detect_database_type, is_mysql_dump, is_pg_dump};
pub use engine::DialectAdapter;
pub use result::{
    SQLColumn, SQLCustomType, SQLForeignKey, SQLIndex, SQLParserResult, SQLTable, TypeArgs,
};

use super::ImportError;
use crate::models::DatabaseType;
use tracing::info;

/// SQL Importer - parses DDL scripts of one dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLImporter {
    /// Source dialect; `Generic` runs detection on every script
    pub database_type: DatabaseType,
}

impl SQLImporter {
    /// Create a new SQL importer for the given dialect
    ///
    /// # Example
    ///
    /// ```rust
    /// use sql_diagram_sdk::import::sql::SQLImporter;
    /// use sql_diagram_sdk::models::DatabaseType;
    ///
    /// let importer = SQLImporter::new(DatabaseType::Postgresql);
    /// let result = importer.parse("CREATE TABLE users (id SERIAL PRIMARY KEY);").unwrap();
    /// assert_eq!(result.tables.len(), 1);
    /// ```
    pub fn new(database_type: DatabaseType) -> Self {
        Self { database_type }
    }

    /// Adapter for a concrete dialect
    ///
    /// # Errors
    ///
    /// `UnsupportedDialect` for dialects that are export-only.
    pub fn adapter_for(database_type: DatabaseType) -> Result<Box<dyn DialectAdapter>, ImportError> {
        match database_type {
            DatabaseType::Postgresql => Ok(Box::new(postgres::PostgresAdapter)),
            DatabaseType::Mysql => Ok(Box::new(mysql::MySqlAdapter::mysql())),
            DatabaseType::Mariadb => Ok(Box::new(mysql::MySqlAdapter::mariadb())),
            DatabaseType::SqlServer => Ok(Box::new(sqlserver::SqlServerAdapter)),
            DatabaseType::Sqlite => Ok(Box::new(sqlite::SqliteAdapter)),
            other => Err(ImportError::UnsupportedDialect(other)),
        }
    }

    /// Dialect that will actually be used for `sql`
    pub fn resolve_database_type(&self, sql: &str) -> DatabaseType {
        match self.database_type {
            DatabaseType::Generic => detect_database_type(sql),
            other => other,
        }
    }

    /// Parse a script into tables, foreign keys, custom types and warnings
    ///
    /// # Errors
    ///
    /// `UnsupportedDialect` when no adapter exists, `Parse` when nothing
    /// importable was found and at least one statement could not be read.
    pub fn parse(&self, sql: &str) -> Result<SQLParserResult, ImportError> {
        let database_type = self.resolve_database_type(sql);
        let adapter = Self::adapter_for(database_type)?;
        let use_dump = match database_type {
            DatabaseType::Postgresql => is_pg_dump(sql),
            DatabaseType::Mysql | DatabaseType::Mariadb => is_mysql_dump(sql),
            _ => false,
        };
        info!(dialect = %database_type, dump = use_dump, "parsing SQL script");
        if use_dump {
            dump::parse_dump(adapter.as_ref(), sql)
        } else {
            engine::parse_script(adapter.as_ref(), sql)
        }
    }
}
