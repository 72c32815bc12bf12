//! PostgreSQL adapter

use super::engine::DialectAdapter;
use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::{Dialect, PostgreSqlDialect};

static STORAGE_CLAUSES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:USING\s+INDEX\s+)?TABLESPACE\s+\S+|\s+WITH\s*\(\s*OIDS\s*=\s*\w+\s*\)|\s+WITH(?:OUT)?\s+OIDS\b")
        .expect("valid regex")
});

/// PostgreSQL DDL, including `pg_dump` output
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl DialectAdapter for PostgresAdapter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgresql
    }

    fn grammar(&self) -> Box<dyn Dialect> {
        Box::new(PostgreSqlDialect {})
    }

    fn quote_pairs(&self) -> &'static [(char, char)] {
        &[('"', '"')]
    }

    fn preprocess(&self, statement: &str) -> String {
        STORAGE_CLAUSES.replace_all(statement, "").into_owned()
    }
}
