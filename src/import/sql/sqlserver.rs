//! SQL Server adapter

use super::engine::DialectAdapter;
use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::{Dialect, MsSqlDialect};

static FILEGROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:TEXTIMAGE_ON|ON)\s+\[?PRIMARY\]?").expect("valid regex")
});
static INDEX_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+WITH\s*\(\s*(?:PAD_INDEX|STATISTICS_NORECOMPUTE|IGNORE_DUP_KEY|ALLOW_ROW_LOCKS|ALLOW_PAGE_LOCKS|OPTIMIZE_FOR_SEQUENTIAL_KEY|FILLFACTOR|DATA_COMPRESSION)[^)]*\)")
        .expect("valid regex")
});
static CLUSTERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:NON)?CLUSTERED\b|\s+NOT\s+FOR\s+REPLICATION\b").expect("valid regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerAdapter;

impl DialectAdapter for SqlServerAdapter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SqlServer
    }

    fn grammar(&self) -> Box<dyn Dialect> {
        Box::new(MsSqlDialect {})
    }

    fn quote_pairs(&self) -> &'static [(char, char)] {
        &[('[', ']'), ('"', '"')]
    }

    /// Drop filegroup placement, index options and clustering keywords
    fn preprocess(&self, statement: &str) -> String {
        let text = INDEX_OPTIONS.replace_all(statement, "");
        let text = FILEGROUP.replace_all(&text, "");
        CLUSTERING.replace_all(&text, "").into_owned()
    }
}
