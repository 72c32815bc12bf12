//! SQLite adapter

use super::engine::DialectAdapter;
use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::{Dialect, SQLiteDialect};

static TABLE_OPTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\)\s*(?:WITHOUT\s+ROWID|STRICT)(?:\s*,\s*(?:WITHOUT\s+ROWID|STRICT))*\s*$")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl DialectAdapter for SqliteAdapter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn grammar(&self) -> Box<dyn Dialect> {
        Box::new(SQLiteDialect {})
    }

    fn quote_pairs(&self) -> &'static [(char, char)] {
        &[('"', '"'), ('`', '`'), ('[', ']')]
    }

    fn preprocess(&self, statement: &str) -> String {
        TABLE_OPTIONS.replace(statement.trim_end(), ")").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sql::engine::parse_script;

    #[test]
    fn test_preprocess_strips_table_options() {
        assert_eq!(
            SqliteAdapter.preprocess("CREATE TABLE t (k TEXT PRIMARY KEY) WITHOUT ROWID, STRICT"),
            "CREATE TABLE t (k TEXT PRIMARY KEY)"
        );
    }

    #[test]
    fn test_autoincrement_and_inline_references() {
        let sql = "CREATE TABLE artists (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);\n\
                   CREATE TABLE albums (\n\
                     id INTEGER PRIMARY KEY,\n\
                     artist_id INTEGER REFERENCES artists(id) ON DELETE CASCADE,\n\
                     title TEXT\n\
                   );\n\
                   CREATE INDEX idx_albums_artist ON albums(artist_id);";
        let result = parse_script(&SqliteAdapter, sql).unwrap();
        assert_eq!(result.tables.len(), 2);
        assert!(result.tables[0].column("id").unwrap().increment);
        assert!(!result.tables[1].column("id").unwrap().increment);
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].delete_action.as_deref(), Some("CASCADE"));
        assert_eq!(result.tables[1].indexes.len(), 1);
    }
}
