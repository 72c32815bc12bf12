//! MySQL and MariaDB adapter

use super::engine::DialectAdapter;
use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::{Dialect, MySqlDialect};

static VERSIONED_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*!\d*\s*(?P<body>.*?)\*/").expect("valid regex"));

/// MySQL family DDL; the same grammar serves MariaDB
#[derive(Debug, Clone, Copy)]
pub struct MySqlAdapter {
    database_type: DatabaseType,
}

impl MySqlAdapter {
    pub fn mysql() -> Self {
        Self {
            database_type: DatabaseType::Mysql,
        }
    }

    pub fn mariadb() -> Self {
        Self {
            database_type: DatabaseType::Mariadb,
        }
    }
}

impl DialectAdapter for MySqlAdapter {
    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn grammar(&self) -> Box<dyn Dialect> {
        Box::new(MySqlDialect {})
    }

    fn quote_pairs(&self) -> &'static [(char, char)] {
        &[('`', '`'), ('"', '"')]
    }

    /// Unwrap `/*!40101 ... */` and rewrite `\'` escapes as `''`
    fn preprocess(&self, statement: &str) -> String {
        VERSIONED_COMMENT
            .replace_all(statement, "$body")
            .replace("\\'", "''")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sql::engine::parse_script;

    #[test]
    fn test_preprocess() {
        let adapter = MySqlAdapter::mysql();
        assert_eq!(
            adapter.preprocess("CREATE TABLE t (a text COMMENT 'it\\'s') /*!50100 ENGINE=InnoDB */"),
            "CREATE TABLE t (a text COMMENT 'it''s') ENGINE=InnoDB "
        );
    }

    #[test]
    fn test_playlists_scenario() {
        let sql = "CREATE TABLE `users` (`id` int NOT NULL AUTO_INCREMENT, PRIMARY KEY (`id`)) ENGINE=InnoDB;\n\
                   CREATE TABLE `playlists` (\n\
                     `id` int NOT NULL AUTO_INCREMENT,\n\
                     `user_id` int NOT NULL,\n\
                     PRIMARY KEY (`id`),\n\
                     KEY `idx_user` (`user_id`),\n\
                     CONSTRAINT `fk_playlists_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE\n\
                   ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='user playlists';";
        let result = parse_script(&MySqlAdapter::mysql(), sql).unwrap();
        assert_eq!(result.tables.len(), 2);
        let playlists = &result.tables[1];
        assert_eq!(playlists.comment.as_deref(), Some("user playlists"));
        assert!(playlists.column("id").unwrap().increment);
        assert_eq!(playlists.indexes.len(), 1);

        assert_eq!(result.relationships.len(), 1);
        let fk = &result.relationships[0];
        assert_eq!(fk.source_table, "playlists");
        assert_eq!(fk.source_column, "user_id");
        assert_eq!(fk.target_table, "users");
        assert_eq!(fk.target_column, "id");
    }

    #[test]
    fn test_mariadb_keeps_its_database_type() {
        let adapter = MySqlAdapter::mariadb();
        assert_eq!(adapter.database_type(), DatabaseType::Mariadb);
        assert_eq!(adapter.unquote("`weird``name`"), "weird`name");
    }
}
