//! Identifier quoting and literal escaping
//!
//! All identifiers (table, column, schema, constraint names) are quoted with
//! the target dialect's quote characters. Embedded quote characters are
//! escaped by doubling them.

use crate::models::{DBTable, DatabaseType};
use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid regex"));

/// Words that cannot appear bare as a table or column name in any of the
/// supported dialects
const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "current_date", "current_time", "current_timestamp",
    "default", "delete", "desc", "distinct", "drop", "else", "end", "exists", "foreign", "from",
    "full", "grant", "group", "having", "in", "index", "inner", "insert", "into", "is", "join",
    "key", "left", "like", "limit", "not", "null", "offset", "on", "or", "order", "outer",
    "primary", "references", "right", "select", "set", "table", "then", "to", "union", "unique",
    "update", "user", "using", "values", "when", "where", "with",
];

/// Quote `identifier` for `dialect`
///
/// # Example
///
/// ```rust
/// use sql_diagram_sdk::export::quote::quote_identifier;
/// use sql_diagram_sdk::models::DatabaseType;
///
/// assert_eq!(quote_identifier("user`s", DatabaseType::Mysql), "`user``s`");
/// assert_eq!(quote_identifier("a]b", DatabaseType::SqlServer), "[a]]b]");
/// assert_eq!(quote_identifier("name", DatabaseType::Postgresql), "\"name\"");
/// ```
pub fn quote_identifier(identifier: &str, dialect: DatabaseType) -> String {
    match dialect {
        DatabaseType::Mysql | DatabaseType::Mariadb => {
            format!("`{}`", identifier.replace('`', "``"))
        }
        DatabaseType::SqlServer => format!("[{}]", identifier.replace(']', "]]")),
        _ => format!("\"{}\"", identifier.replace('"', "\"\"")),
    }
}

/// Whether `identifier` must be quoted to survive unchanged
pub fn needs_quoting(identifier: &str) -> bool {
    !PLAIN_IDENTIFIER.is_match(identifier) || RESERVED_WORDS.contains(&identifier)
}

/// Identifier quoting policy of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    pub dialect: DatabaseType,
    /// Quote every identifier, not only the ones that need it
    pub always: bool,
}

impl Quoter {
    pub fn new(dialect: DatabaseType, always: bool) -> Self {
        Self { dialect, always }
    }

    /// Quote-everything policy used by the per-dialect exporters
    pub fn strict(dialect: DatabaseType) -> Self {
        Self::new(dialect, true)
    }

    pub fn ident(&self, identifier: &str) -> String {
        if self.always || needs_quoting(identifier) {
            quote_identifier(identifier, self.dialect)
        } else {
            identifier.to_string()
        }
    }

    /// `schema.name`, or just `name` when the schema is empty
    pub fn qualified(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(schema) if !schema.is_empty() => {
                format!("{}.{}", self.ident(schema), self.ident(name))
            }
            _ => self.ident(name),
        }
    }

    pub fn table(&self, table: &DBTable) -> String {
        self.qualified(table.schema.as_deref(), &table.name)
    }

    /// Comma-separated, always-quoted column list
    pub fn column_list<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> String {
        columns
            .into_iter()
            .map(|c| quote_identifier(c, self.dialect))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Single-quoted SQL string literal
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_per_dialect() {
        assert_eq!(quote_identifier("a\"b", DatabaseType::Postgresql), "\"a\"\"b\"");
        assert_eq!(quote_identifier("a\"b", DatabaseType::Sqlite), "\"a\"\"b\"");
        assert_eq!(quote_identifier("t", DatabaseType::Mariadb), "`t`");
        assert_eq!(quote_identifier("t", DatabaseType::SqlServer), "[t]");
    }

    #[test]
    fn test_needs_quoting() {
        assert!(!needs_quoting("user_id"));
        assert!(needs_quoting("UserId"));
        assert!(needs_quoting("order"));
        assert!(needs_quoting("first name"));
        assert!(needs_quoting("1st"));
    }

    #[test]
    fn test_quoter_policies() {
        let loose = Quoter::new(DatabaseType::Postgresql, false);
        assert_eq!(loose.qualified(Some("public"), "users"), "public.users");
        assert_eq!(loose.qualified(Some(""), "Users"), "\"Users\"");
        assert_eq!(loose.column_list(["id"]), "\"id\"");

        let strict = Quoter::strict(DatabaseType::SqlServer);
        assert_eq!(strict.qualified(Some("dbo"), "users"), "[dbo].[users]");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("it's"), "'it''s'");
    }
}
