//! Default-value literal translation

use super::quote::string_literal;
use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid regex"));
static FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w.]*\s*\(.*\)$").expect("valid regex"));
static QUOTED_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:[nebx])?'(?s:.*)'$").expect("valid regex"));
static PG_CAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"::[A-Za-z_][\w .]*(\(\d+(,\s*\d+)?\))?(\[\])?$").expect("valid regex")
});
static IDENTITY_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(nextval\s*\(.*\)|auto_increment|autoincrement|identity(\s*\(.*\))?|(big|small)?serial)$")
        .expect("valid regex")
});

const KEYWORDS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_USER",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NULL",
    "TRUE",
    "FALSE",
];

/// Strip parentheses that wrap the whole expression: `((0))` → `0`
fn unwrap_parens(value: &str) -> &str {
    let mut current = value.trim();
    while current.starts_with('(') && current.ends_with(')') && wraps_whole(current) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

fn wraps_whole(value: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    for (i, c) in value.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 && i + 1 < value.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Quote characters balanced outside of `''` escapes
fn balanced_quotes(value: &str) -> bool {
    value.matches('\'').count() % 2 == 0
}

/// Operator or call outside string literals: `now() + interval '1 day'`
fn has_operator(value: &str) -> bool {
    let mut outside = String::with_capacity(value.len());
    for (i, part) in value.split('\'').enumerate() {
        if i % 2 == 0 {
            outside.push_str(part);
        }
        outside.push(' ');
    }
    outside.contains('(')
        || outside.contains("||")
        || [" + ", " - ", " * ", " / "].iter().any(|op| outside.contains(op))
}

/// Whether `value` is SQL to keep verbatim rather than a bare word to quote
fn is_expression(value: &str) -> bool {
    let upper = value.to_uppercase();
    if KEYWORDS.contains(&upper.as_str())
        || NUMBER.is_match(value)
        || FUNCTION_CALL.is_match(value)
        || QUOTED_STRING.is_match(value)
        || upper.starts_with("ARRAY[")
    {
        return true;
    }
    if let Some(cast) = PG_CAST.find(value) {
        let base = unwrap_parens(&value[..cast.start()]);
        return !base.is_empty() && is_expression(base);
    }
    balanced_quotes(value) && has_operator(value)
}

fn is_boolean_type(type_id: &str) -> bool {
    matches!(type_id, "boolean" | "bit")
}

/// Translate a stored default into `dialect`'s literal syntax
///
/// `type_id` is the column's generic type; boolean columns get `TRUE`/`FALSE`
/// for `1`/`0` everywhere but SQL Server. `None` means the default is
/// dropped (identity defaults outside PostgreSQL).
pub fn translate_default(raw: &str, type_id: &str, dialect: DatabaseType) -> Option<String> {
    let mut value = unwrap_parens(raw).to_string();
    if value.is_empty() {
        return None;
    }

    if IDENTITY_DEFAULT.is_match(&value) {
        let is_nextval = value.to_lowercase().starts_with("nextval");
        return (is_nextval && matches!(dialect, DatabaseType::Postgresql | DatabaseType::Generic))
            .then_some(value);
    }

    if !matches!(dialect, DatabaseType::Postgresql | DatabaseType::Generic) {
        if let Some(cast) = PG_CAST.find(&value) {
            value = unwrap_parens(&value[..cast.start()]).to_string();
        }
        if dialect != DatabaseType::SqlServer
            && value.len() > 2
            && value.starts_with(['N', 'n'])
            && value[1..].starts_with('\'')
        {
            value.remove(0);
        }
    }

    if is_boolean_type(type_id) && dialect != DatabaseType::SqlServer {
        match value.as_str() {
            "0" => return Some("FALSE".to_string()),
            "1" => return Some("TRUE".to_string()),
            _ => {}
        }
    }

    let upper = value.to_uppercase();
    if KEYWORDS.contains(&upper.as_str()) {
        return Some(match (dialect, upper.as_str()) {
            (DatabaseType::SqlServer, "TRUE") => "1".to_string(),
            (DatabaseType::SqlServer, "FALSE") => "0".to_string(),
            (DatabaseType::SqlServer, "CURRENT_DATE") => "CAST(GETDATE() AS date)".to_string(),
            _ => upper,
        });
    }
    if is_expression(&value) {
        return Some(value);
    }
    Some(string_literal(&value))
}
