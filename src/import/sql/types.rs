//! Raw type helpers: size-argument extraction, array detection, affinity

use super::result::TypeArgs;
use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_ARGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[^(]*?)\s*\(\s*(?P<args>[^)]*)\)\s*(?P<tail>.*)$").expect("valid regex")
});

/// A raw column type split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    /// Lowercase base name without arguments or array suffix
    pub base: String,
    pub args: TypeArgs,
    pub is_array: bool,
}

/// Split `varchar(255)[]`, `numeric(10, 2)`, `int[]`, `nvarchar(max)`
pub fn parse_type(raw: &str) -> ParsedType {
    let mut text = raw.trim().to_string();
    let mut is_array = false;
    while let Some(stripped) = text.strip_suffix("[]") {
        is_array = true;
        text = stripped.trim_end().to_string();
    }
    if text.to_uppercase().ends_with(" ARRAY") {
        is_array = true;
        text = text[..text.len() - " ARRAY".len()].trim_end().to_string();
    }

    let mut args = TypeArgs::default();
    let base = match TYPE_ARGS.captures(&text) {
        Some(caps) => {
            let base = caps.name("base").map(|m| m.as_str()).unwrap_or_default();
            let tail = caps.name("tail").map(|m| m.as_str()).unwrap_or_default();
            let values: Vec<String> = caps
                .name("args")
                .map(|m| m.as_str())
                .unwrap_or_default()
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            apply_args(base, &values, &mut args);
            if tail.is_empty() {
                base.to_string()
            } else {
                format!("{} {}", base, tail)
            }
        }
        None => text.clone(),
    };

    ParsedType {
        base: normalize_type_name(&base),
        args,
        is_array,
    }
}

fn apply_args(base: &str, values: &[String], args: &mut TypeArgs) {
    let lower = base.to_lowercase();
    let numeric = ["numeric", "decimal", "dec", "number", "fixed", "float", "double", "real"]
        .iter()
        .any(|t| lower.trim() == *t || lower.trim().starts_with(&format!("{} ", t)));
    if numeric {
        args.precision = values.first().and_then(|v| v.parse().ok());
        args.scale = values.get(1).and_then(|v| v.parse().ok());
    } else if let Some(first) = values.first() {
        if first.eq_ignore_ascii_case("max") {
            args.length = Some("max".to_string());
        } else if first.chars().all(|c| c.is_ascii_digit()) {
            args.length = Some(first.clone());
        }
    }
}

/// Lowercase, unquote and collapse whitespace; drops `UNSIGNED`/`ZEROFILL`
/// only when they trail an integer name
pub fn normalize_type_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect();
    let lower = cleaned.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let words: Vec<&str> = words
        .into_iter()
        .filter(|w| *w != "zerofill")
        .collect();
    let joined = words.join(" ");
    match joined.rsplit_once('.') {
        // pg_catalog.int4 / public.my_enum
        Some((schema, rest)) if !schema.contains(' ') => rest.to_string(),
        _ => joined,
    }
}

/// Serial pseudo-types imply an auto-increment column
pub fn is_serial_type(base: &str) -> bool {
    matches!(
        base,
        "serial" | "serial4" | "bigserial" | "serial8" | "smallserial" | "serial2"
    )
}

/// SQLite storage class of a declared type, by its substring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAffinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl TypeAffinity {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TypeAffinity::Integer => "INTEGER",
            TypeAffinity::Text => "TEXT",
            TypeAffinity::Blob => "BLOB",
            TypeAffinity::Real => "REAL",
            TypeAffinity::Numeric => "NUMERIC",
        }
    }
}

pub fn type_affinity(declared: &str) -> TypeAffinity {
    let upper = declared.to_uppercase();
    if upper.contains("INT") {
        TypeAffinity::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        TypeAffinity::Text
    } else if upper.is_empty() || upper.contains("BLOB") || upper.contains("BINARY") {
        TypeAffinity::Blob
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        TypeAffinity::Real
    } else {
        TypeAffinity::Numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_length_and_array() {
        let parsed = parse_type("VARCHAR(255)[]");
        assert_eq!(parsed.base, "varchar");
        assert_eq!(parsed.args.length.as_deref(), Some("255"));
        assert!(parsed.is_array);

        let parsed = parse_type("text");
        assert_eq!(parsed.base, "text");
        assert!(parsed.args.is_empty());
        assert!(!parsed.is_array);
    }

    #[test]
    fn test_parse_type_precision_scale_and_max() {
        let parsed = parse_type("NUMERIC(10, 2)");
        assert_eq!(parsed.base, "numeric");
        assert_eq!(parsed.args.precision, Some(10));
        assert_eq!(parsed.args.scale, Some(2));

        let parsed = parse_type("nvarchar(MAX)");
        assert_eq!(parsed.args.length.as_deref(), Some("max"));

        let parsed = parse_type("character varying(40)");
        assert_eq!(parsed.base, "character varying");
    }

    #[test]
    fn test_parse_type_keeps_tail_words() {
        let parsed = parse_type("timestamp(6) with time zone");
        assert_eq!(parsed.base, "timestamp with time zone");
        let parsed = parse_type("int(11) unsigned");
        assert_eq!(parsed.base, "int unsigned");
    }

    #[test]
    fn test_normalize_type_name_strips_schema() {
        assert_eq!(normalize_type_name("pg_catalog.int4"), "int4");
        assert_eq!(normalize_type_name("\"Mood\""), "mood");
    }

    #[test]
    fn test_affinity() {
        assert_eq!(type_affinity("BIGINT"), TypeAffinity::Integer);
        assert_eq!(type_affinity("varchar(20)"), TypeAffinity::Text);
        assert_eq!(type_affinity("double precision"), TypeAffinity::Real);
        assert_eq!(type_affinity("decimal(10,2)"), TypeAffinity::Numeric);
        assert_eq!(type_affinity("blob"), TypeAffinity::Blob);
    }
}
