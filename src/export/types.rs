//! Column type rendering per target dialect
//!
//! Diagram fields carry a generic catalog type (see
//! [`crate::models::data_type`]) or the name of a custom type. Each target maps
//! the catalog onto its own names and decides whether the field's length or
//! precision is still meaningful.

use super::quote::{Quoter, string_literal};
use crate::models::data_type::{GENERIC_DATA_TYPES, TypeArgsKind, type_args_kind};
use crate::models::{CustomTypeKind, DBCustomType, DBField, DatabaseType};

/// Target type name and how the field's size applies to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mapped {
    /// Complete type text, field size ignored
    Bare(&'static str),
    /// Field size appended when present
    Sized(&'static str),
    /// Field size appended, falling back to the given size
    SizedOr(&'static str, &'static str),
}

fn postgres_type(id: &str) -> Option<Mapped> {
    use Mapped::*;
    Some(match id {
        "tinyint" => Bare("smallint"),
        "mediumint" | "year" => Bare("integer"),
        "datetime" | "datetime2" | "smalldatetime" => Bare("timestamp"),
        "datetimeoffset" => Bare("timestamp with time zone"),
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "image" | "binary" | "varbinary" => {
            Bare("bytea")
        }
        "tinytext" | "mediumtext" | "longtext" | "ntext" | "enum" | "set" => Bare("text"),
        "nvarchar" => Sized("varchar"),
        "nchar" => Sized("char"),
        "uniqueidentifier" => Bare("uuid"),
        "bit" => Bare("boolean"),
        "smallmoney" => Bare("money"),
        _ => return None,
    })
}

fn mysql_type(id: &str) -> Option<Mapped> {
    use Mapped::*;
    Some(match id {
        "integer" => Bare("int"),
        "bytea" | "image" => Bare("longblob"),
        "uuid" | "uniqueidentifier" => Bare("char(36)"),
        "jsonb" => Bare("json"),
        "timestamp with time zone" => Bare("timestamp"),
        "time with time zone" => Bare("time"),
        "double precision" => Bare("double"),
        "real" => Bare("float"),
        "money" | "smallmoney" => Bare("decimal(19,4)"),
        "varchar" | "nvarchar" => SizedOr("varchar", "255"),
        "varbinary" => SizedOr("varbinary", "255"),
        "nchar" => Sized("char"),
        "ntext" | "xml" => Bare("longtext"),
        "datetime2" | "datetimeoffset" | "smalldatetime" => Bare("datetime"),
        "inet" | "cidr" | "macaddr" => Bare("varchar(45)"),
        "interval" | "enum" | "set" => Bare("varchar(255)"),
        "geography" => Bare("geometry"),
        _ => return None,
    })
}

fn sqlserver_type(id: &str) -> Option<Mapped> {
    use Mapped::*;
    Some(match id {
        "boolean" => Bare("bit"),
        "integer" | "mediumint" => Bare("int"),
        "year" => Bare("smallint"),
        "text" | "tinytext" | "mediumtext" | "longtext" | "json" | "jsonb" => {
            Bare("nvarchar(max)")
        }
        "uuid" => Bare("uniqueidentifier"),
        "timestamp" | "datetime" => Bare("datetime2"),
        "timestamp with time zone" => Bare("datetimeoffset"),
        "time with time zone" => Bare("time"),
        "double precision" => Bare("float"),
        "bytea" | "blob" | "tinyblob" | "mediumblob" | "longblob" => Bare("varbinary(max)"),
        "varchar" => SizedOr("varchar", "max"),
        "nvarchar" => SizedOr("nvarchar", "max"),
        "varbinary" => SizedOr("varbinary", "max"),
        "interval" | "enum" | "set" => Bare("varchar(255)"),
        "inet" | "cidr" | "macaddr" => Bare("varchar(45)"),
        "point" => Bare("geometry"),
        _ => return None,
    })
}

/// SQLite keeps only storage affinities
fn sqlite_type(id: &str) -> Mapped {
    use Mapped::*;
    match id {
        "tinyint" | "smallint" | "mediumint" | "integer" | "bigint" | "bit" | "boolean"
        | "year" => Bare("integer"),
        "real" | "float" | "double precision" => Bare("real"),
        "decimal" | "numeric" => Sized("numeric"),
        "money" | "smallmoney" => Bare("numeric"),
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary" | "varbinary"
        | "image" => Bare("blob"),
        _ => Bare("text"),
    }
}

fn size_suffix(field: &DBField) -> Option<String> {
    match type_args_kind(&field.data_type.id) {
        TypeArgsKind::Length => field
            .character_maximum_length
            .as_ref()
            .filter(|l| !l.is_empty())
            .map(|l| format!("({})", l)),
        TypeArgsKind::PrecisionScale => match (field.precision, field.scale) {
            (Some(p), Some(s)) => Some(format!("({},{})", p, s)),
            (Some(p), None) => Some(format!("({})", p)),
            _ => None,
        },
        TypeArgsKind::None => None,
    }
}

fn custom_type_text(custom: &DBCustomType, target: DatabaseType, quoter: &Quoter) -> String {
    match (target, custom.kind) {
        (DatabaseType::Postgresql | DatabaseType::Generic, _) => {
            quoter.qualified(custom.schema.as_deref(), &custom.name)
        }
        (DatabaseType::Mysql | DatabaseType::Mariadb, CustomTypeKind::Enum) => {
            let values = custom
                .values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|v| string_literal(v))
                .collect::<Vec<_>>();
            format!("enum({})", values.join(","))
        }
        (DatabaseType::Mysql | DatabaseType::Mariadb, CustomTypeKind::Composite) => {
            "json".to_string()
        }
        (DatabaseType::SqlServer, CustomTypeKind::Enum) => "nvarchar(255)".to_string(),
        (DatabaseType::SqlServer, CustomTypeKind::Composite) => "nvarchar(max)".to_string(),
        _ => "text".to_string(),
    }
}

/// Array columns outside PostgreSQL are stored as serialized text
fn array_fallback(target: DatabaseType) -> Option<&'static str> {
    match target {
        DatabaseType::Mysql | DatabaseType::Mariadb => Some("json"),
        DatabaseType::SqlServer => Some("nvarchar(max)"),
        DatabaseType::Sqlite => Some("text"),
        _ => None,
    }
}

/// Full type text of `field` for `target`: name, size and array suffix
pub fn render_type(
    field: &DBField,
    target: DatabaseType,
    custom_types: &[DBCustomType],
    quoter: &Quoter,
) -> String {
    if field.is_array()
        && let Some(fallback) = array_fallback(target)
    {
        return fallback.to_string();
    }

    let id = field.data_type.id.as_str();
    let is_catalog = GENERIC_DATA_TYPES.iter().any(|(catalog_id, _)| *catalog_id == id);
    let base = if !is_catalog
        && let Some(custom) = custom_types.iter().find(|t| t.name.eq_ignore_ascii_case(id))
    {
        custom_type_text(custom, target, quoter)
    } else {
        let mapped = match target {
            DatabaseType::Postgresql => postgres_type(id),
            DatabaseType::Mysql | DatabaseType::Mariadb => mysql_type(id),
            DatabaseType::SqlServer => sqlserver_type(id),
            DatabaseType::Sqlite => Some(sqlite_type(id)),
            _ => None,
        };
        match mapped {
            Some(Mapped::Bare(name)) => name.to_string(),
            Some(Mapped::Sized(name)) => format!("{}{}", name, size_suffix(field).unwrap_or_default()),
            Some(Mapped::SizedOr(name, fallback)) => format!(
                "{}{}",
                name,
                size_suffix(field).unwrap_or_else(|| format!("({})", fallback))
            ),
            None => format!("{}{}", id, size_suffix(field).unwrap_or_default()),
        }
    };

    if field.is_array() {
        format!("{}[]", base)
    } else {
        base
    }
}

/// `serial` family name replacing an auto-increment integer column
pub fn postgres_serial(field: &DBField) -> Option<&'static str> {
    if !field.is_increment() || field.is_array() {
        return None;
    }
    match field.data_type.id.as_str() {
        "bigint" => Some("bigserial"),
        "smallint" | "tinyint" => Some("smallserial"),
        "integer" | "mediumint" => Some("serial"),
        _ => None,
    }
}

/// Whether the rendered type is a TEXT or BLOB family type
pub fn is_long_type(rendered: &str) -> bool {
    let lower = rendered.to_lowercase();
    lower.contains("text") || lower.contains("blob") || lower == "json"
}
