//! Dialect-neutral data type catalog
//!
//! Fields reference a `DataType { id, name }` pair. Imported raw types are
//! normalized onto the generic catalog below; anything unknown falls back to
//! `varchar`.

use serde::{Deserialize, Serialize};

/// Data type of a diagram field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DataType {
    /// Stable identifier (lowercase, e.g. `"varchar"`, `"timestamp with time zone"`)
    pub id: String,
    /// Display name
    pub name: String,
}

impl DataType {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
        }
    }

    /// Fallback used when nothing in the catalog matches
    pub fn varchar() -> Self {
        Self::new("varchar")
    }
}

/// What kind of size arguments a catalog type carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeArgsKind {
    None,
    /// `(n)` character/binary length
    Length,
    /// `(p, s)` numeric precision and scale
    PrecisionScale,
}

/// Generic type ids known to the catalog, with their argument kind
pub const GENERIC_DATA_TYPES: &[(&str, TypeArgsKind)] = &[
    ("bigint", TypeArgsKind::None),
    ("binary", TypeArgsKind::Length),
    ("bit", TypeArgsKind::None),
    ("blob", TypeArgsKind::None),
    ("boolean", TypeArgsKind::None),
    ("bytea", TypeArgsKind::None),
    ("char", TypeArgsKind::Length),
    ("cidr", TypeArgsKind::None),
    ("date", TypeArgsKind::None),
    ("datetime", TypeArgsKind::None),
    ("datetime2", TypeArgsKind::None),
    ("datetimeoffset", TypeArgsKind::None),
    ("decimal", TypeArgsKind::PrecisionScale),
    ("double precision", TypeArgsKind::None),
    ("enum", TypeArgsKind::None),
    ("float", TypeArgsKind::None),
    ("geography", TypeArgsKind::None),
    ("geometry", TypeArgsKind::None),
    ("image", TypeArgsKind::None),
    ("inet", TypeArgsKind::None),
    ("integer", TypeArgsKind::None),
    ("interval", TypeArgsKind::None),
    ("json", TypeArgsKind::None),
    ("jsonb", TypeArgsKind::None),
    ("longblob", TypeArgsKind::None),
    ("longtext", TypeArgsKind::None),
    ("macaddr", TypeArgsKind::None),
    ("mediumblob", TypeArgsKind::None),
    ("mediumint", TypeArgsKind::None),
    ("mediumtext", TypeArgsKind::None),
    ("money", TypeArgsKind::None),
    ("nchar", TypeArgsKind::Length),
    ("ntext", TypeArgsKind::None),
    ("numeric", TypeArgsKind::PrecisionScale),
    ("nvarchar", TypeArgsKind::Length),
    ("point", TypeArgsKind::None),
    ("real", TypeArgsKind::None),
    ("set", TypeArgsKind::None),
    ("smalldatetime", TypeArgsKind::None),
    ("smallint", TypeArgsKind::None),
    ("smallmoney", TypeArgsKind::None),
    ("text", TypeArgsKind::None),
    ("time", TypeArgsKind::None),
    ("time with time zone", TypeArgsKind::None),
    ("timestamp", TypeArgsKind::None),
    ("timestamp with time zone", TypeArgsKind::None),
    ("tinyblob", TypeArgsKind::None),
    ("tinyint", TypeArgsKind::None),
    ("tinytext", TypeArgsKind::None),
    ("uniqueidentifier", TypeArgsKind::None),
    ("uuid", TypeArgsKind::None),
    ("varbinary", TypeArgsKind::Length),
    ("varchar", TypeArgsKind::Length),
    ("xml", TypeArgsKind::None),
    ("year", TypeArgsKind::None),
];

/// Synonyms resolved after an exact catalog miss
const TYPE_SYNONYMS: &[(&str, &str)] = &[
    ("character varying", "varchar"),
    ("varchar2", "varchar"),
    ("nvarchar2", "nvarchar"),
    ("national character varying", "nvarchar"),
    ("national char varying", "nvarchar"),
    ("character", "char"),
    ("national character", "nchar"),
    ("int", "integer"),
    ("int4", "integer"),
    ("integer unsigned", "integer"),
    ("int unsigned", "integer"),
    ("serial", "integer"),
    ("serial4", "integer"),
    ("int8", "bigint"),
    ("bigint unsigned", "bigint"),
    ("bigserial", "bigint"),
    ("serial8", "bigint"),
    ("int2", "smallint"),
    ("smallint unsigned", "smallint"),
    ("smallserial", "smallint"),
    ("serial2", "smallint"),
    ("tinyint unsigned", "tinyint"),
    ("mediumint unsigned", "mediumint"),
    ("bool", "boolean"),
    ("float8", "double precision"),
    ("double", "double precision"),
    ("float4", "real"),
    ("dec", "decimal"),
    ("fixed", "decimal"),
    ("timestamptz", "timestamp with time zone"),
    ("timestamp without time zone", "timestamp"),
    ("timetz", "time with time zone"),
    ("time without time zone", "time"),
    ("string", "text"),
    ("clob", "text"),
    ("binary varying", "varbinary"),
    ("rowversion", "binary"),
    ("sql_variant", "varbinary"),
];

/// Look up the argument kind of a generic type id
pub fn type_args_kind(type_id: &str) -> TypeArgsKind {
    GENERIC_DATA_TYPES
        .iter()
        .find(|(id, _)| *id == type_id)
        .map(|(_, kind)| *kind)
        .unwrap_or(TypeArgsKind::None)
}

/// Resolve a normalized (lowercase, argument-free) type name to a catalog entry
///
/// Exact match first, then the synonym table. Returns `None` when nothing fits.
pub fn lookup_generic_type(normalized: &str) -> Option<DataType> {
    if let Some((id, _)) = GENERIC_DATA_TYPES.iter().find(|(id, _)| *id == normalized) {
        return Some(DataType::new(*id));
    }
    TYPE_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, id)| DataType::new(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_and_synonym() {
        assert_eq!(lookup_generic_type("varchar").unwrap().id, "varchar");
        assert_eq!(lookup_generic_type("character varying").unwrap().id, "varchar");
        assert_eq!(lookup_generic_type("int").unwrap().id, "integer");
        assert_eq!(lookup_generic_type("bool").unwrap().id, "boolean");
        assert!(lookup_generic_type("geometry_collection_z").is_none());
    }

    #[test]
    fn test_type_args_kind() {
        assert_eq!(type_args_kind("varchar"), TypeArgsKind::Length);
        assert_eq!(type_args_kind("numeric"), TypeArgsKind::PrecisionScale);
        assert_eq!(type_args_kind("integer"), TypeArgsKind::None);
    }
}
