//! Diagram model: the dialect-neutral schema produced by import and consumed by export

use super::custom_type::DBCustomType;
use super::enums::DatabaseType;
use super::generate_id;
use super::relationship::DBRelationship;
use super::table::DBTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete schema diagram
///
/// Owned by the caller. Export never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub name: String,
    pub database_type: DatabaseType,
    #[serde(default)]
    pub tables: Vec<DBTable>,
    #[serde(default)]
    pub relationships: Vec<DBRelationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_types: Option<Vec<DBCustomType>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    pub fn new(name: impl Into<String>, database_type: DatabaseType) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            database_type,
            tables: Vec::new(),
            relationships: Vec::new(),
            custom_types: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn table_by_id(&self, table_id: &str) -> Option<&DBTable> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    /// Exact `(name, schema)` lookup
    pub fn table_by_name(&self, name: &str, schema: Option<&str>) -> Option<&DBTable> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema.as_deref() == schema)
    }

    pub fn custom_types(&self) -> &[DBCustomType] {
        self.custom_types.as_deref().unwrap_or(&[])
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DBField, DataType};

    #[test]
    fn test_diagram_json_shape() {
        let mut diagram = Diagram::new("SQL Import (postgresql)", DatabaseType::Postgresql);
        diagram
            .tables
            .push(DBTable::new("users", vec![DBField::new("id", DataType::new("integer"))]));

        let json = diagram.to_json().unwrap();
        assert!(json.contains("\"databaseType\": \"postgresql\""));
        assert!(!json.contains("customTypes"));

        let parsed = Diagram::from_json(&json).unwrap();
        assert_eq!(parsed.tables[0].name, "users");
        assert!(parsed.table_by_name("users", None).is_some());
    }
}
