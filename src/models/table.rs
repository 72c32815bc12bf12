//! Table model for the SDK

use super::field::DBField;
use super::index::DBIndex;
use super::{generate_id, now_millis};
use serde::{Deserialize, Serialize};

/// A table (or view) placed on the diagram canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DBTable {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub x: f64,
    pub y: f64,
    pub fields: Vec<DBField>,
    #[serde(default)]
    pub indexes: Vec<DBIndex>,
    pub color: String,
    #[serde(default)]
    pub is_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_materialized_view: Option<bool>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl DBTable {
    pub fn new(name: impl Into<String>, fields: Vec<DBField>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            schema: None,
            x: 0.0,
            y: 0.0,
            fields,
            indexes: Vec::new(),
            color: "#8eb7ff".to_string(),
            is_view: false,
            is_materialized_view: None,
            created_at: now_millis(),
            width: None,
            comments: None,
            order: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn field_by_id(&self, field_id: &str) -> Option<&DBField> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Case-sensitive lookup first, then case-insensitive
    pub fn field_by_name(&self, name: &str) -> Option<&DBField> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    pub fn primary_key_fields(&self) -> Vec<&DBField> {
        self.fields.iter().filter(|f| f.primary_key).collect()
    }

    /// The index flagged `isPrimaryKey`, if any
    pub fn primary_key_index(&self) -> Option<&DBIndex> {
        self.indexes.iter().find(|i| i.is_primary_key())
    }

    /// `schema.name` when a schema is set, else `name`
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) if !schema.is_empty() => format!("{}.{}", schema, self.name),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;

    #[test]
    fn test_table_lookup_helpers() {
        let mut id = DBField::new("id", DataType::new("integer"));
        id.primary_key = true;
        let name = DBField::new("Name", DataType::varchar());
        let table = DBTable::new("users", vec![id.clone(), name]).with_schema("public");

        assert_eq!(table.qualified_name(), "public.users");
        assert_eq!(table.field_by_id(&id.id).map(|f| f.name.as_str()), Some("id"));
        assert!(table.field_by_name("name").is_some());
        assert_eq!(table.primary_key_fields().len(), 1);
        assert!(table.primary_key_index().is_none());
    }

    #[test]
    fn test_table_serializes_camel_case() {
        let table = DBTable::new("t", vec![]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["isView"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("schema").is_none());
    }
}
