//! Intermediate parse model shared by every dialect adapter
//!
//! Adapters and the dump extractor fill a [`SQLParserResult`]; the diagram
//! converter turns it into a [`crate::models::Diagram`].

use crate::models::CustomTypeKind;
use serde::{Deserialize, Serialize};

/// Size arguments pulled out of a raw type (`varchar(255)`, `numeric(10, 2)`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeArgs {
    /// Character length; `"max"` is kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

impl TypeArgs {
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.precision.is_none() && self.scale.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLColumn {
    pub name: String,
    /// Raw type text, possibly with size and array notation
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_args: Option<TypeArgs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    pub increment: bool,
    /// `ON UPDATE CURRENT_TIMESTAMP` refresh value (MySQL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

impl SQLColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
            unique: false,
            type_args: None,
            default: None,
            comment: None,
            collation: None,
            increment: false,
            on_update: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLIndex {
    /// Empty when declared without a name
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
    pub is_primary_key: bool,
}

impl SQLIndex {
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            unique,
            index_type: None,
            is_primary_key: false,
        }
    }

    /// Same column list, ignoring identifier case
    pub fn covers_same_columns(&self, columns: &[String]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLTable {
    /// Process-local id, used to wire foreign keys before conversion
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub columns: Vec<SQLColumn>,
    pub indexes: Vec<SQLIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub is_view: bool,
    pub is_materialized_view: bool,
    pub order: usize,
}

impl SQLTable {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            schema,
            columns: Vec::new(),
            indexes: Vec::new(),
            comment: None,
            is_view: false,
            is_materialized_view: false,
            order: 0,
        }
    }

    pub fn column(&self, name: &str) -> Option<&SQLColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut SQLColumn> {
        let position = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name)))?;
        self.columns.get_mut(position)
    }

    pub fn primary_key_columns(&self) -> Vec<String> {
        if let Some(index) = self.indexes.iter().find(|i| i.is_primary_key) {
            return index.columns.clone();
        }
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// One column pair of a foreign key
///
/// `source_*` is the referencing table (the one holding the column),
/// `target_*` the referenced table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLForeignKey {
    pub name: String,
    pub source_table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_schema: Option<String>,
    pub source_table_id: String,
    pub source_column: String,
    pub target_table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
    pub target_table_id: String,
    pub target_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLCustomType {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub kind: CustomTypeKind,
    #[serde(default)]
    pub values: Vec<String>,
    /// `(field, type)` pairs of a composite type
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

/// Everything extracted from one SQL script
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SQLParserResult {
    pub tables: Vec<SQLTable>,
    pub relationships: Vec<SQLForeignKey>,
    pub types: Vec<SQLCustomType>,
    pub warnings: Vec<String>,
}

impl SQLParserResult {
    pub fn table_by_id(&self, id: &str) -> Option<&SQLTable> {
        self.tables.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_columns_prefers_index() {
        let mut table = SQLTable::new("t", None);
        let mut a = SQLColumn::new("a", "int");
        a.primary_key = true;
        table.columns.push(a);
        table.columns.push(SQLColumn::new("b", "int"));
        assert_eq!(table.primary_key_columns(), vec!["a".to_string()]);

        let mut pk = SQLIndex::new("pk_t", vec!["a".to_string(), "b".to_string()], true);
        pk.is_primary_key = true;
        table.indexes.push(pk);
        assert_eq!(table.primary_key_columns().len(), 2);
    }

    #[test]
    fn test_column_lookup_is_case_insensitive_fallback() {
        let mut table = SQLTable::new("t", None);
        table.columns.push(SQLColumn::new("UserId", "int"));
        assert!(table.column("userid").is_some());
        assert!(table.column_mut("USERID").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_index_covers_same_columns() {
        let index = SQLIndex::new("", vec!["A".to_string(), "b".to_string()], false);
        assert!(index.covers_same_columns(&["a".to_string(), "B".to_string()]));
        assert!(!index.covers_same_columns(&["b".to_string(), "a".to_string()]));
    }
}
