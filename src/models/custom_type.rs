//! User-defined types (PostgreSQL enums and composites)

use super::enums::CustomTypeKind;
use super::generate_id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DBCustomTypeField {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DBCustomType {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    pub kind: CustomTypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<DBCustomTypeField>>,
}

impl DBCustomType {
    pub fn new_enum(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: generate_id(),
            schema: None,
            name: name.into(),
            kind: CustomTypeKind::Enum,
            values: Some(values),
            fields: None,
        }
    }

    pub fn new_composite(name: impl Into<String>, fields: Vec<DBCustomTypeField>) -> Self {
        Self {
            id: generate_id(),
            schema: None,
            name: name.into(),
            kind: CustomTypeKind::Composite,
            values: None,
            fields: Some(fields),
        }
    }
}
