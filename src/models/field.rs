//! Field (column) model for diagram tables

use super::data_type::DataType;
use super::{generate_id, now_millis};
use serde::{Deserialize, Serialize};

/// A column of a diagram table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DBField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_array: Option<bool>,
    pub created_at: i64,
    /// Character length; a string so SQL Server `max` survives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_maximum_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Value refreshed on every row update (MySQL `ON UPDATE CURRENT_TIMESTAMP`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl DBField {
    /// Create a nullable, non-key field with a fresh id
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            nullable: true,
            increment: None,
            is_array: None,
            created_at: now_millis(),
            character_maximum_length: None,
            precision: None,
            scale: None,
            default: None,
            collation: None,
            comments: None,
            on_update: None,
        }
    }

    pub fn is_increment(&self) -> bool {
        self.increment.unwrap_or(false)
    }

    pub fn is_array(&self) -> bool {
        self.is_array.unwrap_or(false)
    }

    /// Primary-key columns count as unique for cardinality purposes
    pub fn is_unique_key(&self) -> bool {
        self.primary_key || self.unique
    }
}
