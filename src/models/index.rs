//! Index model

use super::{generate_id, now_millis};
use serde::{Deserialize, Serialize};

/// Index over one or more fields of a table
///
/// An empty `name` means the index was declared without a name; exporters
/// then never emit a `CONSTRAINT` clause for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DBIndex {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    pub field_ids: Vec<String>,
    pub created_at: i64,
    /// Access method hint (`btree`, `gin`, `hash`, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary_key: Option<bool>,
}

impl DBIndex {
    pub fn new(name: impl Into<String>, field_ids: Vec<String>, unique: bool) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            unique,
            field_ids,
            created_at: now_millis(),
            index_type: None,
            is_primary_key: None,
        }
    }

    /// Unique index flagged as the table's primary key
    pub fn primary_key(name: impl Into<String>, field_ids: Vec<String>) -> Self {
        let mut index = Self::new(name, field_ids, true);
        index.is_primary_key = Some(true);
        index
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key.unwrap_or(false)
    }
}
