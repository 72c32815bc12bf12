//! Relationship model for the SDK

use super::enums::Cardinality;
use super::{generate_id, now_millis};
use serde::{Deserialize, Serialize};

/// A foreign-key link between two diagram fields
///
/// The `one` side of a one-to-many link is the referenced table; exporters
/// place the `FOREIGN KEY` constraint on the `many` side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DBRelationship {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_schema: Option<String>,
    pub source_table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
    pub target_table_id: String,
    pub source_field_id: String,
    pub target_field_id: String,
    pub source_cardinality: Cardinality,
    pub target_cardinality: Cardinality,
    pub created_at: i64,
}

impl DBRelationship {
    pub fn new(
        name: impl Into<String>,
        source_table_id: impl Into<String>,
        source_field_id: impl Into<String>,
        target_table_id: impl Into<String>,
        target_field_id: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            source_schema: None,
            source_table_id: source_table_id.into(),
            target_schema: None,
            target_table_id: target_table_id.into(),
            source_field_id: source_field_id.into(),
            target_field_id: target_field_id.into(),
            source_cardinality: Cardinality::One,
            target_cardinality: Cardinality::Many,
            created_at: now_millis(),
        }
    }

    pub fn with_cardinality(mut self, source: Cardinality, target: Cardinality) -> Self {
        self.source_cardinality = source;
        self.target_cardinality = target;
        self
    }

    pub fn is_many_to_many(&self) -> bool {
        self.source_cardinality == Cardinality::Many && self.target_cardinality == Cardinality::Many
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_defaults_to_one_to_many() {
        let rel = DBRelationship::new("fk", "t1", "f1", "t2", "f2");
        assert_eq!(rel.source_cardinality, Cardinality::One);
        assert_eq!(rel.target_cardinality, Cardinality::Many);
        assert!(!rel.is_many_to_many());

        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["sourceCardinality"], "one");
        assert_eq!(json["targetFieldId"], "f2");
    }
}
