//! Foreign-key type alignment
//!
//! A key column narrower than the column it references (an `integer` holding
//! a `bigint` id) produces DDL some databases reject and others silently
//! truncate. Both sides of every relationship are widened to the larger
//! numeric type before the generic renderer runs.

use crate::models::{DBField, DataType, Diagram};
use std::collections::HashMap;
use tracing::debug;

/// Storage rank of the numeric types alignment understands
pub fn numeric_type_size(type_id: &str) -> Option<u8> {
    match type_id {
        "tinyint" => Some(1),
        "smallint" => Some(2),
        "mediumint" => Some(3),
        "int" | "integer" => Some(4),
        "bigint" => Some(8),
        "decimal" | "numeric" => Some(16),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldType {
    data_type: DataType,
    precision: Option<u32>,
    scale: Option<u32>,
}

impl FieldType {
    fn of(field: &DBField) -> Self {
        Self {
            data_type: field.data_type.clone(),
            precision: field.precision,
            scale: field.scale,
        }
    }

    fn size(&self) -> Option<u8> {
        numeric_type_size(&self.data_type.id)
    }
}

/// Copy of `diagram` with both sides of each relationship widened to the
/// larger numeric type
///
/// Widening repeats until nothing changes, so chains of keys
/// (`a.x -> b.y -> c.z`) settle on their widest member. `diagram` is not
/// modified.
pub fn align_foreign_key_types(diagram: &Diagram) -> Diagram {
    let mut types: HashMap<&str, FieldType> = diagram
        .tables
        .iter()
        .flat_map(|t| t.fields.iter())
        .map(|f| (f.id.as_str(), FieldType::of(f)))
        .collect();

    let mut changed = true;
    let mut passes = 0;
    while changed && passes <= diagram.relationships.len() {
        changed = false;
        passes += 1;
        for relationship in &diagram.relationships {
            let (Some(source), Some(target)) = (
                types.get(relationship.source_field_id.as_str()),
                types.get(relationship.target_field_id.as_str()),
            ) else {
                continue;
            };
            let (Some(source_size), Some(target_size)) = (source.size(), target.size()) else {
                continue;
            };
            let (narrow_id, wide) = if source_size < target_size {
                (relationship.source_field_id.as_str(), target.clone())
            } else if target_size < source_size {
                (relationship.target_field_id.as_str(), source.clone())
            } else {
                continue;
            };
            debug!(
                field_id = narrow_id,
                widened_to = %wide.data_type.id,
                relationship = %relationship.name,
                "aligning foreign key type"
            );
            types.insert(narrow_id, wide);
            changed = true;
        }
    }

    let mut aligned = diagram.clone();
    for field in aligned.tables.iter_mut().flat_map(|t| t.fields.iter_mut()) {
        if let Some(field_type) = types.get(field.id.as_str())
            && *field_type != FieldType::of(field)
        {
            field.data_type = field_type.data_type.clone();
            field.precision = field_type.precision;
            field.scale = field_type.scale;
        }
    }
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DBRelationship, DBTable, DatabaseType};

    fn diagram_with_key(referenced_type: &str, holder_type: &str) -> Diagram {
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        let users = DBTable::new("users", vec![DBField::new("id", DataType::new(referenced_type))]);
        let orders = DBTable::new(
            "orders",
            vec![DBField::new("user_id", DataType::new(holder_type))],
        );
        diagram.relationships.push(DBRelationship::new(
            "fk_orders_user",
            &users.id,
            &users.fields[0].id,
            &orders.id,
            &orders.fields[0].id,
        ));
        diagram.tables = vec![users, orders];
        diagram
    }

    #[test]
    fn test_narrow_side_is_widened() {
        let diagram = diagram_with_key("bigint", "integer");
        let aligned = align_foreign_key_types(&diagram);
        assert_eq!(aligned.tables[1].fields[0].data_type.id, "bigint");
        // the input is untouched
        assert_eq!(diagram.tables[1].fields[0].data_type.id, "integer");
    }

    #[test]
    fn test_decimal_wins_with_precision() {
        let mut diagram = diagram_with_key("integer", "decimal");
        diagram.tables[1].fields[0].precision = Some(12);
        let aligned = align_foreign_key_types(&diagram);
        let id = &aligned.tables[0].fields[0];
        assert_eq!(id.data_type.id, "decimal");
        assert_eq!(id.precision, Some(12));
    }

    #[test]
    fn test_non_numeric_sides_are_left_alone() {
        let diagram = diagram_with_key("uuid", "integer");
        let aligned = align_foreign_key_types(&diagram);
        assert_eq!(aligned.tables[0].fields[0].data_type.id, "uuid");
        assert_eq!(aligned.tables[1].fields[0].data_type.id, "integer");
    }

    #[test]
    fn test_chains_settle_on_widest() {
        let mut diagram = diagram_with_key("smallint", "integer");
        let audit = DBTable::new("audit", vec![DBField::new("order_ref", DataType::new("bigint"))]);
        diagram.relationships.push(DBRelationship::new(
            "fk_audit_order",
            &diagram.tables[1].id,
            &diagram.tables[1].fields[0].id,
            &audit.id,
            &audit.fields[0].id,
        ));
        diagram.tables.push(audit);
        let aligned = align_foreign_key_types(&diagram);
        assert!(aligned.tables.iter().all(|t| t.fields[0].data_type.id == "bigint"));
    }

    #[test]
    fn test_size_table() {
        assert_eq!(numeric_type_size("tinyint"), Some(1));
        assert_eq!(numeric_type_size("int"), Some(4));
        assert_eq!(numeric_type_size("numeric"), Some(16));
        assert_eq!(numeric_type_size("varchar"), None);
    }
}
