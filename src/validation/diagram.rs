//! Diagram integrity checks
//!
//! Every field id referenced by an index or relationship must exist in the
//! owning table, and every relationship must point at existing tables.
//! Offending items are dropped and reported.

use super::tables::TableValidator;
use crate::models::Diagram;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Drop dangling indexes and relationships; returns one message per drop
/// plus naming-conflict reports
pub fn validate_diagram(diagram: &mut Diagram) -> Vec<String> {
    let mut issues = Vec::new();

    for table in &mut diagram.tables {
        let field_ids: HashSet<&str> = table.fields.iter().map(|f| f.id.as_str()).collect();
        let mut dropped = Vec::new();
        table.indexes.retain(|index| {
            let valid = !index.field_ids.is_empty()
                && index.field_ids.iter().all(|id| field_ids.contains(id.as_str()));
            if !valid {
                dropped.push(index.name.clone());
            }
            valid
        });
        for name in dropped {
            issues.push(format!(
                "Index {} on {} dropped: it references a missing field",
                name, table.name
            ));
        }
    }

    let fields_by_table: HashMap<&str, HashSet<&str>> = diagram
        .tables
        .iter()
        .map(|t| {
            (
                t.id.as_str(),
                t.fields.iter().map(|f| f.id.as_str()).collect(),
            )
        })
        .collect();
    let mut kept = Vec::with_capacity(diagram.relationships.len());
    for relationship in diagram.relationships.drain(..) {
        let source_ok = fields_by_table
            .get(relationship.source_table_id.as_str())
            .is_some_and(|f| f.contains(relationship.source_field_id.as_str()));
        let target_ok = fields_by_table
            .get(relationship.target_table_id.as_str())
            .is_some_and(|f| f.contains(relationship.target_field_id.as_str()));
        if source_ok && target_ok {
            kept.push(relationship);
        } else {
            issues.push(format!(
                "Relationship {} dropped: it references a missing table or field",
                relationship.name
            ));
        }
    }
    diagram.relationships = kept;

    let validator = TableValidator::new();
    for conflict in validator.detect_naming_conflicts(&diagram.tables) {
        issues.push(format!(
            "Table {} duplicates table {}",
            conflict.table_name, conflict.existing_table_name
        ));
    }
    for table in &diagram.tables {
        for name in validator.duplicate_field_names(table) {
            issues.push(format!("Field {} appears more than once in {}", name, table.name));
        }
    }

    for issue in &issues {
        warn!("{}", issue);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DBField, DBIndex, DBRelationship, DBTable, DataType, DatabaseType};

    #[test]
    fn test_dangling_references_are_dropped() {
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        let id = DBField::new("id", DataType::new("integer"));
        let mut users = DBTable::new("users", vec![id.clone()]);
        users.indexes.push(DBIndex::new("ok", vec![id.id.clone()], false));
        users.indexes.push(DBIndex::new("stale", vec!["missing".to_string()], false));
        let users_id = users.id.clone();
        diagram.tables.push(users);
        diagram
            .relationships
            .push(DBRelationship::new("fk_ok", &users_id, &id.id, &users_id, &id.id));
        diagram
            .relationships
            .push(DBRelationship::new("fk_gone", "nope", "x", &users_id, &id.id));

        let issues = validate_diagram(&mut diagram);
        assert_eq!(issues.len(), 2);
        assert_eq!(diagram.tables[0].indexes.len(), 1);
        assert_eq!(diagram.relationships.len(), 1);
        assert_eq!(diagram.relationships[0].name, "fk_ok");
    }

    #[test]
    fn test_clean_diagram_has_no_issues() {
        let mut diagram = Diagram::new("d", DatabaseType::Sqlite);
        diagram
            .tables
            .push(DBTable::new("t", vec![DBField::new("a", DataType::varchar())]));
        assert!(validate_diagram(&mut diagram).is_empty());
    }
}
