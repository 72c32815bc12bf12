//! Table validation functionality
//!
//! Validates tables for naming conflicts.

use crate::models::DBTable;
use std::collections::HashMap;

/// Naming conflict between two tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConflict {
    pub table_id: String,
    pub table_name: String,
    pub existing_table_id: String,
    pub existing_table_name: String,
}

/// Table validator
#[derive(Debug, Default)]
pub struct TableValidator;

impl TableValidator {
    /// Create a new table validator
    pub fn new() -> Self {
        Self
    }

    /// Detect tables sharing a `(schema, name)` key, ignoring case
    ///
    /// Every table after the first with a given key is reported once.
    pub fn detect_naming_conflicts(&self, tables: &[DBTable]) -> Vec<NamingConflict> {
        let mut seen: HashMap<(String, String), &DBTable> = HashMap::new();
        let mut conflicts = Vec::new();
        for table in tables {
            let key = (
                table.schema.clone().unwrap_or_default().to_lowercase(),
                table.name.to_lowercase(),
            );
            match seen.get(&key) {
                Some(existing) => conflicts.push(NamingConflict {
                    table_id: table.id.clone(),
                    table_name: table.name.clone(),
                    existing_table_id: existing.id.clone(),
                    existing_table_name: existing.name.clone(),
                }),
                None => {
                    seen.insert(key, table);
                }
            }
        }
        conflicts
    }

    /// Field names repeated inside one table, ignoring case
    pub fn duplicate_field_names(&self, table: &DBTable) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        table
            .fields
            .iter()
            .filter(|f| !seen.insert(f.name.to_lowercase()))
            .map(|f| f.name.clone())
            .collect()
    }
}
