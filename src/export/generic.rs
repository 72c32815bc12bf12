//! Conservative cross-dialect renderer
//!
//! Used whenever the diagram's dialect differs from the target, for generic
//! output, and for the DBML flow. It sticks to portable forms: standard
//! identity columns, table-level primary keys, no comments.

use super::common::{
    RenderContext, create_table, custom_type_schemas, exported_tables, foreign_key_block,
    foreign_keys, join_sections, schema_section, secondary_indexes, table_body, table_schemas,
};
use super::postgres::custom_type_statement;
use super::quote::Quoter;
use super::sqlite::commented_foreign_keys;
use crate::models::{DBTable, DatabaseType, Diagram};
use crate::validation::RelationshipValidator;

#[derive(Debug, Clone, Copy)]
pub struct GenericExporter {
    target: DatabaseType,
    quote_all: bool,
}

impl GenericExporter {
    /// `dbml_flow` quotes every identifier
    pub fn new(target: DatabaseType, dbml_flow: bool) -> Self {
        Self {
            target,
            quote_all: dbml_flow,
        }
    }

    fn writes_custom_types(&self) -> bool {
        matches!(self.target, DatabaseType::Postgresql | DatabaseType::Generic)
    }

    fn custom_type_section(&self, diagram: &Diagram, quoter: &Quoter) -> String {
        if !self.writes_custom_types() {
            return String::new();
        }
        diagram
            .custom_types()
            .iter()
            .map(|t| custom_type_statement(t, quoter))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render `diagram` for the target
    ///
    /// Run [`super::alignment::align_foreign_key_types`] first; this renderer
    /// writes field types as they are.
    pub fn export(&self, diagram: &Diagram, only_relationships: bool) -> String {
        if diagram.tables.is_empty() {
            return String::new();
        }
        let quoter = Quoter::new(self.target, self.quote_all);
        let ctx = RenderContext::portable(self.target, quoter, diagram);
        let inline_keys = self.target == DatabaseType::Sqlite;
        if only_relationships {
            return if inline_keys {
                commented_foreign_keys(diagram, &quoter)
            } else {
                join_sections(vec![foreign_key_block(diagram, &quoter)])
            };
        }

        let keys = foreign_keys(diagram);
        let tables: Vec<&DBTable> = if inline_keys {
            RelationshipValidator::new()
                .dependency_order(diagram)
                .into_iter()
                .filter(|t| !t.is_view)
                .collect()
        } else {
            exported_tables(diagram).collect()
        };

        let mut schemas = table_schemas(diagram);
        if self.writes_custom_types() {
            schemas.extend(custom_type_schemas(diagram));
        }
        let mut sections = vec![
            schema_section(schemas, &quoter),
            self.custom_type_section(diagram, &quoter),
        ];
        for table in tables {
            let mut body = table_body(table, &ctx, false);
            if inline_keys {
                body.extend(
                    keys.iter()
                        .filter(|fk| fk.holder.id == table.id)
                        .map(|fk| fk.clause(&quoter, false)),
                );
            }
            let mut statements = vec![format!("{};", create_table(table, &ctx, &body))];
            statements.extend(secondary_indexes(table, &ctx));
            sections.push(statements.join("\n"));
        }
        if !inline_keys {
            sections.push(foreign_key_block(diagram, &quoter));
        }
        join_sections(sections)
    }
}
