//! SQLite exporter
//!
//! SQLite cannot add a foreign key to an existing table, so keys are written
//! inside `CREATE TABLE` and tables are ordered so referenced tables come
//! first.

use super::DialectExporter;
use super::common::{
    RenderContext, create_table, foreign_keys, join_sections, secondary_indexes, table_body,
};
use super::quote::Quoter;
use crate::models::{DBTable, DatabaseType, Diagram};
use crate::validation::RelationshipValidator;

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteExporter;

fn comment_lines(table: &DBTable) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(comment) = table.comments.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("-- {}: {}", table.name, comment.replace('\n', " ")));
    }
    for field in &table.fields {
        if let Some(comment) = field.comments.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!(
                "-- {}.{}: {}",
                table.name,
                field.name,
                comment.replace('\n', " ")
            ));
        }
    }
    lines
}

/// The foreign-key block as comments, for scripts run against existing tables
pub fn commented_foreign_keys(diagram: &Diagram, quoter: &Quoter) -> String {
    let keys = foreign_keys(diagram);
    if keys.is_empty() {
        return String::new();
    }
    let mut lines = vec!["-- SQLite cannot add foreign keys to existing tables".to_string()];
    lines.extend(keys.iter().map(|fk| format!("-- {}", fk.alter_statement(quoter))));
    join_sections(vec![lines.join("\n")])
}

impl DialectExporter for SqliteExporter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn export(&self, diagram: &Diagram, only_relationships: bool) -> String {
        if diagram.tables.is_empty() {
            return String::new();
        }
        let ctx = RenderContext::native(DatabaseType::Sqlite, diagram);
        if only_relationships {
            return commented_foreign_keys(diagram, &ctx.quoter);
        }
        let keys = foreign_keys(diagram);

        let mut sections = Vec::new();
        for table in RelationshipValidator::new()
            .dependency_order(diagram)
            .into_iter()
            .filter(|t| !t.is_view)
        {
            let mut body = table_body(table, &ctx, true);
            body.extend(
                keys.iter()
                    .filter(|fk| fk.holder.id == table.id)
                    .map(|fk| fk.clause(&ctx.quoter, false)),
            );
            let mut statements = comment_lines(table);
            statements.push(format!("{};", create_table(table, &ctx, &body)));
            statements.extend(secondary_indexes(table, &ctx));
            sections.push(statements.join("\n"));
        }
        join_sections(sections)
    }
}
