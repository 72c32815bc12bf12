//! MySQL and MariaDB exporter

use super::DialectExporter;
use super::common::{
    RenderContext, create_table, exported_tables, foreign_key_block, join_sections,
    schema_section, secondary_indexes, table_body, table_schemas,
};
use super::quote::string_literal;
use crate::models::{DBTable, DatabaseType, Diagram};

/// Native MySQL DDL: `AUTO_INCREMENT`, inline `COMMENT`, InnoDB tables
#[derive(Debug, Clone, Copy)]
pub struct MySqlExporter {
    database_type: DatabaseType,
}

impl MySqlExporter {
    pub fn mysql() -> Self {
        Self {
            database_type: DatabaseType::Mysql,
        }
    }

    pub fn mariadb() -> Self {
        Self {
            database_type: DatabaseType::Mariadb,
        }
    }

    fn table_statement(&self, table: &DBTable, ctx: &RenderContext) -> String {
        let mut body = table_body(table, ctx, true);
        for (line, field) in body.iter_mut().zip(&table.fields) {
            if let Some(comment) = field.comments.as_deref().filter(|c| !c.is_empty()) {
                line.push_str(" COMMENT ");
                line.push_str(&string_literal(comment));
            }
        }
        let mut statement = format!("{} ENGINE=InnoDB", create_table(table, ctx, &body));
        if let Some(comment) = table.comments.as_deref().filter(|c| !c.is_empty()) {
            statement.push_str(" COMMENT=");
            statement.push_str(&string_literal(comment));
        }
        statement.push(';');
        statement
    }
}

impl Default for MySqlExporter {
    fn default() -> Self {
        Self::mysql()
    }
}

impl DialectExporter for MySqlExporter {
    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn export(&self, diagram: &Diagram, only_relationships: bool) -> String {
        if diagram.tables.is_empty() {
            return String::new();
        }
        let ctx = RenderContext::native(self.database_type, diagram);
        if only_relationships {
            return join_sections(vec![foreign_key_block(diagram, &ctx.quoter)]);
        }

        let mut sections = vec![schema_section(table_schemas(diagram), &ctx.quoter)];
        for table in exported_tables(diagram) {
            let mut statements = vec![self.table_statement(table, &ctx)];
            statements.extend(secondary_indexes(table, &ctx));
            sections.push(statements.join("\n"));
        }
        sections.push(foreign_key_block(diagram, &ctx.quoter));
        join_sections(sections)
    }
}
