//! SQL Server exporter

use super::DialectExporter;
use super::common::{
    RenderContext, create_table, exported_tables, foreign_key_block, join_sections,
    schema_section, secondary_indexes, table_body, table_schemas,
};
use crate::models::{DBTable, DatabaseType, Diagram};

/// Native T-SQL: `IDENTITY(1,1)`, bracket quoting, extended-property comments
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerExporter;

fn unicode_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

fn schema_of(table: &DBTable) -> &str {
    table
        .schema
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("dbo")
}

fn description_statements(table: &DBTable) -> Vec<String> {
    let mut statements = Vec::new();
    let level1 = format!(
        "@level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
        unicode_literal(schema_of(table)),
        unicode_literal(&table.name)
    );
    if let Some(comment) = table.comments.as_deref().filter(|c| !c.is_empty()) {
        statements.push(format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, {};",
            unicode_literal(comment),
            level1
        ));
    }
    for field in &table.fields {
        if let Some(comment) = field.comments.as_deref().filter(|c| !c.is_empty()) {
            statements.push(format!(
                "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, {}, @level2type = N'COLUMN', @level2name = {};",
                unicode_literal(comment),
                level1,
                unicode_literal(&field.name)
            ));
        }
    }
    statements
}

impl DialectExporter for SqlServerExporter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SqlServer
    }

    fn export(&self, diagram: &Diagram, only_relationships: bool) -> String {
        if diagram.tables.is_empty() {
            return String::new();
        }
        let ctx = RenderContext::native(DatabaseType::SqlServer, diagram);
        if only_relationships {
            return join_sections(vec![foreign_key_block(diagram, &ctx.quoter)]);
        }

        let mut sections = vec![schema_section(table_schemas(diagram), &ctx.quoter)];
        for table in exported_tables(diagram) {
            let mut statements = vec![format!(
                "{};",
                create_table(table, &ctx, &table_body(table, &ctx, true))
            )];
            statements.extend(secondary_indexes(table, &ctx));
            statements.extend(description_statements(table));
            sections.push(statements.join("\n"));
        }
        sections.push(foreign_key_block(diagram, &ctx.quoter));
        join_sections(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DBField, DBIndex, DataType};

    fn orders() -> DBTable {
        let mut id = DBField::new("id", DataType::new("bigint"));
        id.primary_key = true;
        id.increment = Some(true);
        let mut placed = DBField::new("placed_at", DataType::new("timestamp"));
        placed.default = Some("(getdate())".to_string());
        placed.comments = Some("when the order was placed".to_string());
        let mut table = DBTable::new("orders", vec![id, placed]).with_schema("sales");
        let pk = table.fields[0].id.clone();
        table.indexes.push(DBIndex::primary_key("PK_orders", vec![pk]));
        table
    }

    #[test]
    fn test_native_table() {
        let mut diagram = Diagram::new("d", DatabaseType::SqlServer);
        diagram.tables.push(orders());
        let sql = SqlServerExporter.export(&diagram, false);
        assert!(sql.starts_with(
            "IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = N'sales')\n    EXEC('CREATE SCHEMA [sales]');"
        ));
        assert!(sql.contains("[id] bigint NOT NULL IDENTITY(1,1)"));
        assert!(sql.contains("[placed_at] datetime2 DEFAULT getdate()"));
        assert!(sql.contains("CONSTRAINT [PK_orders] PRIMARY KEY ([id])"));
        assert!(sql.contains("@value = N'when the order was placed'"));
        assert!(sql.contains("@level2name = N'placed_at'"));
    }

    #[test]
    fn test_dbo_needs_no_schema() {
        let mut diagram = Diagram::new("d", DatabaseType::SqlServer);
        diagram.tables.push(orders().with_schema("dbo"));
        let sql = SqlServerExporter.export(&diagram, false);
        assert!(!sql.contains("sys.schemas"));
        assert!(sql.starts_with("CREATE TABLE [dbo].[orders]"));
    }
}
