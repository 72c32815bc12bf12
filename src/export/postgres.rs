//! PostgreSQL exporter

use super::DialectExporter;
use super::common::{
    RenderContext, create_table, exported_tables, foreign_key_block, join_sections,
    custom_type_schemas, schema_section, secondary_indexes, table_body, table_schemas,
};
use super::quote::{Quoter, string_literal};
use crate::models::{CustomTypeKind, DBCustomType, DatabaseType, Diagram};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static NEXTVAL_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)nextval\s*\(\s*'([^']+)'").expect("valid regex"));

/// Native PostgreSQL DDL: `SERIAL`, `CREATE TYPE`, `COMMENT ON`
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresExporter;

/// `CREATE TYPE` for an enum or composite type
pub fn custom_type_statement(custom: &DBCustomType, quoter: &Quoter) -> String {
    let name = quoter.qualified(custom.schema.as_deref(), &custom.name);
    match custom.kind {
        CustomTypeKind::Enum => {
            let values = custom
                .values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|v| string_literal(v))
                .collect::<Vec<_>>();
            format!("CREATE TYPE {} AS ENUM ({});", name, values.join(", "))
        }
        CustomTypeKind::Composite => {
            let fields = custom
                .fields
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|f| format!("{} {}", quoter.ident(&f.field), f.field_type))
                .collect::<Vec<_>>();
            format!("CREATE TYPE {} AS ({});", name, fields.join(", "))
        }
    }
}

/// Sequence names referenced by `nextval()` defaults, as written
fn referenced_sequences(diagram: &Diagram) -> BTreeSet<String> {
    exported_tables(diagram)
        .flat_map(|t| t.fields.iter())
        .filter_map(|f| f.default.as_deref())
        .filter_map(|d| NEXTVAL_SEQUENCE.captures(d))
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn comment_statements(diagram: &Diagram, quoter: &Quoter) -> Vec<String> {
    let mut statements = Vec::new();
    for table in exported_tables(diagram) {
        let table_name = quoter.table(table);
        if let Some(comment) = table.comments.as_deref().filter(|c| !c.is_empty()) {
            statements.push(format!(
                "COMMENT ON TABLE {} IS {};",
                table_name,
                string_literal(comment)
            ));
        }
        for field in &table.fields {
            if let Some(comment) = field.comments.as_deref().filter(|c| !c.is_empty()) {
                statements.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {};",
                    table_name,
                    quoter.ident(&field.name),
                    string_literal(comment)
                ));
            }
        }
    }
    statements
}

impl DialectExporter for PostgresExporter {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgresql
    }

    fn export(&self, diagram: &Diagram, only_relationships: bool) -> String {
        if diagram.tables.is_empty() {
            return String::new();
        }
        let ctx = RenderContext::native(DatabaseType::Postgresql, diagram);
        let quoter = ctx.quoter;
        if only_relationships {
            return join_sections(vec![foreign_key_block(diagram, &quoter)]);
        }

        let mut schemas = table_schemas(diagram);
        schemas.extend(custom_type_schemas(diagram));
        let mut sections = vec![
            schema_section(schemas, &quoter),
            diagram
                .custom_types()
                .iter()
                .map(|t| custom_type_statement(t, &quoter))
                .collect::<Vec<_>>()
                .join("\n"),
            referenced_sequences(diagram)
                .iter()
                .map(|s| format!("CREATE SEQUENCE IF NOT EXISTS {};", s))
                .collect::<Vec<_>>()
                .join("\n"),
        ];
        for table in exported_tables(diagram) {
            let mut statements = vec![format!(
                "{};",
                create_table(table, &ctx, &table_body(table, &ctx, true))
            )];
            statements.extend(secondary_indexes(table, &ctx));
            sections.push(statements.join("\n"));
        }
        sections.push(comment_statements(diagram, &quoter).join("\n"));
        sections.push(foreign_key_block(diagram, &quoter));
        join_sections(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DBField, DBIndex, DBTable, DataType};

    fn users() -> DBTable {
        let mut id = DBField::new("id", DataType::new("integer"));
        id.primary_key = true;
        id.nullable = false;
        id.increment = Some(true);
        let mut email = DBField::new("email", DataType::new("varchar"));
        email.character_maximum_length = Some("255".to_string());
        email.unique = true;
        email.comments = Some("login name".to_string());
        let mut table = DBTable::new("users", vec![id, email]).with_schema("app");
        let pk = table.fields[0].id.clone();
        table.indexes.push(DBIndex::primary_key("", vec![pk]));
        table
    }

    #[test]
    fn test_native_table() {
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        diagram.tables.push(users());
        let sql = PostgresExporter.export(&diagram, false);
        assert!(sql.starts_with("CREATE SCHEMA IF NOT EXISTS \"app\";"));
        assert!(sql.contains(
            "CREATE TABLE \"app\".\"users\" (\n  \"id\" serial NOT NULL PRIMARY KEY,\n  \"email\" varchar(255) UNIQUE\n);"
        ));
        assert!(sql.contains("COMMENT ON COLUMN \"app\".\"users\".\"email\" IS 'login name';"));
        assert!(!sql.contains("CONSTRAINT"));
    }

    #[test]
    fn test_types_and_sequences() {
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        let mut table = users();
        table.fields[0].default = Some("nextval('app.users_id_seq'::regclass)".to_string());
        table.fields.push(DBField::new("mood", DataType::new("mood")));
        diagram.tables.push(table);
        diagram.custom_types = Some(vec![DBCustomType::new_enum(
            "mood",
            vec!["happy".to_string(), "sad".to_string()],
        )]);
        let sql = PostgresExporter.export(&diagram, false);
        assert!(sql.contains("CREATE TYPE \"mood\" AS ENUM ('happy', 'sad');"));
        assert!(sql.contains("CREATE SEQUENCE IF NOT EXISTS app.users_id_seq;"));
        assert!(sql.contains("DEFAULT nextval('app.users_id_seq'::regclass)"));
        assert!(sql.contains("\"mood\" \"mood\""));
    }

    #[test]
    fn test_empty_diagram() {
        let diagram = Diagram::new("d", DatabaseType::Postgresql);
        assert_eq!(PostgresExporter.export(&diagram, false), "");
    }
}
