//! Rendering shared by every exporter: columns, primary keys, secondary
//! indexes and foreign keys

use super::defaults::translate_default;
use super::quote::{Quoter, string_literal};
use super::types::{is_long_type, postgres_serial, render_type};
use crate::import::sql::engine::is_sequence_default;
use crate::models::{
    Cardinality, DBCustomType, DBField, DBIndex, DBRelationship, DBTable, DatabaseType, Diagram,
};
use std::collections::BTreeSet;
use tracing::debug;

/// SQL Server's limit on key columns per index
pub const SQLSERVER_MAX_INDEX_COLUMNS: usize = 32;
/// Key prefix MySQL needs on TEXT/BLOB columns
pub const MYSQL_INDEX_PREFIX: usize = 255;

/// Settings of one rendering run
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dialect: DatabaseType,
    pub quoter: Quoter,
    /// Per-dialect idiom (`SERIAL`, inline primary keys) instead of the
    /// portable forms
    pub native: bool,
    pub custom_types: &'a [DBCustomType],
}

impl<'a> RenderContext<'a> {
    pub fn native(dialect: DatabaseType, diagram: &'a Diagram) -> Self {
        Self {
            dialect,
            quoter: Quoter::strict(dialect),
            native: true,
            custom_types: diagram.custom_types(),
        }
    }

    pub fn portable(dialect: DatabaseType, quoter: Quoter, diagram: &'a Diagram) -> Self {
        Self {
            dialect,
            quoter,
            native: false,
            custom_types: diagram.custom_types(),
        }
    }

    /// PostgreSQL column fed by an explicit `nextval()` default
    pub fn uses_sequence_default(&self, field: &DBField) -> bool {
        self.native
            && self.dialect == DatabaseType::Postgresql
            && field.default.as_deref().is_some_and(is_sequence_default)
    }

    pub fn column_type(&self, field: &DBField) -> String {
        if self.native
            && self.dialect == DatabaseType::Postgresql
            && !self.uses_sequence_default(field)
            && let Some(serial) = postgres_serial(field)
        {
            return serial.to_string();
        }
        render_type(field, self.dialect, self.custom_types, &self.quoter)
    }

    /// Auto-increment clause, `None` when the type or the default carries it
    fn increment_clause(&self, field: &DBField, inline_primary_key: bool) -> Option<&'static str> {
        if !field.is_increment() {
            return None;
        }
        match self.dialect {
            DatabaseType::Postgresql
                if self.native
                    && (self.uses_sequence_default(field) || postgres_serial(field).is_some()) =>
            {
                None
            }
            DatabaseType::Mysql | DatabaseType::Mariadb => Some("AUTO_INCREMENT"),
            DatabaseType::SqlServer => Some("IDENTITY(1,1)"),
            // only valid on an INTEGER PRIMARY KEY column
            DatabaseType::Sqlite => (inline_primary_key && self.column_type(field) == "integer")
                .then_some("AUTOINCREMENT"),
            _ => Some("GENERATED BY DEFAULT AS IDENTITY"),
        }
    }

    /// `name type[ NOT NULL][ PRIMARY KEY][ UNIQUE][ increment][ DEFAULT x][ ON UPDATE y]`
    pub fn column_definition(&self, field: &DBField, inline_primary_key: bool) -> String {
        let mut definition = format!(
            "{} {}",
            self.quoter.ident(&field.name),
            self.column_type(field)
        );
        if !field.nullable || field.primary_key {
            definition.push_str(" NOT NULL");
        }
        if inline_primary_key {
            definition.push_str(" PRIMARY KEY");
        } else if field.unique && !field.primary_key {
            definition.push_str(" UNIQUE");
        }
        if let Some(increment) = self.increment_clause(field, inline_primary_key) {
            definition.push(' ');
            definition.push_str(increment);
        }
        // identity columns never also carry a default
        let keeps_default = !field.is_increment() || self.uses_sequence_default(field);
        if keeps_default
            && let Some(default) = field
                .default
                .as_deref()
                .and_then(|d| translate_default(d, &field.data_type.id, self.dialect))
        {
            definition.push_str(" DEFAULT ");
            definition.push_str(&default);
        }
        if self.dialect.is_mysql_family()
            && let Some(on_update) = field.on_update.as_deref()
        {
            definition.push_str(" ON UPDATE ");
            definition.push_str(on_update);
        }
        definition
    }
}

/// How a table's primary key is written
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryKeyLayout<'a> {
    None,
    /// `PRIMARY KEY` on the column itself
    Inline(&'a DBField),
    /// `[CONSTRAINT name] PRIMARY KEY (cols)` after the columns
    TableLevel {
        name: Option<&'a str>,
        fields: Vec<&'a DBField>,
    },
}

impl<'a> PrimaryKeyLayout<'a> {
    /// Inline only for a single key column whose index carried no name, and
    /// only when `allow_inline`
    pub fn of(table: &'a DBTable, allow_inline: bool) -> Self {
        let index = table.primary_key_index();
        let mut fields: Vec<&DBField> = index
            .map(|i| {
                i.field_ids
                    .iter()
                    .filter_map(|id| table.field_by_id(id))
                    .collect()
            })
            .unwrap_or_default();
        if fields.is_empty() {
            fields = table.primary_key_fields();
        }
        if fields.is_empty() {
            return PrimaryKeyLayout::None;
        }
        let name = index.map(|i| i.name.as_str()).filter(|n| !n.is_empty());
        if allow_inline && fields.len() == 1 && name.is_none() {
            return PrimaryKeyLayout::Inline(fields[0]);
        }
        PrimaryKeyLayout::TableLevel { name, fields }
    }

    pub fn is_inline(&self, field: &DBField) -> bool {
        matches!(self, PrimaryKeyLayout::Inline(f) if f.id == field.id)
    }

    pub fn field_ids(&self) -> BTreeSet<&'a str> {
        match self {
            PrimaryKeyLayout::None => BTreeSet::new(),
            PrimaryKeyLayout::Inline(field) => BTreeSet::from([field.id.as_str()]),
            PrimaryKeyLayout::TableLevel { fields, .. } => {
                fields.iter().map(|f| f.id.as_str()).collect()
            }
        }
    }

    /// Table-level constraint line, if this layout has one
    pub fn constraint(&self, quoter: &Quoter) -> Option<String> {
        let PrimaryKeyLayout::TableLevel { name, fields } = self else {
            return None;
        };
        let columns = quoter.column_list(fields.iter().map(|f| f.name.as_str()));
        Some(match name {
            Some(name) => format!("CONSTRAINT {} PRIMARY KEY ({})", quoter.ident(name), columns),
            None => format!("PRIMARY KEY ({})", columns),
        })
    }
}

/// Column lines plus the primary key line of a `CREATE TABLE` body
pub fn table_body(table: &DBTable, ctx: &RenderContext, allow_inline: bool) -> Vec<String> {
    let layout = PrimaryKeyLayout::of(table, allow_inline);
    let mut lines: Vec<String> = table
        .fields
        .iter()
        .map(|f| ctx.column_definition(f, layout.is_inline(f)))
        .collect();
    if let Some(constraint) = layout.constraint(&ctx.quoter) {
        lines.push(constraint);
    }
    lines
}

/// `CREATE TABLE name (\n  body\n)` without the terminator
pub fn create_table(table: &DBTable, ctx: &RenderContext, body: &[String]) -> String {
    format!(
        "CREATE TABLE {} (\n  {}\n)",
        ctx.quoter.table(table),
        body.join(",\n  ")
    )
}

fn index_name(table: &DBTable, index: &DBIndex, fields: &[&DBField]) -> String {
    if !index.name.is_empty() {
        return index.name.clone();
    }
    let columns = fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
    format!("idx_{}_{}", table.name, columns.join("_"))
}

/// `CREATE [UNIQUE] INDEX` statements for every secondary index of `table`
///
/// Indexes covering exactly the primary key columns are skipped.
pub fn secondary_indexes(table: &DBTable, ctx: &RenderContext) -> Vec<String> {
    let primary_key = PrimaryKeyLayout::of(table, false).field_ids();
    let mut statements = Vec::new();
    for index in table.indexes.iter().filter(|i| !i.is_primary_key()) {
        let mut fields: Vec<&DBField> = index
            .field_ids
            .iter()
            .filter_map(|id| table.field_by_id(id))
            .collect();
        if fields.is_empty() {
            continue;
        }
        let ids: BTreeSet<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        if ids == primary_key {
            debug!(table = %table.name, index = %index.name, "index duplicates primary key");
            continue;
        }

        let name = index_name(table, index, &fields);
        if ctx.dialect == DatabaseType::SqlServer && fields.len() > SQLSERVER_MAX_INDEX_COLUMNS {
            statements.push(format!(
                "-- Warning: index {} has {} columns; SQL Server allows {}, the rest were dropped",
                name,
                fields.len(),
                SQLSERVER_MAX_INDEX_COLUMNS
            ));
            fields.truncate(SQLSERVER_MAX_INDEX_COLUMNS);
        }

        let columns = fields
            .iter()
            .map(|f| {
                let column = ctx.quoter.ident(&f.name);
                if ctx.dialect.is_mysql_family() && is_long_type(&ctx.column_type(f)) {
                    format!("{}({})", column, MYSQL_INDEX_PREFIX)
                } else {
                    column
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let using = match (&index.index_type, ctx.dialect) {
            (Some(kind), DatabaseType::Postgresql) if ctx.native => format!(" USING {}", kind),
            _ => String::new(),
        };
        statements.push(format!(
            "CREATE {}INDEX {} ON {}{} ({});",
            if index.unique { "UNIQUE " } else { "" },
            ctx.quoter.ident(&name),
            ctx.quoter.table(table),
            using,
            columns
        ));
    }
    statements
}

/// A relationship resolved to the table that holds the key
#[derive(Debug, Clone)]
pub struct ForeignKey<'a> {
    pub name: String,
    pub holder: &'a DBTable,
    pub holder_field: &'a DBField,
    pub referenced: &'a DBTable,
    pub referenced_field: &'a DBField,
}

/// Resolve `relationship` by cardinality
///
/// one→many puts the key on the target, many→one and one:one on the source.
/// many:many has no single holder and yields `None`, as do dangling ids.
pub fn resolve_foreign_key<'a>(
    diagram: &'a Diagram,
    relationship: &DBRelationship,
) -> Option<ForeignKey<'a>> {
    let (holder_table, holder_field, referenced_table, referenced_field) = match (
        relationship.source_cardinality,
        relationship.target_cardinality,
    ) {
        (Cardinality::One, Cardinality::Many) => (
            &relationship.target_table_id,
            &relationship.target_field_id,
            &relationship.source_table_id,
            &relationship.source_field_id,
        ),
        (Cardinality::Many, Cardinality::One) | (Cardinality::One, Cardinality::One) => (
            &relationship.source_table_id,
            &relationship.source_field_id,
            &relationship.target_table_id,
            &relationship.target_field_id,
        ),
        (Cardinality::Many, Cardinality::Many) => {
            debug!(relationship = %relationship.name, "many-to-many relationship has no foreign key");
            return None;
        }
    };
    let holder = diagram.table_by_id(holder_table)?;
    let referenced = diagram.table_by_id(referenced_table)?;
    let holder_field = holder.field_by_id(holder_field)?;
    let referenced_field = referenced.field_by_id(referenced_field)?;
    let name = if relationship.name.is_empty() {
        format!("fk_{}_{}", holder.name, holder_field.name)
    } else {
        relationship.name.clone()
    };
    Some(ForeignKey {
        name,
        holder,
        holder_field,
        referenced,
        referenced_field,
    })
}

/// Every resolvable foreign key, sorted by holder schema, holder table and name
pub fn foreign_keys(diagram: &Diagram) -> Vec<ForeignKey<'_>> {
    let mut keys: Vec<ForeignKey> = diagram
        .relationships
        .iter()
        .filter_map(|r| resolve_foreign_key(diagram, r))
        .filter(|fk| !fk.holder.is_view && !fk.referenced.is_view)
        .collect();
    keys.sort_by(|a, b| {
        (
            a.holder.schema.as_deref().unwrap_or_default(),
            a.holder.name.as_str(),
            a.name.as_str(),
        )
            .cmp(&(
                b.holder.schema.as_deref().unwrap_or_default(),
                b.holder.name.as_str(),
                b.name.as_str(),
            ))
    });
    keys
}

impl ForeignKey<'_> {
    /// `CONSTRAINT n FOREIGN KEY (c) REFERENCES t (c)`
    pub fn clause(&self, quoter: &Quoter, qualify_reference: bool) -> String {
        let referenced = if qualify_reference {
            quoter.table(self.referenced)
        } else {
            quoter.ident(&self.referenced.name)
        };
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quoter.ident(&self.name),
            quoter.column_list([self.holder_field.name.as_str()]),
            referenced,
            quoter.column_list([self.referenced_field.name.as_str()])
        )
    }

    pub fn alter_statement(&self, quoter: &Quoter) -> String {
        format!(
            "ALTER TABLE {} ADD {};",
            quoter.table(self.holder),
            self.clause(quoter, true)
        )
    }
}

/// `ALTER TABLE … ADD CONSTRAINT … FOREIGN KEY` block, one statement per line
pub fn foreign_key_block(diagram: &Diagram, quoter: &Quoter) -> String {
    foreign_keys(diagram)
        .iter()
        .map(|fk| fk.alter_statement(quoter))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Distinct non-empty schemas of the exported tables, sorted
pub fn table_schemas(diagram: &Diagram) -> BTreeSet<&str> {
    diagram
        .tables
        .iter()
        .filter(|t| !t.is_view)
        .filter_map(|t| t.schema.as_deref())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Distinct non-empty schemas of the diagram's custom types, sorted
pub fn custom_type_schemas(diagram: &Diagram) -> BTreeSet<&str> {
    diagram
        .custom_types()
        .iter()
        .filter_map(|t| t.schema.as_deref())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Statement creating `schema` if it is missing, in `quoter.dialect`'s idiom
///
/// MySQL schemas are databases; SQLite has none. SQL Server's `dbo` always
/// exists.
pub fn create_schema_statement(schema: &str, quoter: &Quoter) -> Option<String> {
    match quoter.dialect {
        DatabaseType::Sqlite => None,
        DatabaseType::Mysql | DatabaseType::Mariadb => Some(format!(
            "CREATE DATABASE IF NOT EXISTS {};",
            quoter.ident(schema)
        )),
        // CREATE SCHEMA has to be alone in its batch, hence EXEC
        DatabaseType::SqlServer if !schema.eq_ignore_ascii_case("dbo") => Some(format!(
            "IF NOT EXISTS (SELECT * FROM sys.schemas WHERE name = N{})\n    EXEC('CREATE SCHEMA {}');",
            string_literal(schema),
            quoter.ident(schema).replace('\'', "''")
        )),
        DatabaseType::SqlServer => None,
        _ => Some(format!("CREATE SCHEMA IF NOT EXISTS {};", quoter.ident(schema))),
    }
}

/// Schema creation section for `schemas`
pub fn schema_section<'a>(schemas: impl IntoIterator<Item = &'a str>, quoter: &Quoter) -> String {
    schemas
        .into_iter()
        .filter_map(|s| create_schema_statement(s, quoter))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tables that get a `CREATE TABLE`
pub fn exported_tables(diagram: &Diagram) -> impl Iterator<Item = &DBTable> {
    diagram.tables.iter().filter(|t| !t.is_view)
}

/// Join non-empty sections with a blank line, ending in a newline
pub fn join_sections(sections: Vec<String>) -> String {
    let sections: Vec<String> = sections.into_iter().filter(|s| !s.trim().is_empty()).collect();
    if sections.is_empty() {
        return String::new();
    }
    let mut sql = sections.join("\n\n");
    sql.push('\n');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;

    fn id_field() -> DBField {
        let mut id = DBField::new("id", DataType::new("integer"));
        id.primary_key = true;
        id.nullable = false;
        id
    }

    fn users_and_orders() -> Diagram {
        let mut diagram = Diagram::new("shop", DatabaseType::Postgresql);
        let mut users = DBTable::new("users", vec![id_field()]);
        users.indexes.push(DBIndex::primary_key("", vec![users.fields[0].id.clone()]));
        let mut orders = DBTable::new(
            "orders",
            vec![id_field(), DBField::new("user_id", DataType::new("integer"))],
        );
        orders.indexes.push(DBIndex::primary_key("", vec![orders.fields[0].id.clone()]));
        diagram.relationships.push(DBRelationship::new(
            "fk_orders_user",
            &users.id,
            &users.fields[0].id,
            &orders.id,
            &orders.fields[1].id,
        ));
        diagram.tables = vec![users, orders];
        diagram
    }

    #[test]
    fn test_primary_key_layouts() {
        let mut diagram = users_and_orders();
        let users = &diagram.tables[0];
        assert!(matches!(PrimaryKeyLayout::of(users, true), PrimaryKeyLayout::Inline(_)));
        let table_level = PrimaryKeyLayout::of(users, false);
        assert_eq!(
            table_level.constraint(&Quoter::strict(DatabaseType::Postgresql)).as_deref(),
            Some("PRIMARY KEY (\"id\")")
        );

        diagram.tables[0].indexes[0].name = "users_pkey".to_string();
        let named = PrimaryKeyLayout::of(&diagram.tables[0], true);
        assert_eq!(
            named.constraint(&Quoter::strict(DatabaseType::Postgresql)).as_deref(),
            Some("CONSTRAINT \"users_pkey\" PRIMARY KEY (\"id\")")
        );
    }

    #[test]
    fn test_column_definition_order() {
        let diagram = Diagram::new("d", DatabaseType::Mysql);
        let ctx = RenderContext::native(DatabaseType::Mysql, &diagram);
        let mut status = DBField::new("status", DataType::new("varchar"));
        status.character_maximum_length = Some("20".to_string());
        status.nullable = false;
        status.unique = true;
        status.default = Some("active".to_string());
        assert_eq!(
            ctx.column_definition(&status, false),
            "`status` varchar(20) NOT NULL UNIQUE DEFAULT 'active'"
        );

        let mut id = id_field();
        id.increment = Some(true);
        id.default = Some("0".to_string());
        assert_eq!(
            ctx.column_definition(&id, true),
            "`id` int NOT NULL PRIMARY KEY AUTO_INCREMENT"
        );
    }

    #[test]
    fn test_on_update_only_in_mysql() {
        let diagram = Diagram::new("d", DatabaseType::Mysql);
        let mut updated = DBField::new("updated_at", DataType::new("timestamp"));
        updated.default = Some("CURRENT_TIMESTAMP".to_string());
        updated.on_update = Some("CURRENT_TIMESTAMP".to_string());
        assert_eq!(
            RenderContext::native(DatabaseType::Mysql, &diagram).column_definition(&updated, false),
            "`updated_at` timestamp DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        );
        assert_eq!(
            RenderContext::native(DatabaseType::Postgresql, &diagram)
                .column_definition(&updated, false),
            "\"updated_at\" timestamp DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_boolean_default_uses_column_type() {
        let diagram = Diagram::new("d", DatabaseType::SqlServer);
        let mut active = DBField::new("active", DataType::new("bit"));
        active.nullable = false;
        active.default = Some("((1))".to_string());
        let ctx = RenderContext::portable(
            DatabaseType::Postgresql,
            Quoter::new(DatabaseType::Postgresql, false),
            &diagram,
        );
        assert_eq!(
            ctx.column_definition(&active, false),
            "active boolean NOT NULL DEFAULT TRUE"
        );
    }

    #[test]
    fn test_postgres_serial_and_nextval() {
        let diagram = Diagram::new("d", DatabaseType::Postgresql);
        let native = RenderContext::native(DatabaseType::Postgresql, &diagram);
        let mut id = id_field();
        id.increment = Some(true);
        assert_eq!(native.column_definition(&id, true), "\"id\" serial NOT NULL PRIMARY KEY");

        id.default = Some("nextval('users_id_seq'::regclass)".to_string());
        assert_eq!(
            native.column_definition(&id, true),
            "\"id\" integer NOT NULL PRIMARY KEY DEFAULT nextval('users_id_seq'::regclass)"
        );

        let portable = RenderContext::portable(
            DatabaseType::Postgresql,
            Quoter::new(DatabaseType::Postgresql, false),
            &diagram,
        );
        assert_eq!(
            portable.column_definition(&id, false),
            "id integer NOT NULL GENERATED BY DEFAULT AS IDENTITY"
        );
    }

    #[test]
    fn test_foreign_key_placement_by_cardinality() {
        let mut diagram = users_and_orders();
        let fk = resolve_foreign_key(&diagram, &diagram.relationships[0]).unwrap();
        assert_eq!(fk.holder.name, "orders");
        assert_eq!(fk.referenced.name, "users");

        let swapped = diagram.relationships[0]
            .clone()
            .with_cardinality(Cardinality::Many, Cardinality::One);
        let fk = resolve_foreign_key(&diagram, &swapped).unwrap();
        assert_eq!(fk.holder.name, "users");

        diagram.relationships[0].source_cardinality = Cardinality::Many;
        diagram.relationships[0].target_cardinality = Cardinality::Many;
        assert!(foreign_keys(&diagram).is_empty());
    }

    #[test]
    fn test_foreign_key_statement() {
        let diagram = users_and_orders();
        let quoter = Quoter::strict(DatabaseType::Postgresql);
        assert_eq!(
            foreign_key_block(&diagram, &quoter),
            "ALTER TABLE \"orders\" ADD CONSTRAINT \"fk_orders_user\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\");"
        );
    }

    #[test]
    fn test_secondary_indexes() {
        let mut diagram = users_and_orders();
        let orders = &mut diagram.tables[1];
        let pk_id = orders.fields[0].id.clone();
        let user_id = orders.fields[1].id.clone();
        orders.indexes.push(DBIndex::new("orders_id_idx", vec![pk_id], true));
        orders.indexes.push(DBIndex::new("", vec![user_id], false));
        let ctx = RenderContext::native(DatabaseType::Postgresql, &diagram);
        let statements = secondary_indexes(&diagram.tables[1], &ctx);
        assert_eq!(
            statements,
            vec!["CREATE INDEX \"idx_orders_user_id\" ON \"orders\" (\"user_id\");".to_string()]
        );
    }

    #[test]
    fn test_mysql_text_index_prefix() {
        let mut body = DBField::new("body", DataType::new("text"));
        body.nullable = true;
        let mut table = DBTable::new("posts", vec![body]);
        let body_id = table.fields[0].id.clone();
        table.indexes.push(DBIndex::new("idx_body", vec![body_id], false));
        let mut diagram = Diagram::new("d", DatabaseType::Mysql);
        diagram.tables.push(table);
        let ctx = RenderContext::native(DatabaseType::Mysql, &diagram);
        assert_eq!(
            secondary_indexes(&diagram.tables[0], &ctx),
            vec!["CREATE INDEX `idx_body` ON `posts` (`body`(255));".to_string()]
        );
    }

    #[test]
    fn test_sqlserver_index_truncation() {
        let fields: Vec<DBField> = (0..40)
            .map(|i| DBField::new(format!("c{}", i), DataType::new("integer")))
            .collect();
        let mut table = DBTable::new("wide", fields);
        let ids = table.fields.iter().map(|f| f.id.clone()).collect();
        table.indexes.push(DBIndex::new("idx_wide", ids, false));
        let mut diagram = Diagram::new("d", DatabaseType::SqlServer);
        diagram.tables.push(table);
        let ctx = RenderContext::native(DatabaseType::SqlServer, &diagram);
        let statements = secondary_indexes(&diagram.tables[0], &ctx);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("-- Warning: index idx_wide has 40 columns"));
        assert!(statements[1].contains("[c31]"));
        assert!(!statements[1].contains("[c32]"));
    }
}
