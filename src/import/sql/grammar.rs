//! Grammar pass over `sqlparser` ASTs
//!
//! Only the statement shapes that every supported dialect shares are matched
//! structurally. Options and constraints are rendered back to text and read by
//! the same extractors the regex fallback uses, so both passes agree on the
//! facts they report.

use super::engine::{DialectAdapter, SchemaBuilder, TableRef};
use super::fallback::{self, ConstraintFact};
use super::result::{SQLColumn, SQLIndex, SQLTable};
use super::text::{find_closing_paren, split_identifier_list};
use sqlparser::ast::{ColumnDef, ColumnOption, CreateIndex, Statement};
use sqlparser::parser::{Parser, ParserError};

fn parse_single(adapter: &dyn DialectAdapter, sql: &str) -> Result<Statement, ParserError> {
    let dialect = adapter.grammar();
    let mut statements = Parser::parse_sql(dialect.as_ref(), sql)?;
    if statements.len() != 1 {
        return Err(ParserError::ParserError(format!(
            "expected one statement, found {}",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}

fn column_from_ast(
    adapter: &dyn DialectAdapter,
    def: &ColumnDef,
    facts: &mut Vec<ConstraintFact>,
) -> SQLColumn {
    let mut column = SQLColumn::new(def.name.value.clone(), def.data_type.to_string());
    for option_def in &def.options {
        match &option_def.option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::Default(expr) => column.default = Some(expr.to_string()),
            ColumnOption::Comment(comment) => column.comment = Some(comment.clone()),
            other => fallback::apply_column_option_text(
                &mut column,
                option_def.name.as_ref().map(|n| n.value.clone()),
                &other.to_string(),
                facts,
            ),
        }
    }
    adapter.post_process_column(&mut column);
    column
}

/// Text that follows the column list (`ENGINE=... COMMENT='...'`)
fn table_options_text(sql: &str) -> &str {
    sql.find('(')
        .and_then(|open| find_closing_paren(sql, open))
        .and_then(|close| sql.get(close + 1..))
        .unwrap_or_default()
}

/// `CREATE TABLE` through the dialect grammar
pub fn create_table(
    adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), ParserError> {
    let Statement::CreateTable(create) = parse_single(adapter, sql)? else {
        return Err(ParserError::ParserError(
            "statement is not a CREATE TABLE".to_string(),
        ));
    };
    if create.columns.is_empty() {
        // CREATE TABLE ... AS SELECT / LIKE: nothing structural to read
        return Err(ParserError::ParserError(format!(
            "CREATE TABLE {} declares no columns",
            create.name
        )));
    }

    let table_ref = TableRef::from_object_name(&create.name);
    let mut table = SQLTable::new(table_ref.name, table_ref.schema);
    let mut facts = Vec::new();
    for def in &create.columns {
        table.columns.push(column_from_ast(adapter, def, &mut facts));
    }
    for constraint in &create.constraints {
        facts.extend(fallback::parse_table_constraint(&constraint.to_string()));
    }
    table.comment = fallback::table_options_comment(table_options_text(sql));

    let index = builder.add_table(table);
    for fact in facts {
        builder.apply_constraint(index, fact);
    }
    Ok(())
}

/// `CREATE INDEX` through the dialect grammar
pub fn create_index(
    adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), ParserError> {
    let Statement::CreateIndex(CreateIndex {
        name,
        table_name,
        using,
        columns,
        unique,
        ..
    }) = parse_single(adapter, sql)?
    else {
        return Err(ParserError::ParserError(
            "statement is not a CREATE INDEX".to_string(),
        ));
    };

    let rendered = columns
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let column_names = split_identifier_list(&rendered);
    if let Some(expression) = column_names.iter().find(|c| c.contains('(')) {
        return Err(ParserError::ParserError(format!(
            "expression index on {} ({}) is not supported",
            table_name, expression
        )));
    }

    let index_name = name
        .map(|n| TableRef::from_object_name(&n).name)
        .unwrap_or_default();
    let mut index = SQLIndex::new(index_name, column_names, unique);
    index.index_type = using.map(|u| u.to_string().to_lowercase());
    fallback::add_index_to(builder, &TableRef::from_object_name(&table_name), index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sql::mysql::MySqlAdapter;
    use crate::import::sql::postgres::PostgresAdapter;

    #[test]
    fn test_create_table_through_grammar() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        create_table(
            &adapter,
            "CREATE TABLE public.users (id SERIAL PRIMARY KEY, email VARCHAR(255) NOT NULL UNIQUE, bio TEXT)",
            &mut builder,
        )
        .unwrap();
        let result = builder.finish();
        let table = &result.tables[0];
        assert_eq!(table.name, "users");
        assert_eq!(table.schema.as_deref(), Some("public"));
        let id = table.column("id").unwrap();
        assert!(id.primary_key && id.increment && !id.nullable);
        let email = table.column("email").unwrap();
        assert!(email.unique);
        assert!(!email.nullable);
        assert_eq!(email.type_args.as_ref().unwrap().length.as_deref(), Some("255"));
        assert!(table.column("bio").unwrap().nullable);
    }

    #[test]
    fn test_create_table_constraints_become_facts() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        create_table(&adapter, "CREATE TABLE users (id INT PRIMARY KEY)", &mut builder).unwrap();
        create_table(
            &adapter,
            "CREATE TABLE orders (id INT, user_id INT, PRIMARY KEY (id), CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE)",
            &mut builder,
        )
        .unwrap();
        let result = builder.finish();
        assert!(result.tables[1].column("id").unwrap().primary_key);
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].name, "fk_orders_user");
        assert_eq!(result.relationships[0].delete_action.as_deref(), Some("CASCADE"));
    }

    #[test]
    fn test_mysql_auto_increment_and_column_comment() {
        let adapter = MySqlAdapter::mysql();
        let mut builder = SchemaBuilder::new(&adapter);
        create_table(
            &adapter,
            "CREATE TABLE `songs` (`id` int NOT NULL AUTO_INCREMENT, `title` varchar(100) COMMENT 'song title', PRIMARY KEY (`id`))",
            &mut builder,
        )
        .unwrap();
        let result = builder.finish();
        let table = &result.tables[0];
        assert!(table.column("id").unwrap().increment);
        assert_eq!(table.column("title").unwrap().comment.as_deref(), Some("song title"));
    }

    #[test]
    fn test_create_index_through_grammar() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        create_table(&adapter, "CREATE TABLE t (a INT, b INT)", &mut builder).unwrap();
        create_index(&adapter, "CREATE UNIQUE INDEX idx_ab ON t (a, b DESC)", &mut builder).unwrap();
        let result = builder.finish();
        let index = &result.tables[0].indexes[0];
        assert_eq!(index.name, "idx_ab");
        assert!(index.unique);
        assert_eq!(index.columns, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_grammar_rejects_non_table_statement() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        assert!(create_table(&adapter, "SELECT 1", &mut builder).is_err());
    }
}
