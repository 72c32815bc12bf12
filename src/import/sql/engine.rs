//! Shared import engine
//!
//! Every dialect runs the same loop: split the script, classify each
//! statement, then hand it to the strategy registered for that statement kind
//! (grammar parse first, regex fallback second). Facts land in a
//! [`SchemaBuilder`], which owns table registration, name resolution and the
//! pending foreign-key worklist.

use super::fallback::{self, AlterAction, ConstraintFact};
use super::grammar;
use super::result::{SQLColumn, SQLCustomType, SQLForeignKey, SQLIndex, SQLParserResult, SQLTable};
use super::text::{RawStatement, StatementKind, classify, split_qualified_name, split_statements};
use super::types::{is_serial_type, parse_type};
use crate::import::ImportError;
use crate::models::{DatabaseType, generate_id};
use sqlparser::ast::ObjectName;
use sqlparser::dialect::Dialect;
use tracing::{debug, warn};

/// Per-dialect hooks used by the shared engine
pub trait DialectAdapter {
    fn database_type(&self) -> DatabaseType;

    /// `sqlparser` dialect used for the grammar pass
    fn grammar(&self) -> Box<dyn Dialect>;

    /// Identifier quote pairs accepted by the dialect
    fn quote_pairs(&self) -> &'static [(char, char)];

    fn default_schema(&self) -> Option<&'static str> {
        self.database_type().default_schema()
    }

    /// Rewrite a statement into something the grammar accepts
    fn preprocess(&self, statement: &str) -> String {
        statement.to_string()
    }

    /// Strip one level of this dialect's identifier quoting
    fn unquote(&self, identifier: &str) -> String {
        let trimmed = identifier.trim();
        for (open, close) in self.quote_pairs() {
            if trimmed.len() >= 2 && trimmed.starts_with(*open) && trimmed.ends_with(*close) {
                let inner = &trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()];
                let doubled = format!("{}{}", close, close);
                return inner.replace(&doubled, &close.to_string());
            }
        }
        trimmed.to_string()
    }

    /// Derive flags implied by the type or default, and the size arguments
    fn post_process_column(&self, column: &mut SQLColumn) {
        let parsed = parse_type(&column.data_type);
        if is_serial_type(&parsed.base) {
            column.increment = true;
            column.nullable = false;
        }
        if column
            .default
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("NULL"))
        {
            column.default = None;
        }
        if column.default.as_deref().is_some_and(is_sequence_default) {
            column.increment = true;
        }
        if column.primary_key {
            column.nullable = false;
        }
        column.type_args = (!parsed.args.is_empty()).then_some(parsed.args);
    }
}

/// `nextval('seq')` defaults mark sequence-backed columns
pub fn is_sequence_default(default: &str) -> bool {
    default.to_lowercase().contains("nextval(")
}

/// A table reference normalized to `(name, schema)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub schema: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Parse `table`, `schema.table` or `db.schema.table`, any quoting
    pub fn parse(text: &str) -> Self {
        let mut parts = split_qualified_name(text);
        let name = parts.pop().unwrap_or_default();
        let schema = parts.pop();
        Self { name, schema }
    }

    pub fn from_object_name(name: &ObjectName) -> Self {
        Self::parse(&name.to_string())
    }

    pub fn display(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

/// A foreign key waiting for both of its tables to exist
#[derive(Debug, Clone, PartialEq)]
pub struct PendingForeignKey {
    pub name: String,
    pub source: TableRef,
    pub source_columns: Vec<String>,
    pub target: TableRef,
    /// Empty means "the target's primary key"
    pub target_columns: Vec<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
}

/// Accumulates facts for one script
pub struct SchemaBuilder {
    database_type: DatabaseType,
    default_schema: Option<String>,
    tables: Vec<SQLTable>,
    types: Vec<SQLCustomType>,
    relationships: Vec<SQLForeignKey>,
    pending: Vec<PendingForeignKey>,
    warnings: Vec<String>,
}

impl SchemaBuilder {
    pub fn new(adapter: &dyn DialectAdapter) -> Self {
        Self {
            database_type: adapter.database_type(),
            default_schema: adapter.default_schema().map(str::to_string),
            tables: Vec::new(),
            types: Vec::new(),
            relationships: Vec::new(),
            pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(dialect = %self.database_type, "{}", message);
        self.warnings.push(message);
    }

    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    pub fn table(&self, index: usize) -> Option<&SQLTable> {
        self.tables.get(index)
    }

    /// Register a table; returns its index
    pub fn add_table(&mut self, mut table: SQLTable) -> usize {
        let table_ref = TableRef::new(table.name.clone(), table.schema.clone());
        if let Some(existing) = self.lookup_exact(&table_ref) {
            self.warn(format!(
                "Table {} defined more than once, keeping the first definition",
                table_ref.display()
            ));
            return existing;
        }
        table.id = generate_id();
        table.order = self.tables.len();
        debug!(table = %table_ref.display(), columns = table.columns.len(), "registered table");
        self.tables.push(table);
        self.tables.len() - 1
    }

    pub fn add_type(&mut self, custom_type: SQLCustomType) {
        let duplicate = self.types.iter().any(|t| {
            t.name.eq_ignore_ascii_case(&custom_type.name)
                && self.schema_eq(t.schema.as_deref(), custom_type.schema.as_deref())
        });
        if duplicate {
            self.warn(format!("Type {} defined more than once", custom_type.name));
            return;
        }
        self.types.push(custom_type);
    }

    fn schema_eq(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let default = self.default_schema.as_deref();
        match (a.or(default), b.or(default)) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn lookup_exact(&self, table_ref: &TableRef) -> Option<usize> {
        let matches = |t: &SQLTable| self.schema_eq(t.schema.as_deref(), table_ref.schema.as_deref());
        self.tables
            .iter()
            .position(|t| t.name == table_ref.name && matches(t))
            .or_else(|| {
                self.tables
                    .iter()
                    .position(|t| t.name.eq_ignore_ascii_case(&table_ref.name) && matches(t))
            })
    }

    fn lookup_by_name(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name == name)
            .or_else(|| self.tables.iter().position(|t| t.name.eq_ignore_ascii_case(name)))
    }

    /// Exact `(name, schema)` match, then name-only with a warning
    pub fn resolve_table(&mut self, table_ref: &TableRef) -> Option<usize> {
        if let Some(index) = self.lookup_exact(table_ref) {
            return Some(index);
        }
        let index = self.lookup_by_name(&table_ref.name)?;
        let found = self.tables[index].schema.clone().unwrap_or_default();
        self.warn(format!(
            "Table {} not found in its schema, matched {}.{} by name only",
            table_ref.display(),
            found,
            table_ref.name
        ));
        Some(index)
    }

    /// Queue a foreign key; the worklist is drained by [`Self::finish`], once
    /// every table and primary key is known
    pub fn queue_foreign_key(&mut self, fk: PendingForeignKey) {
        debug!(fk = %fk.name, target = %fk.target.display(), "foreign key queued");
        self.pending.push(fk);
    }

    /// Resolve the worklist in queue order; returns what is still unresolved
    fn drain_pending(&mut self) -> Vec<PendingForeignKey> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .filter(|fk| !self.try_resolve(fk))
            .collect()
    }

    fn try_resolve(&mut self, fk: &PendingForeignKey) -> bool {
        let (Some(source_index), Some(target_index)) =
            (self.lookup_exact(&fk.source), self.lookup_exact(&fk.target))
        else {
            return false;
        };
        let target_columns = if fk.target_columns.is_empty() {
            self.tables[target_index].primary_key_columns()
        } else {
            fk.target_columns.clone()
        };
        if target_columns.len() != fk.source_columns.len() {
            self.warn(format!(
                "Foreign key {} on {} has {} column(s) but references {} column(s), skipped",
                fk.name,
                fk.source.display(),
                fk.source_columns.len(),
                target_columns.len()
            ));
            return true;
        }

        let source = &self.tables[source_index];
        let target = &self.tables[target_index];
        let mut created = Vec::new();
        for (source_column, target_column) in fk.source_columns.iter().zip(&target_columns) {
            created.push(SQLForeignKey {
                name: fk.name.clone(),
                source_table: source.name.clone(),
                source_schema: source.schema.clone(),
                source_table_id: source.id.clone(),
                source_column: source_column.clone(),
                target_table: target.name.clone(),
                target_schema: target.schema.clone(),
                target_table_id: target.id.clone(),
                target_column: target_column.clone(),
                update_action: fk.on_update.clone(),
                delete_action: fk.on_delete.clone(),
            });
        }
        for created_fk in created {
            let duplicate = self.relationships.iter().any(|r| {
                r.source_table_id == created_fk.source_table_id
                    && r.target_table_id == created_fk.target_table_id
                    && r.source_column.eq_ignore_ascii_case(&created_fk.source_column)
                    && r.target_column.eq_ignore_ascii_case(&created_fk.target_column)
            });
            if !duplicate {
                self.relationships.push(created_fk);
            }
        }
        true
    }

    /// Apply a table-level constraint to a registered table
    pub fn apply_constraint(&mut self, index: usize, fact: ConstraintFact) {
        let Some(table) = self.tables.get(index) else {
            return;
        };
        let table_ref = TableRef::new(table.name.clone(), table.schema.clone());
        match fact {
            ConstraintFact::PrimaryKey { name, columns } => self.set_primary_key(index, name, columns),
            ConstraintFact::Unique { name, columns } => self.add_unique(index, name, columns),
            ConstraintFact::Index {
                name,
                columns,
                unique,
                index_type,
            } => {
                let mut sql_index = SQLIndex::new(name, columns, unique);
                sql_index.index_type = index_type;
                self.add_index(index, sql_index);
            }
            ConstraintFact::ForeignKey {
                name,
                columns,
                target,
                target_columns,
                on_update,
                on_delete,
            } => {
                let name = name.unwrap_or_else(|| {
                    format!("fk_{}_{}", table_ref.name, columns.join("_"))
                });
                self.queue_foreign_key(PendingForeignKey {
                    name,
                    source: table_ref,
                    source_columns: columns,
                    target,
                    target_columns,
                    on_update,
                    on_delete,
                });
            }
        }
    }

    fn set_primary_key(&mut self, index: usize, name: Option<String>, columns: Vec<String>) {
        let table = &mut self.tables[index];
        let mut missing = Vec::new();
        for column in &columns {
            match table.column_mut(column) {
                Some(col) => {
                    col.primary_key = true;
                    col.nullable = false;
                }
                None => missing.push(column.clone()),
            }
        }
        table.indexes.retain(|i| !i.is_primary_key);
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            let mut pk = SQLIndex::new(name, columns, true);
            pk.is_primary_key = true;
            table.indexes.push(pk);
        } else if columns.len() > 1 {
            let mut pk = SQLIndex::new("", columns, true);
            pk.is_primary_key = true;
            table.indexes.push(pk);
        }
        let table_name = table.name.clone();
        for column in missing {
            self.warn(format!(
                "Primary key column {} not found in table {}",
                column, table_name
            ));
        }
    }

    fn add_unique(&mut self, index: usize, name: Option<String>, columns: Vec<String>) {
        if columns.len() == 1 {
            let table = &mut self.tables[index];
            if let Some(col) = table.column_mut(&columns[0]) {
                col.unique = true;
                return;
            }
        }
        self.add_index(index, SQLIndex::new(name.unwrap_or_default(), columns, true));
    }

    /// Add a secondary index, dropping it when a column is unknown
    pub fn add_index(&mut self, index: usize, sql_index: SQLIndex) {
        let table = &self.tables[index];
        if let Some(missing) = sql_index.columns.iter().find(|c| table.column(c).is_none()) {
            let message = format!(
                "Index {} on {} references unknown column {}, skipped",
                sql_index.name, table.name, missing
            );
            self.warn(message);
            return;
        }
        let duplicate = table
            .indexes
            .iter()
            .any(|i| i.unique == sql_index.unique && i.covers_same_columns(&sql_index.columns));
        if duplicate {
            return;
        }
        self.tables[index].indexes.push(sql_index);
    }

    pub fn add_column(&mut self, index: usize, column: SQLColumn) {
        let table = &mut self.tables[index];
        if table.column(&column.name).is_some() {
            let message = format!("Column {} already exists on {}", column.name, table.name);
            self.warn(message);
            return;
        }
        table.columns.push(column);
    }

    /// Replace a column definition (MySQL `MODIFY`), keeping key flags
    pub fn modify_column(&mut self, index: usize, mut column: SQLColumn) {
        let table = &mut self.tables[index];
        match table.column_mut(&column.name) {
            Some(existing) => {
                column.primary_key |= existing.primary_key;
                column.unique |= existing.unique;
                if column.primary_key {
                    column.nullable = false;
                }
                *existing = column;
            }
            None => table.columns.push(column),
        }
    }

    pub fn set_column_default(&mut self, index: usize, column: &str, default: String) {
        let table = &mut self.tables[index];
        match table.column_mut(column) {
            Some(col) => {
                if is_sequence_default(&default) {
                    col.increment = true;
                }
                col.default = Some(default);
            }
            None => {
                let message = format!("Column {} not found on {} for default", column, table.name);
                self.warn(message);
            }
        }
    }

    pub fn set_column_not_null(&mut self, index: usize, column: &str) {
        if let Some(col) = self.tables[index].column_mut(column) {
            col.nullable = false;
        }
    }

    pub fn set_table_comment(&mut self, index: usize, comment: Option<String>) {
        self.tables[index].comment = comment;
    }

    pub fn set_column_comment(&mut self, index: usize, column: &str, comment: Option<String>) {
        let table = &mut self.tables[index];
        match table.column_mut(column) {
            Some(col) => col.comment = comment,
            None => {
                let message = format!("Column {} not found on {} for comment", column, table.name);
                self.warn(message);
            }
        }
    }

    /// Drain the worklist and hand back the result
    pub fn finish(mut self) -> SQLParserResult {
        let unresolved = self.drain_pending();
        for fk in unresolved {
            let missing = if self.lookup_exact(&fk.source).is_none() {
                fk.source.display()
            } else {
                fk.target.display()
            };
            self.warn(format!(
                "Foreign key {} dropped: table {} was never defined",
                fk.name, missing
            ));
        }
        SQLParserResult {
            tables: self.tables,
            relationships: self.relationships,
            types: self.types,
            warnings: self.warnings,
        }
    }
}

/// Apply one parsed `ALTER TABLE` action
pub fn apply_alter_action(builder: &mut SchemaBuilder, table_ref: &TableRef, action: AlterAction) {
    let Some(index) = builder.resolve_table(table_ref) else {
        builder.warn(format!(
            "ALTER TABLE references unknown table {}, skipped",
            table_ref.display()
        ));
        return;
    };
    match action {
        AlterAction::AddConstraint(fact) => builder.apply_constraint(index, fact),
        AlterAction::AddColumn(column, facts) => {
            builder.add_column(index, column);
            for fact in facts {
                builder.apply_constraint(index, fact);
            }
        }
        AlterAction::ModifyColumn(column) => builder.modify_column(index, column),
        AlterAction::SetDefault { column, default } => {
            builder.set_column_default(index, &column, default)
        }
        AlterAction::SetNotNull { column } => builder.set_column_not_null(index, &column),
    }
}

type GrammarStrategy =
    fn(&dyn DialectAdapter, &str, &mut SchemaBuilder) -> Result<(), sqlparser::parser::ParserError>;
type FallbackStrategy = fn(&dyn DialectAdapter, &str, &mut SchemaBuilder) -> Result<(), String>;

/// How one statement kind is handled: grammar first, regex second
struct StatementStrategy {
    grammar: Option<GrammarStrategy>,
    fallback: FallbackStrategy,
}

fn strategy_for(kind: StatementKind) -> Option<StatementStrategy> {
    let strategy = match kind {
        StatementKind::CreateTable => StatementStrategy {
            grammar: Some(grammar::create_table),
            fallback: fallback::create_table,
        },
        StatementKind::CreateIndex => StatementStrategy {
            grammar: Some(grammar::create_index),
            fallback: fallback::create_index,
        },
        StatementKind::AlterTable => StatementStrategy {
            grammar: None,
            fallback: fallback::alter_table,
        },
        StatementKind::CreateView => StatementStrategy {
            grammar: None,
            fallback: fallback::create_view,
        },
        StatementKind::CreateType => StatementStrategy {
            grammar: None,
            fallback: fallback::create_type,
        },
        StatementKind::CommentOn => StatementStrategy {
            grammar: None,
            fallback: fallback::comment_on,
        },
        StatementKind::Other => return None,
    };
    Some(strategy)
}

/// A statement neither strategy could handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// Run the registered strategy for one statement
pub fn dispatch(
    adapter: &dyn DialectAdapter,
    statement: &RawStatement,
    builder: &mut SchemaBuilder,
) -> Result<(), StatementFailure> {
    let kind = classify(&statement.text);
    let Some(strategy) = strategy_for(kind) else {
        return Ok(());
    };
    let text = adapter.preprocess(&statement.text);

    let grammar_error = match strategy.grammar {
        Some(parse) => match parse(adapter, &text, builder) {
            Ok(()) => return Ok(()),
            Err(e) => Some(e.to_string()),
        },
        None => None,
    };

    match (strategy.fallback)(adapter, &text, builder) {
        Ok(()) => {
            if let Some(error) = grammar_error {
                debug!(line = statement.line, error = %error, "grammar rejected statement, regex fallback used");
            }
            Ok(())
        }
        Err(reason) => {
            let message = grammar_error.unwrap_or(reason);
            let (line, column) = error_position(&message);
            let failure = StatementFailure {
                line: Some(line.map(|l| l + statement.line - 1).unwrap_or(statement.line)),
                column,
                message,
            };
            builder.warn(format!(
                "Skipped statement at line {}: {}",
                statement.line, failure.message
            ));
            Err(failure)
        }
    }
}

/// Best-effort `Line: X, Column: Y` extraction from a parser message
pub fn error_position(message: &str) -> (Option<usize>, Option<usize>) {
    let number_after = |marker: &str| {
        message.find(marker).and_then(|pos| {
            let digits: String = message[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<usize>().ok()
        })
    };
    (number_after("Line: "), number_after("Column: "))
}

/// Turn a finished builder into the final result, or an error when nothing
/// importable was found and at least one statement failed
pub fn finish_import(
    adapter: &dyn DialectAdapter,
    builder: SchemaBuilder,
    failures: Vec<StatementFailure>,
) -> Result<SQLParserResult, ImportError> {
    if !builder.has_tables()
        && let Some(first) = failures.into_iter().next()
    {
        return Err(ImportError::Parse {
            dialect: adapter.database_type(),
            message: first.message,
            line: first.line,
            column: first.column,
        });
    }
    Ok(builder.finish())
}

/// Parse hand-written DDL statement by statement
pub fn parse_script(
    adapter: &dyn DialectAdapter,
    sql: &str,
) -> Result<SQLParserResult, ImportError> {
    let mut builder = SchemaBuilder::new(adapter);
    let mut failures = Vec::new();
    for statement in split_statements(sql) {
        if let Err(failure) = dispatch(adapter, &statement, &mut builder) {
            failures.push(failure);
        }
    }
    finish_import(adapter, builder, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sql::postgres::PostgresAdapter;

    fn table(name: &str, columns: &[&str]) -> SQLTable {
        let mut table = SQLTable::new(name, None);
        for column in columns {
            table.columns.push(SQLColumn::new(*column, "integer"));
        }
        table
    }

    #[test]
    fn test_table_ref_parse() {
        let r = TableRef::parse("\"public\".\"Users\"");
        assert_eq!(r.name, "Users");
        assert_eq!(r.schema.as_deref(), Some("public"));
        let r = TableRef::parse("db.dbo.orders");
        assert_eq!(r.schema.as_deref(), Some("dbo"));
        assert_eq!(TableRef::parse("t").schema, None);
    }

    #[test]
    fn test_forward_reference_resolves_after_target_table() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let orders = builder.add_table(table("orders", &["id", "user_id"]));
        builder.apply_constraint(
            orders,
            ConstraintFact::ForeignKey {
                name: None,
                columns: vec!["user_id".to_string()],
                target: TableRef::new("users", None),
                target_columns: vec![],
                on_update: None,
                on_delete: Some("CASCADE".to_string()),
            },
        );
        let mut users = table("users", &["id"]);
        users.columns[0].primary_key = true;
        builder.add_table(users);

        let result = builder.finish();
        assert_eq!(result.relationships.len(), 1);
        let fk = &result.relationships[0];
        assert_eq!(fk.source_table, "orders");
        assert_eq!(fk.target_table, "users");
        assert_eq!(fk.target_column, "id");
        assert_eq!(fk.delete_action.as_deref(), Some("CASCADE"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_implicit_target_waits_for_late_primary_key() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let orders = builder.add_table(table("orders", &["id", "user_id"]));
        builder.apply_constraint(
            orders,
            ConstraintFact::ForeignKey {
                name: None,
                columns: vec!["user_id".to_string()],
                target: TableRef::new("users", None),
                target_columns: vec![],
                on_update: None,
                on_delete: None,
            },
        );
        let users = builder.add_table(table("users", &["id"]));
        builder.apply_constraint(
            users,
            ConstraintFact::PrimaryKey {
                name: None,
                columns: vec!["id".to_string()],
            },
        );

        let result = builder.finish();
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].target_column, "id");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unresolved_foreign_key_is_dropped_with_warning() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let orders = builder.add_table(table("orders", &["user_id"]));
        builder.apply_constraint(
            orders,
            ConstraintFact::ForeignKey {
                name: Some("fk_user".to_string()),
                columns: vec!["user_id".to_string()],
                target: TableRef::new("ghosts", None),
                target_columns: vec!["id".to_string()],
                on_update: None,
                on_delete: None,
            },
        );
        let result = builder.finish();
        assert!(result.relationships.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("ghosts"));
    }

    #[test]
    fn test_default_schema_matches_unqualified_reference() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let mut users = table("users", &["id"]);
        users.schema = Some("public".to_string());
        builder.add_table(users);
        assert!(builder.resolve_table(&TableRef::new("users", None)).is_some());
        assert!(builder.finish().warnings.is_empty());
    }

    #[test]
    fn test_name_only_fallback_warns() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let mut users = table("users", &["id"]);
        users.schema = Some("auth".to_string());
        builder.add_table(users);
        assert!(builder.resolve_table(&TableRef::new("users", Some("app".to_string()))).is_some());
        assert_eq!(builder.finish().warnings.len(), 1);
    }

    #[test]
    fn test_error_position() {
        let message = "sql parser error: Expected: ), found: foo at Line: 2, Column: 14";
        assert_eq!(error_position(message), (Some(2), Some(14)));
        assert_eq!(error_position("no position"), (None, None));
    }

    #[test]
    fn test_index_over_unknown_column_is_skipped() {
        let adapter = PostgresAdapter;
        let mut builder = SchemaBuilder::new(&adapter);
        let t = builder.add_table(table("t", &["a"]));
        builder.add_index(t, SQLIndex::new("idx", vec!["missing".to_string()], false));
        let result = builder.finish();
        assert!(result.tables[0].indexes.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }
}
