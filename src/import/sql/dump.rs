//! Dump-format extractor for `pg_dump` and `mysqldump` output
//!
//! Dumps declare tables bare and attach keys, defaults and foreign keys in
//! later `ALTER TABLE` statements. Statements are split line by line and run
//! in a fixed phase order so every constraint finds its table and primary key
//! before foreign keys are resolved.

use super::engine::{
    DialectAdapter, SchemaBuilder, StatementFailure, apply_alter_action, dispatch,
    error_position, finish_import,
};
use super::fallback::parse_alter_table;
use super::result::SQLParserResult;
use super::text::{RawStatement, StatementKind, classify};
use crate::import::ImportError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DOLLAR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Za-z_]*\$").expect("valid regex"));

/// Split a dump into statements, one line at a time
///
/// `--` comment lines and MySQL `/*!...*/;` directives are dropped, as are
/// `DELIMITER` blocks (triggers, routines). A statement ends on a line whose
/// trimmed text ends in `;`, unless a dollar-quoted body is still open.
pub fn split_dump_statements(sql: &str) -> Vec<RawStatement> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;
    let mut in_dollar = false;
    let mut custom_delimiter = false;

    for (index, line) in sql.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();

        if custom_delimiter {
            if trimmed.eq_ignore_ascii_case("DELIMITER ;") {
                custom_delimiter = false;
            }
            continue;
        }
        if !in_dollar {
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            if trimmed.starts_with("/*!") && trimmed.ends_with(';') && current.is_empty() {
                continue;
            }
            if trimmed
                .get(..9)
                .is_some_and(|head| head.eq_ignore_ascii_case("DELIMITER"))
            {
                custom_delimiter = !trimmed.eq_ignore_ascii_case("DELIMITER ;");
                continue;
            }
        }

        if current.is_empty() {
            start_line = line_no;
        }
        current.push_str(line);
        current.push('\n');

        if DOLLAR_TAG.find_iter(line).count() % 2 == 1 {
            in_dollar = !in_dollar;
        }
        if !in_dollar && trimmed.ends_with(';') {
            let text = current.trim().trim_end_matches(';').trim().to_string();
            if !text.is_empty() {
                statements.push(RawStatement {
                    text,
                    line: start_line,
                });
            }
            current.clear();
        }
    }
    let rest = current.trim().trim_end_matches(';').trim();
    if !rest.is_empty() {
        statements.push(RawStatement {
            text: rest.to_string(),
            line: start_line,
        });
    }
    statements
}

/// Import a dump in phase order: types and tables, indexes, alterations
/// (primary keys, unique keys, then the rest), views and comments last
pub fn parse_dump(adapter: &dyn DialectAdapter, sql: &str) -> Result<SQLParserResult, ImportError> {
    let statements = split_dump_statements(sql);
    debug!(
        dialect = %adapter.database_type(),
        statements = statements.len(),
        "importing dump"
    );

    let mut tables = Vec::new();
    let mut indexes = Vec::new();
    let mut alters = Vec::new();
    let mut late = Vec::new();
    for statement in statements {
        match classify(&statement.text) {
            StatementKind::CreateType | StatementKind::CreateTable => tables.push(statement),
            StatementKind::CreateIndex => indexes.push(statement),
            StatementKind::AlterTable => alters.push(statement),
            StatementKind::CreateView | StatementKind::CommentOn => late.push(statement),
            StatementKind::Other => {}
        }
    }

    let mut builder = SchemaBuilder::new(adapter);
    let mut failures = Vec::new();
    for statement in tables.iter().chain(&indexes) {
        if let Err(failure) = dispatch(adapter, statement, &mut builder) {
            failures.push(failure);
        }
    }

    let mut actions = Vec::new();
    for statement in &alters {
        match parse_alter_table(adapter, &adapter.preprocess(&statement.text)) {
            Ok((table_ref, parsed)) => {
                actions.extend(parsed.into_iter().map(|action| (table_ref.clone(), action)))
            }
            Err(message) => {
                builder.warn(format!(
                    "Skipped statement at line {}: {}",
                    statement.line, message
                ));
                let (_, column) = error_position(&message);
                failures.push(StatementFailure {
                    message,
                    line: Some(statement.line),
                    column,
                });
            }
        }
    }
    // stable: declaration order is kept inside each phase
    actions.sort_by_key(|(_, action)| action.dump_phase());
    for (table_ref, action) in actions {
        apply_alter_action(&mut builder, &table_ref, action);
    }

    for statement in &late {
        if let Err(failure) = dispatch(adapter, statement, &mut builder) {
            failures.push(failure);
        }
    }
    finish_import(adapter, builder, failures)
}
