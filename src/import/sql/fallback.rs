//! Regex extractors
//!
//! Used when the grammar parser rejects a statement, for statement kinds the
//! grammar pass does not cover, and by the grammar pass itself to read
//! constraint and column-option text rendered from the AST.

use super::engine::{DialectAdapter, SchemaBuilder, TableRef, apply_alter_action};
use super::result::{SQLColumn, SQLCustomType, SQLIndex, SQLTable};
use super::text::{
    collapse_whitespace, find_closing_paren, split_identifier_list, split_top_level,
    unquote_identifier, unquote_string_literal,
};
use crate::models::CustomTypeKind;
use once_cell::sync::Lazy;
use regex::Regex;

const IDENT: &str = r#"(?:"(?:[^"]|"")+"|`[^`]+`|\[[^\]]+\]|[\w$#@]+)"#;

fn qualified() -> String {
    format!(r"{IDENT}(?:\s*\.\s*{IDENT}){{0,2}}")
}

static CREATE_TABLE_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+(?:OR\s+REPLACE\s+)?(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMP|TEMPORARY|UNLOGGED)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<name>{})\s*\(",
        qualified()
    ))
    .expect("valid regex")
});

static CREATE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+(?P<unique>UNIQUE\s+)?(?:(?:CLUSTERED|NONCLUSTERED|FULLTEXT|SPATIAL)\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?:(?P<name>{q})\s+)?ON\s+(?:ONLY\s+)?(?P<table>{q})\s*(?:USING\s+(?P<using>\w+)\s*)?\(",
        q = qualified()
    ))
    .expect("valid regex")
});

static ALTER_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?P<table>{})\s+(?P<rest>.*)$",
        qualified()
    ))
    .expect("valid regex")
});

static CREATE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+TYPE\s+(?P<name>{})\s+AS\s*(?P<enum>ENUM\s*)?\(",
        qualified()
    ))
    .expect("valid regex")
});

static COMMENT_ON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*COMMENT\s+ON\s+(?P<kind>TABLE|COLUMN)\s+(?P<target>{})\s+IS\s+(?P<value>'(?:[^']|'')*'|NULL)\s*$",
        qualified()
    ))
    .expect("valid regex")
});

static CREATE_VIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^\s*CREATE\s+(?:OR\s+REPLACE\s+)?(?:ALGORITHM\s*=\s*\w+\s+)?(?:DEFINER\s*=\s*\S+\s+)?(?:SQL\s+SECURITY\s+\w+\s+)?(?:(?:TEMP|TEMPORARY)\s+)?(?P<mat>MATERIALIZED\s+)?VIEW\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<name>{})\s*(?:\((?P<cols>[^)]*)\))?\s*(?:WITH\s*\([^)]*\)\s*)?AS\s+(?P<query>.*)$",
        qualified()
    ))
    .expect("valid regex")
});

static COLUMN_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?s)^\s*(?P<name>{IDENT})(?:\s+(?P<rest>.*))?$")).expect("valid regex")
});

static CONSTRAINT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?is)^\s*CONSTRAINT\s+(?P<name>{IDENT})\s+(?P<rest>.*)$"))
        .expect("valid regex")
});

static REFERENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)\bREFERENCES\s+(?P<table>{})\s*(?:\((?P<cols>[^)]*)\))?(?P<tail>.*)$",
        qualified()
    ))
    .expect("valid regex")
});

static ON_DELETE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\s+DELETE\s+(CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT)")
        .expect("valid regex")
});

static ON_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\s+UPDATE\s+(CASCADE|RESTRICT|NO\s+ACTION|SET\s+NULL|SET\s+DEFAULT)")
        .expect("valid regex")
});

/// Column-level `ON UPDATE CURRENT_TIMESTAMP` (MySQL), not a foreign-key action
static ON_UPDATE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\s+UPDATE\s+(?P<value>(?:CURRENT_TIMESTAMP|LOCALTIMESTAMP|LOCALTIME|NOW)(?:\s*\(\s*\d*\s*\))?)")
        .expect("valid regex")
});

/// Value of a column's `ON UPDATE` refresh clause
fn column_on_update(text: &str) -> Option<String> {
    ON_UPDATE_VALUE
        .captures(text)
        .and_then(|c| c.name("value"))
        .map(|m| m.as_str().to_uppercase().replace(' ', ""))
}

static INCREMENT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bAUTO_INCREMENT\b|\bAUTOINCREMENT\b|\bIDENTITY\b|\bGENERATED\s+(?:ALWAYS|BY\s+DEFAULT)(?:\s+ON\s+NULL)?\s+AS\s+IDENTITY\b")
        .expect("valid regex")
});

static TABLE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bCOMMENT\s*=?\s*(?P<value>'(?:[^']|'')*')").expect("valid regex")
});

static INLINE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^(?:(?P<kind>FULLTEXT|SPATIAL)\s+)?(?:KEY|INDEX)\s*(?:{IDENT}\s*)?(?:USING\s+\w+\s*)?\("
    ))
    .expect("valid regex")
});

static PREFIX_LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<col>.+?)\s*\(\s*\d+\s*\)$").expect("valid regex"));

/// A table-level constraint read from DDL text
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintFact {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Index {
        name: String,
        columns: Vec<String>,
        unique: bool,
        index_type: Option<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        target: TableRef,
        target_columns: Vec<String>,
        on_update: Option<String>,
        on_delete: Option<String>,
    },
}

/// One action of an `ALTER TABLE` statement
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddConstraint(ConstraintFact),
    AddColumn(SQLColumn, Vec<ConstraintFact>),
    ModifyColumn(SQLColumn),
    SetDefault { column: String, default: String },
    SetNotNull { column: String },
}

impl AlterAction {
    /// Processing phase inside a dump: primary keys, then unique, then the rest
    pub fn dump_phase(&self) -> u8 {
        match self {
            AlterAction::AddConstraint(ConstraintFact::PrimaryKey { .. }) => 0,
            AlterAction::AddConstraint(ConstraintFact::Unique { .. }) => 1,
            AlterAction::AddConstraint(ConstraintFact::Index { unique: true, .. }) => 1,
            _ => 2,
        }
    }
}

/// Split `(...)` out of `text`: returns (before, inside, after)
fn paren_group(text: &str) -> Option<(&str, &str, &str)> {
    let open = text.find('(')?;
    let close = find_closing_paren(text, open)?;
    Some((&text[..open], &text[open + 1..close], &text[close + 1..]))
}

/// Column names of a key list, with MySQL prefix lengths stripped
fn key_columns(list: &str) -> Vec<String> {
    split_identifier_list(list)
        .into_iter()
        .map(|c| {
            let stripped = PREFIX_LENGTH
                .captures(&c)
                .and_then(|caps| caps.name("col"))
                .map(|m| unquote_identifier(m.as_str()));
            stripped.unwrap_or(c)
        })
        .collect()
}

fn referential_action(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()).to_uppercase())
}

/// Target side of a `REFERENCES` clause
#[derive(Debug, Clone, PartialEq)]
pub struct References {
    pub target: TableRef,
    pub columns: Vec<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
}

impl References {
    fn into_fact(self, name: Option<String>, columns: Vec<String>) -> ConstraintFact {
        ConstraintFact::ForeignKey {
            name,
            columns,
            target: self.target,
            target_columns: self.columns,
            on_update: self.on_update,
            on_delete: self.on_delete,
        }
    }
}

/// Parse `REFERENCES t (a, b) ON DELETE ... ON UPDATE ...`
pub fn parse_references(text: &str) -> Option<References> {
    let caps = REFERENCES.captures(text)?;
    let tail = caps.name("tail").map(|m| m.as_str()).unwrap_or_default();
    Some(References {
        target: TableRef::parse(caps.name("table")?.as_str()),
        columns: caps
            .name("cols")
            .map(|m| key_columns(m.as_str()))
            .unwrap_or_default(),
        on_update: referential_action(&ON_UPDATE, tail),
        on_delete: referential_action(&ON_DELETE, tail),
    })
}

/// Does a `CREATE TABLE` body element declare a constraint rather than a column
pub fn is_constraint_element(element: &str) -> bool {
    let upper = element.trim_start().to_uppercase();
    let starts = |prefix: &str| {
        upper.starts_with(prefix)
            && upper[prefix.len()..]
                .chars()
                .next()
                .is_none_or(|c| c.is_whitespace() || c == '(')
    };
    starts("CONSTRAINT")
        || starts("PRIMARY")
        || starts("FOREIGN")
        || starts("CHECK")
        || starts("EXCLUDE")
        || (starts("UNIQUE") && element.contains('('))
        || INLINE_INDEX.is_match(element.trim_start())
}

/// Parse a table constraint (`[CONSTRAINT n] PRIMARY KEY|UNIQUE|FOREIGN KEY|KEY ...`)
///
/// Returns `None` for constraints that carry no structural fact (`CHECK`).
pub fn parse_table_constraint(text: &str) -> Option<ConstraintFact> {
    let (constraint_name, body) = match CONSTRAINT_NAME.captures(text) {
        Some(caps) => (
            caps.name("name").map(|m| unquote_identifier(m.as_str())),
            caps.name("rest").map(|m| m.as_str()).unwrap_or_default().to_string(),
        ),
        None => (None, text.trim().to_string()),
    };
    let upper = body.to_uppercase();

    if upper.starts_with("PRIMARY") {
        let (_, inside, _) = paren_group(&body)?;
        return Some(ConstraintFact::PrimaryKey {
            name: constraint_name,
            columns: key_columns(inside),
        });
    }
    if upper.starts_with("UNIQUE") {
        let (before, inside, _) = paren_group(&body)?;
        // UNIQUE [KEY|INDEX] [name] [CLUSTERED|NONCLUSTERED]
        let inline_name = before
            .split_whitespace()
            .skip(1)
            .find(|w| {
                !matches!(
                    w.to_uppercase().as_str(),
                    "KEY" | "INDEX" | "CLUSTERED" | "NONCLUSTERED" | "NULLS" | "NOT" | "DISTINCT"
                )
            })
            .map(unquote_identifier);
        return Some(ConstraintFact::Unique {
            name: constraint_name.or(inline_name),
            columns: key_columns(inside),
        });
    }
    if upper.starts_with("FOREIGN") {
        let (_, inside, after) = paren_group(&body)?;
        return Some(parse_references(after)?.into_fact(constraint_name, key_columns(inside)));
    }
    if let Some(caps) = INLINE_INDEX.captures(&body) {
        let (before, inside, after) = paren_group(&body)?;
        let name = before
            .split_whitespace()
            .filter(|w| {
                !matches!(
                    w.to_uppercase().as_str(),
                    "KEY" | "INDEX" | "FULLTEXT" | "SPATIAL" | "USING" | "BTREE" | "HASH"
                )
            })
            .map(unquote_identifier)
            .next()
            .unwrap_or_default();
        let using = after
            .to_lowercase()
            .split_whitespace()
            .skip_while(|w| *w != "using")
            .nth(1)
            .map(str::to_string);
        let index_type = caps
            .name("kind")
            .map(|m| m.as_str().to_lowercase())
            .or(using);
        return Some(ConstraintFact::Index {
            name,
            columns: key_columns(inside),
            unique: false,
            index_type,
        });
    }
    None
}

const TYPE_STOP_WORDS: &[&str] = &[
    "NOT", "NULL", "PRIMARY", "UNIQUE", "DEFAULT", "REFERENCES", "CHECK", "CONSTRAINT",
    "AUTO_INCREMENT", "AUTOINCREMENT", "GENERATED", "COMMENT", "COLLATE", "CHARSET", "ON", "AS",
    "SPARSE", "ROWGUIDCOL", "WITH", "KEY", "INVISIBLE", "VISIBLE",
];

/// Split on whitespace at depth zero, outside quotes
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for c in s.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn is_type_stop_word(word: &str, next: Option<&String>) -> bool {
    let upper = word.to_uppercase();
    if upper.starts_with("IDENTITY") {
        return true;
    }
    if upper == "CHARACTER" {
        return next.is_some_and(|n| n.eq_ignore_ascii_case("SET"));
    }
    TYPE_STOP_WORDS.contains(&upper.as_str())
}

/// Apply the flags carried by one column option's text
///
/// Inline `REFERENCES` clauses become foreign-key facts on `column`.
pub fn apply_column_option_text(
    column: &mut SQLColumn,
    constraint_name: Option<String>,
    text: &str,
    facts: &mut Vec<ConstraintFact>,
) {
    let upper = text.to_uppercase();
    if upper.contains("PRIMARY KEY") {
        column.primary_key = true;
        column.nullable = false;
    }
    if upper.starts_with("UNIQUE") || upper.contains(" UNIQUE") {
        column.unique = true;
    }
    if INCREMENT_MARKER.is_match(text) {
        column.increment = true;
    }
    if let Some(on_update) = column_on_update(text) {
        column.on_update = Some(on_update);
    }
    if upper.starts_with("COLLATE ")
        && let Some(collation) = text.get("COLLATE ".len()..)
    {
        column.collation = Some(unquote_identifier(collation));
    }
    if let Some(references) = parse_references(text) {
        facts.push(references.into_fact(constraint_name, vec![column.name.clone()]));
    }
}

/// Parse one column definition (`name type [options]`)
pub fn parse_column_definition(
    adapter: &dyn DialectAdapter,
    definition: &str,
) -> Option<(SQLColumn, Vec<ConstraintFact>)> {
    let caps = COLUMN_HEAD.captures(definition)?;
    let name = adapter.unquote(caps.name("name")?.as_str());
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
    let words = split_words(rest);

    let type_end = words
        .iter()
        .enumerate()
        .position(|(i, w)| is_type_stop_word(w, words.get(i + 1)))
        .unwrap_or(words.len());
    let data_type = words[..type_end].join(" ");
    let mut column = SQLColumn::new(name, data_type);
    let options = &words[type_end..];
    let options_text = options.join(" ");
    let mut facts = Vec::new();

    let mut i = 0;
    while i < options.len() {
        let upper = options[i].to_uppercase();
        match upper.as_str() {
            "NOT" if options.get(i + 1).is_some_and(|w| w.eq_ignore_ascii_case("NULL")) => {
                column.nullable = false;
                i += 1;
            }
            "NULL" => column.nullable = true,
            "DEFAULT" => {
                if let Some(value) = options.get(i + 1) {
                    let mut default = value.clone();
                    i += 1;
                    while default.contains("::")
                        && options.get(i + 1).is_some_and(|w| {
                            matches!(
                                w.to_uppercase().as_str(),
                                "VARYING" | "PRECISION" | "WITH" | "WITHOUT" | "TIME" | "ZONE"
                            )
                        })
                    {
                        i += 1;
                        default.push(' ');
                        default.push_str(&options[i]);
                    }
                    column.default = Some(default);
                }
            }
            "COMMENT" => {
                if let Some(value) = options.get(i + 1) {
                    column.comment = unquote_string_literal(value);
                    i += 1;
                }
            }
            "COLLATE" => {
                if let Some(value) = options.get(i + 1) {
                    column.collation = Some(unquote_identifier(value));
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let constraint_name = CONSTRAINT_NAME
        .captures(&options_text)
        .and_then(|c| c.name("name"))
        .map(|m| unquote_identifier(m.as_str()))
        .filter(|_| options_text.to_uppercase().contains("REFERENCES"));
    let upper = options_text.to_uppercase();
    if upper.contains("PRIMARY KEY") {
        column.primary_key = true;
        column.nullable = false;
    }
    if upper.split_whitespace().any(|w| w == "UNIQUE") {
        column.unique = true;
    }
    if INCREMENT_MARKER.is_match(&options_text) {
        column.increment = true;
    }
    column.on_update = column_on_update(&options_text);
    if let Some(references) = parse_references(&options_text) {
        facts.push(references.into_fact(constraint_name, vec![column.name.clone()]));
    }

    adapter.post_process_column(&mut column);
    Some((column, facts))
}

/// Table comment from MySQL table options (`COMMENT='...'`)
pub fn table_options_comment(options: &str) -> Option<String> {
    TABLE_COMMENT
        .captures(options)
        .and_then(|c| c.name("value"))
        .and_then(|m| unquote_string_literal(m.as_str()))
}

/// Regex extraction of `CREATE TABLE`
pub fn create_table(
    adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let caps = CREATE_TABLE_HEAD
        .captures(sql)
        .ok_or_else(|| "unrecognized CREATE TABLE syntax".to_string())?;
    let head = caps.get(0).ok_or_else(|| "unrecognized CREATE TABLE syntax".to_string())?;
    let table_ref = TableRef::parse(caps.name("name").map(|m| m.as_str()).unwrap_or_default());
    let open = head.end() - 1;
    let close = find_closing_paren(sql, open)
        .ok_or_else(|| format!("unbalanced parentheses in CREATE TABLE {}", table_ref.display()))?;

    let mut table = SQLTable::new(table_ref.name.clone(), table_ref.schema.clone());
    let mut facts = Vec::new();
    let mut skipped = Vec::new();
    for element in split_top_level(&sql[open + 1..close], ',') {
        if is_constraint_element(&element) {
            facts.extend(parse_table_constraint(&element));
            continue;
        }
        match parse_column_definition(adapter, &element) {
            Some((column, column_facts)) => {
                table.columns.push(column);
                facts.extend(column_facts);
            }
            None => skipped.push(element),
        }
    }
    if table.columns.is_empty() {
        return Err(format!("no columns found in CREATE TABLE {}", table_ref.display()));
    }
    table.comment = table_options_comment(&sql[close + 1..]);

    let index = builder.add_table(table);
    for element in skipped {
        builder.warn(format!(
            "Could not read column definition '{}' in {}",
            element,
            table_ref.display()
        ));
    }
    for fact in facts {
        builder.apply_constraint(index, fact);
    }
    Ok(())
}

/// Parse `CREATE [UNIQUE] INDEX name ON table [USING m] (cols)`
pub fn parse_create_index(sql: &str) -> Result<(TableRef, SQLIndex), String> {
    let caps = CREATE_INDEX
        .captures(sql)
        .ok_or_else(|| "unrecognized CREATE INDEX syntax".to_string())?;
    let head = caps.get(0).ok_or_else(|| "unrecognized CREATE INDEX syntax".to_string())?;
    let close = find_closing_paren(sql, head.end() - 1)
        .ok_or_else(|| "unbalanced parentheses in CREATE INDEX".to_string())?;
    let table_ref = TableRef::parse(caps.name("table").map(|m| m.as_str()).unwrap_or_default());
    let name = caps
        .name("name")
        .map(|m| TableRef::parse(m.as_str()).name)
        .unwrap_or_default();
    let columns = key_columns(&sql[head.end()..close]);
    if let Some(expression) = columns.iter().find(|c| c.contains('(')) {
        return Err(format!(
            "expression index {} on {} ({}) is not supported",
            name,
            table_ref.display(),
            expression
        ));
    }
    let mut index = SQLIndex::new(name, columns, caps.name("unique").is_some());
    index.index_type = caps.name("using").map(|m| m.as_str().to_lowercase());
    Ok((table_ref, index))
}

pub fn create_index(
    _adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let (table_ref, index) = parse_create_index(sql)?;
    add_index_to(builder, &table_ref, index);
    Ok(())
}

/// Attach an index to a table resolved by name
pub fn add_index_to(builder: &mut SchemaBuilder, table_ref: &TableRef, index: SQLIndex) {
    match builder.resolve_table(table_ref) {
        Some(table_index) => builder.add_index(table_index, index),
        None => builder.warn(format!(
            "Index {} references unknown table {}, skipped",
            index.name,
            table_ref.display()
        )),
    }
}

/// Parse the actions of an `ALTER TABLE` statement
pub fn parse_alter_table(
    adapter: &dyn DialectAdapter,
    sql: &str,
) -> Result<(TableRef, Vec<AlterAction>), String> {
    let caps = ALTER_TABLE
        .captures(sql)
        .ok_or_else(|| "unrecognized ALTER TABLE syntax".to_string())?;
    let table_ref = TableRef::parse(caps.name("table").map(|m| m.as_str()).unwrap_or_default());
    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();

    let mut actions = Vec::new();
    for clause in split_top_level(rest, ',') {
        let mut words = split_words(&clause);
        // SQL Server: WITH CHECK ADD CONSTRAINT ...
        if words.first().is_some_and(|w| w.eq_ignore_ascii_case("WITH"))
            && words
                .get(1)
                .is_some_and(|w| w.eq_ignore_ascii_case("CHECK") || w.eq_ignore_ascii_case("NOCHECK"))
        {
            words.drain(..2);
        }
        let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
        let keyword = |i: usize| upper.get(i).map(String::as_str).unwrap_or_default();

        match keyword(0) {
            "ADD" => {
                let after_add = words[1..].join(" ");
                if is_constraint_element(&after_add) {
                    if let Some(fact) = parse_table_constraint(&after_add) {
                        actions.push(AlterAction::AddConstraint(fact));
                    }
                    continue;
                }
                let mut skip = 1;
                if keyword(skip) == "COLUMN" {
                    skip += 1;
                }
                if keyword(skip) == "IF" && keyword(skip + 1) == "NOT" && keyword(skip + 2) == "EXISTS" {
                    skip += 3;
                }
                let definition = words.get(skip..).unwrap_or_default().join(" ");
                if let Some((column, facts)) = parse_column_definition(adapter, &definition) {
                    actions.push(AlterAction::AddColumn(column, facts));
                }
            }
            "MODIFY" | "CHANGE" => {
                let mut skip = 1;
                if keyword(skip) == "COLUMN" {
                    skip += 1;
                }
                // CHANGE old new type: the new name wins
                if keyword(0) == "CHANGE" {
                    skip += 1;
                }
                let definition = words.get(skip..).unwrap_or_default().join(" ");
                if let Some((column, _)) = parse_column_definition(adapter, &definition) {
                    actions.push(AlterAction::ModifyColumn(column));
                }
            }
            "ALTER" => {
                let mut at = 1;
                if keyword(at) == "COLUMN" {
                    at += 1;
                }
                let Some(column) = words.get(at).map(|w| adapter.unquote(w)) else {
                    continue;
                };
                match (keyword(at + 1), keyword(at + 2)) {
                    ("SET", "DEFAULT") => {
                        let default = words.get(at + 3..).unwrap_or_default().join(" ");
                        if !default.is_empty() {
                            actions.push(AlterAction::SetDefault { column, default });
                        }
                    }
                    ("SET", "NOT") => actions.push(AlterAction::SetNotNull { column }),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Ok((table_ref, actions))
}

pub fn alter_table(
    adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let (table_ref, actions) = parse_alter_table(adapter, sql)?;
    for action in actions {
        apply_alter_action(builder, &table_ref, action);
    }
    Ok(())
}

/// `CREATE TYPE x AS ENUM (...)` and composite `CREATE TYPE x AS (...)`
pub fn create_type(
    _adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let caps = CREATE_TYPE
        .captures(sql)
        .ok_or_else(|| "unsupported CREATE TYPE form".to_string())?;
    let head = caps.get(0).ok_or_else(|| "unsupported CREATE TYPE form".to_string())?;
    let close = find_closing_paren(sql, head.end() - 1)
        .ok_or_else(|| "unbalanced parentheses in CREATE TYPE".to_string())?;
    let table_ref = TableRef::parse(caps.name("name").map(|m| m.as_str()).unwrap_or_default());
    let body = &sql[head.end()..close];

    let custom_type = if caps.name("enum").is_some() {
        SQLCustomType {
            name: table_ref.name,
            schema: table_ref.schema,
            kind: CustomTypeKind::Enum,
            values: split_top_level(body, ',')
                .iter()
                .filter_map(|v| unquote_string_literal(v))
                .collect(),
            fields: Vec::new(),
        }
    } else {
        SQLCustomType {
            name: table_ref.name,
            schema: table_ref.schema,
            kind: CustomTypeKind::Composite,
            values: Vec::new(),
            fields: split_top_level(body, ',')
                .iter()
                .filter_map(|f| {
                    let words = split_words(f);
                    let (name, field_type) = words.split_first()?;
                    Some((unquote_identifier(name), field_type.join(" ")))
                })
                .collect(),
        }
    };
    builder.add_type(custom_type);
    Ok(())
}

/// `COMMENT ON TABLE|COLUMN x IS '...'`
pub fn comment_on(
    _adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let caps = COMMENT_ON
        .captures(sql)
        .ok_or_else(|| "unsupported COMMENT ON form".to_string())?;
    let kind = caps.name("kind").map(|m| m.as_str().to_uppercase()).unwrap_or_default();
    let target = caps.name("target").map(|m| m.as_str()).unwrap_or_default();
    let comment = caps
        .name("value")
        .and_then(|m| unquote_string_literal(m.as_str()));

    if kind == "TABLE" {
        let table_ref = TableRef::parse(target);
        if let Some(index) = builder.resolve_table(&table_ref) {
            builder.set_table_comment(index, comment);
        }
        return Ok(());
    }

    let mut parts = super::text::split_qualified_name(target);
    let column = parts.pop().ok_or_else(|| "COMMENT ON COLUMN without column".to_string())?;
    let name = parts.pop().ok_or_else(|| "COMMENT ON COLUMN without table".to_string())?;
    let table_ref = TableRef::new(name, parts.pop());
    if let Some(index) = builder.resolve_table(&table_ref) {
        builder.set_column_comment(index, &column, comment);
    }
    Ok(())
}

/// Byte offset of the first top-level `FROM` keyword
fn top_level_from(query: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let bytes = query.as_bytes();
    for (idx, c) in query.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth -= 1,
            'F' | 'f' if depth == 0 => {
                let word = query.get(idx..idx + 4)?;
                let before_ok = idx == 0 || !(bytes[idx - 1] as char).is_alphanumeric();
                let after_ok = bytes
                    .get(idx + 4)
                    .is_none_or(|b| !(*b as char).is_alphanumeric() && *b != b'_');
                if word.eq_ignore_ascii_case("FROM") && before_ok && after_ok {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Output column names of a `SELECT` list
pub fn projection_names(query: &str) -> Vec<String> {
    let trimmed = query.trim().trim_start_matches('(').trim_start();
    let upper = trimmed.to_uppercase();
    if !upper.starts_with("SELECT") {
        return Vec::new();
    }
    let mut select = trimmed["SELECT".len()..].trim_start();
    if select
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("DISTINCT "))
    {
        select = &select[9..];
    }
    let projection = match top_level_from(select) {
        Some(end) => &select[..end],
        None => select,
    };

    split_top_level(projection, ',')
        .into_iter()
        .filter_map(|item| {
            let words = split_words(&item);
            let last = words.last()?;
            if last.ends_with('*') {
                return None;
            }
            if words.len() >= 2 {
                let previous = words[words.len() - 2].to_uppercase();
                let is_identifier = !last.contains('(') && !last.contains('\'');
                if previous == "AS" || (is_identifier && !is_operator(&previous)) {
                    return Some(unquote_identifier(last));
                }
            }
            let expression = item.trim();
            if let Some(paren) = expression.find('(') {
                return Some(expression[..paren].trim().to_lowercase());
            }
            super::text::split_qualified_name(expression).pop()
        })
        .collect()
}

fn is_operator(word: &str) -> bool {
    word.chars().all(|c| "+-*/%|=<>!&^~:".contains(c))
        || matches!(word, "AND" | "OR" | "NOT" | "IS" | "THEN" | "ELSE" | "WHEN" | "CASE" | "IN" | "LIKE")
}

/// `CREATE [MATERIALIZED] VIEW name [(cols)] AS SELECT ...`
pub fn create_view(
    adapter: &dyn DialectAdapter,
    sql: &str,
    builder: &mut SchemaBuilder,
) -> Result<(), String> {
    let caps = CREATE_VIEW
        .captures(sql)
        .ok_or_else(|| "unrecognized CREATE VIEW syntax".to_string())?;
    let table_ref = TableRef::parse(caps.name("name").map(|m| m.as_str()).unwrap_or_default());
    let columns = match caps.name("cols") {
        Some(cols) => split_identifier_list(cols.as_str()),
        None => projection_names(caps.name("query").map(|m| m.as_str()).unwrap_or_default()),
    };

    let mut view = SQLTable::new(table_ref.name, table_ref.schema);
    view.is_view = true;
    view.is_materialized_view = caps.name("mat").is_some();
    for name in columns {
        if view.column(&name).is_none() {
            view.columns.push(SQLColumn::new(adapter.unquote(&name), "varchar"));
        }
    }
    builder.add_table(view);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sql::mysql::MySqlAdapter;
    use crate::import::sql::postgres::PostgresAdapter;

    #[test]
    fn test_parse_table_constraint_variants() {
        let pk = parse_table_constraint("CONSTRAINT users_pkey PRIMARY KEY (id)").unwrap();
        assert_eq!(
            pk,
            ConstraintFact::PrimaryKey {
                name: Some("users_pkey".to_string()),
                columns: vec!["id".to_string()],
            }
        );

        let fk = parse_table_constraint(
            "FOREIGN KEY (user_id) REFERENCES public.users(id) ON DELETE SET NULL ON UPDATE CASCADE",
        )
        .unwrap();
        match fk {
            ConstraintFact::ForeignKey {
                target,
                target_columns,
                on_update,
                on_delete,
                ..
            } => {
                assert_eq!(target.name, "users");
                assert_eq!(target.schema.as_deref(), Some("public"));
                assert_eq!(target_columns, vec!["id".to_string()]);
                assert_eq!(on_update.as_deref(), Some("CASCADE"));
                assert_eq!(on_delete.as_deref(), Some("SET NULL"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let unique = parse_table_constraint("UNIQUE KEY `uq_email` (`email`)").unwrap();
        assert_eq!(
            unique,
            ConstraintFact::Unique {
                name: Some("uq_email".to_string()),
                columns: vec!["email".to_string()],
            }
        );

        let index = parse_table_constraint("KEY `idx_name` (`name`(50)) USING BTREE").unwrap();
        match index {
            ConstraintFact::Index { name, columns, index_type, .. } => {
                assert_eq!(name, "idx_name");
                assert_eq!(columns, vec!["name".to_string()]);
                assert_eq!(index_type.as_deref(), Some("btree"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(parse_table_constraint("CHECK (price > 0)").is_none());
    }

    #[test]
    fn test_parse_column_definition() {
        let adapter = PostgresAdapter;
        let (column, facts) = parse_column_definition(
            &adapter,
            "\"owner_id\" integer NOT NULL DEFAULT 0 REFERENCES users (id) ON DELETE CASCADE",
        )
        .unwrap();
        assert_eq!(column.name, "owner_id");
        assert_eq!(column.data_type, "integer");
        assert!(!column.nullable);
        assert_eq!(column.default.as_deref(), Some("0"));
        assert_eq!(facts.len(), 1);

        let (column, _) = parse_column_definition(
            &adapter,
            "status character varying(20) DEFAULT 'new'::character varying",
        )
        .unwrap();
        assert_eq!(column.data_type, "character varying(20)");
        assert_eq!(column.default.as_deref(), Some("'new'::character varying"));
        assert_eq!(column.type_args.unwrap().length.as_deref(), Some("20"));

        let (column, _) = parse_column_definition(&adapter, "id bigserial PRIMARY KEY").unwrap();
        assert!(column.primary_key);
        assert!(column.increment);
        assert!(!column.nullable);
    }

    #[test]
    fn test_column_on_update_refresh() {
        let adapter = MySqlAdapter::mysql();
        let (column, facts) = parse_column_definition(
            &adapter,
            "`updated_at` timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE current_timestamp(3)",
        )
        .unwrap();
        assert_eq!(column.default.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(column.on_update.as_deref(), Some("CURRENT_TIMESTAMP(3)"));
        assert!(facts.is_empty());

        // a foreign-key action is not a refresh clause
        let (column, _) = parse_column_definition(
            &adapter,
            "`user_id` int REFERENCES users (id) ON UPDATE CASCADE",
        )
        .unwrap();
        assert_eq!(column.on_update, None);
    }

    #[test]
    fn test_is_constraint_element() {
        assert!(is_constraint_element("PRIMARY KEY (id)"));
        assert!(is_constraint_element("UNIQUE (a, b)"));
        assert!(is_constraint_element("KEY idx_a (a)"));
        assert!(is_constraint_element("CONSTRAINT fk FOREIGN KEY (a) REFERENCES b(id)"));
        assert!(!is_constraint_element("primary_contact varchar(20)"));
        assert!(!is_constraint_element("key_name varchar(20)"));
    }

    #[test]
    fn test_parse_create_index() {
        let (table, index) =
            parse_create_index("CREATE UNIQUE INDEX idx_email ON public.users USING btree (email)").unwrap();
        assert_eq!(table.name, "users");
        assert_eq!(index.name, "idx_email");
        assert!(index.unique);
        assert_eq!(index.index_type.as_deref(), Some("btree"));
        assert_eq!(index.columns, vec!["email".to_string()]);

        assert!(parse_create_index("CREATE INDEX i ON t (lower(name))").is_err());
    }

    #[test]
    fn test_parse_alter_table_actions() {
        let adapter = PostgresAdapter;
        let (table, actions) = parse_alter_table(
            &adapter,
            "ALTER TABLE ONLY public.users ALTER COLUMN id SET DEFAULT nextval('public.users_id_seq'::regclass)",
        )
        .unwrap();
        assert_eq!(table.schema.as_deref(), Some("public"));
        assert_eq!(
            actions,
            vec![AlterAction::SetDefault {
                column: "id".to_string(),
                default: "nextval('public.users_id_seq'::regclass)".to_string(),
            }]
        );

        let (_, actions) = parse_alter_table(
            &adapter,
            "ALTER TABLE [dbo].[Orders] WITH CHECK ADD CONSTRAINT [FK_Orders_Users] FOREIGN KEY([UserId]) REFERENCES [dbo].[Users] ([Id])",
        )
        .unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].dump_phase(), 2);
    }

    #[test]
    fn test_projection_names() {
        let names = projection_names("SELECT u.id, u.name AS user_name, count(*) total, o.* FROM users u JOIN orders o ON o.user_id = u.id");
        assert_eq!(names, vec!["id", "user_name", "total"]);
    }
}
