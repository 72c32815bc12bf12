//! Lexical helpers: statement splitting, identifier quoting, top-level list splitting
//!
//! Everything here is quote-aware. Single-quoted strings, double-quoted,
//! backtick and bracket identifiers, and PostgreSQL dollar-quoted bodies are
//! treated as opaque.

use once_cell::sync::Lazy;
use regex::Regex;

static DOLLAR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[A-Za-z_][A-Za-z0-9_]*\$|^\$\$").expect("valid regex"));

/// One statement cut out of a script, with the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub text: String,
    pub line: usize,
}

/// Statement families the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    CreateTable,
    CreateIndex,
    AlterTable,
    CreateView,
    CreateType,
    CommentOn,
    Other,
}

/// Classify a statement by its leading keywords
pub fn classify(statement: &str) -> StatementKind {
    let tokens: Vec<String> = statement
        .split_whitespace()
        .take(10)
        .map(|t| t.to_uppercase())
        .collect();
    let first = tokens.first().map(String::as_str);
    match first {
        Some("CREATE") => {
            for token in tokens.iter().skip(1) {
                match token.as_str() {
                    "OR" | "REPLACE" | "GLOBAL" | "LOCAL" | "TEMP" | "TEMPORARY" | "UNLOGGED"
                    | "UNIQUE" | "CLUSTERED" | "NONCLUSTERED" | "MATERIALIZED" | "RECURSIVE"
                    | "FULLTEXT" | "SPATIAL" | "ALGORITHM=UNDEFINED" | "SQL" | "SECURITY"
                    | "DEFINER" | "INVOKER" => continue,
                    "TABLE" => return StatementKind::CreateTable,
                    "INDEX" => return StatementKind::CreateIndex,
                    "VIEW" => return StatementKind::CreateView,
                    "TYPE" => return StatementKind::CreateType,
                    t if t.starts_with("DEFINER=") || t.starts_with("ALGORITHM=") => continue,
                    _ => return StatementKind::Other,
                }
            }
            StatementKind::Other
        }
        Some("ALTER") if tokens.get(1).map(String::as_str) == Some("TABLE") => {
            StatementKind::AlterTable
        }
        Some("COMMENT") if tokens.get(1).map(String::as_str) == Some("ON") => {
            StatementKind::CommentOn
        }
        _ => StatementKind::Other,
    }
}

/// Split a script into statements
///
/// Statements end at `;` outside quotes and comments, or at a line holding
/// only `GO` (SQL Server batches). Comments are dropped from the output.
pub fn split_statements(sql: &str) -> Vec<RawStatement> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut line = 1;
    let mut start_line = 1;
    let mut at_line_start = true;
    let mut i = 0;

    let flush = |current: &mut String, start_line: usize, out: &mut Vec<RawStatement>| {
        let text = current.trim();
        if !text.is_empty() {
            out.push(RawStatement {
                text: text.to_string(),
                line: start_line,
            });
        }
        current.clear();
    };

    while i < chars.len() {
        let c = chars[i];

        if at_line_start {
            at_line_start = false;
            let end = chars[i..]
                .iter()
                .position(|&ch| ch == '\n')
                .map(|p| i + p)
                .unwrap_or(chars.len());
            let line_text: String = chars[i..end].iter().collect();
            let trimmed = line_text.trim();
            let is_go = trimmed.eq_ignore_ascii_case("go")
                || trimmed
                    .get(..3)
                    .zip(trimmed.get(3..))
                    .is_some_and(|(head, count)| {
                        head.eq_ignore_ascii_case("go ")
                            && count.trim().chars().all(|ch| ch.is_ascii_digit())
                    });
            if is_go {
                flush(&mut current, start_line, &mut statements);
                i = end;
                continue;
            }
        }

        if c == '\n' {
            line += 1;
            at_line_start = true;
            if !current.is_empty() {
                current.push(c);
            }
            i += 1;
            continue;
        }

        if c == '-' && chars.get(i + 1) == Some(&'-') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            i += 2;
            current.push(' ');
            continue;
        }

        if current.trim().is_empty() && !c.is_whitespace() {
            start_line = line;
        }

        match c {
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                current.push(c);
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    current.push(ch);
                    i += 1;
                    if ch == '\n' {
                        line += 1;
                    }
                    if ch == close {
                        if close != ']' && chars.get(i) == Some(&close) {
                            current.push(close);
                            i += 1;
                            continue;
                        }
                        break;
                    }
                }
            }
            '$' => {
                let rest: String = chars[i..chars.len().min(i + 64)].iter().collect();
                if let Some(tag) = DOLLAR_TAG.find(&rest) {
                    let tag: Vec<char> = tag.as_str().chars().collect();
                    current.extend(tag.iter());
                    i += tag.len();
                    while i < chars.len() {
                        if chars[i..].starts_with(&tag) {
                            current.extend(tag.iter());
                            i += tag.len();
                            break;
                        }
                        if chars[i] == '\n' {
                            line += 1;
                        }
                        current.push(chars[i]);
                        i += 1;
                    }
                } else {
                    current.push(c);
                    i += 1;
                }
            }
            ';' => {
                flush(&mut current, start_line, &mut statements);
                i += 1;
            }
            _ => {
                current.push(c);
                i += 1;
            }
        }
    }
    flush(&mut current, start_line, &mut statements);
    statements
}

/// Byte index of the parenthesis closing the one at `open`
pub fn find_closing_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, c) in s.char_indices().skip_while(|(idx, _)| *idx < open) {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` at parenthesis depth zero, outside quotes
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
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
            '[' => {
                quote = Some(']');
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
            c if c == sep && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Strip one level of identifier quoting (`"x"`, `` `x` ``, `[x]`)
pub fn unquote_identifier(s: &str) -> String {
    let s = s.trim();
    let mut chars = s.chars();
    match (chars.next(), s.chars().last()) {
        (Some('"'), Some('"')) if s.len() >= 2 => s[1..s.len() - 1].replace("\"\"", "\""),
        (Some('`'), Some('`')) if s.len() >= 2 => s[1..s.len() - 1].replace("``", "`"),
        (Some('['), Some(']')) if s.len() >= 2 => s[1..s.len() - 1].replace("]]", "]"),
        _ => s.to_string(),
    }
}

/// Split `a.b."c.d"` into unquoted parts, keeping dots inside quotes
pub fn split_qualified_name(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in s.trim().chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '[' => {
                quote = Some(']');
                current.push(c);
            }
            '.' => {
                parts.push(unquote_identifier(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(unquote_identifier(&current));
    parts.retain(|p| !p.is_empty());
    parts
}

/// Decode a single-quoted SQL string literal (`'it''s'`, `N'x'`, `E'x'`)
pub fn unquote_string_literal(s: &str) -> Option<String> {
    let s = s.trim();
    let body = s
        .strip_prefix(['N', 'n', 'E', 'e'])
        .filter(|rest| rest.starts_with('\''))
        .unwrap_or(s);
    if body.len() >= 2 && body.starts_with('\'') && body.ends_with('\'') {
        Some(body[1..body.len() - 1].replace("''", "'"))
    } else {
        None
    }
}

/// Split a comma-separated identifier list, dropping sort order and unquoting
pub fn split_identifier_list(s: &str) -> Vec<String> {
    split_top_level(s, ',')
        .into_iter()
        .map(|part| {
            let mut words: Vec<&str> = part.split_whitespace().collect();
            while words.len() > 1
                && matches!(
                    words.last().map(|w| w.to_uppercase()).as_deref(),
                    Some("ASC") | Some("DESC") | Some("NULLS") | Some("FIRST") | Some("LAST")
                )
            {
                words.pop();
            }
            unquote_identifier(&words.join(" "))
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// Collapse runs of whitespace into single spaces
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
