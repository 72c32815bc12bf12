//! SQL dialect detection
//!
//! An ordered battery of signature checks. The first family whose signature
//! matches wins; PostgreSQL is the fallback. Detection never fails.

use crate::models::DatabaseType;
use once_cell::sync::Lazy;
use regex::Regex;

static BRACKET_QUALIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\w+\]\s*\.\s*\[\w+\]").expect("valid regex"));
static GO_BATCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^\s*GO\s*$").expect("valid regex"));
static MSSQL_SIGNATURES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bSET\s+ANSI_NULLS\b|\bSET\s+QUOTED_IDENTIFIER\b|\bIDENTITY\s*\(\s*\d+\s*,\s*\d+\s*\)|\bNVARCHAR\s*\(\s*MAX\s*\)|\bUNIQUEIDENTIFIER\b|\bsp_addextendedproperty\b")
        .expect("valid regex")
});
static MYSQL_SIGNATURES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bENGINE\s*=|\bAUTO_INCREMENT\b|\bDEFAULT\s+CHARSET\b|\bUNSIGNED\b")
        .expect("valid regex")
});
static BACKTICK_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"`\w+`").expect("valid regex"));
static POSTGRES_SIGNATURES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:BIG|SMALL)?SERIAL\b|\bCREATE\s+EXTENSION\b|::\s*\w+|\bALTER\s+TABLE\s+ONLY\b|\bJSONB\b|\bnextval\s*\(|\bCREATE\s+TYPE\s+\S+\s+AS\s+ENUM\b|\bTIMESTAMPTZ\b")
        .expect("valid regex")
});
static SQLITE_SIGNATURES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bAUTOINCREMENT\b|\bPRAGMA\b|\bWITHOUT\s+ROWID\b|\bsqlite_sequence\b")
        .expect("valid regex")
});

/// Guess the dialect of a script
///
/// # Example
///
/// ```rust
/// use sql_diagram_sdk::import::sql::detect::detect_database_type;
/// use sql_diagram_sdk::models::DatabaseType;
///
/// let sql = "CREATE TABLE `t` (`id` int NOT NULL AUTO_INCREMENT) ENGINE=InnoDB;";
/// assert_eq!(detect_database_type(sql), DatabaseType::Mysql);
/// ```
pub fn detect_database_type(sql: &str) -> DatabaseType {
    if sql.contains("MariaDB dump") {
        return DatabaseType::Mariadb;
    }
    if sql.contains("MySQL dump") {
        return DatabaseType::Mysql;
    }
    if is_pg_dump(sql) {
        return DatabaseType::Postgresql;
    }
    if BRACKET_QUALIFIED.is_match(sql) || GO_BATCH.is_match(sql) || MSSQL_SIGNATURES.is_match(sql)
    {
        return DatabaseType::SqlServer;
    }
    if BACKTICK_IDENT.is_match(sql) || MYSQL_SIGNATURES.is_match(sql) {
        return DatabaseType::Mysql;
    }
    if POSTGRES_SIGNATURES.is_match(sql) {
        return DatabaseType::Postgresql;
    }
    if SQLITE_SIGNATURES.is_match(sql) {
        return DatabaseType::Sqlite;
    }
    DatabaseType::Postgresql
}

/// `pg_dump` output: banner, session settings, `ALTER TABLE ONLY`, catalog calls
pub fn is_pg_dump(sql: &str) -> bool {
    let markers = [
        sql.contains("PostgreSQL database dump"),
        sql.contains("SET statement_timeout"),
        sql.contains("ALTER TABLE ONLY"),
        sql.contains("SELECT pg_catalog."),
    ];
    markers[0] || markers.iter().filter(|m| **m).count() >= 2
}

/// `mysqldump` / `mariadb-dump` output: banner or versioned `/*!40101` directives
pub fn is_mysql_dump(sql: &str) -> bool {
    sql.contains("MySQL dump") || sql.contains("MariaDB dump") || sql.contains("/*!40101")
}
