//! Export functionality
//!
//! Renders a [`Diagram`] back into DDL:
//! - per-dialect exporters for PostgreSQL, MySQL/MariaDB, SQL Server and SQLite
//! - a conservative generic renderer for cross-dialect and DBML-flow output
//!
//! [`export_base_sql`] picks between them.

pub mod alignment;
pub mod common;
pub mod defaults;
pub mod generic;
pub mod mysql;
pub mod postgres;
pub mod quote;
pub mod sqlite;
pub mod sqlserver;
pub mod types;

pub use alignment::align_foreign_key_types;
pub use generic::GenericExporter;
pub use mysql::MySqlExporter;
pub use postgres::PostgresExporter;
pub use sqlite::SqliteExporter;
pub use sqlserver::SqlServerExporter;

use crate::models::{DatabaseType, Diagram};
use tracing::debug;

/// Result of an export operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Input of [`export_base_sql`]
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub diagram: &'a Diagram,
    pub target: DatabaseType,
    /// Output feeds a DBML parser: quote every identifier, skip the
    /// per-dialect fast path
    pub is_dbml_flow: bool,
    /// Emit only the foreign-key block
    pub only_relationships: bool,
}

impl<'a> ExportRequest<'a> {
    pub fn new(diagram: &'a Diagram, target: DatabaseType) -> Self {
        Self {
            diagram,
            target,
            is_dbml_flow: false,
            only_relationships: false,
        }
    }

    pub fn with_dbml_flow(mut self, is_dbml_flow: bool) -> Self {
        self.is_dbml_flow = is_dbml_flow;
        self
    }

    pub fn with_only_relationships(mut self, only_relationships: bool) -> Self {
        self.only_relationships = only_relationships;
        self
    }
}

/// Native DDL writer for one dialect
pub trait DialectExporter {
    fn database_type(&self) -> DatabaseType;

    /// DDL for `diagram`; empty when it has no tables
    fn export(&self, diagram: &Diagram, only_relationships: bool) -> String;
}

/// Native exporter for `database_type`, if there is one
pub fn exporter_for(database_type: DatabaseType) -> Option<Box<dyn DialectExporter>> {
    match database_type {
        DatabaseType::Postgresql => Some(Box::new(PostgresExporter)),
        DatabaseType::Mysql => Some(Box::new(MySqlExporter::mysql())),
        DatabaseType::Mariadb => Some(Box::new(MySqlExporter::mariadb())),
        DatabaseType::SqlServer => Some(Box::new(SqlServerExporter)),
        DatabaseType::Sqlite => Some(Box::new(SqliteExporter)),
        _ => None,
    }
}

/// Render `request.diagram` as DDL for `request.target`
///
/// A diagram already in the target dialect goes straight to that dialect's
/// exporter. Everything else is type-aligned and rendered by
/// [`GenericExporter`].
///
/// # Example
///
/// ```rust
/// use sql_diagram_sdk::export::{ExportRequest, export_base_sql};
/// use sql_diagram_sdk::models::{DBField, DBIndex, DBTable, DataType, DatabaseType, Diagram};
///
/// let mut id = DBField::new("id", DataType::new("integer"));
/// id.primary_key = true;
/// let mut table = DBTable::new("table_1", vec![id]);
/// let pk = table.fields[0].id.clone();
/// table.indexes.push(DBIndex::primary_key("", vec![pk]));
/// let mut diagram = Diagram::new("example", DatabaseType::Generic);
/// diagram.tables.push(table);
///
/// let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
/// assert!(sql.contains("PRIMARY KEY (\"id\")"));
/// assert!(!sql.contains("CONSTRAINT"));
/// ```
pub fn export_base_sql(request: &ExportRequest) -> String {
    let diagram = request.diagram;
    if diagram.tables.is_empty() {
        return String::new();
    }

    if !request.is_dbml_flow
        && request.target != DatabaseType::Generic
        && diagram.database_type == request.target
        && let Some(exporter) = exporter_for(request.target)
    {
        debug!(target_dialect = %request.target, "same-dialect export");
        return exporter.export(diagram, request.only_relationships);
    }

    debug!(
        source = %diagram.database_type,
        target_dialect = %request.target,
        dbml = request.is_dbml_flow,
        "generic export"
    );
    let aligned = align_foreign_key_types(diagram);
    GenericExporter::new(request.target, request.is_dbml_flow)
        .export(&aligned, request.only_relationships)
}

/// Exporter for SQL DDL
#[derive(Debug, Default, Clone, Copy)]
pub struct SQLExporter;

impl SQLExporter {
    /// Export `diagram` for `target` (SDK interface)
    ///
    /// # Example
    ///
    /// ```rust
    /// use sql_diagram_sdk::export::SQLExporter;
    /// use sql_diagram_sdk::models::{DatabaseType, Diagram};
    ///
    /// let diagram = Diagram::new("empty", DatabaseType::Mysql);
    /// let result = SQLExporter.export(&diagram, DatabaseType::Mysql);
    /// assert_eq!(result.format, "sql");
    /// assert!(result.content.is_empty());
    /// ```
    pub fn export(&self, diagram: &Diagram, target: DatabaseType) -> ExportResult {
        self.export_request(&ExportRequest::new(diagram, target))
    }

    pub fn export_request(&self, request: &ExportRequest) -> ExportResult {
        ExportResult {
            content: export_base_sql(request),
            format: "sql".to_string(),
        }
    }
}
