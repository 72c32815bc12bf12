//! SQL Diagram SDK - multi-dialect DDL import and export
//!
//! Provides unified interfaces for:
//! - Importing PostgreSQL, MySQL/MariaDB, SQL Server and SQLite DDL (hand
//!   written or dumped) into a dialect-neutral diagram
//! - Exporting a diagram as DDL for any of those dialects, or as generic SQL
//! - Validation logic (dangling references, naming conflicts, key cycles)

pub mod export;
pub mod import;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use export::{
    DialectExporter, ExportRequest, ExportResult, SQLExporter, export_base_sql,
};
pub use import::{
    ImportError, ImportOptions, ImportResult, LayoutConfig, SQLImporter, SqlImportRequest,
    sql_import_to_diagram,
};
pub use validation::{RelationshipValidator, TableValidator, validate_diagram};

// Re-export models
pub use models::enums::*;
pub use models::{DBCustomType, DBField, DBIndex, DBRelationship, DBTable, DataType, Diagram};
