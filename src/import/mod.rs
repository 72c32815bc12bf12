//! Import functionality
//!
//! Turns SQL DDL into a [`Diagram`]:
//! - [`sql`] parses scripts of one dialect into an intermediate result
//! - [`converter`] lays that result out as diagram tables and relationships
//!
//! [`sql_import_to_diagram`] runs both steps.

pub mod converter;
pub mod sql;

pub use converter::convert;
pub use sql::SQLImporter;

use crate::models::{DatabaseType, Diagram};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No SQL importer for dialect {0}")]
    UnsupportedDialect(DatabaseType),
    #[error("Parse error ({dialect}){}: {message}", position_suffix(.line, .column))]
    Parse {
        dialect: DatabaseType,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

fn position_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {}, column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}

/// Grid layout and colors applied to imported tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Tables per grid row
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
    /// Table colors, assigned round-robin in import order
    pub palette: Vec<String>,
    pub view_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            spacing_x: 300.0,
            spacing_y: 300.0,
            palette: [
                "#8eb7ff", "#ff8e8e", "#8eff9a", "#ffd98e", "#c48eff", "#8efff1", "#ff8ed9",
                "#b5ff8e",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            view_color: "#b0b0b0".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Top-left corner of the `index`-th table
    pub fn position(&self, index: usize) -> (f64, f64) {
        let columns = self.columns.max(1);
        let col = index % columns;
        let row = index / columns;
        (col as f64 * self.spacing_x, row as f64 * self.spacing_y)
    }

    pub fn color(&self, index: usize, is_view: bool) -> String {
        if is_view || self.palette.is_empty() {
            return self.view_color.clone();
        }
        self.palette[index % self.palette.len()].clone()
    }
}

/// Options of one SQL import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    pub layout: LayoutConfig,
    /// Diagram name; defaults to `SQL Import (<dialect>)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram_name: Option<String>,
    /// Keep `CREATE VIEW` results as view tables
    pub include_views: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            diagram_name: None,
            include_views: true,
        }
    }
}

impl ImportOptions {
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_diagram_name(mut self, name: impl Into<String>) -> Self {
        self.diagram_name = Some(name.into());
        self
    }

    pub fn with_include_views(mut self, include_views: bool) -> Self {
        self.include_views = include_views;
        self
    }

    /// Load options from YAML
    ///
    /// # Example
    ///
    /// ```rust
    /// use sql_diagram_sdk::import::ImportOptions;
    ///
    /// let options = ImportOptions::from_yaml("includeViews: false\nlayout:\n  columns: 6\n").unwrap();
    /// assert!(!options.include_views);
    /// assert_eq!(options.layout.columns, 6);
    /// assert_eq!(options.layout.spacing_x, 300.0);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ImportError> {
        serde_yaml::from_str(yaml).map_err(|e| ImportError::Config(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        serde_json::from_str(json).map_err(|e| ImportError::Config(e.to_string()))
    }
}

/// Input of [`sql_import_to_diagram`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqlImportRequest {
    pub sql_content: String,
    /// `Generic` runs dialect detection
    #[serde(default)]
    pub source_database_type: DatabaseType,
    /// Dialect the diagram is meant for; `Generic` keeps the source dialect
    #[serde(default)]
    pub target_database_type: DatabaseType,
    #[serde(default)]
    pub options: ImportOptions,
}

impl SqlImportRequest {
    pub fn new(sql_content: impl Into<String>) -> Self {
        Self {
            sql_content: sql_content.into(),
            source_database_type: DatabaseType::Generic,
            target_database_type: DatabaseType::Generic,
            options: ImportOptions::default(),
        }
    }

    pub fn with_source(mut self, database_type: DatabaseType) -> Self {
        self.source_database_type = database_type;
        self
    }

    pub fn with_target(mut self, database_type: DatabaseType) -> Self {
        self.target_database_type = database_type;
        self
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub diagram: Diagram,
    /// Dialect the script was parsed as (after detection)
    pub source_database_type: DatabaseType,
    /// Parse and conversion diagnostics, in the order they were raised
    pub warnings: Vec<String>,
}

/// Parse `request.sql_content` and convert it into a diagram
///
/// # Example
///
/// ```rust
/// use sql_diagram_sdk::import::{SqlImportRequest, sql_import_to_diagram};
/// use sql_diagram_sdk::models::DatabaseType;
///
/// let request = SqlImportRequest::new(
///     "CREATE TABLE users (id SERIAL PRIMARY KEY, email VARCHAR(255) NOT NULL UNIQUE);",
/// );
/// let result = sql_import_to_diagram(request).unwrap();
/// assert_eq!(result.source_database_type, DatabaseType::Postgresql);
/// assert_eq!(result.diagram.tables[0].fields.len(), 2);
/// ```
///
/// # Errors
///
/// See [`ImportError`]; no partial diagram is returned.
pub fn sql_import_to_diagram(request: SqlImportRequest) -> Result<ImportResult, ImportError> {
    let source = SQLImporter::new(request.source_database_type)
        .resolve_database_type(&request.sql_content);
    let parsed = SQLImporter::new(source).parse(&request.sql_content)?;
    let target = match request.target_database_type {
        DatabaseType::Generic => source,
        other => other,
    };

    let (diagram, conversion_warnings) = convert(&parsed, source, target, &request.options)?;
    let mut warnings = parsed.warnings;
    warnings.extend(conversion_warnings);
    info!(
        source = %source,
        target = %target,
        tables = diagram.tables.len(),
        relationships = diagram.relationships.len(),
        warnings = warnings.len(),
        "SQL import finished"
    );
    Ok(ImportResult {
        diagram,
        source_database_type: source,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_grid() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.position(0), (0.0, 0.0));
        assert_eq!(layout.position(3), (900.0, 0.0));
        assert_eq!(layout.position(5), (300.0, 300.0));
        assert_eq!(layout.color(1, true), "#b0b0b0");
        assert_eq!(layout.color(8, false), layout.palette[0]);
    }

    #[test]
    fn test_options_from_json_and_bad_yaml() {
        let options = ImportOptions::from_json(r#"{"diagramName": "Shop"}"#).unwrap();
        assert_eq!(options.diagram_name.as_deref(), Some("Shop"));
        assert!(options.include_views);
        assert!(matches!(
            ImportOptions::from_yaml("includeViews: [nope"),
            Err(ImportError::Config(_))
        ));
    }

    #[test]
    fn test_parse_error_display() {
        let error = ImportError::Parse {
            dialect: DatabaseType::Mysql,
            message: "unexpected token".to_string(),
            line: Some(3),
            column: Some(7),
        };
        assert_eq!(
            error.to_string(),
            "Parse error (mysql) at line 3, column 7: unexpected token"
        );
    }

    #[test]
    fn test_unsupported_dialect_error() {
        let request = SqlImportRequest::new("CREATE TABLE t (a int);").with_source(DatabaseType::Clickhouse);
        assert!(matches!(
            sql_import_to_diagram(request),
            Err(ImportError::UnsupportedDialect(DatabaseType::Clickhouse))
        ));
    }
}
