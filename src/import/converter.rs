//! Diagram converter
//!
//! Turns a [`SQLParserResult`] into a [`Diagram`]: fresh ids, grid layout,
//! catalog data types, index field ids and oriented relationships.

use super::sql::result::{SQLColumn, SQLCustomType, SQLForeignKey, SQLParserResult, SQLTable};
use super::sql::text::{split_top_level, unquote_string_literal};
use super::sql::types::{normalize_type_name, parse_type};
use super::{ImportError, ImportOptions};
use crate::models::data_type::{lookup_generic_type, type_args_kind};
use crate::models::{
    Cardinality, CustomTypeKind, DBCustomType, DBCustomTypeField, DBField, DBIndex,
    DBRelationship, DBTable, DataType, DatabaseType, Diagram, TypeArgsKind,
};
use crate::validation::diagram::validate_diagram;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Map a raw column type onto the catalog
///
/// Exact id, then synonym, then a declared custom type (kept by name), then
/// `varchar`.
pub fn map_data_type(raw: &str, custom_types: &[SQLCustomType]) -> DataType {
    let parsed = parse_type(raw);
    if let Some(data_type) = lookup_generic_type(&parsed.base) {
        return data_type;
    }
    if let Some(custom) = custom_types
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(&parsed.base))
    {
        return DataType::new(custom.name.clone());
    }
    debug!(raw_type = %raw, "unknown type mapped to varchar");
    DataType::varchar()
}

/// Values of an inline `enum('a','b')` column type
fn inline_enum_values(raw: &str) -> Option<Vec<String>> {
    let open = raw.find('(')?;
    let close = raw.rfind(')').filter(|close| *close > open)?;
    if normalize_type_name(&raw[..open]) != "enum" {
        return None;
    }
    let values: Vec<String> = split_top_level(&raw[open + 1..close], ',')
        .iter()
        .filter_map(|v| unquote_string_literal(v.trim()))
        .collect();
    (!values.is_empty()).then_some(values)
}

fn convert_field(
    table: &SQLTable,
    column: &SQLColumn,
    custom_types: &[SQLCustomType],
    inline_types: &mut Vec<DBCustomType>,
) -> DBField {
    let parsed = parse_type(&column.data_type);
    let mut field = DBField::new(column.name.clone(), map_data_type(&column.data_type, custom_types));
    // inline enums become a named enum type so the value list survives export
    if let Some(values) = inline_enum_values(&column.data_type) {
        let name = format!("{}_{}", table.name, column.name);
        let mut enum_type = DBCustomType::new_enum(name.clone(), values);
        enum_type.schema = table.schema.clone();
        inline_types.push(enum_type);
        field.data_type = DataType::new(name);
    }
    let args = column.type_args.clone().unwrap_or(parsed.args);
    match type_args_kind(&field.data_type.id) {
        TypeArgsKind::Length => field.character_maximum_length = args.length,
        TypeArgsKind::PrecisionScale => {
            field.precision = args.precision;
            field.scale = args.scale;
        }
        TypeArgsKind::None => {}
    }
    field.primary_key = column.primary_key;
    field.unique = column.unique;
    field.nullable = column.nullable && !column.primary_key;
    field.increment = column.increment.then_some(true);
    field.is_array = parsed.is_array.then_some(true);
    field.default = column.default.clone();
    field.collation = column.collation.clone();
    field.comments = column.comment.clone();
    field.on_update = column.on_update.clone();
    field
}

fn convert_table(
    table: &SQLTable,
    position: usize,
    default_schema: Option<&str>,
    custom_types: &[SQLCustomType],
    inline_types: &mut Vec<DBCustomType>,
    options: &ImportOptions,
) -> Result<DBTable, ImportError> {
    let fields = table
        .columns
        .iter()
        .map(|c| convert_field(table, c, custom_types, inline_types))
        .collect();
    let mut db_table = DBTable::new(table.name.clone(), fields);
    db_table.schema = table.schema.clone().or(default_schema.map(str::to_string));
    let (x, y) = options.layout.position(position);
    db_table.x = x;
    db_table.y = y;
    db_table.color = options.layout.color(position, table.is_view);
    db_table.is_view = table.is_view;
    db_table.is_materialized_view = table.is_materialized_view.then_some(true);
    db_table.comments = table.comment.clone();
    db_table.order = Some(table.order);

    for index in &table.indexes {
        let mut field_ids = Vec::with_capacity(index.columns.len());
        for column in &index.columns {
            let field = db_table.field_by_name(column).ok_or_else(|| {
                ImportError::Conversion(format!(
                    "Index {} on {} references column {} which does not exist",
                    index.name, table.name, column
                ))
            })?;
            field_ids.push(field.id.clone());
        }
        let mut db_index = if index.is_primary_key {
            DBIndex::primary_key(index.name.clone(), field_ids)
        } else {
            DBIndex::new(index.name.clone(), field_ids, index.unique)
        };
        db_index.index_type = index.index_type.clone();
        db_table.indexes.push(db_index);
    }
    Ok(db_table)
}

/// Source tables keyed by their parse-time id, pointing into the diagram
struct TableLookup<'a> {
    by_parse_id: HashMap<&'a str, usize>,
    default_schema: Option<&'a str>,
}

impl TableLookup<'_> {
    fn resolve(
        &self,
        tables: &[DBTable],
        parse_id: &str,
        name: &str,
        schema: Option<&str>,
        warnings: &mut Vec<String>,
    ) -> Option<usize> {
        if let Some(index) = self.by_parse_id.get(parse_id) {
            return Some(*index);
        }
        let schema = schema.or(self.default_schema);
        if let Some(index) = tables
            .iter()
            .position(|t| t.name == name && t.schema.as_deref() == schema)
        {
            return Some(index);
        }
        let index = tables.iter().position(|t| t.name == name)?;
        warnings.push(format!(
            "Table {} matched by name only for a relationship",
            name
        ));
        Some(index)
    }
}

fn convert_relationship(
    fk: &SQLForeignKey,
    tables: &[DBTable],
    lookup: &TableLookup<'_>,
    warnings: &mut Vec<String>,
) -> Option<DBRelationship> {
    let referencing = lookup.resolve(
        tables,
        &fk.source_table_id,
        &fk.source_table,
        fk.source_schema.as_deref(),
        warnings,
    );
    let referenced = lookup.resolve(
        tables,
        &fk.target_table_id,
        &fk.target_table,
        fk.target_schema.as_deref(),
        warnings,
    );
    let (Some(referencing), Some(referenced)) = (referencing, referenced) else {
        warnings.push(format!(
            "Relationship {} skipped: table {} or {} not found",
            fk.name, fk.source_table, fk.target_table
        ));
        return None;
    };
    let referencing_table = &tables[referencing];
    let referenced_table = &tables[referenced];
    let (Some(referencing_field), Some(referenced_field)) = (
        referencing_table.field_by_name(&fk.source_column),
        referenced_table.field_by_name(&fk.target_column),
    ) else {
        warnings.push(format!(
            "Relationship {} skipped: column {}.{} or {}.{} not found",
            fk.name, fk.source_table, fk.source_column, fk.target_table, fk.target_column
        ));
        return None;
    };

    let referencing_card = Cardinality::from_uniqueness(referencing_field.is_unique_key());
    let referenced_card = Cardinality::from_uniqueness(referenced_field.is_unique_key());

    // one:one keeps the referencing table as source so export puts the FK back on it
    let one_to_one = referencing_card == Cardinality::One && referenced_card == Cardinality::One;
    let ((source_table, source_field, source_card), (target_table, target_field, target_card)) =
        if one_to_one {
            (
                (referencing_table, referencing_field, referencing_card),
                (referenced_table, referenced_field, referenced_card),
            )
        } else {
            (
                (referenced_table, referenced_field, referenced_card),
                (referencing_table, referencing_field, referencing_card),
            )
        };

    let mut relationship = DBRelationship::new(
        fk.name.clone(),
        source_table.id.clone(),
        source_field.id.clone(),
        target_table.id.clone(),
        target_field.id.clone(),
    )
    .with_cardinality(source_card, target_card);
    relationship.source_schema = source_table.schema.clone();
    relationship.target_schema = target_table.schema.clone();
    Some(relationship)
}

fn convert_custom_type(custom: &SQLCustomType, default_schema: Option<&str>) -> DBCustomType {
    let mut db_type = match custom.kind {
        CustomTypeKind::Enum => DBCustomType::new_enum(custom.name.clone(), custom.values.clone()),
        CustomTypeKind::Composite => DBCustomType::new_composite(
            custom.name.clone(),
            custom
                .fields
                .iter()
                .map(|(field, field_type)| DBCustomTypeField {
                    field: field.clone(),
                    field_type: field_type.clone(),
                })
                .collect(),
        ),
    };
    db_type.schema = custom.schema.clone().or(default_schema.map(str::to_string));
    db_type
}

/// Convert a parse result into a diagram
///
/// `source` is the dialect the script was parsed as and supplies the default
/// schema; `target` becomes the diagram's database type (`Generic` keeps
/// `source`).
///
/// # Errors
///
/// `ImportError::Conversion` when an index names a column its table lacks.
pub fn convert(
    result: &SQLParserResult,
    source: DatabaseType,
    target: DatabaseType,
    options: &ImportOptions,
) -> Result<(Diagram, Vec<String>), ImportError> {
    let database_type = match target {
        DatabaseType::Generic => source,
        other => other,
    };
    let name = options
        .diagram_name
        .clone()
        .unwrap_or_else(|| format!("SQL Import ({})", source.display_name()));
    let mut diagram = Diagram::new(name, database_type);
    let mut warnings = Vec::new();
    let default_schema = source.default_schema();

    let mut inline_types = Vec::new();
    let mut lookup = TableLookup {
        by_parse_id: HashMap::new(),
        default_schema,
    };
    for table in result.tables.iter().filter(|t| options.include_views || !t.is_view) {
        let position = diagram.tables.len();
        let db_table = convert_table(
            table,
            position,
            default_schema,
            &result.types,
            &mut inline_types,
            options,
        )?;
        lookup.by_parse_id.insert(table.id.as_str(), position);
        diagram.tables.push(db_table);
    }

    for fk in &result.relationships {
        if let Some(relationship) = convert_relationship(fk, &diagram.tables, &lookup, &mut warnings) {
            diagram.relationships.push(relationship);
        }
    }
    for message in &warnings {
        warn!("{}", message);
    }

    let custom_types: Vec<DBCustomType> = result
        .types
        .iter()
        .map(|t| convert_custom_type(t, default_schema))
        .chain(inline_types)
        .collect();
    if !custom_types.is_empty() {
        diagram.custom_types = Some(custom_types);
    }

    warnings.extend(validate_diagram(&mut diagram));
    debug!(
        tables = diagram.tables.len(),
        relationships = diagram.relationships.len(),
        "converted parse result"
    );
    Ok((diagram, warnings))
}
