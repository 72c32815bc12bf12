//! Export module tests

use sql_diagram_sdk::export::{ExportRequest, SQLExporter, export_base_sql};
use sql_diagram_sdk::models::{
    Cardinality, DBField, DBIndex, DBRelationship, DBTable, DataType, DatabaseType, Diagram,
};

const NATIVE_DIALECTS: [DatabaseType; 4] = [
    DatabaseType::Postgresql,
    DatabaseType::Mysql,
    DatabaseType::SqlServer,
    DatabaseType::Sqlite,
];

fn pk_field(name: &str, type_id: &str) -> DBField {
    let mut field = DBField::new(name, DataType::new(type_id));
    field.primary_key = true;
    field.nullable = false;
    field
}

fn with_unnamed_pk(mut table: DBTable) -> DBTable {
    let pk = table.fields[0].id.clone();
    table.indexes.push(DBIndex::primary_key("", vec![pk]));
    table
}

fn users_and_orders(database_type: DatabaseType) -> Diagram {
    let users = with_unnamed_pk(DBTable::new(
        "users",
        vec![pk_field("id", "bigint"), DBField::new("email", DataType::varchar())],
    ));
    let orders = with_unnamed_pk(DBTable::new(
        "orders",
        vec![
            pk_field("id", "integer"),
            DBField::new("user_id", DataType::new("integer")),
        ],
    ));
    let relationship = DBRelationship::new(
        "fk_orders_user",
        &users.id,
        &users.fields[0].id,
        &orders.id,
        &orders.fields[1].id,
    );
    let mut diagram = Diagram::new("shop", database_type);
    diagram.tables = vec![users, orders];
    diagram.relationships.push(relationship);
    diagram
}

mod sql_export_tests {
    use super::*;

    #[test]
    fn test_unnamed_primary_key_has_no_constraint_clause() {
        let mut diagram = Diagram::new("d", DatabaseType::Generic);
        diagram.tables.push(with_unnamed_pk(DBTable::new(
            "table_1",
            vec![pk_field("id", "integer")],
        )));

        for target in NATIVE_DIALECTS {
            let sql = export_base_sql(&ExportRequest::new(&diagram, target));
            assert!(sql.contains("PRIMARY KEY"), "{target}: {sql}");
            assert!(!sql.contains("CONSTRAINT"), "{target}: {sql}");
        }
        let postgres = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(postgres.contains("PRIMARY KEY (\"id\")"));
    }

    #[test]
    fn test_named_primary_key_keeps_its_name() {
        let mut table = DBTable::new("accounts", vec![pk_field("id", "integer")]);
        let pk = table.fields[0].id.clone();
        table.indexes.push(DBIndex::primary_key("accounts_pkey", vec![pk]));
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        diagram.tables.push(table);

        let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(sql.contains("CONSTRAINT \"accounts_pkey\" PRIMARY KEY (\"id\")"));
    }

    #[test]
    fn test_array_suffix_on_postgres() {
        let mut tags = DBField::new("tags", DataType::new("text"));
        tags.is_array = Some(true);
        let mut codes = DBField::new("codes", DataType::varchar());
        codes.character_maximum_length = Some("12".to_string());
        codes.is_array = Some(true);
        let mut diagram = Diagram::new("d", DatabaseType::Postgresql);
        diagram.tables.push(DBTable::new("labels", vec![tags, codes]));

        let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(sql.contains("\"tags\" text[]"));
        assert!(sql.contains("\"codes\" varchar(12)[]"));

        let mysql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Mysql));
        assert!(!mysql.contains("[]"));
    }

    #[test]
    fn test_foreign_key_goes_on_the_many_side() {
        let diagram = users_and_orders(DatabaseType::Postgresql);
        let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(sql.contains(
            "ALTER TABLE \"orders\" ADD CONSTRAINT \"fk_orders_user\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\");"
        ));
    }

    #[test]
    fn test_many_to_one_keeps_key_on_source() {
        let mut diagram = users_and_orders(DatabaseType::Mysql);
        let rel = diagram.relationships.remove(0);
        let (orders, users) = (&diagram.tables[1], &diagram.tables[0]);
        diagram.relationships.push(
            DBRelationship::new(
                rel.name,
                &orders.id,
                &orders.fields[1].id,
                &users.id,
                &users.fields[0].id,
            )
            .with_cardinality(Cardinality::Many, Cardinality::One),
        );
        let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Mysql));
        assert!(sql.contains(
            "ALTER TABLE `orders` ADD CONSTRAINT `fk_orders_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`);"
        ));
    }

    #[test]
    fn test_many_to_many_emits_no_key() {
        let mut diagram = users_and_orders(DatabaseType::Postgresql);
        let rel = diagram.relationships.remove(0);
        diagram
            .relationships
            .push(rel.with_cardinality(Cardinality::Many, Cardinality::Many));
        for target in NATIVE_DIALECTS {
            let sql = export_base_sql(&ExportRequest::new(&diagram, target));
            assert!(!sql.contains("FOREIGN KEY"), "{target}: {sql}");
        }
    }

    #[test]
    fn test_only_relationships() {
        let diagram = users_and_orders(DatabaseType::Postgresql);
        let sql = export_base_sql(
            &ExportRequest::new(&diagram, DatabaseType::Postgresql).with_only_relationships(true),
        );
        assert!(!sql.contains("CREATE TABLE"));
        assert_eq!(sql.lines().filter(|l| l.starts_with("ALTER TABLE")).count(), 1);

        let sqlite = export_base_sql(
            &ExportRequest::new(&diagram, DatabaseType::Sqlite).with_only_relationships(true),
        );
        assert!(sqlite.lines().all(|l| l.starts_with("--")));
    }

    #[test]
    fn test_empty_diagram() {
        let diagram = Diagram::new("empty", DatabaseType::Postgresql);
        for target in NATIVE_DIALECTS {
            assert!(export_base_sql(&ExportRequest::new(&diagram, target)).is_empty());
        }
        let result = SQLExporter.export(&diagram, DatabaseType::Generic);
        assert_eq!(result.format, "sql");
        assert!(result.content.is_empty());
    }

    #[test]
    fn test_dbml_flow_quotes_every_identifier() {
        let diagram = users_and_orders(DatabaseType::Generic);
        let plain = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Generic));
        assert!(plain.contains("CREATE TABLE users ("));

        let dbml = export_base_sql(
            &ExportRequest::new(&diagram, DatabaseType::Generic).with_dbml_flow(true),
        );
        assert!(dbml.contains("CREATE TABLE \"users\" ("));
        assert!(dbml.contains("\"email\" varchar"));
    }

    #[test]
    fn test_cross_dialect_export_aligns_key_types() {
        let diagram = users_and_orders(DatabaseType::Generic);
        let sql = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(sql.contains("user_id bigint"), "{sql}");

        // the caller's diagram is left alone
        assert_eq!(diagram.tables[1].fields[1].data_type.id, "integer");
    }

    #[test]
    fn test_auto_increment_per_dialect() {
        let mut diagram = Diagram::new("d", DatabaseType::Generic);
        let mut id = pk_field("id", "integer");
        id.increment = Some(true);
        diagram.tables.push(DBTable::new("counters", vec![id]));

        let expect = [
            (DatabaseType::Postgresql, "GENERATED BY DEFAULT AS IDENTITY"),
            (DatabaseType::Mysql, "AUTO_INCREMENT"),
            (DatabaseType::SqlServer, "IDENTITY(1,1)"),
        ];
        for (target, clause) in expect {
            let sql = export_base_sql(&ExportRequest::new(&diagram, target));
            assert!(sql.contains(clause), "{target}: {sql}");
        }

        diagram.database_type = DatabaseType::Postgresql;
        let native = export_base_sql(&ExportRequest::new(&diagram, DatabaseType::Postgresql));
        assert!(native.contains("\"id\" serial NOT NULL PRIMARY KEY"), "{native}");
    }
}
