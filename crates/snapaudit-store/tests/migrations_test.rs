// Integration tests for the migration framework

use rusqlite::Connection;
use snapaudit_core::errors::ExErrorKind;
use snapaudit_store::migrations::{applied_migrations, apply_migrations};

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    let tables = table_names(&conn);
    for expected in [
        "schema_version",
        "emby_users",
        "emby_user_history",
        "platform_users",
        "platform_user_history",
    ] {
        assert!(tables.contains(&expected.to_string()), "Missing table: {}", expected);
    }
}

#[test]
fn test_reapplying_is_a_no_op() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(
        applied_migrations(&conn).unwrap(),
        vec!["001_emby_users", "002_platform_users"]
    );
}

#[test]
fn test_edited_migration_is_detected() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '001_emby_users'",
        [],
    )
    .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    assert!(err.message().contains("001_emby_users"));
}

#[test]
fn test_subject_id_is_unique_per_kind() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    let insert = "INSERT INTO emby_users (subject_id, display_name, fields_json, fields_digest,
        created_at, updated_at) VALUES ('e-1', 'a', '{}', 'd', 't', 't')";
    conn.execute(insert, []).unwrap();
    assert!(conn.execute(insert, []).is_err());
}
