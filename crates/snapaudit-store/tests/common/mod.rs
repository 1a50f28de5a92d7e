#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::{json, Value};
use snapaudit_core::model::{EmbyUserFields, LiveRecord, PlatformUserFields};
use snapaudit_store::audit::{commit_change, ChangeRequest};
use snapaudit_store::migrations::apply_migrations;
use std::path::Path;
use std::time::Duration;

pub fn setup_db() -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&mut conn).expect("Migrations should apply");
    conn
}

/// A file-backed connection, configured the way production opens it
pub fn open_file_db(path: &Path) -> Connection {
    let mut conn = snapaudit_store::db::open(path).unwrap();
    snapaudit_store::db::configure(&conn, Duration::from_secs(5)).unwrap();
    apply_migrations(&mut conn).unwrap();
    conn
}

pub fn emby_dto(id: &str, name: &str) -> Value {
    json!({
        "Id": id,
        "Name": name,
        "DateCreated": "2024-01-01T00:00:00Z",
        "Policy": {"IsDisabled": false}
    })
}

pub fn emby_fields(id: &str, name: &str) -> EmbyUserFields {
    EmbyUserFields::from_user_dto(&emby_dto(id, name)).unwrap()
}

pub fn seed_emby(conn: &mut Connection, id: &str, name: &str) -> LiveRecord<EmbyUserFields> {
    let request = ChangeRequest::new(id, emby_fields(id, name)).or_create();
    commit_change(conn, &request).unwrap().into_record()
}

pub fn platform_fields(first_name: &str) -> PlatformUserFields {
    PlatformUserFields {
        first_name: first_name.to_string(),
        username: Some(first_name.to_lowercase()),
        language_code: Some("en".to_string()),
        ..Default::default()
    }
}

pub fn seed_platform(
    conn: &mut Connection,
    id: &str,
    fields: PlatformUserFields,
) -> LiveRecord<PlatformUserFields> {
    let request = ChangeRequest::new(id, fields).or_create();
    commit_change(conn, &request).unwrap().into_record()
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
