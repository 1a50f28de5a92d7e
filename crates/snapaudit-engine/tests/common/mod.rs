#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::{json, Value};
use snapaudit_core::model::PlatformUserFields;
use snapaudit_engine::{apply_engine_command, EngineCommand, EngineCommandResult, EngineContext};
use snapaudit_store::migrations::apply_migrations;

pub fn setup_db() -> Connection {
    let mut conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    apply_migrations(&mut conn).expect("Migrations should apply");
    conn
}

pub fn emby_dto(id: &str, name: &str, disabled: bool) -> Value {
    json!({
        "Id": id,
        "Name": name,
        "DateCreated": "2024-01-01T00:00:00Z",
        "LastLoginDate": null,
        "Policy": {"IsDisabled": disabled, "IsAdministrator": false}
    })
}

pub fn run(conn: &mut Connection, cmd: EngineCommand) -> EngineCommandResult {
    apply_engine_command(cmd, conn, &EngineContext::new()).expect("command should succeed")
}

pub fn sync_emby(conn: &mut Connection, id: &str, name: &str) -> EngineCommandResult {
    run(
        conn,
        EngineCommand::SyncEmbyProfile {
            subject_id: id.to_string(),
            user_dto: emby_dto(id, name, false),
            force: false,
            remark: None,
            actor: None,
        },
    )
}

pub fn platform_user(first_name: &str) -> PlatformUserFields {
    PlatformUserFields {
        first_name: first_name.to_string(),
        username: Some(first_name.to_lowercase()),
        ..Default::default()
    }
}

pub fn history_rows(conn: &Connection, table: &str, subject_id: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE subject_id = ?1", table),
        [subject_id],
        |row| row.get(0),
    )
    .unwrap()
}
