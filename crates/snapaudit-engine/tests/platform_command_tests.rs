// Platform account commands

mod common;

use common::*;
use snapaudit_core::errors::ExErrorKind;
use snapaudit_core::model::{AccountStatus, ChangeTag, PlatformUserFields};
use snapaudit_engine::commands::platform::{EXTRA_BANNED_BY, EXTRA_BAN_REASON};
use snapaudit_engine::{apply_engine_command, EngineCommand, EngineContext};
use snapaudit_store::audit::{self, HistoryQuery};

fn sync(conn: &mut rusqlite::Connection, id: &str, fields: PlatformUserFields) -> &'static str {
    run(
        conn,
        EngineCommand::SyncPlatformProfile {
            subject_id: id.to_string(),
            fields,
            actor: None,
        },
    )
    .label()
}

#[test]
fn test_sync_creates_then_skips_identical() {
    let mut conn = setup_db();
    assert_eq!(sync(&mut conn, "tg-1", platform_user("Alice")), "created");
    assert_eq!(sync(&mut conn, "tg-1", platform_user("Alice")), "skipped");
    assert_eq!(history_rows(&conn, "platform_user_history", "tg-1"), 0);
}

#[test]
fn test_ban_then_resync_keeps_ban() {
    let mut conn = setup_db();
    sync(&mut conn, "tg-1", platform_user("Alice"));
    run(
        &mut conn,
        EngineCommand::BanPlatformUser {
            subject_id: "tg-1".to_string(),
            reason: "flooding".to_string(),
            actor: Some(7),
        },
    );

    let renamed = PlatformUserFields {
        last_name: Some("Liddell".to_string()),
        ..platform_user("Alice")
    };
    assert_eq!(sync(&mut conn, "tg-1", renamed), "applied");

    let current = audit::live::get::<PlatformUserFields>(&conn, "tg-1").unwrap();
    assert!(current.fields.is_banned());
    assert_eq!(current.fields.last_name.as_deref(), Some("Liddell"));
    assert_eq!(current.fields.extra.get_str(EXTRA_BAN_REASON), Some("flooding"));

    let actions: Vec<ChangeTag> =
        audit::read_page::<PlatformUserFields>(&conn, &HistoryQuery::for_subject("tg-1"))
            .unwrap()
            .items
            .into_iter()
            .map(|h| h.action)
            .collect();
    assert_eq!(actions, vec![ChangeTag::Ban, ChangeTag::Update]);
}

#[test]
fn test_unban_restores_active_and_drops_markers() {
    let mut conn = setup_db();
    sync(&mut conn, "tg-1", platform_user("Alice"));
    for cmd in [
        EngineCommand::BanPlatformUser {
            subject_id: "tg-1".to_string(),
            reason: "flooding".to_string(),
            actor: Some(7),
        },
        EngineCommand::UnbanPlatformUser {
            subject_id: "tg-1".to_string(),
            reason: "cooled down".to_string(),
            actor: Some(7),
        },
    ] {
        run(&mut conn, cmd);
    }

    let current = audit::live::get::<PlatformUserFields>(&conn, "tg-1").unwrap();
    assert_eq!(current.fields.status, AccountStatus::Active);
    assert!(!current.fields.extra.contains_key(EXTRA_BAN_REASON));
    assert!(!current.fields.extra.contains_key(EXTRA_BANNED_BY));
    assert!(current.remark.unwrap_or_default().starts_with("cooled down (unban)"));

    let page = audit::read_page::<PlatformUserFields>(
        &conn,
        &HistoryQuery::for_subject("tg-1").newest_first(),
    )
    .unwrap();
    assert_eq!(page.items[0].fields.status, AccountStatus::Banned);
}

#[test]
fn test_ban_unknown_platform_user_is_not_found() {
    let mut conn = setup_db();
    let err = apply_engine_command(
        EngineCommand::BanPlatformUser {
            subject_id: "tg-404".to_string(),
            reason: "x".to_string(),
            actor: None,
        },
        &mut conn,
        &EngineContext::new(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
