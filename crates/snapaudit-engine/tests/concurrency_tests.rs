// Concurrent engine commands against one on-disk store

mod common;

use common::*;
use snapaudit_core::model::{AccountStatus, ChangeTag, EmbyUserFields};
use snapaudit_core::StoreConfig;
use snapaudit_engine::{apply_engine_command, EngineCommand, EngineContext};
use snapaudit_store::audit::{self, HistoryQuery};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_ban_and_sync_both_land_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::default();
    config.database.path = dir.path().join("nested").join("store.db");

    let mut conn = snapaudit_store::db::open_store(&config.database).unwrap();
    sync_emby(&mut conn, "e1", "alice");
    drop(conn);

    let barrier = Arc::new(Barrier::new(2));
    let commands = vec![
        EngineCommand::BanEmbyUser {
            subject_id: "e1".to_string(),
            reason: "spam".to_string(),
            actor: Some(1),
            user_dto: None,
        },
        EngineCommand::SyncEmbyProfile {
            subject_id: "e1".to_string(),
            // The server already reflects the ban
            user_dto: emby_dto("e1", "alicia", true),
            force: false,
            remark: None,
            actor: None,
        },
    ];

    let handles: Vec<_> = commands
        .into_iter()
        .map(|cmd| {
            let barrier = Arc::clone(&barrier);
            let db = config.database.clone();
            thread::spawn(move || {
                let mut conn = snapaudit_store::db::open_store(&db).unwrap();
                barrier.wait();
                apply_engine_command(cmd, &mut conn, &EngineContext::new()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = snapaudit_store::db::open_store(&config.database).unwrap();
    let current = audit::live::get::<EmbyUserFields>(&conn, "e1").unwrap();
    assert_eq!(current.version, 3);
    assert_eq!(current.fields.name, "alicia");
    assert_eq!(current.fields.status, AccountStatus::Disabled);

    let items = audit::read_page::<EmbyUserFields>(&conn, &HistoryQuery::for_subject("e1"))
        .unwrap()
        .items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source_version, 1);
    assert_eq!(items[1].source_version, 2);
    assert!(items.iter().any(|h| h.action == ChangeTag::Ban));
}
