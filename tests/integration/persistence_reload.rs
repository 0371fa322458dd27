//! Closure history survival across simulated restarts

use super::common::{grouped_unit, unit};
use tabvault::{
    CloseRequest, ClosureHistoryService, ClosureKind, GroupId, MockLiveSession, SqliteClosureStore,
};
use tempfile::tempdir;

#[tokio::test]
async fn history_survives_restart_and_restores_after_reload() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("closures.db");
    let g = GroupId::new();

    // First "session": close a tab and a mixed bulk, then drop the service.
    {
        let store = SqliteClosureStore::open(db_path.clone()).unwrap();
        let mut service = ClosureHistoryService::with_persistence(Box::new(store));

        let t = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://a.test")]));
        service.commit_close(t).unwrap();
        let b = service.begin_close(CloseRequest::tabs(vec![
            grouped_unit("t0", "https://0.test", g, Some("work")),
            unit("t1", "https://1.test"),
        ]));
        service.commit_close(b).unwrap();
    }

    // Second "session": hydrate from the same database.
    let store = SqliteClosureStore::open(db_path).unwrap();
    let mut service = ClosureHistoryService::with_persistence(Box::new(store));

    let entries = service.get_entries(10);
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0].kind, ClosureKind::Bulk(_)));
    assert!(matches!(entries[1].kind, ClosureKind::Tab(_)));

    // Group identity survived persistence: the bulk's title map still
    // knows the original group.
    match &entries[0].kind {
        ClosureKind::Bulk(bulk) => {
            assert_eq!(bulk.group_titles.get(&g), Some(&Some("work".to_string())));
        }
        other => panic!("expected bulk record, got {other:?}"),
    }

    // And the reloaded history is restorable.
    let mut session = MockLiveSession::new();
    service.restore_most_recent(&mut session).await.unwrap();
    assert_eq!(service.get_entries(10).len(), 1);
    assert_eq!(session.units.len(), 2);
}

#[test]
fn clear_entries_clears_the_durable_snapshot_too() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("closures.db");

    {
        let store = SqliteClosureStore::open(db_path.clone()).unwrap();
        let mut service = ClosureHistoryService::with_persistence(Box::new(store));
        let t = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://a.test")]));
        service.commit_close(t).unwrap();
        service.clear_entries();
    }

    let store = SqliteClosureStore::open(db_path).unwrap();
    let service = ClosureHistoryService::with_persistence(Box::new(store));
    assert!(service.get_entries(10).is_empty());
}

#[test]
fn record_ids_stay_unique_after_reload() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("closures.db");

    let first_id = {
        let store = SqliteClosureStore::open(db_path.clone()).unwrap();
        let mut service = ClosureHistoryService::with_persistence(Box::new(store));
        let t = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://a.test")]));
        service.commit_close(t).unwrap().unwrap()
    };

    let store = SqliteClosureStore::open(db_path).unwrap();
    let mut service = ClosureHistoryService::with_persistence(Box::new(store));
    let t = service.begin_close(CloseRequest::tabs(vec![unit("B", "https://b.test")]));
    let second_id = service.commit_close(t).unwrap().unwrap();

    assert_ne!(first_id, second_id);
}
