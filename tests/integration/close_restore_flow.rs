//! End-to-end close and restore flows through the service facade

use super::common::{grouped_unit, unit};
use tabvault::{
    CloseRequest, ClosureHistoryService, ClosureKind, Disposition, GroupId, HistoryError,
    LiveSessionAdapter, MockLiveSession, WholeGroupClose,
};

#[tokio::test]
async fn close_two_tabs_then_reopen_most_recent_in_current_tab() {
    let mut service = ClosureHistoryService::new();
    let mut session = MockLiveSession::new();

    let a = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://url1.test")]));
    service.commit_close(a).unwrap();
    let b = service.begin_close(CloseRequest::tabs(vec![unit("B", "https://url2.test")]));
    service.commit_close(b).unwrap();

    // Most-recent-first: [B, A].
    let entries = service.get_entries(5);
    assert_eq!(entries.len(), 2);
    let (b_id, a_id) = (entries[0].id, entries[1].id);
    match (&entries[0].kind, &entries[1].kind) {
        (ClosureKind::Tab(b_tab), ClosureKind::Tab(a_tab)) => {
            assert_eq!(b_tab.url, "https://url2.test");
            assert_eq!(a_tab.url, "https://url1.test");
        }
        _ => panic!("expected two tab records"),
    }

    service
        .open_unit(&mut session, b_id, 0, Disposition::CurrentTab)
        .await
        .unwrap();

    assert_eq!(session.current_unit().unwrap().url, "https://url2.test");
    let remaining = service.get_entries(5);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, a_id);
}

#[tokio::test]
async fn revert_reinstates_original_identities_without_history() {
    let mut service = ClosureHistoryService::new();

    let original = unit("A", "https://a.test");
    let original_id = original.unit;
    let token = service.begin_close(CloseRequest::tabs(vec![original]));

    let returned = service.revert_close(token).unwrap();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].unit, original_id);
    assert!(service.get_entries(10).is_empty());

    // The closure is finished; committing it now is a programming error.
    assert!(matches!(
        service.commit_close(token),
        Err(HistoryError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn whole_group_close_round_trips_through_restore() {
    let mut service = ClosureHistoryService::new();
    let mut session = MockLiveSession::new();
    let g = GroupId::new();

    let token = service.begin_close(CloseRequest::group(
        WholeGroupClose {
            group: g,
            title: Some("research".into()),
        },
        vec![
            grouped_unit("B", "https://b.test", g, Some("research")),
            grouped_unit("A", "https://a.test", g, Some("research")),
        ],
    ));
    service.commit_close(token).unwrap();

    service.restore_most_recent(&mut session).await.unwrap();

    assert!(session.group_exists(g));
    assert_eq!(session.group_members(g).len(), 2);
    assert_eq!(session.groups[&g].title.as_deref(), Some("research"));
    assert_eq!(session.urls(), vec!["https://b.test", "https://a.test"]);
    assert!(service.get_entries(10).is_empty());
}

#[tokio::test]
async fn bulk_close_partial_restore_keeps_group_bookkeeping() {
    let mut service = ClosureHistoryService::new();
    let mut session = MockLiveSession::new();
    let g = GroupId::new();

    // Close across group boundaries: two grouped tabs and one ungrouped.
    let token = service.begin_close(CloseRequest::tabs(vec![
        grouped_unit("t0", "https://0.test", g, Some("work")),
        grouped_unit("t1", "https://1.test", g, Some("work")),
        unit("t2", "https://2.test"),
    ]));
    let record_id = service.commit_close(token).unwrap().unwrap();

    // Restore only t1; t0 still references the group.
    service
        .restore_unit(&mut session, record_id, 1)
        .await
        .unwrap();
    let entries = service.get_entries(5);
    match &entries[0].kind {
        ClosureKind::Bulk(bulk) => {
            assert_eq!(bulk.tabs.len(), 2);
            assert!(bulk.group_titles.contains_key(&g));
        }
        other => panic!("expected bulk record, got {other:?}"),
    }

    // Restore t0 next; the group has no representatives left.
    service
        .restore_unit(&mut session, record_id, 0)
        .await
        .unwrap();
    let entries = service.get_entries(5);
    match &entries[0].kind {
        ClosureKind::Bulk(bulk) => {
            assert_eq!(bulk.tabs.len(), 1);
            assert!(bulk.group_titles.is_empty());
        }
        other => panic!("expected bulk record, got {other:?}"),
    }

    // Both restored tabs rejoined one live group, created exactly once.
    assert_eq!(session.group_members(g).len(), 2);
    assert_eq!(session.group_creations.get(&g), Some(&1));
}

#[tokio::test]
async fn restore_entry_is_idempotent_across_calls() {
    let mut service = ClosureHistoryService::new();
    let mut session = MockLiveSession::new();

    let token = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://a.test")]));
    let id = service.commit_close(token).unwrap().unwrap();

    service.restore_entry(&mut session, id).await.unwrap();
    let second = service.restore_entry(&mut session, id).await;

    assert!(matches!(second, Err(HistoryError::NotFound)));
    assert_eq!(session.units.len(), 1);
}

#[tokio::test]
async fn session_failure_preserves_record_for_retry() {
    let mut service = ClosureHistoryService::new();
    let mut session = MockLiveSession::new();

    let token = service.begin_close(CloseRequest::tabs(vec![unit("A", "https://a.test")]));
    let id = service.commit_close(token).unwrap().unwrap();

    session.set_unavailable("backgrounded");
    let failed = service.restore_entry(&mut session, id).await;
    assert!(matches!(failed, Err(HistoryError::SessionUnavailable(_))));
    assert_eq!(service.get_entries(5).len(), 1);

    session.set_available();
    service.restore_entry(&mut session, id).await.unwrap();
    assert!(service.get_entries(5).is_empty());
}
