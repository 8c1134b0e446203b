use chrono::{NaiveDate, NaiveDateTime};
use lanetime_core::db::{open_db, open_db_in_memory};
use lanetime_core::{
    EventLink, EventPatch, EventRepository, EventService, InMemoryEventRepository, RepoError,
    Sentiment, ServiceError, SqliteEventRepository, TimelineEvent,
};
use rusqlite::Connection;

fn at(d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn sample(id: &str) -> TimelineEvent {
    let mut event = TimelineEvent::with_id(id, format!("Release {id}"), "Ops", at(14, 9), at(14, 11));
    event.description = Some("Roll out to production".to_string());
    event.sentiment = Sentiment::Positive;
    event.tags = vec!["release".to_string()];
    event.links = vec![EventLink {
        url: "https://example.com/changelog".to_string(),
        kind: "changelog".to_string(),
    }];
    event
}

fn exercise_repository<R: EventRepository>(mut repo: R) {
    let event = sample("e1");
    assert_eq!(repo.create_event(&event).unwrap(), "e1");
    assert_eq!(repo.get_event("e1").unwrap(), Some(event.clone()));

    let duplicate = repo.create_event(&event).unwrap_err();
    assert!(matches!(duplicate, RepoError::Duplicate(id) if id == "e1"));

    let mut changed = event.clone();
    changed.title = "Release e1 (rescheduled)".to_string();
    changed.end = at(14, 12);
    repo.update_event(&changed).unwrap();
    assert_eq!(repo.get_event("e1").unwrap(), Some(changed));

    repo.create_event(&sample("e2")).unwrap();
    let ids: Vec<_> = repo
        .list_events()
        .unwrap()
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec!["e1", "e2"]);

    repo.delete_event("e1").unwrap();
    assert!(matches!(
        repo.delete_event("e1").unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert_eq!(repo.get_event("e1").unwrap(), None);

    let mut reversed = sample("bad");
    reversed.end = at(13, 0);
    assert!(matches!(
        repo.create_event(&reversed).unwrap_err(),
        RepoError::Validation(_)
    ));

    repo.replace_all(&[sample("r1"), sample("r2")]).unwrap();
    assert_eq!(repo.list_events().unwrap().len(), 2);
    assert!(matches!(
        repo.replace_all(&[sample("x"), sample("x")]).unwrap_err(),
        RepoError::Duplicate(_)
    ));
    assert_eq!(repo.list_events().unwrap().len(), 2);

    repo.clear().unwrap();
    assert!(repo.list_events().unwrap().is_empty());
}

#[test]
fn in_memory_repository_crud() {
    exercise_repository(InMemoryEventRepository::new());
}

#[test]
fn sqlite_repository_crud() {
    let conn = open_db_in_memory().unwrap();
    exercise_repository(SqliteEventRepository::try_new(&conn).unwrap());
}

#[test]
fn sqlite_repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteEventRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn events_persist_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.db");

    {
        let conn = open_db(&path).unwrap();
        let mut service = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
        service.add_event(sample("kept")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    assert_eq!(service.get_event("kept").unwrap(), Some(sample("kept")));
}

#[test]
fn service_update_merges_patch_and_revalidates() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    service.add_event(sample("e1")).unwrap();

    let patch = EventPatch {
        title: Some("Hotfix".to_string()),
        description: Some(None),
        ..EventPatch::default()
    };
    let updated = service.update_event("e1", &patch).unwrap();
    assert_eq!(updated.title, "Hotfix");
    assert_eq!(updated.description, None);
    assert_eq!(updated.lane, "Ops");

    let backwards = EventPatch {
        start: Some(at(20, 0)),
        ..EventPatch::default()
    };
    assert!(matches!(
        service.update_event("e1", &backwards).unwrap_err(),
        ServiceError::Repo(RepoError::Validation(_))
    ));
    assert!(matches!(
        service.update_event("missing", &patch).unwrap_err(),
        ServiceError::EventNotFound(_)
    ));
}

#[test]
fn service_clone_and_remove() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    service.add_event(sample("e1")).unwrap();

    let copy = service.clone_event("e1").unwrap().unwrap();
    assert_ne!(copy.id, "e1");
    assert_eq!(copy.title, "Release e1 (Copy)");
    assert_eq!(copy.start, at(14, 9));
    assert_eq!(service.snapshot().unwrap().len(), 2);

    assert_eq!(service.clone_event("missing").unwrap(), None);
    assert!(service.remove_event("e1").unwrap());
    assert!(!service.remove_event("e1").unwrap());
    assert_eq!(service.snapshot().unwrap().len(), 1);
}

#[test]
fn service_import_assigns_missing_ids() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    service.add_event(sample("old")).unwrap();

    let mut anonymous = sample("");
    anonymous.title = "No id".to_string();
    let imported = service.import_events(vec![sample("new"), anonymous]).unwrap();

    assert_eq!(imported.len(), 2);
    assert!(!imported[1].id.is_empty());
    let snapshot = service.snapshot().unwrap();
    assert_eq!(snapshot, imported);
    assert!(service.get_event("old").unwrap().is_none());

    service.clear_events().unwrap();
    assert!(service.snapshot().unwrap().is_empty());
}

#[test]
fn json_export_import_preserves_collection() {
    let conn = open_db_in_memory().unwrap();
    let mut source = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    source.add_event(sample("a")).unwrap();
    source.add_event(sample("b")).unwrap();
    let json = source.export_json().unwrap();

    let mut target = EventService::new(InMemoryEventRepository::new());
    let imported = target.import_json(&json).unwrap();

    assert_eq!(imported, source.snapshot().unwrap());
}

#[test]
fn json_import_reads_utc_suffixed_dates() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    let json = r#"[{
        "id": "a",
        "title": "Launch",
        "startDate": "2024-03-15T10:00:00.000Z",
        "endDate": "2024-03-15T11:00:00.000Z",
        "lane": "Ops",
        "sentiment": "positive",
        "tags": [],
        "links": []
    }]"#;

    let imported = service.import_json(json).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].start, at(15, 10));
    assert_eq!(imported[0].end, at(15, 11));
}

#[test]
fn json_import_rejects_reversed_interval() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    let json = r#"[{
        "id": "x",
        "title": "Backwards",
        "startDate": "2024-03-15T12:00:00",
        "endDate": "2024-03-15T10:00:00",
        "lane": "A"
    }]"#;

    assert!(matches!(
        service.import_json(json).unwrap_err(),
        ServiceError::Serialization(_)
    ));
    assert!(service.snapshot().unwrap().is_empty());
}

#[test]
fn default_focus_is_latest_end() {
    let mut service = EventService::new(InMemoryEventRepository::new());
    let fallback = at(1, 0);
    assert_eq!(service.default_focus(fallback).unwrap(), fallback);

    let mut late = sample("late");
    late.end = at(20, 8);
    service.add_event(sample("early")).unwrap();
    service.add_event(late).unwrap();
    assert_eq!(service.default_focus(fallback).unwrap(), at(20, 8));
}
