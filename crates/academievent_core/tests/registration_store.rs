use academievent_core::db::open_db_in_memory;
use academievent_core::{
    RegistrationStatus, RegistrationStore, RegistrationStoreError, SqliteRegistrationStore,
};

#[test]
fn insert_creates_registered_row() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::new(&conn);

    let created = store.insert("expo", "student-1").unwrap();
    assert_eq!(created.event_id, "expo");
    assert_eq!(created.user_id, "student-1");
    assert_eq!(created.status, RegistrationStatus::Registered);
    assert!(!created.id.is_empty());
    assert!(created.created_at > 0);
}

#[test]
fn duplicate_insert_is_reported_and_first_row_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::new(&conn);

    let first = store.insert("expo", "student-1").unwrap();
    match store.insert("expo", "student-1") {
        Err(RegistrationStoreError::Duplicate { event_id, user_id }) => {
            assert_eq!(event_id, "expo");
            assert_eq!(user_id, "student-1");
        }
        other => panic!("expected duplicate, got {other:?}"),
    }

    let rows = store.list_by_event("expo").unwrap();
    assert_eq!(rows, vec![first]);
}

#[test]
fn list_by_event_only_returns_that_event() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::new(&conn);

    store.insert("expo", "student-1").unwrap();
    store.insert("expo", "student-2").unwrap();
    store.insert("fair", "student-1").unwrap();

    let attendees = store.list_by_event("expo").unwrap();
    assert_eq!(attendees.len(), 2);
    assert!(attendees.iter().all(|row| row.event_id == "expo"));
    assert!(store.list_by_event("unknown").unwrap().is_empty());
}

#[test]
fn update_status_tracks_attendance() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRegistrationStore::new(&conn);

    let created = store.insert("expo", "student-1").unwrap();
    let updated = store
        .update_status(&created.id, RegistrationStatus::Attended)
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.status, RegistrationStatus::Attended);

    assert!(matches!(
        store.update_status("missing", RegistrationStatus::Cancelled),
        Err(RegistrationStoreError::NotFound(_))
    ));
}
