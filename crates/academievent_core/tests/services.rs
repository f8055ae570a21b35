use academievent_core::db::open_db_in_memory;
use academievent_core::{
    ActingUser, Event, EventCategory, EventService, EventServiceError, FixedAnswer,
    LogNotifier, MarketplaceError, MarketplaceQuery, MarketplaceService, NotificationDispatcher,
    RegistrationOutcome, RegistrationStatus, Role, SqliteEventStore, SqliteRegistrationStore,
    User,
};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use std::sync::Arc;

type SqliteEventService<'conn> =
    EventService<SqliteEventStore<'conn>, SqliteRegistrationStore<'conn>>;
type SqliteMarketplace<'conn> =
    MarketplaceService<SqliteEventStore<'conn>, SqliteRegistrationStore<'conn>>;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap()
}

fn actor(id: &str, role: Role) -> ActingUser {
    ActingUser::authenticated(User {
        id: id.to_string(),
        name: format!("{id} name"),
        email: None,
        role,
    })
}

fn event_service(conn: &Connection) -> SqliteEventService<'_> {
    EventService::new(
        SqliteEventStore::try_new(conn).unwrap(),
        SqliteRegistrationStore::new(conn),
        NotificationDispatcher::disabled(Arc::new(LogNotifier)),
    )
}

fn marketplace(conn: &Connection) -> SqliteMarketplace<'_> {
    MarketplaceService::new(
        SqliteEventStore::try_new(conn).unwrap(),
        SqliteRegistrationStore::new(conn),
    )
}

fn draft(title: &str, day: &str, at: &str, category: EventCategory) -> Event {
    Event::new("", title, date(day), time(at), category)
}

#[test]
fn save_event_assigns_acting_owner_and_delete_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let service = event_service(&conn);
    let student = actor("student-1", Role::Student);

    let mut foreign = draft("Swim", "2025-03-01", "07:00", EventCategory::Personal);
    foreign.owner_id = "student-2".to_string();
    let saved = service.save_event(&student, &foreign).unwrap();
    assert_eq!(saved.owner_id, "student-1");
    assert_eq!(service.list_events(&student).unwrap().len(), 1);
    assert!(service.get_event(&student, &saved.id).unwrap().is_some());

    service.delete_event(&student, &saved.id).unwrap();
    match service.delete_event(&student, &saved.id) {
        Err(EventServiceError::EventNotFound(id)) => assert_eq!(id, saved.id),
        other => panic!("expected EventNotFound, got {other:?}"),
    }
}

#[test]
fn import_assigns_fresh_ids_and_normalizes_categories() {
    let conn = open_db_in_memory().unwrap();
    let service = event_service(&conn);
    let student = actor("student-1", Role::Student);

    let lecture = draft("Biology", "2025-03-03", "08:00", EventCategory::Academic);
    let listing = draft("Sneaky Listing", "2025-03-04", "08:00", EventCategory::Organizer);
    let incoming_ids = vec![lecture.id.clone(), listing.id.clone()];

    let saved = service
        .import_events(&student, vec![lecture, listing])
        .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].category, EventCategory::Academic);
    assert_eq!(saved[1].category, EventCategory::Personal);
    assert!(saved.iter().all(|event| event.owner_id == "student-1"));
    assert!(saved.iter().all(|event| !incoming_ids.contains(&event.id)));
}

#[test]
fn register_event_reads_schedule_as_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let service = event_service(&conn);
    let student = actor("student-1", Role::Student);

    service
        .import_events(
            &student,
            vec![draft("Calculus Lecture", "2025-03-10", "10:00", EventCategory::Academic)],
        )
        .unwrap();

    let club_fair = draft("Club Fair", "2025-03-10", "10:00", EventCategory::Organizer);
    let resolution = service
        .register_event(&student, &club_fair, &mut FixedAnswer(true))
        .unwrap();
    assert_eq!(
        resolution.outcome,
        RegistrationOutcome::SchedulingBlocked {
            candidate_title: "Club Fair".to_string(),
            blocked_by: "Calculus Lecture".to_string(),
        }
    );
    assert_eq!(service.list_events(&student).unwrap().len(), 1);
}

#[test]
fn only_organizers_and_admins_publish() {
    let conn = open_db_in_memory().unwrap();
    let market = marketplace(&conn);

    let listing = draft("Robotics Demo", "2025-05-01", "10:00", EventCategory::Social);
    match market.publish(&actor("student-1", Role::Student), &listing) {
        Err(MarketplaceError::Forbidden { role, .. }) => assert_eq!(role, Role::Student),
        other => panic!("expected Forbidden, got {other:?}"),
    }

    let published = market
        .publish(&actor("organizer-1", Role::Organizer), &listing)
        .unwrap();
    assert_eq!(published.category, EventCategory::Organizer);
    assert_eq!(published.owner_id, "organizer-1");
    assert_eq!(published.organizer_name.as_deref(), Some("organizer-1 name"));

    let mut named = draft("Chess Open", "2025-05-02", "10:00", EventCategory::Organizer);
    named.organizer_name = Some("Chess Club".to_string());
    let published = market
        .publish(&actor("admin-1", Role::Admin), &named)
        .unwrap();
    assert_eq!(published.organizer_name.as_deref(), Some("Chess Club"));

    let found = market
        .browse(&MarketplaceQuery {
            search: Some("chess club".to_string()),
            from_date: None,
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Chess Open");
}

#[test]
fn attendees_and_attendance_follow_roles_and_ownership() {
    let conn = open_db_in_memory().unwrap();
    let market = marketplace(&conn);
    let service = event_service(&conn);
    let organizer = actor("organizer-1", Role::Organizer);
    let student = actor("student-1", Role::Student);

    let listing = market
        .publish(
            &organizer,
            &draft("Startup Expo", "2025-04-02", "14:00", EventCategory::Organizer),
        )
        .unwrap();
    let browsed = market.browse(&MarketplaceQuery::default()).unwrap();
    assert_eq!(browsed.len(), 1);

    let resolution = service
        .register_event(&student, &browsed[0], &mut FixedAnswer(false))
        .unwrap();
    assert!(resolution.outcome.committed().is_some());

    let attendees = market.attendees(&organizer, &listing.id).unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].user_id, "student-1");

    assert!(matches!(
        market.attendees(&student, &listing.id),
        Err(MarketplaceError::Forbidden { .. })
    ));
    assert!(matches!(
        market.attendees(&actor("organizer-2", Role::Organizer), &listing.id),
        Err(MarketplaceError::ListingNotFound(_))
    ));
    assert_eq!(
        market
            .attendees(&actor("admin-1", Role::Admin), &listing.id)
            .unwrap()
            .len(),
        1
    );

    assert!(matches!(
        market.update_attendance(&student, &attendees[0].id, RegistrationStatus::Attended),
        Err(MarketplaceError::Forbidden { .. })
    ));
    let updated = market
        .update_attendance(&organizer, &attendees[0].id, RegistrationStatus::Attended)
        .unwrap();
    assert_eq!(updated.status, RegistrationStatus::Attended);
}

#[test]
fn import_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = event_service(&conn);
    let student = actor("student-1", Role::Student);

    let entries = vec![
        draft("Biology", "2025-03-03", "08:00", EventCategory::Academic),
        draft("   ", "2025-03-04", "08:00", EventCategory::Academic),
    ];
    assert!(matches!(
        service.import_events(&student, entries),
        Err(EventServiceError::Store(_))
    ));
    assert!(service.list_events(&student).unwrap().is_empty());
}

#[test]
fn republishing_another_organizers_listing_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let market = marketplace(&conn);
    let service = event_service(&conn);
    let first = actor("organizer-1", Role::Organizer);
    let second = actor("organizer-2", Role::Organizer);

    let listing = market
        .publish(
            &first,
            &draft("Hackathon", "2025-06-01", "09:00", EventCategory::Organizer),
        )
        .unwrap();

    let mut hijack = listing.clone();
    hijack.title = "Hijacked".to_string();
    assert!(matches!(
        market.publish(&second, &hijack),
        Err(MarketplaceError::Store(_))
    ));

    assert!(service.list_events(&second).unwrap().is_empty());
    let stored = market.listing(&listing.id).unwrap();
    assert_eq!(stored.owner_id, "organizer-1");
    assert_eq!(stored.title, "Hackathon");
}

#[test]
fn personal_copy_of_a_listing_grants_no_attendee_access() {
    let conn = open_db_in_memory().unwrap();
    let market = marketplace(&conn);
    let service = event_service(&conn);
    let owner = actor("organizer-1", Role::Organizer);
    let other = actor("organizer-2", Role::Organizer);

    let listing = market
        .publish(
            &owner,
            &draft("Design Sprint", "2025-07-01", "13:00", EventCategory::Organizer),
        )
        .unwrap();
    let resolution = service
        .register_event(&other, &listing, &mut FixedAnswer(false))
        .unwrap();
    let registration = resolution
        .outcome
        .committed()
        .and_then(|report| report.registration.clone())
        .expect("registration recorded");
    assert!(service.get_event(&other, &listing.id).unwrap().is_some());

    assert!(matches!(
        market.attendees(&other, &listing.id),
        Err(MarketplaceError::ListingNotFound(_))
    ));
    assert!(matches!(
        market.update_attendance(&other, &registration.id, RegistrationStatus::Cancelled),
        Err(MarketplaceError::ListingNotFound(_))
    ));

    let attendees = market.attendees(&owner, &listing.id).unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].status, registration.status);
}

#[test]
fn listing_lookup_returns_published_copy_for_repeat_registration() {
    let conn = open_db_in_memory().unwrap();
    let market = marketplace(&conn);
    let service = event_service(&conn);
    let organizer = actor("organizer-1", Role::Organizer);
    let student = actor("student-1", Role::Student);

    let published = market
        .publish(
            &organizer,
            &draft("Career Night", "2025-08-12", "18:00", EventCategory::Organizer),
        )
        .unwrap();

    let listing = market.listing(&published.id).unwrap();
    assert_eq!(listing.owner_id, "organizer-1");
    let first = service
        .register_event(&student, &listing, &mut FixedAnswer(false))
        .unwrap();
    assert!(!first.outcome.committed().unwrap().already_registered());

    let listing = market.listing(&published.id).unwrap();
    assert_eq!(listing.owner_id, "organizer-1");
    let second = service
        .register_event(&student, &listing, &mut FixedAnswer(false))
        .unwrap();
    assert!(second.outcome.committed().unwrap().already_registered());
    assert_eq!(service.list_events(&student).unwrap().len(), 1);

    assert!(matches!(
        market.listing("missing-id"),
        Err(MarketplaceError::ListingNotFound(_))
    ));
}
