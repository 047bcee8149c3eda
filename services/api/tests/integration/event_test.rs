use chrono::{Duration, Utc};

use eventhub_api::domain::types::UserRole;
use eventhub_api::error::ApiError;
use eventhub_api::usecase::event::{
    CreateEventInput, CreateEventUseCase, DeleteEventUseCase, ListEventsUseCase,
    ListMyEventsUseCase,
};

use crate::helpers::{MockEventRepo, test_event, test_user};

#[tokio::test]
async fn should_list_events_soonest_first_with_stats() {
    let organizer = test_user(1, UserRole::Organizer);
    let now = Utc::now();
    let later = test_event(1, organizer.id, now + Duration::days(30), 100);
    let sooner = test_event(2, organizer.id, now + Duration::days(2), 50);

    let repo = MockEventRepo::with_events(vec![later.clone(), sooner.clone()]);
    repo.set_organizer_name(organizer.id, "user1");
    repo.set_seat_count(sooner.id, 7);

    let usecase = ListEventsUseCase { events: repo };
    let listing = usecase.execute().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].event.id, sooner.id, "soonest event comes first");
    assert_eq!(listing[0].organizer_name, "user1");
    assert_eq!(listing[0].registered, 7);
    assert_eq!(listing[1].event.id, later.id);
    assert_eq!(listing[1].registered, 0);
}

#[tokio::test]
async fn should_list_own_events_latest_first() {
    let organizer = test_user(1, UserRole::Organizer);
    let other = test_user(2, UserRole::Organizer);
    let now = Utc::now();
    let old = test_event(1, organizer.id, now + Duration::days(1), 10);
    let new = test_event(2, organizer.id, now + Duration::days(14), 10);
    let foreign = test_event(3, other.id, now + Duration::days(7), 10);

    let usecase = ListMyEventsUseCase {
        events: MockEventRepo::with_events(vec![old.clone(), new.clone(), foreign]),
    };
    let mine = usecase.execute(organizer.id).await.unwrap();

    assert_eq!(mine.len(), 2, "foreign events must not appear");
    assert_eq!(mine[0].id, new.id, "latest start date comes first");
    assert_eq!(mine[1].id, old.id);
}

#[tokio::test]
async fn should_create_then_delete_own_event() {
    let creator = test_user(1, UserRole::User);
    let repo = MockEventRepo::default();

    let created = CreateEventUseCase {
        events: repo.clone(),
    }
    .execute(
        creator.id,
        creator.role,
        CreateEventInput {
            title: "Board games".into(),
            description: "Bring your own".into(),
            category: "social".into(),
            starts_at: Utc::now() + Duration::days(3),
            location: "Cologne".into(),
            max_capacity: 12,
            image: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(created.organizer_id, creator.id);

    DeleteEventUseCase {
        events: repo.clone(),
    }
    .execute(creator.id, creator.role, created.id)
    .await
    .unwrap();

    assert!(repo.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_keep_event_when_stranger_tries_delete() {
    let organizer = test_user(1, UserRole::Organizer);
    let stranger = test_user(2, UserRole::User);
    let event = test_event(1, organizer.id, Utc::now(), 10);

    let repo = MockEventRepo::with_events(vec![event.clone()]);
    let result = DeleteEventUseCase {
        events: repo.clone(),
    }
    .execute(stranger.id, stranger.role, event.id)
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden)));
    assert_eq!(repo.events.lock().unwrap().len(), 1);
}
