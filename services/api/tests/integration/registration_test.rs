use std::time::Duration;

use chrono::Utc;

use eventhub_api::domain::repository::RegistrationLedger;
use eventhub_api::domain::types::{MailKind, UserRole};
use eventhub_api::error::ApiError;
use eventhub_api::usecase::registration::{CancelRegistrationUseCase, RegisterForEventUseCase};

use crate::helpers::{MockEventRepo, MockLedger, MockMailer, MockUserRepo, test_event, test_user};

fn registration_usecase(
    ledger: &MockLedger,
    users: &MockUserRepo,
    events: &MockEventRepo,
    mailer: &MockMailer,
) -> RegisterForEventUseCase<MockLedger, MockUserRepo, MockEventRepo, MockMailer> {
    RegisterForEventUseCase {
        ledger: ledger.clone(),
        users: users.clone(),
        events: events.clone(),
        mailer: mailer.clone(),
    }
}

/// Give the detached confirmation-mail task a chance to run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn should_register_and_send_confirmation_mail() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(2, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now() + chrono::Duration::days(5), 2);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    let output = registration_usecase(&ledger, &users, &events, &mailer)
        .execute(alice.id, event.id)
        .await
        .unwrap();
    assert_eq!(output.registered, 1);
    assert!(ledger.holds_seat(alice.id, event.id));

    settle().await;
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, MailKind::RegistrationConfirmation);
    assert_eq!(sent[0].to_email, "user1@example.com");
    assert_eq!(sent[0].event.title, event.title);
}

#[tokio::test]
async fn should_keep_seat_when_confirmation_mail_bounces() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(2, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 5);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();
    mailer.fail_for("user1@example.com");

    let output = registration_usecase(&ledger, &users, &events, &mailer)
        .execute(alice.id, event.id)
        .await
        .unwrap();

    assert_eq!(output.registered, 1, "mail failure must not fail the request");
    settle().await;
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert!(ledger.holds_seat(alice.id, event.id), "seat survives the bounce");
}

#[tokio::test]
async fn should_reject_duplicate_registration() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(2, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 5);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    let usecase = registration_usecase(&ledger, &users, &events, &mailer);
    usecase.execute(alice.id, event.id).await.unwrap();
    let result = usecase.execute(alice.id, event.id).await;

    assert!(matches!(result, Err(ApiError::AlreadyRegistered)));
    settle().await;
    assert_eq!(
        mailer.sent.lock().unwrap().len(),
        1,
        "only the first registration mails a confirmation"
    );
}

#[tokio::test]
async fn should_report_duplicate_over_full_when_holder_retries() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(2, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 1);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    // Alice takes the only seat, then retries. The event is now full, but
    // she must hear about her existing seat, not about capacity.
    let usecase = registration_usecase(&ledger, &users, &events, &mailer);
    usecase.execute(alice.id, event.id).await.unwrap();
    let result = usecase.execute(alice.id, event.id).await;

    assert!(matches!(result, Err(ApiError::AlreadyRegistered)));
}

#[tokio::test]
async fn should_reject_registration_when_full() {
    let alice = test_user(1, UserRole::User);
    let bob = test_user(2, UserRole::User);
    let organizer = test_user(3, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 1);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone(), bob.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    let usecase = registration_usecase(&ledger, &users, &events, &mailer);
    usecase.execute(alice.id, event.id).await.unwrap();
    let result = usecase.execute(bob.id, event.id).await;

    assert!(matches!(result, Err(ApiError::EventFull)));
}

#[tokio::test]
async fn should_reject_registration_for_unknown_event() {
    let alice = test_user(1, UserRole::User);
    let ledger = MockLedger::default();
    let usecase = registration_usecase(
        &ledger,
        &MockUserRepo::new(vec![alice.clone()]),
        &MockEventRepo::default(),
        &MockMailer::default(),
    );

    let result = usecase
        .execute(alice.id, test_event(1, alice.id, Utc::now(), 1).id)
        .await;
    assert!(matches!(result, Err(ApiError::EventNotFound)));
}

#[tokio::test]
async fn should_free_seat_on_cancel_and_allow_reregistration() {
    let alice = test_user(1, UserRole::User);
    let bob = test_user(2, UserRole::User);
    let organizer = test_user(3, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 1);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone(), bob.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    let register = registration_usecase(&ledger, &users, &events, &mailer);
    register.execute(alice.id, event.id).await.unwrap();

    let cancel = CancelRegistrationUseCase {
        ledger: ledger.clone(),
    };
    let output = cancel.execute(alice.id, event.id).await.unwrap();
    assert_eq!(output.registered, 0);
    assert!(!ledger.holds_seat(alice.id, event.id));

    // The freed seat goes to the next caller.
    let output = register.execute(bob.id, event.id).await.unwrap();
    assert_eq!(output.registered, 1);
}

#[tokio::test]
async fn should_answer_not_registered_for_unknown_cancellation() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(2, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 1);

    let ledger = MockLedger::default();
    ledger.add_event(&event);

    let cancel = CancelRegistrationUseCase { ledger };
    let result = cancel.execute(alice.id, event.id).await;
    assert!(matches!(result, Err(ApiError::NotRegistered)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn should_give_last_seat_to_exactly_one_concurrent_caller() {
    let alice = test_user(1, UserRole::User);
    let bob = test_user(2, UserRole::User);
    let organizer = test_user(3, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc::now(), 1);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    let users = MockUserRepo::new(vec![alice.clone(), bob.clone()]);
    let events = MockEventRepo::with_events(vec![event.clone()]);
    let mailer = MockMailer::default();

    let spawn_register = |user_id| {
        let usecase = registration_usecase(&ledger, &users, &events, &mailer);
        let event_id = event.id;
        tokio::spawn(async move { usecase.execute(user_id, event_id).await })
    };

    let first = spawn_register(alice.id);
    let second = spawn_register(bob.id);
    let results = [first.await.unwrap(), second.await.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one caller may take the last seat");
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ApiError::EventFull))));

    let count = ledger.count_for_event(event.id).await.unwrap();
    assert_eq!(count, 1, "the ledger never oversells");
}
