use chrono::{NaiveDate, TimeZone, Utc};

use eventhub_api::domain::types::{MailKind, ReminderKind, UserRole};
use eventhub_api::usecase::reminder::{ReminderRunReport, SendDueRemindersUseCase};

use crate::helpers::{MockLedger, MockMailer, test_event, test_user};

fn reminder_usecase(
    ledger: &MockLedger,
    mailer: &MockMailer,
) -> SendDueRemindersUseCase<MockLedger, MockMailer> {
    SendDueRemindersUseCase {
        ledger: ledger.clone(),
        mailer: mailer.clone(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

#[tokio::test]
async fn should_send_due_reminders_for_both_windows() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(9, UserRole::Organizer);
    // Relative to the run date: tomorrow, 3 days out, 7 days out, today,
    // 8 days out. Only the first three fall inside a reminder window.
    let tomorrow = test_event(1, organizer.id, Utc.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap(), 50);
    let midweek = test_event(2, organizer.id, Utc.with_ymd_and_hms(2025, 6, 13, 18, 0, 0).unwrap(), 50);
    let week_edge = test_event(3, organizer.id, Utc.with_ymd_and_hms(2025, 6, 17, 9, 0, 0).unwrap(), 50);
    let tonight = test_event(4, organizer.id, Utc.with_ymd_and_hms(2025, 6, 10, 20, 0, 0).unwrap(), 50);
    let far_out = test_event(5, organizer.id, Utc.with_ymd_and_hms(2025, 6, 18, 8, 0, 0).unwrap(), 50);

    let ledger = MockLedger::default();
    for event in [&tomorrow, &midweek, &week_edge, &tonight, &far_out] {
        ledger.add_event(event);
        ledger.seed_registration(&alice, event.id);
    }
    let mailer = MockMailer::default();

    let report = reminder_usecase(&ledger, &mailer).execute(today()).await.unwrap();
    assert_eq!(report, ReminderRunReport { sent: 3, failed: 0 });

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 3);
    // Week scan runs first, day scan second.
    assert_eq!(sent[0].kind, MailKind::WeekReminder);
    assert_eq!(sent[0].event.title, midweek.title);
    assert_eq!(sent[1].kind, MailKind::WeekReminder);
    assert_eq!(sent[1].event.title, week_edge.title);
    assert_eq!(sent[2].kind, MailKind::DayReminder);
    assert_eq!(sent[2].event.title, tomorrow.title);
    assert!(sent.iter().all(|m| m.to_email == alice.email));

    assert!(ledger.flag(ReminderKind::Week, alice.id, midweek.id));
    assert!(ledger.flag(ReminderKind::Week, alice.id, week_edge.id));
    assert!(ledger.flag(ReminderKind::Day, alice.id, tomorrow.id));
    // A day-window event never gets its week flag touched, and events
    // outside both windows keep all flags unset.
    assert!(!ledger.flag(ReminderKind::Week, alice.id, tomorrow.id));
    assert!(!ledger.flag(ReminderKind::Week, alice.id, tonight.id));
    assert!(!ledger.flag(ReminderKind::Week, alice.id, far_out.id));
}

#[tokio::test]
async fn should_send_each_reminder_at_most_once() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(9, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap(), 50);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    ledger.seed_registration(&alice, event.id);
    let mailer = MockMailer::default();

    let usecase = reminder_usecase(&ledger, &mailer);
    let first = usecase.execute(today()).await.unwrap();
    assert_eq!(first, ReminderRunReport { sent: 1, failed: 0 });

    let second = usecase.execute(today()).await.unwrap();
    assert_eq!(second, ReminderRunReport::default(), "rerun must send nothing");
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_retry_failed_recipient_on_next_run() {
    let alice = test_user(1, UserRole::User);
    let bob = test_user(2, UserRole::User);
    let organizer = test_user(9, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc.with_ymd_and_hms(2025, 6, 14, 12, 0, 0).unwrap(), 50);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    ledger.seed_registration(&alice, event.id);
    ledger.seed_registration(&bob, event.id);
    let mailer = MockMailer::default();
    mailer.fail_for(&bob.email);

    let usecase = reminder_usecase(&ledger, &mailer);
    let first = usecase.execute(today()).await.unwrap();
    assert_eq!(first, ReminderRunReport { sent: 1, failed: 1 });
    assert!(ledger.flag(ReminderKind::Week, alice.id, event.id));
    assert!(!ledger.flag(ReminderKind::Week, bob.id, event.id));

    mailer.clear_failures();
    let second = usecase.execute(today()).await.unwrap();
    assert_eq!(second, ReminderRunReport { sent: 1, failed: 0 });
    assert!(ledger.flag(ReminderKind::Week, bob.id, event.id));

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to_email, alice.email);
    assert_eq!(sent[1].to_email, bob.email);
}

#[tokio::test]
async fn should_catch_up_after_skipped_scans() {
    let alice = test_user(1, UserRole::User);
    let organizer = test_user(9, UserRole::Organizer);
    let event = test_event(1, organizer.id, Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(), 50);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    ledger.seed_registration(&alice, event.id);
    let mailer = MockMailer::default();
    let usecase = reminder_usecase(&ledger, &mailer);

    // No scan ran while the event was 7 or 6 days out. The first scan to
    // run still finds it through the week window, and the next day's scan
    // follows up with the day reminder.
    let june_12 = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
    let report = usecase.execute(june_12).await.unwrap();
    assert_eq!(report, ReminderRunReport { sent: 1, failed: 0 });

    let june_13 = NaiveDate::from_ymd_opt(2025, 6, 13).unwrap();
    let report = usecase.execute(june_13).await.unwrap();
    assert_eq!(report, ReminderRunReport { sent: 1, failed: 0 });

    let june_14 = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
    let report = usecase.execute(june_14).await.unwrap();
    assert_eq!(report, ReminderRunReport::default());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind, MailKind::WeekReminder);
    assert_eq!(sent[1].kind, MailKind::DayReminder);
    assert!(ledger.flag(ReminderKind::Week, alice.id, event.id));
    assert!(ledger.flag(ReminderKind::Day, alice.id, event.id));
}
