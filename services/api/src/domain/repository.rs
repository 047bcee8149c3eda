//! Persistence and delivery ports implemented by `infra`.

#![allow(async_fn_in_trait)]

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::types::{
    DueReminder, Event, EventSummary, OutgoingMail, ReleaseOutcome, ReminderKind, ReserveOutcome,
    User,
};
use crate::error::ApiError;

pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Insert a new account. A concurrent insert of the same email maps to
    /// [`ApiError::EmailTaken`].
    async fn create(&self, user: &User) -> Result<(), ApiError>;
}

pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError>;

    async fn create(&self, event: &Event) -> Result<(), ApiError>;

    /// All events, soonest first, with organizer name and seat count.
    async fn list_with_stats(&self) -> Result<Vec<EventSummary>, ApiError>;

    /// Events owned by one organizer, latest start date first.
    async fn list_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Event>, ApiError>;

    /// Returns `true` if a row was deleted. Registrations go with it via
    /// cascade.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// The seat ledger. Every registration row is written through here, and
/// [`try_reserve`](RegistrationLedger::try_reserve) is the only way to add
/// one.
pub trait RegistrationLedger: Send + Sync {
    /// Atomically claim a seat: the capacity check and the insert happen in
    /// one isolated step, so the count of rows per event never exceeds the
    /// event's capacity, concurrency included.
    async fn try_reserve(&self, event_id: Uuid, user_id: Uuid)
    -> Result<ReserveOutcome, ApiError>;

    /// Drop the caller's seat and report the seats still held.
    async fn release(&self, event_id: Uuid, user_id: Uuid) -> Result<ReleaseOutcome, ApiError>;

    async fn count_for_event(&self, event_id: Uuid) -> Result<u64, ApiError>;

    /// Event ids the user currently holds a seat for.
    async fn event_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, ApiError>;

    /// Rows owed a reminder of `kind` for a scan run on `today`: the event
    /// starts inside the kind's window and the kind's flag is still unset.
    async fn due_reminders(
        &self,
        kind: ReminderKind,
        today: NaiveDate,
    ) -> Result<Vec<DueReminder>, ApiError>;

    /// Flip one (user, event) pair's reminder flag of `kind`. Flags only go
    /// false to true; there is no reset.
    async fn mark_reminder_sent(
        &self,
        kind: ReminderKind,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), ApiError>;
}

/// Outbound mail delivery.
///
/// Declared in desugared form with an explicit `Send` bound: registration
/// spawns confirmation sends onto the runtime, and `tokio::spawn` needs the
/// future to be `Send` even for generic mailers. Implementations can still
/// use plain `async fn`.
pub trait Mailer: Send + Sync {
    fn send(
        &self,
        mail: &OutgoingMail,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}
