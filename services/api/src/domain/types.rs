//! Domain types for accounts, events, and the seat ledger.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token lifetime in seconds (8 hours).
pub const TOKEN_EXP_SECS: u64 = 28_800;

/// Seat ceiling a user-role creator may request. Organizers are unrestricted.
pub const USER_ROLE_CAPACITY_LIMIT: u32 = 20;

/// Upper bound in seconds on one outbound mail delivery, connect included.
pub const MAIL_TIMEOUT_SECS: u64 = 10;

/// Account role.
///
/// Stored as `i16` (0 = user, 1 = organizer); serialized as `"user"` /
/// `"organizer"` in JSON bodies and JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User = 0,
    Organizer = 1,
}

impl UserRole {
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::User),
            1 => Some(Self::Organizer),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// `None` for accounts provisioned without a password; such accounts
    /// cannot log in with credentials.
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub max_capacity: u32,
    pub image: Option<String>,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn details(&self) -> EventDetails {
        EventDetails {
            title: self.title.clone(),
            starts_at: self.starts_at,
            location: self.location.clone(),
            category: self.category.clone(),
        }
    }
}

/// An event joined with the presentation data the public listing needs.
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub event: Event,
    pub organizer_name: String,
    pub registered: u64,
}

/// One row of the seat ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub week_reminder_sent: bool,
    pub day_reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of an atomic seat reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved { registered: u64 },
    CapacityFull,
    AlreadyRegistered,
    EventNotFound,
}

/// Result of releasing a held seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released { registered: u64 },
    NotRegistered,
}

/// Which reminder a daily scan is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Week,
    Day,
}

impl ReminderKind {
    /// Farthest start date (in days from the run date) the window reaches.
    pub fn offset_days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Day => 1,
        }
    }

    /// Template identifier used in logs and metrics fields.
    pub fn template_kind(self) -> &'static str {
        match self {
            Self::Week => "week_reminder",
            Self::Day => "day_reminder",
        }
    }

    pub fn mail_kind(self) -> MailKind {
        match self {
            Self::Week => MailKind::WeekReminder,
            Self::Day => MailKind::DayReminder,
        }
    }

    /// Eligibility window `[start, end)` for a scan run on `today`, as UTC
    /// midnight instants.
    ///
    /// `Day` covers events starting tomorrow; `Week` covers events two to
    /// seven days out. The windows are disjoint, so a single scan never
    /// selects both reminders for one event, and a skipped day is caught up
    /// by the week window while the event is still days away.
    pub fn window_bounds(self, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let (first, last) = match self {
            Self::Day => (1, 1),
            Self::Week => (2, self.offset_days()),
        };
        (
            midnight_utc(today + Duration::days(first)),
            midnight_utc(today + Duration::days(last + 1)),
        )
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Mail template selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    RegistrationConfirmation,
    WeekReminder,
    DayReminder,
}

/// The event fields rendered into outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub category: String,
}

/// A fully addressed mail ready for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub kind: MailKind,
    pub to_email: String,
    pub to_name: String,
    pub event: EventDetails,
}

/// One (user, event) pair owed a reminder, with everything needed to send it.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub to_email: String,
    pub to_name: String,
    pub event: EventDetails,
}
