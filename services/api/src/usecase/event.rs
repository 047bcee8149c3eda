use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::EventRepository;
use crate::domain::types::{Event, EventSummary, USER_ROLE_CAPACITY_LIMIT, UserRole};
use crate::error::ApiError;

// ── CreateEvent ──────────────────────────────────────────────────────────────

pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    /// Raw client value; validated against 1..=i32::MAX (the storage range)
    /// and the creator's role ceiling before it becomes
    /// [`Event::max_capacity`].
    pub max_capacity: i64,
    pub image: Option<String>,
}

pub struct CreateEventUseCase<E: EventRepository> {
    pub events: E,
}

impl<E: EventRepository> CreateEventUseCase<E> {
    pub async fn execute(
        &self,
        organizer_id: Uuid,
        role: UserRole,
        input: CreateEventInput,
    ) -> Result<Event, ApiError> {
        // The column is a signed 32-bit integer; anything outside 1..=i32::MAX
        // is rejected here instead of failing the insert.
        let max_capacity = i32::try_from(input.max_capacity)
            .ok()
            .filter(|c| *c >= 1)
            .map(|c| c as u32)
            .ok_or(ApiError::InvalidCapacity)?;

        // User-role creators are capped; the request is rejected, not clamped.
        if role == UserRole::User && max_capacity > USER_ROLE_CAPACITY_LIMIT {
            return Err(ApiError::CapacityExceedsRoleLimit);
        }

        let event = Event {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            category: input.category,
            starts_at: input.starts_at,
            location: input.location,
            max_capacity,
            image: input.image,
            organizer_id,
            created_at: Utc::now(),
        };
        self.events.create(&event).await?;
        Ok(event)
    }
}

// ── ListEvents ───────────────────────────────────────────────────────────────

pub struct ListEventsUseCase<E: EventRepository> {
    pub events: E,
}

impl<E: EventRepository> ListEventsUseCase<E> {
    pub async fn execute(&self) -> Result<Vec<EventSummary>, ApiError> {
        self.events.list_with_stats().await
    }
}

// ── ListMyEvents ─────────────────────────────────────────────────────────────

pub struct ListMyEventsUseCase<E: EventRepository> {
    pub events: E,
}

impl<E: EventRepository> ListMyEventsUseCase<E> {
    pub async fn execute(&self, organizer_id: Uuid) -> Result<Vec<Event>, ApiError> {
        self.events.list_by_organizer(organizer_id).await
    }
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

pub struct DeleteEventUseCase<E: EventRepository> {
    pub events: E,
}

impl<E: EventRepository> DeleteEventUseCase<E> {
    /// The owner may always delete their event; organizer-role callers may
    /// delete any event.
    pub async fn execute(
        &self,
        caller_id: Uuid,
        caller_role: UserRole,
        event_id: Uuid,
    ) -> Result<(), ApiError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(ApiError::EventNotFound)?;

        if event.organizer_id != caller_id && caller_role != UserRole::Organizer {
            return Err(ApiError::Forbidden);
        }

        // A concurrent delete between the lookup and here surfaces as 404.
        let deleted = self.events.delete(event_id).await?;
        if !deleted {
            return Err(ApiError::EventNotFound);
        }
        Ok(())
    }
}
