use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::domain::types::{Event, UserRole};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventInput, CreateEventUseCase, DeleteEventUseCase, ListEventsUseCase,
    ListMyEventsUseCase,
};

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub max_capacity: u32,
    pub image: Option<String>,
    pub organizer_id: String,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn event_response(event: Event) -> EventResponse {
    EventResponse {
        id: event.id.to_string(),
        title: event.title,
        description: event.description,
        category: event.category,
        starts_at: event.starts_at,
        location: event.location,
        max_capacity: event.max_capacity,
        image: event.image,
        organizer_id: event.organizer_id.to_string(),
        created_at: event.created_at,
    }
}

// ── POST /events ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub max_capacity: i64,
    pub image: Option<String>,
}

pub async fn create_event(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let usecase = CreateEventUseCase {
        events: state.event_repo(),
    };
    let event = usecase
        .execute(
            identity.user_id,
            identity.role,
            CreateEventInput {
                title: body.title,
                description: body.description,
                category: body.category,
                starts_at: body.starts_at,
                location: body.location,
                max_capacity: body.max_capacity,
                image: body.image,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(event_response(event))))
}

// ── GET /events ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventListItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub max_capacity: u32,
    pub image: Option<String>,
    pub organizer_id: String,
    pub organizer_name: String,
    /// Seats currently held.
    pub registered: u64,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public; no token required.
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventListItem>>, ApiError> {
    let usecase = ListEventsUseCase {
        events: state.event_repo(),
    };
    let summaries = usecase.execute().await?;
    let items = summaries
        .into_iter()
        .map(|summary| EventListItem {
            id: summary.event.id.to_string(),
            title: summary.event.title,
            description: summary.event.description,
            category: summary.event.category,
            starts_at: summary.event.starts_at,
            location: summary.event.location,
            max_capacity: summary.event.max_capacity,
            image: summary.event.image,
            organizer_id: summary.event.organizer_id.to_string(),
            organizer_name: summary.organizer_name,
            registered: summary.registered,
            created_at: summary.event.created_at,
        })
        .collect();
    Ok(Json(items))
}

// ── GET /events/mine ─────────────────────────────────────────────────────────

pub async fn list_my_events(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    if identity.role != UserRole::Organizer {
        return Err(ApiError::Forbidden);
    }
    let usecase = ListMyEventsUseCase {
        events: state.event_repo(),
    };
    let events = usecase.execute(identity.user_id).await?;
    Ok(Json(events.into_iter().map(event_response).collect()))
}

// ── DELETE /events/{id} ──────────────────────────────────────────────────────

pub async fn delete_event(
    identity: Identity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteEventUseCase {
        events: state.event_repo(),
    };
    usecase
        .execute(identity.user_id, identity.role, event_id)
        .await?;
    Ok(StatusCode::OK)
}
