use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use eventhub_core::health::{healthz, readyz};
use eventhub_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, register},
    event::{create_event, delete_event, list_events, list_my_events},
    registration::{cancel_registration, register_for_event},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Events
        .route("/events", get(list_events))
        .route("/events", post(create_event))
        .route("/events/mine", get(list_my_events))
        .route("/events/{id}", delete(delete_event))
        // Registrations
        .route("/events/{id}/register", post(register_for_event))
        .route("/events/{id}/cancel", delete(cancel_registration))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
