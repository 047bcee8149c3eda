use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::registration::{CancelRegistrationUseCase, RegisterForEventUseCase};

/// Returned by both register and cancel with the post-operation seat count.
#[derive(Serialize)]
pub struct RegistrationResponse {
    pub registered: u64,
}

// ── POST /events/{id}/register ───────────────────────────────────────────────

pub async fn register_for_event(
    identity: Identity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let usecase = RegisterForEventUseCase {
        ledger: state.registration_ledger(),
        users: state.user_repo(),
        events: state.event_repo(),
        mailer: state.mailer(),
    };
    let output = usecase.execute(identity.user_id, event_id).await?;
    Ok(Json(RegistrationResponse {
        registered: output.registered,
    }))
}

// ── DELETE /events/{id}/cancel ───────────────────────────────────────────────

pub async fn cancel_registration(
    identity: Identity,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let usecase = CancelRegistrationUseCase {
        ledger: state.registration_ledger(),
    };
    let output = usecase.execute(identity.user_id, event_id).await?;
    Ok(Json(RegistrationResponse {
        registered: output.registered,
    }))
}
