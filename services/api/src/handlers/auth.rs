use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, SignupInput, SignupUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `user`; anyone may sign up as an organizer.
    pub role: Option<UserRole>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let usecase = SignupUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let output = usecase
        .execute(SignupInput {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role.unwrap_or(UserRole::User),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse {
                id: output.user.id.to_string(),
                name: output.user.name,
                email: output.user.email,
                role: output.user.role,
                created_at: output.user.created_at,
            },
            token: output.token,
        }),
    ))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoggedInUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Event ids the account holds a seat for.
    pub registered_events: Vec<String>,
    #[serde(serialize_with = "eventhub_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: LoggedInUserResponse,
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        ledger: state.registration_ledger(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        user: LoggedInUserResponse {
            id: output.user.id.to_string(),
            name: output.user.name,
            email: output.user.email,
            role: output.user.role,
            registered_events: output
                .registered_events
                .iter()
                .map(|id| id.to_string())
                .collect(),
            created_at: output.user.created_at,
        },
        token: output.token,
    }))
}
