use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Unified error type for the API service.
///
/// Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
/// each variant to a status code and a JSON body of the shape
/// `{"kind": "...", "message": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("capacity must be at least 1")]
    InvalidCapacity,

    #[error("capacity exceeds role limit")]
    CapacityExceedsRoleLimit,

    #[error("event is full")]
    EventFull,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("registration conflict, retry")]
    CapacityRace,

    #[error("invalid token")]
    InvalidToken,

    #[error("forbidden")]
    Forbidden,

    #[error("event not found")]
    EventNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("not registered")]
    NotRegistered,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable code for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCapacity => "INVALID_CAPACITY",
            Self::CapacityExceedsRoleLimit => "CAPACITY_EXCEEDS_ROLE_LIMIT",
            Self::EventFull => "EVENT_FULL",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::CapacityRace => "CAPACITY_RACE",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotRegistered => "NOT_REGISTERED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EmailTaken
            | Self::InvalidCredentials
            | Self::InvalidCapacity
            | Self::CapacityExceedsRoleLimit
            | Self::EventFull
            | Self::AlreadyRegistered => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EventNotFound | Self::UserNotFound | Self::NotRegistered => {
                StatusCode::NOT_FOUND
            }
            Self::CapacityRace => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Log 500s only — tower-http TraceLayer already records
        // method/uri/status for all requests. 4xx are expected client
        // errors; logging them here would be noise.
        if let Self::Internal(e) = &self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }

        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
