//! JWT access tokens and the bearer-token request extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{TOKEN_EXP_SECS, UserRole};
use crate::error::ApiError;
use crate::state::AppState;

/// Errors returned by [`validate_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// `sub` is the user id as a UUID string, `role` the snake_case role name,
/// `exp` seconds since the UNIX epoch.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: UserRole,
    pub exp: u64,
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Sign a fresh access token for the user, valid for [`TOKEN_EXP_SECS`].
pub fn issue_token(user_id: Uuid, role: UserRole, secret: &str) -> Result<String, ApiError> {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        role,
        exp: now_secs() + TOKEN_EXP_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

/// Decode and validate an access token, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s tolerates clock skew between instances.
pub fn validate_token(token: &str, secret: &str) -> Result<JwtClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims)
}

/// Caller identity from the `Authorization: Bearer <token>` header.
///
/// Returns 401 if the header is absent or the token fails validation.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::to_owned);

        let secret = state.jwt_secret.clone();

        async move {
            let token = token.ok_or(ApiError::InvalidToken)?;
            let claims = validate_token(&token, &secret).map_err(|_| ApiError::InvalidToken)?;
            let user_id = claims
                .sub
                .parse::<Uuid>()
                .map_err(|_| ApiError::InvalidToken)?;
            Ok(Self {
                user_id,
                role: claims.role,
            })
        }
    }
}
