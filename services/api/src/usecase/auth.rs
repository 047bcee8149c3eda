use chrono::Utc;
use rand::RngExt;
use sha3::{Digest, Sha3_256};
use uuid::Uuid;

use crate::auth::issue_token;
use crate::domain::repository::{RegistrationLedger, UserRepository};
use crate::domain::types::{User, UserRole};
use crate::error::ApiError;

/// Charset for password salts (alphanumeric).
const SALT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const SALT_LEN: usize = 16;

fn generate_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| SALT_CHARSET[rng.random_range(0..SALT_CHARSET.len())] as char)
        .collect()
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash a password with a fresh random salt. Stored as `salt$digest`.
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let digest = digest(&salt, password);
    format!("{salt}${digest}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub struct SignupOutput {
    pub user: User,
    pub token: String,
}

pub struct SignupUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> SignupUseCase<U> {
    pub async fn execute(&self, input: SignupInput) -> Result<SignupOutput, ApiError> {
        // 1. Reject taken emails up front; a racing insert is caught again
        //    by the unique index on create.
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        // 2. Persist the account with a salted password hash.
        let user = User {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            password_hash: Some(hash_password(&input.password)),
            role: input.role,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;

        // 3. Log the fresh account straight in.
        let token = issue_token(user.id, user.role, &self.jwt_secret)?;
        Ok(SignupOutput { user, token })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginOutput {
    pub user: User,
    pub token: String,
    /// Event ids the user holds a seat for, returned so clients can render
    /// "registered" state without a second request.
    pub registered_events: Vec<Uuid>,
}

pub struct LoginUseCase<U, L>
where
    U: UserRepository,
    L: RegistrationLedger,
{
    pub users: U,
    pub ledger: L,
    pub jwt_secret: String,
}

impl<U, L> LoginUseCase<U, L>
where
    U: UserRepository,
    L: RegistrationLedger,
{
    /// Unknown email, wrong password, and passwordless accounts all answer
    /// with the same error so the response does not leak which emails exist.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let stored = user
            .password_hash
            .as_deref()
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(&input.password, stored) {
            return Err(ApiError::InvalidCredentials);
        }

        let registered_events = self.ledger.event_ids_for_user(user.id).await?;
        let token = issue_token(user.id, user.role, &self.jwt_secret)?;
        Ok(LoginOutput {
            user,
            token,
            registered_events,
        })
    }
}
