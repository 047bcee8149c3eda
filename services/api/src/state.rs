use sea_orm::DatabaseConnection;

use crate::infra::db::{DbEventRepository, DbRegistrationLedger, DbUserRepository};
use crate::infra::mail::HttpMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: HttpMailer,
    pub jwt_secret: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn event_repo(&self) -> DbEventRepository {
        DbEventRepository {
            db: self.db.clone(),
        }
    }

    pub fn registration_ledger(&self) -> DbRegistrationLedger {
        DbRegistrationLedger {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> HttpMailer {
        self.mailer.clone()
    }
}
