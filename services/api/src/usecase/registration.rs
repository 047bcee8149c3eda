use std::time::Duration;

use uuid::Uuid;

use crate::domain::repository::{EventRepository, Mailer, RegistrationLedger, UserRepository};
use crate::domain::types::{
    MAIL_TIMEOUT_SECS, MailKind, OutgoingMail, ReleaseOutcome, ReserveOutcome,
};
use crate::error::ApiError;

// ── RegisterForEvent ─────────────────────────────────────────────────────────

pub struct RegisterOutput {
    /// Seats held after this registration, the caller's included.
    pub registered: u64,
}

pub struct RegisterForEventUseCase<L, U, E, M>
where
    L: RegistrationLedger,
    U: UserRepository,
    E: EventRepository,
    M: Mailer + Clone + 'static,
{
    pub ledger: L,
    pub users: U,
    pub events: E,
    pub mailer: M,
}

impl<L, U, E, M> RegisterForEventUseCase<L, U, E, M>
where
    L: RegistrationLedger,
    U: UserRepository,
    E: EventRepository,
    M: Mailer + Clone + 'static,
{
    pub async fn execute(&self, user_id: Uuid, event_id: Uuid) -> Result<RegisterOutput, ApiError> {
        // 1. Claim the seat. The ledger does the capacity check and the
        //    insert in one atomic step.
        let registered = match self.ledger.try_reserve(event_id, user_id).await? {
            ReserveOutcome::Reserved { registered } => registered,
            ReserveOutcome::CapacityFull => return Err(ApiError::EventFull),
            ReserveOutcome::AlreadyRegistered => return Err(ApiError::AlreadyRegistered),
            ReserveOutcome::EventNotFound => return Err(ApiError::EventNotFound),
        };

        // 2. Queue the confirmation email off the request path. The seat is
        //    already committed; nothing past this point may undo it.
        let recipient = self.users.find_by_id(user_id).await;
        let event = self.events.find_by_id(event_id).await;
        if let (Ok(Some(user)), Ok(Some(event))) = (recipient, event) {
            let mailer = self.mailer.clone();
            let mail = OutgoingMail {
                kind: MailKind::RegistrationConfirmation,
                to_email: user.email,
                to_name: user.name,
                event: event.details(),
            };
            tokio::spawn(async move {
                deliver_confirmation(mailer, mail).await;
            });
        } else {
            tracing::warn!(%user_id, %event_id, "confirmation email skipped, lookup failed");
        }

        Ok(RegisterOutput { registered })
    }
}

/// Best-effort delivery: failures and timeouts are logged, never retried.
async fn deliver_confirmation<M: Mailer>(mailer: M, mail: OutgoingMail) {
    let send = mailer.send(&mail);
    match tokio::time::timeout(Duration::from_secs(MAIL_TIMEOUT_SECS), send).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(error = %e, to = %mail.to_email, "confirmation email failed");
        }
        Err(_) => {
            tracing::warn!(to = %mail.to_email, "confirmation email timed out");
        }
    }
}

// ── CancelRegistration ───────────────────────────────────────────────────────

pub struct CancelOutput {
    /// Seats still held after the cancellation.
    pub registered: u64,
}

pub struct CancelRegistrationUseCase<L: RegistrationLedger> {
    pub ledger: L,
}

impl<L: RegistrationLedger> CancelRegistrationUseCase<L> {
    /// No email is sent on cancellation.
    pub async fn execute(&self, user_id: Uuid, event_id: Uuid) -> Result<CancelOutput, ApiError> {
        match self.ledger.release(event_id, user_id).await? {
            ReleaseOutcome::Released { registered } => Ok(CancelOutput { registered }),
            ReleaseOutcome::NotRegistered => Err(ApiError::NotRegistered),
        }
    }
}
