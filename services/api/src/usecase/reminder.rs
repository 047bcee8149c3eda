use chrono::NaiveDate;

use crate::domain::repository::{Mailer, RegistrationLedger};
use crate::domain::types::{OutgoingMail, ReminderKind};
use crate::error::ApiError;

/// Counters from one reminder scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRunReport {
    pub sent: u64,
    pub failed: u64,
}

// ── SendDueReminders ─────────────────────────────────────────────────────────

pub struct SendDueRemindersUseCase<L, M>
where
    L: RegistrationLedger,
    M: Mailer,
{
    pub ledger: L,
    pub mailer: M,
}

impl<L, M> SendDueRemindersUseCase<L, M>
where
    L: RegistrationLedger,
    M: Mailer,
{
    /// One scan for the run date `today`: week reminders first, then day
    /// reminders. The two windows are disjoint, so no (user, event) pair is
    /// considered twice in one run.
    pub async fn execute(&self, today: NaiveDate) -> Result<ReminderRunReport, ApiError> {
        let mut report = ReminderRunReport::default();
        for kind in [ReminderKind::Week, ReminderKind::Day] {
            self.run_kind(kind, today, &mut report).await?;
        }
        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            %today,
            "reminder scan finished"
        );
        Ok(report)
    }

    async fn run_kind(
        &self,
        kind: ReminderKind,
        today: NaiveDate,
        report: &mut ReminderRunReport,
    ) -> Result<(), ApiError> {
        let due = self.ledger.due_reminders(kind, today).await?;
        for reminder in due {
            let mail = OutgoingMail {
                kind: kind.mail_kind(),
                to_email: reminder.to_email.clone(),
                to_name: reminder.to_name.clone(),
                event: reminder.event.clone(),
            };
            match self.mailer.send(&mail).await {
                Ok(()) => {
                    // Flag flips only after a successful send.
                    self.ledger
                        .mark_reminder_sent(kind, reminder.user_id, reminder.event_id)
                        .await?;
                    report.sent += 1;
                }
                Err(e) => {
                    // One bad recipient must not starve the rest of the batch.
                    tracing::warn!(
                        error = %e,
                        kind = kind.template_kind(),
                        to = %reminder.to_email,
                        "reminder send failed, will retry next run"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }
}
