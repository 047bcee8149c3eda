//! Daily trigger for the reminder scan.

use chrono::{DateTime, NaiveTime, Utc};

use crate::state::AppState;
use crate::usecase::reminder::SendDueRemindersUseCase;

/// Hour of day (UTC) the reminder scan runs.
pub const REMINDER_HOUR_UTC: u32 = 9;

/// Seconds until the next `hour:00:00` UTC tick, strictly in the future.
fn secs_until_next_run(now: DateTime<Utc>, hour: u32) -> u64 {
    let run_time = NaiveTime::from_hms_opt(hour, 0, 0).expect("valid run hour");
    let today_run = now.date_naive().and_time(run_time).and_utc();
    let next = if today_run > now {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };
    (next - now).num_seconds().max(1) as u64
}

/// Run reminder scans forever: sleep to the next daily trigger, scan, sleep
/// again. Scans never overlap; a slow scan pushes the next tick out instead.
pub async fn run_reminder_loop(state: AppState) {
    loop {
        let wait = secs_until_next_run(Utc::now(), REMINDER_HOUR_UTC);
        tracing::debug!(wait_secs = wait, "reminder loop sleeping");
        tokio::time::sleep(std::time::Duration::from_secs(wait)).await;

        let usecase = SendDueRemindersUseCase {
            ledger: state.registration_ledger(),
            mailer: state.mailer(),
        };
        let today = Utc::now().date_naive();
        if let Err(e) = usecase.execute(today).await {
            // Scan failures are retried at the next tick; flags keep the
            // catch-up idempotent.
            tracing::error!(error = %e, %today, "reminder scan failed");
        }
    }
}
