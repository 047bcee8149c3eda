use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use eventhub_schema::{events, registrations, users};

use crate::domain::repository::{EventRepository, RegistrationLedger, UserRepository};
use crate::domain::types::{
    DueReminder, Event, EventDetails, EventSummary, ReleaseOutcome, ReminderKind, ReserveOutcome,
    User, UserRole,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.as_i16()),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Two signups raced past the usecase's lookup; the unique index
            // on email decides the winner.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ApiError::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let role = UserRole::from_i16(model.role)
        .with_context(|| format!("unknown user role {} in db", model.role))?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        created_at: model.created_at,
    })
}

// ── Event repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEventRepository {
    pub db: DatabaseConnection,
}

impl EventRepository for DbEventRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event by id")?;
        Ok(model.map(event_from_model))
    }

    async fn create(&self, event: &Event) -> Result<(), ApiError> {
        events::ActiveModel {
            id: Set(event.id),
            title: Set(event.title.clone()),
            description: Set(event.description.clone()),
            category: Set(event.category.clone()),
            starts_at: Set(event.starts_at),
            location: Set(event.location.clone()),
            max_capacity: Set(event.max_capacity as i32),
            image: Set(event.image.clone()),
            organizer_id: Set(event.organizer_id),
            created_at: Set(event.created_at),
        }
        .insert(&self.db)
        .await
        .context("create event")?;
        Ok(())
    }

    async fn list_with_stats(&self) -> Result<Vec<EventSummary>, ApiError> {
        use sea_orm::{ConnectionTrait, FromQueryResult, Statement};

        // GROUP BY e.id covers every events column (primary key); u.name has
        // to be grouped explicitly.
        let sql = r#"
            SELECT e.id, e.title, e.description, e.category, e.starts_at, e.location,
                   e.max_capacity, e.image, e.organizer_id, e.created_at,
                   u.name AS organizer_name,
                   COUNT(r.user_id) AS registered
            FROM events e
            JOIN users u ON u.id = e.organizer_id
            LEFT JOIN registrations r ON r.event_id = e.id
            GROUP BY e.id, u.name
            ORDER BY e.starts_at ASC
        "#;

        #[derive(Debug, FromQueryResult)]
        struct EventStatsRow {
            id: Uuid,
            title: String,
            description: String,
            category: String,
            starts_at: chrono::DateTime<chrono::Utc>,
            location: String,
            max_capacity: i32,
            image: Option<String>,
            organizer_id: Uuid,
            created_at: chrono::DateTime<chrono::Utc>,
            organizer_name: String,
            registered: i64,
        }

        let rows = EventStatsRow::find_by_statement(Statement::from_string(
            self.db.get_database_backend(),
            sql,
        ))
        .all(&self.db)
        .await
        .context("list events with stats")?;

        let summaries = rows
            .into_iter()
            .map(|row| EventSummary {
                event: Event {
                    id: row.id,
                    title: row.title,
                    description: row.description,
                    category: row.category,
                    starts_at: row.starts_at,
                    location: row.location,
                    max_capacity: row.max_capacity as u32,
                    image: row.image,
                    organizer_id: row.organizer_id,
                    created_at: row.created_at,
                },
                organizer_name: row.organizer_name,
                registered: row.registered as u64,
            })
            .collect();
        Ok(summaries)
    }

    async fn list_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Event>, ApiError> {
        let models = events::Entity::find()
            .filter(events::Column::OrganizerId.eq(organizer_id))
            .order_by_desc(events::Column::StartsAt)
            .all(&self.db)
            .await
            .context("list events by organizer")?;
        Ok(models.into_iter().map(event_from_model).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = events::Entity::delete_many()
            .filter(events::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete event")?;
        Ok(result.rows_affected > 0)
    }
}

fn event_from_model(model: events::Model) -> Event {
    Event {
        id: model.id,
        title: model.title,
        description: model.description,
        category: model.category,
        starts_at: model.starts_at,
        location: model.location,
        // The CHECK constraint keeps max_capacity >= 1.
        max_capacity: model.max_capacity as u32,
        image: model.image,
        organizer_id: model.organizer_id,
        created_at: model.created_at,
    }
}

// ── Registration ledger ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRegistrationLedger {
    pub db: DatabaseConnection,
}

/// Transaction attempts for one reservation: the first run plus retries
/// after serialization conflicts.
const RESERVE_ATTEMPTS: u32 = 3;

impl DbRegistrationLedger {
    async fn reserve_once(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<ReserveOutcome, ApiError> {
        use sea_orm::PaginatorTrait;

        // SERIALIZABLE makes "count then insert" safe under concurrency: of
        // two racing reservations for the last seat, one commits and the
        // other aborts with a serialization failure.
        let result = self
            .db
            .transaction_with_config::<_, ReserveOutcome, sea_orm::DbErr>(
                |txn| {
                    Box::pin(async move {
                        let Some(event) = events::Entity::find_by_id(event_id).one(txn).await?
                        else {
                            return Ok(ReserveOutcome::EventNotFound);
                        };

                        // Duplicate before capacity: a holder retrying at a
                        // full event is told AlreadyRegistered, not
                        // CapacityFull. The composite PK stays the backstop
                        // for inserts racing past this lookup.
                        if registrations::Entity::find_by_id((user_id, event_id))
                            .one(txn)
                            .await?
                            .is_some()
                        {
                            return Ok(ReserveOutcome::AlreadyRegistered);
                        }

                        let registered = registrations::Entity::find()
                            .filter(registrations::Column::EventId.eq(event_id))
                            .count(txn)
                            .await?;
                        if registered >= event.max_capacity as u64 {
                            return Ok(ReserveOutcome::CapacityFull);
                        }

                        registrations::ActiveModel {
                            user_id: Set(user_id),
                            event_id: Set(event_id),
                            week_reminder_sent: Set(false),
                            day_reminder_sent: Set(false),
                            created_at: Set(Utc::now()),
                        }
                        .insert(txn)
                        .await?;

                        Ok(ReserveOutcome::Reserved {
                            registered: registered + 1,
                        })
                    })
                },
                Some(IsolationLevel::Serializable),
                None,
            )
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(reserve_error(e)),
        }
    }
}

impl RegistrationLedger for DbRegistrationLedger {
    async fn try_reserve(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<ReserveOutcome, ApiError> {
        // A caller that loses the serializable race re-runs against the
        // committed state and gets a definitive answer: CapacityFull once
        // the winner took the last seat, Reserved while seats remain.
        // CapacityRace escapes only when every attempt conflicted.
        let mut attempt = 1;
        loop {
            match self.reserve_once(event_id, user_id).await {
                Err(ApiError::CapacityRace) if attempt < RESERVE_ATTEMPTS => {
                    tracing::debug!(%event_id, %user_id, attempt, "reservation conflict, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn release(&self, event_id: Uuid, user_id: Uuid) -> Result<ReleaseOutcome, ApiError> {
        use sea_orm::PaginatorTrait;

        let outcome = self
            .db
            .transaction::<_, ReleaseOutcome, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let result = registrations::Entity::delete_many()
                        .filter(registrations::Column::UserId.eq(user_id))
                        .filter(registrations::Column::EventId.eq(event_id))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(ReleaseOutcome::NotRegistered);
                    }

                    let registered = registrations::Entity::find()
                        .filter(registrations::Column::EventId.eq(event_id))
                        .count(txn)
                        .await?;
                    Ok(ReleaseOutcome::Released { registered })
                })
            })
            .await
            .context("release seat")?;
        Ok(outcome)
    }

    async fn count_for_event(&self, event_id: Uuid) -> Result<u64, ApiError> {
        use sea_orm::PaginatorTrait;
        let count = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event_id))
            .count(&self.db)
            .await
            .context("count registrations for event")?;
        Ok(count)
    }

    async fn event_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        let rows = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("list registrations for user")?;
        Ok(rows.into_iter().map(|r| r.event_id).collect())
    }

    async fn due_reminders(
        &self,
        kind: ReminderKind,
        today: NaiveDate,
    ) -> Result<Vec<DueReminder>, ApiError> {
        use sea_orm::{ConnectionTrait, FromQueryResult, Statement};

        let (from, until) = kind.window_bounds(today);
        let flag_column = match kind {
            ReminderKind::Week => "week_reminder_sent",
            ReminderKind::Day => "day_reminder_sent",
        };

        let sql = format!(
            r#"
            SELECT r.user_id, r.event_id, u.email, u.name,
                   e.title, e.starts_at, e.location, e.category
            FROM registrations r
            JOIN users u ON u.id = r.user_id
            JOIN events e ON e.id = r.event_id
            WHERE r.{flag_column} = FALSE
              AND e.starts_at >= $1
              AND e.starts_at < $2
            ORDER BY e.starts_at, r.user_id
            "#,
        );

        #[derive(Debug, FromQueryResult)]
        struct DueReminderRow {
            user_id: Uuid,
            event_id: Uuid,
            email: String,
            name: String,
            title: String,
            starts_at: chrono::DateTime<chrono::Utc>,
            location: String,
            category: String,
        }

        let rows = DueReminderRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            [from.into(), until.into()],
        ))
        .all(&self.db)
        .await
        .context("scan due reminders")?;

        let due = rows
            .into_iter()
            .map(|row| DueReminder {
                user_id: row.user_id,
                event_id: row.event_id,
                to_email: row.email,
                to_name: row.name,
                event: EventDetails {
                    title: row.title,
                    starts_at: row.starts_at,
                    location: row.location,
                    category: row.category,
                },
            })
            .collect();
        Ok(due)
    }

    async fn mark_reminder_sent(
        &self,
        kind: ReminderKind,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), ApiError> {
        use sea_orm::sea_query::Expr;

        let flag_column = match kind {
            ReminderKind::Week => registrations::Column::WeekReminderSent,
            ReminderKind::Day => registrations::Column::DayReminderSent,
        };
        registrations::Entity::update_many()
            .col_expr(flag_column, Expr::value(true))
            .filter(registrations::Column::UserId.eq(user_id))
            .filter(registrations::Column::EventId.eq(event_id))
            .exec(&self.db)
            .await
            .context("mark reminder sent")?;
        Ok(())
    }
}

/// Classify a failed reservation transaction.
///
/// A composite-PK violation means the caller already holds the seat. The
/// event row is loaded inside the transaction, so a foreign-key failure can
/// only be the user side: the account was deleted while its token was still
/// valid. Postgres reports serialization conflicts as SQLSTATE 40001 with
/// "could not serialize access" in the message; sea-orm has no dedicated
/// variant for it.
fn reserve_error(e: sea_orm::TransactionError<sea_orm::DbErr>) -> ApiError {
    let db_err = match e {
        sea_orm::TransactionError::Connection(e) => e,
        sea_orm::TransactionError::Transaction(e) => e,
    };
    if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return ApiError::AlreadyRegistered;
    }
    if matches!(
        db_err.sql_err(),
        Some(SqlErr::ForeignKeyConstraintViolation(_))
    ) {
        return ApiError::UserNotFound;
    }
    let message = db_err.to_string();
    if message.contains("could not serialize access") || message.contains("40001") {
        return ApiError::CapacityRace;
    }
    anyhow::Error::new(db_err).context("reserve seat").into()
}
