use sea_orm_migration::prelude::*;

// The daily reminder scan filters events by `starts_at` window and joins
// registrations by `event_id`; seat counting groups by `event_id` too.
// The composite PK only covers lookups prefixed by `user_id`.

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Registrations::Table)
                    .col(Registrations::EventId)
                    .name("idx_registrations_event_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Events::Table)
                    .col(Events::StartsAt)
                    .name("idx_events_starts_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_events_starts_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_registrations_event_id").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Registrations {
    Table,
    EventId,
}

#[derive(Iden)]
enum Events {
    Table,
    StartsAt,
}
