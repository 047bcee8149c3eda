use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Description).string().not_null())
                    .col(ColumnDef::new(Events::Category).string().not_null())
                    .col(
                        ColumnDef::new(Events::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::Location).string().not_null())
                    .col(
                        ColumnDef::new(Events::MaxCapacity)
                            .integer()
                            .not_null()
                            .check(Expr::col(Events::MaxCapacity).gte(1)),
                    )
                    .col(ColumnDef::new(Events::Image).string())
                    .col(ColumnDef::new(Events::OrganizerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Events::Table, Events::OrganizerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Events::Table)
                    .col(Events::OrganizerId)
                    .name("idx_events_organizer_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    Title,
    Description,
    Category,
    StartsAt,
    Location,
    MaxCapacity,
    Image,
    OrganizerId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
