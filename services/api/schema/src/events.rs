use sea_orm::entity::prelude::*;

/// An event listing with a hard seat limit (`max_capacity`, always ≥ 1).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub location: String,
    pub max_capacity: i32,
    pub image: Option<String>,
    pub organizer_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OrganizerId",
        to = "super::users::Column::Id"
    )]
    Organizer,
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
