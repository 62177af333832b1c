use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "art_collection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title: String,
    pub description: String,

    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    /// Membership: deleting the collection nulls these references, it never
    /// cascades to the artpieces themselves.
    #[sea_orm(has_many)]
    pub artpieces: HasMany<super::artpiece::Entity>,

    pub created_on: DateTimeUtc,
    pub updated_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
