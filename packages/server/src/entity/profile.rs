use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub name: String,
    pub description: String,
    pub location: String,

    /// Defaults to the system-wide placeholder, which is never destroyed.
    pub image_public_id: String,
    pub image_url: String,

    pub created_on: DateTimeUtc,
    pub updated_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
