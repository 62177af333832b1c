use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Email is the login identifier.
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,

    #[sea_orm(has_one)]
    pub profile: HasOne<super::profile::Entity>,

    #[sea_orm(has_many)]
    pub artpieces: HasMany<super::artpiece::Entity>,

    #[sea_orm(has_many)]
    pub collections: HasMany<super::art_collection::Entity>,

    pub created_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
