use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference-counted label attached to artpieces.
///
/// A hashtag with zero referencing artpieces must not persist; reconciliation
/// deletes it the moment its last association is removed.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(has_many, via = "artpiece_hashtag")]
    pub artpieces: HasMany<super::artpiece::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
