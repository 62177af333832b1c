use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artpiece_hashtag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub artpiece_id: i32,
    #[sea_orm(primary_key)]
    pub hashtag_id: i32,

    #[sea_orm(belongs_to, from = "artpiece_id", to = "id")]
    pub artpiece: Option<super::artpiece::Entity>,
    #[sea_orm(belongs_to, from = "hashtag_id", to = "id")]
    pub hashtag: Option<super::hashtag::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
