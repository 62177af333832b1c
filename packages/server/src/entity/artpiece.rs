use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artpiece")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Globally unique across all artpieces.
    #[sea_orm(unique)]
    pub title: String,
    pub description: String,

    /// Image identity; old vs new images are compared by this value.
    pub image_public_id: String,
    pub image_url: String,

    /// 0 no medium, 1 oil, 2 watercolour, 3 gouache, 4 acrylic, 5 charcoal,
    /// 6 chalk, 7 photography, 8 mixed media, 9 other.
    pub art_medium: i32,

    /// 0 not for sale, 1 for sale, 2 sold.
    pub for_sale: i32,

    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    /// NULL while the artpiece is not part of any collection.
    pub collection_id: Option<i32>,
    #[sea_orm(belongs_to, from = "collection_id", to = "id")]
    pub collection: Option<super::art_collection::Entity>,

    #[sea_orm(has_many, via = "artpiece_hashtag")]
    pub hashtags: HasMany<super::hashtag::Entity>,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::like::Entity>,

    pub created_on: DateTimeUtc,
    pub updated_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
