use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's like on an artpiece.
///
/// The (owner_id, liked_piece_id) pair is unique, enforced by a composite
/// index created in `seed::ensure_indexes`. A race between two identical
/// creates surfaces as a reported duplicate, never a silent double-like.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub owner_id: i32,
    #[sea_orm(belongs_to, from = "owner_id", to = "id")]
    pub owner: HasOne<super::user::Entity>,

    pub liked_piece_id: i32,
    #[sea_orm(belongs_to, from = "liked_piece_id", to = "id")]
    pub liked_piece: HasOne<super::artpiece::Entity>,

    pub created_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
