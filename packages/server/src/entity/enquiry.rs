use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enquiry status values.
pub const STATUS_PENDING: i32 = 0;
pub const STATUS_ACCEPTED: i32 = 1;
pub const STATUS_DECLINED: i32 = 2;

/// Buyer/artist conversation about one artpiece's sale.
///
/// Withdrawal is soft: the withdrawing party's reference is nulled. A row
/// with both references null is meaningless and is deleted outright.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquiry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL after the buyer withdraws.
    pub buyer_id: Option<i32>,
    #[sea_orm(belongs_to, from = "buyer_id", to = "id")]
    pub buyer: Option<super::user::Entity>,

    /// NULL after the artist withdraws.
    pub artpiece_id: Option<i32>,
    #[sea_orm(belongs_to, from = "artpiece_id", to = "id")]
    pub artpiece: Option<super::artpiece::Entity>,

    pub initial_message: String,
    pub response_message: Option<String>,

    /// 0 pending, 1 accepted, 2 declined. Accepted/declined are terminal.
    pub status: i32,

    pub buyer_has_checked: bool,
    pub artist_has_checked: bool,

    pub created_on: DateTimeUtc,
    pub updated_on: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
