use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLikeRequest {
    /// Piece to like.
    pub artpiece_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub id: i32,
    pub owner_id: i32,
    pub artpiece_id: i32,
    pub created_on: DateTime<Utc>,
}

impl From<crate::entity::like::Model> for LikeResponse {
    fn from(m: crate::entity::like::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            artpiece_id: m.liked_piece_id,
            created_on: m.created_on,
        }
    }
}
