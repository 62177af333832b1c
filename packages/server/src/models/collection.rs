use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_description, validate_title};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCollectionRequest {
    #[schema(example = "Winter studies")]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub fn validate_create_collection(req: &CreateCollectionRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)
}

/// Query parameters for the collection list endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CollectionListQuery {
    /// Restrict the list to collections owned by this user.
    pub owner: Option<i32>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCollectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn validate_update_collection(req: &UpdateCollectionRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    Ok(())
}

/// Request body for replacing a collection's member set.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateArtpiecesRequest {
    /// Exact set of artpiece IDs the collection should contain afterwards.
    /// Pieces absent from the list are detached; listed pieces are attached.
    /// Repeated IDs collapse to a single membership.
    pub artpiece_ids: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct CollectionResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub owner_id: i32,
    /// IDs of the pieces currently in the collection.
    pub artpiece_ids: Vec<i32>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl CollectionResponse {
    pub fn from_model(m: crate::entity::art_collection::Model, artpiece_ids: Vec<i32>) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            owner_id: m.owner_id,
            artpiece_ids,
            created_on: m.created_on,
            updated_on: m.updated_on,
        }
    }
}
