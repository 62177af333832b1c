use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_description;
use crate::error::AppError;

/// Request body for updating the caller's profile.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    /// Display name (at most 30 characters).
    #[schema(example = "Alice W.")]
    pub name: Option<String>,
    /// Short bio (at most 180 characters).
    pub description: Option<String>,
    /// Free-text location (at most 50 characters).
    #[schema(example = "Cape Town")]
    pub location: Option<String>,
}

pub fn validate_update_profile(req: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name
        && name.chars().count() > 30
    {
        return Err(AppError::Validation(
            "Name must be at most 30 characters".into(),
        ));
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(ref location) = req.location
        && location.chars().count() > 50
    {
        return Err(AppError::Validation(
            "Location must be at most 50 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    /// ID of the owning user.
    pub owner_id: i32,
    pub name: String,
    pub description: String,
    pub location: String,
    /// URL of the profile image (placeholder until one is uploaded).
    pub image_url: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<crate::entity::profile::Model> for ProfileResponse {
    fn from(m: crate::entity::profile::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            name: m.name,
            description: m.description,
            location: m.location,
            image_url: m.image_url,
            created_on: m.created_on,
            updated_on: m.updated_on,
        }
    }
}
