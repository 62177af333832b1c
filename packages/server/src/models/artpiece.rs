use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_description, validate_title};
use crate::error::AppError;

/// Fields accepted by the artpiece create/update multipart forms.
///
/// Create requires `title` and `image`; update treats every field as
/// optional and leaves absent fields untouched.
#[derive(Default)]
pub struct ArtpieceForm {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Medium code, 0-9 (oil, watercolour, acrylic, charcoal, pencil, ink,
    /// pastel, digital, mixed media, other).
    pub art_medium: Option<i32>,
    /// Sale state code: 0 = not for sale, 1 = for sale, 2 = sold.
    pub for_sale: Option<i32>,
    /// Free text scanned for `#tag` tokens.
    pub hashtags: Option<String>,
    pub image: Option<Vec<u8>>,
}

pub fn validate_create_artpiece(form: &ArtpieceForm) -> Result<(), AppError> {
    let Some(ref title) = form.title else {
        return Err(AppError::Validation("Title is required".into()));
    };
    validate_title(title)?;
    if form.image.is_none() {
        return Err(AppError::Validation("An image file is required".into()));
    }
    validate_common(form)
}

pub fn validate_update_artpiece(form: &ArtpieceForm) -> Result<(), AppError> {
    if let Some(ref title) = form.title {
        validate_title(title)?;
    }
    validate_common(form)
}

fn validate_common(form: &ArtpieceForm) -> Result<(), AppError> {
    if let Some(ref description) = form.description {
        validate_description(description)?;
    }
    if let Some(medium) = form.art_medium
        && !(0..=9).contains(&medium)
    {
        return Err(AppError::Validation("art_medium must be 0-9".into()));
    }
    if let Some(for_sale) = form.for_sale
        && !(0..=2).contains(&for_sale)
    {
        return Err(AppError::Validation("for_sale must be 0, 1 or 2".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ArtpieceListQuery {
    /// Restrict the listing to pieces owned by this user.
    pub owner: Option<i32>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct ArtpieceResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub art_medium: i32,
    pub for_sale: i32,
    pub owner_id: i32,
    /// Collection the piece belongs to, if any.
    pub collection_id: Option<i32>,
    /// Associated hashtag names, alphabetical.
    pub hashtags: Vec<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl ArtpieceResponse {
    pub fn from_model(m: crate::entity::artpiece::Model, hashtags: Vec<String>) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image_url: m.image_url,
            art_medium: m.art_medium,
            for_sale: m.for_sale,
            owner_id: m.owner_id,
            collection_id: m.collection_id,
            hashtags,
            created_on: m.created_on,
            updated_on: m.updated_on,
        }
    }
}

/// A trending listing entry; ordered by recent like volume.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TrendingItem {
    pub id: i32,
    pub title: String,
    pub image_url: String,
    pub owner_id: i32,
    /// Likes received in the trailing 30-day window.
    pub recent_likes: u64,
}
