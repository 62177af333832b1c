use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_message;
use crate::entity::enquiry;
use crate::error::AppError;

/// Which parties are still attached to an enquiry.
///
/// Withdrawal nulls the withdrawing party's reference instead of deleting
/// the row, so the other party keeps their record. A row only disappears
/// once both references are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnquiryPhase {
    /// Both the buyer and the artpiece reference are present.
    Active,
    /// The buyer withdrew; only the artist side remains.
    WithdrawnByBuyer,
    /// The artist withdrew (or the artpiece was deleted); only the buyer
    /// side remains.
    WithdrawnByArtist,
    /// Both sides gone; the row is eligible for deletion.
    Withdrawn,
}

pub fn phase(m: &enquiry::Model) -> EnquiryPhase {
    match (m.buyer_id.is_some(), m.artpiece_id.is_some()) {
        (true, true) => EnquiryPhase::Active,
        (false, true) => EnquiryPhase::WithdrawnByBuyer,
        (true, false) => EnquiryPhase::WithdrawnByArtist,
        (false, false) => EnquiryPhase::Withdrawn,
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEnquiryRequest {
    /// Piece the enquiry is about. Must be listed for sale.
    pub artpiece_id: i32,
    /// Opening message to the artist (1-255 characters).
    #[schema(example = "Is this still available? I'd love to buy it.")]
    pub message: String,
}

pub fn validate_create_enquiry(req: &CreateEnquiryRequest) -> Result<(), AppError> {
    validate_message(&req.message)
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RespondEnquiryRequest {
    /// New status: 1 = accepted, 2 = declined.
    #[schema(example = 1)]
    pub status: i32,
    /// Optional reply shown to the buyer (at most 255 characters).
    pub response_message: Option<String>,
}

pub fn validate_respond_enquiry(req: &RespondEnquiryRequest) -> Result<(), AppError> {
    if req.status != enquiry::STATUS_ACCEPTED && req.status != enquiry::STATUS_DECLINED {
        return Err(AppError::Validation(
            "status must be 1 (accepted) or 2 (declined)".into(),
        ));
    }
    if let Some(ref message) = req.response_message {
        validate_message(message)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct EnquiryResponse {
    pub id: i32,
    /// Buyer's user ID; null after the buyer withdrew.
    pub buyer_id: Option<i32>,
    /// Enquired-about piece; null after the artist withdrew or deleted it.
    pub artpiece_id: Option<i32>,
    pub initial_message: String,
    pub response_message: Option<String>,
    /// 0 = pending, 1 = accepted, 2 = declined.
    pub status: i32,
    pub buyer_has_checked: bool,
    pub artist_has_checked: bool,
    /// Contact address of the artist; present once the enquiry has been
    /// accepted.
    pub artist_email: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl EnquiryResponse {
    pub fn from_model(m: enquiry::Model, artist_email: Option<String>) -> Self {
        Self {
            id: m.id,
            buyer_id: m.buyer_id,
            artpiece_id: m.artpiece_id,
            initial_message: m.initial_message,
            response_message: m.response_message,
            status: m.status,
            buyer_has_checked: m.buyer_has_checked,
            artist_has_checked: m.artist_has_checked,
            artist_email,
            created_on: m.created_on,
            updated_on: m.updated_on,
        }
    }
}
