use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{artpiece, enquiry, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::enquiry::{
    CreateEnquiryRequest, EnquiryPhase, EnquiryResponse, RespondEnquiryRequest, phase,
    validate_create_enquiry, validate_respond_enquiry,
};
use crate::state::AppState;

/// Which side of an enquiry the caller is on.
enum Party {
    Buyer,
    Artist,
}

/// Open an enquiry about a piece that is listed for sale.
#[utoipa::path(
    post,
    path = "/",
    tag = "Enquiries",
    operation_id = "createEnquiry",
    summary = "Enquire about buying an artpiece",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Enquiry created", body = EnquiryResponse),
        (status = 400, description = "Piece not for sale, own piece, or bad message (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Artpiece not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_enquiry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateEnquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_enquiry(&payload)?;

    let piece = super::artpiece::find_artpiece(&state.db, payload.artpiece_id).await?;
    if piece.for_sale != 1 {
        return Err(AppError::Validation(
            "This artpiece is not listed for sale".into(),
        ));
    }
    if piece.owner_id == auth_user.user_id {
        return Err(AppError::Validation(
            "You cannot enquire about your own artpiece".into(),
        ));
    }

    let now = chrono::Utc::now();
    let new_enquiry = enquiry::ActiveModel {
        buyer_id: Set(Some(auth_user.user_id)),
        artpiece_id: Set(Some(piece.id)),
        initial_message: Set(payload.message.trim().to_string()),
        response_message: Set(None),
        status: Set(enquiry::STATUS_PENDING),
        buyer_has_checked: Set(false),
        artist_has_checked: Set(false),
        created_on: Set(now),
        updated_on: Set(now),
        ..Default::default()
    };
    let row = new_enquiry.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(EnquiryResponse::from_model(row, None)),
    ))
}

/// List the caller's enquiries, most recently updated first.
///
/// Covers both sides: enquiries the caller opened and enquiries about the
/// caller's pieces. A side the caller withdrew from no longer matches.
#[utoipa::path(
    get,
    path = "/",
    tag = "Enquiries",
    operation_id = "listEnquiries",
    summary = "List enquiries you are a party to",
    responses(
        (status = 200, description = "Enquiries", body = [EnquiryResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_enquiries(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<EnquiryResponse>>, AppError> {
    let owned_pieces = SeaQuery::select()
        .column(artpiece::Column::Id)
        .from(artpiece::Entity)
        .and_where(artpiece::Column::OwnerId.eq(auth_user.user_id))
        .to_owned();

    let rows = enquiry::Entity::find()
        .filter(
            Condition::any()
                .add(enquiry::Column::BuyerId.eq(auth_user.user_id))
                .add(enquiry::Column::ArtpieceId.in_subquery(owned_pieces)),
        )
        .order_by_desc(enquiry::Column::UpdatedOn)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|r| EnquiryResponse::from_model(r, None))
            .collect(),
    ))
}

/// Retrieve one enquiry, marking the caller's side as checked.
///
/// Once an enquiry is accepted, the response carries the artist's email so
/// the two can take the sale offline.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Enquiries",
    operation_id = "getEnquiry",
    summary = "Get an enquiry by ID",
    params(("id" = i32, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry details", body = EnquiryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not a party (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enquiry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_enquiry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<EnquiryResponse>, AppError> {
    let row = find_enquiry(&state.db, id).await?;
    let party = party_of(&state.db, &row, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::PermissionDenied("You are not a party to this enquiry".into())
        })?;

    let mut active: enquiry::ActiveModel = row.clone().into();
    match party {
        Party::Buyer => active.buyer_has_checked = Set(true),
        Party::Artist => active.artist_has_checked = Set(true),
    }
    // Marking as checked must not bump updated_on; it would reshuffle lists.
    let row = active.update(&state.db).await?;

    let artist_email = if row.status == enquiry::STATUS_ACCEPTED {
        artist_email(&state.db, &row).await?
    } else {
        None
    };

    Ok(Json(EnquiryResponse::from_model(row, artist_email)))
}

/// Accept or decline a pending enquiry. Artist only.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Enquiries",
    operation_id = "respondEnquiry",
    summary = "Accept or decline an enquiry",
    params(("id" = i32, Path, description = "Enquiry ID")),
    request_body = RespondEnquiryRequest,
    responses(
        (status = 200, description = "Enquiry resolved", body = EnquiryResponse),
        (status = 400, description = "Already resolved or bad status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not the artist (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enquiry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn respond_enquiry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RespondEnquiryRequest>,
) -> Result<Json<EnquiryResponse>, AppError> {
    validate_respond_enquiry(&payload)?;

    let row = find_enquiry(&state.db, id).await?;
    match party_of(&state.db, &row, auth_user.user_id).await? {
        Some(Party::Artist) => {}
        Some(Party::Buyer) | None => {
            return Err(AppError::PermissionDenied(
                "Only the artist may respond to an enquiry".into(),
            ));
        }
    }
    if row.status != enquiry::STATUS_PENDING {
        return Err(AppError::Validation(
            "This enquiry has already been resolved".into(),
        ));
    }

    let mut active: enquiry::ActiveModel = row.into();
    active.status = Set(payload.status);
    active.response_message = Set(payload.response_message);
    // The response is news for the buyer; the artist has obviously seen it.
    active.buyer_has_checked = Set(false);
    active.artist_has_checked = Set(true);
    active.updated_on = Set(chrono::Utc::now());
    let row = active.update(&state.db).await?;

    Ok(Json(EnquiryResponse::from_model(row, None)))
}

/// Withdraw from an enquiry.
///
/// Withdrawal detaches the caller's side only; the other party keeps their
/// record. The row itself is deleted once neither side remains.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Enquiries",
    operation_id = "withdrawEnquiry",
    summary = "Withdraw from an enquiry",
    params(("id" = i32, Path, description = "Enquiry ID")),
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not a party (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enquiry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn withdraw_enquiry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let row = find_enquiry(&state.db, id).await?;
    let party = party_of(&state.db, &row, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::PermissionDenied("You are not a party to this enquiry".into())
        })?;

    let mut row = row;
    match party {
        Party::Buyer => row.buyer_id = None,
        Party::Artist => row.artpiece_id = None,
    }

    // Single cleanup rule: a row with neither side left is removed outright.
    if phase(&row) == EnquiryPhase::Withdrawn {
        enquiry::Entity::delete_by_id(row.id).exec(&state.db).await?;
    } else {
        let mut active: enquiry::ActiveModel = row.into();
        match party {
            Party::Buyer => active.buyer_id = Set(None),
            Party::Artist => active.artpiece_id = Set(None),
        }
        active.updated_on = Set(chrono::Utc::now());
        active.update(&state.db).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_enquiry(db: &DatabaseConnection, id: i32) -> Result<enquiry::Model, AppError> {
    enquiry::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Enquiry {id} not found")))
}

/// Work out which side of the enquiry `user_id` is on, if any.
///
/// The artist side is resolved through the artpiece's current owner; a
/// withdrawn side (null reference) matches nobody.
async fn party_of(
    db: &DatabaseConnection,
    row: &enquiry::Model,
    user_id: i32,
) -> Result<Option<Party>, AppError> {
    if row.buyer_id == Some(user_id) {
        return Ok(Some(Party::Buyer));
    }
    if let Some(piece_id) = row.artpiece_id
        && let Some(piece) = artpiece::Entity::find_by_id(piece_id).one(db).await?
        && piece.owner_id == user_id
    {
        return Ok(Some(Party::Artist));
    }
    Ok(None)
}

async fn artist_email(
    db: &DatabaseConnection,
    row: &enquiry::Model,
) -> Result<Option<String>, AppError> {
    let Some(piece_id) = row.artpiece_id else {
        return Ok(None);
    };
    let Some(piece) = artpiece::Entity::find_by_id(piece_id).one(db).await? else {
        return Ok(None);
    };
    Ok(user::Entity::find_by_id(piece.owner_id)
        .one(db)
        .await?
        .map(|u| u.email))
}
