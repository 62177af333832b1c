use std::collections::HashMap;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;
use viridian_common::images::PLACEHOLDER_IMAGE_ID;

use crate::entity::{artpiece, artpiece_hashtag, enquiry, hashtag, like};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::hashtags;
use crate::models::artpiece::{
    ArtpieceForm, ArtpieceListQuery, ArtpieceResponse, TrendingItem, validate_create_artpiece,
    validate_update_artpiece,
};
use crate::state::AppState;
use crate::trending;

use super::profile::{destroy_old_image, map_image_error};

/// Body limit for artpiece uploads: image cap plus the text fields.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(4 * 1024 * 1024)
}

/// Create an artpiece from a multipart form.
///
/// Hashtags are parsed before the image is uploaded so a bad tag string
/// never leaves an orphaned file behind.
#[utoipa::path(
    post,
    path = "/",
    tag = "Artpieces",
    operation_id = "createArtpiece",
    summary = "Upload a new artpiece",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Artpiece created", body = ArtpieceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_artpiece(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = parse_artpiece_form(multipart).await?;
    validate_create_artpiece(&form)?;

    let tag_names = match form.hashtags {
        Some(ref text) => hashtags::parse_hashtags(text)?,
        None => Vec::new(),
    };

    let image = form.image.as_deref().unwrap_or_default();
    let stored = state.images.upload(image).await.map_err(map_image_error)?;

    let now = chrono::Utc::now();
    let new_piece = artpiece::ActiveModel {
        title: Set(form.title.unwrap_or_default().trim().to_string()),
        description: Set(form.description.unwrap_or_default()),
        image_public_id: Set(stored.public_id),
        image_url: Set(stored.url),
        art_medium: Set(form.art_medium.unwrap_or(0)),
        for_sale: Set(form.for_sale.unwrap_or(0)),
        owner_id: Set(auth_user.user_id),
        collection_id: Set(None),
        created_on: Set(now),
        updated_on: Set(now),
        ..Default::default()
    };

    let txn = state.db.begin().await?;
    let piece = new_piece.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("An artpiece with this title already exists".into())
        }
        _ => AppError::from(e),
    })?;
    hashtags::reconcile_hashtags(&txn, piece.id, &tag_names).await?;
    let names = hashtags::hashtag_names(&txn, piece.id).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ArtpieceResponse::from_model(piece, names)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Artpieces",
    operation_id = "listArtpieces",
    summary = "List artpieces, newest first",
    params(ArtpieceListQuery),
    responses(
        (status = 200, description = "Artpieces", body = [ArtpieceResponse]),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_artpieces(
    State(state): State<AppState>,
    Query(query): Query<ArtpieceListQuery>,
) -> Result<Json<Vec<ArtpieceResponse>>, AppError> {
    let mut find = artpiece::Entity::find().order_by_desc(artpiece::Column::CreatedOn);
    if let Some(owner) = query.owner {
        find = find.filter(artpiece::Column::OwnerId.eq(owner));
    }
    let pieces = find.all(&state.db).await?;

    let mut tags = hashtags_for_pieces(&state.db, pieces.iter().map(|p| p.id).collect()).await?;
    Ok(Json(
        pieces
            .into_iter()
            .map(|p| {
                let names = tags.remove(&p.id).unwrap_or_default();
                ArtpieceResponse::from_model(p, names)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/trending",
    tag = "Artpieces",
    operation_id = "trendingArtpieces",
    summary = "Get the trending slate",
    description = "Four pieces ranked by likes over the last 30 days, topped up from the all-time pool when recent activity is thin.",
    responses(
        (status = 200, description = "Trending artpieces", body = [TrendingItem]),
    ),
)]
#[instrument(skip(state))]
pub async fn trending_artpieces(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingItem>>, AppError> {
    let slate = trending::top_trending(&state.db, trending::TRENDING_SLATE_SIZE).await?;
    Ok(Json(slate))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Artpieces",
    operation_id = "getArtpiece",
    summary = "Get an artpiece by ID",
    params(("id" = i32, Path, description = "Artpiece ID")),
    responses(
        (status = 200, description = "Artpiece details", body = ArtpieceResponse),
        (status = 404, description = "Artpiece not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_artpiece(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ArtpieceResponse>, AppError> {
    let piece = find_artpiece(&state.db, id).await?;
    let names = hashtags::hashtag_names(&state.db, piece.id).await?;
    Ok(Json(ArtpieceResponse::from_model(piece, names)))
}

/// Partially update an artpiece from a multipart form. Owner only.
///
/// A new image replaces the old one by value; the superseded file is
/// destroyed only after the row points at the new image. A present
/// `hashtags` field replaces the tag set; an absent one leaves it alone.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Artpieces",
    operation_id = "updateArtpiece",
    summary = "Update an artpiece",
    params(("id" = i32, Path, description = "Artpiece ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Artpiece updated", body = ArtpieceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artpiece not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn update_artpiece(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ArtpieceResponse>, AppError> {
    let form = parse_artpiece_form(multipart).await?;
    validate_update_artpiece(&form)?;

    let piece = find_artpiece(&state.db, id).await?;
    if piece.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the owner may update this artpiece".into(),
        ));
    }

    let tag_names = match form.hashtags {
        Some(ref text) => Some(hashtags::parse_hashtags(text)?),
        None => None,
    };

    let new_image = match form.image {
        Some(ref data) => Some(state.images.upload(data).await.map_err(map_image_error)?),
        None => None,
    };

    let old_public_id = piece.image_public_id.clone();
    let piece_id = piece.id;

    let mut active: artpiece::ActiveModel = piece.into();
    if let Some(title) = form.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = form.description {
        active.description = Set(description);
    }
    if let Some(medium) = form.art_medium {
        active.art_medium = Set(medium);
    }
    if let Some(for_sale) = form.for_sale {
        active.for_sale = Set(for_sale);
    }
    if let Some(ref stored) = new_image {
        active.image_public_id = Set(stored.public_id.clone());
        active.image_url = Set(stored.url.clone());
    }
    active.updated_on = Set(chrono::Utc::now());

    let txn = state.db.begin().await?;
    let updated = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("An artpiece with this title already exists".into())
        }
        _ => AppError::from(e),
    })?;
    if let Some(ref names) = tag_names {
        hashtags::reconcile_hashtags(&txn, piece_id, names).await?;
    }
    let names = hashtags::hashtag_names(&txn, piece_id).await?;
    txn.commit().await?;

    if let Some(stored) = new_image {
        destroy_old_image(&state, &old_public_id, &stored.public_id).await;
    }

    Ok(Json(ArtpieceResponse::from_model(updated, names)))
}

/// Delete an artpiece and everything hanging off it. Owner only.
///
/// Likes and tag associations go with it; orphaned hashtags are purged in
/// the same transaction. Enquiries lose their artpiece reference instead of
/// being deleted, so buyers keep their record; rows with neither party left
/// are removed. The image file is destroyed after the commit, best-effort.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Artpieces",
    operation_id = "deleteArtpiece",
    summary = "Delete an artpiece",
    params(("id" = i32, Path, description = "Artpiece ID")),
    responses(
        (status = 204, description = "Artpiece deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Artpiece not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_artpiece(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let piece = find_artpiece(&state.db, id).await?;
    if piece.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the owner may delete this artpiece".into(),
        ));
    }

    let txn = state.db.begin().await?;

    let tag_ids = hashtags::associated_hashtag_ids(&txn, piece.id).await?;
    artpiece_hashtag::Entity::delete_many()
        .filter(artpiece_hashtag::Column::ArtpieceId.eq(piece.id))
        .exec(&txn)
        .await?;

    like::Entity::delete_many()
        .filter(like::Column::LikedPieceId.eq(piece.id))
        .exec(&txn)
        .await?;

    // Buyers keep their enquiry record; the artpiece side is detached.
    enquiry::Entity::update_many()
        .col_expr(enquiry::Column::ArtpieceId, Expr::value(Value::Int(None)))
        .filter(enquiry::Column::ArtpieceId.eq(piece.id))
        .exec(&txn)
        .await?;
    enquiry::Entity::delete_many()
        .filter(enquiry::Column::ArtpieceId.is_null())
        .filter(enquiry::Column::BuyerId.is_null())
        .exec(&txn)
        .await?;

    artpiece::Entity::delete_by_id(piece.id).exec(&txn).await?;
    hashtags::purge_orphans(&txn, &tag_ids).await?;

    txn.commit().await?;

    if piece.image_public_id != PLACEHOLDER_IMAGE_ID
        && let Err(e) = state.images.destroy(&piece.image_public_id).await
    {
        tracing::warn!(
            public_id = %piece.image_public_id,
            "Failed to destroy image of deleted artpiece: {e}"
        );
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn find_artpiece(
    db: &DatabaseConnection,
    id: i32,
) -> Result<artpiece::Model, AppError> {
    artpiece::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artpiece {id} not found")))
}

/// Tag names per artpiece for a batch of pieces, alphabetical within each.
async fn hashtags_for_pieces(
    db: &DatabaseConnection,
    piece_ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<String>>, AppError> {
    if piece_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let assocs = artpiece_hashtag::Entity::find()
        .filter(artpiece_hashtag::Column::ArtpieceId.is_in(piece_ids))
        .all(db)
        .await?;

    let tag_ids: Vec<i32> = assocs.iter().map(|a| a.hashtag_id).collect();
    let names: HashMap<i32, String> = hashtag::Entity::find()
        .filter(hashtag::Column::Id.is_in(tag_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut out: HashMap<i32, Vec<String>> = HashMap::new();
    for assoc in assocs {
        if let Some(name) = names.get(&assoc.hashtag_id) {
            out.entry(assoc.artpiece_id).or_default().push(name.clone());
        }
    }
    for list in out.values_mut() {
        list.sort();
    }
    Ok(out)
}

async fn parse_artpiece_form(mut multipart: Multipart) -> Result<ArtpieceForm, AppError> {
    let mut form = ArtpieceForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read image field: {e}"))
                })?;
                if bytes.is_empty() {
                    return Err(AppError::Validation("Image file is empty".into()));
                }
                form.image = Some(bytes.to_vec());
            }
            "title" => form.title = Some(text_field(field, "title").await?),
            "description" => form.description = Some(text_field(field, "description").await?),
            "hashtags" => form.hashtags = Some(text_field(field, "hashtags").await?),
            "art_medium" => form.art_medium = Some(int_field(field, "art_medium").await?),
            "for_sale" => form.for_sale = Some(int_field(field, "for_sale").await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }
    Ok(form)
}

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))
}

async fn int_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<i32, AppError> {
    let text = text_field(field, name).await?;
    text.trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Field '{name}' must be an integer")))
}
