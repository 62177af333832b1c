use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::*;
use serde::Deserialize;
use tracing::instrument;

use crate::entity::like;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::like::{CreateLikeRequest, LikeResponse};
use crate::state::AppState;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct LikeListQuery {
    /// Restrict the listing to likes on this piece.
    pub artpiece_id: Option<i32>,
}

/// Like an artpiece. One like per user per piece.
#[utoipa::path(
    post,
    path = "/",
    tag = "Likes",
    operation_id = "createLike",
    summary = "Like an artpiece",
    request_body = CreateLikeRequest,
    responses(
        (status = 201, description = "Like recorded", body = LikeResponse),
        (status = 400, description = "Own piece or duplicate like (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Artpiece not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_like(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateLikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let piece = super::artpiece::find_artpiece(&state.db, payload.artpiece_id).await?;
    if piece.owner_id == auth_user.user_id {
        return Err(AppError::Validation(
            "You cannot like your own artpiece".into(),
        ));
    }

    let new_like = like::ActiveModel {
        owner_id: Set(auth_user.user_id),
        liked_piece_id: Set(piece.id),
        created_on: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let row = new_like.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("Invalid request, possible duplicate like".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(LikeResponse::from(row))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Likes",
    operation_id = "listLikes",
    summary = "List likes, optionally for one artpiece",
    params(LikeListQuery),
    responses(
        (status = 200, description = "Likes", body = [LikeResponse]),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_likes(
    State(state): State<AppState>,
    Query(query): Query<LikeListQuery>,
) -> Result<Json<Vec<LikeResponse>>, AppError> {
    let mut find = like::Entity::find().order_by_desc(like::Column::CreatedOn);
    if let Some(piece_id) = query.artpiece_id {
        find = find.filter(like::Column::LikedPieceId.eq(piece_id));
    }
    let rows = find.all(&state.db).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Remove a like. Only its owner may do so.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Likes",
    operation_id = "deleteLike",
    summary = "Remove a like",
    params(("id" = i32, Path, description = "Like ID")),
    responses(
        (status = 204, description = "Like removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the like's owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Like not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_like(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let row = like::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Like {id} not found")))?;

    if row.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the like's owner may remove it".into(),
        ));
    }

    like::Entity::delete_by_id(row.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
