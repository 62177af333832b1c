use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::{Json, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use viridian_common::images::{ImageStoreError, PLACEHOLDER_IMAGE_ID};

use crate::entity::profile;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::profile::{ProfileResponse, UpdateProfileRequest, validate_update_profile};
use crate::state::AppState;

/// Body limit for profile image uploads: image cap plus multipart framing.
pub fn image_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(4 * 1024 * 1024)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Profiles",
    operation_id = "listProfiles",
    summary = "List all profiles",
    responses(
        (status = 200, description = "All profiles", body = [ProfileResponse]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = profile::Entity::find()
        .order_by_asc(profile::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Profiles",
    operation_id = "getProfile",
    summary = "Get a profile by ID",
    params(("id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile details", body = ProfileResponse),
        (status = 404, description = "Profile not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = find_profile(&state.db, id).await?;
    Ok(Json(profile.into()))
}

/// Update the text fields of a profile. Owner only.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Profiles",
    operation_id = "updateProfile",
    summary = "Update a profile",
    params(("id" = i32, Path, description = "Profile ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the profile owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Profile not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    validate_update_profile(&payload)?;

    let profile = find_profile(&state.db, id).await?;
    if profile.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the profile owner may update it".into(),
        ));
    }

    let mut active: profile::ActiveModel = profile.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    active.updated_on = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// Replace the profile image. Owner only.
///
/// The previous image is destroyed after the database row points at the new
/// one; a failed destroy is logged and otherwise ignored. The shared
/// placeholder is never destroyed.
#[utoipa::path(
    put,
    path = "/{id}/image",
    tag = "Profiles",
    operation_id = "updateProfileImage",
    summary = "Upload a new profile image",
    params(("id" = i32, Path, description = "Profile ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image replaced", body = ProfileResponse),
        (status = 400, description = "Missing or oversized image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the profile owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Profile not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn update_profile_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = find_profile(&state.db, id).await?;
    if profile.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the profile owner may change its image".into(),
        ));
    }

    let data = read_image_field(multipart).await?;

    let stored = state
        .images
        .upload(&data)
        .await
        .map_err(map_image_error)?;

    let old_public_id = profile.image_public_id.clone();

    let mut active: profile::ActiveModel = profile.into();
    active.image_public_id = Set(stored.public_id.clone());
    active.image_url = Set(stored.url);
    active.updated_on = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    destroy_old_image(&state, &old_public_id, &stored.public_id).await;

    Ok(Json(updated.into()))
}

pub(super) async fn find_profile(
    db: &DatabaseConnection,
    id: i32,
) -> Result<profile::Model, AppError> {
    profile::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

/// Pull the bytes of the `image` part out of a multipart body.
pub(super) async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image field: {e}")))?;
            if bytes.is_empty() {
                return Err(AppError::Validation("Image file is empty".into()));
            }
            return Ok(bytes.to_vec());
        }
    }
    Err(AppError::Validation(
        "Multipart field 'image' is required".into(),
    ))
}

pub(super) fn map_image_error(e: ImageStoreError) -> AppError {
    match e {
        ImageStoreError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
            "Image is {actual} bytes; the limit is {limit} bytes"
        )),
        other => AppError::Internal(format!("Image store error: {other}")),
    }
}

/// Best-effort removal of a superseded image. Never touches the placeholder
/// and never fails the request.
pub(super) async fn destroy_old_image(state: &AppState, old_id: &str, new_id: &str) {
    if old_id == PLACEHOLDER_IMAGE_ID || old_id == new_id {
        return;
    }
    if let Err(e) = state.images.destroy(old_id).await {
        tracing::warn!(public_id = old_id, "Failed to destroy replaced image: {e}");
    }
}
