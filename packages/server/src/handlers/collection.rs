use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{art_collection, artpiece};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::collection::{
    CollectionListQuery, CollectionResponse, CreateCollectionRequest, UpdateArtpiecesRequest,
    UpdateCollectionRequest, validate_create_collection, validate_update_collection,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Collections",
    operation_id = "createCollection",
    summary = "Create a new collection",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_collection(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreateCollectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_collection(&payload)?;

    let now = chrono::Utc::now();
    let new_collection = art_collection::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        owner_id: Set(auth_user.user_id),
        created_on: Set(now),
        updated_on: Set(now),
        ..Default::default()
    };

    let collection = new_collection
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Validation("A collection with this title already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CollectionResponse::from_model(collection, Vec::new())),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Collections",
    operation_id = "listCollections",
    summary = "List collections, newest first",
    params(CollectionListQuery),
    responses(
        (status = 200, description = "Collections", body = [CollectionResponse]),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<CollectionListQuery>,
) -> Result<Json<Vec<CollectionResponse>>, AppError> {
    let mut select = art_collection::Entity::find();
    if let Some(owner) = query.owner {
        select = select.filter(art_collection::Column::OwnerId.eq(owner));
    }
    let collections = select
        .order_by_desc(art_collection::Column::CreatedOn)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = collections.iter().map(|c| c.id).collect();
    let mut members: HashMap<i32, Vec<i32>> = HashMap::new();
    if !ids.is_empty() {
        let rows: Vec<(i32, Option<i32>)> = artpiece::Entity::find()
            .filter(artpiece::Column::CollectionId.is_in(ids))
            .select_only()
            .column(artpiece::Column::Id)
            .column(artpiece::Column::CollectionId)
            .order_by_asc(artpiece::Column::Id)
            .into_tuple()
            .all(&state.db)
            .await?;
        for (piece_id, collection_id) in rows {
            if let Some(cid) = collection_id {
                members.entry(cid).or_default().push(piece_id);
            }
        }
    }

    Ok(Json(
        collections
            .into_iter()
            .map(|c| {
                let pieces = members.remove(&c.id).unwrap_or_default();
                CollectionResponse::from_model(c, pieces)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Collections",
    operation_id = "getCollection",
    summary = "Get a collection by ID",
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection details", body = CollectionResponse),
        (status = 404, description = "Collection not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CollectionResponse>, AppError> {
    let collection = find_collection(&state.db, id).await?;
    let pieces = member_ids(&state.db, collection.id).await?;
    Ok(Json(CollectionResponse::from_model(collection, pieces)))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Collections",
    operation_id = "updateCollection",
    summary = "Update a collection's title or description",
    params(("id" = i32, Path, description = "Collection ID")),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated", body = CollectionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Collection not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_collection(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCollectionRequest>,
) -> Result<Json<CollectionResponse>, AppError> {
    validate_update_collection(&payload)?;

    let collection = find_collection(&state.db, id).await?;
    if collection.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the owner may update this collection".into(),
        ));
    }

    let mut active: art_collection::ActiveModel = collection.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.updated_on = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("A collection with this title already exists".into())
        }
        _ => AppError::from(e),
    })?;

    let pieces = member_ids(&state.db, updated.id).await?;
    Ok(Json(CollectionResponse::from_model(updated, pieces)))
}

/// Delete a collection. Owner only. Member pieces are detached, not deleted.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Collections",
    operation_id = "deleteCollection",
    summary = "Delete a collection",
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Collection not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_collection(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let collection = find_collection(&state.db, id).await?;
    if collection.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the owner may delete this collection".into(),
        ));
    }

    let txn = state.db.begin().await?;
    artpiece::Entity::update_many()
        .col_expr(artpiece::Column::CollectionId, Expr::value(Value::Int(None)))
        .filter(artpiece::Column::CollectionId.eq(collection.id))
        .exec(&txn)
        .await?;
    art_collection::Entity::delete_by_id(collection.id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace a collection's member set in one transaction.
///
/// The request lists the exact IDs the collection should contain afterwards.
/// Listed pieces are attached, current members not listed are detached, and
/// the whole operation fails without side effects if any listed piece is
/// missing or belongs to another user. Re-sending the same list is a no-op.
#[utoipa::path(
    post,
    path = "/{id}/update-artpieces",
    tag = "Collections",
    operation_id = "updateCollectionArtpieces",
    summary = "Replace the set of artpieces in a collection",
    params(("id" = i32, Path, description = "Collection ID")),
    request_body = UpdateArtpiecesRequest,
    responses(
        (status = 200, description = "Membership reconciled", body = CollectionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Collection or a listed piece belongs to someone else (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Collection or a listed piece not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_artpieces(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateArtpiecesRequest>,
) -> Result<Json<CollectionResponse>, AppError> {
    let collection = find_collection(&state.db, id).await?;
    if collection.owner_id != auth_user.user_id {
        return Err(AppError::PermissionDenied(
            "Only the owner may edit this collection's contents".into(),
        ));
    }

    // Repeated IDs collapse to one membership.
    let mut desired = payload.artpiece_ids;
    let mut seen = HashSet::new();
    desired.retain(|id| seen.insert(*id));

    let txn = state.db.begin().await?;

    if !desired.is_empty() {
        let found = artpiece::Entity::find()
            .filter(artpiece::Column::Id.is_in(desired.clone()))
            .all(&txn)
            .await?;
        let found_ids: HashSet<i32> = found.iter().map(|p| p.id).collect();
        if let Some(missing) = desired.iter().find(|id| !found_ids.contains(id)) {
            return Err(AppError::NotFound(format!("Artpiece {missing} not found")));
        }
        if let Some(foreign) = found.iter().find(|p| p.owner_id != auth_user.user_id) {
            return Err(AppError::PermissionDenied(format!(
                "Artpiece {} belongs to another user",
                foreign.id
            )));
        }
    }

    // Detach members that are no longer wanted.
    let mut detach = artpiece::Entity::update_many()
        .col_expr(artpiece::Column::CollectionId, Expr::value(Value::Int(None)))
        .filter(artpiece::Column::CollectionId.eq(collection.id));
    if !desired.is_empty() {
        detach = detach.filter(artpiece::Column::Id.is_not_in(desired.clone()));
    }
    let detached = detach.exec(&txn).await?.rows_affected;

    // Attach wanted pieces that are not already members.
    let mut attached = 0;
    if !desired.is_empty() {
        attached = artpiece::Entity::update_many()
            .col_expr(
                artpiece::Column::CollectionId,
                Expr::value(Value::Int(Some(collection.id))),
            )
            .filter(artpiece::Column::Id.is_in(desired.clone()))
            .filter(
                Condition::any()
                    .add(artpiece::Column::CollectionId.is_null())
                    .add(artpiece::Column::CollectionId.ne(collection.id)),
            )
            .exec(&txn)
            .await?
            .rows_affected;
    }

    let collection = if detached + attached > 0 {
        let mut active: art_collection::ActiveModel = collection.into();
        active.updated_on = Set(chrono::Utc::now());
        active.update(&txn).await?
    } else {
        collection
    };

    let pieces = member_ids(&txn, collection.id).await?;
    txn.commit().await?;

    Ok(Json(CollectionResponse::from_model(collection, pieces)))
}

pub(super) async fn find_collection(
    db: &DatabaseConnection,
    id: i32,
) -> Result<art_collection::Model, AppError> {
    art_collection::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection {id} not found")))
}

async fn member_ids<C: ConnectionTrait>(db: &C, collection_id: i32) -> Result<Vec<i32>, AppError> {
    Ok(artpiece::Entity::find()
        .filter(artpiece::Column::CollectionId.eq(collection_id))
        .select_only()
        .column(artpiece::Column::Id)
        .order_by_asc(artpiece::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?)
}
