//! Hashtag parsing and reference-counted reconciliation.
//!
//! Hashtags are garbage-collected eagerly: whenever associations are cleared
//! (tag update or artpiece deletion), the previously associated set is
//! snapshotted in-flight and every tag whose reference count dropped to zero
//! is deleted in the same call.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::entity::{artpiece_hashtag, hashtag};
use crate::error::AppError;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("hashtag pattern is valid"));

/// Extract hashtag names from free text.
///
/// Tokens match `#` followed by one or more alphanumeric/underscore
/// characters. The leading marker is stripped, order is preserved and
/// duplicates are permitted. Only the empty string yields an empty list;
/// any other input with no matching token, whitespace included, is a
/// validation error.
pub fn parse_hashtags(text: &str) -> Result<Vec<String>, AppError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<String> = HASHTAG_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();

    if names.is_empty() {
        return Err(AppError::Validation(
            "No valid hashtags found. Hashtags start with '#' followed by letters, digits or underscores.".into(),
        ));
    }

    Ok(names)
}

/// Hashtag ids currently associated with an artpiece.
pub async fn associated_hashtag_ids<C: ConnectionTrait>(
    db: &C,
    artpiece_id: i32,
) -> Result<Vec<i32>, AppError> {
    Ok(artpiece_hashtag::Entity::find()
        .filter(artpiece_hashtag::Column::ArtpieceId.eq(artpiece_id))
        .select_only()
        .column(artpiece_hashtag::Column::HashtagId)
        .into_tuple::<i32>()
        .all(db)
        .await?)
}

/// Replace an artpiece's hashtag set with `desired_names`.
///
/// Clears all existing associations, get-or-creates each desired name, then
/// deletes every previously associated hashtag that is now orphaned. Runs on
/// the caller's connection so it participates in the caller's transaction.
pub async fn reconcile_hashtags<C: ConnectionTrait>(
    db: &C,
    artpiece_id: i32,
    desired_names: &[String],
) -> Result<(), AppError> {
    // Snapshot before clearing; these are the only candidates for orphaning.
    let previous = associated_hashtag_ids(db, artpiece_id).await?;

    artpiece_hashtag::Entity::delete_many()
        .filter(artpiece_hashtag::Column::ArtpieceId.eq(artpiece_id))
        .exec(db)
        .await?;

    let mut seen = HashSet::new();
    for name in desired_names {
        if !seen.insert(name.as_str()) {
            continue;
        }

        let tag_id = get_or_create(db, name).await?;

        let assoc = artpiece_hashtag::ActiveModel {
            artpiece_id: Set(artpiece_id),
            hashtag_id: Set(tag_id),
        };
        let result = artpiece_hashtag::Entity::insert(assoc)
            .on_conflict(
                OnConflict::columns([
                    artpiece_hashtag::Column::ArtpieceId,
                    artpiece_hashtag::Column::HashtagId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;
        match result {
            Ok(_) | Err(sea_orm::DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    purge_orphans(db, &previous).await?;
    Ok(())
}

/// Delete every hashtag in `candidate_ids` whose reference count is zero.
///
/// Returns the number of hashtags deleted.
pub async fn purge_orphans<C: ConnectionTrait>(
    db: &C,
    candidate_ids: &[i32],
) -> Result<u64, AppError> {
    if candidate_ids.is_empty() {
        return Ok(0);
    }

    let still_referenced: HashSet<i32> = artpiece_hashtag::Entity::find()
        .filter(artpiece_hashtag::Column::HashtagId.is_in(candidate_ids.to_vec()))
        .select_only()
        .column(artpiece_hashtag::Column::HashtagId)
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let orphans: Vec<i32> = candidate_ids
        .iter()
        .copied()
        .filter(|id| !still_referenced.contains(id))
        .collect();

    if orphans.is_empty() {
        return Ok(0);
    }

    let result = hashtag::Entity::delete_many()
        .filter(hashtag::Column::Id.is_in(orphans))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Names of the hashtags associated with an artpiece, alphabetically.
pub async fn hashtag_names<C: ConnectionTrait>(
    db: &C,
    artpiece_id: i32,
) -> Result<Vec<String>, AppError> {
    let ids = associated_hashtag_ids(db, artpiece_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = hashtag::Entity::find()
        .filter(hashtag::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();
    Ok(names)
}

async fn get_or_create<C: ConnectionTrait>(db: &C, name: &str) -> Result<i32, AppError> {
    if let Some(existing) = hashtag::Entity::find()
        .filter(hashtag::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing.id);
    }

    let new_tag = hashtag::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    };
    let tag = new_tag.insert(db).await?;
    Ok(tag.id)
}
