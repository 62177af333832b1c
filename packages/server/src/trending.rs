//! Trending selection over like activity.
//!
//! Ranks artpieces by likes received in the trailing 30-day window and tops
//! the slate up from the all-time pool (then from never-liked pieces) so the
//! endpoint always returns a full slate while enough pieces exist.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entity::{artpiece, like};
use crate::error::AppError;
use crate::models::artpiece::TrendingItem;

/// Number of pieces in the trending slate.
pub const TRENDING_SLATE_SIZE: u64 = 4;

/// Window considered "recent" for ranking purposes.
const TRENDING_WINDOW_DAYS: i64 = 30;

/// Build the trending slate.
///
/// Selection runs in three phases, each filling remaining seats:
/// 1. pieces ranked by like count inside the 30-day window,
/// 2. pieces ranked by all-time like count,
/// 3. never-liked pieces by ascending ID.
///
/// The returned slate is re-ordered by recomputed total like count
/// descending with ties broken by ascending ID.
pub async fn top_trending<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<TrendingItem>, AppError> {
    let cutoff = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);

    let recent_counts = like_counts(db, Some(cutoff)).await?;
    let mut selected = ranked_ids(&recent_counts, limit as usize);

    let total_counts = like_counts(db, None).await?;
    if selected.len() < limit as usize {
        for id in ranked_ids(&total_counts, total_counts.len()) {
            if selected.len() >= limit as usize {
                break;
            }
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
    }

    if selected.len() < limit as usize {
        let remaining = limit - selected.len() as u64;
        let mut query = artpiece::Entity::find()
            .order_by_asc(artpiece::Column::Id)
            .limit(remaining);
        if !selected.is_empty() {
            query = query.filter(artpiece::Column::Id.is_not_in(selected.clone()));
        }
        for piece in query.all(db).await? {
            selected.push(piece.id);
        }
    }

    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let recent_by_id: HashMap<i32, i64> = recent_counts.into_iter().collect();
    let total_by_id: HashMap<i32, i64> = total_counts.into_iter().collect();
    let pieces: HashMap<i32, artpiece::Model> = artpiece::Entity::find()
        .filter(artpiece::Column::Id.is_in(selected.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    // Final order: recomputed total likes descending, ID ascending on ties.
    // A window-phase pick can therefore rank below a top-up that carries a
    // larger all-time count.
    let mut slate: Vec<(i64, i32)> = selected
        .into_iter()
        .map(|id| (total_by_id.get(&id).copied().unwrap_or(0), id))
        .collect();
    slate.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    Ok(slate
        .into_iter()
        .filter_map(|(_, id)| {
            let p = pieces.get(&id)?;
            Some(TrendingItem {
                id: p.id,
                title: p.title.clone(),
                image_url: p.image_url.clone(),
                owner_id: p.owner_id,
                recent_likes: recent_by_id.get(&id).copied().unwrap_or(0) as u64,
            })
        })
        .collect())
}

async fn like_counts<C: ConnectionTrait>(
    db: &C,
    since: Option<chrono::DateTime<Utc>>,
) -> Result<Vec<(i32, i64)>, AppError> {
    let mut query = like::Entity::find()
        .select_only()
        .column(like::Column::LikedPieceId)
        .column_as(like::Column::Id.count(), "cnt")
        .group_by(like::Column::LikedPieceId);
    if let Some(cutoff) = since {
        query = query.filter(like::Column::CreatedOn.gte(cutoff));
    }
    Ok(query.into_tuple::<(i32, i64)>().all(db).await?)
}

fn ranked_ids(counts: &[(i32, i64)], take: usize) -> Vec<i32> {
    let mut sorted: Vec<(i32, i64)> = counts.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    sorted.into_iter().take(take).map(|(id, _)| id).collect()
}
