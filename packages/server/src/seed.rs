use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::info;

use crate::entity::like;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite unique indexes, so the
/// (owner_id, liked_piece_id) constraint on `like` is created manually on
/// startup. This index is what turns a double-like race into a reported
/// duplicate instead of a second row.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_like_owner_piece")
        .table(like::Entity)
        .col(like::Column::OwnerId)
        .col(like::Column::LikedPieceId)
        .to_owned();

    db.execute(&stmt).await?;
    info!("Ensured unique index idx_like_owner_piece exists");

    Ok(())
}
