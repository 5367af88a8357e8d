use std::collections::HashMap;

use common::CompetitorStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::entity::{competitor, vote};
use crate::error::AppError;

/// Look up a competitor by ID, returning 404 if not found.
pub async fn find_competitor<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<competitor::Model, AppError> {
    competitor::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Competitor not found".into()))
}

/// The competitor promoted from a given submission, if any.
pub async fn find_by_submission<C: ConnectionTrait>(
    db: &C,
    submission_id: Uuid,
) -> Result<Option<competitor::Model>, DbErr> {
    competitor::Entity::find()
        .filter(competitor::Column::SubmissionId.eq(submission_id))
        .one(db)
        .await
}

/// Vote totals per competitor. Competitors without votes are absent.
pub async fn vote_counts<C: ConnectionTrait>(db: &C) -> Result<HashMap<Uuid, i64>, DbErr> {
    let rows: Vec<(Uuid, i64)> = vote::Entity::find()
        .select_only()
        .column(vote::Column::CompetitorId)
        .column_as(vote::Column::Id.count(), "votes")
        .group_by(vote::Column::CompetitorId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Clear `is_winner` on every competitor, then set it on the target and
/// force the target to `approved`. There is no row-level constraint
/// backing the at-most-one-winner rule; callers run this inside a
/// transaction.
pub async fn set_exclusive_winner<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<competitor::Model, AppError> {
    let target = find_competitor(db, id).await?;

    competitor::Entity::update_many()
        .col_expr(competitor::Column::IsWinner, Expr::value(false))
        .exec(db)
        .await?;

    let mut active: competitor::ActiveModel = target.into();
    active.is_winner = Set(true);
    active.status = Set(CompetitorStatus::Approved);
    Ok(active.update(db).await?)
}
