use chrono::Utc;
use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{submission, vote, voting_settings};

/// Seed the singleton `voting_settings` row: voting disabled, no
/// explicit window, countdown hidden. Existing settings are left alone.
pub async fn seed_voting_settings(db: &DatabaseConnection) -> Result<(), DbErr> {
    let model = voting_settings::ActiveModel {
        id: Set(voting_settings::SETTINGS_ID.to_string()),
        voting_enabled: Set(false),
        voting_starts_at: Set(None),
        voting_ends_at: Set(None),
        live_final_at: Set(None),
        updated_at: Set(Utc::now()),
    };

    let result = voting_settings::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(voting_settings::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => {
            info!("Seeded default voting settings");
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for moderation lists and the pending count:
    // SELECT ... FROM submission WHERE status = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_status_created")
        .table(submission::Entity)
        .col(submission::Column::Status)
        .col(submission::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_status_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_submission_status_created: {}", e);
        }
    }

    // Composite index for per-competitor vote counts and resets.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_vote_competitor_created")
        .table(vote::Entity)
        .col(vote::Column::CompetitorId)
        .col(vote::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_vote_competitor_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_vote_competitor_created: {}", e);
        }
    }

    Ok(())
}
