use chrono::Utc;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};

use crate::entity::voting_settings::{self, SETTINGS_ID};

/// The settings row as seeded at startup: voting disabled, no explicit
/// window, countdown hidden.
pub fn default_model() -> voting_settings::Model {
    voting_settings::Model {
        id: SETTINGS_ID.to_string(),
        voting_enabled: false,
        voting_starts_at: None,
        voting_ends_at: None,
        live_final_at: None,
        updated_at: Utc::now(),
    }
}

/// Read the settings row, falling back to the seeded defaults if it is
/// missing.
pub async fn load<C: ConnectionTrait>(db: &C) -> Result<voting_settings::Model, DbErr> {
    Ok(voting_settings::Entity::find_by_id(SETTINGS_ID)
        .one(db)
        .await?
        .unwrap_or_else(default_model))
}
