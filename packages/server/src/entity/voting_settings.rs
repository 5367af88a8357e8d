use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The single settings row everyone reads and writes.
pub const SETTINGS_ID: &str = "default";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "voting_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub voting_enabled: bool,

    /// NULL bounds fall back to the built-in default window at read time.
    pub voting_starts_at: Option<DateTimeUtc>,
    pub voting_ends_at: Option<DateTimeUtc>,

    /// When the live final countdown is shown publicly; NULL hides it.
    pub live_final_at: Option<DateTimeUtc>,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
