use common::CompetitorStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competitor")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// NULL for competitors created directly by an admin rather than
    /// promoted from a submission.
    pub submission_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "submission_id", to = "id")]
    pub submission: Option<super::submission::Entity>,

    pub stage_name: String,
    pub city: String,

    pub photo_url: Option<String>,
    pub demo_url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub social_links: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub artist_bio: Option<String>,

    /// Only `approved` competitors appear on the public leaderboard and
    /// accept votes.
    pub status: CompetitorStatus,

    /// At most one competitor holds this flag; the winner announcement
    /// path clears it everywhere before setting it.
    pub is_winner: bool,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    #[sea_orm(has_many)]
    pub vote_otps: HasMany<super::vote_otp::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
