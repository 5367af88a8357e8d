use common::SubmissionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Public artist name. Uniqueness is checked case-insensitively at
    /// intake, so there is no column-level constraint here.
    pub stage_name: String,
    pub legal_name: String,
    /// Stored lowercased.
    pub email: String,
    pub phone: String,
    pub city: String,

    /// Public URL of the demo track; an uploaded file wins over a
    /// caller-supplied link.
    pub demo_url: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub social_links: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub artist_bio: Option<String>,

    pub status: SubmissionStatus,

    /// Raw requester IP, kept for fraud review.
    pub ip_address: String,
    /// `sha256("{salt}:{ip}")`, hex-encoded.
    pub ip_hash: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
