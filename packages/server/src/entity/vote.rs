use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// One vote per (competitor, email). The database constraint is the
    /// sole arbiter under concurrent casts.
    #[sea_orm(unique_key = "competitor_voter")]
    pub competitor_id: Uuid,
    #[sea_orm(unique_key = "competitor_voter")]
    pub voter_email: String,

    #[sea_orm(belongs_to, from = "competitor_id", to = "id")]
    pub competitor: HasOne<super::competitor::Entity>,

    /// Recorded for fraud review; does not participate in uniqueness.
    pub voter_ip: String,
    pub voter_ip_hash: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
