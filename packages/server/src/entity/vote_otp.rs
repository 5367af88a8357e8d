use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_otp")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub competitor_id: Uuid,
    #[sea_orm(belongs_to, from = "competitor_id", to = "id")]
    pub competitor: HasOne<super::competitor::Entity>,

    pub voter_email: String,

    /// `sha256(code)`, hex-encoded. The plaintext code only ever travels
    /// in the email.
    pub otp_hash: String,

    /// Issuance time plus ten minutes.
    pub expires_at: DateTimeUtc,

    pub requester_ip: String,
    pub requester_ip_hash: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
