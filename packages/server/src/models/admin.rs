use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use chrono::{DateTime, Utc};
use common::{CompetitorStatus, SubmissionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::double_option;
use crate::entity::{competitor, submission, voting_settings};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
    /// Only honored together with `status = approved`.
    #[serde(default)]
    pub make_competitor: bool,
}

/// Competitor create/update form. The admin page posts the full record
/// every time, so updates replace the posted fields wholesale.
#[derive(TryFromMultipart)]
pub struct CompetitorUpsertForm {
    #[form_data(field_name = "stageName")]
    pub stage_name: Option<String>,
    pub city: Option<String>,
    #[form_data(field_name = "demoUrl")]
    pub demo_url: Option<String>,
    #[form_data(field_name = "photoUrl")]
    pub photo_url: Option<String>,
    /// An uploaded photo wins over `photoUrl`.
    #[form_data(field_name = "photoFile", limit = "unlimited")]
    pub photo_file: Option<FieldData<Bytes>>,
    #[form_data(field_name = "socialLinks")]
    pub social_links: Option<String>,
    #[form_data(field_name = "artistBio")]
    pub artist_bio: Option<String>,
    /// `approved` or `hidden`; defaults to `approved` on create.
    pub status: Option<String>,
    /// Checkbox, `"on"` when ticked.
    #[form_data(field_name = "isWinner")]
    pub is_winner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetVotesRequest {
    /// When absent, every vote is deleted.
    #[serde(default)]
    pub competitor_id: Option<Uuid>,
}

/// Partial settings update. Absent fields keep their stored values;
/// explicit `null` clears a timestamp.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub voting_enabled: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub voting_starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub voting_ends_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub live_final_at: Option<Option<DateTime<Utc>>>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub stage_name: String,
    pub legal_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub demo_url: String,
    pub social_links: Option<String>,
    pub artist_bio: Option<String>,
    pub status: SubmissionStatus,
    pub ip_address: String,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            stage_name: m.stage_name,
            legal_name: m.legal_name,
            email: m.email,
            phone: m.phone,
            city: m.city,
            demo_url: m.demo_url,
            social_links: m.social_links,
            artist_bio: m.artist_bio,
            status: m.status,
            ip_address: m.ip_address,
            ip_hash: m.ip_hash,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorResponse {
    pub id: Uuid,
    /// Back-reference to the submission this competitor was promoted
    /// from; NULL for admin-created competitors.
    pub submission_id: Option<Uuid>,
    pub stage_name: String,
    pub city: String,
    pub photo_url: Option<String>,
    pub demo_url: String,
    pub social_links: Option<String>,
    pub artist_bio: Option<String>,
    pub status: CompetitorStatus,
    pub is_winner: bool,
    pub votes_count: i64,
    pub created_at: DateTime<Utc>,
}

impl CompetitorResponse {
    pub fn from_model(m: competitor::Model, votes_count: i64) -> Self {
        Self {
            id: m.id,
            submission_id: m.submission_id,
            stage_name: m.stage_name,
            city: m.city,
            photo_url: m.photo_url,
            demo_url: m.demo_url,
            social_links: m.social_links,
            artist_bio: m.artist_bio,
            status: m.status,
            is_winner: m.is_winner,
            votes_count,
            created_at: m.created_at,
        }
    }
}

/// Moderation outcome: the updated submission plus the competitor it
/// promoted or demoted, when one is linked.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ModerationResponse {
    pub submission: SubmissionResponse,
    pub competitor: Option<CompetitorResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub submissions: u64,
    pub pending_submissions: u64,
    pub approved_competitors: u64,
    pub total_votes: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResetVotesResponse {
    /// Number of votes removed.
    pub deleted: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub voting_enabled: bool,
    pub voting_starts_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
    pub live_final_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<voting_settings::Model> for SettingsResponse {
    fn from(m: voting_settings::Model) -> Self {
        Self {
            voting_enabled: m.voting_enabled,
            voting_starts_at: m.voting_starts_at,
            voting_ends_at: m.voting_ends_at,
            live_final_at: m.live_final_at,
            updated_at: m.updated_at,
        }
    }
}
