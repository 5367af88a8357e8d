use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::voting_window::VotingPhase;

/// Demo intake form posted from the public page.
#[derive(TryFromMultipart)]
pub struct DemoSubmissionForm {
    #[form_data(field_name = "stageName")]
    pub stage_name: Option<String>,
    #[form_data(field_name = "legalName")]
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    #[form_data(field_name = "demoUrl")]
    pub demo_url: Option<String>,
    #[form_data(field_name = "demoFile", limit = "unlimited")]
    pub demo_file: Option<FieldData<Bytes>>,
    #[form_data(field_name = "socialLinks")]
    pub social_links: Option<String>,
    #[form_data(field_name = "artistBio")]
    pub artist_bio: Option<String>,
    /// Checkbox, `"on"` when ticked.
    #[form_data(field_name = "acceptTerms")]
    pub accept_terms: Option<String>,
    /// Honeypot. Humans never fill it.
    pub website: Option<String>,
}

/// Vote form posted from a competitor card.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteForm {
    pub competitor_id: Option<String>,
    pub email: Option<String>,
    /// Honeypot.
    pub website: Option<String>,
}

/// OTP request form posted from the vote widget.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestForm {
    pub competitor_id: Option<String>,
    pub email: Option<String>,
    /// Honeypot.
    pub website: Option<String>,
    pub turnstile_token: Option<String>,
}

/// Outcome signal carried in the demo intake redirect (`?demo=<signal>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoSignal {
    Ok,
    Invalid,
    DuplicateStage,
    Error,
    /// The backing datastore is not provisioned. Kept for the page's
    /// status banner; this server refuses to start without a database,
    /// so it never actually emits it.
    Config,
}

impl DemoSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            DemoSignal::Ok => "ok",
            DemoSignal::Invalid => "invalid",
            DemoSignal::DuplicateStage => "duplicate_stage",
            DemoSignal::Error => "error",
            DemoSignal::Config => "config",
        }
    }
}

/// Outcome signal carried in the vote redirect (`?vote=<signal>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteSignal {
    Ok,
    Invalid,
    Closed,
    Duplicate,
    Error,
}

impl VoteSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteSignal::Ok => "ok",
            VoteSignal::Invalid => "invalid",
            VoteSignal::Closed => "closed",
            VoteSignal::Duplicate => "duplicate",
            VoteSignal::Error => "error",
        }
    }
}

/// Outcome signal for the OTP request leg, sharing the vote query key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpSignal {
    Sent,
    Invalid,
    Captcha,
    Closed,
    Error,
}

impl OtpSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            OtpSignal::Sent => "sent",
            OtpSignal::Invalid => "invalid",
            OtpSignal::Captcha => "captcha",
            OtpSignal::Closed => "closed",
            OtpSignal::Error => "error",
        }
    }
}

/// One ranked row of the public leaderboard.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub competitor_id: Uuid,
    pub stage_name: String,
    pub city: String,
    pub photo_url: Option<String>,
    pub votes_count: i64,
    /// 1-based position after the stable sort by vote count.
    pub rank: usize,
}

/// Public voting state, resolved window included.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatusResponse {
    pub voting_enabled: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub phase: VotingPhase,
    /// When set, the public page shows the live final countdown.
    pub live_final_at: Option<DateTime<Utc>>,
}
