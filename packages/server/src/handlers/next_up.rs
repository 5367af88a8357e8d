use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use axum_typed_multipart::TypedMultipart;
use chrono::{Duration, Utc};
use common::mail::EmailMessage;
use common::status::{CompetitorStatus, SubmissionStatus};
use rand::Rng;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::entity::{competitor, submission, vote, vote_otp};
use crate::error::AppError;
use crate::extractors::client_ip::ClientIp;
use crate::models::next_up::{
    DemoSignal, DemoSubmissionForm, LeaderboardEntry, OtpRequestForm, OtpSignal, VoteForm,
    VoteSignal, VotingStatusResponse,
};
use crate::models::shared::non_blank;
use crate::state::AppState;
use crate::utils::competitor::vote_counts;
use crate::utils::filename::unique_key;
use crate::utils::hashing::{hash_ip, hash_otp_code};
use crate::utils::settings;
use crate::utils::voting_window::{VotingPhase, phase_at, resolve_voting_window};

/// The page on the marketing site all form posts redirect back to.
const NEXT_UP_PAGE: &str = "/killeen-next-up";

const OTP_VALIDITY_MINUTES: i64 = 10;

pub fn demo_upload_body_limit(max_size: usize) -> DefaultBodyLimit {
    // Allow some overhead for the text fields alongside the file.
    DefaultBodyLimit::max(max_size + 4096)
}

fn demo_redirect(signal: DemoSignal) -> Redirect {
    Redirect::to(&format!(
        "{NEXT_UP_PAGE}?demo={}#submit-demo",
        signal.as_str()
    ))
}

fn vote_redirect(signal: VoteSignal) -> Redirect {
    Redirect::to(&format!(
        "{NEXT_UP_PAGE}?vote={}#competencia",
        signal.as_str()
    ))
}

/// OTP outcomes surface in the same page banner as votes, so they share the
/// `vote` query key and anchor.
fn otp_redirect(signal: OtpSignal) -> Redirect {
    Redirect::to(&format!(
        "{NEXT_UP_PAGE}?vote={}#competencia",
        signal.as_str()
    ))
}

/// Unique-violation check with a message fallback for drivers that don't
/// surface the typed error code.
fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    err.to_string().to_lowercase().contains("duplicate key")
}

#[utoipa::path(
    post,
    path = "/submissions",
    tag = "Next Up",
    operation_id = "submitDemo",
    summary = "Submit a demo to the Next Up competition",
    description = "Anonymous multipart intake for demo submissions. Requires `stageName`, \
        `legalName`, `email`, `phone`, `city`, `acceptTerms=on` and either a `demoFile` upload \
        or a `demoUrl` link. The `website` field is a honeypot. Every outcome is a redirect \
        back to the Next Up page carrying `?demo=<status>`: `ok`, `invalid`, `duplicate_stage` \
        (stage name already taken, compared case-insensitively) or `error`.",
    request_body(content_type = "multipart/form-data", description = "Demo submission form"),
    responses(
        (status = 303, description = "Redirect to `/killeen-next-up?demo=<status>#submit-demo`"),
    ),
)]
#[instrument(skip(state, form), fields(ip = %ip))]
pub async fn submit_demo(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    TypedMultipart(form): TypedMultipart<DemoSubmissionForm>,
) -> Redirect {
    // Bots fill the hidden field; pretend success and store nothing.
    if non_blank(form.website).is_some() {
        return demo_redirect(DemoSignal::Ok);
    }

    let stage_name = non_blank(form.stage_name);
    let legal_name = non_blank(form.legal_name);
    let email = non_blank(form.email).map(|e| e.to_lowercase());
    let phone = non_blank(form.phone);
    let city = non_blank(form.city);
    let demo_url = non_blank(form.demo_url);
    let social_links = non_blank(form.social_links);
    let artist_bio = non_blank(form.artist_bio);
    let accepted = form.accept_terms.as_deref() == Some("on");
    // Browsers send an empty file part when the input is left blank.
    let demo_file = form.demo_file.filter(|f| !f.contents.is_empty());

    let (Some(stage_name), Some(legal_name), Some(email), Some(phone), Some(city)) =
        (stage_name, legal_name, email, phone, city)
    else {
        return demo_redirect(DemoSignal::Invalid);
    };
    if !accepted || (demo_url.is_none() && demo_file.is_none()) {
        return demo_redirect(DemoSignal::Invalid);
    }

    let existing = submission::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(submission::Column::StageName)))
                .eq(stage_name.to_lowercase()),
        )
        .one(&state.db)
        .await;
    match existing {
        Ok(Some(_)) => return demo_redirect(DemoSignal::DuplicateStage),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Stage name lookup failed");
            return demo_redirect(DemoSignal::Error);
        }
    }

    // An uploaded file wins over a pasted link.
    let mut final_demo_url = demo_url.unwrap_or_default();
    if let Some(file) = demo_file {
        let original_name = file
            .metadata
            .file_name
            .clone()
            .unwrap_or_else(|| "demo".to_string());
        let content_type = file
            .metadata
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| "audio/mpeg".to_string());
        let key = unique_key("demos", &original_name);
        match state.media.put(&key, &file.contents, &content_type).await {
            Ok(url) => final_demo_url = url,
            Err(e) => {
                error!(error = %e, "Demo upload failed");
                return demo_redirect(DemoSignal::Error);
            }
        }
    }

    let row = submission::ActiveModel {
        id: Set(Uuid::now_v7()),
        stage_name: Set(stage_name.clone()),
        legal_name: Set(legal_name),
        email: Set(email.clone()),
        phone: Set(phone),
        city: Set(city),
        demo_url: Set(final_demo_url),
        social_links: Set(social_links),
        artist_bio: Set(artist_bio),
        status: Set(SubmissionStatus::Pending),
        ip_address: Set(ip.clone()),
        ip_hash: Set(hash_ip(&state.config.security.ip_salt, &ip)),
        created_at: Set(Utc::now()),
    };
    if let Err(e) = row.insert(&state.db).await {
        error!(error = %e, "Submission insert failed");
        return demo_redirect(DemoSignal::Error);
    }

    let message = EmailMessage {
        to: email,
        subject: "EM Records | Demo recibida para KILLEEN NEXT UP".to_string(),
        html: format!(
            "<h2>KILLEEN NEXT UP – Demo Recibida</h2>\
             <p>Hola {stage_name},</p>\
             <p>Tu demo fue recibida correctamente por EM Records.</p>\
             <p>Estado inicial: <strong>pendiente de revisión</strong>.</p>"
        ),
    };
    if let Err(e) = state.mailer.send(&message).await {
        warn!(error = %e, "Demo confirmation email failed");
    }

    demo_redirect(DemoSignal::Ok)
}

#[utoipa::path(
    post,
    path = "/votes",
    tag = "Next Up",
    operation_id = "castVote",
    summary = "Cast a vote for a competitor",
    description = "Anonymous urlencoded vote. Requires `competitorId` and `email`; `website` \
        is a honeypot. One vote per competitor per email, enforced by the database. Every \
        outcome is a redirect back to the Next Up page carrying `?vote=<status>`: `ok`, \
        `invalid`, `closed` (voting disabled or outside the window), `duplicate` or `error`.",
    request_body(content_type = "application/x-www-form-urlencoded", description = "Vote form"),
    responses(
        (status = 303, description = "Redirect to `/killeen-next-up?vote=<status>#competencia`"),
    ),
)]
#[instrument(skip(state, form), fields(ip = %ip))]
pub async fn cast_vote(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Form(form): Form<VoteForm>,
) -> Redirect {
    if non_blank(form.website).is_some() {
        return vote_redirect(VoteSignal::Ok);
    }

    let competitor_id = non_blank(form.competitor_id);
    let email = non_blank(form.email).map(|e| e.to_lowercase());
    let (Some(competitor_id), Some(email)) = (competitor_id, email) else {
        return vote_redirect(VoteSignal::Invalid);
    };

    let settings = match settings::load(&state.db).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Voting settings lookup failed");
            return vote_redirect(VoteSignal::Error);
        }
    };
    if !settings.voting_enabled {
        return vote_redirect(VoteSignal::Closed);
    }
    let (start, end) = resolve_voting_window(settings.voting_starts_at, settings.voting_ends_at);
    if phase_at(Utc::now(), start, end) != VotingPhase::Active {
        return vote_redirect(VoteSignal::Closed);
    }

    // A malformed id cannot reference any competitor, same as a failed insert.
    let Ok(competitor_id) = Uuid::parse_str(&competitor_id) else {
        return vote_redirect(VoteSignal::Error);
    };

    let row = vote::ActiveModel {
        id: Set(Uuid::now_v7()),
        competitor_id: Set(competitor_id),
        voter_email: Set(email),
        voter_ip: Set(ip.clone()),
        voter_ip_hash: Set(hash_ip(&state.config.security.ip_salt, &ip)),
        created_at: Set(Utc::now()),
    };
    match row.insert(&state.db).await {
        Ok(_) => vote_redirect(VoteSignal::Ok),
        Err(e) if is_unique_violation(&e) => vote_redirect(VoteSignal::Duplicate),
        Err(e) => {
            error!(error = %e, "Vote insert failed");
            vote_redirect(VoteSignal::Error)
        }
    }
}

#[utoipa::path(
    post,
    path = "/votes/otp",
    tag = "Next Up",
    operation_id = "requestVoteOtp",
    summary = "Request a one-time code for vote verification",
    description = "Emails a 6-digit code to the voter. Requires `competitorId` and `email`; \
        `website` is a honeypot and `turnstileToken` is checked when Turnstile is fully \
        configured. The competitor must exist and be approved. Codes expire after 10 minutes. \
        Every outcome is a redirect back to the Next Up page carrying `?vote=<status>`: \
        `sent`, `invalid`, `captcha`, `closed` or `error`.",
    request_body(content_type = "application/x-www-form-urlencoded", description = "OTP request form"),
    responses(
        (status = 303, description = "Redirect to `/killeen-next-up?vote=<status>#competencia`"),
    ),
)]
#[instrument(skip(state, form), fields(ip = %ip))]
pub async fn request_vote_otp(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Form(form): Form<OtpRequestForm>,
) -> Redirect {
    if non_blank(form.website).is_some() {
        return otp_redirect(OtpSignal::Sent);
    }

    let competitor_id = non_blank(form.competitor_id);
    let email = non_blank(form.email).map(|e| e.to_lowercase());
    let (Some(competitor_id), Some(email)) = (competitor_id, email) else {
        return otp_redirect(OtpSignal::Invalid);
    };

    if !state
        .turnstile
        .verify(form.turnstile_token.as_deref(), &ip)
        .await
    {
        return otp_redirect(OtpSignal::Captcha);
    }

    let settings = match settings::load(&state.db).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Voting settings lookup failed");
            return otp_redirect(OtpSignal::Error);
        }
    };
    if !settings.voting_enabled {
        return otp_redirect(OtpSignal::Closed);
    }
    let (start, end) = resolve_voting_window(settings.voting_starts_at, settings.voting_ends_at);
    if phase_at(Utc::now(), start, end) != VotingPhase::Active {
        return otp_redirect(OtpSignal::Closed);
    }

    let Ok(competitor_id) = Uuid::parse_str(&competitor_id) else {
        return otp_redirect(OtpSignal::Invalid);
    };
    let competitor = match competitor::Entity::find_by_id(competitor_id)
        .filter(competitor::Column::Status.eq(CompetitorStatus::Approved))
        .one(&state.db)
        .await
    {
        Ok(Some(c)) => c,
        Ok(None) => return otp_redirect(OtpSignal::Invalid),
        Err(e) => {
            error!(error = %e, "Competitor lookup failed");
            return otp_redirect(OtpSignal::Invalid);
        }
    };

    let code = rand::rng().random_range(100_000..=999_999u32).to_string();
    let now = Utc::now();
    let row = vote_otp::ActiveModel {
        id: Set(Uuid::now_v7()),
        competitor_id: Set(competitor.id),
        voter_email: Set(email.clone()),
        otp_hash: Set(hash_otp_code(&code)),
        expires_at: Set(now + Duration::minutes(OTP_VALIDITY_MINUTES)),
        requester_ip: Set(ip.clone()),
        requester_ip_hash: Set(hash_ip(&state.config.security.ip_salt, &ip)),
        created_at: Set(now),
    };
    if let Err(e) = row.insert(&state.db).await {
        error!(error = %e, "OTP insert failed");
        return otp_redirect(OtpSignal::Error);
    }

    let message = EmailMessage {
        to: email,
        subject: "OTP de voto | KILLEEN NEXT UP".to_string(),
        html: format!(
            "<h2>KILLEEN NEXT UP</h2>\
             <p>Tu código de verificación es:</p>\
             <p style=\"font-size:24px;font-weight:700;letter-spacing:4px;\">{code}</p>\
             <p>Expira en 10 minutos.</p>\
             <p>Artista: <strong>{}</strong></p>",
            competitor.stage_name
        ),
    };
    if let Err(e) = state.mailer.send(&message).await {
        warn!(error = %e, "OTP email failed");
    }

    otp_redirect(OtpSignal::Sent)
}

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "Next Up",
    operation_id = "getLeaderboard",
    summary = "Public leaderboard",
    description = "Approved competitors (newest 100) ranked by vote count. Ties keep the \
        newest-first order.",
    responses(
        (status = 200, description = "Ranked competitors", body = [LeaderboardEntry]),
    ),
)]
#[instrument(skip(state))]
pub async fn leaderboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let competitors = competitor::Entity::find()
        .filter(competitor::Column::Status.eq(CompetitorStatus::Approved))
        .order_by_desc(competitor::Column::CreatedAt)
        .limit(100)
        .all(&state.db)
        .await?;
    let counts = vote_counts(&state.db).await?;

    let mut entries: Vec<LeaderboardEntry> = competitors
        .into_iter()
        .map(|c| LeaderboardEntry {
            competitor_id: c.id,
            stage_name: c.stage_name,
            city: c.city,
            photo_url: c.photo_url,
            votes_count: counts.get(&c.id).copied().unwrap_or(0),
            rank: 0,
        })
        .collect();
    // Stable sort: equal counts keep the newest-first ordering from the query.
    entries.sort_by(|a, b| b.votes_count.cmp(&a.votes_count));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Next Up",
    operation_id = "getVotingStatus",
    summary = "Public voting status",
    description = "Whether voting is enabled, the resolved window, the current phase and the \
        live final datetime (null hides the countdown).",
    responses(
        (status = 200, description = "Voting status", body = VotingStatusResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn voting_status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = settings::load(&state.db).await?;
    let (starts_at, ends_at) =
        resolve_voting_window(settings.voting_starts_at, settings.voting_ends_at);
    let phase = phase_at(Utc::now(), starts_at, ends_at);

    Ok(Json(VotingStatusResponse {
        voting_enabled: settings.voting_enabled,
        starts_at,
        ends_at,
        phase,
        live_final_at: settings.live_final_at,
    }))
}
