use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_typed_multipart::{FieldData, TypedMultipart};
use chrono::Utc;
use common::status::{CompetitorStatus, SubmissionStatus};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{competitor, submission, vote, voting_settings};
use crate::error::{AppError, ErrorBody};
use crate::extractors::admin::AdminToken;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    CompetitorResponse, CompetitorUpsertForm, ModerationResponse, ResetVotesRequest,
    ResetVotesResponse, SettingsResponse, StatsResponse, SubmissionResponse,
    UpdateSettingsRequest, UpdateSubmissionStatusRequest,
};
use crate::models::shared::non_blank;
use crate::state::AppState;
use crate::utils::competitor::{find_by_submission, find_competitor, set_exclusive_winner, vote_counts};
use crate::utils::csv::{Section, export_filename, render_export};
use crate::utils::filename::unique_key;
use crate::utils::settings;

pub fn photo_upload_body_limit(max_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_size + 4096)
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Next Up Admin",
    operation_id = "getNextUpStats",
    summary = "Dashboard counters",
    description = "Total submissions, submissions still pending review, approved competitors \
        and total votes.",
    responses(
        (status = 200, description = "Counters", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn get_stats(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let submissions = submission::Entity::find().count(&state.db).await?;
    let pending_submissions = submission::Entity::find()
        .filter(submission::Column::Status.eq(SubmissionStatus::Pending))
        .count(&state.db)
        .await?;
    let approved_competitors = competitor::Entity::find()
        .filter(competitor::Column::Status.eq(CompetitorStatus::Approved))
        .count(&state.db)
        .await?;
    let total_votes = vote::Entity::find().count(&state.db).await?;

    Ok(Json(StatsResponse {
        submissions,
        pending_submissions,
        approved_competitors,
        total_votes,
    }))
}

#[utoipa::path(
    get,
    path = "/submissions",
    tag = "Next Up Admin",
    operation_id = "listSubmissions",
    summary = "List all demo submissions",
    description = "Every submission regardless of status, newest first.",
    responses(
        (status = 200, description = "Submission list", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_submissions(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let rows = submission::Entity::find()
        .order_by_desc(submission::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(SubmissionResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/submissions/{id}/status",
    tag = "Next Up Admin",
    operation_id = "updateSubmissionStatus",
    summary = "Moderate a submission",
    description = "Sets the review status. `approved` with `makeCompetitor: true` promotes the \
        submission onto the roster: an existing linked competitor is refreshed from the \
        submission and re-approved, otherwise a new competitor is created back-referencing it. \
        `rejected` or `pending` hides any linked competitor without deleting its history.",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = UpdateSubmissionStatusRequest,
    responses(
        (status = 200, description = "Updated submission and linked competitor", body = ModerationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_submission_status(
    _admin: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateSubmissionStatusRequest>,
) -> Result<Json<ModerationResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = submission::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    let mut active: submission::ActiveModel = existing.into();
    active.status = Set(payload.status);
    let updated = active.update(&txn).await?;

    let linked = find_by_submission(&txn, id).await?;
    let competitor_model = match payload.status {
        SubmissionStatus::Approved if payload.make_competitor => {
            Some(promote_submission(&txn, &updated, linked).await?)
        }
        SubmissionStatus::Approved => linked,
        SubmissionStatus::Rejected | SubmissionStatus::Pending => {
            demote_linked(&txn, linked).await?
        }
    };

    txn.commit().await?;

    let competitor = match competitor_model {
        Some(c) => {
            let votes = count_votes_for(&state.db, c.id).await?;
            Some(CompetitorResponse::from_model(c, votes))
        }
        None => None,
    };

    Ok(Json(ModerationResponse {
        submission: SubmissionResponse::from(updated),
        competitor,
    }))
}

/// Refresh the linked competitor from the submission, or create one.
async fn promote_submission<C: ConnectionTrait>(
    db: &C,
    source: &submission::Model,
    linked: Option<competitor::Model>,
) -> Result<competitor::Model, AppError> {
    match linked {
        Some(existing) => {
            let mut active: competitor::ActiveModel = existing.into();
            active.stage_name = Set(source.stage_name.clone());
            active.city = Set(source.city.clone());
            active.demo_url = Set(source.demo_url.clone());
            active.social_links = Set(source.social_links.clone());
            active.artist_bio = Set(source.artist_bio.clone());
            active.status = Set(CompetitorStatus::Approved);
            Ok(active.update(db).await?)
        }
        None => {
            let row = competitor::ActiveModel {
                id: Set(Uuid::now_v7()),
                submission_id: Set(Some(source.id)),
                stage_name: Set(source.stage_name.clone()),
                city: Set(source.city.clone()),
                photo_url: Set(None),
                demo_url: Set(source.demo_url.clone()),
                social_links: Set(source.social_links.clone()),
                artist_bio: Set(source.artist_bio.clone()),
                status: Set(CompetitorStatus::Approved),
                is_winner: Set(false),
                created_at: Set(Utc::now()),
            };
            Ok(row.insert(db).await?)
        }
    }
}

/// Hide the linked competitor, if there is one.
async fn demote_linked<C: ConnectionTrait>(
    db: &C,
    linked: Option<competitor::Model>,
) -> Result<Option<competitor::Model>, AppError> {
    match linked {
        Some(existing) => {
            let mut active: competitor::ActiveModel = existing.into();
            active.status = Set(CompetitorStatus::Hidden);
            Ok(Some(active.update(db).await?))
        }
        None => Ok(None),
    }
}

async fn count_votes_for<C: ConnectionTrait>(db: &C, competitor_id: Uuid) -> Result<i64, AppError> {
    let count = vote::Entity::find()
        .filter(vote::Column::CompetitorId.eq(competitor_id))
        .count(db)
        .await?;
    Ok(count as i64)
}

#[utoipa::path(
    get,
    path = "/competitors",
    tag = "Next Up Admin",
    operation_id = "listCompetitors",
    summary = "List competitors with vote counts",
    description = "Every competitor regardless of status (newest 200), each with its current \
        vote count.",
    responses(
        (status = 200, description = "Competitor list", body = Vec<CompetitorResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn list_competitors(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<Vec<CompetitorResponse>>, AppError> {
    let rows = competitor::Entity::find()
        .order_by_desc(competitor::Column::CreatedAt)
        .limit(200)
        .all(&state.db)
        .await?;
    let counts = vote_counts(&state.db).await?;

    let list = rows
        .into_iter()
        .map(|c| {
            let votes = counts.get(&c.id).copied().unwrap_or(0);
            CompetitorResponse::from_model(c, votes)
        })
        .collect();

    Ok(Json(list))
}

#[utoipa::path(
    post,
    path = "/competitors",
    tag = "Next Up Admin",
    operation_id = "createCompetitor",
    summary = "Create a competitor directly",
    description = "Adds a competitor without going through the submission flow. `stageName`, \
        `city` and `demoUrl` are required. A `photoFile` upload wins over the `photoUrl` \
        field. `isWinner=true` routes through the exclusive winner path.",
    request_body(content_type = "multipart/form-data", description = "Competitor form"),
    responses(
        (status = 201, description = "Competitor created", body = CompetitorResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, form))]
pub async fn create_competitor(
    _admin: AdminToken,
    State(state): State<AppState>,
    TypedMultipart(form): TypedMultipart<CompetitorUpsertForm>,
) -> Result<impl IntoResponse, AppError> {
    let stage_name = non_blank(form.stage_name)
        .ok_or_else(|| AppError::Validation("stageName is required".into()))?;
    let city =
        non_blank(form.city).ok_or_else(|| AppError::Validation("city is required".into()))?;
    let demo_url = non_blank(form.demo_url)
        .ok_or_else(|| AppError::Validation("demoUrl is required".into()))?;
    let status = match non_blank(form.status) {
        Some(s) => parse_competitor_status(&s)?,
        None => CompetitorStatus::Approved,
    };
    let make_winner = form.is_winner.as_deref() == Some("true");
    let photo_url = resolve_photo(&state, form.photo_file, non_blank(form.photo_url)).await?;

    let txn = state.db.begin().await?;
    let row = competitor::ActiveModel {
        id: Set(Uuid::now_v7()),
        submission_id: Set(None),
        stage_name: Set(stage_name),
        city: Set(city),
        photo_url: Set(photo_url),
        demo_url: Set(demo_url),
        social_links: Set(non_blank(form.social_links)),
        artist_bio: Set(non_blank(form.artist_bio)),
        status: Set(status),
        is_winner: Set(false),
        created_at: Set(Utc::now()),
    };
    let mut created = row.insert(&txn).await?;
    if make_winner {
        created = set_exclusive_winner(&txn, created.id).await?;
    }
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CompetitorResponse::from_model(created, 0)),
    ))
}

#[utoipa::path(
    patch,
    path = "/competitors/{id}",
    tag = "Next Up Admin",
    operation_id = "updateCompetitor",
    summary = "Edit a competitor",
    description = "Replaces the posted fields. The admin form always posts the full record, so \
        blank optional fields clear their stored values; `isWinner` is a checkbox and clears \
        when unchecked. `isWinner=true` routes through the exclusive winner path.",
    params(("id" = Uuid, Path, description = "Competitor ID")),
    request_body(content_type = "multipart/form-data", description = "Competitor form"),
    responses(
        (status = 200, description = "Competitor updated", body = CompetitorResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competitor not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, form), fields(id))]
pub async fn update_competitor(
    _admin: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    TypedMultipart(form): TypedMultipart<CompetitorUpsertForm>,
) -> Result<Json<CompetitorResponse>, AppError> {
    let existing = find_competitor(&state.db, id).await?;
    let photo_url = resolve_photo(&state, form.photo_file, non_blank(form.photo_url)).await?;
    let make_winner = form.is_winner.as_deref() == Some("true");

    let txn = state.db.begin().await?;
    let mut active: competitor::ActiveModel = existing.into();
    if let Some(stage_name) = non_blank(form.stage_name) {
        active.stage_name = Set(stage_name);
    }
    if let Some(city) = non_blank(form.city) {
        active.city = Set(city);
    }
    if let Some(demo_url) = non_blank(form.demo_url) {
        active.demo_url = Set(demo_url);
    }
    if let Some(status) = non_blank(form.status) {
        active.status = Set(parse_competitor_status(&status)?);
    }
    active.photo_url = Set(photo_url);
    active.social_links = Set(non_blank(form.social_links));
    active.artist_bio = Set(non_blank(form.artist_bio));
    active.is_winner = Set(make_winner);

    let mut updated = active.update(&txn).await?;
    if make_winner {
        updated = set_exclusive_winner(&txn, id).await?;
    }
    txn.commit().await?;

    let votes = count_votes_for(&state.db, id).await?;
    Ok(Json(CompetitorResponse::from_model(updated, votes)))
}

/// Upload a posted photo, falling back to the pasted URL field.
async fn resolve_photo(
    state: &AppState,
    file: Option<FieldData<Bytes>>,
    url_field: Option<String>,
) -> Result<Option<String>, AppError> {
    let Some(file) = file.filter(|f| !f.contents.is_empty()) else {
        return Ok(url_field);
    };
    let original_name = file
        .metadata
        .file_name
        .clone()
        .unwrap_or_else(|| "photo".to_string());
    let content_type = file
        .metadata
        .content_type
        .clone()
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let key = unique_key("competitors", &original_name);
    let url = state.media.put(&key, &file.contents, &content_type).await?;
    Ok(Some(url))
}

fn parse_competitor_status(input: &str) -> Result<CompetitorStatus, AppError> {
    input
        .parse::<CompetitorStatus>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/competitors/{id}/winner",
    tag = "Next Up Admin",
    operation_id = "announceWinner",
    summary = "Announce the winner",
    description = "Clears the winner flag on every competitor, then sets it on the target and \
        forces its status to approved. At most one winner exists at any time.",
    params(("id" = Uuid, Path, description = "Competitor ID")),
    responses(
        (status = 200, description = "Winner announced", body = CompetitorResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competitor not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn announce_winner(
    _admin: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitorResponse>, AppError> {
    let txn = state.db.begin().await?;
    let updated = set_exclusive_winner(&txn, id).await?;
    txn.commit().await?;

    let votes = count_votes_for(&state.db, id).await?;
    Ok(Json(CompetitorResponse::from_model(updated, votes)))
}

#[utoipa::path(
    post,
    path = "/votes/reset",
    tag = "Next Up Admin",
    operation_id = "resetVotes",
    summary = "Delete votes",
    description = "Deletes all votes for one competitor when `competitorId` is given, or every \
        vote when it is omitted. Irreversible.",
    request_body = ResetVotesRequest,
    responses(
        (status = 200, description = "Votes deleted", body = ResetVotesResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn reset_votes(
    _admin: AdminToken,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetVotesRequest>,
) -> Result<Json<ResetVotesResponse>, AppError> {
    let mut query = vote::Entity::delete_many();
    if let Some(competitor_id) = payload.competitor_id {
        query = query.filter(vote::Column::CompetitorId.eq(competitor_id));
    }
    let result = query.exec(&state.db).await?;

    Ok(Json(ResetVotesResponse {
        deleted: result.rows_affected,
    }))
}

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Next Up Admin",
    operation_id = "getVotingSettings",
    summary = "Read the stored voting settings",
    responses(
        (status = 200, description = "Stored settings", body = SettingsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn get_settings(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let model = settings::load(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/settings",
    tag = "Next Up Admin",
    operation_id = "updateVotingSettings",
    summary = "Partially update the voting settings",
    description = "Only the supplied fields change. For `votingStartsAt`, `votingEndsAt` and \
        `liveFinalAt` an explicit `null` clears the stored value while an absent field keeps \
        it. Malformed timestamps fail the whole request.",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Stored settings after the update", body = SettingsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_settings(
    _admin: AdminToken,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let txn = state.db.begin().await?;
    let mut active: voting_settings::ActiveModel = settings::load(&txn).await?.into();

    if let Some(voting_enabled) = payload.voting_enabled {
        active.voting_enabled = Set(voting_enabled);
    }
    if let Some(voting_starts_at) = payload.voting_starts_at {
        active.voting_starts_at = Set(voting_starts_at);
    }
    if let Some(voting_ends_at) = payload.voting_ends_at {
        active.voting_ends_at = Set(voting_ends_at);
    }
    if let Some(live_final_at) = payload.live_final_at {
        active.live_final_at = Set(live_final_at);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

const SUBMISSION_COLUMNS: [&str; 13] = [
    "id",
    "stage_name",
    "legal_name",
    "email",
    "phone",
    "city",
    "demo_url",
    "social_links",
    "artist_bio",
    "status",
    "ip_address",
    "ip_hash",
    "created_at",
];

const COMPETITOR_COLUMNS: [&str; 11] = [
    "id",
    "submission_id",
    "stage_name",
    "city",
    "photo_url",
    "demo_url",
    "social_links",
    "artist_bio",
    "status",
    "is_winner",
    "created_at",
];

const VOTE_COLUMNS: [&str; 6] = [
    "id",
    "competitor_id",
    "voter_email",
    "voter_ip",
    "voter_ip_hash",
    "created_at",
];

#[utoipa::path(
    get,
    path = "/export",
    tag = "Next Up Admin",
    operation_id = "exportNextUpData",
    summary = "Download everything as CSV",
    description = "One CSV body with three titled sections: submissions, competitors and \
        votes, each newest first. Served as an attachment named for the current date.",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("admin_token" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn export_csv(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let submissions = submission::Entity::find()
        .order_by_desc(submission::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let competitors = competitor::Entity::find()
        .order_by_desc(competitor::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let votes = vote::Entity::find()
        .order_by_desc(vote::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let submission_rows = submissions
        .into_iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.stage_name,
                s.legal_name,
                s.email,
                s.phone,
                s.city,
                s.demo_url,
                s.social_links.unwrap_or_default(),
                s.artist_bio.unwrap_or_default(),
                s.status.as_str().to_string(),
                s.ip_address,
                s.ip_hash,
                s.created_at.to_rfc3339(),
            ]
        })
        .collect();
    let competitor_rows = competitors
        .into_iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.submission_id.map(|id| id.to_string()).unwrap_or_default(),
                c.stage_name,
                c.city,
                c.photo_url.unwrap_or_default(),
                c.demo_url,
                c.social_links.unwrap_or_default(),
                c.artist_bio.unwrap_or_default(),
                c.status.as_str().to_string(),
                c.is_winner.to_string(),
                c.created_at.to_rfc3339(),
            ]
        })
        .collect();
    let vote_rows = votes
        .into_iter()
        .map(|v| {
            vec![
                v.id.to_string(),
                v.competitor_id.to_string(),
                v.voter_email,
                v.voter_ip,
                v.voter_ip_hash,
                v.created_at.to_rfc3339(),
            ]
        })
        .collect();

    let sections = [
        Section {
            title: "=== NEXT UP SUBMISSIONS ===",
            header: &SUBMISSION_COLUMNS,
            rows: submission_rows,
        },
        Section {
            title: "=== NEXT UP COMPETITORS ===",
            header: &COMPETITOR_COLUMNS,
            rows: competitor_rows,
        },
        Section {
            title: "=== NEXT UP VOTES ===",
            header: &VOTE_COLUMNS,
            rows: vote_rows,
        },
    ];
    let body = render_export(&sections);
    let filename = export_filename(Utc::now().date_naive());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(body))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
