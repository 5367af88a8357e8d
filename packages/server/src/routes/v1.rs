use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/next-up", next_up_routes(config))
        .nest("/admin/next-up", admin_routes(config))
}

fn next_up_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let forms = OpenApiRouter::new()
        .routes(routes!(handlers::next_up::cast_vote))
        .routes(routes!(handlers::next_up::request_vote_otp))
        .routes(routes!(handlers::next_up::leaderboard))
        .routes(routes!(handlers::next_up::voting_status));

    // The demo endpoint accepts file uploads, so it gets a larger body cap.
    let uploads = OpenApiRouter::new()
        .routes(routes!(handlers::next_up::submit_demo))
        .layer(handlers::next_up::demo_upload_body_limit(
            config.storage.max_upload_size,
        ));

    forms.merge(uploads)
}

fn admin_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let json = OpenApiRouter::new()
        .routes(routes!(handlers::admin::get_stats))
        .routes(routes!(handlers::admin::list_submissions))
        .routes(routes!(handlers::admin::update_submission_status))
        .routes(routes!(handlers::admin::list_competitors))
        .routes(routes!(handlers::admin::announce_winner))
        .routes(routes!(handlers::admin::reset_votes))
        .routes(routes!(
            handlers::admin::get_settings,
            handlers::admin::update_settings
        ))
        .routes(routes!(handlers::admin::export_csv));

    let uploads = OpenApiRouter::new()
        .routes(routes!(handlers::admin::create_competitor))
        .routes(routes!(handlers::admin::update_competitor))
        .layer(handlers::admin::photo_upload_body_limit(
            config.storage.max_upload_size,
        ));

    json.merge(uploads)
}
