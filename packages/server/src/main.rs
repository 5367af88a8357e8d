use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::mail::{Mailer, NoopMailer, ResendMailer};
use common::media::MediaStore;
use common::media::filesystem::FilesystemMediaStore;
use common::media::s3::S3MediaStore;
use common::turnstile::TurnstileVerifier;
use tracing::{Level, info, warn};

use server::config::{AppConfig, StorageBackend};
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    server::seed::seed_voting_settings(&db).await?;
    server::seed::ensure_indexes(&db).await?;

    let media = build_media_store(&config).await?;
    let mailer = build_mailer(&config)?;
    let turnstile = TurnstileVerifier::new(
        config.turnstile.secret_key.clone(),
        config.turnstile.site_key.clone(),
    )?;
    if turnstile.is_enforced() {
        info!("Turnstile verification enforced for OTP requests");
    } else {
        info!("Turnstile not fully configured; OTP verification is fail-open");
    }
    if config.admin.token.is_none() {
        warn!("No admin token configured; the admin API will reject every request");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState {
        db,
        config,
        media,
        mailer,
        turnstile: Arc::new(turnstile),
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_media_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    match config.storage.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemMediaStore::new(
                PathBuf::from(&config.storage.root),
                config.storage.public_base_url.clone(),
            )
            .await?;
            info!(root = %config.storage.root, "Media stored on the local filesystem");
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let bucket = require_s3_field(config.storage.bucket.as_deref(), "storage.bucket")?;
            let region = require_s3_field(config.storage.region.as_deref(), "storage.region")?;
            let access_key =
                require_s3_field(config.storage.access_key.as_deref(), "storage.access_key")?;
            let secret_key =
                require_s3_field(config.storage.secret_key.as_deref(), "storage.secret_key")?;

            let store = S3MediaStore::new(
                bucket,
                region,
                config.storage.endpoint.as_deref(),
                access_key,
                secret_key,
                config.storage.public_base_url.clone(),
            )?;
            info!(bucket, "Media stored in S3");
            Ok(Arc::new(store))
        }
    }
}

fn require_s3_field<'a>(value: Option<&'a str>, name: &str) -> anyhow::Result<&'a str> {
    value.ok_or_else(|| anyhow::anyhow!("{name} is required for the s3 storage backend"))
}

fn build_mailer(config: &AppConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match (config.mail.api_key.clone(), config.mail.from.clone()) {
        (Some(api_key), Some(from)) => {
            info!(%from, "Transactional email via Resend");
            Ok(Arc::new(ResendMailer::new(api_key, from)?))
        }
        _ => {
            info!("Mail not configured; transactional emails are dropped");
            Ok(Arc::new(NoopMailer))
        }
    }
}
