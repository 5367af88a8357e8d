use std::sync::Arc;

use common::mail::Mailer;
use common::media::MediaStore;
use common::turnstile::TurnstileVerifier;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media: Arc<dyn MediaStore>,
    pub mailer: Arc<dyn Mailer>,
    pub turnstile: Arc<TurnstileVerifier>,
}
