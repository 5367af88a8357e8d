use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Bearer token for the admin API. When unset, every admin request
    /// is rejected.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Salt mixed into requester IP hashes.
    pub ip_salt: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the filesystem backend; also what `/media` serves.
    pub root: String,
    /// Base URL prepended to stored keys when building public URLs.
    pub public_base_url: String,
    /// Per-request body cap for uploads, in bytes.
    pub max_upload_size: usize,
    // The rest only applies to the s3 backend.
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Resend API key. Both fields must be set for mail to go out;
    /// otherwise sending silently no-ops.
    pub api_key: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TurnstileConfig {
    pub secret_key: Option<String>,
    pub site_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub turnstile: TurnstileConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("admin.token", None::<String>)?
            .set_default("security.ip_salt", "em-next-up-ip-salt-v1")?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.root", "./data/media")?
            .set_default("storage.public_base_url", "http://127.0.0.1:3000/media")?
            .set_default("storage.max_upload_size", 50 * 1024 * 1024)?
            .set_default("mail.api_key", None::<String>)?
            .set_default("mail.from", None::<String>)?
            .set_default("turnstile.secret_key", None::<String>)?
            .set_default("turnstile.site_key", None::<String>)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., NEXTUP__DATABASE__URL)
            .add_source(Environment::with_prefix("NEXTUP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
