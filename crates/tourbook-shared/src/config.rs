//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub mail: MailSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Base URL used when building links that leave the server (invite mails).
    pub public_url: String,
    pub log_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
    pub continuation_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailSettings {
    /// Empty host means mails are only logged.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub queue_capacity: usize,
    pub max_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub photo_dir: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "tourbook-server")?
            .set_default("app.public_url", "http://127.0.0.1:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("jwt.access_token_expiry", crate::constants::DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default(
                "jwt.continuation_token_expiry",
                crate::constants::DEFAULT_CONTINUATION_TOKEN_EXPIRY,
            )?
            .set_default("mail.smtp_host", "")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.from", "Tourbook <no-reply@tourbook.local>")?
            .set_default("mail.queue_capacity", 1024)?
            .set_default("mail.max_attempts", 3)?
            .set_default("storage.photo_dir", "storage/activities")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
