use std::{env, fmt::Display, path::PathBuf, str::FromStr};

/// Runtime configuration, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: String,
    pub data_dir: PathBuf,
    pub upload_root: PathBuf,
    pub admin_pin: Option<String>,
    pub admin_pin_hash: Option<String>,
    pub jwt_secret: String,
    pub session_hours: i64,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} wajib diisi")]
    Missing(&'static str),
    #[error("nilai {key} tidak valid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_pin = optional("ADMIN_PIN");
        let admin_pin_hash = optional("ADMIN_PIN_HASH");
        if admin_pin.is_none() && admin_pin_hash.is_none() {
            log::warn!("ADMIN_PIN dan ADMIN_PIN_HASH kosong, login admin tidak akan berhasil");
        }

        let max_upload_mb: usize = parse_or("MAX_UPLOAD_MB", "10")?;

        Ok(Self {
            bind_addr: parse_or("BIND_ADDR", "127.0.0.1")?,
            port: parse_or("PORT", "8000")?,
            database_url: required("DATABASE_URL")?,
            data_dir: parse_or("DATA_DIR", "data")?,
            upload_root: parse_or("UPLOAD_ROOT", "uploads")?,
            admin_pin,
            admin_pin_hash,
            jwt_secret: required("JWT_SECRET")?,
            session_hours: parse_or("SESSION_HOURS", "8")?,
            cors_origin: parse_or("CORS_ORIGIN", "http://localhost:3000")?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        log::info!("{key} tidak diset, memakai default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
