use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError};

pub const SESSION_COOKIE: &str = "admin_token";
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn generate_jwt(config: &AppConfig) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(config.session_hours)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        log::error!("Gagal menghasilkan JWT: {:?}", e);
        ApiError::Internal("Gagal menghasilkan token".into())
    })
}

pub fn decode_jwt(token: &str, config: &AppConfig) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        log::warn!("JWT verification failed: {:?}", e);
        ApiError::Unauthorized("Sesi tidak valid atau sudah berakhir".into())
    })?;

    if data.claims.sub != ADMIN_SUBJECT {
        return Err(ApiError::Unauthorized("Sesi tidak valid".into()));
    }
    Ok(data.claims)
}

/// Token from the session cookie, falling back to `Authorization: Bearer`.
fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn verify_jwt(req: &HttpRequest) -> Result<Claims, ApiError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| ApiError::Internal("AppConfig belum terdaftar".into()))?;

    let token = token_from_request(req).ok_or_else(|| {
        log::warn!("No admin token found in request to {}", req.path());
        ApiError::Unauthorized("Token tidak ditemukan".into())
    })?;

    decode_jwt(&token, config)
}

/// Checks a login PIN. A bcrypt hash in the config takes precedence over a plain PIN.
pub fn verify_pin(pin: &str, config: &AppConfig) -> Result<bool, ApiError> {
    let pin = pin.trim();
    if pin.is_empty() {
        return Ok(false);
    }

    if let Some(hash) = &config.admin_pin_hash {
        return bcrypt::verify(pin, hash).map_err(|e| {
            log::error!("bcrypt verify: {:?}", e);
            ApiError::Internal("Verify error".into())
        });
    }

    Ok(config
        .admin_pin
        .as_deref()
        .is_some_and(|expected| constant_time_eq(expected.as_bytes(), pin.as_bytes())))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor guarding admin handlers.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl FromRequest for AdminSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(verify_jwt(req).map(AdminSession))
    }
}
