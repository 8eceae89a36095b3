use actix_web::{
    HttpResponse, Responder, get,
    cookie::{Cookie, SameSite, time::Duration},
    post, web,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{self, AdminSession, SESSION_COOKIE},
    config::AppConfig,
    error::ApiError,
};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub pin: String,
}

fn session_cookie(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

#[post("/api/admin/login")]
pub async fn login(
    payload: web::Json<LoginRequest>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    if !auth::verify_pin(&payload.pin, &config)? {
        log::warn!("Percobaan login admin dengan PIN salah");
        return Err(ApiError::Unauthorized("PIN salah".into()));
    }

    let token = auth::generate_jwt(&config)?;
    let cookie = session_cookie(token.clone(), Duration::hours(config.session_hours));

    log::info!("Admin login");
    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Berhasil login",
        "token": token,
    })))
}

#[post("/api/admin/logout")]
pub async fn logout() -> impl Responder {
    // must match the login cookie attributes to be cleared
    let cookie = session_cookie(String::new(), Duration::seconds(0));

    HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Berhasil logout",
    }))
}

#[get("/api/admin/session")]
pub async fn session(admin: AdminSession) -> impl Responder {
    let AdminSession(claims) = admin;
    HttpResponse::Ok().json(json!({
        "success": true,
        "authenticated": true,
        "expiresAt": claims.exp,
    }))
}
