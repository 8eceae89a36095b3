pub mod academic_controller;
pub mod auth_controller;
pub mod chat_controller;
pub mod content_controller;
pub mod faculty_controller;
pub mod leader_controller;
pub mod pmb_controller;
pub mod preview;
pub mod tuition_controller;

use std::path::Path;

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::AnyPool;

use crate::{
    config::AppConfig,
    error::ApiError,
    locale::{Locale, localize},
    uploads::{FormData, UploadTarget},
    utils,
};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

pub(crate) fn upload_target(
    config: &AppConfig,
    dir: &'static str,
    file_fields: &'static [&'static str],
) -> UploadTarget {
    UploadTarget {
        root: config.upload_root.clone(),
        dir,
        file_fields,
        max_bytes: config.max_upload_bytes,
    }
}

pub(crate) fn created(message: String, data: Value) -> HttpResponse {
    HttpResponse::Created().json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

pub(crate) fn updated(message: String, data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

pub(crate) fn deleted(message: String, id: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "id": id,
    }))
}

pub(crate) fn localize_all<T: Serialize>(items: &[T], locale: Locale) -> Result<Vec<Value>, ApiError> {
    items.iter().map(|item| localize(item, locale)).collect()
}

/// Drops the files a failed request uploaded before handing the result back.
pub(crate) async fn cleanup_on_error<T>(
    result: Result<T, ApiError>,
    form: &mut FormData,
    upload_root: &Path,
) -> Result<T, ApiError> {
    if result.is_err() {
        form.discard_uploads(upload_root).await;
    }
    result
}

/// Slug generated from `source`, suffixed until no other row of `table` uses it.
pub(crate) async fn unique_db_slug(
    pool: &AnyPool,
    table: &'static str,
    source: &str,
    exclude_id: i64,
) -> Result<String, ApiError> {
    let base = utils::generate_slug(source);
    if base.is_empty() {
        return Err(ApiError::bad_request("Slug tidak dapat dibuat dari nama tersebut"));
    }

    let taken: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT slug FROM {table} WHERE (slug = ? OR slug LIKE ?) AND id <> ?"
    ))
    .bind(&base)
    .bind(format!("{base}-%"))
    .bind(exclude_id)
    .fetch_all(pool)
    .await?;

    Ok(utils::unique_slug(&base, |s| taken.iter().any(|t| t == s)))
}
