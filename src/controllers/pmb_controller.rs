use actix_web::{HttpRequest, HttpResponse, get, put, web};
use chrono::Local;
use serde_json::Value;

use crate::{
    auth::AdminSession,
    config::AppConfig,
    controllers::{cleanup_on_error, updated, upload_target},
    error::ApiError,
    locale::{Locale, localize},
    models::pmb::{PMB_DOCUMENT, PmbConfig},
    store::JsonStore,
    uploads::{FormData, remove_upload},
    utils,
};

const BROCHURE_DIR: &str = "pmb";

#[get("/api/public/{locale}/pmb")]
pub async fn public_pmb(
    path: web::Path<String>,
    store: web::Data<JsonStore>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let pmb: PmbConfig = store.load_document(PMB_DOCUMENT).await?;

    let today = Local::now().format("%Y-%m-%d").to_string();
    let active = pmb.active_wave(&today).map(|w| localize(w, locale)).transpose()?;

    let mut data = localize(&pmb, locale)?;
    if let Value::Object(map) = &mut data {
        map.insert("activeWave".into(), active.unwrap_or(Value::Null));
    }
    Ok(HttpResponse::Ok().json(data))
}

#[get("/api/admin/pmb")]
pub async fn get_pmb(
    _admin: AdminSession,
    store: web::Data<JsonStore>,
) -> Result<HttpResponse, ApiError> {
    let pmb: PmbConfig = store.load_document(PMB_DOCUMENT).await?;
    Ok(HttpResponse::Ok().json(pmb))
}

#[put("/api/admin/pmb")]
pub async fn update_pmb(
    _admin: AdminSession,
    req: HttpRequest,
    payload: web::Payload,
    store: web::Data<JsonStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let target = upload_target(&config, BROCHURE_DIR, &["brochure"]);
    let mut form = FormData::parse(&req, payload, &target).await?;

    let result = store
        .update_document(PMB_DOCUMENT, |pmb: &mut PmbConfig| {
            let old_brochure = pmb.brochure.clone();
            pmb.merge(&form)?;
            if let Some(path) = form.file("brochure") {
                pmb.brochure = Some(path.to_string());
            } else if form.bool("brochureRemove") == Some(true) {
                pmb.brochure = None;
            }
            pmb.updated_at = Some(utils::now_rfc3339());

            let replaced = old_brochure.filter(|old| pmb.brochure.as_deref() != Some(old.as_str()));
            Ok((serde_json::to_value(&*pmb)?, replaced))
        })
        .await;
    let (data, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }

    log::info!("Pengaturan PMB diperbarui");
    Ok(updated("Pengaturan PMB berhasil disimpan".into(), data))
}
