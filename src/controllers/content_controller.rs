//! Admin CRUD and public listings for the JSON-file collections.
//!
//! One set of generic handlers serves every [`ContentRecord`]; `configure`
//! mounts them under the collection's name.

use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;

use crate::{
    auth::AdminSession,
    config::AppConfig,
    controllers::{
        CategoryQuery, cleanup_on_error, created, deleted, localize_all, updated, upload_target,
    },
    error::ApiError,
    locale::{Locale, localize},
    models::content::{ContentRecord, RecordMeta},
    store::JsonStore,
    uploads::{FormData, remove_upload},
    utils,
};

pub fn configure<T: ContentRecord>(cfg: &mut web::ServiceConfig) {
    let admin = format!("/api/admin/{}", T::COLLECTION);
    let public = format!("/api/public/{{locale}}/{}", T::COLLECTION);

    cfg.service(
        web::resource(admin.clone())
            .route(web::get().to(admin_list::<T>))
            .route(web::post().to(create::<T>)),
    )
    .service(
        web::resource(format!("{admin}/{{id}}"))
            .route(web::get().to(admin_get::<T>))
            .route(web::put().to(update::<T>))
            .route(web::delete().to(delete::<T>)),
    )
    .service(web::resource(public.clone()).route(web::get().to(public_list::<T>)))
    .service(web::resource(format!("{public}/{{slug}}")).route(web::get().to(public_detail::<T>)));
}

fn not_found<T: ContentRecord>() -> ApiError {
    ApiError::not_found(format!("{} tidak ditemukan", T::LABEL))
}

/// Records of the collection matching `category`, in display order.
async fn load_sorted<T: ContentRecord>(
    store: &JsonStore,
    category: Option<&str>,
) -> Result<Vec<T>, ApiError> {
    let mut items: Vec<T> = store.load(T::COLLECTION).await?;
    items.retain(|item| utils::matches_category(item.category(), category));
    T::sort(&mut items);
    Ok(items)
}

/// Base slug for a record: an explicit `slug` field wins over the title/name.
fn slug_base(form: &FormData, source: &str) -> Result<String, ApiError> {
    let base = utils::generate_slug(&form.opt("slug").unwrap_or_else(|| source.to_string()));
    if base.is_empty() {
        return Err(ApiError::bad_request("Slug tidak dapat dibuat dari judul tersebut"));
    }
    Ok(base)
}

fn remove_flag<T: ContentRecord>() -> String {
    format!("{}Remove", T::FILE_FIELD)
}

async fn admin_list<T: ContentRecord>(
    _admin: AdminSession,
    store: web::Data<JsonStore>,
    query: web::Query<CategoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let items: Vec<T> = load_sorted(&store, query.category.as_deref()).await?;
    Ok(HttpResponse::Ok().json(items))
}

async fn admin_get<T: ContentRecord>(
    _admin: AdminSession,
    store: web::Data<JsonStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let items: Vec<T> = store.load(T::COLLECTION).await?;
    let item = items
        .into_iter()
        .find(|item| item.meta().id == id)
        .ok_or_else(not_found::<T>)?;
    Ok(HttpResponse::Ok().json(item))
}

async fn create<T: ContentRecord>(
    _admin: AdminSession,
    req: HttpRequest,
    payload: web::Payload,
    store: web::Data<JsonStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let target = upload_target(&config, T::COLLECTION, T::FILE_FIELDS);
    let mut form = FormData::parse(&req, payload, &target).await?;

    let result = store
        .update(T::COLLECTION, |items: &mut Vec<T>| {
            let now = utils::now_rfc3339();
            let meta = RecordMeta {
                id: utils::next_timestamp_id(items.iter().map(|i| i.meta().id.as_str())),
                slug: String::new(),
                created_at: now.clone(),
                updated_at: now,
            };

            let mut record = T::from_form(meta, &form)?;
            let base = slug_base(&form, record.slug_text())?;
            record.meta_mut().slug =
                utils::unique_slug(&base, |s| items.iter().any(|i| i.meta().slug == s));
            if let Some(path) = form.file(T::FILE_FIELD) {
                record.set_attachment(Some(path.to_string()));
            }

            let data = serde_json::to_value(&record)?;
            items.push(record);
            Ok(data)
        })
        .await;
    let data = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    log::info!("{} baru dibuat: {}", T::LABEL, data["slug"]);
    Ok(created(format!("{} berhasil ditambahkan", T::LABEL), data))
}

async fn update<T: ContentRecord>(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Payload,
    store: web::Data<JsonStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let target = upload_target(&config, T::COLLECTION, T::FILE_FIELDS);
    let mut form = FormData::parse(&req, payload, &target).await?;

    let result = store
        .update(T::COLLECTION, |items: &mut Vec<T>| {
            let idx = items
                .iter()
                .position(|item| item.meta().id == id)
                .ok_or_else(not_found::<T>)?;

            let old_source = items[idx].slug_text().to_string();
            let old_attachment = items[idx].attachment().map(str::to_string);

            let record = &mut items[idx];
            record.merge(&form)?;
            if record.slug_text().trim().is_empty() {
                return Err(ApiError::bad_request(format!("{} wajib diisi", T::SLUG_SOURCE)));
            }

            let new_base = if form.opt("slug").is_some() || record.slug_text() != old_source {
                Some(slug_base(&form, record.slug_text())?)
            } else {
                None
            };

            if let Some(path) = form.file(T::FILE_FIELD) {
                record.set_attachment(Some(path.to_string()));
            } else if form.bool(&remove_flag::<T>()) == Some(true) {
                record.set_attachment(None);
            }
            record.meta_mut().updated_at = utils::now_rfc3339();

            if let Some(base) = new_base {
                let slug = utils::unique_slug(&base, |s| {
                    items
                        .iter()
                        .enumerate()
                        .any(|(j, item)| j != idx && item.meta().slug == s)
                });
                items[idx].meta_mut().slug = slug;
            }

            let replaced =
                old_attachment.filter(|old| items[idx].attachment() != Some(old.as_str()));
            Ok((serde_json::to_value(&items[idx])?, replaced))
        })
        .await;
    let (data, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }

    Ok(updated(format!("{} berhasil diperbarui", T::LABEL), data))
}

async fn delete<T: ContentRecord>(
    _admin: AdminSession,
    path: web::Path<String>,
    store: web::Data<JsonStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let attachment = store
        .update(T::COLLECTION, |items: &mut Vec<T>| {
            let idx = items
                .iter()
                .position(|item| item.meta().id == id)
                .ok_or_else(not_found::<T>)?;
            let removed = items.remove(idx);
            Ok(removed.attachment().map(str::to_string))
        })
        .await?;

    if let Some(file) = attachment {
        remove_upload(&config.upload_root, &file).await;
    }

    log::info!("{} {} dihapus", T::LABEL, id);
    Ok(deleted(format!("{} berhasil dihapus", T::LABEL), id))
}

async fn public_list<T: ContentRecord>(
    path: web::Path<String>,
    store: web::Data<JsonStore>,
    query: web::Query<CategoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let items: Vec<T> = load_sorted(&store, query.category.as_deref()).await?;
    let data: Vec<Value> = localize_all(&items, locale)?;
    Ok(HttpResponse::Ok().json(data))
}

async fn public_detail<T: ContentRecord>(
    path: web::Path<(String, String)>,
    store: web::Data<JsonStore>,
) -> Result<HttpResponse, ApiError> {
    let (locale, slug) = path.into_inner();
    let locale = Locale::from_segment(&locale)?;

    let items: Vec<T> = store.load(T::COLLECTION).await?;
    let item = items
        .iter()
        .find(|item| item.meta().slug == slug)
        .ok_or_else(not_found::<T>)?;
    Ok(HttpResponse::Ok().json(localize(item, locale)?))
}
