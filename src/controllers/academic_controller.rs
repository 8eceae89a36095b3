//! Academic calendar, academic policies and LPM legal basis.
//!
//! All three are ordered lists. Besides per-row CRUD the admin can `PUT` the
//! whole list: rows with a known `id` are updated, rows without one are
//! inserted, and rows missing from the array are deleted, in one transaction.
//! The array position becomes the row's `sortOrder`.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde_json::{Map, Value};
use sqlx::{Any, AnyPool, Transaction};

use crate::{
    auth::AdminSession,
    config::AppConfig,
    db,
    controllers::{cleanup_on_error, created, deleted, localize_all, updated, upload_target},
    error::ApiError,
    locale::Locale,
    models::academic::{
        CALENDAR_COLUMNS, CalendarEntry, DOCUMENT_COLUMNS, DocumentEntry, DocumentKind,
    },
    uploads::{FormData, remove_upload},
    utils::removed_ids,
};

const DOCUMENT_DIR: &str = "documents";
const DOCUMENT_FIELD: &str = "document";

/// Uploaded `document` file, else the removal flag, else leave as is.
fn apply_document(form: &FormData, target: &mut Option<String>) {
    if let Some(path) = form.file(DOCUMENT_FIELD) {
        *target = Some(path.to_string());
    } else if form.bool("documentRemove") == Some(true) {
        *target = None;
    }
}

fn replaced_file(old: Option<String>, new: &Option<String>) -> Option<String> {
    old.filter(|old| new.as_deref() != Some(old.as_str()))
}

/// Bulk payload entries, each with its optional `id`.
fn bulk_entries(body: Vec<Map<String, Value>>) -> Result<Vec<(Option<i64>, FormData)>, ApiError> {
    body.into_iter()
        .map(|fields| {
            let form = FormData::from_json(fields);
            Ok((form.int("id")?, form))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// calendar
// ---------------------------------------------------------------------------

fn calendar_not_found() -> ApiError {
    ApiError::not_found("Kalender akademik tidak ditemukan")
}

async fn fetch_calendar(pool: &AnyPool) -> Result<Vec<CalendarEntry>, ApiError> {
    Ok(sqlx::query_as::<_, CalendarEntry>(&format!(
        "SELECT {CALENDAR_COLUMNS} FROM academic_calendar ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?)
}

async fn fetch_calendar_entry(pool: &AnyPool, id: i64) -> Result<CalendarEntry, ApiError> {
    sqlx::query_as::<_, CalendarEntry>(&format!(
        "SELECT {CALENDAR_COLUMNS} FROM academic_calendar WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(calendar_not_found)
}

async fn insert_calendar(tx: &mut Transaction<'_, Any>, entry: &CalendarEntry) -> Result<i64, ApiError> {
    let result = sqlx::query(
        "INSERT INTO academic_calendar (academic_year, semester, activity, activity_en, \
         start_date, end_date, document_url, sort_order) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.academic_year)
    .bind(&entry.semester)
    .bind(&entry.activity)
    .bind(&entry.activity_en)
    .bind(&entry.start_date)
    .bind(&entry.end_date)
    .bind(&entry.document_url)
    .bind(entry.sort_order)
    .execute(&mut **tx)
    .await?;

    Ok(db::inserted_id(&mut **tx, &result).await?)
}

async fn update_calendar_row(tx: &mut Transaction<'_, Any>, entry: &CalendarEntry) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE academic_calendar SET academic_year = ?, semester = ?, activity = ?, \
         activity_en = ?, start_date = ?, end_date = ?, document_url = ?, sort_order = ? \
         WHERE id = ?",
    )
    .bind(&entry.academic_year)
    .bind(&entry.semester)
    .bind(&entry.activity)
    .bind(&entry.activity_en)
    .bind(&entry.start_date)
    .bind(&entry.end_date)
    .bind(&entry.document_url)
    .bind(entry.sort_order)
    .bind(entry.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[get("/api/public/{locale}/academic-calendar")]
pub async fn public_calendar(
    path: web::Path<String>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let entries = fetch_calendar(&pool).await?;
    Ok(HttpResponse::Ok().json(localize_all(&entries, locale)?))
}

#[get("/api/admin/academic-calendar")]
pub async fn list_calendar(
    _admin: AdminSession,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_calendar(&pool).await?))
}

#[get("/api/admin/academic-calendar/{id}")]
pub async fn get_calendar_entry(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_calendar_entry(&pool, path.into_inner()).await?))
}

async fn create_calendar_inner(pool: &AnyPool, form: &FormData) -> Result<CalendarEntry, ApiError> {
    let mut entry = CalendarEntry::from_form(form)?;
    apply_document(form, &mut entry.document_url);

    let mut tx = pool.begin().await?;
    if !form.contains("sortOrder") {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(sort_order) FROM academic_calendar")
            .fetch_one(&mut *tx)
            .await?;
        entry.sort_order = max.map_or(0, |m| m + 1);
    }
    entry.id = insert_calendar(&mut tx, &entry).await?;
    tx.commit().await?;
    Ok(entry)
}

#[post("/api/admin/academic-calendar")]
pub async fn create_calendar_entry(
    _admin: AdminSession,
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let target = upload_target(&config, DOCUMENT_DIR, &[DOCUMENT_FIELD]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = create_calendar_inner(&pool, &form).await;
    let entry = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    Ok(created("Kalender akademik berhasil ditambahkan".into(), serde_json::to_value(&entry)?))
}

async fn update_calendar_inner(
    pool: &AnyPool,
    id: i64,
    form: &FormData,
) -> Result<(CalendarEntry, Option<String>), ApiError> {
    let mut entry = fetch_calendar_entry(pool, id).await?;
    let old_document = entry.document_url.clone();
    entry.merge(form)?;
    apply_document(form, &mut entry.document_url);

    let mut tx = pool.begin().await?;
    update_calendar_row(&mut tx, &entry).await?;
    tx.commit().await?;

    let replaced = replaced_file(old_document, &entry.document_url);
    Ok((entry, replaced))
}

#[put("/api/admin/academic-calendar/{id}")]
pub async fn update_calendar_entry(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let target = upload_target(&config, DOCUMENT_DIR, &[DOCUMENT_FIELD]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = update_calendar_inner(&pool, id, &form).await;
    let (entry, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }
    Ok(updated("Kalender akademik berhasil diperbarui".into(), serde_json::to_value(&entry)?))
}

#[delete("/api/admin/academic-calendar/{id}")]
pub async fn delete_calendar_entry(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let entry = fetch_calendar_entry(&pool, id).await?;

    sqlx::query("DELETE FROM academic_calendar WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    if let Some(document) = entry.document_url {
        remove_upload(&config.upload_root, &document).await;
    }
    Ok(deleted("Kalender akademik berhasil dihapus".into(), id))
}

#[put("/api/admin/academic-calendar")]
pub async fn replace_calendar(
    _admin: AdminSession,
    body: web::Json<Vec<Map<String, Value>>>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let entries = bulk_entries(body.into_inner())?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, CalendarEntry>(&format!(
        "SELECT {CALENDAR_COLUMNS} FROM academic_calendar"
    ))
    .fetch_all(&mut *tx)
    .await?;

    let mut kept = Vec::with_capacity(entries.len());
    for (position, (id, form)) in entries.into_iter().enumerate() {
        let mut entry = match id {
            Some(id) => {
                let mut entry = existing
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .ok_or_else(|| {
                        ApiError::not_found(format!("Kalender akademik dengan id {id} tidak ditemukan"))
                    })?;
                entry.merge(&form)?;
                entry
            }
            None => CalendarEntry::from_form(&form)?,
        };
        entry.sort_order = position as i64;

        if id.is_some() {
            update_calendar_row(&mut tx, &entry).await?;
        } else {
            entry.id = insert_calendar(&mut tx, &entry).await?;
        }
        kept.push(entry.id);
    }

    let existing_ids: Vec<i64> = existing.iter().map(|e| e.id).collect();
    let removed = removed_ids(&existing_ids, &kept);
    for id in &removed {
        sqlx::query("DELETE FROM academic_calendar WHERE id = ?")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    for entry in existing.iter().filter(|e| removed.contains(&e.id)) {
        if let Some(document) = &entry.document_url {
            remove_upload(&config.upload_root, document).await;
        }
    }

    log::info!(
        "Kalender akademik disimpan: {} baris, {} dihapus",
        kept.len(),
        removed.len()
    );
    let data = fetch_calendar(&pool).await?;
    Ok(updated("Kalender akademik berhasil disimpan".into(), serde_json::to_value(&data)?))
}

// ---------------------------------------------------------------------------
// academic policies / LPM legal basis
// ---------------------------------------------------------------------------

fn document_not_found(kind: DocumentKind) -> ApiError {
    ApiError::not_found(format!("{} tidak ditemukan", kind.label()))
}

async fn fetch_documents(pool: &AnyPool, kind: DocumentKind) -> Result<Vec<DocumentEntry>, ApiError> {
    Ok(sqlx::query_as::<_, DocumentEntry>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM {} ORDER BY sort_order, id",
        kind.table()
    ))
    .fetch_all(pool)
    .await?)
}

async fn fetch_document(pool: &AnyPool, kind: DocumentKind, id: i64) -> Result<DocumentEntry, ApiError> {
    sqlx::query_as::<_, DocumentEntry>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM {} WHERE id = ?",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| document_not_found(kind))
}

async fn insert_document(
    tx: &mut Transaction<'_, Any>,
    kind: DocumentKind,
    entry: &DocumentEntry,
) -> Result<i64, ApiError> {
    let result = sqlx::query(&format!(
        "INSERT INTO {} (title, title_en, description, description_en, document_url, sort_order) \
         VALUES (?, ?, ?, ?, ?, ?)",
        kind.table()
    ))
    .bind(&entry.title)
    .bind(&entry.title_en)
    .bind(&entry.description)
    .bind(&entry.description_en)
    .bind(&entry.document_url)
    .bind(entry.sort_order)
    .execute(&mut **tx)
    .await?;

    Ok(db::inserted_id(&mut **tx, &result).await?)
}

async fn update_document_row(
    tx: &mut Transaction<'_, Any>,
    kind: DocumentKind,
    entry: &DocumentEntry,
) -> Result<(), ApiError> {
    sqlx::query(&format!(
        "UPDATE {} SET title = ?, title_en = ?, description = ?, description_en = ?, \
         document_url = ?, sort_order = ? WHERE id = ?",
        kind.table()
    ))
    .bind(&entry.title)
    .bind(&entry.title_en)
    .bind(&entry.description)
    .bind(&entry.description_en)
    .bind(&entry.document_url)
    .bind(entry.sort_order)
    .bind(entry.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[get("/api/public/{locale}/{kind:academic-policies|lpm-legal-basis}")]
pub async fn public_documents(
    path: web::Path<(String, String)>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let (locale, kind) = path.into_inner();
    let locale = Locale::from_segment(&locale)?;
    let kind = DocumentKind::from_segment(&kind)?;

    let entries = fetch_documents(&pool, kind).await?;
    Ok(HttpResponse::Ok().json(localize_all(&entries, locale)?))
}

#[get("/api/admin/{kind:academic-policies|lpm-legal-basis}")]
pub async fn list_documents(
    _admin: AdminSession,
    path: web::Path<String>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let kind = DocumentKind::from_segment(&path)?;
    Ok(HttpResponse::Ok().json(fetch_documents(&pool, kind).await?))
}

#[get("/api/admin/{kind:academic-policies|lpm-legal-basis}/{id}")]
pub async fn get_document(
    _admin: AdminSession,
    path: web::Path<(String, i64)>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = DocumentKind::from_segment(&kind)?;
    Ok(HttpResponse::Ok().json(fetch_document(&pool, kind, id).await?))
}

async fn create_document_inner(
    pool: &AnyPool,
    kind: DocumentKind,
    form: &FormData,
) -> Result<DocumentEntry, ApiError> {
    let mut entry = DocumentEntry::from_form(form)?;
    apply_document(form, &mut entry.document_url);

    let mut tx = pool.begin().await?;
    if !form.contains("sortOrder") {
        let max: Option<i64> =
            sqlx::query_scalar(&format!("SELECT MAX(sort_order) FROM {}", kind.table()))
                .fetch_one(&mut *tx)
                .await?;
        entry.sort_order = max.map_or(0, |m| m + 1);
    }
    entry.id = insert_document(&mut tx, kind, &entry).await?;
    tx.commit().await?;
    Ok(entry)
}

#[post("/api/admin/{kind:academic-policies|lpm-legal-basis}")]
pub async fn create_document(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let kind = DocumentKind::from_segment(&path)?;
    let target = upload_target(&config, DOCUMENT_DIR, &[DOCUMENT_FIELD]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = create_document_inner(&pool, kind, &form).await;
    let entry = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    Ok(created(
        format!("{} berhasil ditambahkan", kind.label()),
        serde_json::to_value(&entry)?,
    ))
}

async fn update_document_inner(
    pool: &AnyPool,
    kind: DocumentKind,
    id: i64,
    form: &FormData,
) -> Result<(DocumentEntry, Option<String>), ApiError> {
    let mut entry = fetch_document(pool, kind, id).await?;
    let old_document = entry.document_url.clone();
    entry.merge(form)?;
    apply_document(form, &mut entry.document_url);

    let mut tx = pool.begin().await?;
    update_document_row(&mut tx, kind, &entry).await?;
    tx.commit().await?;

    let replaced = replaced_file(old_document, &entry.document_url);
    Ok((entry, replaced))
}

#[put("/api/admin/{kind:academic-policies|lpm-legal-basis}/{id}")]
pub async fn update_document(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<(String, i64)>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = DocumentKind::from_segment(&kind)?;
    let target = upload_target(&config, DOCUMENT_DIR, &[DOCUMENT_FIELD]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = update_document_inner(&pool, kind, id, &form).await;
    let (entry, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }
    Ok(updated(
        format!("{} berhasil diperbarui", kind.label()),
        serde_json::to_value(&entry)?,
    ))
}

#[delete("/api/admin/{kind:academic-policies|lpm-legal-basis}/{id}")]
pub async fn delete_document(
    _admin: AdminSession,
    path: web::Path<(String, i64)>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = DocumentKind::from_segment(&kind)?;
    let entry = fetch_document(&pool, kind, id).await?;

    sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    if let Some(document) = entry.document_url {
        remove_upload(&config.upload_root, &document).await;
    }
    Ok(deleted(format!("{} berhasil dihapus", kind.label()), id))
}

#[put("/api/admin/{kind:academic-policies|lpm-legal-basis}")]
pub async fn replace_documents(
    _admin: AdminSession,
    path: web::Path<String>,
    body: web::Json<Vec<Map<String, Value>>>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let kind = DocumentKind::from_segment(&path)?;
    let entries = bulk_entries(body.into_inner())?;
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, DocumentEntry>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM {}",
        kind.table()
    ))
    .fetch_all(&mut *tx)
    .await?;

    let mut kept = Vec::with_capacity(entries.len());
    for (position, (id, form)) in entries.into_iter().enumerate() {
        let mut entry = match id {
            Some(id) => {
                let mut entry = existing
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .ok_or_else(|| {
                        ApiError::not_found(format!("{} dengan id {id} tidak ditemukan", kind.label()))
                    })?;
                entry.merge(&form)?;
                entry
            }
            None => DocumentEntry::from_form(&form)?,
        };
        entry.sort_order = position as i64;

        if id.is_some() {
            update_document_row(&mut tx, kind, &entry).await?;
        } else {
            entry.id = insert_document(&mut tx, kind, &entry).await?;
        }
        kept.push(entry.id);
    }

    let existing_ids: Vec<i64> = existing.iter().map(|e| e.id).collect();
    let removed = removed_ids(&existing_ids, &kept);
    for id in &removed {
        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    for entry in existing.iter().filter(|e| removed.contains(&e.id)) {
        if let Some(document) = &entry.document_url {
            remove_upload(&config.upload_root, document).await;
        }
    }

    log::info!(
        "{} disimpan: {} baris, {} dihapus",
        kind.label(),
        kept.len(),
        removed.len()
    );
    let data = fetch_documents(&pool, kind).await?;
    Ok(updated(
        format!("{} berhasil disimpan", kind.label()),
        serde_json::to_value(&data)?,
    ))
}
