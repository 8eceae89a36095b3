use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use sqlx::AnyPool;

use crate::{
    auth::AdminSession,
    config::AppConfig,
    db,
    controllers::{
        CategoryQuery, cleanup_on_error, created, deleted, localize_all, unique_db_slug, updated,
        upload_target,
    },
    error::ApiError,
    locale::{Locale, localize},
    models::leader::{LEADER_COLUMNS, Leader, LeaderCategory, LeaderRow, sort_leaders},
    uploads::{FormData, remove_upload},
    utils::encode_list,
};

const IMAGE_DIR: &str = "leaders";

fn not_found() -> ApiError {
    ApiError::not_found("Data pimpinan tidak ditemukan")
}

/// Leaders in display order, optionally only one category.
async fn fetch_leaders(pool: &AnyPool, category: Option<&str>) -> Result<Vec<Leader>, ApiError> {
    let rows = sqlx::query_as::<_, LeaderRow>(&format!("SELECT {LEADER_COLUMNS} FROM leaders"))
        .fetch_all(pool)
        .await?;

    let wanted = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| (LeaderCategory::from_label(c), c.to_lowercase()));

    let mut leaders: Vec<Leader> = rows
        .into_iter()
        .map(Leader::from)
        .filter(|leader| match &wanted {
            None => true,
            // free-form labels are compared by text, known tiers by rank
            Some((LeaderCategory::Lainnya, label)) => leader.category.to_lowercase() == *label,
            Some((rank, _)) => leader.rank() == *rank,
        })
        .collect();
    sort_leaders(&mut leaders);
    Ok(leaders)
}

async fn fetch_leader(pool: &AnyPool, id: i64) -> Result<Leader, ApiError> {
    let row = sqlx::query_as::<_, LeaderRow>(&format!("SELECT {LEADER_COLUMNS} FROM leaders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)?;
    Ok(row.into())
}

#[get("/api/public/{locale}/leaders")]
pub async fn public_leaders(
    path: web::Path<String>,
    query: web::Query<CategoryQuery>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let leaders = fetch_leaders(&pool, query.category.as_deref()).await?;
    Ok(HttpResponse::Ok().json(localize_all(&leaders, locale)?))
}

#[get("/api/public/{locale}/leaders/{slug}")]
pub async fn public_leader_detail(
    path: web::Path<(String, String)>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let (locale, slug) = path.into_inner();
    let locale = Locale::from_segment(&locale)?;

    let row = sqlx::query_as::<_, LeaderRow>(&format!("SELECT {LEADER_COLUMNS} FROM leaders WHERE slug = ?"))
        .bind(&slug)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(localize(&Leader::from(row), locale)?))
}

#[get("/api/admin/leaders")]
pub async fn list_leaders(
    _admin: AdminSession,
    query: web::Query<CategoryQuery>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_leaders(&pool, query.category.as_deref()).await?))
}

#[get("/api/admin/leaders/{id}")]
pub async fn get_leader(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_leader(&pool, path.into_inner()).await?))
}

async fn insert_leader(pool: &AnyPool, form: &FormData) -> Result<Leader, ApiError> {
    let mut leader = Leader::from_form(form)?;
    if let Some(image) = form.file("image") {
        leader.image = Some(image.to_string());
    }
    let source = form.opt("slug").unwrap_or_else(|| leader.name.clone());
    leader.slug = unique_db_slug(pool, "leaders", &source, 0).await?;

    let mut conn = pool.acquire().await?;
    let result = sqlx::query(
        "INSERT INTO leaders (slug, name, title, title_en, category, education, career, research, \
         bio, bio_en, image, sort_order) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&leader.slug)
    .bind(&leader.name)
    .bind(&leader.title)
    .bind(&leader.title_en)
    .bind(&leader.category)
    .bind(encode_list(&leader.education))
    .bind(encode_list(&leader.career))
    .bind(encode_list(&leader.research))
    .bind(&leader.bio)
    .bind(&leader.bio_en)
    .bind(&leader.image)
    .bind(leader.sort_order)
    .execute(&mut *conn)
    .await?;

    leader.id = db::inserted_id(&mut conn, &result).await?;
    Ok(leader)
}

#[post("/api/admin/leaders")]
pub async fn create_leader(
    _admin: AdminSession,
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let target = upload_target(&config, IMAGE_DIR, &["image"]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = insert_leader(&pool, &form).await;
    let leader = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    log::info!("Pimpinan baru: {} ({})", leader.name, leader.category);
    Ok(created("Data pimpinan berhasil ditambahkan".into(), serde_json::to_value(&leader)?))
}

async fn save_leader(
    pool: &AnyPool,
    id: i64,
    form: &FormData,
) -> Result<(Leader, Option<String>), ApiError> {
    let mut leader = fetch_leader(pool, id).await?;
    let old_name = leader.name.clone();
    let old_image = leader.image.clone();

    leader.merge(form)?;
    if let Some(image) = form.file("image") {
        leader.image = Some(image.to_string());
    } else if form.bool("imageRemove") == Some(true) {
        leader.image = None;
    }

    if let Some(explicit) = form.opt("slug") {
        leader.slug = unique_db_slug(pool, "leaders", &explicit, id).await?;
    } else if leader.name != old_name {
        leader.slug = unique_db_slug(pool, "leaders", &leader.name, id).await?;
    }

    sqlx::query(
        "UPDATE leaders SET slug = ?, name = ?, title = ?, title_en = ?, category = ?, \
         education = ?, career = ?, research = ?, bio = ?, bio_en = ?, image = ?, sort_order = ? \
         WHERE id = ?",
    )
    .bind(&leader.slug)
    .bind(&leader.name)
    .bind(&leader.title)
    .bind(&leader.title_en)
    .bind(&leader.category)
    .bind(encode_list(&leader.education))
    .bind(encode_list(&leader.career))
    .bind(encode_list(&leader.research))
    .bind(&leader.bio)
    .bind(&leader.bio_en)
    .bind(&leader.image)
    .bind(leader.sort_order)
    .bind(id)
    .execute(pool)
    .await?;

    let replaced = old_image.filter(|old| leader.image.as_deref() != Some(old.as_str()));
    Ok((leader, replaced))
}

#[put("/api/admin/leaders/{id}")]
pub async fn update_leader(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let target = upload_target(&config, IMAGE_DIR, &["image"]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = save_leader(&pool, id, &form).await;
    let (leader, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }

    Ok(updated("Data pimpinan berhasil diperbarui".into(), serde_json::to_value(&leader)?))
}

#[delete("/api/admin/leaders/{id}")]
pub async fn delete_leader(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let leader = fetch_leader(&pool, id).await?;

    let result = sqlx::query("DELETE FROM leaders WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    if let Some(image) = leader.image {
        remove_upload(&config.upload_root, &image).await;
    }

    log::info!("Pimpinan {} ({}) dihapus", leader.name, id);
    Ok(deleted("Data pimpinan berhasil dihapus".into(), id))
}
