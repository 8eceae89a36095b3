use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use sqlx::AnyPool;

use crate::{
    auth::AdminSession,
    config::AppConfig,
    db,
    controllers::{
        cleanup_on_error, created, deleted, localize_all, unique_db_slug, updated, upload_target,
    },
    error::ApiError,
    locale::{Locale, localize},
    models::faculty::{
        FACULTY_COLUMNS, Faculty, FacultyProgram, FacultyRow, PROGRAM_COLUMNS, attach_programs,
    },
    uploads::{FormData, remove_upload},
    utils::encode_list,
};

const ICON_DIR: &str = "faculties";

async fn fetch_faculties(pool: &AnyPool) -> Result<Vec<Faculty>, ApiError> {
    let rows = sqlx::query_as::<_, FacultyRow>(&format!(
        "SELECT {FACULTY_COLUMNS} FROM faculties ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?;
    let mut faculties: Vec<Faculty> = rows.into_iter().map(Faculty::from).collect();

    if !faculties.is_empty() {
        let programs = sqlx::query_as::<_, FacultyProgram>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM faculty_programs ORDER BY sort_order, id"
        ))
        .fetch_all(pool)
        .await?;
        attach_programs(&mut faculties, programs);
    }
    Ok(faculties)
}

async fn fetch_faculty(pool: &AnyPool, id: i64) -> Result<Faculty, ApiError> {
    let row = sqlx::query_as::<_, FacultyRow>(&format!(
        "SELECT {FACULTY_COLUMNS} FROM faculties WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Fakultas tidak ditemukan"))?;

    let mut faculty = Faculty::from(row);
    faculty.programs = fetch_programs(pool, id).await?;
    Ok(faculty)
}

async fn fetch_programs(pool: &AnyPool, faculty_id: i64) -> Result<Vec<FacultyProgram>, ApiError> {
    Ok(sqlx::query_as::<_, FacultyProgram>(&format!(
        "SELECT {PROGRAM_COLUMNS} FROM faculty_programs WHERE faculty_id = ? ORDER BY sort_order, id"
    ))
    .bind(faculty_id)
    .fetch_all(pool)
    .await?)
}

async fn fetch_program(pool: &AnyPool, id: i64) -> Result<FacultyProgram, ApiError> {
    sqlx::query_as::<_, FacultyProgram>(&format!(
        "SELECT {PROGRAM_COLUMNS} FROM faculty_programs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Program studi tidak ditemukan"))
}

#[get("/api/public/{locale}/faculties")]
pub async fn public_faculties(
    path: web::Path<String>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let faculties = fetch_faculties(&pool).await?;
    Ok(HttpResponse::Ok().json(localize_all(&faculties, locale)?))
}

#[get("/api/public/{locale}/faculties/{slug}")]
pub async fn public_faculty_detail(
    path: web::Path<(String, String)>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let (locale, slug) = path.into_inner();
    let locale = Locale::from_segment(&locale)?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM faculties WHERE slug = ?")
        .bind(&slug)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Fakultas tidak ditemukan"))?;

    let faculty = fetch_faculty(&pool, id).await?;
    Ok(HttpResponse::Ok().json(localize(&faculty, locale)?))
}

#[get("/api/admin/faculties")]
pub async fn list_faculties(
    _admin: AdminSession,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_faculties(&pool).await?))
}

#[get("/api/admin/faculties/{id}")]
pub async fn get_faculty(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(fetch_faculty(&pool, path.into_inner()).await?))
}

async fn insert_faculty(pool: &AnyPool, form: &FormData) -> Result<Faculty, ApiError> {
    let mut faculty = Faculty::from_form(form)?;
    if let Some(icon) = form.file("icon") {
        faculty.icon = Some(icon.to_string());
    }
    let source = form.opt("slug").unwrap_or_else(|| faculty.name.clone());
    faculty.slug = unique_db_slug(pool, "faculties", &source, 0).await?;

    let mut conn = pool.acquire().await?;
    let result = sqlx::query(
        "INSERT INTO faculties (name, name_en, slug, icon, description, description_en, \
         advantages, advantages_en, career_prospects, career_prospects_en, sort_order) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&faculty.name)
    .bind(&faculty.name_en)
    .bind(&faculty.slug)
    .bind(&faculty.icon)
    .bind(&faculty.description)
    .bind(&faculty.description_en)
    .bind(encode_list(&faculty.advantages))
    .bind(encode_list(&faculty.advantages_en))
    .bind(encode_list(&faculty.career_prospects))
    .bind(encode_list(&faculty.career_prospects_en))
    .bind(faculty.sort_order)
    .execute(&mut *conn)
    .await?;

    faculty.id = db::inserted_id(&mut conn, &result).await?;
    Ok(faculty)
}

#[post("/api/admin/faculties")]
pub async fn create_faculty(
    _admin: AdminSession,
    req: HttpRequest,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let target = upload_target(&config, ICON_DIR, &["icon"]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = insert_faculty(&pool, &form).await;
    let faculty = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    log::info!("Fakultas baru: {} ({})", faculty.name, faculty.slug);
    Ok(created("Fakultas berhasil ditambahkan".into(), serde_json::to_value(&faculty)?))
}

/// Applies `form` to faculty `id`; returns the saved faculty and the icon it replaced.
async fn save_faculty(
    pool: &AnyPool,
    id: i64,
    form: &FormData,
) -> Result<(Faculty, Option<String>), ApiError> {
    let mut faculty = fetch_faculty(pool, id).await?;
    let old_name = faculty.name.clone();
    let old_icon = faculty.icon.clone();

    faculty.merge(form)?;
    if let Some(icon) = form.file("icon") {
        faculty.icon = Some(icon.to_string());
    } else if form.bool("iconRemove") == Some(true) {
        faculty.icon = None;
    }

    if let Some(explicit) = form.opt("slug") {
        faculty.slug = unique_db_slug(pool, "faculties", &explicit, id).await?;
    } else if faculty.name != old_name {
        faculty.slug = unique_db_slug(pool, "faculties", &faculty.name, id).await?;
    }

    sqlx::query(
        "UPDATE faculties SET name = ?, name_en = ?, slug = ?, icon = ?, description = ?, \
         description_en = ?, advantages = ?, advantages_en = ?, career_prospects = ?, \
         career_prospects_en = ?, sort_order = ? WHERE id = ?",
    )
    .bind(&faculty.name)
    .bind(&faculty.name_en)
    .bind(&faculty.slug)
    .bind(&faculty.icon)
    .bind(&faculty.description)
    .bind(&faculty.description_en)
    .bind(encode_list(&faculty.advantages))
    .bind(encode_list(&faculty.advantages_en))
    .bind(encode_list(&faculty.career_prospects))
    .bind(encode_list(&faculty.career_prospects_en))
    .bind(faculty.sort_order)
    .bind(id)
    .execute(pool)
    .await?;

    let replaced = old_icon.filter(|old| faculty.icon.as_deref() != Some(old.as_str()));
    Ok((faculty, replaced))
}

#[put("/api/admin/faculties/{id}")]
pub async fn update_faculty(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let target = upload_target(&config, ICON_DIR, &["icon"]);
    let mut form = FormData::parse(&req, payload, &target).await?;
    let result = save_faculty(&pool, id, &form).await;
    let (faculty, replaced) = cleanup_on_error(result, &mut form, &config.upload_root).await?;

    // icon names are left alone, only uploaded files are deleted
    if let Some(old) = replaced {
        remove_upload(&config.upload_root, &old).await;
    }

    Ok(updated("Fakultas berhasil diperbarui".into(), serde_json::to_value(&faculty)?))
}

#[delete("/api/admin/faculties/{id}")]
pub async fn delete_faculty(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let icon: Option<String> = sqlx::query_scalar("SELECT icon FROM faculties WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Fakultas tidak ditemukan"))?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM faculty_programs WHERE faculty_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM faculties WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Fakultas tidak ditemukan"));
    }
    tx.commit().await?;

    if let Some(icon) = icon {
        remove_upload(&config.upload_root, &icon).await;
    }

    log::info!("Fakultas {} beserta program studinya dihapus", id);
    Ok(deleted("Fakultas berhasil dihapus".into(), id))
}

#[post("/api/admin/faculties/{id}/programs")]
pub async fn create_program(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let faculty_id = path.into_inner();
    // programs carry no files
    let target = upload_target(&config, ICON_DIR, &[]);
    let form = FormData::parse(&req, payload, &target).await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM faculties WHERE id = ?")
        .bind(faculty_id)
        .fetch_optional(pool.get_ref())
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Fakultas tidak ditemukan"));
    }

    let mut program = FacultyProgram::from_form(faculty_id, &form)?;
    let mut conn = pool.acquire().await?;
    let result = sqlx::query(
        "INSERT INTO faculty_programs (faculty_id, name, name_en, degree, accreditation, \
         description, description_en, sort_order) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(program.faculty_id)
    .bind(&program.name)
    .bind(&program.name_en)
    .bind(&program.degree)
    .bind(&program.accreditation)
    .bind(&program.description)
    .bind(&program.description_en)
    .bind(program.sort_order)
    .execute(&mut *conn)
    .await?;

    program.id = db::inserted_id(&mut conn, &result).await?;

    Ok(created("Program studi berhasil ditambahkan".into(), serde_json::to_value(&program)?))
}

#[put("/api/admin/faculty-programs/{id}")]
pub async fn update_program(
    _admin: AdminSession,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
    pool: web::Data<AnyPool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    // programs carry no files
    let target = upload_target(&config, ICON_DIR, &[]);
    let form = FormData::parse(&req, payload, &target).await?;

    let mut program = fetch_program(&pool, id).await?;
    program.merge(&form)?;

    sqlx::query(
        "UPDATE faculty_programs SET name = ?, name_en = ?, degree = ?, accreditation = ?, \
         description = ?, description_en = ?, sort_order = ? WHERE id = ?",
    )
    .bind(&program.name)
    .bind(&program.name_en)
    .bind(&program.degree)
    .bind(&program.accreditation)
    .bind(&program.description)
    .bind(&program.description_en)
    .bind(program.sort_order)
    .bind(id)
    .execute(pool.get_ref())
    .await?;

    Ok(updated("Program studi berhasil diperbarui".into(), serde_json::to_value(&program)?))
}

#[delete("/api/admin/faculty-programs/{id}")]
pub async fn delete_program(
    _admin: AdminSession,
    path: web::Path<i64>,
    pool: web::Data<AnyPool>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let result = sqlx::query("DELETE FROM faculty_programs WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Program studi tidak ditemukan"));
    }
    Ok(deleted("Program studi berhasil dihapus".into(), id))
}
