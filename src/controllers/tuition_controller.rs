use actix_web::{HttpResponse, get, web};
use serde::Deserialize;

use crate::{
    controllers::localize_all, error::ApiError, locale::Locale, static_data::find_tuition,
};

#[derive(Debug, Deserialize)]
pub struct TuitionQuery {
    pub faculty: Option<String>,
    pub degree: Option<String>,
}

#[get("/api/public/{locale}/tuition")]
pub async fn public_tuition(
    path: web::Path<String>,
    query: web::Query<TuitionQuery>,
) -> Result<HttpResponse, ApiError> {
    let locale = Locale::from_segment(&path)?;
    let fees = find_tuition(query.faculty.as_deref(), query.degree.as_deref());
    Ok(HttpResponse::Ok().json(localize_all(&fees, locale)?))
}
