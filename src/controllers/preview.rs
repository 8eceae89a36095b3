use std::ffi::OsStr;

use actix_files::NamedFile;
use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use percent_encoding::percent_decode_str;

use crate::{
    config::AppConfig,
    error::ApiError,
    uploads::{PUBLIC_PREFIX, to_fs_path},
};

/// Serves an uploaded file inline (PDF viewers, images) instead of as a download.
#[get("/preview/{tail:.*}")]
pub async fn preview(
    tail: web::Path<String>,
    config: web::Data<AppConfig>,
) -> Result<NamedFile, ApiError> {
    let decoded = percent_decode_str(&tail).decode_utf8_lossy().to_string();
    if decoded.contains('\\') {
        return Err(ApiError::bad_request("Path tidak valid"));
    }

    let full_path = to_fs_path(&config.upload_root, &format!("{PUBLIC_PREFIX}{decoded}"))
        .ok_or_else(|| ApiError::bad_request("Path tidak valid"))?;
    if !full_path.is_file() {
        return Err(ApiError::not_found("File tidak ditemukan"));
    }

    let ct = mime_guess::from_path(&full_path).first_or_octet_stream();
    let filename = full_path
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("file")
        .to_string();

    let file = NamedFile::open_async(&full_path)
        .await?
        .set_content_type(ct)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(filename)],
        });
    Ok(file)
}
