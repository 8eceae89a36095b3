//! Admin request bodies (multipart or JSON) and upload storage.

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use actix_multipart::{Field, Multipart};
use actix_web::{HttpRequest, http::header, web};
use bytes::BytesMut;
use futures_util::{StreamExt, TryStreamExt};
use sanitize_filename::sanitize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{error::ApiError, utils};

pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Body limit for JSON and urlencoded admin payloads.
pub const JSON_LIMIT: usize = 2 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg", "pdf"];

/// Where uploaded files of one request go.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub root: PathBuf,
    pub dir: &'static str,
    /// Multipart fields that may carry a file. Files under any other name are rejected.
    pub file_fields: &'static [&'static str],
    pub max_bytes: usize,
}

/// Parsed admin payload: text/JSON fields plus files already written to disk.
#[derive(Debug, Default)]
pub struct FormData {
    fields: Map<String, Value>,
    files: HashMap<String, String>,
}

impl FormData {
    pub fn from_json(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            files: HashMap::new(),
        }
    }

    /// Reads the body as multipart or urlencoded form when the content type
    /// says so, JSON otherwise.
    pub async fn parse(
        req: &HttpRequest,
        payload: web::Payload,
        target: &UploadTarget,
    ) -> Result<Self, ApiError> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::new(req.headers(), payload);
            Self::read_multipart(multipart, target).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let body = read_body(payload, JSON_LIMIT).await?;
            Self::from_urlencoded(&body)
        } else {
            let body = read_body(payload, JSON_LIMIT).await?;
            Self::from_json_body(&body)
        }
    }

    /// Form fields decoded like multipart text fields: trimmed, `"null"` as empty.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ApiError::bad_request(format!("Form error: {e}")))?;

        let mut form = Self::default();
        for (name, val) in pairs {
            form.insert_text(name, &val);
        }
        Ok(form)
    }

    fn insert_text(&mut self, name: String, val: &str) {
        let val = val.trim();
        let val = if val.eq_ignore_ascii_case("null") { "" } else { val };
        self.fields.insert(name, Value::String(val.to_string()));
    }

    fn from_json_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self::from_json(fields)),
            Ok(_) => Err(ApiError::bad_request("Payload JSON harus berupa objek")),
            Err(e) => Err(ApiError::bad_request(format!("Payload error: {e}"))),
        }
    }

    async fn read_multipart(mut multipart: Multipart, target: &UploadTarget) -> Result<Self, ApiError> {
        let mut form = Self::default();

        let result: Result<(), ApiError> = async {
            while let Some(mut field) = multipart.try_next().await? {
                let name = field.name().unwrap_or_default().to_string();
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::trim)
                    .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("null"))
                    .map(str::to_string);

                if let Some(filename) = filename {
                    if !target.file_fields.contains(&name.as_str()) {
                        return Err(ApiError::bad_request(format!(
                            "Field {name} tidak menerima file"
                        )));
                    }
                    let stored = save_field(field, target, &filename).await?;
                    if let Some(old) = form.files.insert(name, stored) {
                        remove_upload(&target.root, &old).await;
                    }
                    continue;
                }

                let mut data = BytesMut::new();
                while let Some(chunk) = field.try_next().await? {
                    if data.len() + chunk.len() > target.max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!("{name} terlalu besar")));
                    }
                    data.extend_from_slice(&chunk);
                }

                let val = String::from_utf8(data.to_vec())
                    .map_err(|_| ApiError::bad_request(format!("{name} bukan UTF-8 valid")))?;
                form.insert_text(name, &val);
            }
            Ok::<(), ApiError>(())
        }
        .await;

        match result {
            Ok(()) => Ok(form),
            Err(e) => {
                form.discard_uploads(&target.root).await;
                Err(e)
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Text value of `key`, trimmed. Numbers and booleans are stringified.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => Some(String::new()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn required(&self, key: &str) -> Result<String, ApiError> {
        self.text(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("{key} wajib diisi")))
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>, ApiError> {
        match self.text(key) {
            None => Ok(None),
            Some(v) if v.is_empty() => Ok(None),
            Some(v) => v
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("{key} harus angka"))),
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64() != Some(0)),
            Value::String(s) => Some(matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes" | "ya"
            )),
            _ => None,
        }
    }

    /// List value: a JSON array, a JSON-encoded array string or one item per line.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.fields.get(key)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            Value::String(s) => Some(utils::decode_list(Some(s))),
            Value::Null => Some(Vec::new()),
            other => Some(vec![other.to_string()]),
        }
    }

    /// Structured value: native JSON, or a JSON-encoded string from multipart.
    pub fn json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        let value = match self.fields.get(key) {
            None => return Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s)
                .map_err(|e| ApiError::bad_request(format!("{key} tidak valid: {e}")))?,
            Some(v) => v.clone(),
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::bad_request(format!("{key} tidak valid: {e}")))
    }

    pub fn merge_text(&self, key: &str, target: &mut String) {
        if let Some(v) = self.text(key) {
            *target = v;
        }
    }

    /// Empty input clears the optional field.
    pub fn merge_opt(&self, key: &str, target: &mut Option<String>) {
        if let Some(v) = self.text(key) {
            *target = if v.is_empty() { None } else { Some(v) };
        }
    }

    pub fn merge_list(&self, key: &str, target: &mut Vec<String>) {
        if let Some(v) = self.list(key) {
            *target = v;
        }
    }

    pub fn opt(&self, key: &str) -> Option<String> {
        self.text(key).filter(|v| !v.is_empty())
    }

    /// Stored public path of an uploaded file field.
    pub fn file(&self, key: &str) -> Option<&str> {
        self.files.get(key).map(String::as_str)
    }

    pub fn take_file(&mut self, key: &str) -> Option<String> {
        self.files.remove(key)
    }

    /// Deletes every file this request wrote. Used when the request fails after parsing.
    pub async fn discard_uploads(&mut self, root: &Path) {
        for (_, stored) in self.files.drain() {
            remove_upload(root, &stored).await;
        }
    }
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<BytesMut, ApiError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge("Payload terlalu besar".into()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn allowed_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

async fn save_field(
    mut field: Field,
    target: &UploadTarget,
    original_filename: &str,
) -> Result<String, ApiError> {
    let ext = allowed_extension(original_filename).ok_or_else(|| {
        ApiError::bad_request(format!("Tipe file {original_filename} tidak diizinkan"))
    })?;

    let dir = target.root.join(target.dir);
    tokio::fs::create_dir_all(&dir).await?;

    let stem = Path::new(&sanitize(original_filename))
        .file_stem()
        .and_then(|s| s.to_str())
        .map(utils::generate_slug)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "file".to_string());
    let filename = format!("{stem}_{}.{ext}", Uuid::new_v4().simple());
    let filepath = dir.join(&filename);

    if let Err(e) = write_field(&mut field, &filepath, target.max_bytes).await {
        // partial file
        let _ = tokio::fs::remove_file(&filepath).await;
        return Err(match e {
            ApiError::PayloadTooLarge(_) => ApiError::PayloadTooLarge(format!(
                "File {original_filename} melebihi batas {} MB",
                target.max_bytes / (1024 * 1024)
            )),
            other => other,
        });
    }

    Ok(format!("{PUBLIC_PREFIX}{}/{filename}", target.dir))
}

async fn write_field(field: &mut Field, filepath: &Path, max_bytes: usize) -> Result<(), ApiError> {
    let mut f = tokio::fs::File::create(filepath).await?;
    let mut written = 0usize;
    while let Some(chunk) = field.try_next().await? {
        written += chunk.len();
        if written > max_bytes {
            return Err(ApiError::PayloadTooLarge(String::new()));
        }
        f.write_all(&chunk).await?;
    }
    f.flush().await?;
    Ok(())
}

/// Maps a stored public path (`/uploads/...`) back to the filesystem,
/// rejecting anything that would leave the upload root.
pub fn to_fs_path(root: &Path, stored: &str) -> Option<PathBuf> {
    let rel = stored
        .trim_start_matches('/')
        .strip_prefix(PUBLIC_PREFIX.trim_start_matches('/'))?;
    let rel = Path::new(rel);
    if rel.as_os_str().is_empty() || rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join(rel))
}

pub async fn remove_upload(root: &Path, stored: &str) {
    let Some(path) = to_fs_path(root, stored) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Gagal menghapus file {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> FormData {
        match value {
            Value::Object(map) => FormData::from_json(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn merge_only_touches_present_keys() {
        let f = form(json!({ "title": "Baru", "titleEn": "" }));
        let mut title = "Lama".to_string();
        let mut title_en = Some("Old".to_string());
        let mut location = "Aula".to_string();

        f.merge_text("title", &mut title);
        f.merge_opt("titleEn", &mut title_en);
        f.merge_text("location", &mut location);

        assert_eq!(title, "Baru");
        assert_eq!(title_en, None);
        assert_eq!(location, "Aula");
    }

    #[test]
    fn list_accepts_every_input_shape() {
        let f = form(json!({
            "a": ["satu", " dua ", ""],
            "b": "[\"tiga\"]",
            "c": "empat\nlima",
        }));
        assert_eq!(f.list("a").unwrap(), vec!["satu", "dua"]);
        assert_eq!(f.list("b").unwrap(), vec!["tiga"]);
        assert_eq!(f.list("c").unwrap(), vec!["empat", "lima"]);
        assert!(f.list("d").is_none());
    }

    #[test]
    fn required_rejects_blank() {
        let f = form(json!({ "title": "   " }));
        assert!(matches!(f.required("title"), Err(ApiError::BadRequest(_))));
        assert!(f.required("name").is_err());
    }

    #[test]
    fn numbers_and_flags() {
        let f = form(json!({ "year": 2024, "sortOrder": "x", "isOpen": "true", "flag": 0 }));
        assert_eq!(f.int("year").unwrap(), Some(2024));
        assert!(f.int("sortOrder").is_err());
        assert_eq!(f.bool("isOpen"), Some(true));
        assert_eq!(f.bool("flag"), Some(false));
    }

    #[test]
    fn urlencoded_fields_read_like_multipart_text() {
        let f = FormData::from_urlencoded(b"title=Contoh+Kegiatan&titleEn=null&location=%20Aula%20A%20").unwrap();
        assert_eq!(f.text("title").as_deref(), Some("Contoh Kegiatan"));
        assert_eq!(f.text("titleEn").as_deref(), Some(""));
        assert_eq!(f.text("location").as_deref(), Some("Aula A"));
        assert!(FormData::from_urlencoded(b"").unwrap().text("title").is_none());
    }

    #[test]
    fn json_body_must_be_an_object() {
        assert!(FormData::from_json_body(b"  ").unwrap().text("title").is_none());
        assert!(FormData::from_json_body(b"[1, 2]").is_err());
        assert_eq!(
            FormData::from_json_body(br#"{"title":"Seminar"}"#).unwrap().text("title").as_deref(),
            Some("Seminar")
        );
    }

    #[test]
    fn fs_path_stays_inside_upload_root() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            to_fs_path(root, "/uploads/leaders/rektor.png"),
            Some(PathBuf::from("/srv/uploads/leaders/rektor.png"))
        );
        assert_eq!(to_fs_path(root, "/uploads/../etc/passwd"), None);
        assert_eq!(to_fs_path(root, "/static/logo.png"), None);
        assert_eq!(to_fs_path(root, "/uploads/"), None);
    }

    #[test]
    fn only_known_extensions_are_allowed() {
        assert_eq!(allowed_extension("Brosur PMB.PDF").as_deref(), Some("pdf"));
        assert_eq!(allowed_extension("foto.jpeg").as_deref(), Some("jpeg"));
        assert!(allowed_extension("script.sh").is_none());
        assert!(allowed_extension("noext").is_none());
    }
}
