#![allow(dead_code)]

use actix_web::web;
use kampus_cms::{auth, config::AppConfig, db, store::JsonStore};
use sqlx::AnyPool;
use tempfile::TempDir;

pub const BOUNDARY: &str = "----kampus-cms-test-boundary";

pub struct TestContext {
    pub dir: TempDir,
    pub pool: web::Data<AnyPool>,
    pub store: web::Data<JsonStore>,
    pub config: web::Data<AppConfig>,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = AppConfig {
            bind_addr: "127.0.0.1".into(),
            port: 0,
            database_url: "sqlite::memory:".into(),
            data_dir: dir.path().join("data"),
            upload_root: dir.path().join("uploads"),
            admin_pin: Some("246810".into()),
            admin_pin_hash: None,
            jwt_secret: "rahasia-uji".into(),
            session_hours: 1,
            cors_origin: "http://localhost:3000".into(),
            max_upload_bytes: 1024 * 1024,
        };

        let pool = db::establish_connection(&config.database_url, 1)
            .await
            .expect("Failed to open test database");

        Self {
            store: web::Data::new(JsonStore::new(config.data_dir.clone())),
            pool: web::Data::new(pool),
            config: web::Data::new(config),
            dir,
        }
    }

    pub fn bearer(&self) -> (&'static str, String) {
        let token = auth::generate_jwt(&self.config).expect("Failed to sign token");
        ("Authorization", format!("Bearer {token}"))
    }

    pub fn upload_path(&self, stored: &str) -> std::path::PathBuf {
        kampus_cms::uploads::to_fs_path(&self.config.upload_root, stored)
            .expect("stored path must live under /uploads/")
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.pool.clone())
                .app_data($ctx.store.clone())
                .app_data($ctx.config.clone())
                .configure(kampus_cms::configure),
        )
        .await
    };
}

/// A `multipart/form-data` body with text fields and `(field, filename, bytes)` files.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
