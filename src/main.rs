use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, http::header, middleware::Logger, web};
use dotenv::dotenv;

use kampus_cms::{config::AppConfig, db, store::JsonStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Konfigurasi tidak valid: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match db::establish_connection(&config.database_url, 10).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Gagal inisialisasi pool database: {:?}", e);
            std::process::exit(1);
        }
    };

    tokio::fs::create_dir_all(&config.data_dir).await?;
    tokio::fs::create_dir_all(&config.upload_root).await?;

    let store = web::Data::new(JsonStore::new(config.data_dir.clone()));
    let pool = web::Data::new(pool);
    let bind = (config.bind_addr.clone(), config.port);
    let config = web::Data::new(config);

    log::info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(pool.clone())
            .app_data(store.clone())
            .app_data(config.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(Files::new("/uploads", &config.upload_root))
            .configure(kampus_cms::configure)
    })
    .bind(bind)?
    .run()
    .await
}
