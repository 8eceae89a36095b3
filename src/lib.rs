pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod locale;
pub mod models;
pub mod static_data;
pub mod store;
pub mod uploads;
pub mod utils;

use actix_web::web::{self, JsonConfig, PathConfig, QueryConfig};

use crate::{
    controllers::{
        academic_controller, auth_controller, chat_controller, content_controller, faculty_controller,
        leader_controller, pmb_controller, preview, tuition_controller,
    },
    error::ApiError,
    models::content::{
        Achievement, Activity, Agenda, Partner, Publication, Research, Scholarship,
    },
    uploads::JSON_LIMIT,
};

/// Registers every API route plus the extractor configs that render
/// malformed requests as `ApiError`s.
///
/// Expects `web::Data` for `AnyPool`, `JsonStore` and `AppConfig` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        JsonConfig::default()
            .limit(JSON_LIMIT)
            .content_type_required(false)
            .error_handler(|err, _req| {
                log::warn!("JSON payload error: {}", err);
                ApiError::bad_request(format!("Payload error: {err}")).into()
            }),
    )
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        ApiError::bad_request(format!("Query tidak valid: {err}")).into()
    }))
    .app_data(PathConfig::default().error_handler(|_err, req| {
        ApiError::not_found(format!("Halaman {} tidak ditemukan", req.path())).into()
    }));

    // auth
    cfg.service(auth_controller::login)
        .service(auth_controller::logout)
        .service(auth_controller::session);

    // database-backed content
    cfg.service(faculty_controller::public_faculties)
        .service(faculty_controller::public_faculty_detail)
        .service(faculty_controller::list_faculties)
        .service(faculty_controller::create_faculty)
        .service(faculty_controller::get_faculty)
        .service(faculty_controller::update_faculty)
        .service(faculty_controller::delete_faculty)
        .service(faculty_controller::create_program)
        .service(faculty_controller::update_program)
        .service(faculty_controller::delete_program)
        .service(leader_controller::public_leaders)
        .service(leader_controller::public_leader_detail)
        .service(leader_controller::list_leaders)
        .service(leader_controller::create_leader)
        .service(leader_controller::get_leader)
        .service(leader_controller::update_leader)
        .service(leader_controller::delete_leader)
        .service(academic_controller::public_calendar)
        .service(academic_controller::list_calendar)
        .service(academic_controller::create_calendar_entry)
        .service(academic_controller::replace_calendar)
        .service(academic_controller::get_calendar_entry)
        .service(academic_controller::update_calendar_entry)
        .service(academic_controller::delete_calendar_entry)
        .service(academic_controller::public_documents)
        .service(academic_controller::list_documents)
        .service(academic_controller::create_document)
        .service(academic_controller::replace_documents)
        .service(academic_controller::get_document)
        .service(academic_controller::update_document)
        .service(academic_controller::delete_document);

    // JSON-file collections
    content_controller::configure::<Activity>(cfg);
    content_controller::configure::<Agenda>(cfg);
    content_controller::configure::<Partner>(cfg);
    content_controller::configure::<Scholarship>(cfg);
    content_controller::configure::<Achievement>(cfg);
    content_controller::configure::<Research>(cfg);
    content_controller::configure::<Publication>(cfg);

    cfg.service(pmb_controller::public_pmb)
        .service(pmb_controller::get_pmb)
        .service(pmb_controller::update_pmb)
        .service(tuition_controller::public_tuition)
        .service(chat_controller::chat)
        .service(chat_controller::suggestions)
        .service(preview::preview);
}
