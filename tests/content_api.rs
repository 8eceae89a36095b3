#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{TestContext, multipart_body};
use kampus_cms::models::content::{Activity, Partner};
use serde_json::{Value, json};

#[actix_web::test]
async fn creating_an_activity_generates_slug_and_grows_collection() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let before: Vec<Activity> = ctx.store.load("activities").await.unwrap();
    assert!(before.is_empty());

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Contoh Kegiatan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["slug"], "contoh-kegiatan");
    assert!(body["data"]["id"].as_str().is_some_and(|id| !id.is_empty()));

    let after: Vec<Activity> = ctx.store.load("activities").await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
}

#[actix_web::test]
async fn duplicate_titles_get_numbered_slugs() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/admin/agenda")
            .insert_header(ctx.bearer())
            .set_json(json!({ "title": "Seminar Nasional!", "date": "2025-05-20" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        slugs.push(body["data"]["slug"].as_str().unwrap().to_string());
    }
    assert_eq!(slugs, vec!["seminar-nasional", "seminar-nasional-2", "seminar-nasional-3"]);
}

#[actix_web::test]
async fn partial_update_keeps_other_fields() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .set_json(json!({
            "title": "Bakti Sosial",
            "titleEn": "Community Service",
            "description": "Kegiatan mahasiswa",
            "location": "Desa Sukamaju",
            "date": "2025-02-01"
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/activities/{id}"))
        .insert_header(ctx.bearer())
        .set_json(json!({ "location": "Balai Desa" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let data = &body["data"];
    assert_eq!(data["location"], "Balai Desa");
    assert_eq!(data["title"], "Bakti Sosial");
    assert_eq!(data["titleEn"], "Community Service");
    assert_eq!(data["description"], "Kegiatan mahasiswa");
    assert_eq!(data["date"], "2025-02-01");
    assert_eq!(data["slug"], "bakti-sosial");
    assert_eq!(data["createdAt"], created["data"]["createdAt"]);
}

#[actix_web::test]
async fn renaming_regenerates_slug_unless_given_explicitly() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/achievements")
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Juara Debat", "year": 2024 }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/achievements/{id}"))
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Juara 1 Debat Nasional" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slug"], "juara-1-debat-nasional");

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/achievements/{id}"))
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Juara Umum", "slug": "debat-2024" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slug"], "debat-2024");
    assert_eq!(body["data"]["year"], 2024);
}

#[actix_web::test]
async fn deleting_a_missing_id_is_404_and_changes_nothing() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/scholarships")
        .insert_header(ctx.bearer())
        .set_json(json!({ "name": "Beasiswa Prestasi" }))
        .to_request();
    test::call_service(&app, req).await;
    let before = std::fs::read(ctx.store.path_of("scholarships")).unwrap();

    let req = test::TestRequest::delete()
        .uri("/api/admin/scholarships/12345")
        .insert_header(ctx.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let after = std::fs::read(ctx.store.path_of("scholarships")).unwrap();
    assert_eq!(before, after);
}

#[actix_web::test]
async fn delete_removes_the_record() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/publications")
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Analisis Data Curah Hujan", "authors": ["A. Lestari", "B. Santoso"] }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/publications/{id}"))
        .insert_header(ctx.bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/publications/{id}"))
        .insert_header(ctx.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn english_listing_falls_back_to_indonesian() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    for payload in [
        json!({ "title": "Wisuda", "titleEn": "", "date": "2025-08-01" }),
        json!({ "title": "Dies Natalis", "titleEn": "Anniversary", "date": "2025-09-01" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/admin/activities")
            .insert_header(ctx.bearer())
            .set_json(payload)
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/api/public/en/activities").to_request();
    let items: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(items.len(), 2);
    // newest date first
    assert_eq!(items[0]["title"], "Anniversary");
    assert_eq!(items[1]["title"], "Wisuda");
    assert!(items.iter().all(|i| i.get("titleEn").is_none()));

    let req = test::TestRequest::get().uri("/api/public/id/activities/dies-natalis").to_request();
    let item: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(item["title"], "Dies Natalis");
}

#[actix_web::test]
async fn unknown_locale_and_slug_are_404() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/public/fr/activities").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/public/id/research/tidak-ada").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_collections_are_empty_arrays() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/public/id/partners").to_request();
    let items: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(items.is_empty());
}

#[actix_web::test]
async fn category_filter_is_case_insensitive() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    for (name, category) in [("Universitas Leiden", "Internasional"), ("PT Telkom", "Industri")] {
        let req = test::TestRequest::post()
            .uri("/api/admin/partners")
            .insert_header(ctx.bearer())
            .set_json(json!({ "name": name, "category": category }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/api/public/id/partners?category=internasional")
        .to_request();
    let items: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["slug"], "universitas-leiden");
}

#[actix_web::test]
async fn admin_routes_require_a_session() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .set_json(json!({ "title": "Tanpa Login" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/admin/activities")
        .insert_header(("Authorization", "Bearer bukan-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let items: Vec<Activity> = ctx.store.load("activities").await.unwrap();
    assert!(items.is_empty());
}

#[actix_web::test]
async fn missing_title_is_rejected() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .set_json(json!({ "description": "tanpa judul" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "title wajib diisi");
}

#[actix_web::test]
async fn multipart_upload_is_stored_replaced_and_deleted() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let (content_type, body) = multipart_body(
        &[("name", "Universitas Gadjah Mada"), ("since", "2019"), ("website", "null")],
        &[("logo", "Logo UGM.png", b"\x89PNG first")],
    );
    let req = test::TestRequest::post()
        .uri("/api/admin/partners")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;

    let data = &created["data"];
    let first_logo = data["logo"].as_str().unwrap().to_string();
    assert!(first_logo.starts_with("/uploads/partners/logo-ugm_"));
    assert!(first_logo.ends_with(".png"));
    assert_eq!(data["since"], 2019);
    assert!(data["website"].is_null());
    assert!(ctx.upload_path(&first_logo).is_file());

    let id = data["id"].as_str().unwrap().to_string();
    let (content_type, body) = multipart_body(&[], &[("logo", "baru.webp", b"RIFF second")]);
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/partners/{id}"))
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    let second_logo = updated["data"]["logo"].as_str().unwrap().to_string();
    assert_ne!(first_logo, second_logo);
    assert_eq!(updated["data"]["name"], "Universitas Gadjah Mada");
    assert!(!ctx.upload_path(&first_logo).exists());
    assert!(ctx.upload_path(&second_logo).is_file());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/partners/{id}"))
        .insert_header(ctx.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(!ctx.upload_path(&second_logo).exists());

    let partners: Vec<Partner> = ctx.store.load("partners").await.unwrap();
    assert!(partners.is_empty());
}

#[actix_web::test]
async fn failed_create_leaves_no_upload_behind() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    // valid file, but the record has no name
    let (content_type, body) = multipart_body(&[("website", "https://contoh.ac.id")], &[("logo", "logo.png", b"png")]);
    let req = test::TestRequest::post()
        .uri("/api/admin/partners")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let dir = ctx.config.upload_root.join("partners");
    let leftovers = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn disallowed_or_oversized_uploads_are_rejected() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let (content_type, body) = multipart_body(&[("title", "Laporan")], &[("document", "laporan.exe", b"MZ")]);
    let req = test::TestRequest::post()
        .uri("/api/admin/research")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let big = vec![0u8; ctx.config.max_upload_bytes + 1];
    let (content_type, body) = multipart_body(&[("title", "Laporan")], &[("document", "laporan.pdf", &big)]);
    let req = test::TestRequest::post()
        .uri("/api/admin/research")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let dir = ctx.config.upload_root.join("research");
    let leftovers = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn urlencoded_forms_are_accepted() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload("title=Contoh+Kegiatan&category=Seminar&titleEn=null")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["slug"], "contoh-kegiatan");
    assert_eq!(body["data"]["category"], "Seminar");
    assert!(body["data"]["titleEn"].is_null());

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/activities/{id}"))
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload("location=Aula+Utama")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["location"], "Aula Utama");
    assert_eq!(body["data"]["title"], "Contoh Kegiatan");
}

#[actix_web::test]
async fn files_under_unknown_fields_are_rejected() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    // partners take their file as `logo`
    let (content_type, body) = multipart_body(&[("name", "Universitas Gadjah Mada")], &[("image", "ugm.png", b"png")]);
    let req = test::TestRequest::post()
        .uri("/api/admin/partners")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let dir = ctx.config.upload_root.join("partners");
    let leftovers = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
    let partners: Vec<Partner> = ctx.store.load("partners").await.unwrap();
    assert!(partners.is_empty());

    // the right field with a second, stray file: nothing is kept
    let (content_type, body) = multipart_body(
        &[("name", "Universitas Gadjah Mada")],
        &[("logo", "ugm.png", b"png"), ("banner", "ugm.jpg", b"jpg")],
    );
    let req = test::TestRequest::post()
        .uri("/api/admin/partners")
        .insert_header(ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    let leftovers = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[actix_web::test]
async fn json_bodies_are_bounded_by_their_own_limit() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);
    // larger than the upload limit of the test config, under the JSON limit
    let long_text = "a".repeat(ctx.config.max_upload_bytes + 1024);

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Laporan Tahunan", "category": "Seminar", "description": long_text }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["description"].as_str().unwrap().len(), long_text.len());

    let req = test::TestRequest::post()
        .uri("/api/admin/activities")
        .insert_header(ctx.bearer())
        .set_json(json!({ "title": "Terlalu Besar", "category": "Seminar", "description": "b".repeat(kampus_cms::uploads::JSON_LIMIT) }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let activities: Vec<Activity> = ctx.store.load("activities").await.unwrap();
    assert_eq!(activities.len(), 1);
}
