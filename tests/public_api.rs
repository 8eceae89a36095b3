#[macro_use]
mod common;

use actix_web::{
    http::{StatusCode, header},
    test,
};
use common::TestContext;
use serde_json::{Value, json};

#[actix_web::test]
async fn chat_answers_from_the_builtin_faq() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "Bagaimana cara PENDAFTARAN mahasiswa baru?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["answer"].as_str().unwrap().contains("PMB"));

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "How do I register?", "locale": "en" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["answer"].as_str().unwrap().starts_with("New student registration"));
}

#[actix_web::test]
async fn chat_validates_messages() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    for payload in [
        json!({ "message": "   " }),
        json!({}),
        json!({ "message": "x".repeat(1001) }),
        json!({ "message": "halo", "locale": "fr" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }
}

#[actix_web::test]
async fn chat_uses_a_saved_knowledge_base() {
    let ctx = TestContext::new().await;
    std::fs::create_dir_all(&ctx.config.data_dir).unwrap();
    std::fs::write(
        ctx.config.data_dir.join("chatbot.json"),
        serde_json::to_vec(&json!({
            "entries": [{ "keywords": ["wisuda"], "answer": "Wisuda digelar setiap Oktober." }]
        }))
        .unwrap(),
    )
    .unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "Kapan wisuda?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["answer"], "Wisuda digelar setiap Oktober.");

    // builtin entries are replaced, the builtin fallback is kept
    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "pendaftaran" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["answer"].as_str().unwrap().starts_with("Maaf"));

    let req = test::TestRequest::get().uri("/api/chat/suggestions").to_request();
    let suggestions: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(suggestions.len(), 4);
}

#[actix_web::test]
async fn suggestions_follow_the_locale() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/chat/suggestions?locale=en")
        .to_request();
    let suggestions: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(suggestions[0], "How do I register?");

    let req = test::TestRequest::get().uri("/api/chat/suggestions").to_request();
    let suggestions: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(suggestions[0], "Bagaimana cara mendaftar?");
}

#[actix_web::test]
async fn preview_serves_uploads_inline() {
    let ctx = TestContext::new().await;
    let dir = ctx.config.upload_root.join("documents");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("panduan akademik.pdf"), b"%PDF-1.4 isi").unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/preview/documents/panduan%20akademik.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("inline"));
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"%PDF-1.4 isi");
}

#[actix_web::test]
async fn preview_rejects_traversal_and_missing_files() {
    let ctx = TestContext::new().await;
    std::fs::create_dir_all(&ctx.config.upload_root).unwrap();
    std::fs::write(ctx.dir.path().join("rahasia.txt"), b"jangan").unwrap();
    let app = init_app!(ctx);

    for uri in ["/preview/..%2Frahasia.txt", "/preview/documents%5C..%5C..%5Crahasia.txt"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let req = test::TestRequest::get()
        .uri("/preview/documents/tidak-ada.pdf")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_locale_is_not_found() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);

    for uri in ["/api/public/fr/faculties", "/api/public/de/pmb", "/api/public/xx/tuition"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
