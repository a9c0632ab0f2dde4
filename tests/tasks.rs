use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::{Duration, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use taskgate::auth::{AuthMiddleware, Authenticator, Registrar, TokenCodec};
use taskgate::routes;
use taskgate::store::memory::{MemoryCredentialStore, MemoryTaskStore};
use taskgate::store::{CredentialStore, TaskStore};

const TEST_SECRET: &str = "tasks-suite-secret-long-enough-for-hs256";

fn future_date() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(30)
}

// Assembles the app over in-memory stores and returns a usable bearer token.
macro_rules! init_app_with_token {
    ($task_store:expr) => {{
        let credential_store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        let task_store: Arc<dyn TaskStore> = $task_store;
        let codec = TokenCodec::new(TEST_SECRET, 3600);
        let authenticator = web::Data::new(Authenticator::new(
            Arc::clone(&credential_store),
            codec.clone(),
        ));
        let registrar = web::Data::new(Registrar::new(Arc::clone(&credential_store)));
        let app = test::init_service(
            App::new()
                .app_data(authenticator)
                .app_data(registrar)
                .app_data(web::Data::from(task_store))
                .wrap(AuthMiddleware::new(codec, credential_store))
                .wrap(Logger::default())
                .configure(routes::config),
        )
        .await;

        let register = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "username": "task_caller",
                "password": "Password123!",
                "role": "user"
            }))
            .to_request();
        assert!(test::call_service(&app, register).await.status().is_success());

        let login = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({
                "username": "task_caller",
                "password": "Password123!"
            }))
            .to_request();
        let login_body: taskgate::auth::TokenResponse =
            test::call_and_read_body_json(&app, login).await;

        (app, format!("Bearer {}", login_body.token))
    }};
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let store = Arc::new(MemoryTaskStore::new());
    let user_id = store.seed_user("Linda Montoya", "linda@example.com");
    let status_id = store.seed_status("Pending");
    let done_id = store.seed_status("Completed");
    let (app, token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    // Create
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(("Authorization", token.clone()))
        .set_json(json!({
            "title": "Quarterly report",
            "description": "Prepare the quarterly report",
            "limit_date": future_date().to_string(),
            "user_id": user_id,
            "status_id": status_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Create task failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let task_id = created["id"].as_i64().unwrap();
    assert_eq!(created["title"], "Quarterly report");
    assert_eq!(created["user_name"], "Linda Montoya");
    assert_eq!(created["status_description"], "Pending");

    // Read back
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(("Authorization", token.clone()))
        .to_request();
    let fetched: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // List
    let req = test::TestRequest::get()
        .uri("/tasks")
        .append_header(("Authorization", token.clone()))
        .to_request();
    let listed: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Partial update: only the title and status change
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(("Authorization", token.clone()))
        .set_json(json!({
            "title": "Quarterly report v2",
            "status_id": done_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let updated: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(updated["title"], "Quarterly report v2");
    assert_eq!(updated["description"], "Prepare the quarterly report");
    assert_eq!(updated["status_description"], "Completed");
    assert_eq!(updated["user_name"], "Linda Montoya");

    // Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(("Authorization", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

    // Gone afterwards
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_empty_task_list_is_not_found() {
    let store = Arc::new(MemoryTaskStore::new());
    let (app, token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .append_header(("Authorization", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_task_referential_checks() {
    let store = Arc::new(MemoryTaskStore::new());
    let user_id = store.seed_user("Linda Montoya", "linda@example.com");
    let status_id = store.seed_status("Pending");
    let (app, token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    // Unknown owning user
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(("Authorization", token.clone()))
        .set_json(json!({
            "title": "Quarterly report",
            "description": "Prepare the quarterly report",
            "limit_date": future_date().to_string(),
            "user_id": 999,
            "status_id": status_id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Unknown status
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(("Authorization", token.clone()))
        .set_json(json!({
            "title": "Quarterly report",
            "description": "Prepare the quarterly report",
            "limit_date": future_date().to_string(),
            "user_id": user_id,
            "status_id": 999
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_task_validation() {
    let store = Arc::new(MemoryTaskStore::new());
    let user_id = store.seed_user("Linda Montoya", "linda@example.com");
    let status_id = store.seed_status("Pending");
    let (app, token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    let test_cases = vec![
        (
            json!({
                "title": "Tiny",
                "description": "Prepare the quarterly report",
                "limit_date": future_date().to_string(),
                "user_id": user_id,
                "status_id": status_id
            }),
            "title below 5 characters",
        ),
        (
            json!({
                "title": "Quarterly report",
                "description": "Too short",
                "limit_date": future_date().to_string(),
                "user_id": user_id,
                "status_id": status_id
            }),
            "description below 10 characters",
        ),
        (
            json!({
                "title": "Quarterly report",
                "description": "Prepare the quarterly report",
                "limit_date": (Utc::now().date_naive() - Duration::days(3)).to_string(),
                "user_id": user_id,
                "status_id": status_id
            }),
            "deadline in the past",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .append_header(("Authorization", token.clone()))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::BAD_REQUEST,
            "Test case failed: {}",
            description
        );
    }
}

#[actix_rt::test]
async fn test_update_missing_task_and_references() {
    let store = Arc::new(MemoryTaskStore::new());
    let user_id = store.seed_user("Linda Montoya", "linda@example.com");
    let status_id = store.seed_status("Pending");
    let (app, token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    // Updating a task that does not exist
    let req = test::TestRequest::put()
        .uri("/tasks/42")
        .append_header(("Authorization", token.clone()))
        .set_json(json!({ "title": "Renamed task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Re-pointing an existing task at a missing status
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(("Authorization", token.clone()))
        .set_json(json!({
            "title": "Quarterly report",
            "description": "Prepare the quarterly report",
            "limit_date": future_date().to_string(),
            "user_id": user_id,
            "status_id": status_id
        }))
        .to_request();
    let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let task_id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}", task_id))
        .append_header(("Authorization", token))
        .set_json(json!({ "status_id": 999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_task_routes_require_authentication() {
    let store = Arc::new(MemoryTaskStore::new());
    store.seed_user("Linda Montoya", "linda@example.com");
    store.seed_status("Pending");
    let (app, _token) = init_app_with_token!(Arc::clone(&store) as Arc<dyn TaskStore>);

    // No Authorization header at all
    let req = test::TestRequest::get().uri("/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({
            "title": "Quarterly report",
            "description": "Prepare the quarterly report",
            "limit_date": future_date().to_string(),
            "user_id": 1,
            "status_id": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["path"], "/tasks");
}
