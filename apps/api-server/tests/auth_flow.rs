//! End-to-end tests of the auth endpoints against the in-memory store.

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use forno_api::handlers::configure_routes;
use forno_api::state::AppState;

macro_rules! spawn_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::in_memory()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_the_live_backend() {
    let app = spawn_app!();

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "forno-api");
    assert_eq!(body["store"], "memory");
}

#[actix_web::test]
async fn register_then_login_round_trip() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    assert_eq!(body["data"]["user"]["username"], "mario");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert!(body["data"]["user"]["lastLogin"].is_string());
}

#[actix_web::test]
async fn duplicate_registration_is_rejected() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    // Same email, different username.
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "luigi",
            "email": "mario@example.com",
            "password": "different"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    // Same username, different email.
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "other@example.com",
            "password": "different"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn login_with_wrong_password_fails() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "mario@example.com",
            "password": "wrong"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password");
}

#[actix_web::test]
async fn setup_admin_succeeds_exactly_once() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/setup-admin")
        .set_json(json!({
            "username": "boss",
            "email": "boss@example.com",
            "password": "fornofor"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "admin");

    // A second bootstrap fails even with different credentials.
    let req = test::TestRequest::post()
        .uri("/api/auth/setup-admin")
        .set_json(json!({
            "username": "boss2",
            "email": "boss2@example.com",
            "password": "different"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Admin user already exists");
}

#[actix_web::test]
async fn profile_requires_a_valid_token() {
    let app = spawn_app!();

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], "mario@example.com");
}

#[actix_web::test]
async fn change_password_rotates_credentials() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Wrong current password.
    let req = test::TestRequest::put()
        .uri("/api/auth/change-password")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "currentPassword": "wrong",
            "newPassword": "quattro-stagioni"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Current password is incorrect");

    let req = test::TestRequest::put()
        .uri("/api/auth/change-password")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "currentPassword": "pepperoni",
            "newPassword": "quattro-stagioni"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "mario@example.com", "password": "pepperoni"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "mario@example.com", "password": "quattro-stagioni"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn user_listing_is_admin_only_and_hash_free() {
    let app = spawn_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "mario",
            "email": "mario@example.com",
            "password": "pepperoni"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let user_token = body["data"]["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/users")
        .insert_header(("Authorization", format!("Bearer {user_token}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/setup-admin")
        .set_json(json!({
            "username": "boss",
            "email": "boss@example.com",
            "password": "fornofor"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/users")
        .insert_header(("Authorization", format!("Bearer {admin_token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
    }
}
