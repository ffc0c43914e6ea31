//! End-to-end tests of the blog endpoints against the in-memory store.

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

macro_rules! bootstrap_admin {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/setup-admin")
            .set_json(json!({
                "username": "boss",
                "email": "boss@example.com",
                "password": "fornofor"
            }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service($app, req).await).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! register_user {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "mario",
                "email": "mario@example.com",
                "password": "pepperoni"
            }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service($app, req).await).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! create_blog {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json($body)
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["data"]["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn detail_reads_count_views() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);

    let id = create_blog!(
        &app,
        admin,
        json!({
            "title": "Our sourdough starter",
            "description": "Twelve years old and still going.",
            "category": "kitchen",
            "tags": ["dough", "tradition"]
        })
    );

    for expected in 1..=3i64 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/blogs/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["views"], expected);
    }

    // Views counted on detail reads show up in the listing.
    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"][0]["views"], 3);
}

#[actix_web::test]
async fn creation_is_admin_only() {
    let app = spawn_app!();
    let user = register_user!(&app);

    let req = test::TestRequest::post()
        .uri("/api/blogs")
        .insert_header(("Authorization", format!("Bearer {user}")))
        .set_json(json!({
            "title": "Not allowed",
            "description": "Regular users cannot publish."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Access denied. Admin privileges required.");

    // The rejected request left nothing behind.
    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["totalBlogs"], 0);
}

#[actix_web::test]
async fn blank_title_is_rejected() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);

    let req = test::TestRequest::post()
        .uri("/api/blogs")
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(json!({
            "title": "   ",
            "description": "A title of only spaces."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["error"], "Title is required");

    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["totalBlogs"], 0);
}

#[actix_web::test]
async fn like_toggles_on_and_off() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);
    let user = register_user!(&app);

    let id = create_blog!(
        &app,
        admin,
        json!({
            "title": "Margherita, properly",
            "description": "San Marzano or nothing."
        })
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/blogs/{id}/like"))
        .insert_header(("Authorization", format!("Bearer {user}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Blog liked");
    assert_eq!(body["data"]["liked"], true);
    assert_eq!(body["data"]["likes"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blogs/{id}/like"))
        .insert_header(("Authorization", format!("Bearer {user}")))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["message"], "Blog unliked");
    assert_eq!(body["data"]["liked"], false);
    assert_eq!(body["data"]["likes"], 0);

    // Liking requires authentication.
    let req = test::TestRequest::post()
        .uri(&format!("/api/blogs/{id}/like"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn missing_blog_returns_not_found() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);
    let id = uuid::Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri(&format!("/api/blogs/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Blog not found");

    let req = test::TestRequest::put()
        .uri(&format!("/api/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(json!({"title": "New title"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn update_patches_only_given_fields() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);

    let id = create_blog!(
        &app,
        admin,
        json!({
            "title": "Wood-fired oven notes",
            "description": "Temperature logs from the weekend.",
            "category": "kitchen",
            "image": "https://example.com/oven.jpg"
        })
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(json!({"title": "Wood-fired oven notes, day two"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Blog updated successfully");
    assert_eq!(body["data"]["title"], "Wood-fired oven notes, day two");
    assert_eq!(body["data"]["category"], "kitchen");
    assert_eq!(body["data"]["image"], "https://example.com/oven.jpg");

    // An explicit empty string clears the image.
    let req = test::TestRequest::put()
        .uri(&format!("/api/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .set_json(json!({"image": ""}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body["data"]["image"].is_null());
}

#[actix_web::test]
async fn listing_paginates_and_filters() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);

    for n in 1..=25 {
        let category = if n % 2 == 0 { "kitchen" } else { "events" };
        create_blog!(
            &app,
            admin,
            json!({
                "title": format!("Post {n:02}"),
                "description": format!("Body of post {n}"),
                "category": category
            })
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/blogs?page=2&limit=10&sort=title")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let page = &body["pagination"];
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["totalBlogs"], 25);
    assert_eq!(page["hasNext"], true);
    assert_eq!(page["hasPrev"], true);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["title"], "Post 11");
    assert_eq!(data[9]["title"], "Post 20");

    let req = test::TestRequest::get()
        .uri("/api/blogs?category=kitchen&limit=100")
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["totalBlogs"], 12);

    // An absurd page number is past the end, not an arithmetic error.
    let req = test::TestRequest::get()
        .uri("/api/blogs?page=18446744073709551615&limit=10")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[actix_web::test]
async fn drafts_stay_out_of_the_public_list() {
    let app = spawn_app!();
    let admin = bootstrap_admin!(&app);

    create_blog!(
        &app,
        admin,
        json!({
            "title": "Published piece",
            "description": "Visible to everyone."
        })
    );
    create_blog!(
        &app,
        admin,
        json!({
            "title": "Draft piece",
            "description": "Still being written.",
            "status": "draft"
        })
    );

    let req = test::TestRequest::get().uri("/api/blogs").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["pagination"]["totalBlogs"], 1);
    assert_eq!(body["data"][0]["title"], "Published piece");

    // The admin overview still counts both.
    let req = test::TestRequest::get()
        .uri("/api/blogs/stats/overview")
        .insert_header(("Authorization", format!("Bearer {admin}")))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["totalBlogs"], 2);
    assert_eq!(body["data"]["publishedBlogs"], 1);
    assert_eq!(body["data"]["draftBlogs"], 1);
}

#[actix_web::test]
async fn stats_overview_is_admin_only() {
    let app = spawn_app!();
    let user = register_user!(&app);

    let req = test::TestRequest::get()
        .uri("/api/blogs/stats/overview")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/blogs/stats/overview")
        .insert_header(("Authorization", format!("Bearer {user}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}
