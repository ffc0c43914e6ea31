//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/profile", web::get().to(auth::profile))
                    .route("/profile", web::put().to(auth::update_profile))
                    .route("/change-password", web::put().to(auth::change_password))
                    .route("/setup-admin", web::post().to(auth::setup_admin))
                    .route("/users", web::get().to(auth::list_users)),
            )
            // Blog routes. The stats path registers before the id capture.
            .service(
                web::scope("/blogs")
                    .route("/stats/overview", web::get().to(blog::stats))
                    .route("", web::get().to(blog::list_blogs))
                    .route("", web::post().to(blog::create_blog))
                    .route("/{id}", web::get().to(blog::get_blog))
                    .route("/{id}", web::put().to(blog::update_blog))
                    .route("/{id}", web::delete().to(blog::delete_blog))
                    .route("/{id}/like", web::post().to(blog::toggle_like)),
            ),
    );
}
