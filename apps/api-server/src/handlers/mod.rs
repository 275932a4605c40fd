//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod posts;
mod users;


use actix_web::web;

/// Configure all application routes. Protection comes from the `Identity`
/// extractor in the handler signatures, not from the route table.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login)),
        )
        .route("/users", web::get().to(users::list))
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::list))
                .route("", web::post().to(posts::create))
                .route("/{id}", web::get().to(posts::details))
                .route("/{id}", web::patch().to(posts::update))
                .route("/{id}", web::delete().to(posts::delete)),
        )
        .route("/authors/{author_id}/posts", web::get().to(posts::by_author))
        .service(
            web::scope("/categories")
                .route("", web::get().to(categories::list))
                .route("", web::post().to(categories::add))
                .route("/{id}", web::delete().to(categories::delete)),
        );
}
