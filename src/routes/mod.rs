use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::error_page_middleware;
use crate::templates::TemplateStore;
use axum::{middleware, routing, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_routes() -> Router {
    Router::new()
        // Topics
        .route("/", routing::get(handlers::topic::list_topics))
        .route("/t/", routing::get(handlers::topic::list_topics))
        .route(
            "/nt/",
            routing::get(handlers::topic::new_topic_form).post(handlers::topic::create_topic),
        )
        // Messages
        .route(
            "/t/{topicid}/{slug}/",
            routing::get(handlers::message::list_messages)
                .post(handlers::message::create_message),
        )
        // Not built yet
        .route("/c/", routing::get(handlers::category::list_categories))
        .route(
            "/u/{userid}/{slug}/",
            routing::get(handlers::user::user_profile),
        )
        .fallback(handlers::not_found)
}

/// The whole application with shared state attached.
///
/// Layers run outermost first: request tracing, then the shared extensions,
/// then the error-page renderer closest to the handlers.
pub fn create_app(
    db: DatabaseConnection,
    templates: Arc<TemplateStore>,
    config: AppConfig,
) -> Router {
    let mut app = create_routes();

    if let Some(static_dir) = &config.static_dir {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(db))
            .layer(Extension(templates))
            .layer(Extension(config))
            .layer(middleware::from_fn(error_page_middleware)),
    )
}
