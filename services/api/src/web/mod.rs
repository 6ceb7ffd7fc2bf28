pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod sinks;
pub mod state;
pub mod watch_task;
pub mod ws_handler;

use std::sync::Arc;

use axum::{
    http::{
        header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::resolve_owner;
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Assembles the complete application router over the shared state.
///
/// Exposed from the library so the binary and the integration tests build
/// the exact same application.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            warn!(
                "Invalid CORS_ORIGIN '{}', falling back to localhost",
                app_state.config.cors_origin
            );
            HeaderValue::from_static("http://localhost:3000")
        });
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static("x-device-id"),
        ]);

    // Public routes (no owner required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/quotes", get(rest::list_quotes_handler))
        .route("/quotes/daily", get(rest::daily_quote_handler))
        .route("/prayer-times", get(rest::prayer_times_handler))
        // The reminder session resolves its own owner during init.
        .route("/ws", get(ws_handler));

    // Data routes (owner resolved from the auth cookie or x-device-id)
    let data_routes = Router::new()
        .route(
            "/reminders",
            get(rest::list_reminders_handler).post(rest::create_reminder_handler),
        )
        .route(
            "/reminders/{id}",
            put(rest::update_reminder_handler).delete(rest::delete_reminder_handler),
        )
        .route("/reminders/{id}/toggle", post(rest::toggle_reminder_handler))
        .route(
            "/habits",
            get(rest::list_habits_handler).post(rest::create_habit_handler),
        )
        .route("/habits/today", get(rest::today_handler))
        .route("/habits/{id}", delete(rest::delete_habit_handler))
        .route("/habits/{id}/check", post(rest::check_habit_handler))
        .route("/progress", get(rest::progress_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_owner,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(data_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new().merge(api_router).merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi()),
    )
}
