pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use auth::{AuthManager, Token};
pub use handlers::AppState;

/// Routes of the REST API, relative to `/api/v1`
fn v1_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hello", get(handlers::hello))
        // Auth
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/users/:id", delete(handlers::delete_user))
        // Courses (POST on a course updates it)
        .route(
            "/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route(
            "/courses/:id",
            get(handlers::get_course)
                .post(handlers::update_course)
                .delete(handlers::delete_course),
        )
        // Membership
        .route("/courses/:id/enroll", post(handlers::enroll))
        .route("/courses/:id/members", post(handlers::add_member))
        .route("/members/:id", delete(handlers::remove_member))
        // Contents
        .route(
            "/courses/:id/contents",
            get(handlers::list_contents).post(handlers::create_content),
        )
        .route("/contents/:id", delete(handlers::delete_content))
        // Comments
        .route(
            "/contents/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/comments/:id", delete(handlers::delete_comment))
}

/// Build the full application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", v1_router())
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
