use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::auth::AuthManager;
use crate::domain::{AuthContext, Course, CourseUpdate, NewComment, NewContent, NewCourse, Role};
use crate::error::{Result, ServerError};
use crate::service;
use crate::store::CourseStore;
use crate::utils::apply_discount;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub auth: AuthManager,
}

impl AppState {
    pub fn new(store: Arc<dyn CourseStore>, auth: AuthManager) -> Self {
        Self { store, auth }
    }

    fn store(&self) -> &dyn CourseStore {
        self.store.as_ref()
    }
}

/// Resolve the bearer token into the caller's identity
fn require_auth(headers: &HeaderMap, auth: &AuthManager) -> Result<AuthContext> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ServerError::AuthRequired)?;
    let auth_str = header_value.to_str().map_err(|_| ServerError::AuthFailed)?;
    Ok(auth.validate_bearer(auth_str)?.auth_context())
}

/// JSON response helper
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, Json(body)).into_response()
}

fn message(status: StatusCode, msg: String) -> Response {
    json_response(status, &serde_json::json!({ "message": msg }))
}

// ============================================================================
// Misc
// ============================================================================

/// GET /api/v1/hello
pub async fn hello() -> Response {
    json_response(StatusCode::OK, &serde_json::json!({ "msg": "Hello World" }))
}

/// Health check endpoint
pub async fn health() -> Response {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/auth/sign-up
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response> {
    let user = state
        .auth
        .register(state.store(), &req.username, &req.password)
        .await?;
    Ok(json_response(
        StatusCode::CREATED,
        &serde_json::json!({ "id": user.id, "username": user.username }),
    ))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response> {
    let token = state
        .auth
        .authenticate(state.store(), &req.username, &req.password)
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({
            "access": token.token,
            "username": token.username,
            "expires_at": token.expires_at_secs()
        }),
    ))
}

/// POST /api/v1/auth/sign-out
pub async fn sign_out(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    require_auth(&headers, &state.auth)?;
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        state.auth.revoke_token(token.trim());
    }
    Ok(message(StatusCode::OK, "Signed out".to_string()))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    service::delete_user(state.store(), &caller, user_id).await?;
    state.auth.revoke_user(user_id);
    Ok(message(StatusCode::OK, format!("User {} deleted", user_id)))
}

// ============================================================================
// Courses
// ============================================================================

#[derive(Serialize)]
pub struct CourseList {
    pub items: Vec<Course>,
    pub count: usize,
}

#[derive(Deserialize)]
pub struct CourseQuery {
    /// Percentage discount to price the course at
    pub discount: Option<i64>,
}

#[derive(Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<i64>,
}

/// GET /api/v1/courses
pub async fn list_courses(State(state): State<Arc<AppState>>) -> Result<Response> {
    let items = service::list_courses(state.store()).await?;
    let count = items.len();
    Ok(json_response(StatusCode::OK, &CourseList { items, count }))
}

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewCourse>,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    req.validate()?;
    let course = service::create_course(state.store(), &caller, req).await?;
    Ok(json_response(StatusCode::CREATED, &course))
}

/// GET /api/v1/courses/:id
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    Query(query): Query<CourseQuery>,
) -> Result<Response> {
    let course = service::get_course(state.store(), course_id).await?;
    let discounted_price = query
        .discount
        .map(|percent| apply_discount(course.price, percent))
        .transpose()?;
    Ok(json_response(
        StatusCode::OK,
        &CourseDetail {
            course,
            discounted_price,
        },
    ))
}

/// POST /api/v1/courses/:id
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<CourseUpdate>,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    req.validate()?;
    let course = service::update_course(state.store(), &caller, course_id, req).await?;
    Ok(json_response(StatusCode::OK, &course))
}

/// DELETE /api/v1/courses/:id
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    service::delete_course(state.store(), &caller, course_id).await?;
    Ok(message(StatusCode::OK, format!("Course {} deleted", course_id)))
}

// ============================================================================
// Membership
// ============================================================================

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub user_id: i32,
    #[serde(default)]
    pub role: Role,
}

/// POST /api/v1/courses/:id/enroll
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    let member = service::enroll(state.store(), &caller, course_id).await?;
    Ok(json_response(StatusCode::OK, &member))
}

/// POST /api/v1/courses/:id/members
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<AddMemberRequest>,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    let member =
        service::add_member(state.store(), &caller, course_id, req.user_id, req.role).await?;
    Ok(json_response(StatusCode::CREATED, &member))
}

/// DELETE /api/v1/members/:id
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    service::remove_member(state.store(), &caller, member_id).await?;
    Ok(message(StatusCode::OK, format!("Member {} removed", member_id)))
}

// ============================================================================
// Contents
// ============================================================================

/// GET /api/v1/courses/:id/contents
pub async fn list_contents(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    let contents = service::list_contents(state.store(), &caller, course_id).await?;
    Ok(json_response(StatusCode::OK, &contents))
}

/// POST /api/v1/courses/:id/contents
pub async fn create_content(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<NewContent>,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    req.validate()?;
    let content = service::create_content(state.store(), &caller, course_id, req).await?;
    Ok(json_response(StatusCode::CREATED, &content))
}

/// DELETE /api/v1/contents/:id
pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    service::delete_content(state.store(), &caller, content_id).await?;
    Ok(message(StatusCode::OK, format!("Content {} deleted", content_id)))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/v1/contents/:id/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    let comments = service::list_comments(state.store(), &caller, content_id).await?;
    Ok(json_response(StatusCode::OK, &comments))
}

/// POST /api/v1/contents/:id/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(content_id): Path<i32>,
    headers: HeaderMap,
    Json(req): Json<NewComment>,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    req.validate()?;
    let comment = service::create_comment(state.store(), &caller, content_id, req).await?;
    Ok(json_response(StatusCode::CREATED, &comment))
}

/// DELETE /api/v1/comments/:id
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = require_auth(&headers, &state.auth)?;
    service::delete_comment(state.store(), &caller, comment_id).await?;
    Ok(message(StatusCode::OK, format!("Comment {} deleted", comment_id)))
}
