use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Invalid operator")]
    InvalidOperator(String),

    #[error("Discount out of range: {0} (expected 0..=100)")]
    OutOfRange(i64),

    #[error("User {user_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { course_id: i32, user_id: i32 },

    #[error("Not enrolled in course {0}")]
    NotEnrolled(i32),

    #[error("Cannot delete {0}: still referenced")]
    ReferentialRestriction(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map a constraint violation reported by the database onto the domain
    /// error it stands for. Anything else stays a database error.
    pub fn from_constraint(err: DbErr, what: &str) -> Self {
        if is_foreign_key_violation(&err) {
            ServerError::ReferentialRestriction(what.to_string())
        } else {
            ServerError::Database(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::DivisionByZero
            | ServerError::InvalidOperator(_)
            | ServerError::OutOfRange(_)
            | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::AlreadyEnrolled { .. } | ServerError::ReferentialRestriction(_) => {
                StatusCode::CONFLICT
            }
            ServerError::NotEnrolled(_) | ServerError::PermissionDenied => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::AuthRequired | ServerError::AuthFailed => StatusCode::UNAUTHORIZED,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// SQLite reports a RESTRICT violation as extended code 1811, which
/// `DbErr::sql_err` does not classify, so the driver error is checked too.
fn is_foreign_key_violation(err: &DbErr) -> bool {
    if let Some(SqlErr::ForeignKeyConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => {
            matches!(e.code().as_deref(), Some("787") | Some("1811"))
                || e.message().contains("FOREIGN KEY constraint failed")
        }
        _ => false,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "detail": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
