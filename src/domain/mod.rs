//! Domain records for courses, memberships, content and comments.
//!
//! These are the typed values the service layer and the API exchange. The
//! database entities in [`crate::db::entities`] convert into them, so nothing
//! outside the store deals with ORM models.

pub mod input;
pub mod records;
pub mod role;

pub use input::{CourseUpdate, NewComment, NewContent, NewCourse};
pub use records::{Comment, Course, CourseContent, CourseMember, User};
pub use role::Role;

/// The authenticated caller of a service operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i32,
    pub username: String,
}

impl AuthContext {
    pub fn new(user_id: i32, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Current Unix time in seconds
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
