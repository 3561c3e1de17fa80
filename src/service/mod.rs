//! Course operations.
//!
//! Every operation takes the store handle explicitly and, when the caller's
//! identity matters, an [`AuthContext`](crate::domain::AuthContext). Nothing
//! here keeps state of its own.

pub mod comments;
pub mod contents;
pub mod courses;
pub mod enrollment;
pub mod users;

pub use comments::{create_comment, delete_comment, list_comments};
pub use contents::{create_content, delete_content, list_contents};
pub use courses::{create_course, delete_course, get_course, list_courses, update_course};
pub use enrollment::{add_member, enroll, is_member, remove_member};
pub use users::delete_user;
