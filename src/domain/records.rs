//! Stored records as seen by the service layer.

use std::fmt;

use serde::Serialize;

use super::Role;

/// A user account. Only what authentication and references need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    /// Banner image reference
    pub image: Option<String>,
    pub teacher_id: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Course {
    pub fn is_teacher(&self, user_id: i32) -> bool {
        self.teacher_id == user_id
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Enrollment of a user in a course.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CourseMember {
    pub id: i32,
    pub course_id: i32,
    pub user_id: i32,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CourseMember {
    /// `"<course> : <username>"`
    pub fn label(course: &Course, username: &str) -> String {
        format!("{} : {}", course, username)
    }
}

/// A lesson or module inside a course, optionally nested under another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CourseContent {
    pub id: i32,
    pub course_id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub video_url: Option<String>,
    pub file_attachment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CourseContent {
    /// `"[<course>] <content>"`
    pub fn label(&self, course: &Course) -> String {
        format!("[{}] {}", course, self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i32,
    pub content_id: i32,
    pub member_id: i32,
    pub comment: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Comment {
    /// `"Comment: <content>-<username>"`
    pub fn label(content: &CourseContent, username: &str) -> String {
        format!("Comment: {}-{}", content.name, username)
    }
}
