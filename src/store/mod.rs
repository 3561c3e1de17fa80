//! Data store abstraction.
//!
//! The service layer only talks to a [`CourseStore`]. Two backends exist:
//! - [`SqlStore`]: SeaORM over SQLite, constraints enforced by the schema
//! - [`MemoryStore`]: in-process tables behind a single lock
//!
//! Both enforce the same referential rules. Users, courses, memberships and
//! content are restrict-on-delete while referenced; comments cascade when
//! their content or membership goes away. A (course, user) pair has at most
//! one membership. A content's parent and a comment's member must belong to
//! the same course as the content.

mod memory;
mod sql;

use async_trait::async_trait;

use crate::domain::{Comment, Course, CourseContent, CourseMember, NewContent, NewCourse, Role, User};
use crate::error::Result;

pub use memory::MemoryStore;
pub use sql::SqlStore;

#[async_trait]
pub trait CourseStore: Send + Sync {
    // Users

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_user(&self, id: i32) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `ReferentialRestriction` while the user teaches a course
    /// or holds a membership.
    async fn delete_user(&self, id: i32) -> Result<()>;

    // Courses

    /// All courses, newest first
    async fn list_courses(&self) -> Result<Vec<Course>>;

    async fn find_course(&self, id: i32) -> Result<Option<Course>>;

    async fn insert_course(&self, teacher_id: i32, course: &NewCourse) -> Result<Course>;

    /// Persist every mutable field of `course` and refresh `updated_at`.
    async fn update_course(&self, course: &Course) -> Result<Course>;

    /// Fails with `ReferentialRestriction` while members or contents exist.
    async fn delete_course(&self, id: i32) -> Result<()>;

    // Memberships

    async fn find_membership(&self, course_id: i32, user_id: i32) -> Result<Option<CourseMember>>;

    async fn find_member(&self, id: i32) -> Result<Option<CourseMember>>;

    async fn list_members(&self, course_id: i32) -> Result<Vec<CourseMember>>;

    /// Fails with `AlreadyEnrolled` if the pair already has a membership.
    async fn insert_member(&self, course_id: i32, user_id: i32, role: Role) -> Result<CourseMember>;

    /// Removes the membership and, by cascade, its comments.
    async fn delete_member(&self, id: i32) -> Result<()>;

    // Contents

    async fn find_content(&self, id: i32) -> Result<Option<CourseContent>>;

    async fn list_contents(&self, course_id: i32) -> Result<Vec<CourseContent>>;

    /// Fails with `Validation` if the parent belongs to another course.
    async fn insert_content(&self, course_id: i32, content: &NewContent) -> Result<CourseContent>;

    /// Fails with `ReferentialRestriction` while child contents exist.
    /// Comments on the content are removed by cascade.
    async fn delete_content(&self, id: i32) -> Result<()>;

    // Comments

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>>;

    /// Comments on a content, oldest first
    async fn list_comments(&self, content_id: i32) -> Result<Vec<Comment>>;

    /// Fails with `NotEnrolled` if the membership is for another course.
    async fn insert_comment(&self, content_id: i32, member_id: i32, body: &str) -> Result<Comment>;

    async fn delete_comment(&self, id: i32) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod tests {
    //! Behaviour every backend must share. Each backend's own test module
    //! runs these against a fresh instance.

    use super::*;
    use crate::error::ServerError;

    pub(crate) fn course(name: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            description: Some("Learn it from scratch.".to_string()),
            price: 100,
            image: None,
        }
    }

    pub(crate) fn content(name: &str, parent_id: Option<i32>) -> NewContent {
        NewContent {
            name: name.to_string(),
            description: None,
            video_url: None,
            file_attachment: None,
            parent_id,
        }
    }

    pub(crate) async fn membership_is_unique(store: &dyn CourseStore) {
        let teacher = store.create_user("teacher1", "x").await.unwrap();
        let student = store.create_user("student1", "x").await.unwrap();
        let c = store.insert_course(teacher.id, &course("Rust")).await.unwrap();

        assert!(store.find_membership(c.id, student.id).await.unwrap().is_none());
        let member = store.insert_member(c.id, student.id, Role::Student).await.unwrap();
        assert_eq!(member.role, Role::Student);
        assert_eq!(
            store.find_membership(c.id, student.id).await.unwrap(),
            Some(member.clone())
        );

        let dup = store.insert_member(c.id, student.id, Role::Assistant).await;
        assert!(matches!(dup, Err(ServerError::AlreadyEnrolled { .. })));
        assert_eq!(store.list_members(c.id).await.unwrap().len(), 1);
    }

    pub(crate) async fn restricts_deletes(store: &dyn CourseStore) {
        let teacher = store.create_user("teacher1", "x").await.unwrap();
        let student = store.create_user("student1", "x").await.unwrap();
        let c = store.insert_course(teacher.id, &course("Rust")).await.unwrap();

        // Teacher is referenced by the course
        assert!(matches!(
            store.delete_user(teacher.id).await,
            Err(ServerError::ReferentialRestriction(_))
        ));

        let member = store.insert_member(c.id, student.id, Role::Student).await.unwrap();
        assert!(matches!(
            store.delete_user(student.id).await,
            Err(ServerError::ReferentialRestriction(_))
        ));
        assert!(matches!(
            store.delete_course(c.id).await,
            Err(ServerError::ReferentialRestriction(_))
        ));

        let parent = store.insert_content(c.id, &content("Module 1", None)).await.unwrap();
        let child = store
            .insert_content(c.id, &content("Lesson 1", Some(parent.id)))
            .await
            .unwrap();
        assert!(matches!(
            store.delete_content(parent.id).await,
            Err(ServerError::ReferentialRestriction(_))
        ));

        store.delete_content(child.id).await.unwrap();
        store.delete_content(parent.id).await.unwrap();
        store.delete_member(member.id).await.unwrap();
        store.delete_course(c.id).await.unwrap();
        store.delete_user(student.id).await.unwrap();
        store.delete_user(teacher.id).await.unwrap();
        assert!(store.find_user(teacher.id).await.unwrap().is_none());
    }

    pub(crate) async fn cascades_comments(store: &dyn CourseStore) {
        let teacher = store.create_user("teacher1", "x").await.unwrap();
        let student = store.create_user("student1", "x").await.unwrap();
        let c = store.insert_course(teacher.id, &course("Rust")).await.unwrap();
        let member = store.insert_member(c.id, student.id, Role::Student).await.unwrap();
        let lesson = store.insert_content(c.id, &content("Lesson 1", None)).await.unwrap();
        let other = store.insert_content(c.id, &content("Lesson 2", None)).await.unwrap();

        let on_lesson = store.insert_comment(lesson.id, member.id, "first").await.unwrap();
        let on_other = store.insert_comment(other.id, member.id, "second").await.unwrap();
        assert_eq!(store.list_comments(lesson.id).await.unwrap(), vec![on_lesson.clone()]);

        store.delete_content(lesson.id).await.unwrap();
        assert!(store.find_comment(on_lesson.id).await.unwrap().is_none());
        assert!(store.find_comment(on_other.id).await.unwrap().is_some());

        store.delete_member(member.id).await.unwrap();
        assert!(store.find_comment(on_other.id).await.unwrap().is_none());
    }

    pub(crate) async fn updates_courses(store: &dyn CourseStore) {
        let teacher = store.create_user("teacher1", "x").await.unwrap();
        let first = store.insert_course(teacher.id, &course("First")).await.unwrap();
        let second = store.insert_course(teacher.id, &course("Second")).await.unwrap();

        let listed = store.list_courses().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        let mut changed = first.clone();
        changed.name = "Renamed".to_string();
        changed.price = 250;
        let saved = store.update_course(&changed).await.unwrap();
        assert_eq!(saved.name, "Renamed");
        assert_eq!(saved.price, 250);
        assert!(saved.updated_at >= first.updated_at);
        assert_eq!(store.find_course(first.id).await.unwrap(), Some(saved));

        assert!(matches!(
            store.delete_course(9999).await,
            Err(ServerError::NotFound(_))
        ));
    }

    pub(crate) async fn unique_usernames(store: &dyn CourseStore) {
        let user = store.create_user("alice", "hash").await.unwrap();
        assert_eq!(
            store.find_user_by_username("alice").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
        assert!(matches!(
            store.create_user("alice", "other").await,
            Err(ServerError::Validation(_))
        ));
    }

    pub(crate) async fn rejects_cross_course_rows(store: &dyn CourseStore) {
        let teacher = store.create_user("teacher1", "x").await.unwrap();
        let student = store.create_user("student1", "x").await.unwrap();
        let a = store.insert_course(teacher.id, &course("Rust")).await.unwrap();
        let b = store.insert_course(teacher.id, &course("Go")).await.unwrap();
        let member_of_a = store.insert_member(a.id, student.id, Role::Student).await.unwrap();
        let content_of_b = store.insert_content(b.id, &content("Goroutines", None)).await.unwrap();

        assert!(matches!(
            store.insert_comment(content_of_b.id, member_of_a.id, "hi").await,
            Err(ServerError::NotEnrolled(id)) if id == b.id
        ));
        assert!(store.list_comments(content_of_b.id).await.unwrap().is_empty());

        assert!(matches!(
            store.insert_content(a.id, &content("Borrowing", Some(content_of_b.id))).await,
            Err(ServerError::Validation(_))
        ));
        assert!(store.list_contents(a.id).await.unwrap().is_empty());
    }
}
