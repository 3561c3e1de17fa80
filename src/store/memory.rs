//! In-process store.
//!
//! All tables sit behind one lock so that every check-then-write (uniqueness,
//! restrict, cascade) happens atomically.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::CourseStore;
use crate::domain::{
    now, Comment, Course, CourseContent, CourseMember, NewContent, NewCourse, Role, User,
};
use crate::error::{Result, ServerError};

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

// derive(Default) would demand T: Default
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    courses: Table<Course>,
    members: Table<CourseMember>,
    contents: Table<CourseContent>,
    comments: Table<Comment>,
}

/// Store backed by in-memory tables
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut t = self.tables.write();
        if t.users.rows.values().any(|u| u.username == username) {
            return Err(ServerError::Validation(format!(
                "username '{}' is already taken",
                username
            )));
        }
        let user = User {
            id: t.users.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now(),
        };
        t.users.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.tables.read().users.rows.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let t = self.tables.read();
        Ok(t.users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, id: i32) -> Result<()> {
        let mut t = self.tables.write();
        if !t.users.rows.contains_key(&id) {
            return Err(ServerError::NotFound(format!("user {}", id)));
        }
        if t.courses.rows.values().any(|c| c.teacher_id == id) {
            return Err(ServerError::ReferentialRestriction(format!(
                "user {} (teaches a course)",
                id
            )));
        }
        if t.members.rows.values().any(|m| m.user_id == id) {
            return Err(ServerError::ReferentialRestriction(format!(
                "user {} (enrolled in a course)",
                id
            )));
        }
        t.users.rows.remove(&id);
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let t = self.tables.read();
        let mut courses: Vec<Course> = t.courses.rows.values().cloned().collect();
        courses.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(courses)
    }

    async fn find_course(&self, id: i32) -> Result<Option<Course>> {
        Ok(self.tables.read().courses.rows.get(&id).cloned())
    }

    async fn insert_course(&self, teacher_id: i32, course: &NewCourse) -> Result<Course> {
        let mut t = self.tables.write();
        if !t.users.rows.contains_key(&teacher_id) {
            return Err(ServerError::NotFound(format!("user {}", teacher_id)));
        }
        let ts = now();
        let course = Course {
            id: t.courses.next_id(),
            name: course.name.clone(),
            description: course.description.clone(),
            price: course.price,
            image: course.image.clone(),
            teacher_id,
            created_at: ts,
            updated_at: ts,
        };
        t.courses.rows.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, course: &Course) -> Result<Course> {
        let mut t = self.tables.write();
        let stored = t
            .courses
            .rows
            .get_mut(&course.id)
            .ok_or_else(|| ServerError::NotFound(format!("course {}", course.id)))?;
        stored.name = course.name.clone();
        stored.description = course.description.clone();
        stored.price = course.price;
        stored.image = course.image.clone();
        stored.updated_at = now();
        Ok(stored.clone())
    }

    async fn delete_course(&self, id: i32) -> Result<()> {
        let mut t = self.tables.write();
        if !t.courses.rows.contains_key(&id) {
            return Err(ServerError::NotFound(format!("course {}", id)));
        }
        if t.members.rows.values().any(|m| m.course_id == id) {
            return Err(ServerError::ReferentialRestriction(format!(
                "course {} (has members)",
                id
            )));
        }
        if t.contents.rows.values().any(|c| c.course_id == id) {
            return Err(ServerError::ReferentialRestriction(format!(
                "course {} (has contents)",
                id
            )));
        }
        t.courses.rows.remove(&id);
        Ok(())
    }

    async fn find_membership(&self, course_id: i32, user_id: i32) -> Result<Option<CourseMember>> {
        let t = self.tables.read();
        Ok(t
            .members
            .rows
            .values()
            .find(|m| m.course_id == course_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_member(&self, id: i32) -> Result<Option<CourseMember>> {
        Ok(self.tables.read().members.rows.get(&id).cloned())
    }

    async fn list_members(&self, course_id: i32) -> Result<Vec<CourseMember>> {
        let t = self.tables.read();
        Ok(t
            .members
            .rows
            .values()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn insert_member(&self, course_id: i32, user_id: i32, role: Role) -> Result<CourseMember> {
        let mut t = self.tables.write();
        if !t.courses.rows.contains_key(&course_id) {
            return Err(ServerError::NotFound(format!("course {}", course_id)));
        }
        if !t.users.rows.contains_key(&user_id) {
            return Err(ServerError::NotFound(format!("user {}", user_id)));
        }
        if t
            .members
            .rows
            .values()
            .any(|m| m.course_id == course_id && m.user_id == user_id)
        {
            return Err(ServerError::AlreadyEnrolled { course_id, user_id });
        }
        let ts = now();
        let member = CourseMember {
            id: t.members.next_id(),
            course_id,
            user_id,
            role,
            created_at: ts,
            updated_at: ts,
        };
        t.members.rows.insert(member.id, member.clone());
        Ok(member)
    }

    async fn delete_member(&self, id: i32) -> Result<()> {
        let mut t = self.tables.write();
        if t.members.rows.remove(&id).is_none() {
            return Err(ServerError::NotFound(format!("member {}", id)));
        }
        t.comments.rows.retain(|_, c| c.member_id != id);
        Ok(())
    }

    async fn find_content(&self, id: i32) -> Result<Option<CourseContent>> {
        Ok(self.tables.read().contents.rows.get(&id).cloned())
    }

    async fn list_contents(&self, course_id: i32) -> Result<Vec<CourseContent>> {
        let t = self.tables.read();
        Ok(t
            .contents
            .rows
            .values()
            .filter(|c| c.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn insert_content(&self, course_id: i32, content: &NewContent) -> Result<CourseContent> {
        let mut t = self.tables.write();
        if !t.courses.rows.contains_key(&course_id) {
            return Err(ServerError::NotFound(format!("course {}", course_id)));
        }
        if let Some(parent_id) = content.parent_id {
            let parent = t
                .contents
                .rows
                .get(&parent_id)
                .ok_or_else(|| ServerError::NotFound(format!("content {}", parent_id)))?;
            if parent.course_id != course_id {
                return Err(ServerError::Validation(format!(
                    "parent content {} belongs to another course",
                    parent_id
                )));
            }
        }
        let ts = now();
        let content = CourseContent {
            id: t.contents.next_id(),
            course_id,
            parent_id: content.parent_id,
            name: content.name.clone(),
            description: content.description_or_default(),
            video_url: content.video_url.clone(),
            file_attachment: content.file_attachment.clone(),
            created_at: ts,
            updated_at: ts,
        };
        t.contents.rows.insert(content.id, content.clone());
        Ok(content)
    }

    async fn delete_content(&self, id: i32) -> Result<()> {
        let mut t = self.tables.write();
        if !t.contents.rows.contains_key(&id) {
            return Err(ServerError::NotFound(format!("content {}", id)));
        }
        if t.contents.rows.values().any(|c| c.parent_id == Some(id)) {
            return Err(ServerError::ReferentialRestriction(format!(
                "content {} (has child contents)",
                id
            )));
        }
        t.contents.rows.remove(&id);
        t.comments.rows.retain(|_, c| c.content_id != id);
        Ok(())
    }

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>> {
        Ok(self.tables.read().comments.rows.get(&id).cloned())
    }

    async fn list_comments(&self, content_id: i32) -> Result<Vec<Comment>> {
        let t = self.tables.read();
        Ok(t
            .comments
            .rows
            .values()
            .filter(|c| c.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn insert_comment(&self, content_id: i32, member_id: i32, body: &str) -> Result<Comment> {
        let mut t = self.tables.write();
        let course_id = t
            .contents
            .rows
            .get(&content_id)
            .map(|c| c.course_id)
            .ok_or_else(|| ServerError::NotFound(format!("content {}", content_id)))?;
        let member = t
            .members
            .rows
            .get(&member_id)
            .ok_or_else(|| ServerError::NotFound(format!("member {}", member_id)))?;
        if member.course_id != course_id {
            return Err(ServerError::NotEnrolled(course_id));
        }
        let ts = now();
        let comment = Comment {
            id: t.comments.next_id(),
            content_id,
            member_id,
            comment: body.to_string(),
            created_at: ts,
            updated_at: ts,
        };
        t.comments.rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: i32) -> Result<()> {
        let mut t = self.tables.write();
        if t.comments.rows.remove(&id).is_none() {
            return Err(ServerError::NotFound(format!("comment {}", id)));
        }
        Ok(())
    }
}
