use crate::domain::{AuthContext, Comment, CourseContent, NewComment, Role};
use crate::error::{Result, ServerError};
use crate::store::CourseStore;

use super::courses::get_course;
use super::enrollment::{require_member, require_participant};

async fn get_content(store: &dyn CourseStore, content_id: i32) -> Result<CourseContent> {
    store
        .find_content(content_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("content {}", content_id)))
}

/// Comment on content as the caller's membership in the content's course.
pub async fn create_comment(
    store: &dyn CourseStore,
    auth: &AuthContext,
    content_id: i32,
    new: NewComment,
) -> Result<Comment> {
    new.validate()?;
    let content = get_content(store, content_id).await?;
    let course = get_course(store, content.course_id).await?;
    let member = require_member(store, auth, &course).await?;

    let comment = store.insert_comment(content.id, member.id, &new.comment).await?;
    tracing::debug!("{}", Comment::label(&content, &auth.username));
    Ok(comment)
}

pub async fn list_comments(
    store: &dyn CourseStore,
    auth: &AuthContext,
    content_id: i32,
) -> Result<Vec<Comment>> {
    let content = get_content(store, content_id).await?;
    let course = get_course(store, content.course_id).await?;
    require_participant(store, auth, &course).await?;
    store.list_comments(content.id).await
}

/// Delete a comment. Allowed for its author, the course teacher and the
/// course's assistants.
pub async fn delete_comment(store: &dyn CourseStore, auth: &AuthContext, comment_id: i32) -> Result<()> {
    let comment = store
        .find_comment(comment_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("comment {}", comment_id)))?;
    let content = get_content(store, comment.content_id).await?;
    let course = get_course(store, content.course_id).await?;

    let allowed = if course.is_teacher(auth.user_id) {
        true
    } else {
        match store.find_membership(course.id, auth.user_id).await? {
            Some(m) => m.id == comment.member_id || m.role == Role::Assistant,
            None => false,
        }
    };
    if !allowed {
        return Err(ServerError::PermissionDenied);
    }

    store.delete_comment(comment.id).await?;
    tracing::info!("{} deleted comment {}", auth.username, comment.id);
    Ok(())
}
