use crate::domain::{AuthContext, CourseContent, NewContent};
use crate::error::{Result, ServerError};
use crate::store::CourseStore;

use super::courses::{get_course, owned_course};
use super::enrollment::require_participant;

/// Add content to a course. Teacher only; a parent must belong to the same
/// course.
pub async fn create_content(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course_id: i32,
    new: NewContent,
) -> Result<CourseContent> {
    new.validate()?;
    let course = owned_course(store, auth, course_id).await?;

    if let Some(parent_id) = new.parent_id {
        let parent = store
            .find_content(parent_id)
            .await?
            .ok_or_else(|| ServerError::Validation(format!("parent content {} does not exist", parent_id)))?;
        if parent.course_id != course.id {
            return Err(ServerError::Validation(format!(
                "parent content {} belongs to another course",
                parent_id
            )));
        }
    }

    let content = store.insert_content(course.id, &new).await?;
    tracing::debug!("Created content {}", content.label(&course));
    Ok(content)
}

pub async fn list_contents(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course_id: i32,
) -> Result<Vec<CourseContent>> {
    let course = get_course(store, course_id).await?;
    require_participant(store, auth, &course).await?;
    store.list_contents(course.id).await
}

/// Delete content and its comments. Teacher only; blocked while child
/// contents exist.
pub async fn delete_content(store: &dyn CourseStore, auth: &AuthContext, content_id: i32) -> Result<()> {
    let content = store
        .find_content(content_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("content {}", content_id)))?;
    owned_course(store, auth, content.course_id).await?;
    store.delete_content(content.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewCourse;
    use crate::service::{create_course, enroll};
    use crate::service::fixtures::world;

    fn lesson(name: &str, parent_id: Option<i32>) -> NewContent {
        NewContent {
            name: name.to_string(),
            description: Some("Content Description".to_string()),
            video_url: None,
            file_attachment: None,
            parent_id,
        }
    }

    #[tokio::test]
    async fn test_nested_content() {
        let w = world().await;
        let module = create_content(&w.store, &w.teacher, w.course.id, lesson("Module 1", None))
            .await
            .unwrap();
        let child = create_content(&w.store, &w.teacher, w.course.id, lesson("Lesson 1", Some(module.id)))
            .await
            .unwrap();
        assert_eq!(child.parent_id, Some(module.id));
        assert_eq!(child.label(&w.course), "[Rust for Beginners] Lesson 1");

        let listed = list_contents(&w.store, &w.teacher, w.course.id).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_parent_from_other_course_rejected() {
        let w = world().await;
        let other = create_course(
            &w.store,
            &w.teacher,
            NewCourse {
                name: "Advanced Rust".to_string(),
                description: None,
                price: 200,
                image: None,
            },
        )
        .await
        .unwrap();
        let foreign = create_content(&w.store, &w.teacher, other.id, lesson("Elsewhere", None))
            .await
            .unwrap();

        let err = create_content(&w.store, &w.teacher, w.course.id, lesson("Child", Some(foreign.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_content_access() {
        let w = world().await;
        assert!(matches!(
            create_content(&w.store, &w.student, w.course.id, lesson("Hijack", None)).await,
            Err(ServerError::PermissionDenied)
        ));
        assert!(matches!(
            list_contents(&w.store, &w.student, w.course.id).await,
            Err(ServerError::NotEnrolled(_))
        ));

        enroll(&w.store, &w.student, w.course.id).await.unwrap();
        assert!(list_contents(&w.store, &w.student, w.course.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_content_restricted_by_children() {
        let w = world().await;
        let module = create_content(&w.store, &w.teacher, w.course.id, lesson("Module 1", None))
            .await
            .unwrap();
        create_content(&w.store, &w.teacher, w.course.id, lesson("Lesson 1", Some(module.id)))
            .await
            .unwrap();

        assert!(matches!(
            delete_content(&w.store, &w.teacher, module.id).await,
            Err(ServerError::ReferentialRestriction(_))
        ));
    }
}
