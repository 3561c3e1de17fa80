use crate::domain::{AuthContext, Course, CourseUpdate, NewCourse};
use crate::error::{Result, ServerError};
use crate::store::CourseStore;

pub async fn list_courses(store: &dyn CourseStore) -> Result<Vec<Course>> {
    store.list_courses().await
}

pub async fn get_course(store: &dyn CourseStore, course_id: i32) -> Result<Course> {
    store
        .find_course(course_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("course {}", course_id)))
}

/// Load a course and make sure the caller teaches it.
pub(crate) async fn owned_course(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course_id: i32,
) -> Result<Course> {
    let course = get_course(store, course_id).await?;
    if !course.is_teacher(auth.user_id) {
        return Err(ServerError::PermissionDenied);
    }
    Ok(course)
}

/// Create a course taught by the caller.
pub async fn create_course(
    store: &dyn CourseStore,
    auth: &AuthContext,
    new: NewCourse,
) -> Result<Course> {
    new.validate()?;
    let course = store.insert_course(auth.user_id, &new).await?;
    tracing::info!("{} created course {} ({})", auth.username, course.id, course.name);
    Ok(course)
}

pub async fn update_course(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course_id: i32,
    update: CourseUpdate,
) -> Result<Course> {
    update.validate()?;
    let mut course = owned_course(store, auth, course_id).await?;
    update.apply_to(&mut course);
    store.update_course(&course).await
}

pub async fn delete_course(store: &dyn CourseStore, auth: &AuthContext, course_id: i32) -> Result<()> {
    owned_course(store, auth, course_id).await?;
    store.delete_course(course_id).await?;
    tracing::info!("{} deleted course {}", auth.username, course_id);
    Ok(())
}
