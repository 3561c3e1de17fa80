use crate::domain::{AuthContext, Course, CourseMember, Role};
use crate::error::{Result, ServerError};
use crate::store::CourseStore;

use super::courses::{get_course, owned_course};

/// True iff `user_id` holds a membership in `course_id`, whatever the role.
pub async fn is_member(store: &dyn CourseStore, course_id: i32, user_id: i32) -> Result<bool> {
    Ok(store.find_membership(course_id, user_id).await?.is_some())
}

/// Enroll the caller as a student.
pub async fn enroll(store: &dyn CourseStore, auth: &AuthContext, course_id: i32) -> Result<CourseMember> {
    let course = get_course(store, course_id).await?;
    if is_member(store, course.id, auth.user_id).await? {
        return Err(ServerError::AlreadyEnrolled {
            course_id: course.id,
            user_id: auth.user_id,
        });
    }

    let member = store.insert_member(course.id, auth.user_id, Role::Student).await?;
    tracing::info!("Enrolled {}", CourseMember::label(&course, &auth.username));
    Ok(member)
}

/// Enroll another user with an explicit role. Teacher only.
pub async fn add_member(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course_id: i32,
    user_id: i32,
    role: Role,
) -> Result<CourseMember> {
    let course = owned_course(store, auth, course_id).await?;
    if store.find_user(user_id).await?.is_none() {
        return Err(ServerError::NotFound(format!("user {}", user_id)));
    }
    if is_member(store, course.id, user_id).await? {
        return Err(ServerError::AlreadyEnrolled {
            course_id: course.id,
            user_id,
        });
    }

    let member = store.insert_member(course.id, user_id, role).await?;
    tracing::info!(
        "{} added user {} to course {} as {}",
        auth.username,
        user_id,
        course.id,
        role.label()
    );
    Ok(member)
}

/// Remove a membership and its comments. Allowed for the course teacher and
/// for the member themself.
pub async fn remove_member(store: &dyn CourseStore, auth: &AuthContext, member_id: i32) -> Result<()> {
    let member = store
        .find_member(member_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("member {}", member_id)))?;
    let course = get_course(store, member.course_id).await?;

    if member.user_id != auth.user_id && !course.is_teacher(auth.user_id) {
        return Err(ServerError::PermissionDenied);
    }

    store.delete_member(member.id).await
}

/// The caller's membership in `course`, or `NotEnrolled`.
pub(crate) async fn require_member(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course: &Course,
) -> Result<CourseMember> {
    store
        .find_membership(course.id, auth.user_id)
        .await?
        .ok_or(ServerError::NotEnrolled(course.id))
}

/// Teacher or any member may read course material.
pub(crate) async fn require_participant(
    store: &dyn CourseStore,
    auth: &AuthContext,
    course: &Course,
) -> Result<()> {
    if course.is_teacher(auth.user_id) {
        return Ok(());
    }
    require_member(store, auth, course).await.map(|_| ())
}
