use crate::domain::AuthContext;
use crate::error::{Result, ServerError};
use crate::store::CourseStore;

/// Delete the caller's own account. Blocked while they teach a course or
/// hold any membership.
pub async fn delete_user(store: &dyn CourseStore, auth: &AuthContext, user_id: i32) -> Result<()> {
    if auth.user_id != user_id {
        return Err(ServerError::PermissionDenied);
    }
    store.delete_user(user_id).await?;
    tracing::info!("Deleted user {} ({})", user_id, auth.username);
    Ok(())
}
