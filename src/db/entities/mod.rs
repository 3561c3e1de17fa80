//! Database entities

pub mod comment;
pub mod course;
pub mod course_content;
pub mod course_member;
pub mod user;

pub use comment::Entity as Comment;
pub use course::Entity as Course;
pub use course_content::Entity as CourseContent;
pub use course_member::Entity as CourseMember;
pub use user::Entity as User;
