//! Request payloads with their field validation.
//!
//! Each payload is validated at the API boundary and again by the service
//! before anything reaches the store.

use serde::{Deserialize, Deserializer};

use crate::error::{Result, ServerError};

pub const MAX_COURSE_NAME: usize = 255;
pub const MAX_CONTENT_NAME: usize = 200;
pub const MAX_VIDEO_URL: usize = 200;

/// Description stored for content created without one
pub const DEFAULT_CONTENT_DESCRIPTION: &str = "-";

fn check_name(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServerError::Validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max {
        return Err(ServerError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn check_price(price: i64) -> Result<()> {
    if price < 0 {
        return Err(ServerError::Validation("price must not be negative".to_string()));
    }
    Ok(())
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewCourse {
    pub fn validate(&self) -> Result<()> {
        check_name("name", &self.name, MAX_COURSE_NAME)?;
        check_price(self.price)
    }
}

/// Present-but-null becomes `Some(None)`; an absent field stays `None`.
fn nullable<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial course update. Absent fields keep their current value; an
/// explicit `null` clears `description` or `image`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourseUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

impl CourseUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_name("name", name, MAX_COURSE_NAME)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        Ok(())
    }

    pub fn apply_to(self, course: &mut super::Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(image) = self.image {
            course.image = image;
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewContent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub file_attachment: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

impl NewContent {
    pub fn validate(&self) -> Result<()> {
        check_name("name", &self.name, MAX_CONTENT_NAME)?;
        if let Some(url) = &self.video_url {
            if url.chars().count() > MAX_VIDEO_URL {
                return Err(ServerError::Validation(format!(
                    "video_url must be at most {} characters",
                    MAX_VIDEO_URL
                )));
            }
        }
        Ok(())
    }

    pub fn description_or_default(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_DESCRIPTION.to_string())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewComment {
    pub comment: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<()> {
        if self.comment.trim().is_empty() {
            return Err(ServerError::Validation("comment cannot be empty".to_string()));
        }
        Ok(())
    }
}
