//! Course content entity - lessons and modules, optionally nested

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course_contents")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::CourseContent {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            parent_id: m.parent_id,
            name: m.name,
            description: m.description,
            video_url: m.video_url,
            file_attachment: m.file_attachment,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
