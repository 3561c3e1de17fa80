//! Comment entity - remarks left by members on content

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub content_id: i32,
    pub member_id: i32,
    pub comment: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_content::Entity",
        from = "Column::ContentId",
        to = "super::course_content::Column::Id"
    )]
    Content,
    #[sea_orm(
        belongs_to = "super::course_member::Entity",
        from = "Column::MemberId",
        to = "super::course_member::Column::Id"
    )]
    Member,
}

impl Related<super::course_content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::course_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Comment {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            content_id: m.content_id,
            member_id: m.member_id,
            comment: m.comment,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
