//! Post entity for SeaORM. Likes live in the `post_likes` join table.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use forno_core::domain::{Post, PostStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub status: String,
    pub views: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::post_like::Entity")]
    PostLike,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostLike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn status_from_str(raw: &str) -> PostStatus {
    match raw {
        "draft" => PostStatus::Draft,
        _ => PostStatus::Published,
    }
}

/// Conversion from SeaORM Model to Domain Post. The like set is not part
/// of this table; the store fills it in from `post_likes`.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            category: model.category,
            tags: model.tags,
            author: model.author_id,
            status: status_from_str(&model.status),
            views: model.views,
            likes: Vec::new(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            description: Set(post.description),
            image: Set(post.image),
            category: Set(post.category),
            tags: Set(post.tags),
            author_id: Set(post.author),
            status: Set(post.status.as_str().to_string()),
            views: Set(post.views),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
