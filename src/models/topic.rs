use crate::pagination::PAGE_SIZE;
use crate::utils::slugify;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub topic_id: i32,
    pub title: String,
    pub author_id: i32,
    pub category_id: Option<i32>,
    pub created: DateTime,
    /// Time of the latest message in the topic.
    pub updated: DateTime,
    /// Messages after the opening one.
    pub replies: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::UserId"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::CategoryId"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Number of message pages, counting the opening message.
    pub fn pages(&self) -> u64 {
        (self.replies.max(0) as u64 + 1).div_ceil(PAGE_SIZE)
    }

    /// Total number of messages in the topic.
    pub fn message_count(&self) -> u64 {
        self.replies.max(0) as u64 + 1
    }
}

/// A topic joined with its author and, when set, its category.
#[derive(Clone, Debug, PartialEq)]
pub struct TopicWithUserCategory {
    pub topic: Model,
    pub author: super::user::Model,
    pub category: Option<super::category::Model>,
}
