use crate::{
    error::AppResult,
    models::{MessageModel, TopicModel, TopicWithUserCategory},
    services::{category::CategoryService, message::MessageService, topic::TopicService},
};
use sea_orm::{prelude::DateTime, DatabaseConnection, TransactionTrait};

/// Input of [`ForumService::create_topic`], already validated.
#[derive(Debug, Clone, Copy)]
pub struct NewTopic<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: i32,
    pub category_id: i32,
}

/// Write operations that touch several tables.
///
/// Each runs in its own transaction. Every early return drops the
/// transaction before `commit`, which rolls it back.
pub struct ForumService {
    db: DatabaseConnection,
}

impl ForumService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a topic together with its opening message.
    pub async fn create_topic(&self, new: NewTopic<'_>, now: DateTime) -> AppResult<TopicModel> {
        let txn = self.db.begin().await?;

        let topic = TopicService::new(&txn)
            .create(new.title, new.author_id, Some(new.category_id), now)
            .await?;
        MessageService::new(&txn)
            .create(topic.topic_id, new.author_id, new.content, now)
            .await?;
        CategoryService::new(&txn)
            .increment_topics(new.category_id)
            .await?;

        txn.commit().await?;

        tracing::info!(
            topic_id = topic.topic_id,
            author_id = new.author_id,
            "Topic created"
        );
        Ok(topic)
    }

    /// Append a reply to an existing topic.
    ///
    /// The returned topic already reflects the new reply.
    pub async fn create_reply(
        &self,
        topic_id: i32,
        author_id: i32,
        content: &str,
        now: DateTime,
    ) -> AppResult<(TopicWithUserCategory, MessageModel)> {
        let txn = self.db.begin().await?;

        let topics = TopicService::new(&txn);
        let mut topic = topics.get_by_id(topic_id).await?;
        let message = MessageService::new(&txn)
            .create(topic.topic.topic_id, author_id, content, now)
            .await?;
        topics.record_reply(topic.topic.topic_id, now).await?;

        txn.commit().await?;

        topic.topic.replies += 1;
        topic.topic.updated = now;

        tracing::info!(
            topic_id = topic.topic.topic_id,
            message_id = message.message_id,
            "Reply created"
        );
        Ok((topic, message))
    }
}
