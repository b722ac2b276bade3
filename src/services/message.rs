use crate::{
    error::AppResult,
    models::{message, MessageModel, MessageWithUser, UserModel},
};
use sea_orm::{prelude::DateTime, ActiveModelTrait, ConnectionTrait, FromQueryResult, Statement};

#[derive(Debug, FromQueryResult)]
struct MessageRow {
    message_id: i32,
    author_id: i32,
    topic_id: i32,
    content: String,
    created: DateTime,
    user_name: String,
}

impl From<MessageRow> for MessageWithUser {
    fn from(row: MessageRow) -> Self {
        Self {
            message: MessageModel {
                message_id: row.message_id,
                author_id: row.author_id,
                topic_id: row.topic_id,
                content: row.content,
                created: row.created,
            },
            author: UserModel {
                user_id: row.author_id,
                name: row.user_name,
            },
        }
    }
}

pub struct MessageService<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> MessageService<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Messages of a topic in posting order, bounded by `offset`/`limit`.
    pub async fn list_by_topic(
        &self,
        topic_id: i32,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<MessageWithUser>> {
        let rows = MessageRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "SELECT m.message_id, m.author_id, m.topic_id, m.content, m.created, \
                u.name AS user_name \
                FROM messages m \
                    INNER JOIN users u ON u.user_id = m.author_id \
                WHERE m.topic_id = $1 \
                ORDER BY m.created ASC, m.message_id ASC \
                OFFSET $2 LIMIT $3",
            [
                topic_id.into(),
                i64::try_from(offset).unwrap_or(i64::MAX).into(),
                i64::try_from(limit).unwrap_or(i64::MAX).into(),
            ],
        ))
        .all(self.db)
        .await?;

        Ok(rows.into_iter().map(MessageWithUser::from).collect())
    }

    pub async fn create(
        &self,
        topic_id: i32,
        author_id: i32,
        content: &str,
        now: DateTime,
    ) -> AppResult<MessageModel> {
        let new_message = message::ActiveModel {
            topic_id: sea_orm::ActiveValue::Set(topic_id),
            author_id: sea_orm::ActiveValue::Set(author_id),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            created: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let message = new_message.insert(self.db).await?;
        Ok(message)
    }
}
