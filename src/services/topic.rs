use crate::{
    error::{AppError, AppResult},
    models::{topic, CategoryModel, TopicModel, TopicWithUserCategory, UserModel},
};
use sea_orm::{
    prelude::DateTime, ActiveModelTrait, ConnectionTrait, FromQueryResult, Statement, Value,
};

const TOPIC_SELECT: &str = "SELECT t.topic_id, t.title, t.author_id, t.category_id, \
        t.created, t.updated, t.replies, \
        u.name AS user_name, \
        c.name AS category_name, c.description AS category_description, \
        c.topics_count AS category_topics_count, c.color AS category_color \
    FROM topics t \
        INNER JOIN users u ON u.user_id = t.author_id \
        LEFT JOIN categories c ON c.category_id = t.category_id";

/// Flat result row of [`TOPIC_SELECT`].
#[derive(Debug, FromQueryResult)]
struct TopicRow {
    topic_id: i32,
    title: String,
    author_id: i32,
    category_id: Option<i32>,
    created: DateTime,
    updated: DateTime,
    replies: i32,
    user_name: String,
    category_name: Option<String>,
    category_description: Option<String>,
    category_topics_count: Option<i32>,
    category_color: Option<i32>,
}

impl From<TopicRow> for TopicWithUserCategory {
    fn from(row: TopicRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(category_id), Some(name)) => Some(CategoryModel {
                category_id,
                name,
                description: row.category_description.unwrap_or_default(),
                topics_count: row.category_topics_count.unwrap_or_default(),
                color: row.category_color.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            topic: TopicModel {
                topic_id: row.topic_id,
                title: row.title,
                author_id: row.author_id,
                category_id: row.category_id,
                created: row.created,
                updated: row.updated,
                replies: row.replies,
            },
            author: UserModel {
                user_id: row.author_id,
                name: row.user_name,
            },
            category,
        }
    }
}

/// `AND t.category_id IN (...)` for a non-empty filter, numbering
/// placeholders from `first_param`.
fn category_filter(categories: &[i32], first_param: usize) -> (String, Vec<Value>) {
    if categories.is_empty() {
        return (String::new(), Vec::new());
    }

    let placeholders: Vec<String> = (0..categories.len())
        .map(|i| format!("${}", first_param + i))
        .collect();
    let values = categories.iter().map(|id| (*id).into()).collect();

    (
        format!(" AND t.category_id IN ({})", placeholders.join(", ")),
        values,
    )
}

fn sql_limit(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub struct TopicService<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> TopicService<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Newest `updated` strictly older than `before`, within the filter.
    pub async fn last_updated_before(
        &self,
        categories: &[i32],
        before: DateTime,
    ) -> AppResult<Option<DateTime>> {
        let (filter, filter_values) = category_filter(categories, 2);
        let sql = format!(
            "SELECT t.updated FROM topics t \
                WHERE t.updated < $1{filter} \
                ORDER BY t.updated DESC \
                LIMIT 1"
        );

        let mut values: Vec<Value> = vec![before.into()];
        values.extend(filter_values);

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                self.db.get_database_backend(),
                &sql,
                values,
            ))
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<DateTime>("", "updated")?)),
            None => Ok(None),
        }
    }

    /// One page of the topic feed: topics updated strictly before `before`,
    /// newest first.
    pub async fn list_before(
        &self,
        categories: &[i32],
        before: DateTime,
        limit: u64,
    ) -> AppResult<Vec<TopicWithUserCategory>> {
        let (filter, filter_values) = category_filter(categories, 2);
        let limit_param = categories.len() + 2;
        let sql = format!(
            "{TOPIC_SELECT} \
                WHERE t.updated < $1{filter} \
                ORDER BY t.updated DESC, t.topic_id DESC \
                LIMIT ${limit_param}"
        );

        let mut values: Vec<Value> = vec![before.into()];
        values.extend(filter_values);
        values.push(sql_limit(limit).into());

        let rows = TopicRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            values,
        ))
        .all(self.db)
        .await?;

        Ok(rows.into_iter().map(TopicWithUserCategory::from).collect())
    }

    pub async fn get_by_id(&self, topic_id: i32) -> AppResult<TopicWithUserCategory> {
        let sql = format!("{TOPIC_SELECT} WHERE t.topic_id = $1 LIMIT 1");

        TopicRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            &sql,
            [topic_id.into()],
        ))
        .one(self.db)
        .await?
        .map(TopicWithUserCategory::from)
        .ok_or_else(|| AppError::NotFound("Topic does not exist".to_string()))
    }

    pub async fn create(
        &self,
        title: &str,
        author_id: i32,
        category_id: Option<i32>,
        now: DateTime,
    ) -> AppResult<TopicModel> {
        let new_topic = topic::ActiveModel {
            title: sea_orm::ActiveValue::Set(title.to_string()),
            author_id: sea_orm::ActiveValue::Set(author_id),
            category_id: sea_orm::ActiveValue::Set(category_id),
            created: sea_orm::ActiveValue::Set(now),
            updated: sea_orm::ActiveValue::Set(now),
            replies: sea_orm::ActiveValue::Set(0),
            ..Default::default()
        };

        let topic = new_topic.insert(self.db).await?;
        Ok(topic)
    }

    /// Account for a new reply: bump the counter and move `updated` forward.
    pub async fn record_reply(&self, topic_id: i32, now: DateTime) -> AppResult<()> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                self.db.get_database_backend(),
                "UPDATE topics SET replies = replies + 1, updated = $2 WHERE topic_id = $1",
                [topic_id.into(), now.into()],
            ))
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Topic does not exist".to_string()));
        }
        Ok(())
    }
}
