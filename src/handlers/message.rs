use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::handlers::topic::CONTENT_MAX;
use crate::handlers::view::{found, html_page, topic_url, TimeView, TopicResponse, UserResponse};
use crate::middleware::CurrentUser;
use crate::models::MessageWithUser;
use crate::pagination::Paginator;
use crate::services::forum::ForumService;
use crate::services::message::MessageService;
use crate::services::timestamp_now;
use crate::services::topic::TopicService;
use crate::templates::TemplateStore;
use crate::utils::check_last_modified;
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::Query;
use minijinja::context;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use validator::{Validate, ValidationError};

const MESSAGE_MIN: usize = 3;

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    /// When repeated, the first value wins.
    #[serde(default)]
    pub page: Vec<String>,
}

impl MessageListQuery {
    fn page(&self) -> Option<&str> {
        self.page.first().map(String::as_str)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i32,
    /// Fragment id used by reply redirects.
    pub anchor: String,
    /// 1-based position within the topic.
    pub position: u64,
    /// Markdown source, rendered by the template.
    pub content: String,
    pub created: TimeView,
    pub author: UserResponse,
}

impl MessageResponse {
    fn new(m: MessageWithUser, position: u64) -> Self {
        Self {
            id: m.message.message_id,
            anchor: format!("m{}", m.message.message_id),
            position,
            content: m.message.content,
            created: m.message.created.into(),
            author: m.author.into(),
        }
    }
}

/// Path ids that do not parse, or are negative, name no topic.
fn parse_topic_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| AppError::NotFound("Topic does not exist".to_string()))
}

/// One page of a topic's messages.
pub async fn list_messages(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Arc<TemplateStore>>,
    Extension(config): Extension<AppConfig>,
    headers: HeaderMap,
    Path((topic_id, _slug)): Path<(String, String)>,
    Query(query): Query<MessageListQuery>,
) -> AppResult<Response> {
    let topic_id = parse_topic_id(&topic_id)?;
    let topic = TopicService::new(&db).get_by_id(topic_id).await?;

    let freshness = check_last_modified(&headers, topic.topic.updated, config.dev_mode);
    if freshness.is_not_modified() {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let paginator = Paginator::new(query.page(), topic.topic.message_count());
    let messages: Vec<MessageResponse> = MessageService::new(&db)
        .list_by_topic(topic_id, paginator.offset(), paginator.limit())
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, m)| MessageResponse::new(m, paginator.position(i)))
        .collect();

    let html = templates.render(
        "page_message_list.html",
        context! {
            topic => TopicResponse::from(topic),
            messages => messages,
            pagination => paginator.nav(),
        },
    )?;

    Ok(html_page(html, freshness.last_modified()))
}

fn validate_message(content: &str) -> Result<(), ValidationError> {
    let len = content.chars().count();
    if len < MESSAGE_MIN {
        return Err(ValidationError::new("message_length")
            .with_message(Cow::Borrowed("Message too short")));
    }
    if len > CONTENT_MAX {
        return Err(ValidationError::new("message_length")
            .with_message(Cow::Borrowed("Message too long")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyForm {
    #[serde(default)]
    #[validate(custom(function = "validate_message"))]
    pub content: String,
}

impl ReplyForm {
    fn validated(self) -> AppResult<String> {
        let form = Self {
            content: self.content.trim().to_string(),
        };
        if let Err(e) = form.validate() {
            let message = e
                .field_errors()
                .get("content")
                .and_then(|errs| errs.first())
                .and_then(|err| err.message.as_ref())
                .map(|message| message.to_string())
                .unwrap_or_else(|| "Invalid message".to_string());
            return Err(AppError::Validation(message));
        }
        Ok(form.content)
    }
}

/// Append a reply and redirect to it, on the topic's last page.
pub async fn create_message(
    Extension(db): Extension<DatabaseConnection>,
    user: CurrentUser,
    Path((topic_id, _slug)): Path<(String, String)>,
    Form(form): Form<ReplyForm>,
) -> AppResult<Response> {
    let topic_id = parse_topic_id(&topic_id)?;
    let content = form.validated()?;

    let (topic, message) = ForumService::new(db)
        .create_reply(topic_id, user.user_id, &content, timestamp_now())
        .await?;

    let url = format!(
        "{}?page={}#m{}",
        topic_url(topic.topic.topic_id, &topic.topic.slug()),
        topic.topic.pages(),
        message.message_id
    );
    Ok(found(&url))
}
