use crate::config::AppConfig;
use crate::error::AppResult;
use crate::handlers::view::{found, html_page, topic_url, CategoryResponse, TopicResponse};
use crate::middleware::CurrentUser;
use crate::models::CategoryModel;
use crate::pagination::CursorPaginator;
use crate::services::category::CategoryService;
use crate::services::forum::{ForumService, NewTopic};
use crate::services::timestamp_now;
use crate::services::topic::TopicService;
use crate::templates::TemplateStore;
use crate::utils::check_last_modified;
use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::Query;
use chrono::Utc;
use minijinja::context;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;
use validator::{Validate, ValidationError, ValidationErrors};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 200;
const CONTENT_MIN: usize = 3;
pub(crate) const CONTENT_MAX: usize = 20_000;

const INVALID_CATEGORY: &str = "Invalid category";

#[derive(Debug, Default, Deserialize)]
pub struct TopicListQuery {
    /// Cursor: only topics updated before this Unix time. When repeated, the
    /// first value wins.
    #[serde(default)]
    pub off: Vec<String>,
    /// Category filter, repeatable. Values that are not ids are ignored.
    #[serde(default)]
    pub category: Vec<String>,
}

impl TopicListQuery {
    fn offset(&self) -> Option<&str> {
        self.off.first().map(String::as_str)
    }

    fn category_ids(&self) -> Vec<i32> {
        self.category
            .iter()
            .filter_map(|raw| raw.trim().parse().ok())
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct CursorNav {
    is_first: bool,
    has_next: bool,
    newest_url: String,
    next_url: Option<String>,
}

/// Feed link at cursor `off` (the newest page when `None`), keeping the
/// category filter.
fn feed_url(path: &str, categories: &[i32], off: Option<i64>) -> String {
    let mut params: Vec<String> = off.map(|off| format!("off={off}")).into_iter().collect();
    params.extend(categories.iter().map(|id| format!("category={id}")));
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

/// Topic feed, newest activity first, paged by last-update cursor.
pub async fn list_topics(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Arc<TemplateStore>>,
    Extension(config): Extension<AppConfig>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<TopicListQuery>,
) -> AppResult<Response> {
    let categories = query.category_ids();
    let mut cursor = CursorPaginator::new(Utc::now()).with_offset(query.offset());

    let mut last_modified = None;
    let mut rows = Vec::new();
    if !cursor.is_exhausted() {
        let before = cursor.upper_bound().naive_utc();
        let topics = TopicService::new(&db);

        if let Some(modified) = topics.last_updated_before(&categories, before).await? {
            let freshness = check_last_modified(&headers, modified, config.dev_mode);
            if freshness.is_not_modified() {
                return Ok(StatusCode::NOT_MODIFIED.into_response());
            }
            last_modified = freshness.last_modified();
        }

        rows = topics.list_before(&categories, before, cursor.limit()).await?;
    }
    cursor.observe(
        rows.len(),
        rows.last().map(|t| t.topic.updated.and_utc().timestamp()),
    );

    let pagination = CursorNav {
        is_first: cursor.is_first(),
        has_next: cursor.has_next(),
        newest_url: feed_url(uri.path(), &categories, None),
        next_url: cursor
            .next_page()
            .map(|next| feed_url(uri.path(), &categories, Some(next))),
    };
    let topics: Vec<TopicResponse> = rows.into_iter().map(TopicResponse::from).collect();

    let html = templates.render(
        "page_topic_list.html",
        context! {
            topics => topics,
            pagination => pagination,
            categories => categories,
        },
    )?;

    Ok(html_page(html, last_modified))
}

fn length_error(
    code: &'static str,
    value: &str,
    min: usize,
    max: usize,
    field: &str,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    let message = if len < min {
        format!("{field} must be at least {min} characters long")
    } else if len > max {
        format!("{field} must not be longer than {max} characters")
    } else {
        return Ok(());
    };
    Err(ValidationError::new(code).with_message(Cow::Owned(message)))
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    length_error("title_length", title, TITLE_MIN, TITLE_MAX, "Title")
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    length_error("content_length", content, CONTENT_MIN, CONTENT_MAX, "Content")
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.is_empty() {
        return Err(ValidationError::new("category_required")
            .with_message(Cow::Borrowed("Category is required")));
    }
    if category.parse::<i32>().is_err() {
        return Err(
            ValidationError::new("category_invalid").with_message(Cow::Borrowed(INVALID_CATEGORY))
        );
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct CreateTopicForm {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_content"))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = "validate_category"))]
    pub category: String,
}

impl CreateTopicForm {
    /// Surrounding whitespace never counts towards a field.
    fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }
}

/// One message per form field, shown next to the input.
#[derive(Debug, Default, Serialize)]
pub struct TopicFormErrors {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

impl TopicFormErrors {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none()
    }
}

impl From<&ValidationErrors> for TopicFormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let fields = errors.field_errors();
        let first = |field: &str| {
            fields
                .get(field)
                .and_then(|errs| errs.first())
                .and_then(|err| err.message.as_ref())
                .map(|message| message.to_string())
        };
        Self {
            title: first("title"),
            content: first("content"),
            category: first("category"),
        }
    }
}

fn render_topic_form(
    templates: &TemplateStore,
    status: StatusCode,
    form: &CreateTopicForm,
    errors: &TopicFormErrors,
    categories: Vec<CategoryModel>,
) -> AppResult<Response> {
    let categories: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from).collect();
    let html = templates.render(
        "page_create_topic.html",
        context! {
            form => form,
            errors => errors,
            categories => categories,
        },
    )?;
    Ok((status, Html(html)).into_response())
}

/// Empty new-topic form.
pub async fn new_topic_form(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Arc<TemplateStore>>,
    _user: CurrentUser,
) -> AppResult<Response> {
    let categories = CategoryService::new(&db).list().await?;
    render_topic_form(
        &templates,
        StatusCode::OK,
        &CreateTopicForm::default(),
        &TopicFormErrors::default(),
        categories,
    )
}

/// Create a topic with its opening message and redirect to it.
pub async fn create_topic(
    Extension(db): Extension<DatabaseConnection>,
    Extension(templates): Extension<Arc<TemplateStore>>,
    user: CurrentUser,
    Form(form): Form<CreateTopicForm>,
) -> AppResult<Response> {
    let form = form.trimmed();
    let categories = CategoryService::new(&db);

    let mut errors = match form.validate() {
        Ok(()) => TopicFormErrors::default(),
        Err(e) => TopicFormErrors::from(&e),
    };

    let category = match form.category.parse::<i32>() {
        Ok(id) => categories.find_by_id(id).await?,
        Err(_) => None,
    };
    if category.is_none() && errors.category.is_none() {
        errors.category = Some(INVALID_CATEGORY.to_string());
    }

    let category_id = match category {
        Some(category) if errors.is_empty() => category.category_id,
        _ => {
            return render_topic_form(
                &templates,
                StatusCode::BAD_REQUEST,
                &form,
                &errors,
                categories.list().await?,
            )
        }
    };

    let topic = ForumService::new(db)
        .create_topic(
            NewTopic {
                title: &form.title,
                content: &form.content,
                author_id: user.user_id,
                category_id,
            },
            timestamp_now(),
        )
        .await?;

    Ok(found(&topic_url(topic.topic_id, &topic.slug())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, content: &str, category: &str) -> CreateTopicForm {
        CreateTopicForm {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
        }
    }

    fn errors_of(form: &CreateTopicForm) -> TopicFormErrors {
        match form.validate() {
            Ok(()) => TopicFormErrors::default(),
            Err(e) => TopicFormErrors::from(&e),
        }
    }

    #[test]
    fn valid_form() {
        let errors = errors_of(&form("Hello", "Some content", "1"));
        assert!(errors.is_empty());
    }

    #[test]
    fn title_too_short() {
        let errors = errors_of(&form("ab", "Some content", "1"));
        assert_eq!(
            errors.title.as_deref(),
            Some("Title must be at least 3 characters long")
        );
        assert!(errors.content.is_none());
    }

    #[test]
    fn title_too_long() {
        let errors = errors_of(&form(&"x".repeat(201), "Some content", "1"));
        assert_eq!(
            errors.title.as_deref(),
            Some("Title must not be longer than 200 characters")
        );
        assert!(errors_of(&form(&"x".repeat(200), "Some content", "1")).is_empty());
    }

    #[test]
    fn lengths_count_characters() {
        assert!(errors_of(&form("żół", "ąęć", "1")).is_empty());
    }

    #[test]
    fn content_bounds() {
        let errors = errors_of(&form("Hello", "hi", "1"));
        assert_eq!(
            errors.content.as_deref(),
            Some("Content must be at least 3 characters long")
        );

        let errors = errors_of(&form("Hello", &"x".repeat(CONTENT_MAX + 1), "1"));
        assert_eq!(
            errors.content.as_deref(),
            Some("Content must not be longer than 20000 characters")
        );
    }

    #[test]
    fn category_messages() {
        let errors = errors_of(&form("Hello", "Some content", ""));
        assert_eq!(errors.category.as_deref(), Some("Category is required"));

        let errors = errors_of(&form("Hello", "Some content", "news"));
        assert_eq!(errors.category.as_deref(), Some("Invalid category"));
    }

    #[test]
    fn trimming_happens_before_validation() {
        let f = form("  ab  ", "  body  ", " 3 ").trimmed();
        assert_eq!(f.title, "ab");
        assert_eq!(f.category, "3");
        assert!(errors_of(&f).title.is_some());
    }

    #[test]
    fn query_category_ids_skip_garbage() {
        let query = TopicListQuery {
            off: Vec::new(),
            category: vec!["4".into(), "x".into(), " 9 ".into()],
        };
        assert_eq!(query.category_ids(), vec![4, 9]);
        assert_eq!(query.offset(), None);
    }

    #[test]
    fn repeated_offset_uses_first_value() {
        let query = TopicListQuery {
            off: vec!["100".into(), "200".into()],
            category: Vec::new(),
        };
        assert_eq!(query.offset(), Some("100"));
    }

    #[test]
    fn feed_urls_keep_filter() {
        assert_eq!(feed_url("/t/", &[], Some(1_000)), "/t/?off=1000");
        assert_eq!(
            feed_url("/", &[2, 5], Some(77)),
            "/?off=77&category=2&category=5"
        );
        assert_eq!(feed_url("/t/", &[], None), "/t/");
        assert_eq!(feed_url("/t/", &[2, 5], None), "/t/?category=2&category=5");
    }
}
