//! Template-facing shapes of the forum entities.

use crate::models::{CategoryModel, TopicWithUserCategory, UserModel};
use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use sea_orm::prelude::DateTime;
use serde::Serialize;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A timestamp in both machine and human form.
#[derive(Debug, Serialize)]
pub struct TimeView {
    pub iso: String,
    pub display: String,
}

impl From<DateTime> for TimeView {
    fn from(t: DateTime) -> Self {
        Self {
            iso: t.and_utc().to_rfc3339(),
            display: t.format(DISPLAY_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub url: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        let url = format!("/u/{}/{}/", u.user_id, u.slug());
        Self {
            id: u.user_id,
            name: u.name,
            url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub topics_count: i32,
    /// Six hex digits without the leading `#`.
    pub color: String,
    pub slug: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(c: CategoryModel) -> Self {
        let color = c.color_hex();
        let slug = c.slug();
        Self {
            id: c.category_id,
            name: c.name,
            description: c.description,
            topics_count: c.topics_count,
            color,
            slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub url: String,
    /// Link to the page holding the newest message.
    pub last_page_url: String,
    pub replies: i32,
    pub pages: u64,
    pub created: TimeView,
    pub updated: TimeView,
    pub author: UserResponse,
    pub category: Option<CategoryResponse>,
}

impl From<TopicWithUserCategory> for TopicResponse {
    fn from(t: TopicWithUserCategory) -> Self {
        let slug = t.topic.slug();
        let pages = t.topic.pages();
        let url = topic_url(t.topic.topic_id, &slug);
        let last_page_url = format!("{url}?page={pages}");
        Self {
            id: t.topic.topic_id,
            title: t.topic.title,
            slug,
            url,
            last_page_url,
            replies: t.topic.replies,
            pages,
            created: t.topic.created.into(),
            updated: t.topic.updated.into(),
            author: t.author.into(),
            category: t.category.map(CategoryResponse::from),
        }
    }
}

/// Canonical topic path. An empty slug (a title without any ASCII letter or
/// digit) becomes `-` so the path segment is never empty.
pub fn topic_url(topic_id: i32, slug: &str) -> String {
    let slug = if slug.is_empty() { "-" } else { slug };
    format!("/t/{topic_id}/{slug}/")
}

/// `200 OK` HTML page, with `Last-Modified` when the freshness check
/// produced one.
pub fn html_page(html: String, last_modified: Option<(HeaderName, HeaderValue)>) -> Response {
    let mut response = Html(html).into_response();
    if let Some((name, value)) = last_modified {
        response.headers_mut().insert(name, value);
    }
    response
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
