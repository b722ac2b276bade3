use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Persistence failures, sorted into the outcomes callers act on.
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::Conflict(detail);
        }
        match err {
            DbErr::RecordNotFound(what) => AppError::NotFound(what),
            other => AppError::Database(other),
        }
    }
}

/// Status and text of an error, attached to error responses so that
/// [`crate::middleware::error_page`] can render them with the site layout.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPage {
    pub code: u16,
    pub text: String,
}

impl ErrorPage {
    pub fn new(status: StatusCode, text: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            text: text.into(),
        }
    }

    /// Bare-bones body used until (or instead of) the templated page.
    pub fn inline_html(&self) -> String {
        format!(
            "<!doctype html><title>{code}</title><h1>{code}</h1><p>{text}</p>",
            code = self.code,
            text = escape_html(&self.text),
        )
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Html(self.inline_html())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let text = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                internal_text()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {:#}", e);
                internal_text()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                internal_text()
            }
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                "The resource already exists".to_string()
            }
            AppError::NotFound(msg) | AppError::Validation(msg) => msg,
        };

        ErrorPage::new(status, text).into_response()
    }
}

fn internal_text() -> String {
    StatusCode::INTERNAL_SERVER_ERROR
        .canonical_reason()
        .unwrap_or("Internal Server Error")
        .to_string()
}

pub type AppResult<T> = Result<T, AppError>;
