use crate::error::ErrorPage;
use axum::http::StatusCode;

/// Category overview. Not built yet; the route exists so links resolve.
pub async fn list_categories() -> ErrorPage {
    ErrorPage::new(StatusCode::NOT_IMPLEMENTED, "Not implemented")
}
