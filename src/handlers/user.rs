use crate::error::ErrorPage;
use axum::{extract::Path, http::StatusCode};

/// Public profile page. Not built yet; topic and message lists link here.
pub async fn user_profile(Path((_user_id, _slug)): Path<(String, String)>) -> ErrorPage {
    ErrorPage::new(StatusCode::NOT_IMPLEMENTED, "Not implemented")
}
