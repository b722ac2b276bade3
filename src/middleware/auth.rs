use crate::{
    error::AppError,
    services::user::UserService,
    utils::cookie::{extract_cookie, USER_ID_COOKIE},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::DatabaseConnection;

/// The signed-in user, resolved from the `uid` cookie.
///
/// Stand-in for a real session layer: the cookie holds a bare user id.
/// Missing, malformed, or unknown ids reject with `401`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i32,
    pub name: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = extract_cookie(&parts.headers, USER_ID_COOKIE)
            .and_then(|raw| raw.parse::<i32>().ok())
            .ok_or(AppError::Unauthorized)?;

        let db = parts
            .extensions
            .get::<DatabaseConnection>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("DatabaseConnection extension is missing"))?;

        let user = match UserService::new(&db).get_by_id(user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e),
        };

        Ok(Self {
            user_id: user.user_id,
            name: user.name,
        })
    }
}
