mod common;

use axum::response::IntoResponse;
use bb::services::user::UserService;
use bb::AppError;
use common::*;
use reqwest::StatusCode;

#[tokio::test]
async fn duplicate_user_name_is_a_conflict() {
    let Some(app) = spawn_app().await else { return };
    let users = UserService::new(&app.db);
    let name = unique("twin");

    let first = users.create(&name).await.unwrap();
    assert_eq!(first.name, name);

    let err = users.create(&name).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "unexpected error {err:?}");
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

    let found = users.get_by_id(first.user_id).await.unwrap();
    assert_eq!(found.name, name);
}
