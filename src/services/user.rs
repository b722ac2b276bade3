use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait};

pub struct UserService<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> UserService<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, user_id: i32) -> AppResult<UserModel> {
        User::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))
    }

    /// Accounts belong to the external auth layer; this only seeds the row
    /// topics and messages point at.
    pub async fn create(&self, name: &str) -> AppResult<UserModel> {
        let new_user = user::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            ..Default::default()
        };

        let user = new_user.insert(self.db).await?;
        Ok(user)
    }
}
