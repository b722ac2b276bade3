use crate::{
    error::{AppError, AppResult},
    models::{category, Category, CategoryModel},
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Statement,
};

/// Hard cap on the category list; there is no pagination for it.
const MAX_CATEGORIES: u64 = 1000;

pub struct CategoryService<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> CategoryService<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryModel>> {
        let categories = Category::find()
            .order_by_asc(category::Column::CategoryId)
            .limit(MAX_CATEGORIES)
            .all(self.db)
            .await?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, category_id: i32) -> AppResult<Option<CategoryModel>> {
        let category = Category::find_by_id(category_id).one(self.db).await?;
        Ok(category)
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        color: i32,
    ) -> AppResult<CategoryModel> {
        let new_category = category::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.to_string()),
            description: sea_orm::ActiveValue::Set(description.to_string()),
            topics_count: sea_orm::ActiveValue::Set(0),
            color: sea_orm::ActiveValue::Set(color & 0x00FF_FFFF),
            ..Default::default()
        };

        let category = new_category.insert(self.db).await?;
        Ok(category)
    }

    pub async fn increment_topics(&self, category_id: i32) -> AppResult<()> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                self.db.get_database_backend(),
                "UPDATE categories SET topics_count = topics_count + 1 WHERE category_id = $1",
                [category_id.into()],
            ))
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category does not exist".to_string()));
        }
        Ok(())
    }
}
