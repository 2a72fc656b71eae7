use crate::error::CoreError;
use crate::models::Category;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::CategoryRepository for SqliteRepository {
    async fn add_category(&self, user_id: &str, name: String) -> Result<Category, CoreError> {
        let category = Category {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            name,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO categories (id, user_id, name, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.id)
        .bind(&category.user_id)
        .bind(&category.name)
        .bind(category.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                CoreError::InvalidInput(format!("Category '{}' already exists", category.name))
            }
            other => CoreError::Database(other),
        })?;

        Ok(category)
    }

    async fn find_category_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE user_id = $1 AND name = $2")
            .bind(user_id)
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }

    async fn find_categories(&self, user_id: &str) -> Result<Vec<Category>, CoreError> {
        let categories =
            sqlx::query_as("SELECT * FROM categories WHERE user_id = $1 ORDER BY name")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;
        Ok(categories)
    }

    async fn delete_category(&self, user_id: &str, name: String) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        let category: Category =
            sqlx::query_as("SELECT * FROM categories WHERE user_id = $1 AND name = $2")
                .bind(user_id)
                .bind(&name)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Category '{}'", name)))?;

        // Detach tasks rather than deleting them with the category.
        sqlx::query("UPDATE tasks SET category_id = NULL WHERE category_id = $1")
            .bind(category.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
