//! Categories repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryWithCount},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// List all categories with their book counts
    pub async fn list(&self) -> AppResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.description, COUNT(b.id) AS book_count
            FROM categories c
            LEFT JOIN books b ON b.category_id = c.id
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Create a new category
    pub async fn create(&self, category: &CategoryInput) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Category name already exists"))
    }

    /// Update an existing category
    pub async fn update(&self, id: i32, category: &CategoryInput) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1, description = $2 WHERE id = $3 RETURNING *",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Category name already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Delete a category; blocked while books reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let book_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if book_count > 0 {
            return Err(AppError::Conflict(
                "Category has books and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
