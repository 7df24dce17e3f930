//! Category management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryWithCount},
    repository::Repository,
};

use super::validation_messages;

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    /// List all categories with book counts
    pub async fn list_categories(&self) -> AppResult<Vec<CategoryWithCount>> {
        self.repository.categories.list().await
    }

    /// Create a new category
    pub async fn create_category(&self, category: CategoryInput) -> AppResult<Category> {
        if let Err(e) = category.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }
        self.repository.categories.create(&category).await
    }

    /// Update an existing category
    pub async fn update_category(&self, id: i32, category: CategoryInput) -> AppResult<Category> {
        if let Err(e) = category.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }
        self.repository.categories.update(id, &category).await
    }

    /// Delete a category; blocked while books reference it
    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete(id).await
    }
}
