//! Book catalog service

use chrono::{Datelike, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookWithCategory, CreateBook, UpdateBook},
    repository::Repository,
};

use super::validation_messages;

/// Publication years are accepted from 1000 up to the current year
fn validate_publication_year(year: Option<i16>, errors: &mut Vec<String>) {
    let current_year = Utc::now().year() as i16;
    if let Some(y) = year {
        if !(1000..=current_year).contains(&y) {
            errors.push("Please enter a valid publication year".to_string());
        }
    }
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Search books with pagination
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookWithCategory>, i64)> {
        self.repository.books.search(query).await
    }

    /// A missing category is a field-level validation failure; any other
    /// repository error (e.g. a lost connection) propagates as-is.
    async fn check_category(&self, category_id: Option<i32>, errors: &mut Vec<String>) -> AppResult<()> {
        if let Some(id) = category_id {
            match self.repository.categories.get_by_id(id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    errors.push("Selected category does not exist".to_string());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let mut errors = book
            .validate()
            .err()
            .map(validation_messages)
            .unwrap_or_default();
        validate_publication_year(book.publication_year, &mut errors);
        self.check_category(book.category_id, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, None).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        self.repository.books.create(&book).await
    }

    /// Update an existing book. The repository enforces the copy-count rule:
    /// the new total may not fall below the copies currently on loan.
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;
        if book.total_copies < current.borrowed_copies() {
            return Err(AppError::Conflict(format!(
                "Cannot reduce total copies below the {} currently on loan",
                current.borrowed_copies()
            )));
        }

        let mut errors = book
            .validate()
            .err()
            .map(validation_messages)
            .unwrap_or_default();
        validate_publication_year(book.publication_year, &mut errors);
        self.check_category(book.category_id, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book; blocked while it has active loans
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Count all books
    pub async fn count_all(&self) -> AppResult<i64> {
        self.repository.books.count_all().await
    }
}
