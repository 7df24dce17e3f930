//! Books repository for database operations, including the availability
//! ledger that tracks total vs. loanable copies per title.

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::book::{Book, BookQuery, BookWithCategory, CreateBook, UpdateBook},
    models::enums::BookStatus,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &BookQuery) {
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", search.to_lowercase());
            qb.push(" AND (LOWER(b.title) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(b.author) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(COALESCE(b.isbn, '')) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category_id) = query.category_id {
            qb.push(" AND b.category_id = ").push_bind(category_id);
        }
        if let Some(status) = query.status {
            qb.push(" AND b.status = ").push_bind(status);
        }
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookWithCategory>, i64)> {
        let page = query.page();
        let per_page = query.per_page();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM books b WHERE 1=1");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(
            "SELECT b.id, b.title, b.author, b.publisher, b.publication_year, b.isbn, \
             b.category_id, c.name AS category_name, b.total_copies, b.available_copies, b.status \
             FROM books b LEFT JOIN categories c ON b.category_id = c.id WHERE 1=1",
        );
        Self::push_filters(&mut qb, query);
        qb.push(" ORDER BY b.title LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind((page - 1) * per_page);

        let books = qb
            .build_query_as::<BookWithCategory>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Check if an ISBN is already registered to another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, publisher, publication_year, isbn,
                               category_id, total_copies, available_copies, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, 'available')
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.isbn)
        .bind(book.category_id)
        .bind(book.total_copies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "ISBN already exists"))
    }

    /// Update a book. Reducing `total_copies` below the number of copies
    /// currently on loan is rejected; on success `available_copies` is
    /// recomputed as `new_total - borrowed`.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let borrowed = current.borrowed_copies();
        if book.total_copies < borrowed {
            return Err(AppError::Conflict(format!(
                "Cannot reduce total copies below {} (currently borrowed copies)",
                borrowed
            )));
        }
        let new_available = book.total_copies - borrowed;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, publisher = $3, publication_year = $4,
                isbn = $5, category_id = $6, total_copies = $7,
                available_copies = $8, status = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.isbn)
        .bind(book.category_id)
        .bind(book.total_copies)
        .bind(new_available)
        .bind(book.status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "ISBN already exists"))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book; blocked while it has active loans
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active_loans > 0 {
            return Err(AppError::Conflict(
                "Book has active loans and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Availability ledger
    //
    // Both operations run inside the caller's loan transaction so that a
    // failed lifecycle step rolls the count back together with the loan row.
    // -----------------------------------------------------------------------

    /// Take one copy off the shelf. The guarded UPDATE only succeeds while a
    /// copy is available; under concurrent creates the row lock serializes the
    /// two updates and the loser sees zero rows affected.
    pub async fn reserve_copy(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1
            WHERE id = $1 AND available_copies > 0 AND status != $2
            "#,
        )
        .bind(book_id)
        .bind(BookStatus::Maintenance)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Selected book is not available for loan".to_string(),
            ));
        }
        Ok(())
    }

    /// Put one copy back on the shelf (cancel, return, or deletion of an
    /// active loan). One release per open loan keeps the count within
    /// `total_copies`; the schema CHECK would refuse anything else.
    pub async fn release_copy(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Count all books
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
