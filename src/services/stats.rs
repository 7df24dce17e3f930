//! Dashboard statistics service

use crate::{api::stats::StatsResponse, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Collect the dashboard counters
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let total_books = self.repository.books.count_all().await?;
        let total_members = self.repository.members.count_all().await?;
        let active_loans = self.repository.loans.count_active().await?;
        let overdue_loans = self.repository.loans.count_overdue().await?;

        Ok(StatsResponse {
            total_books,
            total_members,
            active_loans,
            overdue_loans,
        })
    }
}
