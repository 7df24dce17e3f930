//! Business logic services

pub mod auth;
pub mod books;
pub mod categories;
pub mod codes;
pub mod loans;
pub mod members;
pub mod staff;
pub mod stats;

use crate::{
    config::{AuthConfig, LoansConfig},
    error::AppResult,
    repository::Repository,
};

/// Flatten validator output into the user-facing message list
pub(crate) fn validation_messages(errors: validator::ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub categories: categories::CategoriesService,
    pub loans: loans::LoansService,
    pub staff: staff::StaffService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loans_config: LoansConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), loans_config),
            staff: staff::StaffService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.repository.pool)
            .await?;
        Ok(())
    }
}
