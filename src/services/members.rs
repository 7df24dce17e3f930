//! Member management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanDetails, LoanQuery},
    models::member::{CreateMember, Member, MemberQuery, UpdateMember},
    repository::Repository,
    services::codes,
};

use super::validation_messages;

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Search members with pagination
    pub async fn search_members(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        self.repository.members.search(query).await
    }

    /// Create a new member with a generated unique member code
    pub async fn create_member(&self, member: CreateMember) -> AppResult<Member> {
        if let Err(e) = member.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }

        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, None).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let member_code = codes::generate_unique(
            codes::MEMBER_CODE_PREFIX,
            codes::MEMBER_CODE_WIDTH,
            |code| async move { self.repository.members.code_exists(&code).await },
        )
        .await?;

        let created = self.repository.members.create(&member_code, &member).await?;
        tracing::info!(member_code = %created.member_code, "Member created");
        Ok(created)
    }

    /// Update an existing member
    pub async fn update_member(&self, id: i32, member: UpdateMember) -> AppResult<Member> {
        if let Err(e) = member.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }

        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        self.repository.members.update(id, &member).await
    }

    /// Delete a member; blocked while they have active loans
    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.repository.members.delete(id).await
    }

    /// Loan history for one member
    pub async fn member_loans(
        &self,
        member_id: i32,
        loans: &crate::services::loans::LoansService,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        // Verify the member exists first
        self.repository.members.get_by_id(member_id).await?;

        let query = LoanQuery {
            status: None,
            book_id: None,
            member_id: Some(member_id),
            page: Some(1),
            per_page: Some(100),
        };
        loans.search_loans(&query).await
    }

    /// Count all members
    pub async fn count_all(&self) -> AppResult<i64> {
        self.repository.members.count_all().await
    }
}
