//! Loan lifecycle integration tests.
//!
//! These run against a real Postgres database and are ignored by default.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use biblioteca_server::{
    config::{AuthConfig, LoansConfig},
    error::AppError,
    models::book::{CreateBook, UpdateBook},
    models::enums::{BookStatus, LoanStatus, MemberStatus, StaffRole},
    models::loan::{CreateLoan, ReturnLoan, UpdateLoan},
    models::member::{CreateMember, UpdateMember},
    repository::Repository,
    services::{auth, Services},
};

static MIGRATIONS: OnceCell<()> = OnceCell::const_new();

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    MIGRATIONS
        .get_or_init(|| async {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    pool
}

struct TestContext {
    repository: Repository,
    services: Services,
    staff_id: i32,
}

async fn setup() -> TestContext {
    let pool = test_pool().await;
    let repository = Repository::new(pool);
    let services = Services::new(
        repository.clone(),
        AuthConfig::default(),
        LoansConfig::default(),
    );

    let username = format!("tester_{}", rand_suffix());
    let hash = auth::hash_password("test-password").unwrap();
    let staff = repository
        .staff
        .create(&username, &hash, "Test Librarian", None, StaffRole::Admin)
        .await
        .unwrap();

    TestContext {
        repository,
        services,
        staff_id: staff.id,
    }
}

fn rand_suffix() -> u64 {
    use rand::Rng;
    rand::thread_rng().gen()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn seed_book(ctx: &TestContext, copies: i32) -> i32 {
    let book = ctx
        .services
        .books
        .create_book(CreateBook {
            title: format!("Test Book {}", rand_suffix()),
            author: "Test Author".to_string(),
            publisher: None,
            publication_year: Some(2020),
            isbn: None,
            category_id: None,
            total_copies: copies,
        })
        .await
        .unwrap();
    book.id
}

async fn seed_member(ctx: &TestContext) -> i32 {
    let member = ctx
        .services
        .members
        .create_member(CreateMember {
            name: format!("Test Member {}", rand_suffix()),
            email: None,
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    member.id
}

fn new_loan(book_id: i32, member_id: i32) -> CreateLoan {
    CreateLoan {
        book_id,
        member_id,
        loan_date: today(),
        due_date: Some(today() + Duration::days(14)),
        notes: None,
    }
}

/// Assert both ledger invariants for one book:
/// 0 <= available <= total, and available = total - active loans
async fn assert_ledger(ctx: &TestContext, book_id: i32) -> (i32, i32) {
    let book = ctx.repository.books.get_by_id(book_id).await.unwrap();
    assert!(book.available_copies >= 0);
    assert!(book.available_copies <= book.total_copies);

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND status = 'active'",
    )
    .bind(book_id)
    .fetch_one(&ctx.repository.pool)
    .await
    .unwrap();

    assert_eq!(
        book.available_copies as i64,
        book.total_copies as i64 - active,
        "availability must equal total minus active loans"
    );

    (book.total_copies, book.available_copies)
}

#[tokio::test]
#[ignore]
async fn full_lifecycle_scenario() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 2).await;
    let member_id = seed_member(&ctx).await;

    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 2));

    // First loan takes one copy
    let l1 = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    assert_eq!(l1.status, LoanStatus::Active);
    assert!(l1.loan_code.starts_with("LN"));
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 1));

    // Second loan takes the last copy
    let l2 = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 0));
    assert_ne!(l1.loan_code, l2.loan_code);

    // Third attempt fails and changes nothing
    let l3 = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await;
    assert!(matches!(l3, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 0));

    // Cancel restores one copy
    let cancelled = ctx.services.loans.cancel_loan(l1.id).await.unwrap();
    assert_eq!(cancelled.status, LoanStatus::Cancelled);
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 1));

    // Return restores the other
    let returned = ctx
        .services
        .loans
        .return_loan(
            l2.id,
            ReturnLoan {
                return_date: today(),
                fine_amount: Decimal::ZERO,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.return_date, Some(today()));
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 2));
}

#[tokio::test]
#[ignore]
async fn closed_loans_reject_further_transitions() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_id = seed_member(&ctx).await;

    let loan = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();

    ctx.services.loans.cancel_loan(loan.id).await.unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));

    // A second cancel must not increment again
    let again = ctx.services.loans.cancel_loan(loan.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));

    // Nor may a cancelled loan be returned
    let returned = ctx
        .services
        .loans
        .return_loan(
            loan.id,
            ReturnLoan {
                return_date: today(),
                fine_amount: Decimal::ZERO,
                notes: None,
            },
        )
        .await;
    assert!(matches!(returned, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));
}

#[tokio::test]
#[ignore]
async fn deleting_an_active_loan_restores_availability() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_id = seed_member(&ctx).await;

    let loan = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 0));

    ctx.services.loans.delete_loan(loan.id).await.unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));

    let gone = ctx.repository.loans.get_by_id(loan.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore]
async fn deleting_a_closed_loan_leaves_availability_alone() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_id = seed_member(&ctx).await;

    let loan = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    ctx.services
        .loans
        .return_loan(
            loan.id,
            ReturnLoan {
                return_date: today(),
                fine_amount: Decimal::ZERO,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));

    ctx.services.loans.delete_loan(loan.id).await.unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));
}

#[tokio::test]
#[ignore]
async fn editing_a_loan_never_touches_availability() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_id = seed_member(&ctx).await;

    let loan = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 0));

    let updated = ctx
        .services
        .loans
        .update_loan(
            loan.id,
            UpdateLoan {
                due_date: today() + Duration::days(30),
                fine_amount: Decimal::from(500),
                notes: Some("extended".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.due_date, today() + Duration::days(30));
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 0));

    // Due date before the loan date stays rejected on edit
    let bad = ctx
        .services
        .loans
        .update_loan(
            loan.id,
            UpdateLoan {
                due_date: today() - Duration::days(1),
                fine_amount: Decimal::ZERO,
                notes: None,
            },
        )
        .await;
    assert!(matches!(bad, Err(AppError::Validation(_))));
}

#[tokio::test]
#[ignore]
async fn create_is_refused_for_inactive_members_and_maintenance_books() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_id = seed_member(&ctx).await;

    // Suspend the member
    let member = ctx.repository.members.get_by_id(member_id).await.unwrap();
    ctx.services
        .members
        .update_member(
            member_id,
            UpdateMember {
                name: member.name.clone(),
                email: None,
                phone: None,
                address: None,
                status: MemberStatus::Suspended,
            },
        )
        .await
        .unwrap();

    let refused = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));

    // Put the book under maintenance and reactivate the member
    ctx.services
        .members
        .update_member(
            member_id,
            UpdateMember {
                name: member.name,
                email: None,
                phone: None,
                address: None,
                status: MemberStatus::Active,
            },
        )
        .await
        .unwrap();

    let book = ctx.repository.books.get_by_id(book_id).await.unwrap();
    ctx.services
        .books
        .update_book(
            book_id,
            UpdateBook {
                title: book.title,
                author: book.author,
                publisher: None,
                publication_year: Some(2020),
                isbn: None,
                category_id: None,
                total_copies: 1,
                status: BookStatus::Maintenance,
            },
        )
        .await
        .unwrap();

    let refused = ctx
        .services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 1));
}

#[tokio::test]
#[ignore]
async fn total_copies_cannot_drop_below_borrowed() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 2).await;
    let member_id = seed_member(&ctx).await;

    ctx.services
        .loans
        .create_loan(ctx.staff_id, new_loan(book_id, member_id))
        .await
        .unwrap();
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 1));

    let book = ctx.repository.books.get_by_id(book_id).await.unwrap();
    let update = |total| UpdateBook {
        title: book.title.clone(),
        author: book.author.clone(),
        publisher: None,
        publication_year: Some(2020),
        isbn: None,
        category_id: None,
        total_copies: total,
        status: BookStatus::Available,
    };

    // 2 -> 0 with one copy borrowed is a conflict
    let refused = ctx.services.books.update_book(book_id, update(0)).await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));
    assert_eq!(assert_ledger(&ctx, book_id).await, (2, 1));

    // 2 -> 1 with one copy borrowed succeeds; availability is recomputed
    let updated = ctx
        .services
        .books
        .update_book(book_id, update(1))
        .await
        .unwrap();
    assert_eq!(updated.total_copies, 1);
    assert_eq!(updated.available_copies, 0);
    assert_ledger(&ctx, book_id).await;
}

#[tokio::test]
#[ignore]
async fn concurrent_creates_allow_exactly_one_success() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 1).await;
    let member_a = seed_member(&ctx).await;
    let member_b = seed_member(&ctx).await;

    let (a, b) = tokio::join!(
        ctx.services
            .loans
            .create_loan(ctx.staff_id, new_loan(book_id, member_a)),
        ctx.services
            .loans
            .create_loan(ctx.staff_id, new_loan(book_id, member_b)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|&&ok| ok).count();
    assert_eq!(successes, 1, "exactly one of two racing creates may win");

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(AppError::Conflict(_))));

    assert_eq!(assert_ledger(&ctx, book_id).await, (1, 0));
}

#[tokio::test]
#[ignore]
async fn unknown_category_is_a_field_validation_failure() {
    let ctx = setup().await;

    let result = ctx
        .services
        .books
        .create_book(CreateBook {
            title: "Orphaned Book".to_string(),
            author: "Test Author".to_string(),
            publisher: None,
            publication_year: Some(2020),
            isbn: None,
            category_id: Some(i32::MAX),
            total_copies: 1,
        })
        .await;

    // A missing category reads back as a resubmittable validation message,
    // not a store failure
    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("category")));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[tokio::test]
#[ignore]
async fn loan_codes_are_unique_across_sequential_creates() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, 10).await;
    let member_id = seed_member(&ctx).await;

    let mut codes = std::collections::HashSet::new();
    for _ in 0..10 {
        let loan = ctx
            .services
            .loans
            .create_loan(ctx.staff_id, new_loan(book_id, member_id))
            .await
            .unwrap();
        assert!(codes.insert(loan.loan_code), "loan codes must be distinct");
    }
}
