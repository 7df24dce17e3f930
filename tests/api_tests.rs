//! API integration tests
//!
//! These expect a running server on localhost:8080 with the bootstrap
//! admin account (admin/admin). Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token for the bootstrap admin
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique_suffix() -> u64 {
    use rand::Rng;
    rand::thread_rng().gen()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_reflects_database_connectivity() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_pagination_echo_is_clamped() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/books?page=0&per_page=500", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 100);
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["staff"]["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_returns_current_account() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_protected_routes_require_token() {
    let client = Client::new();

    for path in ["/books", "/members", "/loans", "/staff", "/stats"] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 401, "{} must require a token", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_loan_flow_over_http() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let suffix = unique_suffix();

    // Catalog a book with a single copy
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": format!("API Test Book {}", suffix),
            "author": "API Author",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse book");
    let book_id = book["id"].as_i64().expect("No book id");
    assert_eq!(book["available_copies"], 1);

    // Register a member
    let response = client
        .post(format!("{}/members", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": format!("API Member {}", suffix) }))
        .send()
        .await
        .expect("Failed to create member");
    assert_eq!(response.status(), 201);
    let member: Value = response.json().await.expect("Failed to parse member");
    let member_id = member["id"].as_i64().expect("No member id");
    assert!(member["member_code"]
        .as_str()
        .expect("No member code")
        .starts_with("MBR"));

    // Loan the only copy
    let today = Utc::now().date_naive();
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": book_id,
            "member_id": member_id,
            "loan_date": today.to_string(),
            "due_date": (today + Duration::days(14)).to_string()
        }))
        .send()
        .await
        .expect("Failed to create loan");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = body["loan"]["id"].as_i64().expect("No loan id");
    assert!(body["loan"]["loan_code"]
        .as_str()
        .expect("No loan code")
        .starts_with("LN"));

    // A second loan on the same book is refused
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": book_id,
            "member_id": member_id,
            "loan_date": today.to_string()
        }))
        .send()
        .await
        .expect("Failed to send second loan");
    assert_eq!(response.status(), 409);

    // Return the book
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .json(&json!({ "return_date": today.to_string() }))
        .send()
        .await
        .expect("Failed to return loan");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse return");
    assert_eq!(body["loan"]["status"], "returned");

    // The copy is available again
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch book");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["available_copies"], 1);

    // Returning it a second time is refused
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .bearer_auth(&token)
        .json(&json!({ "return_date": today.to_string() }))
        .send()
        .await
        .expect("Failed to send second return");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_non_admin_cannot_manage_staff_or_delete_loans() {
    let client = Client::new();
    let admin_token = get_auth_token(&client).await;
    let suffix = unique_suffix();
    let username = format!("clerk_{}", suffix);

    // Admin creates a regular staff account
    let response = client
        .post(format!("{}/staff", BASE_URL))
        .bearer_auth(&admin_token)
        .json(&json!({
            "username": username,
            "password": "clerk-password",
            "full_name": "Front Desk Clerk",
            "role": "staff"
        }))
        .send()
        .await
        .expect("Failed to create staff account");
    assert_eq!(response.status(), 201);

    // Log in as the clerk
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "clerk-password" }))
        .send()
        .await
        .expect("Failed to log in as clerk");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse login");
    let clerk_token = body["token"].as_str().expect("No token").to_string();

    // Staff management is admin only
    let response = client
        .get(format!("{}/staff", BASE_URL))
        .bearer_auth(&clerk_token)
        .send()
        .await
        .expect("Failed to list staff");
    assert_eq!(response.status(), 403);

    // So is deleting loan records
    let response = client
        .delete(format!("{}/loans/999999", BASE_URL))
        .bearer_auth(&clerk_token)
        .send()
        .await
        .expect("Failed to send loan delete");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_category_crud_and_delete_guard() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let suffix = unique_suffix();
    let name = format!("Test Category {}", suffix);

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(response.status(), 201);
    let category: Value = response.json().await.expect("Failed to parse category");
    let category_id = category["id"].as_i64().expect("No category id");

    // Duplicate names are refused
    let response = client
        .post(format!("{}/categories", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send duplicate");
    assert_eq!(response.status(), 409);

    // A category with books cannot be deleted
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": format!("Categorised Book {}", suffix),
            "author": "API Author",
            "category_id": category_id,
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse book");
    let book_id = book["id"].as_i64().expect("No book id");

    let response = client
        .delete(format!("{}/categories/{}", BASE_URL, category_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send category delete");
    assert_eq!(response.status(), 409);

    // After removing the book it can go
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete book");
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/categories/{}", BASE_URL, category_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete category");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_stats_overview() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch stats");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse stats");
    for field in ["total_books", "total_members", "active_loans", "overdue_loans"] {
        assert!(body[field].is_i64(), "{} must be present", field);
    }
}
