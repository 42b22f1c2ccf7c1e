//! HTTP tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::{TestResponse, TestServer};
use book_review_auth::AuthConfig;
use book_review_core::environment::Clock;
use book_review_testing::{InMemoryStore, ManualClock, test_clock};
use book_review_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

struct Api {
    server: TestServer,
    store: Arc<InMemoryStore>,
    clock: ManualClock,
}

impl Api {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = ManualClock::new(test_clock().now());
        let state = AppState::from_store(
            Arc::clone(&store),
            Arc::new(clock.clone()),
            AuthConfig::default(),
        );
        let server = TestServer::new(build_router(state, Duration::from_secs(5))).unwrap();
        Self {
            server,
            store,
            clock,
        }
    }

    async fn register(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "hunter22",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    async fn create_book(&self, token: &str, title: &str, author: &str) -> String {
        let response = self
            .server
            .post("/api/books")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({ "title": title, "author": author }))
            .await;
        response.assert_status(StatusCode::CREATED);
        id_of(&response)
    }

    async fn review(&self, token: &str, book_id: &str, rating: i64) -> TestResponse {
        self.server
            .post(&format!("/api/reviews/{book_id}"))
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({ "rating": rating, "comment": "  worth it  " }))
            .await
    }

    async fn summary(&self, book_id: &str) -> (f64, i64) {
        let book = self
            .server
            .get(&format!("/api/books/{book_id}"))
            .await
            .json::<Value>();
        (
            book["averageRating"].as_f64().unwrap(),
            book["numReviews"].as_i64().unwrap(),
        )
    }
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn id_of(response: &TestResponse) -> String {
    response.json::<Value>()["_id"]
        .as_str()
        .expect("_id in response")
        .to_string()
}

#[tokio::test]
async fn test_welcome_and_liveness() {
    let api = Api::new();

    api.server
        .get("/")
        .await
        .assert_text("Welcome to the Book Review API!");
    api.server.get("/health").await.assert_text("ok");
}

#[tokio::test]
async fn test_readiness_follows_store() {
    let api = Api::new();

    api.server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::OK);

    api.store.set_unavailable(true);
    let response = api.server.get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["status"], "unavailable");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let api = Api::new();

    api.server
        .get("/metrics")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let api = Api::new();
    let id = "6f1c1f50-1b7a-4c8e-9a55-2f3d6b2a9e10";

    let response = api
        .server
        .get("/api/books")
        .add_header(
            HeaderName::from_static("x-correlation-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header(CORRELATION_ID_HEADER), id);
}

#[tokio::test]
async fn test_register_login_logout() {
    let api = Api::new();
    api.register("reader").await;

    let login = api
        .server
        .post("/api/login")
        .json(&json!({ "email": "READER@example.com", "password": "hunter22" }))
        .await;
    login.assert_status(StatusCode::OK);
    let body = login.json::<Value>();
    assert_eq!(body["username"], "reader");
    assert_eq!(body["email"], "reader@example.com");
    let token = body["token"].as_str().unwrap().to_string();

    api.server
        .post("/api/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_json(&json!({ "message": "Logged out" }));

    let response = api
        .server
        .post("/api/books")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Dune", "author": "Herbert" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let api = Api::new();
    api.register("reader").await;

    let response = api
        .server
        .post("/api/register")
        .json(&json!({
            "username": "reader",
            "email": "other@example.com",
            "password": "hunter22",
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({
        "code": "CONFLICT",
        "message": "User with that email or username already exists",
    }));
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let api = Api::new();
    api.register("reader").await;

    let response = api
        .server
        .post("/api/login")
        .json(&json!({ "email": "reader@example.com", "password": "wrong-one" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_mutations_require_token() {
    let api = Api::new();

    let response = api
        .server
        .post("/api/books")
        .json(&json!({ "title": "Dune", "author": "Herbert" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({
        "code": "UNAUTHORIZED",
        "message": "Not authorized, no token",
    }));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let api = Api::new();
    let token = api.register("reader").await;

    api.clock.advance(chrono::Duration::hours(11));
    let response = api
        .server
        .post("/api/books")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Dune", "author": "Herbert" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["message"],
        "Not authorized, token expired"
    );
}

#[tokio::test]
async fn test_rating_summary_through_api() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let alice = api.register("alice").await;
    let bob = api.register("bob").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;

    let first = api.review(&alice, &book, 4).await;
    first.assert_status(StatusCode::CREATED);
    assert_eq!(first.json::<Value>()["comment"], "worth it");
    let alice_review = id_of(&first);
    assert_eq!(api.summary(&book).await, (4.0, 1));

    let second = api.review(&bob, &book, 2).await;
    let bob_review = id_of(&second);
    assert_eq!(api.summary(&book).await, (3.0, 2));

    api.server
        .delete(&format!("/api/reviews/{alice_review}"))
        .add_header(AUTHORIZATION, bearer(&alice))
        .await
        .assert_json(&json!({ "message": "Review removed" }));
    assert_eq!(api.summary(&book).await, (2.0, 1));

    api.server
        .delete(&format!("/api/reviews/{bob_review}"))
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(api.summary(&book).await, (0.0, 0));
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let reader = api.register("reader").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;

    api.review(&reader, &book, 5).await.assert_status(StatusCode::CREATED);
    let response = api.review(&reader, &book, 1).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["message"],
        "You have already reviewed this book"
    );
    assert_eq!(api.summary(&book).await, (5.0, 1));
}

#[tokio::test]
async fn test_only_author_may_change_review() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let reader = api.register("reader").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;
    let review = id_of(&api.review(&reader, &book, 3).await);

    let response = api
        .server
        .put(&format!("/api/reviews/{review}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "rating": 1 }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = api
        .server
        .put(&format!("/api/reviews/{review}"))
        .add_header(AUTHORIZATION, bearer(&reader))
        .json(&json!({ "comment": "changed my mind" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["rating"], 3);
    assert_eq!(body["comment"], "changed my mind");
}

#[tokio::test]
async fn test_list_and_get_reviews() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let reader = api.register("reader").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;
    let review = id_of(&api.review(&reader, &book, 4).await);

    let list = api
        .server
        .get(&format!("/api/reviews/book/{book}"))
        .await
        .json::<Value>();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["username"], "reader");

    let details = api
        .server
        .get(&format!("/api/reviews/{review}"))
        .await
        .json::<Value>();
    assert_eq!(details["author"]["username"], "reader");
    assert_eq!(details["bookSummary"]["title"], "Dune");
}

#[tokio::test]
async fn test_invalid_identifiers_are_bad_requests() {
    let api = Api::new();

    let response = api.server.get("/api/books/not-an-id").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "code": "INVALID_IDENTIFIER",
        "message": "Invalid Book ID",
    }));

    api.server
        .get("/api/reviews/book/nope")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_book_validation_lists_every_field() {
    let api = Api::new();
    let owner = api.register("owner").await;

    let response = api
        .server
        .post("/api/books")
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "title": "   " }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["message"],
        "Please add a book title, Please add an author"
    );
}

#[tokio::test]
async fn test_search() {
    let api = Api::new();
    let owner = api.register("owner").await;
    api.create_book(&owner, "The Hobbit", "Tolkien").await;
    api.create_book(&owner, "Amortized Analysis", "Tarjan").await;

    let found = api
        .server
        .get("/api/books/search")
        .add_query_param("q", "the")
        .await
        .json::<Value>();
    let titles: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Hobbit"]);
    assert_eq!(found[0]["owner"]["username"], "owner");

    api.server
        .get("/api/books/search")
        .add_query_param("q", "zzz")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    api.server
        .get("/api/books/search")
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_book_removes_reviews() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let reader = api.register("reader").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;
    api.review(&reader, &book, 4).await;
    api.review(&owner, &book, 2).await;

    api.server
        .delete(&format!("/api/books/{book}"))
        .add_header(AUTHORIZATION, bearer(&reader))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    api.server
        .delete(&format!("/api/books/{book}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .await
        .assert_json(&json!({ "message": "Book removed" }));

    api.server
        .get(&format!("/api/books/{book}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(api.store.review_count(), 0);
}

#[tokio::test]
async fn test_update_book_keeps_rating() {
    let api = Api::new();
    let owner = api.register("owner").await;
    let reader = api.register("reader").await;
    let book = api.create_book(&owner, "Dune", "Herbert").await;
    api.review(&reader, &book, 5).await;

    let response = api
        .server
        .put(&format!("/api/books/{book}"))
        .add_header(AUTHORIZATION, bearer(&owner))
        .json(&json!({ "genre": "Science Fiction", "averageRating": 1.0, "numReviews": 9 }))
        .await;

    response.assert_status(StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["genre"], "Science Fiction");
    assert_eq!(body["averageRating"], 5.0);
    assert_eq!(body["numReviews"], 1);
}
