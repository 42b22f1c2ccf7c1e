//! Integration tests for registration, login and session handling.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use book_review_auth::token::hash_token;
use book_review_auth::{AuthConfig, IdentityService, LoginRequest, RegisterRequest};
use book_review_core::{CatalogueError, ErrorKind, SessionStore, UserRepository};
use book_review_testing::{InMemoryStore, ManualClock, test_clock};
use book_review_core::environment::Clock;
use chrono::Duration;
use std::sync::Arc;

fn service() -> (InMemoryStore, ManualClock, IdentityService) {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(test_clock().now());
    let service = IdentityService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        AuthConfig::default(),
    );
    (store, clock, service)
}

fn alice() -> RegisterRequest {
    RegisterRequest {
        username: "alice".to_string(),
        email: "Alice@Example.com".to_string(),
        password: "wonderland".to_string(),
    }
}

#[tokio::test]
async fn register_issues_a_working_token() {
    // Arrange
    let (store, _, identity) = service();

    // Act
    let registered = identity.register(alice()).await.unwrap();

    // Assert: email normalized, password never stored in clear
    assert_eq!(registered.email, "alice@example.com");
    let user = store.find_user(registered.id).await.unwrap().unwrap();
    assert_ne!(user.password_hash, "wonderland");
    assert_eq!(
        identity.authenticate(&registered.token).await.unwrap(),
        registered.id
    );
}

#[tokio::test]
async fn session_store_only_sees_the_digest() {
    let (store, _, identity) = service();
    let registered = identity.register(alice()).await.unwrap();

    assert!(store.find_session(&registered.token).await.unwrap().is_none());
    let session = store
        .find_session(&hash_token(&registered.token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, registered.id);
    assert_eq!(session.expires_at - session.created_at, Duration::hours(10));
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let (_, _, identity) = service();
    identity.register(alice()).await.unwrap();

    let same_email = RegisterRequest {
        username: "alice2".to_string(),
        email: "alice@example.com".to_string(),
        password: "secret1".to_string(),
    };
    let same_username = RegisterRequest {
        username: "alice".to_string(),
        email: "other@example.com".to_string(),
        password: "secret1".to_string(),
    };

    for request in [same_email, same_username] {
        let err = identity.register(request).await.unwrap_err();
        assert_eq!(
            err,
            CatalogueError::Conflict("User with that email or username already exists".to_string())
        );
    }
}

#[tokio::test]
async fn malformed_registration_is_a_validation_error() {
    let (store, _, identity) = service();

    let err = identity
        .register(RegisterRequest {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
    assert!(store.find_user_by_email("not-an-email").await.unwrap().is_none());
}

#[tokio::test]
async fn login_accepts_any_email_case() {
    let (_, _, identity) = service();
    let registered = identity.register(alice()).await.unwrap();

    let logged_in = identity
        .login(LoginRequest {
            email: "ALICE@example.com".to_string(),
            password: "wonderland".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(logged_in.id, registered.id);
    assert_ne!(logged_in.token, registered.token);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (_, _, identity) = service();
    identity.register(alice()).await.unwrap();

    let wrong_password = identity
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "looking-glass".to_string(),
        })
        .await
        .unwrap_err();
    let unknown_email = identity
        .login(LoginRequest {
            email: "bob@example.com".to_string(),
            password: "wonderland".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password,
        CatalogueError::Unauthenticated("Invalid credentials".to_string())
    );
}

#[tokio::test]
async fn expired_token_is_rejected_and_removed() {
    // Arrange
    let (store, clock, identity) = service();
    let registered = identity.register(alice()).await.unwrap();

    // Act: step past the 10 hour lifetime
    clock.advance(Duration::hours(10) + Duration::seconds(1));
    let err = identity.authenticate(&registered.token).await.unwrap_err();

    // Assert
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    assert_eq!(store.session_count(), 0);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (_, _, identity) = service();
    let registered = identity.register(alice()).await.unwrap();

    identity.logout(&registered.token).await.unwrap();

    let err = identity.authenticate(&registered.token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    // Logging out twice is harmless.
    identity.logout(&registered.token).await.unwrap();
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let (store, clock, identity) = service();
    identity.register(alice()).await.unwrap();
    clock.advance(Duration::hours(6));
    identity
        .login(LoginRequest {
            email: "alice@example.com".to_string(),
            password: "wonderland".to_string(),
        })
        .await
        .unwrap();
    clock.advance(Duration::hours(5));

    let removed = identity.purge_expired_sessions().await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.session_count(), 1);
}

#[tokio::test]
async fn garbage_token_is_unauthenticated() {
    let (_, _, identity) = service();
    let err = identity.authenticate("not-a-token").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}
