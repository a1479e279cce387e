use std::sync::Arc;

use super::*;
use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::storage::MemoryStorage;
use crate::testutil::{StubServer, make_jwt};

fn session_over(storage: Arc<dyn Storage>) -> Session {
    let (events, _) = tokio::sync::broadcast::channel(8);
    Session::new(storage, events)
}

fn session() -> Session {
    session_over(Arc::new(MemoryStorage::new()))
}

fn api(base_url: &str) -> ApiClient {
    ApiClient::new(&ClientConfig::new(base_url)).unwrap()
}

fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair { access_token: access.to_string(), refresh_token: refresh.to_string() }
}

// =============================================================
// Claims
// =============================================================

#[test]
fn claims_decode_reads_sub_and_exp() {
    let claims = Claims::decode(&make_jwt("user-1", 1_900_000_000)).unwrap();
    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.exp, 1_900_000_000);
}

#[test]
fn claims_decode_rejects_non_jwt() {
    assert!(matches!(Claims::decode("not-a-jwt"), Err(SessionError::TokenDecode(_))));
    assert!(matches!(Claims::decode("a.%%%.c"), Err(SessionError::TokenDecode(_))));
}

#[test]
fn near_expiry_is_strictly_under_the_threshold() {
    let now = 1_000_000;
    assert!(Claims { sub: String::new(), exp: now + 299 }.is_near_expiry(now));
    assert!(!Claims { sub: String::new(), exp: now + 300 }.is_near_expiry(now));
    assert!(!Claims { sub: String::new(), exp: now + 3600 }.is_near_expiry(now));
}

#[test]
fn already_expired_counts_as_near_expiry() {
    assert!(Claims { sub: String::new(), exp: 100 }.is_near_expiry(1_000_000));
}

// =============================================================
// TokenStore
// =============================================================

#[test]
fn set_pair_persists_both_tokens() {
    let storage = Arc::new(MemoryStorage::new());
    let session = session_over(storage.clone());

    session.tokens().set_pair(&pair("acc", "ref"));
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("acc"));
    assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("ref"));
}

#[test]
fn empty_token_in_pair_removes_the_key() {
    let storage = Arc::new(MemoryStorage::new());
    let session = session_over(storage.clone());

    session.tokens().set_pair(&pair("acc", "ref"));
    session.tokens().set_pair(&pair("", "ref2"));
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("ref2"));
}

#[test]
fn clear_removes_both_tokens() {
    let storage = Arc::new(MemoryStorage::new());
    let session = session_over(storage.clone());

    session.tokens().set_pair(&pair("acc", "ref"));
    session.tokens().clear();
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY), None);
}

#[test]
fn stored_empty_string_reads_as_absent() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(ACCESS_TOKEN_KEY, "");
    let session = session_over(storage);
    assert_eq!(session.tokens().access(), None);
}

// =============================================================
// Auth operations
// =============================================================

#[tokio::test]
async fn login_stores_the_returned_pair() {
    let stub = StubServer::spawn(vec![(
        200,
        r#"{"access_token": "acc", "refresh_token": "ref"}"#.to_string(),
    )])
    .await;
    let session = session();

    let returned = session.login(&api(&stub.base_url), "a@b.c", "pw").await.unwrap();
    assert_eq!(returned, pair("acc", "ref"));
    assert_eq!(session.tokens().access().as_deref(), Some("acc"));
    assert_eq!(session.tokens().refresh().as_deref(), Some("ref"));

    let requests = stub.requests();
    assert_eq!(requests[0].path, "/auth/login");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["email"], "a@b.c");
}

#[tokio::test]
async fn register_stores_the_returned_pair() {
    let stub = StubServer::spawn(vec![(
        200,
        r#"{"access_token": "acc", "refresh_token": "ref"}"#.to_string(),
    )])
    .await;
    let session = session();

    session
        .register(&api(&stub.base_url), "a@b.c", "pw", "Ana", "Biro")
        .await
        .unwrap();
    assert_eq!(session.tokens().access().as_deref(), Some("acc"));

    let body: serde_json::Value = serde_json::from_str(&stub.requests()[0].body).unwrap();
    assert_eq!(body["first_name"], "Ana");
    assert_eq!(body["last_name"], "Biro");
}

#[tokio::test]
async fn refresh_without_refresh_token_errors() {
    let session = session();
    let err = session.refresh(&api("http://127.0.0.1:1")).await.unwrap_err();
    assert!(matches!(err, SessionError::NoRefreshToken));
}

#[tokio::test]
async fn refresh_replaces_only_the_access_token() {
    let stub = StubServer::spawn(vec![(200, r#"{"access_token": "acc2"}"#.to_string())]).await;
    let session = session();
    session.tokens().set_pair(&pair("acc1", "ref"));

    session.refresh(&api(&stub.base_url)).await.unwrap();
    assert_eq!(session.tokens().access().as_deref(), Some("acc2"));
    assert_eq!(session.tokens().refresh().as_deref(), Some("ref"));
}

#[tokio::test]
async fn forgot_password_returns_the_ack_message() {
    let stub = StubServer::spawn(vec![(200, r#"{"message": "email sent"}"#.to_string())]).await;
    let session = session();

    let ack = session.forgot_password(&api(&stub.base_url), "a@b.c").await.unwrap();
    assert_eq!(ack.message, "email sent");
}

#[tokio::test]
async fn reset_password_posts_the_reset_token() {
    let stub = StubServer::spawn(vec![(200, r#"{"message": "done"}"#.to_string())]).await;
    let session = session();

    session
        .reset_password(&api(&stub.base_url), "reset-tok", "new-pw")
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&stub.requests()[0].body).unwrap();
    assert_eq!(body["resetPasswordToken"], "reset-tok");
    assert_eq!(body["password"], "new-pw");
}

// =============================================================
// check_auth
// =============================================================

#[tokio::test]
async fn check_auth_without_token_is_false() {
    let session = session();
    assert!(!session.check_auth(&api("http://127.0.0.1:1")).await);
    assert!(session.user().await.is_none());
}

#[tokio::test]
async fn check_auth_with_fresh_token_skips_refresh() {
    let stub = StubServer::spawn(vec![(
        200,
        r#"{"id": "u1", "email": "a@b.c", "name": "Ana"}"#.to_string(),
    )])
    .await;
    let session = session();
    session
        .tokens()
        .set_pair(&pair(&make_jwt("u1", unix_now() + 3600), "ref"));

    assert!(session.check_auth(&api(&stub.base_url)).await);
    assert_eq!(session.user().await.unwrap().id, "u1");

    let paths: Vec<String> = stub.requests().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/auth/me"]);
}

#[tokio::test]
async fn check_auth_near_expiry_refreshes_first() {
    let renewed = make_jwt("u1", unix_now() + 3600);
    let stub = StubServer::spawn(vec![
        (200, format!(r#"{{"access_token": "{renewed}"}}"#)),
        (200, r#"{"id": "u1", "email": "a@b.c"}"#.to_string()),
    ])
    .await;
    let session = session();
    session
        .tokens()
        .set_pair(&pair(&make_jwt("u1", unix_now() + 60), "ref"));

    assert!(session.check_auth(&api(&stub.base_url)).await);
    assert_eq!(session.tokens().access().as_deref(), Some(renewed.as_str()));

    let paths: Vec<String> = stub.requests().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/auth/refresh", "/auth/me"]);
}

#[tokio::test]
async fn check_auth_failure_clears_the_session() {
    let stub = StubServer::spawn(vec![(401, r#"{"message": "unauthorized"}"#.to_string())]).await;
    let session = session();
    session
        .tokens()
        .set_pair(&pair(&make_jwt("u1", unix_now() + 3600), "ref"));

    assert!(!session.check_auth(&api(&stub.base_url)).await);
    assert_eq!(session.tokens().access(), None);
    assert_eq!(session.tokens().refresh(), None);
    assert!(session.user().await.is_none());
}

#[tokio::test]
async fn check_auth_with_undecodable_token_clears_the_session() {
    let session = session();
    session.tokens().set_pair(&pair("garbage", "ref"));

    assert!(!session.check_auth(&api("http://127.0.0.1:1")).await);
    assert_eq!(session.tokens().access(), None);
}
