use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, header, request::Parts},
};
use file_blog::{
    AdminCredentials, AppState, AuthGate, MemoryRepository, MemorySessionStore, SessionState,
    auth::{AdminSession, AuthError, AuthStatus, require_authenticated},
    session::{SESSION_COOKIE, Session, SessionId, SessionStore},
};
use std::sync::Arc;

// --- Helpers ---

const TEST_USER: &str = "admin";
const TEST_PASS: &str = "password123";

fn gate() -> (AuthGate, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new(3600));
    let gate = AuthGate::new(
        AdminCredentials::new(TEST_USER, TEST_PASS),
        store.clone() as SessionState,
    );
    (gate, store)
}

/// Helper to get the Parts of a request carrying an optional session cookie.
fn request_parts(cookie: Option<String>) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/admin/dashboard");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

// --- Auth Gate Transitions ---

#[tokio::test]
async fn test_login_with_valid_credentials_authenticates() {
    let (gate, store) = gate();

    let session = gate
        .login(Session::anonymous(), TEST_USER, TEST_PASS)
        .await
        .unwrap();

    assert_eq!(session.status(), AuthStatus::Authenticated);
    let id = session.id.expect("login issues a session id");
    assert_eq!(store.load(&id).await, Some(true));
}

#[tokio::test]
async fn test_login_with_wrong_password_stays_anonymous() {
    let (gate, store) = gate();

    let result = gate.login(Session::anonymous(), TEST_USER, "wrong").await;

    assert_eq!(result, Err(AuthError::InvalidCredentials));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_credential_error_does_not_reveal_field() {
    let (gate, _store) = gate();

    let bad_user = gate
        .login(Session::anonymous(), "root", TEST_PASS)
        .await
        .unwrap_err();
    let bad_pass = gate
        .login(Session::anonymous(), TEST_USER, "nope")
        .await
        .unwrap_err();

    assert_eq!(bad_user, bad_pass);
    assert_eq!(bad_user.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_comparison_is_exact() {
    let (gate, _store) = gate();

    for (user, pass) in [
        ("Admin", TEST_PASS),
        ("admin ", TEST_PASS),
        (TEST_USER, "password123 "),
        ("", ""),
    ] {
        assert!(gate.login(Session::anonymous(), user, pass).await.is_err());
    }
}

#[tokio::test]
async fn test_login_rotates_session_id() {
    let (gate, store) = gate();
    let planted = SessionId::random();
    store.save(&planted, false).await;

    let session = gate
        .login(
            Session {
                id: Some(planted),
                authenticated: false,
            },
            TEST_USER,
            TEST_PASS,
        )
        .await
        .unwrap();

    assert_ne!(session.id, Some(planted));
    // The pre-login id is gone, not upgraded.
    assert_eq!(store.load(&planted).await, None);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let (gate, store) = gate();
    let session = gate
        .login(Session::anonymous(), TEST_USER, TEST_PASS)
        .await
        .unwrap();
    let id = session.id.unwrap();

    let after = gate.logout(session).await;

    assert_eq!(after, Session::anonymous());
    assert_eq!(after.status(), AuthStatus::Anonymous);
    assert_eq!(store.load(&id).await, None);
}

#[tokio::test]
async fn test_logout_of_anonymous_session_is_noop() {
    let (gate, _store) = gate();
    assert_eq!(gate.logout(Session::anonymous()).await, Session::anonymous());
}

// --- Guard ---

#[test]
fn test_guard_redirects_anonymous_to_login() {
    let denied = require_authenticated(&Session::anonymous()).unwrap_err();

    assert_eq!(denied.status(), StatusCode::FOUND);
    assert_eq!(denied.headers()[header::LOCATION], "/login");
}

#[test]
fn test_guard_allows_authenticated() {
    let session = Session {
        id: Some(SessionId::random()),
        authenticated: true,
    };
    assert!(require_authenticated(&session).is_ok());
}

// --- Session Store ---

#[tokio::test]
async fn test_expired_sessions_are_absent() {
    let store = MemorySessionStore::new(0);
    let id = SessionId::random();

    store.save(&id, true).await;

    assert_eq!(store.load(&id).await, None);
    assert!(store.is_empty().await);
}

// --- Extractors ---

#[tokio::test]
async fn test_admin_session_extractor_with_valid_cookie() {
    let state = AppState::in_memory(Arc::new(MemoryRepository::new()));
    let session = state
        .auth
        .login(Session::anonymous(), TEST_USER, TEST_PASS)
        .await
        .unwrap();
    let cookie = format!("{}={}", SESSION_COOKIE, session.id.unwrap());

    let mut parts = request_parts(Some(cookie));
    let admin = AdminSession::from_request_parts(&mut parts, &state).await;

    assert!(admin.is_ok());
    assert_eq!(admin.unwrap().0, session);
}

#[tokio::test]
async fn test_admin_session_extractor_without_cookie_redirects() {
    let state = AppState::in_memory(Arc::new(MemoryRepository::new()));

    let mut parts = request_parts(None);
    let rejection = AdminSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();

    assert_eq!(rejection.status(), StatusCode::FOUND);
    assert_eq!(rejection.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_unknown_or_malformed_cookie_is_anonymous() {
    let state = AppState::in_memory(Arc::new(MemoryRepository::new()));

    for cookie in [
        format!("{}={}", SESSION_COOKIE, SessionId::random()),
        format!("{}=not-a-uuid", SESSION_COOKIE),
        "other=1".to_string(),
    ] {
        let mut parts = request_parts(Some(cookie));
        let Ok(session) = Session::from_request_parts(&mut parts, &state).await;
        assert_eq!(session, Session::anonymous());
    }
}
