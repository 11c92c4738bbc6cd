use std::{fmt, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Response,
};

use crate::{
    handlers::found,
    session::{Session, SessionId, SessionState},
};

/// Where the guard sends anonymous callers.
pub const LOGIN_PATH: &str = "/login";

/// AdminCredentials
///
/// The single configured administrator account. Handed to the `AuthGate` explicitly;
/// never read from ambient state.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exact-match comparison of both fields.
    // TODO: store a password hash and compare in constant time.
    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

// Keeps the password out of logs and panic messages.
impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// AuthStatus
///
/// The two states of the auth state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated,
}

impl Session {
    pub fn status(&self) -> AuthStatus {
        if self.authenticated {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Deliberately does not say which field was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// AuthGate
///
/// Validates credentials and drives session transitions. Sessions go in by value and the
/// updated session comes back out; the caller is responsible for writing the cookie.
pub struct AuthGate {
    credentials: AdminCredentials,
    sessions: SessionState,
}

/// AuthGateState
///
/// The concrete type used to share the auth gate across the application state.
pub type AuthGateState = Arc<AuthGate>;

impl AuthGate {
    pub fn new(credentials: AdminCredentials, sessions: SessionState) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    /// login
    ///
    /// `Anonymous --login(valid)--> Authenticated`. On success the old session id is
    /// discarded and a fresh one issued before the authenticated flag is stored, so an id
    /// planted before login is useless afterwards. On failure the session is left as-is.
    pub async fn login(
        &self,
        session: Session,
        username: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if !self.credentials.matches(username, password) {
            tracing::warn!("rejected admin login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(previous) = session.id {
            self.sessions.remove(&previous).await;
        }

        let id = SessionId::random();
        self.sessions.save(&id, true).await;
        tracing::info!(username = self.credentials.username(), "admin logged in");

        Ok(Session {
            id: Some(id),
            authenticated: true,
        })
    }

    /// logout
    ///
    /// `Authenticated --logout()--> Anonymous`. Destroys the server-side entry, not just
    /// the flag. Logging out an anonymous session is a no-op.
    pub async fn logout(&self, session: Session) -> Session {
        if let Some(id) = session.id {
            self.sessions.remove(&id).await;
            tracing::info!("session destroyed");
        }
        Session::anonymous()
    }
}

/// require_authenticated
///
/// The guard consulted before every admin-only operation. Denial is a redirect to the
/// login page, whichever operation was requested.
pub fn require_authenticated(session: &Session) -> Result<(), Response> {
    match session.status() {
        AuthStatus::Authenticated => Ok(()),
        AuthStatus::Anonymous => Err(found(LOGIN_PATH)),
    }
}

/// AdminSession
///
/// A `Session` that has passed `require_authenticated`. Taking it as a handler or
/// middleware argument is what guards a route.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await;

        if let Err(redirect) = require_authenticated(&session) {
            tracing::debug!(uri = %parts.uri, "anonymous request to admin route");
            return Err(redirect);
        }
        Ok(AdminSession(session))
    }
}
