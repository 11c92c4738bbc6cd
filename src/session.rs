use std::{collections::HashMap, convert::Infallible, fmt, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "blog_session";

/// SessionId
///
/// An opaque, unguessable session key (random UUID v4). Only the id travels in the
/// cookie; the session data itself stays server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session
///
/// The caller's session as seen by one request. Handlers receive it by value, pass it to
/// the auth gate and write back whatever the gate returns; nothing mutates it in place
/// behind their back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// `None` until the caller has a live server-side entry.
    pub id: Option<SessionId>,
    pub authenticated: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

// --- Session Store ---

/// SessionStore
///
/// The server-side session collaborator: keeps per-session data and enforces expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored `authenticated` flag, or `None` if the id is unknown or expired.
    async fn load(&self, id: &SessionId) -> Option<bool>;

    /// Creates or refreshes the entry for `id`.
    async fn save(&self, id: &SessionId, authenticated: bool);

    /// Destroys the entry for `id` entirely.
    async fn remove(&self, id: &SessionId);
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

struct SessionEntry {
    authenticated: bool,
    expires_at: DateTime<Utc>,
}

/// MemorySessionStore
///
/// Process-local session storage with a fixed time-to-live. Expired entries are pruned
/// lazily whenever the store is written to.
pub struct MemorySessionStore {
    entries: RwLock<HashMap<SessionId, SessionEntry>>,
    ttl: TimeDelta,
}

impl MemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Option<bool> {
        let entries = self.entries.read().await;
        let entry = entries.get(id)?;
        (entry.expires_at > Utc::now()).then_some(entry.authenticated)
    }

    async fn save(&self, id: &SessionId, authenticated: bool) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            *id,
            SessionEntry {
                authenticated,
                expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
    }

    async fn remove(&self, id: &SessionId) {
        self.entries.write().await.remove(id);
    }
}

// --- Cookies ---

/// CookieSettings
///
/// Attributes of the session cookie. `HttpOnly` and `SameSite=Lax` are fixed; `Secure`
/// is a deployment decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secure: config.cookie_secure,
        }
    }

    /// Writes the cookie for `session`, or clears it when the session has no id.
    pub fn apply(&self, jar: CookieJar, session: &Session) -> CookieJar {
        match session.id {
            Some(id) => jar.add(
                Cookie::build((SESSION_COOKIE, id.to_string()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(self.secure),
            ),
            None => jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        }
    }
}

// --- Extractor ---

/// Session Extractor Implementation
///
/// Resolves the caller's session from the `blog_session` cookie. A missing, malformed,
/// unknown or expired id all resolve to an anonymous session; this extractor never rejects.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| SessionId::parse(cookie.value()))
        else {
            return Ok(Session::anonymous());
        };

        Ok(match store.load(&id).await {
            Some(authenticated) => Session {
                id: Some(id),
                authenticated,
            },
            None => Session::anonymous(),
        })
    }
}
