use std::env;

use crate::auth::AdminCredentials;

const DEFAULT_ARTICLES_DIR: &str = "articles";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;

// Local-only fallbacks. Production refuses to start without explicit values.
const LOCAL_ADMIN_USERNAME: &str = "admin";
const LOCAL_ADMIN_PASSWORD: &str = "password123";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup,
/// then cloned into the shared `AppState` and pulled by handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls credential fallbacks and log format.
    pub env: Env,
    // Directory holding one `<id>.json` record per article.
    pub articles_dir: String,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // The single administrator account.
    pub admin: AdminCredentials,
    // Lifetime of a server-side session entry, in seconds.
    pub session_ttl_secs: u64,
    // Whether the session cookie carries the `Secure` attribute (HTTPS-only).
    pub cookie_secure: bool,
}

/// Env
///
/// Defines the runtime context. `Local` tolerates missing credentials (with a warning),
/// `Production` does not.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Provides a non-panicking local configuration, primarily used for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            articles_dir: DEFAULT_ARTICLES_DIR.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            admin: AdminCredentials::new(LOCAL_ADMIN_USERNAME, LOCAL_ADMIN_PASSWORD),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables and fails fast on anything
    /// the current environment cannot run without.
    ///
    /// # Panics
    /// Panics in `Production` when `ADMIN_USERNAME` or `ADMIN_PASSWORD` is unset, and in
    /// any environment when `SESSION_TTL_SECS` or `COOKIE_SECURE` is set but malformed.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let admin = match env {
            Env::Production => AdminCredentials::new(
                env::var("ADMIN_USERNAME").expect("FATAL: ADMIN_USERNAME must be set in production."),
                env::var("ADMIN_PASSWORD").expect("FATAL: ADMIN_PASSWORD must be set in production."),
            ),
            Env::Local => AdminCredentials::new(
                local_fallback("ADMIN_USERNAME", LOCAL_ADMIN_USERNAME),
                local_fallback("ADMIN_PASSWORD", LOCAL_ADMIN_PASSWORD),
            ),
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: SESSION_TTL_SECS must be a whole number of seconds."),
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: COOKIE_SECURE must be `true` or `false`."),
            // HTTPS-only cookies are the production default; plain HTTP is fine locally.
            Err(_) => env == Env::Production,
        };

        Self {
            env,
            articles_dir: env::var("ARTICLES_DIR")
                .unwrap_or_else(|_| DEFAULT_ARTICLES_DIR.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            admin,
            session_ttl_secs,
            cookie_secure,
        }
    }
}

/// Reads `key`, falling back to a well-known insecure value. The fallback is never
/// applied silently.
fn local_fallback(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        tracing::warn!(
            variable = key,
            "{} is unset; using the insecure local default. Do not deploy like this.",
            key
        );
        fallback.to_string()
    })
}
