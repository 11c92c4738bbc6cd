use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Prefix of every generated id, e.g. `article1718000000000`.
const GENERATED_PREFIX: &str = "article";

/// ArticleId
///
/// A record key restricted to `[A-Za-z0-9_-]+`. The only ways to obtain one are
/// `sanitize` (caller-supplied input) and `generate` (fresh ids), so any `ArticleId`
/// is safe to join onto a directory path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// sanitize
    ///
    /// Returns the identifier unchanged if it consists entirely of ASCII letters, digits,
    /// `_` or `-`. Anything else (empty input, `..`, separators, whitespace, non-ASCII)
    /// yields `None` and must never reach the record store.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        valid.then(|| Self(raw.to_string()))
    }

    /// Builds the time-based token for `now`, advanced by `offset` milliseconds.
    /// The store bumps `offset` when the key is already taken.
    pub fn generate(now: DateTime<Utc>, offset: i64) -> Self {
        Self(format!(
            "{}{}",
            GENERATED_PREFIX,
            now.timestamp_millis().saturating_add(offset)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
