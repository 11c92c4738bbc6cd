use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::identifier::ArticleId;

// --- Core Domain Schemas ---

/// Article
///
/// A fully loaded article. The `id` comes from the record's storage key, never from
/// the record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub date: String,
}

/// ArticleSummary
///
/// The listing projection used by the home page and the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub date: String,
}

/// ArticleFields
///
/// The three user-editable fields, already validated as non-empty. This is also the
/// exact on-disk record body: `{"title": .., "content": .., "date": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
    pub date: String,
}

impl ArticleFields {
    pub fn into_article(self, id: ArticleId) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
            date: self.date,
        }
    }

    pub fn summary(&self, id: ArticleId) -> ArticleSummary {
        ArticleSummary {
            id,
            title: self.title.clone(),
            date: self.date.clone(),
        }
    }
}

// --- Request Payloads (Form Bodies) ---

/// ArticleForm
///
/// Raw `application/x-www-form-urlencoded` body of the add and edit forms.
/// Missing fields deserialize as empty strings so validation can report them
/// instead of the extractor rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: String,
}

impl ArticleForm {
    /// validate
    ///
    /// All three fields are required. No data is mutated on failure; the caller
    /// re-renders the form with the submitted values.
    pub fn validate(&self) -> Result<ArticleFields, ValidationError> {
        if self.title.is_empty() || self.content.is_empty() || self.date.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        Ok(ArticleFields {
            title: self.title.clone(),
            content: self.content.clone(),
            date: self.date.clone(),
        })
    }
}

impl From<&Article> for ArticleForm {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            date: article.date.clone(),
        }
    }
}

/// LoginForm
///
/// Body of `POST /login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,
}

// --- Date Ordering ---

/// parse_article_date
///
/// Interprets an article's free-form `date` string for sort ordering. Accepts a plain
/// calendar date (`2024-06-01`), an RFC 3339 timestamp, or a local `YYYY-MM-DDTHH:MM[:SS]`
/// timestamp. Returns `None` for anything else.
pub fn parse_article_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// sort_newest_first
///
/// Orders summaries by parsed date, newest first. Unparseable dates go last; ties keep
/// their incoming order.
pub fn sort_newest_first(articles: &mut [ArticleSummary]) {
    // `Option` orders `None` below any `Some`, so a reversed comparison puts them last.
    articles.sort_by(|a, b| parse_article_date(&b.date).cmp(&parse_article_date(&a.date)));
}
