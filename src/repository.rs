use std::{
    collections::BTreeMap,
    ffi::OsStr,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, RwLock},
};
use uuid::Uuid;

use crate::{
    error::StoreError,
    identifier::ArticleId,
    models::{Article, ArticleFields, ArticleSummary, sort_newest_first},
};

/// File extension of every persisted record.
pub const RECORD_EXTENSION: &str = "json";

/// ArticleRepository
///
/// The contract for all article persistence. Handlers only ever see this trait, so the
/// filesystem backend can be swapped for the in-memory one in tests (or a database later).
///
/// Every `ArticleId` reaching these methods has already passed `ArticleId::sanitize`
/// or was produced by the store itself.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Lists every readable record, newest first. Unreadable records are logged and
    /// skipped; only a failure to enumerate the store as a whole is an error.
    async fn list_articles(&self) -> Result<Vec<ArticleSummary>, StoreError>;

    async fn get_article(&self, id: &ArticleId) -> Result<Article, StoreError>;

    /// Persists a new record under a freshly generated id and returns that id.
    async fn create_article(&self, fields: ArticleFields) -> Result<ArticleId, StoreError>;

    /// Replaces all three fields of an existing record wholesale.
    async fn update_article(&self, id: &ArticleId, fields: ArticleFields)
    -> Result<(), StoreError>;

    /// Removes a record permanently.
    async fn delete_article(&self, id: &ArticleId) -> Result<(), StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn ArticleRepository>;

// --- Filesystem Backend ---

/// FileRepository
///
/// Stores each article as `<dir>/<id>.json`. Writes go to a hidden temporary sibling
/// first and are then renamed over the target, so a crash mid-write never leaves a
/// half-written record behind.
pub struct FileRepository {
    dir: PathBuf,
    // Serialises id reservation within this process.
    create_lock: Mutex<()>,
}

impl FileRepository {
    /// open
    ///
    /// Uses `dir` as the record directory, creating it (and any parents) if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();

        if !fs::try_exists(&dir).await.map_err(StoreError::Scan)? {
            fs::create_dir_all(&dir).await.map_err(StoreError::Scan)?;
            tracing::info!(dir = %dir.display(), "created articles directory");
        }

        Ok(Self {
            dir,
            create_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &ArticleId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    // Unique per write so concurrent writers of one record never share a temp file.
    fn temp_path(&self, id: &ArticleId) -> PathBuf {
        self.dir
            .join(format!(".{id}.{}.{RECORD_EXTENSION}.tmp", Uuid::new_v4().simple()))
    }

    async fn exists(&self, id: &ArticleId) -> Result<bool, StoreError> {
        fs::try_exists(self.record_path(id))
            .await
            .map_err(|source| StoreError::Write {
                id: id.to_string(),
                source,
            })
    }

    async fn read_record(&self, id: &ArticleId) -> Result<ArticleFields, StoreError> {
        let bytes = match fs::read(self.record_path(id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(err) => {
                return Err(StoreError::Read {
                    id: id.to_string(),
                    reason: err.to_string(),
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|err| StoreError::Read {
            id: id.to_string(),
            reason: err.to_string(),
        })
    }

    async fn write_record(&self, id: &ArticleId, fields: &ArticleFields) -> Result<(), StoreError> {
        let to_write_error = |source: std::io::Error| StoreError::Write {
            id: id.to_string(),
            source,
        };

        let body = encode_record(fields).map_err(|err| to_write_error(err.into()))?;
        let temp_path = self.temp_path(id);

        if let Err(err) = replace_file(&temp_path, &self.record_path(id), &body).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(to_write_error(err));
        }
        Ok(())
    }
}

/// Writes `body` to `temp_path`, flushes it to disk, then renames it over `target`.
async fn replace_file(temp_path: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(body).await?;
    file.sync_all().await?;
    fs::rename(temp_path, target).await
}

#[async_trait]
impl ArticleRepository for FileRepository {
    async fn list_articles(&self) -> Result<Vec<ArticleSummary>, StoreError> {
        let mut entries = fs::read_dir(&self.dir).await.map_err(StoreError::Scan)?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StoreError::Scan)? {
            if let Some(id) = record_id(&entry.file_name()) {
                ids.push(id);
            }
        }
        // Directory order is platform-dependent; start from a fixed order so date ties are stable.
        ids.sort();

        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_record(&id).await {
                Ok(fields) => articles.push(fields.summary(id)),
                Err(err) => {
                    tracing::warn!(article_id = %id, error = %err, "skipping unreadable article record");
                }
            }
        }

        sort_newest_first(&mut articles);
        Ok(articles)
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article, StoreError> {
        let fields = self.read_record(id).await?;
        Ok(fields.into_article(id.clone()))
    }

    async fn create_article(&self, fields: ArticleFields) -> Result<ArticleId, StoreError> {
        let _reservation = self.create_lock.lock().await;

        let now = Utc::now();
        let mut offset = 0;
        let id = loop {
            let candidate = ArticleId::generate(now, offset);
            if !self.exists(&candidate).await? {
                break candidate;
            }
            offset += 1;
        };

        self.write_record(&id, &fields).await?;
        tracing::info!(article_id = %id, "article created");
        Ok(id)
    }

    async fn update_article(
        &self,
        id: &ArticleId,
        fields: ArticleFields,
    ) -> Result<(), StoreError> {
        if !self.exists(id).await? {
            return Err(StoreError::NotFound);
        }

        self.write_record(id, &fields).await?;
        tracing::info!(article_id = %id, "article updated");
        Ok(())
    }

    async fn delete_article(&self, id: &ArticleId) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => {
                tracing::info!(article_id = %id, "article deleted");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(source) => Err(StoreError::Remove {
                id: id.to_string(),
                source,
            }),
        }
    }
}

/// Maps a directory entry name to its record id. Anything that is not `<valid-id>.json`
/// (temporary files, stray files, subdirectories with odd names) is ignored.
fn record_id(file_name: &OsStr) -> Option<ArticleId> {
    let stem = file_name
        .to_str()?
        .strip_suffix(RECORD_EXTENSION)?
        .strip_suffix('.')?;
    ArticleId::sanitize(stem)
}

/// Serialises a record with 4-space indentation.
fn encode_record(fields: &ArticleFields) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    fields.serialize(&mut serializer)?;
    Ok(body)
}

// --- In-Memory Backend ---

/// MemoryRepository
///
/// A non-persistent `ArticleRepository` with the same id, ordering and NotFound rules as
/// `FileRepository`. Used by handler and router tests that should not touch the disk.
#[derive(Default)]
pub struct MemoryRepository {
    records: RwLock<BTreeMap<ArticleId, ArticleFields>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record under a caller-chosen id.
    pub async fn insert(&self, id: ArticleId, fields: ArticleFields) {
        self.records.write().await.insert(id, fields);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleRepository for MemoryRepository {
    async fn list_articles(&self) -> Result<Vec<ArticleSummary>, StoreError> {
        let mut articles: Vec<ArticleSummary> = self
            .records
            .read()
            .await
            .iter()
            .map(|(id, fields)| fields.summary(id.clone()))
            .collect();

        sort_newest_first(&mut articles);
        Ok(articles)
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article, StoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .map(|fields| fields.into_article(id.clone()))
            .ok_or(StoreError::NotFound)
    }

    async fn create_article(&self, fields: ArticleFields) -> Result<ArticleId, StoreError> {
        let mut records = self.records.write().await;

        let now = Utc::now();
        let mut offset = 0;
        let id = loop {
            let candidate = ArticleId::generate(now, offset);
            if !records.contains_key(&candidate) {
                break candidate;
            }
            offset += 1;
        };

        records.insert(id.clone(), fields);
        Ok(id)
    }

    async fn update_article(
        &self,
        id: &ArticleId,
        fields: ArticleFields,
    ) -> Result<(), StoreError> {
        match self.records.write().await.get_mut(id) {
            Some(record) => {
                *record = fields;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_article(&self, id: &ArticleId) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
