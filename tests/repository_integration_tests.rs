use file_blog::{
    error::StoreError,
    identifier::ArticleId,
    models::ArticleFields,
    repository::{ArticleRepository, FileRepository},
};
use std::fs;
use tempfile::TempDir;

// --- Helpers ---

async fn open_repo() -> (TempDir, FileRepository) {
    let dir = TempDir::new().unwrap();
    let repo = FileRepository::open(dir.path()).await.unwrap();
    (dir, repo)
}

fn fields(title: &str, content: &str, date: &str) -> ArticleFields {
    ArticleFields {
        title: title.to_string(),
        content: content.to_string(),
        date: date.to_string(),
    }
}

fn id(raw: &str) -> ArticleId {
    ArticleId::sanitize(raw).unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_open_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("content").join("articles");

    let repo = FileRepository::open(&nested).await.unwrap();

    assert!(nested.is_dir());
    assert_eq!(repo.dir(), nested.as_path());
    assert!(repo.list_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_then_get_returns_same_fields() {
    let (_dir, repo) = open_repo().await;

    let created = repo
        .create_article(fields("Hello", "First post.\nSecond line.", "2024-03-01"))
        .await
        .unwrap();
    let article = repo.get_article(&created).await.unwrap();

    assert_eq!(article.id, created);
    assert_eq!(article.title, "Hello");
    assert_eq!(article.content, "First post.\nSecond line.");
    assert_eq!(article.date, "2024-03-01");
}

#[tokio::test]
async fn test_created_ids_are_time_based_and_distinct() {
    let (_dir, repo) = open_repo().await;

    let first = repo.create_article(fields("A", "a", "2024-01-01")).await.unwrap();
    let second = repo.create_article(fields("B", "b", "2024-01-02")).await.unwrap();

    assert!(first.as_str().starts_with("article"));
    assert!(second.as_str().starts_with("article"));
    assert_ne!(first, second);
    assert!(ArticleId::sanitize(first.as_str()).is_some());
}

#[tokio::test]
async fn test_record_layout_on_disk() {
    let (dir, repo) = open_repo().await;

    let created = repo.create_article(fields("T", "C", "2024-01-01")).await.unwrap();

    let path = dir.path().join(format!("{}.json", created));
    let raw = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value, serde_json::json!({"title": "T", "content": "C", "date": "2024-01-01"}));
    // The id lives in the file name only.
    assert!(value.get("id").is_none());
    assert!(raw.contains("\n    \"title\""));

    // No temporary files left behind.
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_list_sorted_by_date_descending() {
    let (_dir, repo) = open_repo().await;

    for date in ["2024-01-01", "2024-06-01", "2023-12-31"] {
        repo.create_article(fields(date, "body", date)).await.unwrap();
    }

    let dates: Vec<String> = repo
        .list_articles()
        .await
        .unwrap()
        .into_iter()
        .map(|summary| summary.date)
        .collect();

    assert_eq!(dates, vec!["2024-06-01", "2024-01-01", "2023-12-31"]);
}

#[tokio::test]
async fn test_list_skips_corrupt_and_foreign_files() {
    let (dir, repo) = open_repo().await;

    repo.create_article(fields("Good", "ok", "2024-02-02")).await.unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("partial.json"), r#"{"title": "No body"}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::write(dir.path().join("bad name.json"), r#"{"title":"x","content":"y","date":"2024-01-01"}"#).unwrap();
    fs::write(dir.path().join(".pending.json.tmp"), "{").unwrap();

    let listed = repo.list_articles().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Good");
}

#[tokio::test]
async fn test_list_ignores_extra_keys_in_records() {
    let (dir, repo) = open_repo().await;
    fs::write(
        dir.path().join("legacy.json"),
        r#"{"title": "Old", "content": "c", "date": "2020-05-05", "id": "spoofed"}"#,
    )
    .unwrap();

    let listed = repo.list_articles().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id("legacy"));
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let (_dir, repo) = open_repo().await;

    let result = repo.get_article(&id("article0")).await;

    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn test_get_corrupt_is_read_error() {
    let (dir, repo) = open_repo().await;
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let result = repo.get_article(&id("broken")).await;

    assert!(matches!(result, Err(StoreError::Read { .. })));
}

#[tokio::test]
async fn test_update_replaces_all_fields() {
    let (dir, repo) = open_repo().await;
    fs::write(
        dir.path().join("post-1.json"),
        r#"{"title": "T1", "content": "C1", "date": "2023-01-01", "draft": true}"#,
    )
    .unwrap();

    repo.update_article(&id("post-1"), fields("T2", "C2", "2024-01-01"))
        .await
        .unwrap();

    let article = repo.get_article(&id("post-1")).await.unwrap();
    assert_eq!(article.title, "T2");
    assert_eq!(article.content, "C2");
    assert_eq!(article.date, "2024-01-01");

    // Wholesale replacement: nothing from the previous version survives.
    let raw = fs::read_to_string(dir.path().join("post-1.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"title": "T2", "content": "C2", "date": "2024-01-01"}));
}

#[tokio::test]
async fn test_update_missing_is_not_found_and_creates_nothing() {
    let (dir, repo) = open_repo().await;

    let result = repo
        .update_article(&id("ghost"), fields("T", "C", "2024-01-01"))
        .await;

    assert!(matches!(result, Err(StoreError::NotFound)));
    assert!(!dir.path().join("ghost.json").exists());
}

#[tokio::test]
async fn test_delete_removes_record() {
    let (dir, repo) = open_repo().await;
    let created = repo.create_article(fields("T", "C", "2024-01-01")).await.unwrap();

    repo.delete_article(&created).await.unwrap();

    assert!(!dir.path().join(format!("{}.json", created)).exists());
    assert!(matches!(
        repo.get_article(&created).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_missing_is_not_found_and_listing_unaffected() {
    let (_dir, repo) = open_repo().await;
    repo.create_article(fields("Keep", "C", "2024-01-01")).await.unwrap();

    let result = repo.delete_article(&id("nope")).await;

    assert!(matches!(result, Err(StoreError::NotFound)));
    let listed = repo.list_articles().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Keep");
}
