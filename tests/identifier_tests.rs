use chrono::{TimeZone, Utc};
use file_blog::identifier::ArticleId;

#[test]
fn test_accepts_allowed_character_class() {
    for raw in ["article1718000000000", "my-post", "snake_case", "A", "0", "-_-"] {
        let id = ArticleId::sanitize(raw);
        assert!(id.is_some(), "{raw:?} should be accepted");
        assert_eq!(id.unwrap().as_str(), raw);
    }
}

#[test]
fn test_rejects_traversal_and_separators() {
    for raw in [
        "",
        "../secret",
        "..",
        ".",
        "a/b",
        "a\\b",
        "a b",
        "post.json",
        "post\0",
        "%2e%2e",
        "caf\u{e9}",
        " post",
        "post\n",
    ] {
        assert!(ArticleId::sanitize(raw).is_none(), "{raw:?} should be rejected");
    }
}

#[test]
fn test_generated_ids_are_valid_and_time_based() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let first = ArticleId::generate(now, 0);
    let bumped = ArticleId::generate(now, 1);

    assert_eq!(first.as_str(), format!("article{}", now.timestamp_millis()));
    assert_eq!(bumped.as_str(), format!("article{}", now.timestamp_millis() + 1));
    assert!(ArticleId::sanitize(first.as_str()).is_some());
}

#[test]
fn test_display_matches_raw_value() {
    let id = ArticleId::sanitize("hello-world").unwrap();
    assert_eq!(id.to_string(), "hello-world");
}
