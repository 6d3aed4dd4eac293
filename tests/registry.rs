//! Provider Registry Integration Tests
//!
//! Tests for registration, persistence, lookup and the content type index.

use contentkit::content_type::{DeclaredContentType, TextContentType};
use contentkit::core::{ContentManager, ManagerOptions, ProviderStore};
use contentkit::domain::ContentSelector;
use contentkit::providers::{ArrayProvider, ContentProvider, ProviderFactories, ProviderInfo};
use contentkit::ContentError;
use serde_json::{json, Value};
use tempfile::TempDir;

fn blog() -> ArrayProvider {
    ArrayProvider::from_values(
        "demo.blog",
        ProviderInfo::new("blog", "Blog")
            .with_category("news")
            .with_content_types(["post"]),
        vec![
            json!({"uuid": "b-1", "slug": "hello", "title": "Hello world"}),
            json!({"uuid": "b-2", "slug": "second", "title": "Second post"}),
        ],
    )
}

fn pages() -> ArrayProvider {
    ArrayProvider::from_values(
        "demo.pages",
        ProviderInfo::new("pages", "Pages"),
        vec![json!({"id": 1, "slug": "home", "title": "Home"})],
    )
}

fn feed() -> ArrayProvider {
    ArrayProvider::from_values(
        "demo.feed",
        ProviderInfo::new("feed", "Feed")
            .with_category("news")
            .with_content_types(["post", "text"]),
        Vec::new(),
    )
}

fn factories() -> ProviderFactories {
    let mut factories = ProviderFactories::new();
    factories.register("demo.blog", || Ok(Box::new(blog())));
    factories.register("demo.pages", || Ok(Box::new(pages())));
    factories.register("demo.feed", || Ok(Box::new(feed())));
    factories
}

fn post_type() -> DeclaredContentType {
    serde_yaml::from_str(
        r#"
name: post
title: Post
fields:
  - name: title
    type: text
"#,
    )
    .unwrap()
}

fn manager_with(temp: &TempDir, options: ManagerOptions) -> ContentManager {
    let mut manager =
        ContentManager::with_options(temp.path().join("content-providers.json"), factories(), options);
    let registry = manager.type_registry_mut();
    registry.register_schema(&TextContentType).unwrap();
    registry.register_schema(&post_type()).unwrap();
    manager
}

fn manager(temp: &TempDir) -> ContentManager {
    manager_with(temp, ManagerOptions::default())
}

#[test]
fn test_register_persists_record() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.register_provider(&blog()).unwrap();

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(manager.providers_file()).unwrap()).unwrap();
    assert_eq!(raw["version"], json!(1));
    assert_eq!(
        raw["providers"][0],
        json!({
            "handler": "demo.blog",
            "name": "blog",
            "title": "Blog",
            "type": ["post"],
            "category": "news"
        })
    );

    assert!(manager.has_provider("blog").unwrap());
    let provider = manager.provider("blog").unwrap().unwrap();
    assert_eq!(provider.provider_title(), Some("Blog"));
    assert_eq!(manager.type_registry().providers("post"), ["blog"]);
}

#[test]
fn test_register_unknown_handler_fails() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    let stray = ArrayProvider::new("demo.stray", ProviderInfo::new("stray", "Stray"), Vec::new());
    let result = manager.register_provider(&stray);

    assert!(matches!(result, Err(ContentError::InvalidProviderType(h)) if h == "demo.stray"));
    assert!(!manager.providers_file().exists());
}

#[test]
fn test_register_requires_name() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    let nameless = ArrayProvider::new("demo.blog", ProviderInfo::default(), Vec::new());
    let result = manager.register_provider(&nameless);

    assert!(matches!(result, Err(ContentError::MissingProviderName)));
    assert!(manager.providers(None, None).unwrap().is_empty());
}

#[test]
fn test_reregister_replaces_in_place() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&pages()).unwrap();
    manager.register_provider(&blog()).unwrap();

    let names: Vec<String> = manager
        .providers(None, None)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["blog", "pages"]);
}

#[test]
fn test_providers_filter_by_category() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&pages()).unwrap();
    manager.register_provider(&feed()).unwrap();

    let news: Vec<String> = manager
        .providers(Some("news"), None)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(news, vec!["blog", "feed"]);

    assert!(manager.providers(Some("sport"), None).unwrap().is_empty());
    assert_eq!(manager.providers(None, None).unwrap().len(), 3);
}

#[test]
fn test_providers_content_type_filter_is_opt_in() {
    let temp = TempDir::new().unwrap();

    let mut manager = manager(&temp);
    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&feed()).unwrap();
    assert_eq!(manager.providers(Some("news"), Some("text")).unwrap().len(), 2);

    let mut filtering = manager_with(
        &temp,
        ManagerOptions {
            filter_providers_by_content_type: true,
            ..ManagerOptions::default()
        },
    );
    let text = filtering.providers(Some("news"), Some("text")).unwrap();
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].name, "feed");
}

#[test]
fn test_unregister_keeps_index_entry() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.register_provider(&blog()).unwrap();
    manager.unregister_provider("blog").unwrap();

    assert!(!manager.has_provider("blog").unwrap());
    assert!(manager.providers(None, None).unwrap().is_empty());
    assert_eq!(manager.type_registry().providers("post"), ["blog"]);

    // The stale index entry no longer resolves
    assert!(manager.content_type("post", None).unwrap().is_none());

    let store = ProviderStore::load(manager.providers_file()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_unregister_prunes_index_when_enabled() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager_with(
        &temp,
        ManagerOptions {
            prune_index_on_unregister: true,
            ..ManagerOptions::default()
        },
    );

    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&feed()).unwrap();
    manager.unregister_provider("blog").unwrap();

    assert_eq!(manager.type_registry().providers("post"), ["feed"]);
}

#[test]
fn test_unregister_missing_provider_is_noop() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.unregister_provider("ghost").unwrap();
    assert!(!manager.providers_file().exists());
}

#[test]
fn test_register_keeps_external_edits() {
    let temp = TempDir::new().unwrap();
    let mut first = manager(&temp);
    let mut second = manager(&temp);

    first.register_provider(&blog()).unwrap();
    second.register_provider(&pages()).unwrap();
    first.register_provider(&feed()).unwrap();

    let names: Vec<String> = first
        .providers(None, None)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["blog", "pages", "feed"]);
}

#[test]
fn test_unregister_keeps_external_edits() {
    let temp = TempDir::new().unwrap();
    let mut first = manager(&temp);
    let mut second = manager(&temp);

    first.register_provider(&blog()).unwrap();
    second.register_provider(&pages()).unwrap();
    first.unregister_provider("blog").unwrap();

    let store = ProviderStore::load(first.providers_file()).unwrap();
    let names: Vec<&str> = store.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["pages"]);

    let names: Vec<String> = first
        .providers(None, None)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["pages"]);
}

#[test]
fn test_providers_empty_category_lists_all() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);

    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&pages()).unwrap();

    assert_eq!(manager.providers(Some(""), None).unwrap().len(), 2);
    assert_eq!(manager.providers(Some(""), Some("")).unwrap().len(), 2);
}

#[test]
fn test_index_registered_providers_on_startup() {
    let temp = TempDir::new().unwrap();
    manager(&temp).register_provider(&blog()).unwrap();

    let mut restarted = manager(&temp);
    assert!(restarted.type_registry().providers("post").is_empty());

    restarted.index_registered_providers().unwrap();
    restarted.index_registered_providers().unwrap();
    assert_eq!(restarted.type_registry().providers("post"), ["blog"]);
}

#[test]
fn test_index_on_register_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager_with(
        &temp,
        ManagerOptions {
            index_on_register: false,
            ..ManagerOptions::default()
        },
    );

    manager.register_provider(&blog()).unwrap();
    assert!(manager.type_registry().providers("post").is_empty());
    assert!(manager.has_provider("blog").unwrap());
}

#[tokio::test]
async fn test_content_type_resolution() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);
    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&feed()).unwrap();

    // First indexed provider wins
    let provider = manager.content_type("post", None).unwrap().unwrap();
    assert_eq!(provider.provider_name().unwrap(), "blog");
    assert_eq!(provider.content_type().unwrap().name(), "post");

    let item = provider.get("hello").await.unwrap().unwrap();
    assert_eq!(item.id(), "b-1");
    assert_eq!(item.title(), "Post");

    let provider = manager.content_type("post", Some("feed")).unwrap().unwrap();
    assert_eq!(provider.provider_name().unwrap(), "feed");

    assert!(manager.content_type("video", None).unwrap().is_none());
    assert!(manager.content_type("post", Some("ghost")).unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_by_selector() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);
    manager.register_provider(&blog()).unwrap();
    manager.register_provider(&pages()).unwrap();

    let selector = ContentSelector::parse("content>blog,post:uuid:b-2").unwrap().unwrap();
    let item = manager.fetch(&selector).await.unwrap().unwrap();
    assert_eq!(item.value("slug"), Some(&json!("second")));
    assert_eq!(item.title(), "Post");

    let selector = ContentSelector::parse("content>pages:slug:home").unwrap().unwrap();
    let item = manager.fetch(&selector).await.unwrap().unwrap();
    assert_eq!(item.id(), "1");
    assert_eq!(item.title(), "Pages");

    let selector = ContentSelector::parse("content>blog:title:WORLD").unwrap().unwrap();
    let item = manager.fetch(&selector).await.unwrap().unwrap();
    assert_eq!(item.id(), "b-1");

    let selector = ContentSelector::parse("content>ghost:id:1").unwrap().unwrap();
    assert!(manager.fetch(&selector).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_without_key_fields_finds_nothing() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);
    manager.register_provider(&blog()).unwrap();

    for raw in ["content>blog", "content>blog,post", "content>blog::hello"] {
        let selector = ContentSelector::parse(raw).unwrap().unwrap();
        assert!(manager.fetch(&selector).await.unwrap().is_none(), "{}", raw);
    }

    // Empty entries are skipped, the remaining field still searches
    let selector = ContentSelector::parse("content>blog:,title:x,WORLD").unwrap().unwrap();
    let item = manager.fetch(&selector).await.unwrap().unwrap();
    assert_eq!(item.id(), "b-1");
}

#[test]
fn test_fetch_from_sync_context() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(&temp);
    manager.register_provider(&pages()).unwrap();

    let selector = ContentSelector::parse("content>pages:id:1").unwrap().unwrap();
    let item = tokio_test::block_on(manager.fetch(&selector)).unwrap().unwrap();
    assert_eq!(item.value("title"), Some(&json!("Home")));
}
