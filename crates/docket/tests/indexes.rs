mod common;

use std::sync::Arc;

use docket::error::StoreError;
use docket::{Collection, EngineConfig, Error, IndexKind, IndexManager, IndexOptions, Repository};

use common::{FaultyCollection, songs};

const FIELDS: [&str; 5] = ["title", "artist", "album", "genre", "plays"];

#[tokio::test]
async fn create_is_idempotent() {
    let (_temp, collection) = songs();
    let manager = Repository::new(collection).indexes();

    for _ in 0..3 {
        let name = manager
            .create_index_with_fields("by_title", vec![("title".into(), IndexKind::Ascending)])
            .await
            .unwrap();
        assert_eq!(name, "by_title");
    }

    let listed = manager.list().await.unwrap();
    let named: Vec<_> = listed
        .iter()
        .filter(|i| i.get_str("name") == "by_title")
        .collect();
    assert_eq!(named.len(), 1);
}

#[tokio::test]
async fn redefinition_replaces_the_index() {
    let (_temp, collection) = songs();
    let repo = Repository::new(collection);
    let manager = repo.indexes();

    manager
        .create_index_with_fields("search", vec![("title".into(), IndexKind::Ascending)])
        .await
        .unwrap();
    manager
        .create_index_with_fields(
            "search",
            vec![
                ("title".into(), IndexKind::Text),
                ("plays".into(), IndexKind::Descending),
            ],
        )
        .await
        .unwrap();

    let listed = repo.collection().list_indexes().await.unwrap();
    assert_eq!(listed.len(), 1);
    let key = listed[0].get_object("key");
    assert_eq!(key.get_str("title"), "text");
    assert_eq!(key.get_int("plays"), -1);
    assert_eq!(listed[0].get_str("language_override"), "custom_language");
}

#[tokio::test]
async fn custom_language_options_are_applied() {
    let (_temp, collection) = songs();
    let manager = IndexManager::new(Arc::new(collection), &EngineConfig::default()).with_options(
        IndexOptions {
            default_language: "none".into(),
            language_override: "lang".into(),
        },
    );

    manager
        .create_index_with_fields("title_text", vec![("title".into(), IndexKind::Text)])
        .await
        .unwrap();
    let listed = manager.list().await.unwrap();
    assert_eq!(listed[0].get_str("default_language"), "none");
    assert_eq!(listed[0].get_str("language_override"), "lang");
}

#[tokio::test]
async fn exists_and_drop() {
    let (_temp, collection) = songs();
    let manager = Repository::new(collection).indexes();

    assert!(!manager.index_exists("plays").await.unwrap());
    assert!(!manager.drop_index("plays").await.unwrap());

    manager
        .create_index_with_fields("plays", vec![("plays".into(), IndexKind::Descending)])
        .await
        .unwrap();
    assert!(manager.index_exists("plays").await.unwrap());

    assert!(manager.drop_index("plays").await.unwrap());
    assert!(!manager.index_exists("plays").await.unwrap());
}

#[tokio::test]
async fn invalid_definition_is_rejected_before_the_store() {
    let (_temp, collection) = songs();
    let manager = Repository::new(collection).indexes();

    let err = manager
        .create_index_with_fields("empty", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(manager.list().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulk_single_indexes() {
    let (_temp, collection) = songs();
    let manager = Repository::new(collection).indexes();

    let report = manager.create_single_indexes(&FIELDS).await;
    assert!(report.is_complete());
    assert_eq!(report.outcomes.len(), 5);

    let mut listed: Vec<String> = manager
        .list()
        .await
        .unwrap()
        .iter()
        .map(|i| i.get_str("name").to_string())
        .collect();
    listed.sort();
    assert_eq!(listed, ["album", "artist", "genre", "plays", "title"]);
}

#[tokio::test]
async fn bulk_hash_indexes_use_hashed_keys() {
    let (_temp, collection) = songs();
    let manager = Repository::new(collection).indexes();

    let report = manager.create_single_hash_indexes(&["slug"]).await;
    assert!(report.is_complete());

    let listed = manager.list().await.unwrap();
    assert_eq!(listed[0].get_object("key").get_str("slug"), "hashed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulk_creation_survives_failing_workers() {
    let (_temp, collection) = songs();
    let faulty = FaultyCollection::new(collection)
        .failing_index("album")
        .panicking_index("genre");
    let manager = Repository::new(faulty).indexes();

    let report = manager.create_single_indexes(&FIELDS).await;

    assert_eq!(report.outcomes.len(), 5);
    let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, FIELDS);
    assert!(!report.is_complete());

    let failed: Vec<&str> = report.failures().map(|o| o.name.as_str()).collect();
    assert_eq!(failed, ["album", "genre"]);
    assert!(matches!(
        report.outcomes[3].result,
        Err(Error::Store(StoreError::Worker { .. }))
    ));

    let created: Vec<&str> = report.created().collect();
    assert_eq!(created, ["title", "artist", "plays"]);
    for name in created {
        assert!(manager.index_exists(name).await.unwrap());
    }
}
