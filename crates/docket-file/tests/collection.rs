//! End-to-end tests for the file-backed collection.

use docket_core::error::{Error, InvalidInputError, StoreError};
use docket_core::{
    Collection, Document, DocumentCursor, DocumentId, Filter, FindOptions, IndexKind, IndexModel,
    Projection, ReturnDocument, SortDirection, Update,
};
use docket_file::{FileCollection, FileStore};
use serde_json::json;
use tempfile::TempDir;

fn setup() -> (TempDir, FileCollection) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let songs = FileStore::new(temp.path())
        .collection("songs")
        .expect("valid collection name");
    (temp, songs)
}

fn doc(json: serde_json::Value) -> Document {
    Document::from_json(json).expect("object literal")
}

async fn seed(songs: &FileCollection) {
    for (slug, title, plays) in [
        ("rain", "Purple Rain", 30),
        ("city", "Golden City", 10),
        ("sea", "Silent Sea", 20),
    ] {
        songs
            .insert_one(&doc(json!({"slug": slug, "title": {"en": title}, "plays": plays})))
            .await
            .unwrap();
    }
}

async fn titles(songs: &FileCollection, filter: &Filter, options: &FindOptions) -> Vec<String> {
    let mut cursor = songs.find(filter, options).await.unwrap();
    let docs = cursor.collect_all().await.unwrap();
    cursor.close().await.unwrap();
    docs.iter()
        .map(|d| d.get_object("title").get_str("en").to_string())
        .collect()
}

#[tokio::test]
async fn insert_generates_object_id() {
    let (_temp, songs) = setup();

    let id = songs
        .insert_one(&doc(json!({"title": "Untitled"})))
        .await
        .unwrap();
    assert!(id.is_object_id());

    let found = songs.find_one(&Filter::by_id(&id)).await.unwrap().unwrap();
    assert_eq!(DocumentId::from_document(&found).unwrap(), id);
    assert_eq!(found.get_str("title"), "Untitled");
}

#[tokio::test]
async fn insert_keeps_string_id_and_rejects_duplicates() {
    let (_temp, songs) = setup();

    let id = songs
        .insert_one(&doc(json!({"_id": "my/song", "title": "A"})))
        .await
        .unwrap();
    assert_eq!(id, DocumentId::Str("my/song".into()));

    let err = songs
        .insert_one(&doc(json!({"_id": "my/song", "title": "B"})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::DuplicateKey { .. })));
}

#[tokio::test]
async fn long_string_ids_round_trip() {
    let (_temp, songs) = setup();
    let long_id = "x".repeat(200);

    let id = songs
        .insert_one(&doc(json!({"_id": long_id, "title": "Long"})))
        .await
        .unwrap();
    assert_eq!(id, DocumentId::Str(long_id.clone()));

    let found = songs.find_one(&Filter::by_id(&id)).await.unwrap().unwrap();
    assert_eq!(found.get_str("_id"), long_id);

    let err = songs
        .insert_one(&doc(json!({"_id": long_id, "title": "Again"})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::DuplicateKey { .. })));

    let other = "x".repeat(201);
    songs
        .insert_one(&doc(json!({"_id": other, "title": "Longer"})))
        .await
        .unwrap();
    assert_eq!(songs.count().unwrap(), 2);

    assert_eq!(songs.delete_one(&Filter::by_id(&id)).await.unwrap(), 1);
    assert_eq!(songs.count().unwrap(), 1);
}

#[tokio::test]
async fn insert_rejects_unsupported_id() {
    let (_temp, songs) = setup();
    let err = songs
        .insert_one(&doc(json!({"_id": 42})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::UnsupportedIdType { .. })
    ));
}

#[tokio::test]
async fn find_sorts_pages_and_projects() {
    let (_temp, songs) = setup();
    seed(&songs).await;

    let all = titles(&songs, &Filter::new(), &FindOptions::new()).await;
    assert_eq!(all, ["Purple Rain", "Golden City", "Silent Sea"]);

    let options = FindOptions::new()
        .with_sort("plays", SortDirection::Descending)
        .with_pagination(1, 1);
    assert_eq!(titles(&songs, &Filter::new(), &options).await, ["Silent Sea"]);

    let options = FindOptions::new().with_projection(Projection::parse("slug").unwrap());
    let mut cursor = songs.find(&Filter::eq("slug", "sea"), &options).await.unwrap();
    let shaped = cursor.next().await.unwrap().unwrap();
    cursor.close().await.unwrap();
    assert!(shaped.contains_key("_id"));
    assert_eq!(shaped.get_str("slug"), "sea");
    assert!(!shaped.contains_key("title"));
}

#[tokio::test]
async fn find_on_missing_collection_is_empty() {
    let (_temp, songs) = setup();
    assert!(titles(&songs, &Filter::new(), &FindOptions::new()).await.is_empty());
    assert!(songs.find_one(&Filter::new()).await.unwrap().is_none());
    assert!(songs.list_indexes().await.unwrap().is_empty());
}

#[tokio::test]
async fn regex_search_supports_alternation_and_classes() {
    let (_temp, songs) = setup();
    seed(&songs).await;
    songs
        .insert_one(&doc(json!({"slug": "seven", "title": {"en": "Track 7"}, "plays": 1})))
        .await
        .unwrap();

    let mut filter = Filter::new();
    filter.append_regex_or(&["title.en", "slug"], "rain|^sea$");
    assert_eq!(
        titles(&songs, &filter, &FindOptions::new()).await,
        ["Purple Rain", "Silent Sea"]
    );

    let mut filter = Filter::new();
    filter.append_regex_or(&["title.en"], "\\d");
    assert_eq!(
        titles(&songs, &filter, &FindOptions::new()).await,
        ["Track 7"]
    );

    let mut filter = Filter::new();
    filter.append_regex_or(&["title.en"], "[unclosed");
    let err = songs.find(&filter, &FindOptions::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::Regex { .. })
    ));
}

#[tokio::test]
async fn text_search_requires_text_index() {
    let (_temp, songs) = setup();
    seed(&songs).await;

    let mut filter = Filter::new();
    filter.push(docket_core::Clause::Text {
        search: "city".into(),
    });

    let err = songs.find(&filter, &FindOptions::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::TextIndexRequired { .. })
    ));

    let model = IndexModel::new("title_text", vec![("title.en".into(), IndexKind::Text)]).unwrap();
    songs.create_index(&model).await.unwrap();
    assert_eq!(
        titles(&songs, &filter, &FindOptions::new()).await,
        ["Golden City"]
    );
}

#[tokio::test]
async fn find_one_and_update_returns_requested_version() {
    let (_temp, songs) = setup();
    seed(&songs).await;

    let after = songs
        .find_one_and_update(
            &Filter::eq("slug", "rain"),
            &Update::new().inc("plays", 1),
            ReturnDocument::After,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.get_int("plays"), 31);

    let before = songs
        .find_one_and_update(
            &Filter::eq("slug", "rain"),
            &Update::new().set("plays", 0),
            ReturnDocument::Before,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.get_int("plays"), 31);

    let missing = songs
        .find_one_and_update(
            &Filter::eq("slug", "nope"),
            &Update::new().set("plays", 0),
            ReturnDocument::After,
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_keeps_insertion_order() {
    let (_temp, songs) = setup();
    seed(&songs).await;

    songs
        .find_one_and_update(
            &Filter::eq("slug", "rain"),
            &Update::new().set("title.en", "Purple Reign"),
            ReturnDocument::After,
        )
        .await
        .unwrap();

    assert_eq!(
        titles(&songs, &Filter::new(), &FindOptions::new()).await,
        ["Purple Reign", "Golden City", "Silent Sea"]
    );
}

#[tokio::test]
async fn deletes() {
    let (_temp, songs) = setup();
    seed(&songs).await;

    assert_eq!(songs.delete_one(&Filter::eq("slug", "rain")).await.unwrap(), 1);
    assert_eq!(songs.delete_one(&Filter::eq("slug", "rain")).await.unwrap(), 0);

    let removed = songs
        .find_one_and_delete(&Filter::eq("slug", "sea"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.get_int("plays"), 20);
    assert_eq!(songs.count().unwrap(), 1);
}

#[tokio::test]
async fn index_lifecycle() {
    let (_temp, songs) = setup();

    let model = IndexModel::new("plays", vec![("plays".into(), IndexKind::Descending)]).unwrap();
    assert_eq!(songs.create_index(&model).await.unwrap(), "plays");
    assert_eq!(songs.create_index(&model).await.unwrap(), "plays");

    let listed = songs.list_indexes().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].get_str("name"), "plays");
    assert_eq!(listed[0].get_str("default_language"), "english");

    let changed = IndexModel::new("plays", vec![("plays".into(), IndexKind::Hashed)]).unwrap();
    assert!(matches!(
        songs.create_index(&changed).await.unwrap_err(),
        Error::Store(StoreError::IndexConflict { .. })
    ));

    let same_keys =
        IndexModel::new("plays_desc", vec![("plays".into(), IndexKind::Descending)]).unwrap();
    assert!(songs.create_index(&same_keys).await.is_err());

    songs.drop_index("plays").await.unwrap();
    assert!(songs.list_indexes().await.unwrap().is_empty());
    assert!(matches!(
        songs.drop_index("plays").await.unwrap_err(),
        Error::Store(StoreError::IndexNotFound { .. })
    ));
}

#[tokio::test]
async fn collections_are_listed() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    for name in ["songs", "artists"] {
        store
            .collection(name)
            .unwrap()
            .insert_one(&doc(json!({"n": 1})))
            .await
            .unwrap();
    }
    assert_eq!(store.list_collections().unwrap(), ["artists", "songs"]);
}

#[tokio::test]
async fn data_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let id = FileStore::new(temp.path())
        .collection("songs")
        .unwrap()
        .insert_one(&doc(json!({"released": {"$date": "2020-01-02T03:04:05.000Z"}})))
        .await
        .unwrap();

    let reopened = FileStore::new(temp.path()).collection("songs").unwrap();
    let found = reopened.find_one(&Filter::by_id(&id)).await.unwrap().unwrap();
    assert_eq!(
        found.get_datetime("released").to_rfc3339(),
        "2020-01-02T03:04:05+00:00"
    );
}
