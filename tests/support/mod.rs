//! Store contract checks shared by every backend's integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use blotter::application::repos::{PostStore, StoreError};
use blotter::domain::entities::{NewPost, PostFields, PostId, PostRecord};

pub fn fields(title: &str) -> PostFields {
    PostFields {
        title: title.to_string(),
        date: "21 Feb 2020".to_string(),
        link: format!("https://example.test/{title}"),
        content: format!("content of {title}"),
    }
}

/// Walk an empty store through the add/get/update lifecycle.
pub async fn assert_store_contract(store: &dyn PostStore, never_added: &PostId) {
    let all = store.get_all().await.expect("get_all on empty store");
    assert!(all.is_empty(), "store should start empty");

    let first = fields("Title1");
    let first_id = store
        .add(NewPost::new(first.clone()))
        .await
        .expect("add first");
    let fetched = store.get_by_id(&first_id).await.expect("get first");
    assert_eq!(fetched, PostRecord::new(first_id.clone(), first.clone()));

    let second = fields("Title2");
    let second_id = store
        .add(NewPost::new(second.clone()))
        .await
        .expect("add second");
    assert_ne!(first_id, second_id);

    let mut all = store.get_all().await.expect("get_all");
    all.sort_by(|a, b| a.title().cmp(b.title()));
    assert_eq!(
        all,
        vec![
            PostRecord::new(first_id.clone(), first),
            PostRecord::new(second_id.clone(), second.clone()),
        ]
    );

    let replacement = PostFields {
        title: "Edited".to_string(),
        date: String::new(),
        link: String::new(),
        content: "only content".to_string(),
    };
    store
        .update(PostRecord::new(first_id.clone(), replacement.clone()))
        .await
        .expect("update existing");
    let fetched = store.get_by_id(&first_id).await.expect("get updated");
    assert_eq!(fetched.fields, replacement, "update replaces every field");

    let untouched = store.get_by_id(&second_id).await.expect("get second");
    assert_eq!(untouched.fields, second);

    let err = store
        .update(PostRecord::new(never_added.clone(), fields("ghost")))
        .await
        .expect_err("update of missing id");
    assert!(matches!(err, StoreError::NotFound { .. }), "got {err:?}");
    assert_eq!(store.get_all().await.expect("get_all").len(), 2);

    let err = store
        .get_by_id(never_added)
        .await
        .expect_err("get of missing id");
    assert!(matches!(err, StoreError::NotFound { .. }), "got {err:?}");
}

/// Fire `count` concurrent adds and check every assigned id is distinct.
pub async fn assert_concurrent_adds_get_distinct_ids(store: Arc<dyn PostStore>, count: usize) {
    let before = store.get_all().await.expect("get_all").len();

    let handles: Vec<_> = (0..count)
        .map(|n| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.add(NewPost::new(fields(&format!("post-{n}")))).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle.await.expect("task").expect("add");
        assert!(ids.insert(id.clone()), "id {id} assigned twice");
    }

    assert_eq!(ids.len(), count);
    assert_eq!(store.get_all().await.expect("get_all").len(), before + count);
}
