mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Barrier;

use blotter::application::posts::{PostForm, PostService};
use blotter::application::repos::{PostStore, StoreError, StoreErrorKind};
use blotter::domain::entities::{NewPost, PostId, PostRecord};
use blotter::domain::seed::demo_posts;
use blotter::infra::memory::MemoryPostStore;

use support::{assert_concurrent_adds_get_distinct_ids, assert_store_contract, fields};

#[tokio::test]
async fn memory_store_honours_the_store_contract() {
    let store = MemoryPostStore::new();
    assert_store_contract(&store, &PostId::new("99")).await;
}

#[tokio::test]
async fn first_post_is_assigned_zero() {
    let store = MemoryPostStore::new();
    let post = fields("Title1");

    let id = store.add(NewPost::new(post.clone())).await.expect("add");
    assert_eq!(id, PostId::new("0"));

    let fetched = store.get_by_id(&PostId::new("0")).await.expect("get");
    assert_eq!(fetched, PostRecord::new(id, post));
}

#[tokio::test]
async fn non_numeric_id_is_a_validation_error() {
    let store = MemoryPostStore::with_posts(demo_posts());

    let err = store
        .get_by_id(&PostId::new("not-a-number"))
        .await
        .expect_err("invalid id");
    assert!(matches!(err, StoreError::InvalidId { .. }));
    assert_eq!(err.kind(), StoreErrorKind::Validation);
}

#[tokio::test]
async fn update_of_unknown_id_leaves_the_store_unchanged() {
    let store = MemoryPostStore::with_posts(demo_posts());

    let err = store
        .update(PostRecord::new(PostId::new("99"), fields("ghost")))
        .await
        .expect_err("missing id");
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(store.get_all().await.expect("get_all").len(), 2);
    assert!(store.get_by_id(&PostId::new("99")).await.is_err());
}

#[tokio::test]
async fn get_all_returns_every_added_post() {
    let store = MemoryPostStore::new();
    let mut expected = Vec::new();
    for n in 0..5 {
        let post = fields(&format!("post-{n}"));
        let id = store.add(NewPost::new(post.clone())).await.expect("add");
        expected.push(PostRecord::new(id, post));
    }

    let mut all = store.get_all().await.expect("get_all");
    all.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(all, expected);
}

#[tokio::test]
async fn seeded_store_continues_numbering_after_the_samples() {
    let store = MemoryPostStore::with_posts(demo_posts());
    let id = store.add(NewPost::new(fields("third"))).await.expect("add");
    assert_eq!(id, PostId::new("2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_receive_distinct_ids() {
    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::new());
    assert_concurrent_adds_get_distinct_ids(store, 64).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_partial_update() {
    const READERS: usize = 3;

    let store = Arc::new(MemoryPostStore::new());
    let id = store
        .add(NewPost::new(fields("v0")))
        .await
        .expect("add");
    let start = Arc::new(Barrier::new(READERS + 1));
    let writing = Arc::new(AtomicBool::new(true));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let store = Arc::clone(&store);
            let id = id.clone();
            let start = Arc::clone(&start);
            let writing = Arc::clone(&writing);
            tokio::spawn(async move {
                start.wait().await;
                let mut reads = 0usize;
                while writing.load(Ordering::Acquire) || reads == 0 {
                    let post = store.get_by_id(&id).await.expect("get");
                    let title = post.fields.title.clone();
                    assert_eq!(post.fields, fields(&title), "fields from different writes");
                    reads += 1;
                    tokio::task::yield_now().await;
                }
                reads
            })
        })
        .collect();

    start.wait().await;
    for n in 1..500 {
        store
            .update(PostRecord::new(id.clone(), fields(&format!("v{n}"))))
            .await
            .expect("update");
        tokio::task::yield_now().await;
    }
    writing.store(false, Ordering::Release);

    for reader in readers {
        assert!(reader.await.expect("reader task") > 0);
    }
    assert_eq!(store.get_by_id(&id).await.expect("get").title(), "v499");
}

#[tokio::test]
async fn non_canonical_ids_do_not_alias_a_post() {
    let store = MemoryPostStore::with_posts(demo_posts());

    for raw in ["00", "+0", "000000", "01"] {
        let err = store
            .get_by_id(&PostId::new(raw))
            .await
            .expect_err("non-canonical id");
        assert!(matches!(err, StoreError::InvalidId { .. }), "raw = {raw}");

        let err = store
            .update(PostRecord::new(PostId::new(raw), fields("alias")))
            .await
            .expect_err("non-canonical id");
        assert!(matches!(err, StoreError::InvalidId { .. }), "raw = {raw}");
    }

    let err = store
        .add(NewPost::with_id(PostId::new("+5"), fields("hinted")))
        .await
        .expect_err("non-canonical hint");
    assert!(matches!(err, StoreError::InvalidId { .. }));

    assert_eq!(store.get_by_id(&PostId::new("0")).await.expect("get").title(), "Title1");
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn service_update_reports_the_canonical_id() {
    let posts = PostService::new(
        Arc::new(MemoryPostStore::with_posts(demo_posts())),
        Duration::from_secs(1),
    );

    let err = posts
        .update_post("+00", PostForm::default())
        .await
        .expect_err("non-canonical id");
    assert_eq!(err.kind(), StoreErrorKind::Validation);

    let form = PostForm {
        title: "Renamed".to_string(),
        ..PostForm::default()
    };
    let updated = posts.update_post(" 1 ", form).await.expect("update");
    assert_eq!(updated.id, PostId::new("1"));
}
