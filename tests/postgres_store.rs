//! Postgres store tests. Each test gets a fresh database from `sqlx::test`,
//! so `DATABASE_URL` must point at a server that allows creating databases.

mod support;

use std::sync::Arc;

use blotter::application::repos::{PostStore, StoreError};
use blotter::domain::entities::{NewPost, PostId};
use blotter::infra::db::PostgresPostStore;
use sqlx::PgPool;

use support::{assert_concurrent_adds_get_distinct_ids, assert_store_contract, fields};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn postgres_store_honours_the_store_contract(pool: PgPool) {
    let store = PostgresPostStore::new(pool);
    assert_store_contract(&store, &PostId::new("987654")).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn caller_supplied_id_is_ignored(pool: PgPool) {
    let store = PostgresPostStore::new(pool);

    let id = store
        .add(NewPost::with_id(PostId::new("500"), fields("hinted")))
        .await
        .expect("add");
    assert_ne!(id, PostId::new("500"));
    assert!(store.get_by_id(&PostId::new("500")).await.is_err());
    assert_eq!(store.get_by_id(&id).await.expect("get").title(), "hinted");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn non_numeric_id_is_rejected_before_querying(pool: PgPool) {
    let store = PostgresPostStore::new(pool);

    let err = store
        .get_by_id(&PostId::new("12; DROP TABLE posts"))
        .await
        .expect_err("invalid id");
    assert!(matches!(err, StoreError::InvalidId { .. }));
    assert!(store.get_all().await.expect("table intact").is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_adds_receive_distinct_ids(pool: PgPool) {
    let store: Arc<dyn PostStore> = Arc::new(PostgresPostStore::new(pool));
    assert_concurrent_adds_get_distinct_ids(store, 16).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_succeeds_on_a_live_pool(pool: PgPool) {
    let store = PostgresPostStore::new(pool);
    store.health_check().await.expect("health");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn zero_padded_id_does_not_alias_a_row(pool: PgPool) {
    let store = PostgresPostStore::new(pool);
    let id = store.add(NewPost::new(fields("only"))).await.expect("add");

    let padded = PostId::new(format!("0{id}"));
    let err = store.get_by_id(&padded).await.expect_err("padded id");
    assert!(matches!(err, StoreError::InvalidId { .. }));
    assert_eq!(store.get_by_id(&id).await.expect("get").title(), "only");
}
