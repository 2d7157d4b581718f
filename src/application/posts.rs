//! Handler-facing post operations over a shared `PostStore`.

use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use metrics::{counter, histogram};
use serde::Deserialize;
use tracing::debug;

use crate::application::repos::{PostStore, StoreError, StoreErrorKind};
use crate::domain::entities::{NewPost, PostFields, PostId, PostRecord};

/// Untrusted post fields as submitted by a form. Missing fields are empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub link: String,
    pub content: String,
}

impl PostForm {
    fn into_parts(self) -> (Option<String>, PostFields) {
        let PostForm {
            id,
            title,
            date,
            link,
            content,
        } = self;
        (
            id,
            PostFields {
                title,
                date,
                link,
                content,
            },
        )
    }
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
    deadline: Duration,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, StoreError> {
        self.call("get_all", self.store.get_all()).await
    }

    pub async fn get_post(&self, raw_id: &str) -> Result<PostRecord, StoreError> {
        let id = required_id(raw_id)?;
        self.call("get_by_id", self.store.get_by_id(&id)).await
    }

    /// Create a post. A caller-supplied id is forwarded as a hint only; the
    /// returned record carries whatever id the store assigned.
    pub async fn create_post(&self, form: PostForm) -> Result<PostRecord, StoreError> {
        let (raw_id, fields) = form.into_parts();
        let hint = raw_id.as_deref().and_then(optional_id);
        let post = NewPost {
            id: hint,
            fields: fields.clone(),
        };

        let id = self.call("add", self.store.add(post)).await?;
        Ok(PostRecord::new(id, fields))
    }

    /// Replace the fields of an existing post. Any `id` inside the form is
    /// ignored in favour of `raw_id`.
    pub async fn update_post(
        &self,
        raw_id: &str,
        form: PostForm,
    ) -> Result<PostRecord, StoreError> {
        let id = required_id(raw_id)?;
        let (_, fields) = form.into_parts();
        let record = PostRecord::new(id, fields);

        self.call("update", self.store.update(record.clone())).await?;
        Ok(record)
    }

    pub async fn check_health(&self) -> Result<(), StoreError> {
        self.call("health", async { self.store.get_all().await.map(|_| ()) })
            .await
    }

    async fn call<T, F>(&self, operation: &'static str, future: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.deadline, future).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout { operation }),
        };

        let backend = self.store.backend();
        let outcome = outcome_label(&result);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        counter!(
            "blotter_store_operations_total",
            "backend" => backend,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        histogram!(
            "blotter_store_operation_ms",
            "backend" => backend,
            "operation" => operation
        )
        .record(elapsed_ms);

        debug!(
            target = "blotter::store",
            backend, operation, outcome, elapsed_ms, "store operation finished"
        );

        result
    }
}

fn required_id(raw: &str) -> Result<PostId, StoreError> {
    optional_id(raw).ok_or(StoreError::MissingField { field: "id" })
}

fn optional_id(raw: &str) -> Option<PostId> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PostId::new(trimmed))
}

fn outcome_label<T>(result: &Result<T, StoreError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(err) => match err.kind() {
            StoreErrorKind::Validation => "invalid",
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Store => "error",
        },
    }
}
