//! Store trait describing persistence adapters for posts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{NewPost, PostId, PostRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid post id `{raw}`: {reason}")]
    InvalidId { raw: String, reason: String },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("post `{id}` not found")]
    NotFound { id: PostId },
    #[error("post `{id}` already exists")]
    Duplicate { id: PostId },
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
    #[error("{operation} failed{}: {message}", id_suffix(.id))]
    Backend {
        operation: &'static str,
        id: Option<PostId>,
        message: String,
    },
}

fn id_suffix(id: &Option<PostId>) -> String {
    match id {
        Some(id) => format!(" for post `{id}`"),
        None => String::new(),
    }
}

/// Coarse classification used by callers to choose a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Validation,
    NotFound,
    Store,
}

impl StoreError {
    pub fn invalid_id(raw: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidId {
            raw: raw.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(id: &PostId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    pub fn backend(
        operation: &'static str,
        id: Option<&PostId>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Backend {
            operation,
            id: id.cloned(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::InvalidId { .. } | StoreError::MissingField { .. } => {
                StoreErrorKind::Validation
            }
            StoreError::NotFound { .. } => StoreErrorKind::NotFound,
            StoreError::Duplicate { .. }
            | StoreError::Timeout { .. }
            | StoreError::Backend { .. } => StoreErrorKind::Store,
        }
    }
}

/// Keyed CRUD storage for posts, shared process-wide as `Arc<dyn PostStore>`.
///
/// Every operation is atomic with respect to concurrent callers, and reads
/// return owned copies.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Short backend name used in logs and metric labels.
    fn backend(&self) -> &'static str;

    /// Every stored post, in no guaranteed order.
    async fn get_all(&self) -> Result<Vec<PostRecord>, StoreError>;

    async fn get_by_id(&self, id: &PostId) -> Result<PostRecord, StoreError>;

    /// Insert a post and return the identifier it is stored under.
    async fn add(&self, post: NewPost) -> Result<PostId, StoreError>;

    /// Replace every field of an existing post. Fails with `NotFound` instead
    /// of creating a record.
    async fn update(&self, post: PostRecord) -> Result<(), StoreError>;
}
