//! In-process post store keyed by sequential integer ids.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::repos::{PostStore, StoreError};
use crate::domain::entities::{NewPost, PostFields, PostId, PostRecord};

use super::lock::{rw_read, rw_write};

const BACKEND: &str = "memory";

#[derive(Debug, Default)]
struct MemoryState {
    posts: BTreeMap<u64, PostFields>,
    // Always greater than every stored key.
    next_id: u64,
}

impl MemoryState {
    fn allocate(&mut self) -> Result<u64, StoreError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::backend("add", None, "identifier space exhausted"))?;
        Ok(id)
    }

    fn reserve(&mut self, id: u64, raw: &PostId) -> Result<(), StoreError> {
        if self.posts.contains_key(&id) {
            return Err(StoreError::Duplicate { id: raw.clone() });
        }
        let after = id
            .checked_add(1)
            .ok_or_else(|| StoreError::invalid_id(raw.as_str(), "identifier out of range"))?;
        self.next_id = self.next_id.max(after);
        Ok(())
    }
}

/// Posts held in a `BTreeMap` behind a single `RwLock`: reads run
/// concurrently, `add` and `update` are serialized.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    state: RwLock<MemoryState>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `posts` under ids `0..n`.
    pub fn with_posts(posts: impl IntoIterator<Item = PostFields>) -> Self {
        let posts: BTreeMap<u64, PostFields> = (0u64..).zip(posts).collect();
        let next_id = posts.len() as u64;
        Self {
            state: RwLock::new(MemoryState { posts, next_id }),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.state, BACKEND, "len").posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Only the canonical decimal spelling is accepted, so `"00"` or `"+0"`
    /// never alias post `0`.
    fn parse_id(id: &PostId) -> Result<u64, StoreError> {
        let raw = id.as_str().trim();
        let key = raw
            .parse::<u64>()
            .map_err(|err| StoreError::invalid_id(id.as_str(), err))?;
        if key.to_string() != raw {
            return Err(StoreError::invalid_id(
                id.as_str(),
                "identifier is not in canonical decimal form",
            ));
        }
        Ok(key)
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn get_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        let state = rw_read(&self.state, BACKEND, "get_all");
        Ok(state
            .posts
            .iter()
            .map(|(id, fields)| PostRecord::new(PostId::from(*id), fields.clone()))
            .collect())
    }

    async fn get_by_id(&self, id: &PostId) -> Result<PostRecord, StoreError> {
        let key = Self::parse_id(id)?;
        let state = rw_read(&self.state, BACKEND, "get_by_id");
        state
            .posts
            .get(&key)
            .map(|fields| PostRecord::new(PostId::from(key), fields.clone()))
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn add(&self, post: NewPost) -> Result<PostId, StoreError> {
        let NewPost { id, fields } = post;
        let requested = id
            .map(|raw| Self::parse_id(&raw).map(|key| (key, raw)))
            .transpose()?;

        let mut state = rw_write(&self.state, BACKEND, "add");
        let key = match requested {
            Some((key, raw)) => {
                state.reserve(key, &raw)?;
                key
            }
            None => state.allocate()?,
        };
        state.posts.insert(key, fields);
        Ok(PostId::from(key))
    }

    async fn update(&self, post: PostRecord) -> Result<(), StoreError> {
        let PostRecord { id, fields } = post;
        let key = Self::parse_id(&id)?;

        let mut state = rw_write(&self.state, BACKEND, "update");
        match state.posts.get_mut(&key) {
            Some(existing) => {
                *existing = fields;
                Ok(())
            }
            None => Err(StoreError::not_found(&id)),
        }
    }
}
