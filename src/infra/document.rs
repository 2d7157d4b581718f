//! MongoDB-backed post store over a single `posts` collection.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{doc, oid::ObjectId},
    error::{Error as MongoError, ErrorKind},
};
use serde::{Deserialize, Serialize};

use crate::application::repos::{PostStore, StoreError};
use crate::domain::entities::{NewPost, PostFields, PostId, PostRecord};

const BACKEND: &str = "mongodb";
const COLLECTION: &str = "posts";

/// Stored shape of a post. A caller-supplied id is kept as `legacy_id` next
/// to the authoritative `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    legacy_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    content: String,
}

impl PostDocument {
    fn into_record(self) -> Result<PostRecord, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::backend("decode", None, "document is missing `_id`"))?;
        Ok(PostRecord::new(
            PostId::new(id.to_hex()),
            PostFields {
                title: self.title,
                date: self.date,
                link: self.link,
                content: self.content,
            },
        ))
    }
}

#[derive(Clone)]
pub struct MongoPostStore {
    database: Database,
    collection: Collection<PostDocument>,
}

impl MongoPostStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, MongoError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(&client, database))
    }

    pub fn new(client: &Client, database: &str) -> Self {
        let database = client.database(database);
        let collection = database.collection::<PostDocument>(COLLECTION);
        Self {
            database,
            collection,
        }
    }

    pub async fn health_check(&self) -> Result<(), MongoError> {
        self.database.run_command(doc! { "ping": 1 }).await.map(|_| ())
    }

    /// Drop every stored post. Intended for test fixtures.
    pub async fn clear(&self) -> Result<(), MongoError> {
        self.collection.drop().await
    }
}

/// Parse an object id, accepting the `ObjectID("<hex>")` display form as well
/// as bare hex.
pub fn parse_object_id(id: &PostId) -> Result<ObjectId, StoreError> {
    let raw = id.as_str().trim();
    let hex = raw
        .strip_prefix("ObjectID(\"")
        .or_else(|| raw.strip_prefix("ObjectId(\""))
        .and_then(|inner| inner.strip_suffix("\")"))
        .unwrap_or(raw);
    let oid =
        ObjectId::parse_str(hex).map_err(|err| StoreError::invalid_id(id.as_str(), err))?;
    if oid.to_hex() != hex {
        return Err(StoreError::invalid_id(id.as_str(), "object id must be lowercase hex"));
    }
    Ok(oid)
}

fn map_mongo_error(operation: &'static str, id: Option<&PostId>, err: MongoError) -> StoreError {
    match *err.kind {
        ErrorKind::ServerSelection { .. } => StoreError::Timeout { operation },
        _ => StoreError::backend(operation, id, err),
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn get_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        let documents: Vec<PostDocument> = self
            .collection
            .find(doc! {})
            .await
            .map_err(|err| map_mongo_error("get_all", None, err))?
            .try_collect()
            .await
            .map_err(|err| map_mongo_error("get_all", None, err))?;

        documents
            .into_iter()
            .map(PostDocument::into_record)
            .collect()
    }

    async fn get_by_id(&self, id: &PostId) -> Result<PostRecord, StoreError> {
        let oid = parse_object_id(id)?;
        let document = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|err| map_mongo_error("get_by_id", Some(id), err))?;

        match document {
            Some(document) => document.into_record(),
            None => Err(StoreError::not_found(id)),
        }
    }

    async fn add(&self, post: NewPost) -> Result<PostId, StoreError> {
        let NewPost { id, fields } = post;
        let document = PostDocument {
            id: None,
            legacy_id: id.map(PostId::into_inner),
            title: fields.title,
            date: fields.date,
            link: fields.link,
            content: fields.content,
        };

        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(|err| map_mongo_error("add", None, err))?;

        result
            .inserted_id
            .as_object_id()
            .map(|oid| PostId::new(oid.to_hex()))
            .ok_or_else(|| StoreError::backend("add", None, "inserted id is not an object id"))
    }

    async fn update(&self, post: PostRecord) -> Result<(), StoreError> {
        let PostRecord { id, fields } = post;
        let oid = parse_object_id(&id)?;
        let update = doc! {
            "$set": {
                "title": fields.title,
                "date": fields.date,
                "link": fields.link,
                "content": fields.content,
            }
        };

        let result = self
            .collection
            .update_one(doc! { "_id": oid }, update)
            .await
            .map_err(|err| map_mongo_error("update", Some(&id), err))?;

        if result.matched_count == 0 {
            return Err(StoreError::not_found(&id));
        }
        Ok(())
    }
}
