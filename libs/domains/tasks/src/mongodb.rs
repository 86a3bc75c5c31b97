//! MongoDB implementation of TaskRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, oid::ObjectId, to_bson},
    options::IndexOptions,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::error::{StoreFault, StoreResult};
use crate::models::{CreateTask, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;

/// Collection used by [`MongoTaskRepository::new`]
pub const DEFAULT_COLLECTION: &str = "tasks";

/// Tasks stored one document per task:
/// `{ _id: ObjectId, userId, name, finished, ...extra }`
pub struct MongoTaskRepository {
    collection: Collection<Document>,
}

impl MongoTaskRepository {
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoTaskRepository::new(client.database("todo"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<Document>(collection_name);
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Ensure the `userId` index used by per-user listing and deletion
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn init_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(
                IndexOptions::builder()
                    .name("userId_1".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Task indexes ensured");
        Ok(())
    }

    fn build_filter(filter: &TaskFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref user_id) = filter.user_id {
            doc.insert("userId", user_id.as_str());
        }

        if let Some(ref name) = filter.name {
            doc.insert(
                "name",
                doc! { "$regex": regex::escape(name), "$options": "i" },
            );
        }

        if let Some(finished) = filter.finished {
            doc.insert("finished", finished);
        }

        doc
    }

    fn build_insert(input: &CreateTask) -> StoreResult<Document> {
        let mut doc = doc! {
            "userId": input.user_id.as_str(),
            "name": input.name.as_str(),
            "finished": input.finished,
        };
        insert_extra(&mut doc, input.extra_attributes())?;
        Ok(doc)
    }

    /// `$set` document for `input`, or `None` when there is nothing to set
    fn build_update(input: &UpdateTask) -> StoreResult<Option<Document>> {
        let mut set = doc! {};

        if let Some(ref name) = input.name {
            set.insert("name", name.as_str());
        }
        if let Some(finished) = input.finished {
            set.insert("finished", finished);
        }
        insert_extra(&mut set, input.extra_attributes())?;

        if set.is_empty() {
            return Ok(None);
        }
        Ok(Some(doc! { "$set": set }))
    }
}

fn insert_extra(doc: &mut Document, extra: BTreeMap<String, Value>) -> StoreResult<()> {
    for (key, value) in extra {
        let bson = to_bson(&value)
            .map_err(|e| StoreFault::InvalidPayload(format!("field '{}': {}", key, e)))?;
        doc.insert(key, bson);
    }
    Ok(())
}

/// Text field; scalar values written by other clients are rendered as text
fn take_string(doc: &mut Document, key: &str) -> StoreResult<String> {
    match doc.remove(key) {
        Some(Bson::String(value)) => Ok(value),
        None | Some(Bson::Null) => Ok(String::new()),
        Some(Bson::Int32(n)) => Ok(n.to_string()),
        Some(Bson::Int64(n)) => Ok(n.to_string()),
        Some(Bson::Double(n)) => Ok(n.to_string()),
        Some(Bson::Boolean(b)) => Ok(b.to_string()),
        Some(other) => Err(StoreFault::MalformedDocument(format!(
            "'{}' is not a string: {}",
            key, other
        ))),
    }
}

/// Flag field; also accepts `0`/`1` and `"true"`/`"false"`
fn take_bool(doc: &mut Document, key: &str) -> StoreResult<bool> {
    let value = doc.remove(key);
    let parsed = match &value {
        Some(Bson::Boolean(b)) => Some(*b),
        None | Some(Bson::Null) => Some(false),
        Some(Bson::Int32(n)) => int_flag(i64::from(*n)),
        Some(Bson::Int64(n)) => int_flag(*n),
        Some(Bson::String(s)) => s.parse().ok(),
        Some(_) => None,
    };

    parsed.ok_or_else(|| {
        StoreFault::MalformedDocument(format!(
            "'{}' is not a boolean: {}",
            key,
            value.unwrap_or(Bson::Null)
        ))
    })
}

fn int_flag(n: i64) -> Option<bool> {
    match n {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Convert a stored document into the client-facing [`Task`].
///
/// Missing fields take their zero value and mistyped scalars are coerced.
/// A document that still cannot be read (no ObjectId `_id`, or a document
/// or array where a field value belongs) is a
/// [`StoreFault::MalformedDocument`], which fails the whole read it is part
/// of, listings included.
pub fn task_from_document(mut doc: Document) -> StoreResult<Task> {
    let id = match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => {
            return Err(StoreFault::MalformedDocument(format!(
                "'_id' is not an ObjectId: {}",
                other
            )));
        }
        None => return Err(StoreFault::MalformedDocument("missing '_id'".to_string())),
    };

    let user_id = take_string(&mut doc, "userId")?;
    let name = take_string(&mut doc, "name")?;
    let finished = take_bool(&mut doc, "finished")?;
    let extra = doc
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    Ok(Task {
        id,
        user_id,
        name,
        finished,
        extra,
    })
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
    #[instrument(skip(self))]
    async fn find(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let cursor = self.collection.find(Self::build_filter(&filter)).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        docs.into_iter().map(task_from_document).collect()
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Task>> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .map(task_from_document)
            .transpose()
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn insert(&self, input: CreateTask) -> StoreResult<Task> {
        let doc = Self::build_insert(&input)?;
        let result = self.collection.insert_one(doc).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreFault::MalformedDocument(format!(
                "inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;

        tracing::info!(task_id = %id, "Task created successfully");
        Ok(input.into_task(id))
    }

    #[instrument(skip(self, input), fields(task_id = %id))]
    async fn update_by_id(&self, id: ObjectId, input: UpdateTask) -> StoreResult<bool> {
        let Some(update) = Self::build_update(&input)? else {
            return Ok(false);
        };

        let result = self.collection.update_one(doc! { "_id": id }, update).await?;

        tracing::info!(matched = result.matched_count, "Task update applied");
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete_by_id(&self, id: ObjectId) -> StoreResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        tracing::info!(deleted = result.deleted_count, "Task delete applied");
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_user(&self, user_id: String) -> StoreResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "userId": user_id.as_str() })
            .await?;

        tracing::info!(deleted = result.deleted_count, "User tasks deleted");
        Ok(result.deleted_count)
    }
}
