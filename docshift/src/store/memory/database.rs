use crate::collection::{Document, FindOptions};
use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor, DOC_ID};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::store::DocumentDatabaseProvider;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type CollectionData = Atomic<IndexMap<Value, Document>>;

/// In-memory implementation of [`DocumentDatabaseProvider`].
///
/// # Characteristics
/// - **Natural order**: documents keep their insertion position; replacing a
///   document keeps its position, as a server's natural order would
/// - **Shared data, separate handles**: [`InMemoryDatabase::reopen`] gives a new
///   connection handle over the same collections, with its own closed flag
/// - **No persistence**: data lives as long as some handle does
///
/// ```text
/// let db = InMemoryDatabase::new("shop");
/// db.insert("orders", doc! { "_id": 1, "total": 10 })?;
/// let page = db.find("orders", &FindOptions::page(0, 1000))?;
/// ```
#[derive(Clone)]
pub struct InMemoryDatabase {
    inner: Arc<InMemoryDatabaseInner>,
    closed: Arc<AtomicBool>,
}

impl InMemoryDatabase {
    pub fn new(name: &str) -> InMemoryDatabase {
        InMemoryDatabase {
            inner: Arc::new(InMemoryDatabaseInner::new(name)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens another connection handle over the same data.
    pub fn reopen(&self) -> InMemoryDatabase {
        InMemoryDatabase {
            inner: self.inner.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts a document, assigning a UUID string `_id` when it has none.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::BackendError`] if the `_id` is already taken.
    pub fn insert(&self, collection: &str, document: Document) -> DocShiftResult<Value> {
        self.check_opened()?;
        self.inner.insert(collection, document)
    }

    pub fn insert_many(&self, collection: &str, documents: Vec<Document>) -> DocShiftResult<Vec<Value>> {
        self.check_opened()?;
        documents
            .into_iter()
            .map(|document| self.inner.insert(collection, document))
            .collect()
    }

    /// Removes a document by `_id`, returning it.
    pub fn remove(&self, collection: &str, key: &Value) -> DocShiftResult<Option<Document>> {
        self.check_opened()?;
        Ok(self.inner.remove(collection, key))
    }

    pub fn count(&self, collection: &str) -> usize {
        self.inner.count(collection)
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    fn check_opened(&self) -> DocShiftResult<()> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("In-memory database '{}' is already closed", self.inner.name);
            return Err(DocShiftError::new(
                &format!("Database '{}' is already closed", self.inner.name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }
}

impl DocumentDatabaseProvider for InMemoryDatabase {
    fn find_one(&self, collection: &str, key: &Value) -> DocShiftResult<Option<Document>> {
        self.check_opened()?;
        Ok(self.inner.find_one(collection, key))
    }

    fn upsert(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<()> {
        self.check_opened()?;
        self.inner.upsert(collection, key, document)
    }

    fn find(&self, collection: &str, options: &FindOptions) -> DocShiftResult<Vec<Document>> {
        self.check_opened()?;
        Ok(self.inner.find(collection, options))
    }

    fn replace(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<bool> {
        self.check_opened()?;
        self.inner.replace(collection, key, document)
    }

    fn close(&self) -> DocShiftResult<()> {
        self.check_opened()?;
        self.closed.store(true, Ordering::Release);
        log::debug!("Closed connection to in-memory database '{}'", self.inner.name);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

struct InMemoryDatabaseInner {
    name: String,
    collections: DashMap<String, CollectionData>,
}

impl InMemoryDatabaseInner {
    fn new(name: &str) -> Self {
        InMemoryDatabaseInner {
            name: name.to_string(),
            collections: DashMap::new(),
        }
    }

    fn collection(&self, name: &str) -> Option<CollectionData> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }

    fn collection_or_create(&self, name: &str) -> CollectionData {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| atomic(IndexMap::new()))
            .value()
            .clone()
    }

    fn insert(&self, collection: &str, mut document: Document) -> DocShiftResult<Value> {
        let key = match document.id() {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                let id = Value::from(uuid::Uuid::new_v4().to_string());
                document.put(DOC_ID, id.clone())?;
                id
            }
        };

        let data = self.collection_or_create(collection);
        data.write_with(|docs| {
            if docs.contains_key(&key) {
                return Err(DocShiftError::new(
                    &format!("Duplicate key {} in collection '{}'", key, collection),
                    ErrorKind::BackendError,
                ));
            }
            docs.insert(key.clone(), document);
            Ok(key)
        })
    }

    fn find_one(&self, collection: &str, key: &Value) -> Option<Document> {
        self.collection(collection)
            .and_then(|data| data.read_with(|docs| docs.get(key).cloned()))
    }

    fn upsert(&self, collection: &str, key: &Value, mut document: Document) -> DocShiftResult<()> {
        document.put(DOC_ID, key.clone())?;
        let data = self.collection_or_create(collection);
        data.write_with(|docs| {
            docs.insert(key.clone(), document);
        });
        Ok(())
    }

    fn find(&self, collection: &str, options: &FindOptions) -> Vec<Document> {
        let Some(data) = self.collection(collection) else {
            return Vec::new();
        };

        let skip = usize::try_from(options.skip_count()).unwrap_or(usize::MAX);
        let limit = options
            .limit_count()
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        data.read_with(|docs| docs.values().skip(skip).take(limit).cloned().collect())
    }

    fn replace(&self, collection: &str, key: &Value, mut document: Document) -> DocShiftResult<bool> {
        let Some(data) = self.collection(collection) else {
            return Ok(false);
        };

        document.put(DOC_ID, key.clone())?;
        Ok(data.write_with(|docs| match docs.get_mut(key) {
            Some(existing) => {
                *existing = document;
                true
            }
            None => false,
        }))
    }

    fn remove(&self, collection: &str, key: &Value) -> Option<Document> {
        self.collection(collection)
            .and_then(|data| data.write_with(|docs| docs.shift_remove(key)))
    }

    fn count(&self, collection: &str) -> usize {
        self.collection(collection)
            .map(|data| data.read_with(|docs| docs.len()))
            .unwrap_or(0)
    }
}
