use crate::collection::{Document, FindOptions};
use crate::common::Value;
use crate::errors::DocShiftResult;
use std::ops::Deref;
use std::sync::Arc;

/// Capabilities the migration engine needs from a document database.
///
/// # Key Responsibilities
/// - **Keyed access**: find, upsert and replace a single document by its `_id`
/// - **Paged reads**: natural-order skip/limit finds over a collection
/// - **Lifecycle**: close the connection and report whether it is closed
///
/// A missing collection behaves like an empty one. Operations on a closed
/// handle fail with
/// [`ErrorKind::StoreAlreadyClosed`](crate::errors::ErrorKind::StoreAlreadyClosed).
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; the batch updater shares the handle
/// with the threads that run per-document updaters.
pub trait DocumentDatabaseProvider: Send + Sync {
    /// Finds the document whose `_id` equals `key`.
    fn find_one(&self, collection: &str, key: &Value) -> DocShiftResult<Option<Document>>;

    /// Stores `document` under `key`, inserting it if absent.
    ///
    /// The stored document's `_id` is set to `key`.
    fn upsert(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<()>;

    /// Returns the documents selected by `options`, in natural order.
    fn find(&self, collection: &str, options: &FindOptions) -> DocShiftResult<Vec<Document>>;

    /// Replaces the document whose `_id` equals `key`.
    ///
    /// Returns `Ok(false)` when no document matched; nothing is inserted.
    fn replace(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<bool>;

    /// Releases the connection. Later calls fail.
    fn close(&self) -> DocShiftResult<()>;

    fn is_closed(&self) -> bool;
}

/// Shared handle to a [`DocumentDatabaseProvider`].
///
/// Cloning is cheap; every clone talks to the same connection.
#[derive(Clone)]
pub struct DocumentDatabase {
    inner: Arc<dyn DocumentDatabaseProvider>,
}

impl DocumentDatabase {
    pub fn new<T: DocumentDatabaseProvider + 'static>(inner: T) -> Self {
        DocumentDatabase {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentDatabase {
    type Target = Arc<dyn DocumentDatabaseProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
