use crate::collection::{Document, FindOptions};
use crate::common::Value;
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::get_cpu_count;
use crate::store::DocumentDatabase;
use std::thread;

/// Pages smaller than this are updated on the calling thread.
const MIN_DOCUMENTS_PER_WORKER: usize = 64;

/// Counters returned by [`BatchUpdater::update_collection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Non-empty pages fetched.
    pub pages: usize,
    /// Documents passed to the updater.
    pub documents: usize,
    /// Write-backs that matched a stored document.
    pub replaced: usize,
}

/// Rewrites a collection in fixed-size pages.
///
/// # Behavior
/// - Page `i` is fetched with skip `i * page_size` and limit `page_size`, for
///   `i = 0, 1, ...` until a fetch comes back empty.
/// - The updater runs on every document of a page before any of that page is
///   written back. Updaters of one page may run concurrently.
/// - Write-backs then happen one document at a time, in page order, each
///   replacing the stored document with the same `_id`.
/// - At most one page of documents is held in memory.
///
/// # Limitations
/// Skip/limit paging is not a snapshot. If the collection changes while the
/// update runs, for example because the updater's results move documents or
/// another writer inserts or deletes, documents may be skipped or visited twice.
pub struct BatchUpdater {
    database: DocumentDatabase,
    page_size: usize,
    parallelism: usize,
}

impl BatchUpdater {
    pub fn new(database: DocumentDatabase, page_size: usize) -> Self {
        BatchUpdater {
            database,
            page_size: page_size.max(1),
            parallelism: get_cpu_count(),
        }
    }

    /// Caps the number of threads used for one page's updaters.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Applies `updater` to every document in `collection`.
    ///
    /// # Errors
    ///
    /// - the first updater error of a page, in page order; nothing of that page
    ///   has been written back yet, earlier pages stay written
    /// - [`ErrorKind::InvalidDataType`] if a fetched document has no `_id`
    /// - any error of the database boundary
    pub fn update_collection<F>(&self, collection: &str, updater: F) -> DocShiftResult<BatchStats>
    where
        F: Fn(Document) -> DocShiftResult<Document> + Send + Sync,
    {
        let mut stats = BatchStats::default();
        let mut page_index: u64 = 0;

        loop {
            let options = FindOptions::page(page_index, self.page_size as u64);
            let page = self.database.find(collection, &options)?;
            if page.is_empty() {
                break;
            }

            log::debug!(
                "Updating page {} of '{}' ({} documents)",
                page_index,
                collection,
                page.len()
            );

            let keys = page
                .iter()
                .map(|doc| {
                    doc.id().cloned().ok_or_else(|| {
                        DocShiftError::new(
                            &format!("Document in '{}' has no _id and cannot be written back", collection),
                            ErrorKind::InvalidDataType,
                        )
                    })
                })
                .collect::<DocShiftResult<Vec<Value>>>()?;

            stats.pages += 1;
            stats.documents += page.len();

            let updated = self.apply_updater(page, &updater)?;
            for (key, document) in keys.iter().zip(updated) {
                if self.database.replace(collection, key, document)? {
                    stats.replaced += 1;
                } else {
                    log::warn!("Document {} vanished from '{}' before write-back", key, collection);
                }
            }

            page_index += 1;
        }

        log::info!(
            "Updated '{}': {} documents in {} pages",
            collection,
            stats.documents,
            stats.pages
        );
        Ok(stats)
    }

    fn apply_updater<F>(&self, page: Vec<Document>, updater: &F) -> DocShiftResult<Vec<Document>>
    where
        F: Fn(Document) -> DocShiftResult<Document> + Send + Sync,
    {
        let workers = self
            .parallelism
            .min(page.len().div_ceil(MIN_DOCUMENTS_PER_WORKER))
            .max(1);

        if workers == 1 {
            return page.into_iter().map(updater).collect();
        }

        let chunk_size = page.len().div_ceil(workers);
        let results: Vec<DocShiftResult<Vec<Document>>> = thread::scope(|scope| {
            let handles: Vec<_> = page
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .cloned()
                            .map(updater)
                            .collect::<DocShiftResult<Vec<Document>>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(DocShiftError::new(
                            "Document updater panicked",
                            ErrorKind::InternalError,
                        ))
                    })
                })
                .collect()
        });

        let mut updated = Vec::with_capacity(page.len());
        for chunk in results {
            updated.extend(chunk?);
        }
        Ok(updated)
    }
}
