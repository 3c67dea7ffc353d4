use crate::collection::Document;
use crate::config::Direction;
use crate::errors::DocShiftResult;
use crate::migration::{BatchStats, BatchUpdater};
use crate::store::DocumentDatabase;

/// What a transform gets to work with.
///
/// The runner builds a fresh context for every migration it executes. The
/// context is read-only; it hands out the database handle and the batch
/// updater configured for the run.
#[derive(Clone)]
pub struct MigrationContext {
    database: DocumentDatabase,
    page_size: usize,
    migration_name: String,
    direction: Direction,
}

impl MigrationContext {
    pub fn new(
        database: DocumentDatabase,
        page_size: usize,
        migration_name: &str,
        direction: Direction,
    ) -> Self {
        MigrationContext {
            database,
            page_size,
            migration_name: migration_name.to_string(),
            direction,
        }
    }

    pub fn database(&self) -> &DocumentDatabase {
        &self.database
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Name of the migration being executed.
    pub fn migration_name(&self) -> &str {
        &self.migration_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Rewrites every document of `collection` through `updater`, one page at a
    /// time. See [`BatchUpdater::update_collection`].
    pub fn update_collection<F>(&self, collection: &str, updater: F) -> DocShiftResult<BatchStats>
    where
        F: Fn(Document) -> DocShiftResult<Document> + Send + Sync,
    {
        BatchUpdater::new(self.database.clone(), self.page_size).update_collection(collection, updater)
    }
}
