use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::config::ShiftConfig;
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::store::memory::InMemoryDatabase;
use crate::store::{DatabaseConnector, DocumentDatabase, DocumentDatabaseProvider};
use dashmap::{DashMap, DashSet};
use std::sync::Arc;

/// [`DatabaseConnector`] over named [`InMemoryDatabase`]s.
///
/// Every `connect` for the same `database_name` returns a fresh handle over
/// the same data, so state carries from one run to the next the way it would
/// on a server. The connector remembers every handle it gave out, which lets
/// callers check that each run released its connection.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    inner: Arc<InMemoryConnectorInner>,
}

#[derive(Default)]
struct InMemoryConnectorInner {
    databases: DashMap<String, InMemoryDatabase>,
    unreachable: DashSet<String>,
    handles: Atomic<Vec<InMemoryDatabase>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        InMemoryConnector {
            inner: Arc::new(InMemoryConnectorInner {
                databases: DashMap::new(),
                unreachable: DashSet::new(),
                handles: atomic(Vec::new()),
            }),
        }
    }

    /// Returns a handle to the named database, creating it if needed.
    ///
    /// The handle is not counted as a connection; use it to seed or inspect data.
    pub fn database(&self, name: &str) -> InMemoryDatabase {
        self.inner
            .databases
            .entry(name.to_string())
            .or_insert_with(|| InMemoryDatabase::new(name))
            .value()
            .reopen()
    }

    /// Makes every later `connect` to `name` fail with a connection error.
    pub fn mark_unreachable(&self, name: &str) {
        self.inner.unreachable.insert(name.to_string());
    }

    pub fn opened_connections(&self) -> usize {
        self.inner.handles.read_with(|handles| handles.len())
    }

    pub fn closed_connections(&self) -> usize {
        self.inner
            .handles
            .read_with(|handles| handles.iter().filter(|h| h.is_closed()).count())
    }

    /// Connections handed out and not closed yet.
    pub fn open_connections(&self) -> usize {
        self.opened_connections() - self.closed_connections()
    }
}

impl DatabaseConnector for InMemoryConnector {
    fn connect(&self, config: &ShiftConfig) -> DocShiftResult<DocumentDatabase> {
        let name = config.database_name();
        if self.inner.unreachable.contains(name) {
            log::error!("Cannot connect to {}", config.connection_uri());
            return Err(DocShiftError::new(
                &format!("Cannot connect to {}", config.connection_uri()),
                ErrorKind::ConnectionError,
            ));
        }

        let handle = self.database(name);
        self.inner.handles.write_with(|handles| handles.push(handle.clone()));
        log::debug!("Connected to {}", config.connection_uri());
        Ok(DocumentDatabase::new(handle))
    }
}
