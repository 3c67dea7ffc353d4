use docshift::collection::{Document, FindOptions};
use docshift::common::{Value, MIGRATIONS_COLLECTION};
use docshift::config::{ShiftBuilder, ShiftConfig};
use docshift::errors::{DocShiftError, DocShiftResult, ErrorKind};
use docshift::migration::{MigrationRegistry, MigrationRunner, VersionLedger};
use docshift::report::MemoryReporter;
use docshift::store::memory::{InMemoryConnector, InMemoryDatabase};
use docshift::store::{DatabaseConnector, DocumentDatabase, DocumentDatabaseProvider};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runs `test` between `before` and `after`. `after` also runs when the test
/// fails, then the failure is reported.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocShiftResult<()>,
    B: Fn() -> DocShiftResult<TestContext>,
    A: Fn(TestContext) -> DocShiftResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_ctx = ctx.clone();
    let result = panic::catch_unwind(AssertUnwindSafe(move || test(test_ctx)));
    let after_result = after(ctx);

    match result {
        Ok(Ok(())) => {
            if let Err(e) = after_result {
                panic!("After run failed: {:?}", e);
            }
        }
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Journal shared between a test and the transforms it registers.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// A registry of migrations `"{id}-step"` that only record their calls as
/// `"up {id}"` / `"down {id}"`.
pub fn recording_registry(ids: &[u64], journal: &Journal) -> MigrationRegistry {
    ids.iter().fold(MigrationRegistry::new(), |registry, &id| {
        let (up_log, down_log) = (journal.clone(), journal.clone());
        registry.register(
            &format!("{}-step", id),
            move |_| {
                up_log.lock().push(format!("up {}", id));
                Ok(())
            },
            move |_| {
                down_log.lock().push(format!("down {}", id));
                Ok(())
            },
        )
    })
}

#[derive(Clone)]
pub struct TestContext {
    connector: CountingConnector,
    database_name: String,
    reporter: MemoryReporter,
}

impl TestContext {
    pub fn new(database_name: &str) -> Self {
        Self {
            connector: CountingConnector::new(InMemoryConnector::new()),
            database_name: database_name.to_string(),
            reporter: MemoryReporter::new(),
        }
    }

    pub fn connector(&self) -> CountingConnector {
        self.connector.clone()
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Handle for seeding and inspecting data; not counted as a connection.
    pub fn database(&self) -> InMemoryDatabase {
        self.connector.memory().database(&self.database_name)
    }

    pub fn reporter(&self) -> MemoryReporter {
        self.reporter.clone()
    }

    /// Builder pre-filled with this context's database name.
    pub fn config(&self) -> ShiftBuilder {
        ShiftConfig::builder().database_name(&self.database_name)
    }

    pub fn up_config(&self) -> DocShiftResult<ShiftConfig> {
        self.config().direction("up").build()
    }

    pub fn down_config(&self, target: u64) -> DocShiftResult<ShiftConfig> {
        self.config().direction("down").target_version(target).build()
    }

    pub fn runner(&self, registry: MigrationRegistry) -> MigrationRunner {
        MigrationRunner::new(self.connector(), registry).with_reporter(self.reporter())
    }

    pub fn ledger_version(&self) -> DocShiftResult<u64> {
        VersionLedger::new(DocumentDatabase::new(self.database()), MIGRATIONS_COLLECTION)
            .read_version()
    }

    pub fn set_ledger_version(&self, version: u64) -> DocShiftResult<()> {
        VersionLedger::new(DocumentDatabase::new(self.database()), MIGRATIONS_COLLECTION)
            .write_version(version, true)?;
        Ok(())
    }
}

pub fn random_name() -> String {
    format!("db_{}", uuid::Uuid::new_v4().simple())
}

pub fn create_test_context() -> DocShiftResult<TestContext> {
    Ok(TestContext::new(&random_name()))
}

/// Fails if a runner left a connection open.
pub fn cleanup(ctx: TestContext) -> DocShiftResult<()> {
    let open = ctx.connector().memory().open_connections();
    if open != 0 {
        return Err(DocShiftError::new(
            &format!("{} connection(s) left open", open),
            ErrorKind::InternalError,
        ));
    }
    Ok(())
}

#[derive(Default)]
struct WriteCounters {
    upserts: AtomicUsize,
    replaces: AtomicUsize,
    finds: AtomicUsize,
}

/// Connector that counts the writes made through every connection it opens.
#[derive(Clone)]
pub struct CountingConnector {
    memory: InMemoryConnector,
    counters: Arc<WriteCounters>,
}

impl CountingConnector {
    pub fn new(memory: InMemoryConnector) -> Self {
        CountingConnector {
            memory,
            counters: Arc::new(WriteCounters::default()),
        }
    }

    pub fn memory(&self) -> &InMemoryConnector {
        &self.memory
    }

    /// Upserts, which only the version ledger issues.
    pub fn upserts(&self) -> usize {
        self.counters.upserts.load(Ordering::SeqCst)
    }

    pub fn replaces(&self) -> usize {
        self.counters.replaces.load(Ordering::SeqCst)
    }

    /// Page fetches.
    pub fn finds(&self) -> usize {
        self.counters.finds.load(Ordering::SeqCst)
    }
}

impl DatabaseConnector for CountingConnector {
    fn connect(&self, config: &ShiftConfig) -> DocShiftResult<DocumentDatabase> {
        let inner = self.memory.connect(config)?;
        Ok(DocumentDatabase::new(CountingDatabase {
            inner,
            counters: self.counters.clone(),
        }))
    }
}

struct CountingDatabase {
    inner: DocumentDatabase,
    counters: Arc<WriteCounters>,
}

impl DocumentDatabaseProvider for CountingDatabase {
    fn find_one(&self, collection: &str, key: &Value) -> DocShiftResult<Option<Document>> {
        self.inner.find_one(collection, key)
    }

    fn upsert(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<()> {
        self.counters.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(collection, key, document)
    }

    fn find(&self, collection: &str, options: &FindOptions) -> DocShiftResult<Vec<Document>> {
        self.counters.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(collection, options)
    }

    fn replace(&self, collection: &str, key: &Value, document: Document) -> DocShiftResult<bool> {
        self.counters.replaces.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(collection, key, document)
    }

    fn close(&self) -> DocShiftResult<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
