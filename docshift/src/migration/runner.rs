use crate::config::{Direction, ShiftConfig};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::migration::{load_migrations, Migration, MigrationContext, MigrationSource, VersionLedger};
use crate::report::{ProgressReporter, StdoutReporter};
use crate::store::{DatabaseConnector, DocumentDatabase};
use std::sync::Arc;

/// Outcome of [`MigrationRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub direction: Direction,
    pub dry_run: bool,
    /// Ledger version before the run.
    pub starting_version: u64,
    /// Ledger version after the run. Equals `starting_version` for a dry run.
    pub final_version: u64,
    /// Names of the pending migrations, in execution order.
    pub pending: Vec<String>,
    /// Identifiers of the migrations executed, in execution order.
    pub applied: Vec<u64>,
}

/// Outcome of [`MigrationRunner::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub current_version: u64,
    /// Every known migration name, ascending by identifier.
    pub known: Vec<String>,
    /// Names an `up` run would apply, ascending by identifier.
    pub pending: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    VersionLoaded(u64),
    PendingComputed(usize),
    DryRunReported,
    Applying(u64),
    Advanced(u64),
    Closed,
}

struct StateTracker {
    state: RunState,
}

impl StateTracker {
    fn new() -> Self {
        StateTracker { state: RunState::Idle }
    }

    fn enter(&mut self, next: RunState) {
        log::debug!("Runner state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Selects the migrations to execute and their order.
///
/// - `up`: identifiers greater than `current`, ascending.
/// - `down`: identifiers greater than `target` and at most `current`,
///   descending, so the most recent migration is reverted first.
///
/// `migrations` must be sorted ascending, as returned by
/// [`load_migrations`].
///
/// # Errors
///
/// [`ErrorKind::InvalidDirection`] when `down` is requested without a target.
pub fn pending_migrations(
    migrations: &[Migration],
    current: u64,
    direction: Direction,
    target: Option<u64>,
) -> DocShiftResult<Vec<Migration>> {
    match direction {
        Direction::Up => Ok(migrations
            .iter()
            .filter(|m| m.id() > current)
            .cloned()
            .collect()),
        Direction::Down => {
            let target = target.ok_or_else(|| {
                DocShiftError::new(
                    "Migrating down requires a target version",
                    ErrorKind::InvalidDirection,
                )
            })?;
            Ok(migrations
                .iter()
                .rev()
                .filter(|m| m.id() > target && m.id() <= current)
                .cloned()
                .collect())
        }
    }
}

/// Applies or reverts migrations and keeps the version ledger in step.
///
/// One connection is opened per call and closed on every exit path. Migrations
/// run one at a time; the ledger is written after each successful migration,
/// so a failed run can be resumed by running again.
///
/// ```rust,ignore
/// let runner = MigrationRunner::new(connector, registry);
/// let report = runner.run(&ShiftConfig::builder().database_name("shop").build()?)?;
/// println!("now at {}", report.final_version);
/// ```
pub struct MigrationRunner {
    connector: Arc<dyn DatabaseConnector>,
    source: Arc<dyn MigrationSource>,
    reporter: Arc<dyn ProgressReporter>,
}

impl MigrationRunner {
    pub fn new<C, S>(connector: C, source: S) -> Self
    where
        C: DatabaseConnector + 'static,
        S: MigrationSource + 'static,
    {
        MigrationRunner {
            connector: Arc::new(connector),
            source: Arc::new(source),
            reporter: Arc::new(StdoutReporter),
        }
    }

    /// Sends progress lines to `reporter` instead of standard output.
    pub fn with_reporter<R: ProgressReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Runs the pending migrations for the configured direction.
    ///
    /// Migrations are loaded before connecting, so a load error never reaches
    /// the database. A transform failure stops the run; migrations completed
    /// before it stay applied and recorded.
    pub fn run(&self, config: &ShiftConfig) -> DocShiftResult<RunReport> {
        let migrations = load_migrations(self.source.as_ref())?;
        let database = self.connector.connect(config)?;
        let mut tracker = StateTracker::new();

        let result = self.execute(&database, config, &migrations, &mut tracker);
        let result = release(&database, result);
        tracker.enter(RunState::Closed);
        result
    }

    /// Reports the ledger version and the migrations pending for `up`.
    pub fn status(&self, config: &ShiftConfig) -> DocShiftResult<StatusReport> {
        let migrations = load_migrations(self.source.as_ref())?;
        let database = self.connector.connect(config)?;

        let result = self.inspect(&database, config, &migrations);
        release(&database, result)
    }

    fn execute(
        &self,
        database: &DocumentDatabase,
        config: &ShiftConfig,
        migrations: &[Migration],
        tracker: &mut StateTracker,
    ) -> DocShiftResult<RunReport> {
        let direction = config.direction();
        let ledger = VersionLedger::new(database.clone(), config.migrations_collection());

        let current = ledger.read_version()?;
        tracker.enter(RunState::VersionLoaded(current));
        self.reporter.report(&format!("Current version: {}", current));

        let pending = pending_migrations(migrations, current, direction, config.target_version())?;
        tracker.enter(RunState::PendingComputed(pending.len()));

        let mut report = RunReport {
            direction,
            dry_run: config.dry_run(),
            starting_version: current,
            final_version: current,
            pending: pending.iter().map(|m| m.name().to_string()).collect(),
            applied: Vec::with_capacity(pending.len()),
        };

        if config.dry_run() {
            self.reporter.report(&format!(
                "Dry run: {} migration(s) pending {}",
                pending.len(),
                direction
            ));
            for migration in &pending {
                self.reporter.report(&format!("  {}", migration.name()));
            }
            tracker.enter(RunState::DryRunReported);
            return Ok(report);
        }

        if pending.is_empty() {
            self.reporter.report("Already up to date");
            return Ok(report);
        }

        let (before, after) = match direction {
            Direction::Up => ("Applying", "Applied"),
            Direction::Down => ("Reverting", "Reverted"),
        };

        for migration in &pending {
            tracker.enter(RunState::Applying(migration.id()));
            self.reporter.report(&format!("{} {}", before, migration.name()));

            let context = MigrationContext::new(
                database.clone(),
                config.page_size(),
                migration.name(),
                direction,
            );
            migration.apply(direction, &context)?;

            let version = match direction {
                Direction::Up => migration.id(),
                Direction::Down => migration.id().saturating_sub(1),
            };
            ledger.write_version(version, true)?;
            tracker.enter(RunState::Advanced(version));

            report.final_version = version;
            report.applied.push(migration.id());
            self.reporter.report(&format!("{} {}", after, migration.name()));
        }

        self.reporter.report(&format!(
            "Done: {} migration(s) {}, now at version {}",
            report.applied.len(),
            after.to_lowercase(),
            report.final_version
        ));
        log::info!(
            "Migrated {} from version {} to {}",
            direction,
            report.starting_version,
            report.final_version
        );
        Ok(report)
    }

    fn inspect(
        &self,
        database: &DocumentDatabase,
        config: &ShiftConfig,
        migrations: &[Migration],
    ) -> DocShiftResult<StatusReport> {
        let ledger = VersionLedger::new(database.clone(), config.migrations_collection());
        let current = ledger.read_version()?;
        let pending = pending_migrations(migrations, current, Direction::Up, None)?;

        self.reporter.report(&format!("Current version: {}", current));
        for migration in migrations {
            let mark = if migration.id() <= current { "x" } else { " " };
            self.reporter.report(&format!("  [{}] {}", mark, migration.name()));
        }

        Ok(StatusReport {
            current_version: current,
            known: migrations.iter().map(|m| m.name().to_string()).collect(),
            pending: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    }
}

// closes the connection; a run error takes precedence over a close error
fn release<T>(database: &DocumentDatabase, result: DocShiftResult<T>) -> DocShiftResult<T> {
    match (result, database.close()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            log::error!("Failed to close connection after error: {}", close_err);
            Err(err)
        }
    }
}
