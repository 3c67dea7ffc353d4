//! Run configuration.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::common::{DEFAULT_HOST, DEFAULT_PAGE_SIZE, DEFAULT_PORT, MIGRATIONS_COLLECTION};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};

/// Which way a run moves the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Apply every migration newer than the ledger, oldest first.
    #[default]
    Up,
    /// Revert migrations down to a target version, newest first.
    Down,
}

impl FromStr for Direction {
    type Err = DocShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(DocShiftError::new(
                &format!("Unknown direction '{}', expected 'up' or 'down'", other),
                ErrorKind::InvalidDirection,
            )),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Options for a single migration run.
///
/// Build one with [`ShiftConfig::builder`]; the builder validates the
/// combination of options before handing out a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftConfig {
    direction: Direction,
    target_version: Option<u64>,
    host: String,
    port: u16,
    database_name: String,
    dry_run: bool,
    page_size: usize,
    migrations_collection: String,
}

impl ShiftConfig {
    pub fn builder() -> ShiftBuilder {
        ShiftBuilder::new()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Version to revert to. Always present for [`Direction::Down`].
    pub fn target_version(&self) -> Option<u64> {
        self.target_version
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Documents fetched per page by the batch updater.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Collection holding the version marker.
    pub fn migrations_collection(&self) -> &str {
        &self.migrations_collection
    }

    /// `mongodb://host:port/database`, for connectors and log lines.
    pub fn connection_uri(&self) -> String {
        format!("mongodb://{}:{}/{}", self.host, self.port, self.database_name)
    }
}

/// Builder for [`ShiftConfig`].
///
/// Setter failures are captured and returned from [`ShiftBuilder::build`], so a
/// chain of calls can be written without intermediate `?`.
///
/// ```rust,ignore
/// let config = ShiftConfig::builder()
///     .direction("down")
///     .target_version(1)
///     .database_name("shop")
///     .build()?;
/// ```
pub struct ShiftBuilder {
    error: Option<DocShiftError>,
    direction: Direction,
    target_version: Option<u64>,
    host: String,
    port: u16,
    database_name: String,
    dry_run: bool,
    page_size: usize,
    migrations_collection: String,
}

impl Default for ShiftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShiftBuilder {
    pub fn new() -> Self {
        ShiftBuilder {
            error: None,
            direction: Direction::Up,
            target_version: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_name: String::new(),
            dry_run: false,
            page_size: DEFAULT_PAGE_SIZE,
            migrations_collection: MIGRATIONS_COLLECTION.to_string(),
        }
    }

    /// Sets the direction from its textual form (`"up"` or `"down"`).
    ///
    /// An unknown value is reported by `build()` as
    /// [`ErrorKind::InvalidDirection`].
    pub fn direction(mut self, direction: &str) -> Self {
        match direction.parse::<Direction>() {
            Ok(direction) => self.direction = direction,
            Err(e) => self.capture(e),
        }
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn target_version(mut self, target_version: u64) -> Self {
        self.target_version = Some(target_version);
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database_name(mut self, database_name: &str) -> Self {
        self.database_name = database_name.to_string();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        if page_size == 0 {
            self.capture(DocShiftError::new(
                "Page size must be greater than zero",
                ErrorKind::ValidationError,
            ));
        } else {
            self.page_size = page_size;
        }
        self
    }

    pub fn migrations_collection(mut self, name: &str) -> Self {
        if name.trim().is_empty() {
            self.capture(DocShiftError::new(
                "Migrations collection name cannot be empty",
                ErrorKind::ValidationError,
            ));
        } else {
            self.migrations_collection = name.to_string();
        }
        self
    }

    fn capture(&mut self, error: DocShiftError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Validates the options and returns the config.
    ///
    /// # Errors
    ///
    /// * the first error captured by a setter
    /// * [`ErrorKind::ValidationError`] if the database name is empty or the
    ///   direction is `down` without a target version
    pub fn build(self) -> DocShiftResult<ShiftConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }

        if self.database_name.trim().is_empty() {
            return Err(DocShiftError::new(
                "Database name is required",
                ErrorKind::ValidationError,
            ));
        }

        if self.host.trim().is_empty() {
            return Err(DocShiftError::new("Host is required", ErrorKind::ValidationError));
        }

        if self.direction == Direction::Down && self.target_version.is_none() {
            return Err(DocShiftError::new(
                "A target version is required when migrating down",
                ErrorKind::ValidationError,
            ));
        }

        Ok(ShiftConfig {
            direction: self.direction,
            target_version: self.target_version,
            host: self.host,
            port: self.port,
            database_name: self.database_name,
            dry_run: self.dry_run,
            page_size: self.page_size,
            migrations_collection: self.migrations_collection,
        })
    }
}
