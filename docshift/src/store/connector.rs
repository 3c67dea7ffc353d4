use crate::config::ShiftConfig;
use crate::errors::DocShiftResult;
use crate::store::DocumentDatabase;

/// Opens the database a run operates on.
///
/// The runner calls [`DatabaseConnector::connect`] exactly once per run and
/// closes the returned handle exactly once, whatever the outcome of the run.
/// Failures to reach the database should use
/// [`ErrorKind::ConnectionError`](crate::errors::ErrorKind::ConnectionError).
pub trait DatabaseConnector: Send + Sync {
    fn connect(&self, config: &ShiftConfig) -> DocShiftResult<DocumentDatabase>;
}

impl<F> DatabaseConnector for F
where
    F: Fn(&ShiftConfig) -> DocShiftResult<DocumentDatabase> + Send + Sync,
{
    fn connect(&self, config: &ShiftConfig) -> DocShiftResult<DocumentDatabase> {
        self(config)
    }
}
