use backtrace::Backtrace;
#[cfg(feature = "serde")]
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for docshift operations.
///
/// The first three variants are load-time failures raised while turning a
/// [`MigrationSource`](crate::migration::MigrationSource) into an ordered set of
/// migrations. They abort a run before the database is touched.
///
/// # Examples
///
/// ```rust,ignore
/// use docshift::errors::{DocShiftError, ErrorKind, DocShiftResult};
///
/// fn example() -> DocShiftResult<()> {
///     Err(DocShiftError::new("no leading digits in 'init'", ErrorKind::MissingIdentifier))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Load Errors
    /// A migration name does not start with a numeric identifier
    MissingIdentifier,
    /// Two migrations resolve to the same identifier
    DuplicateIdentifier,
    /// A migration lacks an `up` or a `down` transform
    MissingDirection,

    // Run Errors
    /// The requested direction is neither `up` nor `down`
    InvalidDirection,
    /// A migration's own transform failed
    TransformError,
    /// The database could not be reached or opened
    ConnectionError,

    // Validation Errors
    /// Configuration is incomplete or inconsistent
    ValidationError,
    /// Invalid field name
    InvalidFieldName,
    /// Invalid data type for operation
    InvalidDataType,

    // Data Encoding Errors
    /// Error encoding or decoding data
    EncodingError,

    // Backend and Store Errors
    /// Error from the database backend
    BackendError,
    /// Database handle has already been closed
    StoreAlreadyClosed,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl ErrorKind {
    /// Returns `true` for the failures raised while loading migrations.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingIdentifier
                | ErrorKind::DuplicateIdentifier
                | ErrorKind::MissingDirection
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingIdentifier => write!(f, "Missing identifier"),
            ErrorKind::DuplicateIdentifier => write!(f, "Duplicate identifier"),
            ErrorKind::MissingDirection => write!(f, "Missing direction"),
            ErrorKind::InvalidDirection => write!(f, "Invalid direction"),
            ErrorKind::TransformError => write!(f, "Transform error"),
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom docshift error type.
///
/// `DocShiftError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use docshift::errors::{DocShiftError, ErrorKind};
///
/// let cause = DocShiftError::new("field 'age' is not a number", ErrorKind::InvalidDataType);
/// let err = DocShiftError::new_with_cause(
///     "migration 3-normalize-age failed",
///     ErrorKind::TransformError,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct DocShiftError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocShiftError>>,
    backtrace: Atomic<Backtrace>,
}

impl DocShiftError {
    /// Creates a new `DocShiftError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocShiftError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `DocShiftError` wrapping an underlying cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocShiftError) -> Self {
        DocShiftError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocShiftError> {
        self.cause.as_deref()
    }
}

impl Display for DocShiftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocShiftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for DocShiftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for docshift operations.
pub type DocShiftResult<T> = Result<T, DocShiftError>;

#[cfg(feature = "serde")]
impl de::Error for DocShiftError {
    fn custom<T: Display>(msg: T) -> Self {
        DocShiftError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

#[cfg(feature = "serde")]
impl ser::Error for DocShiftError {
    fn custom<T: Display>(msg: T) -> Self {
        DocShiftError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<std::io::Error> for DocShiftError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::TimedOut => ErrorKind::ConnectionError,
            _ => ErrorKind::BackendError,
        };
        DocShiftError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<String> for DocShiftError {
    fn from(msg: String) -> Self {
        DocShiftError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DocShiftError {
    fn from(msg: &str) -> Self {
        DocShiftError::new(msg, ErrorKind::InternalError)
    }
}
