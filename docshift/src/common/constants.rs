/// Reserved field holding a document's identity.
pub const DOC_ID: &str = "_id";

/// Collection that stores the version marker.
pub const MIGRATIONS_COLLECTION: &str = "__migrations";

/// Key of the single version marker document.
pub const DEFAULT_MARKER_KEY: &str = "default";

/// Marker field recording the last applied migration identifier.
pub const MIG_ID_FIELD: &str = "migId";

/// Number of documents fetched per page by the batch updater.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

pub const DEFAULT_HOST: &str = "localhost";

pub const DEFAULT_PORT: u16 = 27017;

/// Version reported when no marker exists.
pub const INITIAL_VERSION: u64 = 0;
