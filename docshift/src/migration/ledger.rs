use crate::collection::Document;
use crate::common::{Value, DEFAULT_MARKER_KEY, INITIAL_VERSION, MIG_ID_FIELD};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use crate::store::DocumentDatabase;

/// Reads and writes the version marker.
///
/// The marker is a single document keyed by `"default"` in the migrations
/// collection, holding `migId`: the identifier of the last applied migration.
/// A missing marker means nothing has been applied yet.
#[derive(Clone)]
pub struct VersionLedger {
    database: DocumentDatabase,
    collection: String,
}

impl VersionLedger {
    pub fn new(database: DocumentDatabase, collection: &str) -> Self {
        VersionLedger {
            database,
            collection: collection.to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Current version, `0` if no marker exists or it holds no `migId`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidDataType`] if `migId` is not a non-negative integer.
    /// Whole floats such as `3.0` count as integers; drivers for dynamically
    /// typed languages store numbers as doubles.
    pub fn read_version(&self) -> DocShiftResult<u64> {
        let marker = self.database.find_one(&self.collection, &marker_key())?;
        let version = match marker.as_ref().and_then(|doc| doc.get(MIG_ID_FIELD)) {
            None | Some(Value::Null) => INITIAL_VERSION,
            Some(value) => stored_version(value).ok_or_else(|| {
                log::error!("Version marker holds invalid {}: {}", MIG_ID_FIELD, value);
                DocShiftError::new(
                    &format!("Version marker holds {} = {}, expected a non-negative integer", MIG_ID_FIELD, value),
                    ErrorKind::InvalidDataType,
                )
            })?,
        };

        log::debug!("Read version {} from '{}'", version, self.collection);
        Ok(version)
    }

    /// Persists `version` as the marker value.
    ///
    /// Other fields of an existing marker are kept. With `upsert` unset a
    /// missing marker is left missing and `false` is returned.
    pub fn write_version(&self, version: u64, upsert: bool) -> DocShiftResult<bool> {
        let key = marker_key();
        let existing = self.database.find_one(&self.collection, &key)?;
        if existing.is_none() && !upsert {
            log::warn!("No version marker in '{}', version {} not recorded", self.collection, version);
            return Ok(false);
        }

        let mut marker = existing.unwrap_or_else(Document::new);
        marker.put(MIG_ID_FIELD, version)?;
        self.database.upsert(&self.collection, &key, marker)?;

        log::debug!("Wrote version {} to '{}'", version, self.collection);
        Ok(true)
    }
}

fn stored_version(value: &Value) -> Option<u64> {
    match value {
        Value::F64(v) if v.fract() == 0.0 && *v >= 0.0 && *v < u64::MAX as f64 => Some(*v as u64),
        _ => value.as_u64(),
    }
}

fn marker_key() -> Value {
    Value::from(DEFAULT_MARKER_KEY)
}
