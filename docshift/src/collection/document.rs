use im::OrdMap;

use crate::common::{Value, DOC_ID};
use crate::errors::{DocShiftError, DocShiftResult, ErrorKind};
use std::fmt::{Debug, Display};

/// A schemaless document as stored in a collection.
///
/// Keys are kept in sorted order. `_id` is the identity used by the database
/// boundary to match a document on replace; documents fetched from a collection
/// always carry it.
///
/// The map is an `im::OrdMap`, so cloning a document is O(1) and the copy
/// handed to an updater shares structure with the fetched page until modified.
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidFieldName`] if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> DocShiftResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocShiftError::new(
                "Document does not support empty key",
                ErrorKind::InvalidFieldName,
            ));
        }

        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes a field and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Moves the value of `old_name` to `new_name`.
    ///
    /// Returns `Ok(false)` when the document has no `old_name` field.
    pub fn rename_field(&mut self, old_name: &str, new_name: &str) -> DocShiftResult<bool> {
        if new_name.is_empty() {
            return Err(DocShiftError::new(
                "Cannot rename a field to an empty name",
                ErrorKind::InvalidFieldName,
            ));
        }

        match self.data.remove(old_name) {
            Some(value) => {
                self.data.insert(new_name.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The `_id` of this document, if any.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

/// Strips the quotes `stringify!` leaves around string-literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use docshift::doc;
///
/// let empty = doc!{};
/// let user = doc!{
///     "_id": "u1",
///     "name": "Alice",
///     "address": { "city": "Oslo" },
///     "tags": ["a", "b"],
/// };
/// assert_eq!(user.size(), 4);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
