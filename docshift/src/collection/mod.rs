//! Documents and paging options.
//!
//! A [`Document`] is a key-value map where keys are strings and values are
//! [`Value`](crate::common::Value)s. Documents are what the database boundary
//! stores and what collection updaters receive and return.
//!
//! ```rust,ignore
//! use docshift::doc;
//!
//! let mut doc = doc! { "_id": "u1", "name": "Alice" };
//! doc.put("age", 30)?;
//! doc.rename_field("name", "full_name")?;
//! ```

mod document;
mod find_options;

pub use document::*;
pub use find_options::*;
