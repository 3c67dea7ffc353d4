//! The database boundary.
//!
//! The migration engine never talks to a driver directly. It consumes a
//! [`DocumentDatabase`], a cheap-to-clone handle over any
//! [`DocumentDatabaseProvider`], obtained once per run from a
//! [`DatabaseConnector`].
//!
//! # Implementations
//! - [`memory::InMemoryDatabase`] / [`memory::InMemoryConnector`]: in-process
//!   collections, used for tests and for embedding callers that stage data in
//!   memory.

mod connector;
mod document_database;
pub mod memory;

pub use connector::*;
pub use document_database::*;
