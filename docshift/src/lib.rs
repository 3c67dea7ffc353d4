//! # DocShift - Versioned Document Migrations
//!
//! DocShift applies and reverts ordered, numbered migrations against a document
//! database and records the last applied migration in a persisted version
//! marker.
//!
//! ## Key Features
//!
//! - **Ordered**: migrations are sorted by the numeric prefix of their names
//! - **Resumable**: the version marker is advanced after every migration, so a
//!   failed run picks up where it stopped
//! - **Reversible**: every migration carries an `up` and a `down` transform
//! - **Dry runs**: list what would run without touching the database
//! - **Memory-bounded rewrites**: collections are rewritten page by page, with
//!   the documents of a page transformed in parallel
//! - **Pluggable storage**: any driver can be wrapped as a
//!   [`store::DocumentDatabaseProvider`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docshift::config::ShiftConfig;
//! use docshift::migration::{instructions, MigrationRegistry, MigrationRunner};
//! use docshift::store::memory::InMemoryConnector;
//!
//! let registry = MigrationRegistry::new()
//!     .register(
//!         "1-add-active",
//!         |ctx| instructions::add_field("users", "active", true).call(ctx),
//!         |ctx| instructions::delete_field("users", "active").call(ctx),
//!     );
//!
//! let config = ShiftConfig::builder()
//!     .direction("up")
//!     .database_name("shop")
//!     .build()?;
//!
//! let report = MigrationRunner::new(InMemoryConnector::new(), registry).run(&config)?;
//! assert_eq!(report.final_version, 1);
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents and paging options
//! - [`common`] - Values, constants and shared utilities
//! - [`config`] - Run configuration and its builder
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Migration definitions, loader, ledger, runner and batch updater
//! - [`report`] - Progress output
//! - [`store`] - Database boundary and the in-memory implementation

use std::thread::available_parallelism;

pub mod collection;
pub mod common;
pub mod config;
pub mod errors;
pub mod migration;
pub mod report;
pub mod store;

/// Returns the number of available CPU cores, or 1 if it cannot be detected.
pub fn get_cpu_count() -> usize {
    available_parallelism()
        .map(|p| p.get())
        .unwrap_or_else(|err| {
            log::warn!("Failed to detect available parallelism: {}. Defaulting to single thread.", err);
            1
        })
}
