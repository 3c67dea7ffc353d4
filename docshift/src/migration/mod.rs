//! Migration definitions, loading and execution.
//!
//! A migration is a named pair of transforms. Its name starts with a numeric
//! identifier (`"3-add-status"` has identifier `3`) that fixes its position in
//! the sequence. The [`MigrationRunner`] applies pending migrations in that
//! order, recording the last applied identifier in the [`VersionLedger`].
//!
//! ```rust,ignore
//! use docshift::migration::{instructions, MigrationRegistry, MigrationRunner};
//!
//! let registry = MigrationRegistry::new()
//!     .register("1-add-active", |ctx| {
//!         ctx.update_collection("users", |mut doc| {
//!             doc.put("active", true)?;
//!             Ok(doc)
//!         })?;
//!         Ok(())
//!     }, |ctx| instructions::delete_field("users", "active").call(ctx));
//!
//! let report = MigrationRunner::new(connector, registry).run(&config)?;
//! ```

mod batch;
mod context;
pub mod instructions;
mod ledger;
mod loader;
#[allow(clippy::module_inception)]
mod migration;
mod runner;
mod source;

pub use batch::*;
pub use context::*;
pub use ledger::*;
pub use loader::*;
pub use migration::*;
pub use runner::*;
pub use source::*;
