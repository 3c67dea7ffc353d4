mod connector;
mod database;

pub use connector::*;
pub use database::*;
