//! Relational store for synchronized scan data, backed by SQLite.

mod error;
mod open;
mod models;
mod insert;
mod query;
mod run;
mod schema;

pub use error::StoreError;
pub use open::Db;
pub use models::*;
pub use run::RunWriter;
